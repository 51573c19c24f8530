mod annotations;
mod health;

pub use annotations::generate_annotations;
pub use health::{health_check, readiness_check};
