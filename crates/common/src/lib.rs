pub mod config;
pub mod logging;

pub use config::{ENVIRONMENT_VAR, Environment, ParseEnvironmentError};
pub use logging::setup_logging;
