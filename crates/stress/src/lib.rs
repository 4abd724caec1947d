pub mod config;
pub mod workload;

pub use config::StressConfig;
pub use workload::{StressReport, run};
