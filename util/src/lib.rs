pub mod assessment_config;
pub mod config;
pub mod logger;
pub mod paths;
pub mod test_helpers;
