pub mod error;
pub mod formatter;
pub mod handler;
pub mod level;
pub mod loader;
pub mod logger;
pub mod logging_config;
pub mod rewrite;
