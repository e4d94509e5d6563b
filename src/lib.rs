pub mod bulk;
pub mod clean;
pub mod config;
pub mod dataset;
pub mod export;
pub mod logging;
pub mod process;
pub mod session;
pub mod stats;
