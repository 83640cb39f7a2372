pub mod config;
pub mod constants;
pub mod contacts;
pub mod directory;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod pipeline;
pub mod report;
pub mod roster;
pub mod types;
