pub mod backup;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod restore;
pub mod types;
pub mod util;
