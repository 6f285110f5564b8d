pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod import;
pub mod model;
pub mod vault;
