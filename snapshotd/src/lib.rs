pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod operations;
pub mod services;
pub mod storage;
pub mod types;
