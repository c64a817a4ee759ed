pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod scanner;
pub mod store;
pub mod terminal;
