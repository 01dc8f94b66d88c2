pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod partition;
pub mod pipeline;
pub mod protocol;
pub mod scanner;
pub mod split;
