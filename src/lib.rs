pub mod cli;
pub mod error;
pub mod export;
pub mod github;
pub mod models;
pub mod retry;
pub mod types;
