pub mod categorize;
pub mod common;
pub mod config;
pub mod score;
