pub mod config;
pub mod daemon;
pub mod harvest;
pub mod prompts;
pub mod status;
