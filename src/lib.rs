pub mod config;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod render;
pub mod sanitize;
pub mod service;
pub mod trigger;
