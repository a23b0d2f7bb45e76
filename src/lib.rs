//! Keyboard-layout detection and layout-aware lesson generation.
//!
//! `app::Trainer` is the usual entry point; the modules below it can be used
//! on their own (the binary and benchmarks do both).

pub mod app;
pub mod config;
pub mod engine;
pub mod generator;
pub mod keyboard;
pub mod store;

pub use app::{LessonOptions, Trainer};
pub use config::Config;
