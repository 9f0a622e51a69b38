// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds argument parsing and terminal setup.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod quote;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;
