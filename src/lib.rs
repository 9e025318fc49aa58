// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires the terminal to these modules.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod cursor;
pub mod error;
pub mod history;
pub mod metrics;
pub mod passage;
pub mod reconciler;
pub mod runtime;
pub mod session;
pub mod tape;
pub mod ui;

pub use error::EngineError;
pub use session::{Session, SessionConfig};
