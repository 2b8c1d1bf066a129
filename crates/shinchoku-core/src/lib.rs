pub mod cache;
pub mod config;
pub mod decision;
pub mod error;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod resolver;
pub mod session;

pub use config::{AppConfig, UpdatePolicy};
pub use error::CoreError;
pub use orchestrator::{Action, Invocation, OutputLine, Updater};
