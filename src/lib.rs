pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod music;
pub mod partner;

pub use config::Config;
pub use error::RunError;
pub use execution::{RunCoordinator, RunReport};
