pub mod coordinator;

pub use coordinator::{RunCoordinator, RunReport};
