pub mod rest;
pub mod session;
pub mod types;

pub use rest::MusicRest;
pub use session::Session;
