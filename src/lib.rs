pub mod api;
pub mod audio;
pub mod config;
pub mod ingest;
pub mod monitoring;
pub mod search;
pub mod session;
pub mod video;

// Re-export the state core for convenient access
pub use session::{Action, SessionState, SessionStore};
