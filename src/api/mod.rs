pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::{best_effort, ApiError};
