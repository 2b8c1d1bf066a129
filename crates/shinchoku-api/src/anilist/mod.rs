pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{load_token, AccessToken};
pub use client::{AniListClient, ClientOptions};
pub use error::AniListError;
