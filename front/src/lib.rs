pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod countdown;
pub mod error;
pub mod group;
pub mod session;
pub mod ui;
pub mod urgency;

pub use api::ApiClient;
pub use error::{ApiError, AuthError, BoardError, StoreError};
