//! HTTP plumbing shared by every LivePaper resource

pub mod auth;
pub mod error;
pub mod http;

pub use auth::{ClientCredentials, StaticToken, TokenProvider};
pub use error::{LivePaperError, LivePaperResult, ValidationError};
pub use http::LivePaperClient;
