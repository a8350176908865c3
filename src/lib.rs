//! # LivePaper Client Library
//!
//! A blocking client for the LivePaper API:
//! - Payoffs (web redirects and rich payoffs)
//! - Watermark triggers, including watermark image download
//! - Image upload into LivePaper storage
//!
//! ## Quick Start
//!
//! ```no_run
//! use livepaper::{Config, LivePaperClient, Payoff, PayoffAttributes, PayoffType};
//!
//! fn main() -> anyhow::Result<()> {
//!     // LIVEPAPER_CLIENT_ID / LIVEPAPER_CLIENT_SECRET
//!     let client = LivePaperClient::from_config(Config::from_env()?)?;
//!
//!     let mut payoff = Payoff::new(PayoffAttributes {
//!         name: Some("Spring campaign".into()),
//!         payoff_type: Some(PayoffType::Web.to_string()),
//!         url: Some("https://example.com/spring".into()),
//!         ..Default::default()
//!     });
//!     payoff.save(&client)?;
//!     println!("created payoff {:?}", payoff.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error handling
//!
//! - `save()` validates before sending anything and returns
//!   [`LivePaperError::Validation`] for missing or unsupported fields
//! - `Payoff::get` / `Trigger::find` return `None` when the object does not
//!   exist or the request fails
//! - `Image::upload` falls back to the URL it was given
//! - `Trigger::download_watermark` returns every failure to the caller

pub mod client;
pub mod config;
pub mod core;
pub mod resources;

pub use client::{
    ClientCredentials, LivePaperClient, LivePaperError, LivePaperResult, StaticToken, TokenProvider,
    ValidationError,
};
pub use config::{Config, Credentials, Endpoints};
pub use resources::{
    Image, Payoff, PayoffAttributes, PayoffType, Resource, Trigger, TriggerAttributes, Watermark,
    WatermarkSettings,
};
