//! LivePaper resources: payoffs, triggers and storage images
//!
//! Payoffs and triggers share one lifecycle, captured by [`Resource`]:
//! validate and POST to create, GET by id to fetch. Creation errors always
//! propagate; lookups degrade to `None` and only log what went wrong.

pub mod image;
pub mod payoff;
pub mod trigger;

pub use image::Image;
pub use payoff::{Payoff, PayoffAttributes, PayoffType};
pub use trigger::{Trigger, TriggerAttributes, Watermark, WatermarkSettings};

use crate::client::{LivePaperClient, LivePaperResult};
use crate::config::Endpoints;
use crate::{log_debug, log_error, log_warn};

/// A server-side object with a create endpoint and a fetch-by-id endpoint
pub trait Resource: Sized {
    /// Singular name, also the root key of request and response documents
    const NAME: &'static str;

    fn base_url(endpoints: &Endpoints) -> &str;

    /// Validate the object and build the create request document
    fn request_body(&self) -> LivePaperResult<serde_json::Value>;

    /// Build an object from a response document
    fn parse(json: &str) -> LivePaperResult<Self>;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);
}

/// POST the resource and copy the server-assigned id back into it
pub(crate) fn create<R: Resource>(client: &LivePaperClient, resource: &mut R) -> LivePaperResult<()> {
    let body = resource.request_body()?;

    let response = client.post_json(R::base_url(client.endpoints()), &body)?;
    let text = response.text()?;

    // A 2xx create always yields the id, even if the rest of the body is unreadable.
    let id = match R::parse(&text) {
        Ok(created) => created.id().map(str::to_string),
        Err(e) => {
            let document = unwrap_root(&text, R::NAME)?;
            log_warn!("Created {} but could not parse the response: {}", R::NAME, e);
            document.get("id").and_then(serde_json::Value::as_str).map(str::to_string)
        }
    };

    log_debug!("Created {} {:?}", R::NAME, id);
    resource.set_id(id);
    Ok(())
}

/// GET a resource by id; any failure is logged and reported as absent
pub(crate) fn fetch<R: Resource>(client: &LivePaperClient, id: &str) -> Option<R> {
    match try_fetch(client, id) {
        Ok(resource) => Some(resource),
        Err(e) if e.is_not_found() => {
            log_warn!("{} {} not found", R::NAME, id);
            None
        }
        Err(e) => {
            log_error!("Failed to fetch {} {}: {}", R::NAME, id, e);
            None
        }
    }
}

fn try_fetch<R: Resource>(client: &LivePaperClient, id: &str) -> LivePaperResult<R> {
    let url = resource_url(R::base_url(client.endpoints()), id);
    let response = client.get(&url, "application/json")?;
    R::parse(&response.text()?)
}

/// `{base}/{id}` with the id encoded as a single path segment
pub(crate) fn resource_url(base: &str, id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(id))
}

/// Pull the `{"<root>": {...}}` object out of a response document
pub(crate) fn unwrap_root(json: &str, root: &str) -> LivePaperResult<serde_json::Value> {
    let mut document: serde_json::Value = serde_json::from_str(json)?;
    match document.get_mut(root).map(serde_json::Value::take) {
        Some(inner) if inner.is_object() => Ok(inner),
        _ => Err(crate::client::LivePaperError::InvalidResponse(format!(
            "expected a \"{}\" object",
            root
        ))),
    }
}
