//! Watermark triggers
//!
//! A trigger ties a watermarked image to payoffs. On creation the caller
//! supplies the watermark strength and source image; the API fills in the
//! rest and later reports the watermark and subscription as opaque values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Resource, create, fetch, resource_url, unwrap_root};
use crate::client::{LivePaperClient, LivePaperResult, ValidationError};
use crate::config::Endpoints;
use crate::log_info;

const WATERMARK_OUTPUT_FORMAT: &str = "JPEG";
const WATERMARK_RESOLUTION: u32 = 75;
// Every trigger is created on the monthly package, whatever the caller
// passed as subscription.
const SUBSCRIPTION_PACKAGE: &str = "month";

/// Watermark parameters supplied when creating a trigger
///
/// Anything beyond these two fields makes a server watermark a
/// [`Watermark::Reference`], so nothing the API returns is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatermarkSettings {
    pub strength: u32,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// Trigger watermark: caller settings, or whatever the API reported back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Watermark {
    Settings(WatermarkSettings),
    Reference(Value),
}

impl Watermark {
    pub fn new(strength: u32, image_url: impl Into<String>) -> Self {
        Watermark::Settings(WatermarkSettings {
            strength,
            image_url: image_url.into(),
        })
    }
}

/// Caller-supplied attributes for a new trigger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerAttributes {
    pub id: Option<String>,
    pub name: Option<String>,
    pub watermark: Option<Watermark>,
    pub subscription: Option<Value>,
}

/// A LivePaper watermark trigger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trigger {
    pub id: Option<String>,
    pub name: Option<String>,
    pub watermark: Option<Watermark>,
    pub subscription: Option<Value>,
}

#[derive(Serialize)]
struct TriggerRequest<'a> {
    trigger: TriggerDocument<'a>,
}

#[derive(Serialize)]
struct TriggerDocument<'a> {
    name: &'a str,
    watermark: WatermarkDocument<'a>,
    subscription: SubscriptionDocument,
}

#[derive(Serialize)]
struct WatermarkDocument<'a> {
    #[serde(rename = "outputImageFormat")]
    output_image_format: &'static str,
    resolution: u32,
    strength: u32,
    #[serde(rename = "imageURL")]
    image_url: &'a str,
}

#[derive(Serialize)]
struct SubscriptionDocument {
    package: &'static str,
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    id: Option<String>,
    name: Option<String>,
    watermark: Option<Watermark>,
    subscription: Option<Value>,
}

impl Trigger {
    pub fn new(attributes: TriggerAttributes) -> Self {
        Self {
            id: attributes.id,
            name: attributes.name,
            watermark: attributes.watermark,
            subscription: attributes.subscription,
        }
    }

    /// Validate and create the trigger, storing the assigned id
    pub fn save(&mut self, client: &LivePaperClient) -> LivePaperResult<()> {
        create(client, self)
    }

    /// Fetch a trigger by id; `None` when it does not exist or the call fails
    pub fn find(client: &LivePaperClient, id: &str) -> Option<Trigger> {
        fetch(client, id)
    }

    /// Build a trigger from a `{"trigger": {...}}` response document
    pub fn parse(json: &str) -> LivePaperResult<Trigger> {
        let response: TriggerResponse = serde_json::from_value(unwrap_root(json, Self::NAME)?)?;

        Ok(Trigger {
            id: response.id,
            name: response.name,
            watermark: response.watermark,
            subscription: response.subscription,
        })
    }

    /// Download the watermarked image of this trigger
    ///
    /// Unlike [`Trigger::find`], failures are returned to the caller: there
    /// is no meaningful fallback for missing image bytes.
    pub fn download_watermark(&self, client: &LivePaperClient) -> LivePaperResult<Vec<u8>> {
        let id = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingField("id"))?;

        let url = format!("{}/image", resource_url(&client.endpoints().watermark_download_url, id));
        let response = client.get(&url, "image/jpg")?;
        let bytes = response.bytes()?;

        log_info!("Downloaded watermark for trigger {} ({} bytes)", id, bytes.len());
        Ok(bytes.to_vec())
    }

    fn validate(&self) -> Result<(&str, &WatermarkSettings), ValidationError> {
        let name = self
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(ValidationError::MissingField("name"))?;

        let watermark = match &self.watermark {
            None => return Err(ValidationError::MissingField("watermark")),
            Some(Watermark::Reference(_)) => return Err(ValidationError::InvalidField("watermark")),
            Some(Watermark::Settings(settings)) => settings,
        };

        Ok((name, watermark))
    }
}

impl Resource for Trigger {
    const NAME: &'static str = "trigger";

    fn base_url(endpoints: &Endpoints) -> &str {
        &endpoints.trigger_url
    }

    fn request_body(&self) -> LivePaperResult<Value> {
        let (name, watermark) = self.validate()?;

        let request = TriggerRequest {
            trigger: TriggerDocument {
                name,
                watermark: WatermarkDocument {
                    output_image_format: WATERMARK_OUTPUT_FORMAT,
                    resolution: WATERMARK_RESOLUTION,
                    strength: watermark.strength,
                    image_url: &watermark.image_url,
                },
                subscription: SubscriptionDocument {
                    package: SUBSCRIPTION_PACKAGE,
                },
            },
        };

        Ok(serde_json::to_value(request)?)
    }

    fn parse(json: &str) -> LivePaperResult<Self> {
        Trigger::parse(json)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LivePaperError;
    use crate::resources::testing::{mock_client, stub_auth};
    use httpmock::MockServer;
    use serde_json::json;

    const TRIGGER_RESPONSE: &str = r#"{"trigger":{"id":"trigger_id","name":"name","watermark":"watermark","subscription":"subscription"}}"#;

    fn attributes() -> TriggerAttributes {
        TriggerAttributes {
            id: Some("id".into()),
            name: Some("name".into()),
            watermark: Some(Watermark::new(10, "url")),
            subscription: Some(json!("subscription")),
        }
    }

    fn new_trigger() -> Trigger {
        Trigger::new(TriggerAttributes {
            id: None,
            ..attributes()
        })
    }

    #[test]
    fn test_new_maps_attributes() {
        let trigger = Trigger::new(attributes());
        assert_eq!(trigger.watermark, Some(Watermark::new(10, "url")));
        assert_eq!(trigger.subscription, Some(json!("subscription")));
    }

    #[test]
    fn test_request_body_adds_watermark_defaults() {
        let body = new_trigger().request_body().unwrap();
        assert_eq!(
            body,
            json!({
                "trigger": {
                    "name": "name",
                    "watermark": {
                        "outputImageFormat": "JPEG",
                        "resolution": 75,
                        "strength": 10,
                        "imageURL": "url"
                    },
                    "subscription": {"package": "month"}
                }
            })
        );
    }

    #[test]
    fn test_subscription_is_always_monthly() {
        let mut trigger = new_trigger();
        trigger.subscription = Some(json!({"package": "year"}));
        let body = trigger.request_body().unwrap();
        assert_eq!(body["trigger"]["subscription"], json!({"package": "month"}));

        trigger.subscription = None;
        let body = trigger.request_body().unwrap();
        assert_eq!(body["trigger"]["subscription"], json!({"package": "month"}));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let mut trigger = new_trigger();
        trigger.name = None;
        assert!(matches!(
            trigger.request_body(),
            Err(LivePaperError::Validation(ValidationError::MissingField("name")))
        ));

        let mut trigger = new_trigger();
        trigger.watermark = None;
        assert!(matches!(
            trigger.request_body(),
            Err(LivePaperError::Validation(ValidationError::MissingField("watermark")))
        ));

        let mut trigger = new_trigger();
        trigger.watermark = Some(Watermark::Reference(json!("watermark")));
        assert!(matches!(
            trigger.request_body(),
            Err(LivePaperError::Validation(ValidationError::InvalidField("watermark")))
        ));
    }

    #[test]
    fn test_parse_passes_server_values_through() {
        let trigger = Trigger::parse(TRIGGER_RESPONSE).unwrap();
        assert_eq!(trigger.id.as_deref(), Some("trigger_id"));
        assert_eq!(trigger.name.as_deref(), Some("name"));
        assert_eq!(trigger.watermark, Some(Watermark::Reference(json!("watermark"))));
        assert_eq!(trigger.subscription, Some(json!("subscription")));
    }

    #[test]
    fn test_parse_structured_watermark() {
        let trigger = Trigger::parse(
            r#"{"trigger":{"id":"t","watermark":{"strength":3,"imageURL":"img"}}}"#,
        )
        .unwrap();
        assert_eq!(trigger.watermark, Some(Watermark::new(3, "img")));
        assert_eq!(trigger.subscription, None);
    }

    #[test]
    fn test_parse_keeps_full_server_watermark() {
        let trigger = Trigger::parse(
            r#"{"trigger":{"id":"t","watermark":{"outputImageFormat":"JPEG","resolution":75,"strength":10,"imageURL":"url"}}}"#,
        )
        .unwrap();

        let expected = json!({"outputImageFormat": "JPEG", "resolution": 75, "strength": 10, "imageURL": "url"});
        assert_eq!(trigger.watermark, Some(Watermark::Reference(expected.clone())));
        assert_eq!(serde_json::to_value(&trigger).unwrap()["watermark"], expected);
    }

    #[test]
    fn test_save_posts_body_and_keeps_id() {
        let server = MockServer::start();
        stub_auth(&server);
        let create = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/api/v1/triggers")
                .header("authorization", "Bearer test_token")
                .json_body(json!({
                    "trigger": {
                        "name": "name",
                        "watermark": {
                            "outputImageFormat": "JPEG",
                            "resolution": 75,
                            "strength": 10,
                            "imageURL": "url"
                        },
                        "subscription": {"package": "month"}
                    }
                }));
            then.status(200).body(TRIGGER_RESPONSE);
        });

        let client = mock_client(&server);
        let mut trigger = new_trigger();
        trigger.save(&client).unwrap();

        create.assert();
        assert_eq!(trigger.id.as_deref(), Some("trigger_id"));
        assert_eq!(trigger.watermark, Some(Watermark::new(10, "url")));
    }

    #[test]
    fn test_save_without_name_fails_before_request() {
        let server = MockServer::start();
        let auth = stub_auth(&server);

        let mut trigger = new_trigger();
        trigger.name = None;

        assert!(trigger.save(&mock_client(&server)).is_err());
        assert_eq!(auth.hits(), 0);
    }

    #[test]
    fn test_find_existing_trigger() {
        let server = MockServer::start();
        stub_auth(&server);
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/api/v1/triggers/trigger_id");
            then.status(200).body(TRIGGER_RESPONSE);
        });

        let trigger = Trigger::find(&mock_client(&server), "trigger_id").unwrap();
        assert_eq!(trigger.id.as_deref(), Some("trigger_id"));
        assert_eq!(trigger.name.as_deref(), Some("name"));
        assert_eq!(trigger.watermark, Some(Watermark::Reference(json!("watermark"))));
        assert_eq!(trigger.subscription, Some(json!("subscription")));
    }

    #[test]
    fn test_find_missing_trigger_is_none() {
        let server = MockServer::start();
        stub_auth(&server);
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/api/v1/triggers/trigger_not_existent");
            then.status(404).body("{}");
        });

        assert!(Trigger::find(&mock_client(&server), "trigger_not_existent").is_none());
    }

    #[test]
    fn test_find_with_unreachable_auth_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/auth/token");
            then.status(500);
        });

        assert!(Trigger::find(&mock_client(&server), "trigger_id").is_none());
    }

    #[test]
    fn test_download_watermark_returns_raw_body() {
        let server = MockServer::start();
        stub_auth(&server);
        let download = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/watermark/v1/triggers/id/image")
                .header("authorization", "Bearer test_token");
            then.status(200).body("watermark_data");
        });

        let trigger = Trigger::new(attributes());
        let bytes = trigger.download_watermark(&mock_client(&server)).unwrap();

        download.assert();
        assert_eq!(bytes, b"watermark_data");
    }

    #[test]
    fn test_download_watermark_propagates_errors() {
        let server = MockServer::start();
        stub_auth(&server);
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/watermark/v1/triggers/id/image");
            then.status(500).body("render failed");
        });

        let trigger = Trigger::new(attributes());
        let err = trigger.download_watermark(&mock_client(&server)).unwrap_err();
        assert!(matches!(err, LivePaperError::Api { status: 500, .. }));
    }

    #[test]
    fn test_download_watermark_requires_id() {
        let server = MockServer::start();
        let auth = stub_auth(&server);

        let err = new_trigger().download_watermark(&mock_client(&server)).unwrap_err();
        assert!(matches!(err, LivePaperError::Validation(ValidationError::MissingField("id"))));
        assert_eq!(auth.hits(), 0);
    }
}
