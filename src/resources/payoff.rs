//! Payoffs: what a reader gets after scanning a LivePaper trigger
//!
//! A payoff is either a plain web redirect (`WEB_PAYOFF`) or a rich payoff
//! (`RICH_PAYOFF`) that carries an opaque private document next to its
//! public URL. The two kinds use different request documents:
//!
//! ```text
//! WEB:  {"payoff": {"name": .., "URL": ..}}
//! RICH: {"payoff": {"name": .., "richPayoff": {"version": 1,
//!         "private": {"content-type": .., "data": base64(json(data))},
//!         "public": {"url": ..}}}}
//! ```

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::{Resource, create, fetch, unwrap_root};
use crate::client::{LivePaperClient, LivePaperResult, ValidationError};
use crate::config::Endpoints;

const RICH_PAYOFF_VERSION: u32 = 1;

/// Known payoff kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoffType {
    Web,
    Rich,
}

impl PayoffType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PayoffType::Web => "WEB_PAYOFF",
            PayoffType::Rich => "RICH_PAYOFF",
        }
    }
}

impl fmt::Display for PayoffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEB_PAYOFF" => Ok(PayoffType::Web),
            "RICH_PAYOFF" => Ok(PayoffType::Rich),
            other => Err(ValidationError::UnsupportedType(other.to_string())),
        }
    }
}

/// Caller-supplied attributes for a new payoff
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoffAttributes {
    pub id: Option<String>,
    pub name: Option<String>,
    pub payoff_type: Option<String>,
    pub url: Option<String>,
    pub data_type: Option<String>,
    pub data: Option<Value>,
}

/// A LivePaper payoff
///
/// Every field is optional so that incomplete payoffs can be built and are
/// rejected by [`Payoff::save`] with a [`ValidationError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payoff {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub payoff_type: Option<String>,
    pub url: Option<String>,
    pub data_type: Option<String>,
    pub data: Option<Value>,
}

/// Validated payoff content, one variant per payoff kind
#[derive(Debug, PartialEq)]
enum PayoffContent<'a> {
    Web {
        url: &'a str,
    },
    Rich {
        url: &'a str,
        data_type: &'a str,
        data: &'a Value,
    },
}

#[derive(Serialize)]
struct PayoffRequest<'a> {
    payoff: PayoffDocument<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PayoffDocument<'a> {
    Web {
        name: &'a str,
        #[serde(rename = "URL")]
        url: &'a str,
    },
    Rich {
        name: &'a str,
        #[serde(rename = "richPayoff")]
        rich_payoff: RichPayoff<'a>,
    },
}

#[derive(Serialize)]
struct RichPayoff<'a> {
    version: u32,
    private: RichPrivate,
    public: RichPublic<'a>,
}

#[derive(Serialize)]
struct RichPrivate {
    #[serde(rename = "content-type")]
    content_type: String,
    data: String,
}

#[derive(Serialize)]
struct RichPublic<'a> {
    url: &'a str,
}

/// Payoff as returned by the API
#[derive(Debug, Deserialize)]
struct PayoffResponse {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "richPayoff")]
    rich_payoff: Option<RichPayoffResponse>,
}

#[derive(Debug, Deserialize)]
struct RichPayoffResponse {
    private: Option<RichPrivateResponse>,
    public: Option<RichPublicResponse>,
}

#[derive(Debug, Deserialize)]
struct RichPrivateResponse {
    #[serde(rename = "content-type")]
    content_type: Option<String>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RichPublicResponse {
    url: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Payoff {
    pub fn new(attributes: PayoffAttributes) -> Self {
        Self {
            id: attributes.id,
            name: attributes.name,
            payoff_type: attributes.payoff_type,
            url: attributes.url,
            data_type: attributes.data_type,
            data: attributes.data,
        }
    }

    /// Parsed payoff kind, if the type is set and known
    pub fn kind(&self) -> Option<PayoffType> {
        self.payoff_type.as_deref().and_then(|t| t.parse().ok())
    }

    /// Validate and create the payoff, storing the assigned id
    pub fn save(&mut self, client: &LivePaperClient) -> LivePaperResult<()> {
        create(client, self)
    }

    /// Fetch a payoff by id; `None` when it does not exist or the call fails
    pub fn get(client: &LivePaperClient, id: &str) -> Option<Payoff> {
        fetch(client, id)
    }

    /// Build a payoff from a `{"payoff": {...}}` response document
    pub fn parse(json: &str) -> LivePaperResult<Payoff> {
        let response: PayoffResponse = serde_json::from_value(unwrap_root(json, Self::NAME)?)?;

        let mut payoff = Payoff {
            id: response.id,
            name: response.name,
            ..Payoff::default()
        };

        match response.rich_payoff {
            Some(rich) => {
                payoff.payoff_type = Some(PayoffType::Rich.to_string());
                payoff.url = rich.public.and_then(|public| public.url);
                if let Some(private) = rich.private {
                    payoff.data_type = private.content_type;
                    payoff.data = private.data.as_deref().map(decode_data).transpose()?;
                }
            }
            None => {
                payoff.payoff_type = Some(PayoffType::Web.to_string());
                payoff.url = response.url;
            }
        }

        Ok(payoff)
    }

    fn validate(&self) -> Result<(&str, PayoffContent<'_>), ValidationError> {
        let name = present(&self.name).ok_or(ValidationError::MissingField("name"))?;
        let payoff_type = present(&self.payoff_type).ok_or(ValidationError::MissingField("type"))?;
        let url = present(&self.url).ok_or(ValidationError::MissingField("url"))?;

        let content = match payoff_type.parse::<PayoffType>()? {
            PayoffType::Web => PayoffContent::Web { url },
            PayoffType::Rich => {
                let data_type = present(&self.data_type).ok_or(ValidationError::MissingField("data_type"))?;
                let data = self
                    .data
                    .as_ref()
                    .filter(|data| !data.is_null())
                    .ok_or(ValidationError::MissingField("data"))?;
                PayoffContent::Rich { url, data_type, data }
            }
        };

        Ok((name, content))
    }
}

impl Resource for Payoff {
    const NAME: &'static str = "payoff";

    fn base_url(endpoints: &Endpoints) -> &str {
        &endpoints.payoff_url
    }

    fn request_body(&self) -> LivePaperResult<Value> {
        let (name, content) = self.validate()?;

        let payoff = match content {
            PayoffContent::Web { url } => PayoffDocument::Web { name, url },
            PayoffContent::Rich { url, data_type, data } => PayoffDocument::Rich {
                name,
                rich_payoff: RichPayoff {
                    version: RICH_PAYOFF_VERSION,
                    private: RichPrivate {
                        content_type: data_type.to_string(),
                        data: encode_data(data)?,
                    },
                    public: RichPublic { url },
                },
            },
        };

        Ok(serde_json::to_value(PayoffRequest { payoff })?)
    }

    fn parse(json: &str) -> LivePaperResult<Self> {
        Payoff::parse(json)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

/// Characters per line of MIME-wrapped base64
const BASE64_LINE_WIDTH: usize = 60;

/// base64(json(data)) for the private rich payoff document, wrapped into
/// newline-terminated 60 character lines as the API stores it
fn encode_data(data: &Value) -> LivePaperResult<String> {
    let json = serde_json::to_vec(data)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(json);

    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % BASE64_LINE_WIDTH == 0 {
            wrapped.push('\n');
        }
        wrapped.push(c);
    }
    if !wrapped.is_empty() {
        wrapped.push('\n');
    }
    Ok(wrapped)
}

fn decode_data(encoded: &str) -> LivePaperResult<Value> {
    // The API may hand back MIME-wrapped base64.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let json = base64::engine::general_purpose::STANDARD.decode(compact)?;
    Ok(serde_json::from_slice(&json)?)
}
