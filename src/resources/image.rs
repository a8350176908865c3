//! Image upload proxy for LivePaper storage

use reqwest::header;

use crate::client::{LivePaperClient, LivePaperError, LivePaperResult};
use crate::{log_debug, log_warn};

const IMAGE_CONTENT_TYPE: &str = "image/jpg";

/// Images hosted in LivePaper storage
pub struct Image;

impl Image {
    /// Copy the image at `url` into LivePaper storage and return its new URL
    ///
    /// URLs already in storage are returned untouched without any request.
    /// The copy is best effort: on any failure the original `url` is
    /// returned and the error is logged.
    pub fn upload(client: &LivePaperClient, url: &str) -> String {
        if Self::is_stored(client, url) {
            log_debug!("Image already in LivePaper storage: {}", url);
            return url.to_string();
        }

        match Self::try_upload(client, url) {
            Ok(location) => location,
            Err(e) => {
                log_warn!("Image upload failed for {}, keeping original URL: {}", url, e);
                url.to_string()
            }
        }
    }

    /// True when `url` already points into LivePaper storage
    pub fn is_stored(client: &LivePaperClient, url: &str) -> bool {
        url.contains(client.endpoints().storage_url.as_str())
    }

    fn try_upload(client: &LivePaperClient, url: &str) -> LivePaperResult<String> {
        let source = client
            .http()
            .get(url)
            .header(header::ACCEPT, IMAGE_CONTENT_TYPE)
            .send()?;
        let image = LivePaperClient::ensure_success(source)?.bytes()?;

        let response = client.post_bytes(
            &client.endpoints().storage_url,
            IMAGE_CONTENT_TYPE,
            image.to_vec(),
        )?;

        let location = response
            .headers()
            .get(header::LOCATION)
            .ok_or_else(|| LivePaperError::InvalidResponse("storage response has no Location header".into()))?
            .to_str()
            .map_err(|e| LivePaperError::InvalidResponse(format!("unreadable Location header: {}", e)))?;

        log_debug!("Uploaded {} to {}", url, location);
        Ok(location.to_string())
    }
}
