use super::{LocateError, PositionProvider};
use crate::geo::Coordinate;
use async_trait::async_trait;
use serde::Deserialize;

/// Lookup response (ipapi-style: top-level `latitude` / `longitude`)
#[derive(Deserialize, Debug)]
struct LookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Resolves the position from a JSON lookup endpoint
pub struct HttpPositionProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpPositionProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl PositionProvider for HttpPositionProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn current_position(&self) -> Result<Coordinate, LocateError> {
        tracing::debug!("Requesting position from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LocateError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LocateError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocateError::Unavailable(format!("lookup returned {}", status)));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| LocateError::Unavailable(e.to_string()))?;

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(LocateError::Unavailable(
                "lookup response missing coordinates".to_string(),
            )),
        }
    }
}
