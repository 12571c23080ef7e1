use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use promodesk_application::{
    DiscountGateway, DiscountLoader, DiscountUpdate, MutationOutcome, RemoteError,
};
use promodesk_core::{AppError, AppResult, DiscountId};
use promodesk_domain::{Discount, DiscountMethod};

/// HTTP adapter for the remote discount service.
///
/// Issues one request per call with no retry; the session layer owns the
/// decision to try again. Transport and decode failures come back as
/// [`AppError::Transport`] after being logged.
pub struct HttpDiscountGateway {
    http_client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl HttpDiscountGateway {
    /// Creates a gateway against `base_url`, authenticating every request
    /// with the given bearer token.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url,
            access_token: access_token.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                AppError::Validation("discount service base URL cannot be a base".to_owned())
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }
}

#[derive(Debug, Default, Deserialize)]
struct UpdateResponseBody {
    #[serde(default)]
    errors: Vec<RemoteError>,
    data: Option<UpdateResponseData>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponseData {
    #[serde(rename = "discountUpdate")]
    discount_update: Option<MutationBody>,
}

#[derive(Debug, Deserialize)]
struct MutationBody {
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<RemoteError>,
}

impl UpdateResponseBody {
    /// Folds top-level errors and mutation user errors into one ordered
    /// list; top-level errors take precedence.
    fn remote_errors(self) -> Vec<RemoteError> {
        if !self.errors.is_empty() {
            return self.errors;
        }

        self.data
            .and_then(|data| data.discount_update)
            .map(|mutation| mutation.user_errors)
            .unwrap_or_default()
    }
}

#[async_trait]
impl DiscountGateway for HttpDiscountGateway {
    async fn update_discount(
        &self,
        id: &DiscountId,
        update: DiscountUpdate,
    ) -> AppResult<MutationOutcome> {
        let url = self.endpoint(&["api", "discounts", update.method().as_str(), id.as_str()])?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "discount": update }))
            .send()
            .await
            .map_err(|error| {
                warn!(discount_id = %id, error = %error, "discount update request failed");
                AppError::Transport(format!("discount update request failed: {error}"))
            })?;

        let status = response.status();
        let body = response.json::<UpdateResponseBody>().await.map_err(|error| {
            warn!(discount_id = %id, status = %status, error = %error, "discount update response could not be decoded");
            AppError::Transport(format!(
                "discount update response could not be decoded: {error}"
            ))
        })?;

        let user_errors = body.remote_errors();
        if user_errors.is_empty() && !status.is_success() {
            warn!(discount_id = %id, status = %status, "discount update failed without user errors");
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(AppError::Unauthorized(format!(
                    "discount update rejected with status {status}"
                )));
            }
            return Err(AppError::Transport(format!(
                "discount update failed with status {status}"
            )));
        }

        Ok(MutationOutcome { user_errors })
    }

    async fn delete_discount(&self, method: DiscountMethod, id: &DiscountId) -> AppResult<()> {
        let url = self.endpoint(&["api", "discounts", method.as_str(), id.as_str()])?;
        let response = self
            .http_client
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|error| {
                warn!(discount_id = %id, error = %error, "discount delete request failed");
                AppError::Transport(format!("discount delete request failed: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(discount_id = %id, status = %status, "discount delete failed");
            return Err(AppError::Transport(format!(
                "discount delete failed with status {status}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DiscountLoader for HttpDiscountGateway {
    async fn load_discount(&self, id: &DiscountId) -> AppResult<Option<Discount>> {
        let url = self.endpoint(&["api", "discounts", id.as_str()])?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|error| {
                warn!(discount_id = %id, error = %error, "discount load request failed");
                AppError::Transport(format!("discount load request failed: {error}"))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "discount load failed with status {status}"
            )));
        }

        let discount = response.json::<Discount>().await.map_err(|error| {
            warn!(discount_id = %id, error = %error, "discount body could not be decoded");
            AppError::Transport(format!("discount body could not be decoded: {error}"))
        })?;

        Ok(Some(discount))
    }
}
