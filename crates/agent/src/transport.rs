use std::time::Duration;

use brickwise_core::errors::{ServiceError, ServiceKind};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

pub(crate) fn http_client(service: ServiceKind, timeout_secs: u64) -> Result<Client, ServiceError> {
    Client::builder().timeout(Duration::from_secs(timeout_secs)).build().map_err(|error| {
        ServiceError::Unavailable {
            service,
            reason: format!("http client could not be built: {error}"),
        }
    })
}

/// Sends `body` as JSON and decodes a JSON reply. Transport failures,
/// non-2xx statuses, and undecodable bodies all come back as `Err`.
pub(crate) async fn post_json<B, R>(
    service: ServiceKind,
    request: RequestBuilder,
    body: &B,
) -> Result<R, ServiceError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    // Error text must never carry the url: Gemini keys travel in the query.
    let response = request.json(body).send().await.map_err(|error| {
        let error = error.without_url();
        warn!(event_name = "adapter.transport_failed", service = %service, error = %error, "request failed");
        ServiceError::Transport { service, message: error.to_string() }
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(
            event_name = "adapter.status_rejected",
            service = %service,
            status = status.as_u16(),
            "service returned non-success status"
        );
        return Err(ServiceError::Status { service, status: status.as_u16() });
    }

    response.json::<R>().await.map_err(|error| {
        let error = error.without_url();
        warn!(event_name = "adapter.decode_failed", service = %service, error = %error, "response body rejected");
        ServiceError::Decode { service, message: error.to_string() }
    })
}
