use http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::RequestError;
use crate::requester::{Execution, Requester, ResponseEnvelope};
use crate::transport::{HttpClient, TransportRequest, TransportResponse};
use crate::utils::constants::{HEADER_PAGE_CURSOR, HEADER_TOKEN};

impl<C: HttpClient> Requester<C> {
    /// Send a built request and classify the response.
    ///
    /// The raw status is kept next to the result so the caller can decide on
    /// a retry independently of the error reported here.
    pub(crate) async fn exec_request<T: DeserializeOwned>(
        &self,
        service_id: &str,
        request: TransportRequest,
    ) -> Execution<T> {
        let url = request.url.to_string();

        let response = match self.client.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("transport failure for service '{}': {}", service_id, err);
                return Execution { status: None, result: Err(err.into()) };
            }
        };

        let status = response.status;
        // opaque, forwarded even when not visible ASCII
        let page_cursor = response
            .headers
            .get(HEADER_PAGE_CURSOR)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        self.update_service_token(service_id, &response).await;

        let data = if status == StatusCode::NO_CONTENT {
            None
        } else {
            match serde_json::from_slice::<T>(&response.body) {
                Ok(data) => Some(data),
                Err(source) => {
                    debug!("response from {} [{}] is not decodable: {}", url, status, source);
                    return Execution {
                        status: Some(status),
                        result: Err(RequestError::Deserialization { url, status, source }),
                    };
                }
            }
        };

        if status.as_u16() > 299 {
            return Execution {
                status: Some(status),
                result: Err(RequestError::RequestFailed { url, status }),
            };
        }

        Execution {
            status: Some(status),
            result: Ok(ResponseEnvelope { data, page_cursor }),
        }
    }

    /// Replace the cached token with the one the service handed back, if any.
    /// Services without a cached token are left without one.
    pub(crate) async fn update_service_token(&self, service_id: &str, response: &TransportResponse) {
        let Some(token) = response.header(HEADER_TOKEN) else {
            return;
        };
        if self.tokens.refresh(service_id, token).await {
            info!("token for service '{}' refreshed from response header", service_id);
            self.record(|m| m.token_refreshes.with_label_values(&[service_id]).inc()).await;
        }
    }
}
