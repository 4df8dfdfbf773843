use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, StatusCode};
use reqwest::Url;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::services::ServiceCredential;
use crate::error::AuthError;
use crate::requester::Requester;
use crate::transport::{HttpClient, TransportRequest};
use crate::utils::constants::{AUTH_GENERATE_PATH, CONTENT_TYPE_JSON, HEADER_TOKEN};

#[derive(Serialize)]
struct AuthPayload<'a> {
    token: &'a str,
    secret: &'a str,
}

impl<C: HttpClient> Requester<C> {
    /// Exchange the service credentials for a bearer token.
    ///
    /// Succeeds only on 204 No Content with a non-empty `X-Token` header.
    /// The token cache is left alone, storing the token is up to the caller.
    pub(crate) async fn request_token(
        &self,
        service_id: &str,
        credential: &ServiceCredential,
    ) -> Result<String, AuthError> {
        let result = self.exchange_credentials(credential).await;
        match &result {
            Ok(_) => {
                info!("token issued for service '{}'", service_id);
                self.record(|m| m.token_acquisitions.with_label_values(&[service_id]).inc()).await;
            }
            Err(err) => {
                warn!("token acquisition for service '{}' failed: {}", service_id, err);
                self.record(|m| m.token_acquisition_failures.with_label_values(&[service_id]).inc()).await;
            }
        }
        result
    }

    async fn exchange_credentials(&self, credential: &ServiceCredential) -> Result<String, AuthError> {
        let target = format!("{}{}", credential.base_url, AUTH_GENERATE_PATH);
        let url = Url::parse(&target).map_err(|e| AuthError::InvalidUrl {
            url: target.clone(),
            reason: e.to_string(),
        })?;

        let payload = AuthPayload {
            token: &credential.token,
            secret: &credential.secret,
        };
        let mut request = TransportRequest::new(Method::POST, url);
        request.body = serde_json::to_vec(&payload).map_err(AuthError::Payload)?;
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));

        let response = self.client.send(request).await?;

        let token = response.header(HEADER_TOKEN).filter(|token| !token.is_empty());
        match token {
            Some(token) if response.status == StatusCode::NO_CONTENT => Ok(token.to_owned()),
            _ => Err(AuthError::Rejected {
                url: target,
                status: response.status,
                token_present: token.is_some(),
            }),
        }
    }
}
