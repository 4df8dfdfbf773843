use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::Serialize;
use tracing::debug;

use crate::config::services::ServiceCredential;
use crate::error::RequestError;
use crate::requester::{Requester, ServiceRequest};
use crate::transport::{HttpClient, TransportRequest};
use crate::utils::constants::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTEXT};

impl<C: HttpClient> Requester<C> {
    /// Resolve the service, encode the body and attach auth headers.
    /// Nothing is sent except a token acquisition on cache miss.
    pub(crate) async fn new_request<B: Serialize>(
        &self,
        request: &ServiceRequest<B>,
    ) -> Result<TransportRequest, RequestError> {
        let credential = self.confs.lookup(&request.service)?;

        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(RequestError::Serialization)?;

        let target = format!("{}{}", credential.base_url, request.path);
        let url = Url::parse(&target).map_err(|e| RequestError::InvalidUrl {
            url: target.clone(),
            reason: e.to_string(),
        })?;

        let mut transport_request = TransportRequest::new(request.method.clone(), url);
        if let Some(body) = body {
            transport_request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
            transport_request.body = body;
        }

        self.set_request_headers(&mut transport_request, &request.service, &credential)
            .await?;

        debug!("built {} {} for service '{}'", request.method, target, request.service);
        Ok(transport_request)
    }

    /// Authorization from the cache, or from the auth endpoint on a miss.
    pub(crate) async fn set_request_headers(
        &self,
        request: &mut TransportRequest,
        service_id: &str,
        credential: &ServiceCredential,
    ) -> Result<(), RequestError> {
        let token = match self.tokens.get(service_id).await {
            Some(token) => token,
            None => {
                let token = self.request_token(service_id, credential).await?;
                self.tokens.set(service_id, &token).await;
                token
            }
        };

        insert_header(&mut request.headers, HEADER_AUTHORIZATION, &token)?;
        insert_header(&mut request.headers, HEADER_CONTEXT, &credential.context)?;
        Ok(())
    }
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), RequestError> {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
            Ok(())
        }
        Err(source) => Err(RequestError::InvalidHeader { name, source }),
    }
}
