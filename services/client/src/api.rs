//! B-Ticket REST API client
//!
//! `ApiClient` is built once, fully configured, by `ApiClientBuilder`. Every
//! call goes through the installed request interceptors, is sent, passes
//! the response interceptors, and is then decoded into a typed body or
//! translated into a `ClientError`.

use std::sync::Arc;

use common::config::ClientConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult, GENERIC_FAILURE};
use crate::middleware::{
    BearerTokenInterceptor, Exchange, RequestInterceptor, ResponseInterceptor,
    UnauthorizedInterceptor,
};
use crate::models::envelope::ErrorBody;
use crate::navigation::Navigator;
use crate::session::SessionState;

/// How the request body goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Multipart,
}

/// Value of one multipart field
#[derive(Debug, Clone)]
pub enum PartValue {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

/// One multipart field
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                bytes,
                file_name: file_name.into(),
                mime_type: mime_type.into(),
            },
        }
    }
}

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<FormPart>),
}

/// A request before interceptors and transport
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub encoding: BodyEncoding,
    /// Message used when the backend does not supply one
    pub fallback_message: &'static str,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            method,
            path: path.into(),
            headers,
            body: RequestBody::Empty,
            encoding: BodyEncoding::Json,
            fallback_message: GENERIC_FAILURE,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON-serializable body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ClientResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach multipart fields
    pub fn form(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Form(parts);
        self.encoding = BodyEncoding::Multipart;
        self
    }

    /// Message shown when the call fails without a backend message
    pub fn fallback(mut self, message: &'static str) -> Self {
        self.fallback_message = message;
        self
    }

    /// Whether a bearer credential is attached
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// Token of the attached `Authorization: Bearer` header
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

/// Builder for `ApiClient`
pub struct ApiClientBuilder {
    base_url: String,
    http: Option<Client>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    /// Use a preconfigured `reqwest::Client`
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Register a request interceptor; a second one with the same name is ignored
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        if self
            .request_interceptors
            .iter()
            .any(|existing| existing.name() == interceptor.name())
        {
            debug!("Request interceptor {} already registered", interceptor.name());
        } else {
            self.request_interceptors.push(interceptor);
        }
        self
    }

    /// Register a response interceptor; a second one with the same name is ignored
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        if self
            .response_interceptors
            .iter()
            .any(|existing| existing.name() == interceptor.name())
        {
            debug!("Response interceptor {} already registered", interceptor.name());
        } else {
            self.response_interceptors.push(interceptor);
        }
        self
    }

    /// Install the bearer-token and 401-redirect interceptors for a session
    pub fn session_interceptors(
        self,
        session: &SessionState,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        self.request_interceptor(Arc::new(BearerTokenInterceptor::new(session.store())))
            .response_interceptor(Arc::new(UnauthorizedInterceptor::new(
                session.clone(),
                navigator,
            )))
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            http: self.http.unwrap_or_default(),
            base_url: self.base_url,
            request_interceptors: self.request_interceptors.into(),
            response_interceptors: self.response_interceptors.into(),
        }
    }
}

/// B-Ticket API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    request_interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    response_interceptors: Arc<[Arc<dyn ResponseInterceptor>]>,
}

impl ApiClient {
    pub fn builder(config: &ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http: None,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_interceptor_count(&self) -> usize {
        self.request_interceptors.len()
    }

    pub fn response_interceptor_count(&self) -> usize {
        self.response_interceptors.len()
    }

    /// Send a request and decode the response body
    ///
    /// # Errors
    ///
    /// - `Network` when no response arrives
    /// - `Unauthorized` when an authenticated request gets a 401 (after the
    ///   response interceptors ran)
    /// - `Api` for any other non-2xx status, carrying the backend message or
    ///   the request's fallback
    /// - `Decode` when the body does not match `T`
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let span = info_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            request_id = %Uuid::new_v4(),
        );

        self.execute(request).instrument(span).await
    }

    async fn execute<T: DeserializeOwned>(&self, mut request: ApiRequest) -> ClientResult<T> {
        for interceptor in self.request_interceptors.iter() {
            interceptor.on_request(&mut request).await?;
        }

        let fallback = request.fallback_message;
        let bearer = request.bearer_token().map(str::to_string);
        let authenticated = bearer.is_some();
        let body = std::mem::take(&mut request.body);

        let builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(request.headers.clone());
        let builder = match (body, request.encoding) {
            (RequestBody::Empty, _) => builder,
            (RequestBody::Form(parts), _) => builder.multipart(build_form(parts)?),
            (RequestBody::Json(value), BodyEncoding::Multipart) if value.is_object() => {
                builder.multipart(build_form(json_to_parts(value))?)
            }
            (RequestBody::Json(value), _) => builder.json(&value),
        };

        debug!("Sending request");
        let response = builder
            .send()
            .await
            .map_err(|source| ClientError::Network {
                context: fallback,
                source,
            })?;

        let status = response.status();
        let exchange = Exchange {
            method: request.method,
            path: request.path,
            status,
            bearer,
        };
        for interceptor in self.response_interceptors.iter() {
            interceptor.on_response(&exchange).await;
        }

        if status == StatusCode::UNAUTHORIZED && authenticated {
            return Err(ClientError::Unauthorized);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Network {
                context: fallback,
                source,
            })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| fallback.to_string());
            warn!("Request failed with status {}: {}", status.as_u16(), message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(payload).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Check if the API answers at all
    pub async fn health_check(&self) -> ClientResult<bool> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|source| ClientError::Network {
                context: GENERIC_FAILURE,
                source,
            })?;

        Ok(!response.status().is_server_error())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Flatten a JSON object into multipart text fields
///
/// Nulls are omitted, scalars are sent as text, nested values as JSON.
fn json_to_parts(value: serde_json::Value) -> Vec<FormPart> {
    let serde_json::Value::Object(map) = value else {
        return Vec::new();
    };

    map.into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(FormPart::text(name, text)),
            serde_json::Value::Bool(flag) => Some(FormPart::text(name, flag.to_string())),
            serde_json::Value::Number(number) => Some(FormPart::text(name, number.to_string())),
            nested => Some(FormPart::text(name, nested.to_string())),
        })
        .collect()
}

fn build_form(parts: Vec<FormPart>) -> ClientResult<Form> {
    parts.into_iter().try_fold(Form::new(), |form, part| {
        Ok(match part.value {
            PartValue::Text(text) => form.text(part.name, text),
            PartValue::File {
                bytes,
                file_name,
                mime_type,
            } => {
                let file = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|_| {
                        ClientError::Validation(format!("Unsupported file type: {}", mime_type))
                    })?;
                form.part(part.name, file)
            }
        })
    })
}
