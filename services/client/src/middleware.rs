//! Request and response interceptors
//!
//! Interceptors are installed on an `ApiClient` when it is built. The two
//! session interceptors attach the bearer token to outgoing requests and
//! end the session when the backend answers an authenticated request with
//! 401.

use std::sync::Arc;

use async_trait::async_trait;
use common::storage::KeyValueStore;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::{debug, error, warn};

use crate::api::{ApiRequest, BodyEncoding};
use crate::error::{ClientError, ClientResult};
use crate::navigation::{Navigator, Route};
use crate::session::{SessionState, TOKEN_KEY};

/// Runs before a request is sent
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Registration key; a client holds at most one interceptor per name
    fn name(&self) -> &'static str;

    async fn on_request(&self, request: &mut ApiRequest) -> ClientResult<()>;
}

/// What a response interceptor sees of a completed exchange
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    /// Bearer token the request carried, if any
    pub bearer: Option<String>,
}

impl Exchange {
    pub fn is_authenticated(&self) -> bool {
        self.bearer.is_some()
    }
}

/// Runs after a response arrives, before the caller sees it
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// Registration key; a client holds at most one interceptor per name
    fn name(&self) -> &'static str;

    async fn on_response(&self, exchange: &Exchange);
}

/// Attaches the stored bearer token
///
/// When a token is present the request body is also switched to multipart
/// encoding, for every authenticated request regardless of its payload.
pub struct BearerTokenInterceptor {
    store: Arc<dyn KeyValueStore>,
}

impl BearerTokenInterceptor {
    pub const NAME: &'static str = "bearer-token";

    /// Endpoints that establish a session and must never carry an old one
    pub const CREDENTIAL_PATHS: [&'static str; 2] = ["/auth/login", "/auth/register"];

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestInterceptor for BearerTokenInterceptor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn on_request(&self, request: &mut ApiRequest) -> ClientResult<()> {
        if Self::CREDENTIAL_PATHS.contains(&request.path.as_str()) {
            return Ok(());
        }

        let Some(token) = self.store.get(TOKEN_KEY).await? else {
            return Ok(());
        };
        if token.is_empty() {
            return Ok(());
        }

        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            error!("Stored token is not a valid header value");
            ClientError::Unauthorized
        })?;
        request.headers.insert(AUTHORIZATION, value);
        request.encoding = BodyEncoding::Multipart;

        Ok(())
    }
}

/// Ends the session when an authenticated request gets a 401
///
/// Clears the stored session, sends the app to the welcome route, and lets
/// the original error continue to the caller. A 401 for a token that is no
/// longer the current one is ignored.
pub struct UnauthorizedInterceptor {
    session: SessionState,
    navigator: Arc<dyn Navigator>,
}

impl UnauthorizedInterceptor {
    pub const NAME: &'static str = "unauthorized-redirect";

    pub fn new(session: SessionState, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

#[async_trait]
impl ResponseInterceptor for UnauthorizedInterceptor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn on_response(&self, exchange: &Exchange) {
        let Some(bearer) = exchange.bearer.as_deref() else {
            return;
        };
        if exchange.status != StatusCode::UNAUTHORIZED {
            return;
        }

        match self.session.clear_if_token(bearer).await {
            Ok(true) => {
                warn!(
                    "{} {} was rejected with 401, session ended",
                    exchange.method, exchange.path
                );
                self.navigator.navigate(Route::Welcome);
            }
            Ok(false) => {
                debug!(
                    "{} {} was rejected with 401 for a replaced token, ignoring",
                    exchange.method, exchange.path
                );
            }
            Err(e) => {
                error!("Failed to clear stored session after 401: {}", e);
                self.navigator.navigate(Route::Welcome);
            }
        }
    }
}
