use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::ApiError;

pub const SESSION_ID_HEADER: &str = "x-session-id";
const MAX_SESSION_ID_LEN: usize = 128;

/// Session identity extracted from the `X-Session-Id` header. The client
/// owns the identifier; the server only uses it to key the cart store.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::BadRequest("missing X-Session-Id header".to_string()))?;

        if value.len() > MAX_SESSION_ID_LEN {
            return Err(ApiError::BadRequest("session id too long".to_string()));
        }

        Ok(SessionId(value.to_string()))
    }
}
