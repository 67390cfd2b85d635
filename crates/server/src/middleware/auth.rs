use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::AppError,
    services::token::{self, TokenError},
    AppState, BODY_LIMIT,
};

/// Identity resolved by the auth middleware, available to handlers as an
/// extractor. Only the user id travels downstream, never the raw token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
}

/// Outcome of locating and verifying a session token. Absent and rejected
/// are distinct so clients can tell "log in first" from "log in again".
#[derive(Debug)]
pub enum TokenCheck {
    Absent,
    Invalid(TokenError),
    Valid(String),
}

/// Pure token resolution: first present candidate wins (header, cookie,
/// body), then signature and expiry are checked against the secret.
pub fn check_token(
    header: Option<&str>,
    cookie: Option<&str>,
    body: Option<&str>,
    secret: &str,
) -> TokenCheck {
    let candidate = header.or(cookie).or(body);

    match candidate {
        None => TokenCheck::Absent,
        Some(raw) => match token::verify(raw, secret) {
            Ok(user_id) => TokenCheck::Valid(user_id),
            Err(err) => TokenCheck::Invalid(err),
        },
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();

    let bearer = parts
        .headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    let cookie = CookieJar::from_headers(&parts.headers)
        .get("token")
        .map(|c| c.value().to_owned());

    // Body fallback: buffer it (bounded), peek at a `token` field, then hand
    // the same bytes on to the handler.
    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| AppError::Validation("Request body too large".to_string()))?;
    let body_token = token_from_body(&bytes);

    let check = check_token(
        bearer.as_deref(),
        cookie.as_deref(),
        body_token.as_deref(),
        &state.config.jwt_secret,
    );

    let user_id = match check {
        TokenCheck::Absent => {
            return Err(AppError::Unauthorized(
                "Unauthorized: missing token.".to_string(),
            ))
        }
        TokenCheck::Invalid(TokenError::Expired) => {
            tracing::debug!("rejected expired token");
            return Err(AppError::Forbidden("Token expired.".to_string()));
        }
        TokenCheck::Invalid(TokenError::Invalid) => {
            tracing::warn!("rejected invalid token");
            return Err(AppError::Forbidden("Invalid token.".to_string()));
        }
        TokenCheck::Valid(user_id) => user_id,
    };

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(AuthUser { id: user_id });

    Ok(next.run(request).await)
}

fn token_from_body(bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("token")?.as_str().map(str::to_owned)
}

// Extractor for getting the authenticated user from request extensions
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token;

    const SECRET: &str = "middleware-test-secret";

    #[test]
    fn absent_when_no_candidate() {
        assert!(matches!(
            check_token(None, None, None, SECRET),
            TokenCheck::Absent
        ));
    }

    #[test]
    fn header_wins_over_cookie_and_body() {
        let good = token::issue("from-header", SECRET).expect("issue");
        let check = check_token(Some(&good), Some("junk"), Some("junk"), SECRET);
        match check {
            TokenCheck::Valid(id) => assert_eq!(id, "from-header"),
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn cookie_used_when_header_missing() {
        let good = token::issue("from-cookie", SECRET).expect("issue");
        let check = check_token(None, Some(&good), None, SECRET);
        assert!(matches!(check, TokenCheck::Valid(id) if id == "from-cookie"));
    }

    #[test]
    fn body_used_last() {
        let good = token::issue("from-body", SECRET).expect("issue");
        let check = check_token(None, None, Some(&good), SECRET);
        assert!(matches!(check, TokenCheck::Valid(id) if id == "from-body"));
    }

    #[test]
    fn present_but_bad_token_is_invalid_not_absent() {
        let check = check_token(Some("garbage"), None, None, SECRET);
        assert!(matches!(check, TokenCheck::Invalid(TokenError::Invalid)));
    }

    #[test]
    fn extracts_token_field_from_json_body() {
        let bytes = Bytes::from(r#"{"projectId":"p1","token":"abc"}"#);
        assert_eq!(token_from_body(&bytes), Some("abc".to_string()));
        assert_eq!(token_from_body(&Bytes::new()), None);
        assert_eq!(token_from_body(&Bytes::from("not json")), None);
    }
}
