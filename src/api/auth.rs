//! HTTP Basic authentication gate
//!
//! Only the password is checked; the username is ignored.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::ApiError;

/// Holds only a SHA-256 digest of the password. Candidates are hashed and
/// compared in constant time.
#[derive(Clone)]
pub struct BasicAuth {
    digest: [u8; 32],
}

fn password_digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

impl BasicAuth {
    pub fn new(password: &str) -> Self {
        Self {
            digest: password_digest(password),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        password_digest(candidate)[..].ct_eq(&self.digest[..]).into()
    }

    pub fn check(&self, headers: &HeaderMap) -> bool {
        password_from_headers(headers).map_or(false, |given| self.matches(&given))
    }
}

pub(super) async fn basic_auth(State(auth): State<BasicAuth>, req: Request, next: Next) -> Response {
    if !auth.check(req.headers()) {
        warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "rejected request with missing or invalid credentials"
        );
        return ApiError::Unauthorized.into_response();
    }
    next.run(req).await
}

/// Extract the password from an `Authorization: Basic ...` header.
fn password_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (_user, password) = credentials.split_once(':')?;
    Some(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn basic(credentials: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode(credentials));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn test_matches_exact_password_only() {
        let auth = BasicAuth::new("secret");
        assert!(auth.matches("secret"));
        assert!(!auth.matches("Secret"));
        assert!(!auth.matches("secre"));
        assert!(!auth.matches("secrets"));
        assert!(!auth.matches(""));
        assert!(BasicAuth::new("").matches(""));
    }

    #[test]
    fn test_username_is_ignored() {
        let auth = BasicAuth::new("hunter2");
        assert!(auth.check(&basic(":hunter2")));
        assert!(auth.check(&basic("anyone:hunter2")));
        // passwords may themselves contain colons
        assert!(BasicAuth::new("a:b").check(&basic("user:a:b")));
    }

    #[test]
    fn test_rejects_missing_wrong_and_malformed_credentials() {
        let auth = BasicAuth::new("hunter2");
        assert!(!auth.check(&HeaderMap::new()));
        assert!(!auth.check(&basic("user:wrong")));
        assert!(!auth.check(&basic("no-colon")));

        let mut bearer = HeaderMap::new();
        bearer.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer hunter2"));
        assert!(!auth.check(&bearer));

        let mut garbage = HeaderMap::new();
        garbage.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic %%%"));
        assert!(!auth.check(&garbage));
    }
}
