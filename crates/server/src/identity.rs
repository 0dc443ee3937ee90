use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use models::identity::normalize_email;
use models::role::Role;
use serde::Deserialize;
use std::convert::Infallible;
use std::str::FromStr;

/// Resolved caller identity. The email is normalized; the role comes from a
/// claim or override header and is `None` whenever it cannot be resolved —
/// the guard treats that as unauthenticated. There is no privileged
/// fallback.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Claims consumed from a decoded bearer token. Token validation is the
/// identity provider's job upstream; only the claims are read here.
#[derive(Debug, Deserialize)]
struct BearerClaims {
    email: Option<String>,
    #[serde(rename = "custom:role")]
    custom_role: Option<String>,
    role: Option<String>,
}

impl Identity {
    /// Resolves identity from a request's headers. The `X-User-Email` /
    /// `X-User-Role` override headers (testing/integration path) take
    /// priority and are honored identically to the token path.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let claims = bearer_claims(headers);

        let email = header_str(headers, "x-user-email")
            .map(str::to_owned)
            .or_else(|| claims.as_ref().and_then(|c| c.email.clone()))
            .map(|e| normalize_email(&e));

        let role = header_str(headers, "x-user-role")
            .map(str::to_owned)
            .or_else(|| {
                claims
                    .as_ref()
                    .and_then(|c| c.custom_role.clone().or_else(|| c.role.clone()))
            })
            .and_then(|r| Role::from_str(&r).ok());

        Self { email, role }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn bearer_claims(headers: &HeaderMap) -> Option<BearerClaims> {
    let auth = header_str(headers, "authorization")?;
    let token = auth.strip_prefix("Bearer ")?;
    decode_claims(token)
}

/// Decodes the payload segment of a JWT without verifying the signature.
fn decode_claims(token: &str) -> Option<BearerClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
