//! Identity middleware for axum
//!
//! The identity provider sits in front of the hub and forwards the verified
//! caller as plain headers. This layer turns them into an [`Identity`] in the
//! request extensions; requests without a user header never reach a handler.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use hub_core::{HubError, Identity};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Header carrying the user id
pub const USER_HEADER: &str = "x-hub-user";
/// Header carrying the email address
pub const EMAIL_HEADER: &str = "x-hub-email";
/// Header carrying the display name
pub const NAME_HEADER: &str = "x-hub-name";
/// Header carrying comma-separated directory groups
pub const GROUPS_HEADER: &str = "x-hub-groups";

/// Names of the gateway headers that carry the caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityHeaders {
    pub user: String,
    pub email: String,
    pub name: String,
    pub groups: String,
}

impl Default for IdentityHeaders {
    fn default() -> Self {
        Self {
            user: USER_HEADER.to_string(),
            email: EMAIL_HEADER.to_string(),
            name: NAME_HEADER.to_string(),
            groups: GROUPS_HEADER.to_string(),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Build the caller identity from request headers
pub fn extract_identity(headers: &HeaderMap, names: &IdentityHeaders) -> Option<Identity> {
    let user_id = header_value(headers, &names.user)?;
    let email = header_value(headers, &names.email).unwrap_or_default();

    let mut identity = Identity::new(user_id, email);
    if let Some(name) = header_value(headers, &names.name) {
        identity = identity.with_name(name);
    }
    if let Some(groups) = header_value(headers, &names.groups) {
        identity = identity.with_groups(
            groups
                .split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty()),
        );
    }
    Some(identity)
}

/// Identity middleware function
pub async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(identity) = extract_identity(request.headers(), &state.identity_headers) else {
        tracing::debug!(path = %request.uri().path(), "No caller identity on request");
        return Err(HubError::AuthenticationRequired.into());
    };

    tracing::trace!(user_id = %identity.user_id, groups = identity.groups.len(), "Caller identified");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_extract_full_identity() {
        let map = headers(&[
            (USER_HEADER, "alice"),
            (EMAIL_HEADER, "alice@example.gov"),
            (NAME_HEADER, "Alice A."),
            (GROUPS_HEADER, "DMV_Staff, Compliance ,,"),
        ]);

        let identity = extract_identity(&map, &IdentityHeaders::default()).unwrap();
        assert_eq!(identity.user_id, "alice");
        assert_eq!(identity.email, "alice@example.gov");
        assert_eq!(identity.display_name.as_deref(), Some("Alice A."));
        assert_eq!(identity.groups, vec!["DMV_Staff", "Compliance"]);
    }

    #[test]
    fn test_missing_user_is_anonymous() {
        let map = headers(&[(EMAIL_HEADER, "a@example.gov")]);
        assert!(extract_identity(&map, &IdentityHeaders::default()).is_none());

        let blank = headers(&[(USER_HEADER, "   ")]);
        assert!(extract_identity(&blank, &IdentityHeaders::default()).is_none());
    }

    #[test]
    fn test_custom_header_names() {
        let names = IdentityHeaders {
            user: "x-forwarded-user".into(),
            ..IdentityHeaders::default()
        };
        let map = headers(&[("x-forwarded-user", "bob")]);
        let identity = extract_identity(&map, &names).unwrap();
        assert_eq!(identity.user_id, "bob");
        assert!(identity.groups.is_empty());
    }
}
