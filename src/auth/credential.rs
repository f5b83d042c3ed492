//! Credential record and validity rules.

use serde::{Deserialize, Serialize};

/// Proof of a successful authentication.
///
/// The record is what gets cached on disk between processes, so it keeps
/// the strategy-specific fields optional and tolerates keys it does not
/// interpret: a file written by a richer strategy round-trips losslessly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Unix seconds when this credential was obtained.
    pub received_at: i64,
    /// Unix seconds after which the credential is stale. Absent means it
    /// never expires (basic auth).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
    /// Literal value for the `Authorization` header.
    pub auth_header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Encoded `username:secret` pair for basic auth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Keys this crate does not interpret, preserved across save/load.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Credential {
    /// Basic-auth credential. Never expires.
    pub fn basic(username: impl Into<String>, cred_string: impl Into<String>, now: i64) -> Self {
        let cred_string = cred_string.into();
        Self {
            received_at: now,
            expiry: None,
            auth_header: format!("Basic {cred_string}"),
            username: Some(username.into()),
            cred_string: Some(cred_string),
            access_token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Bearer-token credential expiring `expires_in` seconds from `now`.
    pub fn bearer(access_token: impl Into<String>, expires_in: i64, now: i64) -> Self {
        let access_token = access_token.into();
        Self {
            received_at: now,
            expiry: Some(now + expires_in),
            auth_header: format!("Bearer {access_token}"),
            username: None,
            cred_string: None,
            access_token: Some(access_token),
            extra: serde_json::Map::new(),
        }
    }

    /// A credential is expired once its expiry is reached. No expiry means
    /// never.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    /// Valid iff not expired. An invalid credential must never authorize a
    /// call.
    pub fn is_valid(&self, now: i64) -> bool {
        !self.is_expired(now)
    }
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_never_expires() {
        let cred = Credential::basic("user", "dXNlcjpwYXNz", 1000);
        assert_eq!(cred.auth_header, "Basic dXNlcjpwYXNz");
        assert_eq!(cred.expiry, None);
        assert!(cred.is_valid(i64::MAX));
    }

    #[test]
    fn test_bearer_expiry_window() {
        let cred = Credential::bearer("abc", 120, 1000);
        assert_eq!(cred.auth_header, "Bearer abc");
        assert_eq!(cred.expiry, Some(1120));
        assert!(cred.is_valid(1119));
        assert!(cred.is_expired(1120));
        assert!(cred.is_expired(2000));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        // expiry > now is the validity condition, so expiry == now is stale.
        let cred = Credential::bearer("abc", 0, 500);
        assert!(!cred.is_valid(500));
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = r#"{
            "received_at": 1000,
            "expiry": 4600,
            "auth_header": "Bearer abc",
            "access_token": "abc",
            "token_type": "Bearer",
            "scope": "orders:read"
        }"#;

        let cred: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(cred.extra["token_type"], "Bearer");

        let rewritten = serde_json::to_string(&cred).unwrap();
        let reparsed: Credential = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(cred, reparsed);
        assert_eq!(reparsed.extra["scope"], "orders:read");
    }
}
