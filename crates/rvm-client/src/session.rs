//! Session state: identity, access token, expiry tracking
//!
//! One [`Session`] is owned exclusively by one client instance. It is
//! created empty at construction, populated on the first successful login,
//! and re-populated on every re-login within the client's lifetime.

use chrono::{DateTime, Utc};

/// Zero template the username is spliced into: 49 zero characters and a `#`
const LOGIN_ID_TEMPLATE: &str = "0000000000000000000000000000000000000000000000000#";

/// Derive the fixed-width login identifier from a username.
///
/// The username replaces the leading characters of the zero template, so
/// `"abc"` becomes 46 zeros, `#`, `abc` — always 50 characters wide.
pub fn derive_login_id(username: &str) -> String {
    if username.len() >= LOGIN_ID_TEMPLATE.len() {
        return username.to_string();
    }
    format!("{}{}", &LOGIN_ID_TEMPLATE[username.len()..], username)
}

/// Authenticated identity and token state shared across all calls for one
/// logged-in user
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Derived login identifier, replaced by the server-assigned uid after
    /// the first successful login
    pub login_id: String,
    /// Opaque access token; empty until login succeeds
    pub token: String,
    /// Absent means the token never expires for this run
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(username: &str) -> Self {
        Self {
            login_id: derive_login_id(username),
            token: String::new(),
            token_expires_at: None,
        }
    }

    /// Whether a token refresh is due at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_some_and(|expires| expires < now)
    }

    /// Record a successful login.
    ///
    /// The token always overwrites the previous one; the expiry is updated
    /// only when the server supplied one, and the server-assigned uid (when
    /// present) replaces the derived login identifier for all further calls.
    pub fn authenticate(
        &mut self,
        uid: Option<String>,
        token: String,
        expires_at: Option<DateTime<Utc>>,
    ) {
        if let Some(uid) = uid {
            self.login_id = uid;
        }
        self.token = token;
        if expires_at.is_some() {
            self.token_expires_at = expires_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn short_username_is_zero_padded_to_fixed_width() {
        let id = derive_login_id("abc");
        assert_eq!(id.len(), 50);
        assert_eq!(id, format!("{}#abc", "0".repeat(46)));
    }

    #[test]
    fn oversized_username_is_passed_through() {
        let long = "x".repeat(60);
        assert_eq!(derive_login_id(&long), long);
    }

    #[test]
    fn absent_expiry_never_triggers_refresh() {
        let mut session = Session::new("abc");
        session.authenticate(None, "tok".into(), None);
        assert!(!session.is_expired(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn past_expiry_triggers_refresh() {
        let now = Utc::now();
        let mut session = Session::new("abc");
        session.authenticate(None, "tok".into(), Some(now - Duration::seconds(1)));
        assert!(session.is_expired(now));

        session.authenticate(None, "tok2".into(), Some(now + Duration::hours(1)));
        assert!(!session.is_expired(now));
        assert_eq!(session.token, "tok2");
    }

    #[test]
    fn server_uid_replaces_derived_identifier() {
        let mut session = Session::new("abc");
        let derived = session.login_id.clone();
        session.authenticate(Some("uid-from-server".into()), "tok".into(), None);
        assert_ne!(session.login_id, derived);
        assert_eq!(session.login_id, "uid-from-server");
    }
}
