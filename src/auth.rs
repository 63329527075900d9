//! Shared-credential authentication with an idle timeout.
//!
//! A single credential pair gates a per-session identity. The session stays
//! valid as long as authenticated requests keep arriving; after four idle
//! hours the next check fails and clears the identity. The clock is passed in
//! explicitly so tests can simulate the timeout.

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;

/// Idle timeout measured from the last authenticated request.
const SESSION_IDLE_HOURS: i64 = 4;

#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AuthState {
    identity: Option<Identity>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the credential pair; on success the session identity is set
    /// and the activity stamp starts the idle window.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        config: &Config,
        now: DateTime<Utc>,
    ) -> bool {
        if username == config.username && password == config.password {
            self.identity = Some(Identity {
                username: username.to_string(),
                last_activity: now,
            });
            true
        } else {
            false
        }
    }

    /// Returns whether the session is still authenticated. A valid check
    /// refreshes the activity stamp; a timed-out one clears the identity.
    pub fn check(&mut self, now: DateTime<Utc>) -> bool {
        let Some(identity) = self.identity.as_mut() else {
            return false;
        };
        if now - identity.last_activity > Duration::hours(SESSION_IDLE_HOURS) {
            self.identity = None;
            return false;
        }
        identity.last_activity = now;
        true
    }

    pub fn logout(&mut self) {
        self.identity = None;
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn login_rejects_wrong_credentials() {
        let mut auth = AuthState::new();
        let now = Utc::now();
        assert!(!auth.login("admin", "wrong", &config(), now));
        assert!(!auth.check(now));
        assert!(auth.login("admin", "password123", &config(), now));
        assert!(auth.check(now));
        assert_eq!(auth.username(), Some("admin"));
    }

    #[test]
    fn activity_inside_window_keeps_session_alive() {
        let mut auth = AuthState::new();
        let t0 = Utc::now();
        assert!(auth.login("admin", "password123", &config(), t0));

        // Each check refreshes the stamp, so repeated 3-hour gaps never
        // cross the 4-hour idle limit.
        let t1 = t0 + Duration::hours(3);
        assert!(auth.check(t1));
        let t2 = t1 + Duration::hours(3);
        assert!(auth.check(t2));
    }

    #[test]
    fn idle_timeout_clears_identity() {
        let mut auth = AuthState::new();
        let t0 = Utc::now();
        assert!(auth.login("admin", "password123", &config(), t0));

        let later = t0 + Duration::hours(4) + Duration::minutes(1);
        assert!(!auth.check(later));
        assert_eq!(auth.username(), None);
        // Still logged out on the next check.
        assert!(!auth.check(later));
    }

    #[test]
    fn logout_clears_identity() {
        let mut auth = AuthState::new();
        let now = Utc::now();
        assert!(auth.login("admin", "password123", &config(), now));
        auth.logout();
        assert!(!auth.check(now));
    }
}
