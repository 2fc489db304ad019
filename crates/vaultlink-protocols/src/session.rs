//! Session lifecycle state shared across contexts through storage.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Ephemeral session record kept in the host's session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub locked: bool,
}

impl Session {
    pub fn unlocked(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            locked: false,
        }
    }

    pub fn locked() -> Self {
        Self {
            token: None,
            locked: true,
        }
    }

    /// Token usable for authenticated calls, if the session is open.
    pub fn active_token(&self) -> Option<&str> {
        if self.locked {
            return None;
        }
        self.token.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::locked()
    }
}

/// Auto-lock policy.
///
/// Stored as an integer number of minutes; the sentinel `-1` means
/// "lock when the browser closes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AutoLockPolicy {
    Minutes(u32),
    OnBrowserClose,
}

impl AutoLockPolicy {
    pub const BROWSER_CLOSE_SENTINEL: i64 = -1;
    pub const DEFAULT_MINUTES: u32 = 15;

    pub fn minutes(&self) -> Option<u32> {
        match self {
            AutoLockPolicy::Minutes(m) => Some(*m),
            AutoLockPolicy::OnBrowserClose => None,
        }
    }

    pub fn is_browser_close(&self) -> bool {
        matches!(self, AutoLockPolicy::OnBrowserClose)
    }
}

impl Default for AutoLockPolicy {
    fn default() -> Self {
        AutoLockPolicy::Minutes(Self::DEFAULT_MINUTES)
    }
}

impl TryFrom<i64> for AutoLockPolicy {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == Self::BROWSER_CLOSE_SENTINEL {
            return Ok(AutoLockPolicy::OnBrowserClose);
        }
        match u32::try_from(value) {
            Ok(m) if m > 0 => Ok(AutoLockPolicy::Minutes(m)),
            _ => Err(format!(
                "auto-lock must be a positive number of minutes or {}, got {}",
                Self::BROWSER_CLOSE_SENTINEL,
                value
            )),
        }
    }
}

impl From<AutoLockPolicy> for i64 {
    fn from(policy: AutoLockPolicy) -> Self {
        match policy {
            AutoLockPolicy::Minutes(m) => i64::from(m),
            AutoLockPolicy::OnBrowserClose => AutoLockPolicy::BROWSER_CLOSE_SENTINEL,
        }
    }
}

impl std::fmt::Display for AutoLockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutoLockPolicy::Minutes(m) => write!(f, "{} min", m),
            AutoLockPolicy::OnBrowserClose => write!(f, "on browser close"),
        }
    }
}

/// Credentials captured from a form submission, persisted so they survive
/// the navigation that usually follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCredential {
    pub username: String,
    pub password: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl PendingCredential {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            url: url.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.timestamp > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_active_token() {
        assert_eq!(Session::unlocked("t").active_token(), Some("t"));
        assert_eq!(Session::locked().active_token(), None);

        let stale = Session {
            token: Some("t".to_string()),
            locked: true,
        };
        assert_eq!(stale.active_token(), None);
    }

    #[test]
    fn test_auto_lock_from_integer() {
        assert_eq!(AutoLockPolicy::try_from(15).unwrap(), AutoLockPolicy::Minutes(15));
        assert_eq!(AutoLockPolicy::try_from(-1).unwrap(), AutoLockPolicy::OnBrowserClose);
        assert!(AutoLockPolicy::try_from(0).is_err());
        assert!(AutoLockPolicy::try_from(-5).is_err());
    }

    #[test]
    fn test_auto_lock_serde() {
        let json = serde_json::to_value(AutoLockPolicy::OnBrowserClose).unwrap();
        assert_eq!(json, serde_json::json!(-1));

        let policy: AutoLockPolicy = serde_json::from_value(serde_json::json!(30)).unwrap();
        assert_eq!(policy.minutes(), Some(30));

        let bad: Result<AutoLockPolicy, _> = serde_json::from_value(serde_json::json!(0));
        assert!(bad.is_err());
    }

    #[test]
    fn test_auto_lock_default() {
        assert_eq!(AutoLockPolicy::default(), AutoLockPolicy::Minutes(15));
        assert!(!AutoLockPolicy::default().is_browser_close());
    }

    #[test]
    fn test_pending_expiry() {
        let mut pending = PendingCredential::new("u", "p", "https://example.com/login");
        let now = Utc::now();
        assert!(!pending.is_expired(now, Duration::minutes(5)));

        pending.timestamp = now - Duration::minutes(10);
        assert!(pending.is_expired(now, Duration::minutes(5)));
    }
}
