//! Pre-fill security check.

use serde::{Deserialize, Serialize};
use url::Url;

/// Why writing a secret into this page is risky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityRisk {
    /// The page was loaded over plain HTTP.
    InsecureHttp,
    /// The page is embedded in a frame; any frame counts, same-origin included.
    CrossFrame,
}

impl SecurityRisk {
    pub fn description(&self) -> &'static str {
        match self {
            SecurityRisk::InsecureHttp => {
                "This page is not secure (HTTP). Filled information could be read by others on the network."
            }
            SecurityRisk::CrossFrame => {
                "This form is inside an embedded frame, which may belong to a different site than the one shown."
            }
        }
    }
}

/// Risks of filling into a page at `url`.
pub fn assess(url: &str, top_level: bool) -> Vec<SecurityRisk> {
    let mut risks = Vec::new();
    let insecure = Url::parse(url)
        .map(|u| u.scheme() == "http")
        .unwrap_or_else(|_| url.trim().to_ascii_lowercase().starts_with("http://"));
    if insecure {
        risks.push(SecurityRisk::InsecureHttp);
    }
    if !top_level {
        risks.push(SecurityRisk::CrossFrame);
    }
    risks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_top_level_is_safe() {
        assert!(assess("https://example.com/login", true).is_empty());
    }

    #[test]
    fn test_http_flagged() {
        assert_eq!(
            assess("http://example.com/login", true),
            vec![SecurityRisk::InsecureHttp]
        );
        assert_eq!(
            assess("HTTP://EXAMPLE.COM", true),
            vec![SecurityRisk::InsecureHttp]
        );
    }

    #[test]
    fn test_frame_flagged() {
        assert_eq!(
            assess("https://example.com", false),
            vec![SecurityRisk::CrossFrame]
        );
    }

    #[test]
    fn test_both_risks() {
        let risks = assess("http://example.com", false);
        assert_eq!(risks.len(), 2);
        assert!(risks.iter().all(|r| !r.description().is_empty()));
    }
}
