//! URL normalization and the six match policies.

use regex::Regex;
use tracing::debug;
use url::{Host, Url};

use vaultlink_protocols::MatchPolicy;

#[cfg(test)]
#[path = "uri_tests.rs"]
mod tests;

/// Two-label public suffixes under which registrable domains have three labels.
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "com.au", "net.au", "org.au", "co.nz",
    "co.jp", "ne.jp", "or.jp", "com.br", "com.cn", "com.mx", "co.in", "co.za", "com.tr",
    "co.kr", "com.sg", "com.hk", "com.tw",
];

/// Parse a URL, assuming `https://` when the scheme is missing.
///
/// Returns `None` for anything without a host.
pub fn parse_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        if url.has_host() {
            return Some(url);
        }
    }
    Url::parse(&format!("https://{}", trimmed))
        .ok()
        .filter(|url| url.has_host())
}

/// Lowercased host of a URL with a leading `www.` removed.
pub fn hostname(raw: &str) -> Option<String> {
    let url = parse_url(raw)?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Whether two URLs share a hostname (ignoring `www.`).
pub fn same_hostname(a: &str, b: &str) -> bool {
    match (hostname(a), hostname(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Registrable domain of a URL: `login.example.co.uk` -> `example.co.uk`.
///
/// IP addresses and single-label hosts are returned whole.
pub fn base_domain(raw: &str) -> Option<String> {
    let url = parse_url(raw)?;
    match url.host()? {
        Host::Ipv4(ip) => return Some(ip.to_string()),
        Host::Ipv6(ip) => return Some(ip.to_string()),
        Host::Domain(_) => {}
    }
    let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return Some(labels.join("."));
    }
    let suffix = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_PART_SUFFIXES.contains(&suffix.as_str()) {
        3
    } else {
        2
    };
    Some(labels[labels.len() - keep..].join("."))
}

/// Decide whether `stored` applies to `current` under `policy`.
pub fn match_uri(stored: &str, current: &str, policy: MatchPolicy) -> bool {
    let stored = stored.trim();
    let current = current.trim();
    if stored.is_empty() || current.is_empty() {
        return false;
    }

    match policy {
        MatchPolicy::Domain => match (base_domain(stored), base_domain(current)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        MatchPolicy::Host => match (parse_url(stored), parse_url(current)) {
            (Some(a), Some(b)) => {
                let host_a = a.host_str().map(str::to_ascii_lowercase);
                let host_b = b.host_str().map(str::to_ascii_lowercase);
                host_a == host_b && a.port() == b.port()
            }
            _ => false,
        },
        MatchPolicy::StartsWith => current.starts_with(stored),
        MatchPolicy::Exact => current == stored,
        MatchPolicy::RegularExpression => match Regex::new(stored) {
            Ok(re) => re.is_match(current),
            Err(e) => {
                debug!(pattern = stored, error = %e, "Ignoring malformed match pattern");
                false
            }
        },
        MatchPolicy::Never => false,
    }
}
