//! Heuristic URL safety checklist.
//!
//! The checks are advisory: they flag patterns common in phishing links but
//! never stop a link from being created.

use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;
use url::Url;

/// URLs longer than this many characters are flagged.
pub const MAX_URL_CHARS: usize = 80;

static IPV4_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("ipv4 host pattern is valid"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4,}").expect("digit run pattern is valid"));

static SENSITIVE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(login|bank|secure|verify|update|confirm)")
        .expect("keyword pattern is valid")
});

/// One reason a URL looks suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyWarning {
    /// The URL does not parse as an absolute URL. Always reported alone.
    InvalidFormat,
    NotHttps,
    IpAddressHost,
    SuspiciousHostnameTokens,
    VeryLongUrl,
    SensitiveKeywords,
}

impl SafetyWarning {
    pub fn message(&self) -> &'static str {
        match self {
            SafetyWarning::InvalidFormat => "Invalid URL format",
            SafetyWarning::NotHttps => "Not using HTTPS",
            SafetyWarning::IpAddressHost => "Uses IP address as host",
            SafetyWarning::SuspiciousHostnameTokens => "Suspicious hostname tokens",
            SafetyWarning::VeryLongUrl => "Very long URL",
            SafetyWarning::SensitiveKeywords => "Contains sensitive keywords",
        }
    }
}

impl Display for SafetyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Runs the checklist against `url` and returns every warning that fires,
/// in checklist order. An empty list means nothing looked suspicious.
///
/// The URL is lowercased before parsing. If it does not parse, the result
/// is exactly `[InvalidFormat]` and no other check runs.
pub fn evaluate_safety(url: &str) -> Vec<SafetyWarning> {
    let lowered = url.to_lowercase();
    let Ok(parsed) = Url::parse(&lowered) else {
        return vec![SafetyWarning::InvalidFormat];
    };

    let mut warnings = Vec::new();
    let host = parsed.host_str().unwrap_or_default();

    if parsed.scheme() != "https" {
        warnings.push(SafetyWarning::NotHttps);
    }
    if IPV4_HOST.is_match(host) {
        warnings.push(SafetyWarning::IpAddressHost);
    }
    if host.split('.').any(|label| DIGIT_RUN.is_match(label)) {
        warnings.push(SafetyWarning::SuspiciousHostnameTokens);
    }
    if lowered.chars().count() > MAX_URL_CHARS {
        warnings.push(SafetyWarning::VeryLongUrl);
    }
    if SENSITIVE_KEYWORDS.is_match(&lowered) {
        warnings.push(SafetyWarning::SensitiveKeywords);
    }

    warnings
}
