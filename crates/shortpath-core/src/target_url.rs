use crate::error::ValidationError;
use std::fmt::Display;
use url::Url;

/// A validated, normalized target URL.
///
/// Normalization strips exactly one trailing `/` from the caller's text, so
/// `https://example.com/` and `https://example.com` share one reverse
/// mapping. The rest of the text is kept as supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetUrl {
    normalized: String,
    domain: String,
}

impl TargetUrl {
    /// Validates and normalizes a raw target URL.
    ///
    /// Only absolute `http` and `https` URLs with a host are accepted.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim() != raw {
            return Err(ValidationError::TargetUrlPadded);
        }

        let url = Url::parse(raw).map_err(|_| ValidationError::TargetUrlInvalid)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ValidationError::TargetUrlInvalid);
        }
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(ValidationError::TargetUrlInvalid)?;

        let domain = host.strip_prefix("www.").unwrap_or(host).to_string();
        let normalized = raw.strip_suffix('/').unwrap_or(raw).to_string();

        Ok(Self { normalized, domain })
    }

    /// Returns the normalized URL text used as the reverse-store key.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Returns the domain reported to the frequency tracker: the URL host,
    /// lowercased, with a leading `www.` label removed.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Display for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl AsRef<str> for TargetUrl {
    fn as_ref(&self) -> &str {
        &self.normalized
    }
}
