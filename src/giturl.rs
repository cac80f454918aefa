//! Git URL parsing and validation.
//!
//! Three shapes of repository location are recognized, in this order:
//!
//! - URL form with an explicit transport (`ssh://git@host/org/repo.git`)
//! - scp-like form (`git@host:org/repo.git`), which is treated as `ssh`
//! - anything else is a local path and gets the `file` scheme without a host
//!
//! Only `ssh` and `git` transports are accepted by [`validate_url`]; HTTP(S)
//! URLs parse fine but are rejected by policy.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Transports understood by the parser.
const KNOWN_SCHEMES: &[&str] = &[
    "ssh", "git", "git+ssh", "http", "https", "ftp", "ftps", "rsync", "file",
];

/// Transports accepted for write-back.
const SSH_SCHEMES: &[&str] = &["ssh", "git"];

/// Matches `[user@]host:[port/]path`. The host may not contain `/` so that
/// relative local paths with a colon in them stay local paths.
static SCP_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<user>[^@/]+)@)?(?P<host>[^:/\s]+):(?:(?P<port>[0-9]{1,5})/)?(?P<path>[^\\].*)$")
        .expect("scp-like git URL pattern is valid")
});

/// Errors produced while parsing or validating a git URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// The URL string was empty.
    #[error("empty Git URL")]
    Empty,

    /// The string is not shaped like a git URL (no scheme or no host).
    #[error("invalid Git URL '{0}'")]
    Invalid(String),

    /// The URL is well formed but uses a transport other than SSH.
    #[error("got a {scheme} Git URL '{url}', but only SSH Git URLs are supported")]
    UnsupportedTransport {
        /// The rejected URL.
        url: String,
        /// Its scheme.
        scheme: String,
    },

    /// The URL could not be parsed at all.
    #[error("unable to parse git URL '{url}': {reason}")]
    Parse {
        /// The offending URL.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The URL has no path segment to derive a repository name from.
    #[error("could not find name of repository {0}")]
    EmptyPath(String),
}

/// A parsed git repository location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    /// Transport scheme (`ssh`, `https`, `file`, ...).
    pub scheme: String,
    /// User part, if any (`git` in `git@github.com:org/repo`).
    pub user: Option<String>,
    /// Host name; empty for local paths.
    pub host: String,
    /// Port, when given explicitly.
    pub port: Option<u16>,
    /// Repository path as written.
    pub path: String,
}

impl GitUrl {
    /// Parse a git URL in any of the supported shapes.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError::Parse`] when a `scheme://` URL is malformed or
    /// names a transport git does not speak.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        if raw.contains("://") {
            return Self::parse_transport(raw);
        }
        if let Some(parsed) = Self::parse_scp_like(raw) {
            return Ok(parsed);
        }
        Ok(Self {
            scheme: "file".to_string(),
            user: None,
            host: String::new(),
            port: None,
            path: raw.to_string(),
        })
    }

    fn parse_transport(raw: &str) -> Result<Self, UrlError> {
        let parsed = url::Url::parse(raw).map_err(|e| UrlError::Parse {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !KNOWN_SCHEMES.contains(&parsed.scheme()) {
            return Err(UrlError::Parse {
                url: raw.to_string(),
                reason: format!("unsupported transport '{}'", parsed.scheme()),
            });
        }

        let user = match parsed.username() {
            "" => None,
            name => Some(name.to_string()),
        };

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            user,
            host: parsed.host_str().unwrap_or_default().to_string(),
            port: parsed.port(),
            path: parsed.path().to_string(),
        })
    }

    fn parse_scp_like(raw: &str) -> Option<Self> {
        let caps = SCP_LIKE.captures(raw)?;
        let port = match caps.name("port") {
            Some(p) => Some(p.as_str().parse().ok()?),
            None => None,
        };
        Some(Self {
            scheme: "ssh".to_string(),
            user: caps.name("user").map(|u| u.as_str().to_string()),
            host: caps["host"].to_string(),
            port,
            path: caps["path"].to_string(),
        })
    }

    /// Whether the location is absolute (has a scheme) and names a host.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.scheme.is_empty() && !self.host.is_empty()
    }

    /// Whether the transport is one accepted for write-back.
    #[must_use]
    pub fn is_ssh(&self) -> bool {
        SSH_SCHEMES.contains(&self.scheme.as_str())
    }
}

/// Check that `url` is a non-empty, well-formed SSH git URL.
///
/// # Errors
///
/// - [`UrlError::Empty`] for an empty string
/// - [`UrlError::Invalid`] when the string is not a git URL with a host
/// - [`UrlError::UnsupportedTransport`] for any scheme other than `ssh`/`git`
pub fn validate_url(url: &str) -> Result<(), UrlError> {
    if url.is_empty() {
        return Err(UrlError::Empty);
    }
    let parsed = match GitUrl::parse(url) {
        Ok(parsed) if parsed.is_remote() => parsed,
        _ => return Err(UrlError::Invalid(url.to_string())),
    };
    if !parsed.is_ssh() {
        return Err(UrlError::UnsupportedTransport {
            url: url.to_string(),
            scheme: parsed.scheme,
        });
    }
    Ok(())
}

/// Whether `url` looks like a remote git URL (scheme and host present).
///
/// Unlike [`validate_url`] this accepts HTTP(S).
#[must_use]
pub fn is_git_url(url: &str) -> bool {
    GitUrl::parse(url).is_ok_and(|parsed| parsed.is_remote())
}

/// Derive a repository's short name from its URL.
///
/// The last path segment is taken and trailing characters from the set
/// `.`, `g`, `i`, `t` are trimmed. This is a character-set trim: a
/// repository called `digit` comes back as `d`.
///
/// # Errors
///
/// Returns [`UrlError::Parse`] if the URL does not parse and
/// [`UrlError::EmptyPath`] if it has no path segments.
pub fn repo_name(url: &str) -> Result<String, UrlError> {
    let parsed = GitUrl::parse(url)?;
    let last = parsed
        .path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .ok_or_else(|| UrlError::EmptyPath(url.to_string()))?;
    Ok(last.trim_end_matches(['.', 'g', 'i', 't']).to_string())
}
