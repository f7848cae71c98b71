//! User-agent rotation.
//!
//! Every request is sent with a browser user agent drawn at random from a
//! pool, so a batch does not present one uniform fingerprint. The pool is
//! built once per batch and handed to workers through the
//! [`DownloadContext`](crate::DownloadContext).
//!
//! When the pool cannot be built the provider degrades to
//! [`FALLBACK_USER_AGENT`] and logs a warning.

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::error::IdentityError;

/// User agent sent when no pool is available.
pub const FALLBACK_USER_AGENT: &str = "Mozilla/5.0";

const BUILTIN_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.2420.81",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// A non-empty set of user agents to pick from.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Pool of current desktop browser user agents.
    pub fn builtin() -> Self {
        Self {
            agents: BUILTIN_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }

    /// Build a pool from explicit entries. Blank entries are dropped.
    pub fn from_agents<I, S>(agents: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .collect();

        if agents.is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self { agents })
    }

    /// Load one user agent per line. Lines starting with `#` are skipped.
    pub fn from_file(path: &Path) -> Result<Self, IdentityError> {
        let contents = fs::read_to_string(path).map_err(|source| IdentityError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_agents(
            contents
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        )
    }

    /// Number of user agents in the pool.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always `false`; a pool cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Pick a user agent at random.
    pub fn random(&self) -> &str {
        self.agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_USER_AGENT)
    }
}

/// Hands out user agents, falling back to a constant when no pool exists.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    pool: Option<UserAgentPool>,
}

impl IdentityProvider {
    /// Rotate through the given pool.
    pub fn new(pool: UserAgentPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Always return [`FALLBACK_USER_AGENT`].
    pub fn fallback() -> Self {
        Self { pool: None }
    }

    /// Build a provider from an optional user-agent file.
    ///
    /// Without a file the built-in pool is used. If the file cannot be
    /// loaded a warning is logged and the provider falls back to
    /// [`FALLBACK_USER_AGENT`].
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::new(UserAgentPool::builtin());
        };

        match UserAgentPool::from_file(path) {
            Ok(pool) => {
                log::debug!("Loaded {} user agents from {}", pool.len(), path.display());
                Self::new(pool)
            }
            Err(error) => {
                log::warn!("{error}. Falling back to default user agent.");
                Self::fallback()
            }
        }
    }

    /// Returns `true` when no pool is available.
    pub fn is_fallback(&self) -> bool {
        self.pool.is_none()
    }

    /// The user agent for one request: the override when given, otherwise a
    /// fresh pick from the pool.
    pub fn user_agent(&self, identity_override: Option<&str>) -> String {
        if let Some(user_agent) = identity_override {
            return user_agent.to_string();
        }
        self.pool
            .as_ref()
            .map(UserAgentPool::random)
            .unwrap_or(FALLBACK_USER_AGENT)
            .to_string()
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new(UserAgentPool::builtin())
    }
}
