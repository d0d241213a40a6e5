//! Platform definition types and structures.
//!
//! This module defines the data structures for platform probe definitions
//! loaded from TOML catalogs.

use crate::error::{PlatformError, Result};
use gotcha_core::{Category, IdentifierKind, PlatformId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted with the username.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Placeholder substituted with the full email address.
pub const EMAIL_PLACEHOLDER: &str = "{email}";

/// Placeholder substituted with the email local part.
pub const LOCAL_PLACEHOLDER: &str = "{local}";

/// Placeholder substituted with the email domain.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

const EMAIL_PLACEHOLDERS: [&str; 3] = [EMAIL_PLACEHOLDER, LOCAL_PLACEHOLDER, DOMAIN_PLACEHOLDER];

/// One probe definition: where to look for an account and how to read the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDefinition {
    /// Unique platform identifier (e.g., "github", "hacker-news")
    pub id: PlatformId,

    /// Human-readable platform name
    pub name: String,

    /// Platform category
    pub category: Category,

    /// Probe URL template (e.g., `https://example.com/users/{username}`)
    pub url: String,

    /// Canonical profile URL template reported on FOUND; defaults to `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,

    /// Identifier kind this platform is probed with
    #[serde(default)]
    pub accepts: IdentifierKind,

    /// How the response is turned into a verdict
    pub rule: DetectionRule,

    /// Extra request settings (method, headers, body)
    #[serde(default)]
    pub request: RequestSpec,

    /// Adult / NSFW content
    #[serde(default)]
    pub adult: bool,

    /// Free-form maintainer notes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl PlatformDefinition {
    /// Get the platform ID.
    #[must_use]
    pub fn id(&self) -> &PlatformId {
        &self.id
    }

    /// Get the platform name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the platform category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Whether this platform can be probed with the given identifier kind.
    #[must_use]
    pub fn accepts(&self, kind: IdentifierKind) -> bool {
        self.accepts == kind
    }

    /// The template reported as the profile location on FOUND.
    #[must_use]
    pub fn profile_template(&self) -> &str {
        self.profile_url.as_deref().unwrap_or(&self.url)
    }

    /// Validate the definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("platform name cannot be empty"));
        }

        self.validate_template("url", &self.url)?;
        if let Some(profile_url) = &self.profile_url {
            self.validate_template("profile_url", profile_url)?;
        }

        let carries_identifier = self.uses_own_placeholder(&self.url)
            || self
                .request
                .body
                .as_deref()
                .is_some_and(|body| self.uses_own_placeholder(body));
        if !carries_identifier {
            return Err(self.invalid(format!(
                "neither url nor request body contains a {} placeholder",
                self.accepts
            )));
        }

        if self.request.body.is_some() && self.request.method != HttpMethod::Post {
            return Err(self.invalid("request.body requires method = \"post\""));
        }

        if self.request.method == HttpMethod::Head
            && matches!(self.rule, DetectionRule::Body { .. } | DetectionRule::Combined { .. })
        {
            return Err(self.invalid("method = \"head\" returns no body; use a status rule"));
        }

        if self.category == Category::Adult && !self.adult {
            return Err(self.invalid("platforms in the adult category must set adult = true"));
        }

        self.rule.validate(&self.id)
    }

    fn validate_template(&self, field: &str, template: &str) -> Result<()> {
        if template.is_empty() {
            return Err(self.invalid(format!("{field} cannot be empty")));
        }
        if !(template.starts_with("https://") || template.starts_with("http://")) {
            return Err(self.invalid(format!("{field} must be an http(s) URL, got '{template}'")));
        }
        let foreign = match self.accepts {
            IdentifierKind::Username => EMAIL_PLACEHOLDERS
                .into_iter()
                .find(|p| template.contains(p)),
            IdentifierKind::Email => Some(USERNAME_PLACEHOLDER).filter(|p| template.contains(p)),
        };
        if let Some(placeholder) = foreign {
            return Err(self.invalid(format!(
                "{field} uses {placeholder}, which is not available for {} probes",
                self.accepts
            )));
        }
        Ok(())
    }

    fn uses_own_placeholder(&self, text: &str) -> bool {
        match self.accepts {
            IdentifierKind::Username => text.contains(USERNAME_PLACEHOLDER),
            IdentifierKind::Email => EMAIL_PLACEHOLDERS.into_iter().any(|p| text.contains(p)),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> PlatformError {
        PlatformError::ValidationError {
            platform_id: self.id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Detection rule deciding FOUND / NOT_FOUND from a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionRule {
    /// Decide on the HTTP status code alone.
    Status {
        /// Status codes meaning the account exists
        #[serde(default = "default_exists")]
        exists: Vec<u16>,
        /// Status codes meaning the account is absent
        #[serde(default = "default_absent")]
        absent: Vec<u16>,
    },

    /// Decide on a substring of the response body.
    Body {
        /// Substring to look for
        pattern: String,
        /// When true the pattern is an error marker: its presence means absent
        #[serde(default)]
        absent_pattern: bool,
    },

    /// Status code first, body pattern when the status is in neither set.
    Combined {
        /// Status codes meaning the account exists
        #[serde(default = "default_exists")]
        exists: Vec<u16>,
        /// Status codes meaning the account is absent
        #[serde(default = "default_absent")]
        absent: Vec<u16>,
        /// Substring whose presence means the account exists
        pattern: String,
    },
}

fn default_exists() -> Vec<u16> {
    vec![200]
}

fn default_absent() -> Vec<u16> {
    vec![404]
}

impl DetectionRule {
    /// Status-code rule with the common `{200}` / `{404}` sets.
    #[must_use]
    pub fn status_default() -> Self {
        Self::Status {
            exists: default_exists(),
            absent: default_absent(),
        }
    }

    fn validate(&self, platform_id: &PlatformId) -> Result<()> {
        let invalid = |reason: &str| PlatformError::ValidationError {
            platform_id: platform_id.to_string(),
            reason: reason.to_string(),
        };

        match self {
            Self::Status { exists, absent } | Self::Combined { exists, absent, .. } => {
                if exists.is_empty() && absent.is_empty() {
                    return Err(invalid("status rule needs at least one exists or absent code"));
                }
                if exists.iter().any(|code| absent.contains(code)) {
                    return Err(invalid("a status code cannot be in both exists and absent"));
                }
                if exists.iter().chain(absent).any(|code| !(100..=999).contains(code)) {
                    return Err(invalid("status codes must be in 100..=999"));
                }
            }
            Self::Body { .. } => {}
        }

        if let Self::Body { pattern, .. } | Self::Combined { pattern, .. } = self {
            if pattern.is_empty() {
                return Err(invalid("body pattern cannot be empty"));
            }
        }

        Ok(())
    }
}

/// HTTP method used for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET (default)
    #[default]
    Get,
    /// HEAD, for status-only probes
    Head,
    /// POST, for probes that submit a body
    Post,
}

/// Optional request settings for a probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,

    /// Extra headers sent with the probe
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Request body template (POST only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
