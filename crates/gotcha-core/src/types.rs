//! Shared types used across the Gotcha engine.
//!
//! This module defines the newtypes and enums that describe what is being
//! probed (`Identifier`) and where (`PlatformId`, `Category`).

use crate::error::GotchaError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum accepted username length, in characters.
const MAX_USERNAME_CHARS: usize = 100;

/// Newtype for platform identifiers with validation.
///
/// Platform IDs must be lowercase alphanumeric with hyphens, 1-50 characters,
/// and may not start or end with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformId(String);

impl PlatformId {
    /// Create a new `PlatformId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, GotchaError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), GotchaError> {
        static PLATFORM_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PLATFORM_REGEX.get_or_init(|| {
            Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,48}[a-z0-9])?$").expect("valid regex")
        });

        if id.is_empty() || id.len() > 50 {
            return Err(GotchaError::Validation(format!(
                "invalid platform ID: must be 1-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(GotchaError::Validation(format!(
                "invalid platform ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for PlatformId {
    type Error = GotchaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlatformId> for String {
    fn from(id: PlatformId) -> Self {
        id.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform categories a scan can select.
///
/// The declaration order is the order categories appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Social networks
    Social,
    /// General-purpose websites
    General,
    /// Code hosting and developer communities
    Developer,
    /// Forums and discussion boards
    Forum,
    /// Gaming networks and storefronts
    Gaming,
    /// Adult / NSFW platforms (18+)
    Adult,
    /// Everything else
    Misc,
    /// Professional networks
    Professional,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 8] = [
        Self::Social,
        Self::General,
        Self::Developer,
        Self::Forum,
        Self::Gaming,
        Self::Adult,
        Self::Misc,
        Self::Professional,
    ];

    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Social => "Social Media",
            Self::General => "General Sites",
            Self::Developer => "Developer Platforms",
            Self::Forum => "Forums",
            Self::Gaming => "Gaming",
            Self::Adult => "Adult Platforms",
            Self::Misc => "Miscellaneous",
            Self::Professional => "Professional Networks",
        }
    }

    /// Stable lowercase key used in configuration and machine-readable output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::General => "general",
            Self::Developer => "developer",
            Self::Forum => "forum",
            Self::Gaming => "gaming",
            Self::Adult => "adult",
            Self::Misc => "misc",
            Self::Professional => "professional",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = GotchaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "social" => Ok(Self::Social),
            "general" => Ok(Self::General),
            "developer" => Ok(Self::Developer),
            "forum" | "forums" => Ok(Self::Forum),
            "gaming" => Ok(Self::Gaming),
            "adult" => Ok(Self::Adult),
            "misc" => Ok(Self::Misc),
            "professional" => Ok(Self::Professional),
            other => Err(GotchaError::Validation(format!("unknown category '{other}'"))),
        }
    }
}

/// A username to probe for.
///
/// Usernames are opaque tokens; the only constraints are the ones that keep
/// URL templating sane: non-empty, at most 100 characters, and no whitespace
/// or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a new `Username`.
    ///
    /// # Errors
    /// Returns a validation error if the username is empty, too long, or
    /// contains whitespace or control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, GotchaError> {
        let value = value.into();

        if value.is_empty() {
            return Err(GotchaError::Validation("username cannot be empty".to_string()));
        }

        let chars = value.chars().count();
        if chars > MAX_USERNAME_CHARS {
            return Err(GotchaError::Validation(format!(
                "username must be at most {MAX_USERNAME_CHARS} characters, got {chars}"
            )));
        }

        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(GotchaError::Validation(format!(
                "username cannot contain whitespace or control characters: '{}'",
                value.escape_debug()
            )));
        }

        Ok(Self(value))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = GotchaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated email address split into local part and domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    local: String,
    domain: String,
}

impl EmailAddress {
    /// Parse and validate an email address.
    ///
    /// The domain is lowercased; the local part is kept verbatim.
    ///
    /// # Errors
    /// Returns a validation error if the address is malformed.
    pub fn parse(value: &str) -> Result<Self, GotchaError> {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^([A-Za-z0-9._%+-]+)@([A-Za-z0-9.-]+\.[A-Za-z]{2,})$")
                .expect("valid regex")
        });

        let value = value.trim();
        let captures = regex
            .captures(value)
            .ok_or_else(|| GotchaError::Validation(format!("invalid email format: '{value}'")))?;

        let local = &captures[1];
        let domain = &captures[2];

        if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
            return Err(GotchaError::Validation(format!(
                "invalid email format: '{value}'"
            )));
        }

        if domain.starts_with(['.', '-']) || domain.contains("..") {
            return Err(GotchaError::Validation(format!(
                "invalid email domain: '{domain}'"
            )));
        }

        Ok(Self {
            local: local.to_string(),
            domain: domain.to_ascii_lowercase(),
        })
    }

    /// The part before the `@`.
    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }

    /// The part after the `@`, lowercased.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = GotchaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.to_string()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

/// Which kind of identifier a platform can be probed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Probed by username
    #[default]
    Username,
    /// Probed by email address
    Email,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => write!(f, "username"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// The target of a scan: a username or a validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Identifier {
    /// A username
    Username(Username),
    /// An email address
    Email(EmailAddress),
}

impl Identifier {
    /// Build a username identifier.
    pub fn username(value: impl Into<String>) -> Result<Self, GotchaError> {
        Username::new(value).map(Self::Username)
    }

    /// Build an email identifier.
    pub fn email(value: &str) -> Result<Self, GotchaError> {
        EmailAddress::parse(value).map(Self::Email)
    }

    /// Parse a free-form target: anything containing `@` is treated as an
    /// email address, everything else as a username.
    pub fn parse(value: &str) -> Result<Self, GotchaError> {
        let value = value.trim();
        if value.contains('@') {
            Self::email(value)
        } else {
            Self::username(value)
        }
    }

    /// The kind of this identifier.
    #[must_use]
    pub fn kind(&self) -> IdentifierKind {
        match self {
            Self::Username(_) => IdentifierKind::Username,
            Self::Email(_) => IdentifierKind::Email,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(u) => write!(f, "{u}"),
            Self::Email(e) => write!(f, "{e}"),
        }
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_id_valid() {
        for id in ["github", "x", "hacker-news", "about-me", "500px"] {
            let platform_id = PlatformId::new(id).expect("valid platform ID");
            assert_eq!(platform_id.as_str(), id);
        }
    }

    #[test]
    fn test_platform_id_invalid() {
        let too_long = "a".repeat(51);
        let invalid_ids = vec![
            "",
            "GitHub",
            "-leading",
            "trailing-",
            "under_score",
            "with space",
            too_long.as_str(),
        ];

        for id in invalid_ids {
            assert!(PlatformId::new(id).is_err(), "{id:?} should be rejected");
        }
    }

    #[test]
    fn test_platform_id_deserialize_validates() {
        let ok: PlatformId = serde_json::from_str("\"github\"").expect("deserialize valid ID");
        assert_eq!(ok.as_str(), "github");

        let bad: Result<PlatformId, _> = serde_json::from_str("\"Not Valid\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().expect("parse category key");
            assert_eq!(parsed, category);
        }
        assert_eq!("forums".parse::<Category>().expect("alias"), Category::Forum);
        assert!("nonsense".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::Professional).expect("serialize");
        assert_eq!(json, "\"professional\"");
    }

    #[test]
    fn test_username_validation() {
        assert!(Username::new("testuser123").is_ok());
        assert!(Username::new("john.doe_42").is_ok());
        assert!(Username::new("").is_err());
        assert!(Username::new("john doe").is_err());
        assert!(Username::new("tab\there").is_err());
        assert!(Username::new("a".repeat(101)).is_err());
    }

    #[test]
    fn test_email_valid() {
        let email = EmailAddress::parse("user@example.com").expect("valid email");
        assert_eq!(email.local(), "user");
        assert_eq!(email.domain(), "example.com");
        assert_eq!(email.to_string(), "user@example.com");

        let email = EmailAddress::parse("First.Last+tag@Mail.Example.ORG").expect("valid email");
        assert_eq!(email.local(), "First.Last+tag");
        assert_eq!(email.domain(), "mail.example.org");
    }

    #[test]
    fn test_email_invalid() {
        let invalid = vec![
            "not-an-email",
            "@example.com",
            "user@",
            "user@example",
            "user@@example.com",
            "user@.example.com",
            ".user@example.com",
            "us..er@example.com",
            "user name@example.com",
            "",
        ];

        for value in invalid {
            assert!(EmailAddress::parse(value).is_err(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn test_identifier_parse_dispatches_on_at_sign() {
        let id = Identifier::parse("testuser123").expect("username");
        assert_eq!(id.kind(), IdentifierKind::Username);

        let id = Identifier::parse("  user@example.com ").expect("email");
        assert_eq!(id.kind(), IdentifierKind::Email);
        assert_eq!(id.to_string(), "user@example.com");

        assert!(Identifier::parse("broken@").is_err());
    }

    #[test]
    fn test_identifier_serialization() {
        let id = Identifier::username("alice").expect("valid username");
        let json = serde_json::to_value(&id).expect("serialize identifier");
        assert_eq!(json["kind"], "username");
        assert_eq!(json["value"], "alice");
    }

    #[test]
    fn test_timestamp_display_is_rfc3339() {
        let ts = Timestamp::now();
        assert_eq!(ts.to_string(), ts.to_rfc3339());
    }
}
