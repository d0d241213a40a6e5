//! Placeholder substitution for probe URLs, request bodies, and profile URLs.

use gotcha_core::Identifier;
use gotcha_platform::{
    HttpMethod, PlatformDefinition, DOMAIN_PLACEHOLDER, EMAIL_PLACEHOLDER, LOCAL_PLACEHOLDER,
    USERNAME_PLACEHOLDER,
};
use std::collections::BTreeMap;

/// A fully rendered HTTP request for one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Target URL with the identifier substituted
    pub url: String,
    /// Extra headers from the platform definition
    pub headers: BTreeMap<String, String>,
    /// Request body, for POST probes
    pub body: Option<String>,
}

/// Substitute the identifier into `template`, passing each value through `encode`.
fn render(template: &str, identifier: &Identifier, encode: impl Fn(&str) -> String) -> String {
    match identifier {
        Identifier::Username(username) => {
            template.replace(USERNAME_PLACEHOLDER, &encode(username.as_str()))
        }
        Identifier::Email(email) => template
            .replace(EMAIL_PLACEHOLDER, &encode(&email.to_string()))
            .replace(LOCAL_PLACEHOLDER, &encode(email.local()))
            .replace(DOMAIN_PLACEHOLDER, &encode(email.domain())),
    }
}

fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Render a URL template; substituted values are percent-encoded.
#[must_use]
pub fn build_url(template: &str, identifier: &Identifier) -> String {
    render(template, identifier, percent_encode)
}

/// Render a request body template.
///
/// Values are JSON-escaped for JSON bodies and percent-encoded otherwise.
#[must_use]
pub fn build_body(template: &str, identifier: &Identifier, json: bool) -> String {
    if json {
        render(template, identifier, json_escape)
    } else {
        render(template, identifier, percent_encode)
    }
}

/// The profile URL reported when the account is found.
#[must_use]
pub fn build_profile_url(platform: &PlatformDefinition, identifier: &Identifier) -> String {
    build_url(platform.profile_template(), identifier)
}

/// Build the complete request for probing `platform` with `identifier`.
#[must_use]
pub fn build_probe_request(platform: &PlatformDefinition, identifier: &Identifier) -> ProbeRequest {
    let is_json = platform.request.headers.iter().any(|(name, value)| {
        name.eq_ignore_ascii_case("content-type") && value.contains("application/json")
    });

    ProbeRequest {
        method: platform.request.method,
        url: build_url(&platform.url, identifier),
        headers: platform.request.headers.clone(),
        body: platform
            .request
            .body
            .as_deref()
            .map(|body| build_body(body, identifier, is_json)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotcha_core::{Category, IdentifierKind, PlatformId};
    use gotcha_platform::{DetectionRule, RequestSpec};

    fn platform(url: &str) -> PlatformDefinition {
        PlatformDefinition {
            id: PlatformId::new("test").expect("valid platform ID"),
            name: "Test".to_string(),
            category: Category::General,
            url: url.to_string(),
            profile_url: None,
            accepts: IdentifierKind::Username,
            rule: DetectionRule::status_default(),
            request: RequestSpec::default(),
            adult: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_build_url_username() {
        let id = Identifier::username("testuser123").expect("valid username");
        assert_eq!(
            build_url("https://example.com/u/{username}", &id),
            "https://example.com/u/testuser123"
        );
    }

    #[test]
    fn test_build_url_percent_encodes() {
        let id = Identifier::username("a/b?c#d").expect("valid username");
        assert_eq!(
            build_url("https://example.com/{username}", &id),
            "https://example.com/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_build_url_email_parts() {
        let id = Identifier::email("Jane.Doe+x@Example.com").expect("valid email");
        assert_eq!(
            build_url("https://example.com/?e={email}&l={local}&d={domain}", &id),
            "https://example.com/?e=Jane.Doe%2Bx%40example.com&l=Jane.Doe%2Bx&d=example.com"
        );
    }

    #[test]
    fn test_build_body_json_escapes() {
        let id = Identifier::username("we\"ird").expect("valid username");
        assert_eq!(
            build_body(r#"{"name":"{username}"}"#, &id, true),
            r#"{"name":"we\"ird"}"#
        );
        assert_eq!(
            build_body("name={username}", &id, false),
            "name=we%22ird"
        );
    }

    #[test]
    fn test_build_probe_request_post_json() {
        let mut definition = platform("https://example.com/graphql");
        definition.request = RequestSpec {
            method: HttpMethod::Post,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: Some(r#"{"user":"{username}"}"#.to_string()),
        };

        let id = Identifier::username("alice").expect("valid username");
        let request = build_probe_request(&definition, &id);

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://example.com/graphql");
        assert_eq!(request.body.as_deref(), Some(r#"{"user":"alice"}"#));
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_profile_url_prefers_profile_template() {
        let mut definition = platform("https://api.example.com/users/{username}");
        let id = Identifier::username("alice").expect("valid username");
        assert_eq!(
            build_profile_url(&definition, &id),
            "https://api.example.com/users/alice"
        );

        definition.profile_url = Some("https://example.com/@{username}".to_string());
        assert_eq!(
            build_profile_url(&definition, &id),
            "https://example.com/@alice"
        );
    }
}
