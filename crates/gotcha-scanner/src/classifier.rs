//! Turning a [`RawOutcome`] into a [`Verdict`].
//!
//! Classification is a pure function of the outcome, the platform's detection
//! rule, and the identifier (needed only to build the profile URL).

use crate::probe::RawOutcome;
use crate::url_builder::build_profile_url;
use crate::verdict::{Verdict, VerdictKind};
use gotcha_core::Identifier;
use gotcha_platform::{DetectionRule, PlatformDefinition};

/// HTTP status used by platforms that throttle probes.
const TOO_MANY_REQUESTS: u16 = 429;

/// Body fragments served by bot-challenge interstitials instead of the real page.
const CHALLENGE_MARKERS: [&str; 8] = [
    "<title>Just a moment...</title>",
    "Attention Required! | Cloudflare",
    "cf-browser-verification",
    "/cdn-cgi/challenge-platform/",
    "g-recaptcha",
    "h-captcha",
    "px-captcha",
    "_Incapsula_Resource",
];

fn challenge_marker(body: &str) -> Option<&'static str> {
    CHALLENGE_MARKERS
        .into_iter()
        .find(|marker| body.contains(marker))
}

/// Classify one probe outcome.
///
/// A transport error always yields ERROR, whatever the rule says. A throttled
/// or challenged response yields INDETERMINATE before the rule is consulted.
#[must_use]
pub fn classify(
    outcome: &RawOutcome,
    platform: &PlatformDefinition,
    identifier: &Identifier,
) -> Verdict {
    if let Some(error) = &outcome.error {
        return Verdict::error(platform, error.to_string(), outcome.elapsed);
    }

    let Some(status) = outcome.status else {
        return Verdict::error(platform, "no status and no error recorded", outcome.elapsed);
    };

    let (kind, detail) = if status == TOO_MANY_REQUESTS {
        (VerdictKind::Indeterminate, Some("rate limited (HTTP 429)".to_string()))
    } else if let Some(marker) = challenge_marker(&outcome.body) {
        (
            VerdictKind::Indeterminate,
            Some(format!("bot challenge detected ({marker})")),
        )
    } else {
        apply_rule(&platform.rule, status, &outcome.body)
    };

    let mut verdict = Verdict::new(platform, kind, outcome.elapsed);
    verdict.http_status = Some(status);
    verdict.detail = detail;
    if kind == VerdictKind::Found {
        verdict.profile_url = Some(build_profile_url(platform, identifier));
    }
    verdict
}

fn apply_rule(rule: &DetectionRule, status: u16, body: &str) -> (VerdictKind, Option<String>) {
    match rule {
        DetectionRule::Status { exists, absent } => {
            if exists.contains(&status) {
                (VerdictKind::Found, None)
            } else if absent.contains(&status) {
                (VerdictKind::NotFound, None)
            } else {
                (
                    VerdictKind::Indeterminate,
                    Some(format!("unexpected HTTP status {status}")),
                )
            }
        }
        DetectionRule::Body {
            pattern,
            absent_pattern,
        } => {
            let present = body.contains(pattern.as_str());
            if present == *absent_pattern {
                (VerdictKind::NotFound, None)
            } else {
                (VerdictKind::Found, None)
            }
        }
        DetectionRule::Combined {
            exists,
            absent,
            pattern,
        } => {
            if exists.contains(&status) {
                (VerdictKind::Found, None)
            } else if absent.contains(&status) {
                (VerdictKind::NotFound, None)
            } else if body.contains(pattern.as_str()) {
                (VerdictKind::Found, None)
            } else {
                (VerdictKind::NotFound, None)
            }
        }
    }
}
