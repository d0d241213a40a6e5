//! Turning command-line targets into identifiers.

use anyhow::{Context, Result};
use gotcha_core::Identifier;
use std::path::Path;
use tracing::warn;

/// Parse a batch file: one target per line, `@` marks an email address.
///
/// Blank lines and `#` comments are ignored. Lines that fail validation are
/// logged and skipped so one typo does not sink the batch.
pub fn parse_batch(contents: &str) -> Vec<Identifier> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            match Identifier::parse(line) {
                Ok(identifier) => Some(identifier),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "skipping invalid target");
                    None
                }
            }
        })
        .collect()
}

/// Read and parse a batch file.
pub fn load_batch(path: &Path) -> Result<Vec<Identifier>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read target file {}", path.display()))?;
    Ok(parse_batch(&contents))
}

/// Collect every target: the file's entries, then `-u`, then `-e`.
///
/// Explicit `-u` / `-e` values must be valid; an invalid one is an error.
pub fn collect(
    username: Option<&str>,
    email: Option<&str>,
    file: Option<&Path>,
) -> Result<Vec<Identifier>> {
    let mut targets = match file {
        Some(path) => load_batch(path)?,
        None => Vec::new(),
    };

    if let Some(username) = username {
        targets.push(
            Identifier::username(username.trim())
                .with_context(|| format!("invalid username '{username}'"))?,
        );
    }
    if let Some(email) = email {
        targets.push(Identifier::email(email).with_context(|| format!("invalid email '{email}'"))?);
    }

    Ok(targets)
}
