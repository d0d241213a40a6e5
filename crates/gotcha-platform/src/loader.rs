//! Platform definition loading from TOML catalogs.
//!
//! The built-in catalog is compiled into the binary; additional catalogs can
//! be loaded from a directory at startup.

use crate::{
    definition::PlatformDefinition,
    error::{PlatformError, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Built-in catalog files, in registry enumeration order.
const BUILTIN_CATALOGS: [(&str, &str); 8] = [
    ("social.toml", include_str!("../definitions/social.toml")),
    ("general.toml", include_str!("../definitions/general.toml")),
    ("developer.toml", include_str!("../definitions/developer.toml")),
    ("forum.toml", include_str!("../definitions/forum.toml")),
    ("gaming.toml", include_str!("../definitions/gaming.toml")),
    ("adult.toml", include_str!("../definitions/adult.toml")),
    ("misc.toml", include_str!("../definitions/misc.toml")),
    ("professional.toml", include_str!("../definitions/professional.toml")),
];

/// On-disk shape of a catalog file: a `[[platform]]` array.
#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    platform: Vec<PlatformDefinition>,
}

/// Parse one catalog document and validate every definition in it.
///
/// `source` names the document in error messages.
pub fn parse_catalog(source: &str, contents: &str) -> Result<Vec<PlatformDefinition>> {
    let catalog: Catalog = toml::from_str(contents).map_err(|e| PlatformError::ParseError {
        path: source.to_string(),
        source: e,
    })?;

    for definition in &catalog.platform {
        definition.validate()?;
    }

    Ok(catalog.platform)
}

/// Parse the built-in catalog.
///
/// # Errors
/// Only fails if the embedded data is malformed, which the test suite rules out.
pub fn builtin_definitions() -> Result<Vec<PlatformDefinition>> {
    let mut definitions = Vec::new();
    for (name, contents) in BUILTIN_CATALOGS {
        definitions.extend(parse_catalog(name, contents)?);
    }
    debug!(count = definitions.len(), "parsed built-in platform catalog");
    Ok(definitions)
}

/// Loader for additional platform definitions from a directory of TOML files.
pub struct PlatformLoader {
    /// Base directory containing catalog files
    definitions_dir: PathBuf,
}

impl PlatformLoader {
    /// Create a new loader for the given directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(PlatformError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Load all catalogs under the directory, recursively, in sorted path order.
    ///
    /// Files that fail to parse or validate are logged as warnings and skipped.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<PlatformDefinition>> {
        let mut paths = Vec::new();
        Self::collect_toml_files(&self.definitions_dir, &mut paths)?;
        paths.sort();

        let mut definitions = Vec::new();
        for path in paths {
            match Self::load_from_path(&path) {
                Ok(loaded) => definitions.extend(loaded),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping invalid platform catalog"
                    );
                }
            }
        }

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded extra platform definitions"
        );

        Ok(definitions)
    }

    fn collect_toml_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                Self::collect_toml_files(&path, paths)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<Vec<PlatformDefinition>> {
        let contents = std::fs::read_to_string(path).map_err(|e| PlatformError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        parse_catalog(&path.display().to_string(), &contents)
    }
}
