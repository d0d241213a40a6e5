//! Immutable, ordered catalog of platform definitions.

use crate::{
    definition::PlatformDefinition,
    error::{PlatformError, Result},
    loader::{builtin_definitions, PlatformLoader},
};
use gotcha_core::{Category, PlatformId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;

/// Ordered catalog of platform definitions.
///
/// The registry is built once at startup and never mutated afterwards.
/// Definitions are shared as `Arc`s so probe tasks can hold one without
/// copying it. Enumeration order is load order and is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    /// Definitions in enumeration order
    platforms: Vec<Arc<PlatformDefinition>>,
    /// Platform ID → position in `platforms`
    index: HashMap<PlatformId, usize>,
}

impl PlatformRegistry {
    /// Build a registry from definitions, validating each and rejecting duplicate IDs.
    pub fn from_definitions(definitions: Vec<PlatformDefinition>) -> Result<Self> {
        let mut registry = Self::default();
        registry.extend(definitions)?;
        Ok(registry)
    }

    /// The built-in catalog.
    pub fn builtin() -> Result<Self> {
        let registry = Self::from_definitions(builtin_definitions()?)?;
        info!(count = registry.len(), "loaded built-in platform catalog");
        Ok(registry)
    }

    /// Append the definitions found by `loader` after the current ones.
    pub fn with_extra(mut self, loader: &PlatformLoader) -> Result<Self> {
        self.extend(loader.load_all()?)?;
        Ok(self)
    }

    fn extend(&mut self, definitions: Vec<PlatformDefinition>) -> Result<()> {
        for definition in definitions {
            definition.validate()?;

            if self.index.contains_key(definition.id()) {
                return Err(PlatformError::DuplicateId {
                    platform_id: definition.id().to_string(),
                });
            }

            self.index
                .insert(definition.id().clone(), self.platforms.len());
            self.platforms.push(Arc::new(definition));
        }
        Ok(())
    }

    /// Select the platforms to probe.
    ///
    /// A platform is included iff its category is in `categories` and it is
    /// either not adult-flagged or `include_adult` is set. The result keeps
    /// registry order. An empty category set yields an empty list.
    #[must_use]
    pub fn list_platforms(
        &self,
        categories: &BTreeSet<Category>,
        include_adult: bool,
    ) -> Vec<Arc<PlatformDefinition>> {
        self.platforms
            .iter()
            .filter(|p| categories.contains(&p.category()))
            .filter(|p| include_adult || !p.adult)
            .cloned()
            .collect()
    }

    /// Get a platform definition by ID.
    ///
    /// # Errors
    /// Returns error if the platform is not found.
    pub fn get(&self, platform_id: &PlatformId) -> Result<Arc<PlatformDefinition>> {
        self.index
            .get(platform_id)
            .map(|&i| Arc::clone(&self.platforms[i]))
            .ok_or_else(|| PlatformError::NotFound {
                platform_id: platform_id.to_string(),
            })
    }

    /// All definitions in enumeration order.
    #[must_use]
    pub fn all(&self) -> &[Arc<PlatformDefinition>] {
        &self.platforms
    }

    /// Total number of platforms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Whether the registry holds no platforms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Number of platforms per category.
    #[must_use]
    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for platform in &self.platforms {
            *counts.entry(platform.category()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DetectionRule, RequestSpec};
    use gotcha_core::IdentifierKind;

    fn create_test_definition(id: &str, category: Category, adult: bool) -> PlatformDefinition {
        PlatformDefinition {
            id: PlatformId::new(id).expect("valid platform ID"),
            name: format!("Test {id}"),
            category,
            url: format!("https://{id}.example/{{username}}"),
            profile_url: None,
            accepts: IdentifierKind::Username,
            rule: DetectionRule::status_default(),
            request: RequestSpec::default(),
            adult,
            notes: String::new(),
        }
    }

    fn sample_registry() -> PlatformRegistry {
        PlatformRegistry::from_definitions(vec![
            create_test_definition("social-a", Category::Social, false),
            create_test_definition("dev-a", Category::Developer, false),
            create_test_definition("social-nsfw", Category::Social, true),
            create_test_definition("adult-a", Category::Adult, true),
            create_test_definition("social-b", Category::Social, false),
            create_test_definition("dev-b", Category::Developer, false),
        ])
        .expect("build registry")
    }

    fn ids(platforms: &[Arc<PlatformDefinition>]) -> Vec<&str> {
        platforms.iter().map(|p| p.id().as_str()).collect()
    }

    #[test]
    fn test_registry_new() {
        let registry = PlatformRegistry::default();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_platforms_keeps_registry_order() {
        let registry = sample_registry();
        let categories = BTreeSet::from([Category::Developer, Category::Social]);

        let selected = registry.list_platforms(&categories, false);
        assert_eq!(ids(&selected), vec!["social-a", "dev-a", "social-b", "dev-b"]);
    }

    #[test]
    fn test_list_platforms_adult_filter() {
        let registry = sample_registry();
        let categories = BTreeSet::from([Category::Social, Category::Adult]);

        let without = registry.list_platforms(&categories, false);
        assert_eq!(ids(&without), vec!["social-a", "social-b"]);

        let with = registry.list_platforms(&categories, true);
        assert_eq!(
            ids(&with),
            vec!["social-a", "social-nsfw", "adult-a", "social-b"]
        );
    }

    #[test]
    fn test_list_platforms_never_returns_adult_without_opt_in() {
        let registry = PlatformRegistry::builtin().expect("built-in registry");

        // Every subset of categories, encoded as a bitmask.
        for mask in 0u16..(1 << Category::ALL.len()) {
            let categories: BTreeSet<Category> = Category::ALL
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, c)| *c)
                .collect();

            let selected = registry.list_platforms(&categories, false);
            assert!(selected.iter().all(|p| !p.adult), "mask {mask:#b} leaked adult");
            assert!(selected.iter().all(|p| categories.contains(&p.category())));
        }
    }

    #[test]
    fn test_list_platforms_empty_categories() {
        let registry = sample_registry();
        assert!(registry.list_platforms(&BTreeSet::new(), true).is_empty());
    }

    #[test]
    fn test_list_platforms_is_deterministic() {
        let registry = PlatformRegistry::builtin().expect("built-in registry");
        let categories = Category::ALL.into_iter().collect();
        let first = ids(&registry.list_platforms(&categories, true))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let second = ids(&registry.list_platforms(&categories, true))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(first.len(), registry.len());
    }

    #[test]
    fn test_registry_get() {
        let registry = sample_registry();
        let id = PlatformId::new("dev-b").expect("valid platform ID");
        assert_eq!(registry.get(&id).expect("get platform").name(), "Test dev-b");

        let missing = PlatformId::new("nonexistent").expect("valid platform ID");
        assert!(matches!(
            registry.get(&missing),
            Err(PlatformError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = PlatformRegistry::from_definitions(vec![
            create_test_definition("same", Category::Social, false),
            create_test_definition("same", Category::Misc, false),
        ]);
        assert!(matches!(result, Err(PlatformError::DuplicateId { .. })));
    }

    #[test]
    fn test_count_by_category() {
        let counts = sample_registry().count_by_category();
        assert_eq!(counts.get(&Category::Social), Some(&3));
        assert_eq!(counts.get(&Category::Developer), Some(&2));
        assert_eq!(counts.get(&Category::Adult), Some(&1));
        assert_eq!(counts.get(&Category::Gaming), None);
    }
}
