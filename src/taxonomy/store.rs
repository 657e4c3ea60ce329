//! Immutable taxonomy store with alias indexing
//!
//! Built once from a catalog, validated, then shared read-only. Lookup is a
//! hash index; the extractor's scan pass runs over an Aho-Corasick automaton
//! of all normalized aliases so matching cost stays independent of catalog
//! size and aliases longer than the configured n-gram width are still found.

use crate::error::{Result, SkillGapError};
use crate::processing::normalizer::normalize_phrase;
use crate::taxonomy::catalog::{SkillCategory, TaxonomyCatalog};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// A canonical skill with its known normalized surface forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntity {
    pub id: String,
    pub display_name: String,
    pub category: SkillCategory,
    /// Normalized aliases, display name included.
    pub aliases: BTreeSet<String>,
}

/// One registered alias: its normalized form, the surface form it came from,
/// and the entity it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct AliasRecord {
    pub normalized: String,
    pub surface: String,
    pub entity: usize,
    pub norm_chars: usize,
}

#[derive(Debug)]
pub struct TaxonomyStore {
    version: String,
    entities: Vec<SkillEntity>,
    alias_index: HashMap<String, usize>,
    /// Sorted by normalized length descending, then alphabetically.
    records: Vec<AliasRecord>,
    automaton: AhoCorasick,
}

impl TaxonomyStore {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_catalog(TaxonomyCatalog::from_path(path)?)
    }

    pub fn from_catalog(catalog: TaxonomyCatalog) -> Result<Self> {
        if catalog.version.trim().is_empty() {
            return Err(SkillGapError::TaxonomyLoad(
                "catalog version must not be empty".to_string(),
            ));
        }
        if catalog.skills.is_empty() {
            return Err(SkillGapError::TaxonomyLoad(
                "catalog contains no skills".to_string(),
            ));
        }

        let mut entities: Vec<SkillEntity> = Vec::with_capacity(catalog.skills.len());
        let mut alias_index: HashMap<String, usize> = HashMap::new();
        let mut records: Vec<AliasRecord> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();

        for entry in catalog.skills {
            let display_name = entry.name.trim().to_string();
            if display_name.is_empty() {
                return Err(SkillGapError::TaxonomyLoad(
                    "skill with empty canonical name".to_string(),
                ));
            }

            let id = match entry.id {
                Some(id) => id.trim().to_string(),
                None => slug(&display_name),
            };
            if id.is_empty() {
                return Err(SkillGapError::TaxonomyLoad(format!(
                    "'{}' produces an empty identifier",
                    display_name
                )));
            }
            if !seen_ids.insert(id.clone()) {
                return Err(SkillGapError::TaxonomyLoad(format!(
                    "duplicate skill identifier '{}'",
                    id
                )));
            }

            let idx = entities.len();
            let mut aliases = BTreeSet::new();

            // The display name is always an alias of its own entity, and its
            // surface wins over later duplicates within the entity.
            for surface in std::iter::once(display_name.clone()).chain(entry.aliases) {
                let surface = surface.trim().to_string();
                if surface.is_empty() {
                    return Err(SkillGapError::TaxonomyLoad(format!(
                        "empty alias registered for '{}'",
                        display_name
                    )));
                }
                let normalized = normalize_phrase(&surface);
                if normalized.is_empty() {
                    return Err(SkillGapError::TaxonomyLoad(format!(
                        "alias '{}' of '{}' normalizes to nothing",
                        surface, display_name
                    )));
                }
                if let Some(&other) = alias_index.get(&normalized) {
                    if other != idx {
                        return Err(SkillGapError::TaxonomyLoad(format!(
                            "alias '{}' is registered for both '{}' and '{}'",
                            normalized, entities[other].display_name, display_name
                        )));
                    }
                    continue;
                }
                alias_index.insert(normalized.clone(), idx);
                let norm_chars = normalized.chars().count();
                aliases.insert(normalized.clone());
                records.push(AliasRecord {
                    normalized,
                    surface,
                    entity: idx,
                    norm_chars,
                });
            }

            entities.push(SkillEntity {
                id,
                display_name,
                category: entry.category,
                aliases,
            });
        }

        records.sort_by(|a, b| {
            b.normalized
                .len()
                .cmp(&a.normalized.len())
                .then_with(|| a.normalized.cmp(&b.normalized))
        });

        let automaton = AhoCorasick::new(records.iter().map(|r| r.normalized.as_str()))
            .map_err(|e| {
                SkillGapError::TaxonomyLoad(format!("failed to build alias automaton: {}", e))
            })?;

        Ok(Self {
            version: catalog.version,
            entities,
            alias_index,
            records,
            automaton,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entities(&self) -> &[SkillEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.records.len()
    }

    /// Look up a normalized phrase against the alias index.
    pub fn lookup(&self, normalized_phrase: &str) -> Option<&SkillEntity> {
        self.alias_index
            .get(normalized_phrase)
            .map(|&idx| &self.entities[idx])
    }

    pub fn entity_by_id(&self, id: &str) -> Option<&SkillEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// All registered aliases, longest first (ties alphabetical), paired with
    /// their entity. Longest-match-first, so "machine learning" is preferred
    /// over "learning" when both are registered.
    pub fn aliases_by_length(&self) -> impl Iterator<Item = (&str, &SkillEntity)> + '_ {
        self.records
            .iter()
            .map(move |r| (r.normalized.as_str(), &self.entities[r.entity]))
    }

    pub(crate) fn entity(&self, idx: usize) -> &SkillEntity {
        &self.entities[idx]
    }

    pub(crate) fn alias_record(&self, pattern: usize) -> &AliasRecord {
        &self.records[pattern]
    }

    pub(crate) fn alias_records(&self) -> &[AliasRecord] {
        &self.records
    }

    pub(crate) fn automaton(&self) -> &AhoCorasick {
        &self.automaton
    }
}

/// Holds loaded taxonomy versions side by side, so extraction can be
/// addressed by version and catalogs can be A/B tested in one process.
#[derive(Default)]
pub struct TaxonomyRegistry {
    stores: BTreeMap<String, Arc<TaxonomyStore>>,
}

impl TaxonomyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, store: TaxonomyStore) -> Arc<TaxonomyStore> {
        let store = Arc::new(store);
        self.stores
            .insert(store.version().to_string(), Arc::clone(&store));
        store
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<Arc<TaxonomyStore>> {
        let store = TaxonomyStore::load(path)?;
        Ok(self.insert(store))
    }

    pub fn get(&self, version: &str) -> Option<Arc<TaxonomyStore>> {
        self.stores.get(version).cloned()
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> + '_ {
        self.stores.keys().map(|v| v.as_str())
    }
}

/// Derive a stable identifier from a canonical name: the normalized form with
/// spaces turned into hyphens ("Machine Learning" -> "machine-learning").
fn slug(name: &str) -> String {
    normalize_phrase(name).replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::catalog::CatalogEntry;

    fn entry(name: &str, category: SkillCategory, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            category,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            id: None,
        }
    }

    fn sample_catalog() -> TaxonomyCatalog {
        TaxonomyCatalog {
            version: "test-1".to_string(),
            skills: vec![
                entry("Python", SkillCategory::Language, &["py", "python3"]),
                entry("Machine Learning", SkillCategory::Domain, &["ml"]),
                entry("JavaScript", SkillCategory::Language, &["js"]),
            ],
        }
    }

    #[test]
    fn test_store_from_catalog() {
        let store = TaxonomyStore::from_catalog(sample_catalog()).unwrap();
        assert_eq!(store.version(), "test-1");
        assert_eq!(store.len(), 3);
        // 3 display names + 4 catalog aliases
        assert_eq!(store.alias_count(), 7);
    }

    #[test]
    fn test_lookup() {
        let store = TaxonomyStore::from_catalog(sample_catalog()).unwrap();
        assert_eq!(store.lookup("py").unwrap().display_name, "Python");
        assert_eq!(store.lookup("python").unwrap().display_name, "Python");
        assert_eq!(
            store.lookup("machine learning").unwrap().id,
            "machine-learning"
        );
        assert!(store.lookup("sql").is_none());
        // lookup is over normalized phrases only
        assert!(store.lookup("Python").is_none());
    }

    #[test]
    fn test_aliases_by_length_longest_first() {
        let store = TaxonomyStore::from_catalog(sample_catalog()).unwrap();
        let aliases: Vec<&str> = store.aliases_by_length().map(|(a, _)| a).collect();
        assert_eq!(aliases[0], "machine learning");
        let lengths: Vec<usize> = aliases.iter().map(|a| a.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn test_duplicate_alias_across_entities_rejected() {
        let catalog = TaxonomyCatalog {
            version: "dup".to_string(),
            skills: vec![
                entry("JavaScript", SkillCategory::Language, &["js"]),
                entry("Java", SkillCategory::Language, &["js"]),
            ],
        };
        let err = TaxonomyStore::from_catalog(catalog).unwrap_err();
        assert!(matches!(err, SkillGapError::TaxonomyLoad(_)));
        assert!(err.to_string().contains("js"));
    }

    #[test]
    fn test_duplicate_alias_within_entity_deduped() {
        let catalog = TaxonomyCatalog {
            version: "v".to_string(),
            skills: vec![entry("Python", SkillCategory::Language, &["python", "PYTHON"])],
        };
        let store = TaxonomyStore::from_catalog(catalog).unwrap();
        assert_eq!(store.alias_count(), 1);
        // The display name surface was registered first and wins.
        assert_eq!(store.alias_record(0).surface, "Python");
    }

    #[test]
    fn test_empty_canonical_name_rejected() {
        let catalog = TaxonomyCatalog {
            version: "v".to_string(),
            skills: vec![entry("  ", SkillCategory::Language, &[])],
        };
        assert!(TaxonomyStore::from_catalog(catalog).is_err());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let catalog = TaxonomyCatalog {
            version: "v".to_string(),
            skills: vec![],
        };
        assert!(TaxonomyStore::from_catalog(catalog).is_err());
    }

    #[test]
    fn test_slug_ids() {
        let store = TaxonomyStore::from_catalog(sample_catalog()).unwrap();
        let ids: Vec<&str> = store.entities().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["python", "machine-learning", "javascript"]);
    }

    #[test]
    fn test_registry_versions_coexist() {
        let mut registry = TaxonomyRegistry::new();
        registry.insert(TaxonomyStore::from_catalog(sample_catalog()).unwrap());

        let mut other = sample_catalog();
        other.version = "test-2".to_string();
        other.skills.push(entry("Rust", SkillCategory::Language, &[]));
        registry.insert(TaxonomyStore::from_catalog(other).unwrap());

        assert_eq!(registry.get("test-1").unwrap().len(), 3);
        assert_eq!(registry.get("test-2").unwrap().len(), 4);
        assert!(registry.get("test-3").is_none());
        let versions: Vec<&str> = registry.versions().collect();
        assert_eq!(versions, vec!["test-1", "test-2"]);
    }
}
