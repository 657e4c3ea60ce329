//! External catalog format for the skill taxonomy
//!
//! A catalog is a versioned list of canonical skills, each with a category
//! and a set of alias surface forms. JSON and TOML files are supported,
//! chosen by file extension.

use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyCatalog {
    pub version: String,
    pub skills: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical display name; also registered as an alias of the entity.
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Stable identifier; derived from the name when omitted.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillCategory {
    Language,
    Framework,
    Library,
    Tool,
    Platform,
    Database,
    Methodology,
    SoftSkill,
    Certification,
    Domain,
    #[serde(other)]
    Other,
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkillCategory::Language => "language",
            SkillCategory::Framework => "framework",
            SkillCategory::Library => "library",
            SkillCategory::Tool => "tool",
            SkillCategory::Platform => "platform",
            SkillCategory::Database => "database",
            SkillCategory::Methodology => "methodology",
            SkillCategory::SoftSkill => "soft-skill",
            SkillCategory::Certification => "certification",
            SkillCategory::Domain => "domain",
            SkillCategory::Other => "other",
        };
        write!(f, "{}", label)
    }
}

impl TaxonomyCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                SkillGapError::TaxonomyLoad(format!(
                    "Failed to parse catalog {}: {}",
                    path.display(),
                    e
                ))
            }),
            _ => serde_json::from_str(&content).map_err(|e| {
                SkillGapError::TaxonomyLoad(format!(
                    "Failed to parse catalog {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }
}
