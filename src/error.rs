//! Error handling for the skill gap analyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillGapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Taxonomy load error: {0}")]
    TaxonomyLoad(String),

    #[error("Unknown taxonomy version: {0}")]
    UnknownTaxonomyVersion(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillGapError>;
