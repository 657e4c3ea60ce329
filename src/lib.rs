//! Skill extraction and gap reconciliation engine

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod processing;
pub mod taxonomy;

pub use config::Config;
pub use error::{Result, SkillGapError};
