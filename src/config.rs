//! Skill configuration

use crate::store::DEFAULT_MAX_JSON_BYTES;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8000;

/// Settings for hosting a skill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillConfig {
    /// Application id requests must carry; unchecked when `None`
    pub application_id: Option<String>,
    /// Persistence table; attributes round-trip through the envelope when `None`
    pub table_name: Option<String>,
    pub db_path: PathBuf,
    pub max_attribute_bytes: usize,
    pub port: u16,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            application_id: None,
            table_name: None,
            db_path: default_db_path(),
            max_attribute_bytes: DEFAULT_MAX_JSON_BYTES,
            port: DEFAULT_PORT,
        }
    }
}

impl SkillConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            application_id: get("SKILL_APPLICATION_ID"),
            table_name: get("SKILL_TABLE_NAME"),
            db_path: get("SKILL_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            max_attribute_bytes: get("SKILL_MAX_ATTRIBUTE_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_attribute_bytes),
            port: get("SKILL_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    #[must_use]
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    #[must_use]
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    #[must_use]
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn persistence_enabled(&self) -> bool {
        self.table_name.is_some()
    }
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{home}/.funcy-skill/skill.db"))
}
