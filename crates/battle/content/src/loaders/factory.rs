//! Content factory for loading every catalog from one directory.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, SkillRegistry};

use crate::loaders::{ConfigLoader, LoadResult, RosterCatalog, RosterLoader, SkillLoader};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── skills.ron
/// └── rosters.ron
/// ```
///
/// A factory without a directory serves the catalogs embedded in the crate.
pub struct ContentFactory {
    data_dir: Option<PathBuf>,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
        }
    }

    pub fn embedded() -> Self {
        Self { data_dir: None }
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        match &self.data_dir {
            Some(dir) => ConfigLoader::load(&dir.join("config.toml")),
            None => ConfigLoader::embedded(),
        }
    }

    /// Load the skill registry from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<SkillRegistry> {
        match &self.data_dir {
            Some(dir) => SkillLoader::load(&dir.join("skills.ron")),
            None => SkillLoader::embedded(),
        }
    }

    /// Load roster templates from `rosters.ron`.
    pub fn load_rosters(&self) -> LoadResult<RosterCatalog> {
        match &self.data_dir {
            Some(dir) => RosterLoader::load(&dir.join("rosters.ron")),
            None => RosterLoader::embedded(),
        }
    }

    /// Returns the data directory path, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}

impl Default for ContentFactory {
    fn default() -> Self {
        Self::embedded()
    }
}
