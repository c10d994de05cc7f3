//! Content loaders for reading battle data from files.
//!
//! Skills and rosters are RON, battle rules are TOML. Each loader also has
//! an `embedded` variant that parses the catalog compiled into the crate.

pub mod config;
pub mod factory;
pub mod rosters;
pub mod skills;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use rosters::{CharacterTemplate, FactionTemplate, RosterCatalog, RosterLoader};
pub use skills::SkillLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
