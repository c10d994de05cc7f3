//! Data-driven battle content.
//!
//! This crate houses the built-in catalogs and the loaders for RON/TOML data
//! files:
//! - Skill descriptors (data-driven via RON)
//! - Character and faction rosters (data-driven via RON)
//! - Battle rules (data-driven via TOML)
//! - The equipment catalog (bus interceptors, code-defined)
//!
//! Loaders produce `battle-core` types directly; nothing here owns battle state.

pub mod equipment;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use equipment::{CatalogItem, EquipmentCatalog, ItemKind};

#[cfg(feature = "loaders")]
pub use loaders::{
    CharacterTemplate, ConfigLoader, ContentFactory, FactionTemplate, RosterCatalog,
    RosterLoader, SkillLoader,
};
