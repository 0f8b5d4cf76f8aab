//! Shared types, error model, and configuration for SchoolPrompt.
//!
//! This crate is the foundation depended on by all other SchoolPrompt crates.
//! It provides:
//! - [`SchoolPromptError`], the unified error type
//! - Domain types ([`CountryRecord`], [`InputRecord`], label enums)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClipboardConfig, DefaultsConfig, ReferenceConfig, config_dir, config_file_path,
    init_config, init_config_at, load_config, load_config_from,
};
pub use error::{Result, SchoolPromptError};
pub use types::{
    CountryRecord, Curriculum, EducationSystem, EligibilityNote, InputRecord, OTHER_COUNTRY,
    OfficialSource, Purpose, SchoolType, SchoolTypeBucket, SearchQueries, SpecialCase,
    TotalYears, VocabularyEntry, humanize_key, split_url_list,
};
