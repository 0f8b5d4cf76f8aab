//! Prompt generation for SchoolPrompt.
//!
//! This crate holds the country reference table, form validation, and the
//! assembler that turns a validated request into a Markdown research prompt.

pub mod assembler;
pub mod reference;
pub mod validate;

pub use assembler::{PromptAssembler, build_prompt};
pub use reference::ReferenceTable;
pub use validate::{FieldError, RawForm, ValidationErrors, validate};
