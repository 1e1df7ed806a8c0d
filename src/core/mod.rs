//! Core library components.
//!
//! Seed storage, the envelope cipher, field detection, document loading,
//! resolution and the in-place encryption tool. Nothing here prints; the
//! CLI layer owns all terminal output.

pub mod cipher;
pub mod constants;
pub mod detect;
pub mod document;
pub mod merge;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod tool;
pub mod types;
pub mod validation;
pub mod walk;
pub mod yaml_edit;
