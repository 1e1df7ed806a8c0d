//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// An environment name (e.g., dev, test, prod).
pub type Environment = String;

/// A component name, matching the YAML file stem (e.g., hive, yarn).
pub type ComponentName = String;

/// A named instance of a component.
pub type InstanceName = String;

/// A dotted path to a field inside a document (e.g., `instances.primary.password`).
pub type FieldPath = String;
