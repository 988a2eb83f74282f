//! Cross-cutting pure helpers

pub mod validations;
