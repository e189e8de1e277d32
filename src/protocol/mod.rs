//! Wire forms: canonical game serialization and per-viewer sanitization.

pub mod sanitize;
pub mod serialize;

pub use sanitize::sanitized_view;
