//! Shared request helpers.

mod validate;

pub use validate::ValidatedJson;
