//! Domains module containing business logic organized by bounded contexts.
//!
//! The tools domain is the only one: typed tools, their registry and the
//! adapters that expose them.

pub mod tools;
