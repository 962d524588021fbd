//! Trait definitions for BIGSdb operations.
//!
//! The transport is a trait so model navigation can run against any
//! implementation; entity types implement the operations they support.

mod expand;
mod fetch;

pub use expand::Expand;
pub use fetch::Fetch;

#[cfg(test)]
pub(crate) use fetch::fake::FakeFetch;
