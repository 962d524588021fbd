//! BIGSdb API model types.

mod database;
mod locus;
mod query;
mod resource;
mod scheme;

pub use database::*;
pub use locus::*;
pub use query::*;
pub use resource::*;
pub use scheme::*;
