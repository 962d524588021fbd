//! BIGSdb sequence-typing API client library.
//!
//! A Rust library for navigating the BIGSdb REST services (PubMLST, the
//! Pasteur instance, rMLST) as typed models. Responses are assembled into
//! entities with derived attributes and followed link by link:
//! resource → database → scheme → locus → allele.
//!
//! # Quick Start
//!
//! ```no_run
//! use seqtypo::{find_database, BigsdbClient, Expand, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> seqtypo::Result<()> {
//!     // Create client from environment variables
//!     let client = BigsdbClient::from_env()?;
//!
//!     // Look up a sequence definition database by name
//!     let database = find_database(&client, "pubmlst_neisseria_seqdef").await?;
//!     let full = database.expand(&client).await?;
//!
//!     // List its MLST schemes
//!     let schemes = full.schemes(&client, &SearchQuery::category("MLST")).await?;
//!     println!("Found {} MLST schemes", schemes.len());
//!
//!     // Walk into the first scheme and read one locus' alleles
//!     if let Some(scheme) = schemes.get(0) {
//!         let scheme = scheme.expand(&client).await?;
//!         if let Some(locus) = scheme.locus_index().names().next() {
//!             for record in scheme.locus_alleles(&client, locus).await?.take(3) {
//!                 println!("{}", record?);
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Fetch`] - Transport capability the navigator consumes
//! - [`Expand`] - Follow a summary entity's link to its full record
//! - [`FromJson`] - Assemble a model from a decoded JSON value
//! - [`ModelList`] - Searchable collection of one model kind
//!
//! [`BigsdbClient`] is the reqwest-backed [`Fetch`] implementation. Every
//! navigation operation awaits its requests one after another.
//!
//! # Configuration
//!
//! [`BigsdbClient::from_env`] reads:
//!
//! - `BIGSDB_API_URL` (optional) - Base URL (defaults to `https://rest.pubmlst.org/`)
//! - `BIGSDB_API_KEY` (optional) - Bearer token for authenticated endpoints
//! - `BIGSDB_SSL_VERIFY` (optional) - `false`, `0` or `no` disables TLS verification
//! - `BIGSDB_TIMEOUT_SECS` (optional) - Request timeout (defaults to 300)

mod assemble;
mod client;
mod collection;
mod config;
mod error;
mod fasta;
mod models;
mod output;
mod profiles;
mod traits;

pub mod cli;

// Re-export core types
pub use client::BigsdbClient;
pub use config::{ClientConfig, PASTEUR_URL, PUBMLST_URL, RMLST_QUERY_URL};
pub use error::{BigsdbError, Result};

// Re-export traits
pub use assemble::FromJson;
pub use collection::Model;
pub use output::PrettyPrint;
pub use traits::{Expand, Fetch};

// Re-export collections
pub use collection::{
    DatabaseList, Entity, LocusList, ModelList, ResourceList, SchemeList, SearchQuery,
};

// Re-export models
pub use models::{
    // Resource types
    Resource,
    ResourceIndex,
    // Database types
    Database,
    DatabaseCategory,
    FullDatabase,
    // Scheme types
    FullScheme,
    Scheme,
    SchemeCategory,
    SchemeCollection,
    // Locus types
    Allele,
    Locus,
    LocusCollection,
    LocusIndex,
    Paging,
    // Query types
    AlleleExactResult,
    QueryOptions,
    RmlstResult,
    SequenceQueryResult,
    Taxon,
};
pub use fasta::{sequence_from_text, AlleleFasta, FastaRecord};
pub use profiles::ProfileTable;

// Re-export convenience functions
pub use models::{find_database, list_databases, list_resources};
pub use models::{encode_base64, is_base64, query_rmlst, query_rmlst_at, query_sequence};
