//! Expand trait for following an entity's own link to its full form.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::Fetch;

/// Fetch the expanded representation of a summary entity.
///
/// Listings only carry a short form of each entity (a name, a description and
/// a link). Expanding follows that link and assembles the full record.
///
/// # Example
///
/// ```ignore
/// use seqtypo::{BigsdbClient, Expand};
///
/// let client = BigsdbClient::from_env()?;
/// let databases = seqtypo::list_databases(&client, &Default::default()).await?;
/// let full = databases[0].expand(&client).await?;
/// ```
#[async_trait]
pub trait Expand: Sync {
    /// The expanded entity type.
    type Full: Send;

    /// Follow this entity's link and assemble the expanded entity.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the fetch fails or a shape error if the
    /// response does not match the expanded model.
    async fn expand<F>(&self, client: &F) -> Result<Self::Full>
    where
        F: Fetch + ?Sized;
}
