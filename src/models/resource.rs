//! Resource models and the root of the traversal.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::assemble::{json_type, nested_list, raw_record, FromJson};
use crate::collection::{DatabaseList, Entity, Model, ModelList, ResourceList, SearchQuery};
use crate::error::{BigsdbError, Result};
use crate::models::database::Database;
use crate::traits::Fetch;

/// A group of databases on a BIGSdb server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub long_description: Option<String>,
    pub databases: DatabaseList,
}

#[derive(Deserialize)]
struct RawResource {
    name: String,
    description: String,
    #[serde(default)]
    long_description: Option<String>,
    databases: Vec<Value>,
}

impl FromJson for Resource {
    const NAME: &'static str = "Resource";

    fn from_json(value: Value) -> Result<Self> {
        let raw: RawResource = raw_record(Self::NAME, value)?;
        Ok(Self {
            databases: nested_list(Self::NAME, "databases", raw.databases)?,
            name: raw.name,
            description: raw.description,
            long_description: raw.long_description,
        })
    }
}

impl Model for Resource {
    const FIELDS: &'static [&'static str] = &["name", "description", "long_description"];

    fn url_attribute() -> Option<&'static str> {
        None
    }

    fn attribute(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            "long_description" => self.long_description.as_deref(),
            _ => None,
        }
    }

    fn into_entity(self) -> Entity {
        Entity::Resource(self)
    }

    fn from_entity(entity: Entity) -> std::result::Result<Self, Entity> {
        match entity {
            Entity::Resource(resource) => Ok(resource),
            other => Err(other),
        }
    }
}

/// The server's root index.
///
/// The API answers the root URL with a bare JSON array of resources rather
/// than an object, so this is the one model built from an array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceIndex {
    pub resources: ResourceList,
}

#[derive(Deserialize)]
struct RawResourceIndex {
    resources: Vec<Value>,
}

impl FromJson for ResourceIndex {
    const NAME: &'static str = "ResourceIndex";

    fn from_json(value: Value) -> Result<Self> {
        let wrapped = match value {
            Value::Array(_) => json!({ "resources": value }),
            other => {
                return Err(BigsdbError::shape(
                    Self::NAME,
                    format!("resource index must be a JSON array, got {}", json_type(&other)),
                ))
            }
        };
        let raw: RawResourceIndex = raw_record(Self::NAME, wrapped)?;
        Ok(Self {
            resources: nested_list(Self::NAME, "resources", raw.resources)?,
        })
    }
}

impl<'a> IntoIterator for &'a ResourceIndex {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

// Entry points of the traversal

/// Fetch the resource index of the server.
///
/// # Example
///
/// ```ignore
/// use seqtypo::{BigsdbClient, list_resources};
///
/// let client = BigsdbClient::from_env()?;
/// for resource in &list_resources(&client).await? {
///     println!("{}: {} databases", resource.name, resource.databases.len());
/// }
/// ```
pub async fn list_resources<F>(client: &F) -> Result<ResourceList>
where
    F: Fetch + ?Sized,
{
    tracing::debug!(root = client.root_url(), "fetching resource index");
    let value = client.fetch_json(client.root_url()).await?;
    Ok(ResourceIndex::from_json(value)?.resources)
}

/// Every database of every resource, optionally filtered on `subject`.
///
/// # Example
///
/// ```ignore
/// use seqtypo::{list_databases, SearchQuery};
///
/// let query = SearchQuery::contains("Neisseria").with_category("seqdef");
/// let databases = list_databases(&client, &query).await?;
/// ```
pub async fn list_databases<F>(client: &F, query: &SearchQuery) -> Result<DatabaseList>
where
    F: Fetch + ?Sized,
{
    let resources = list_resources(client).await?;
    let databases =
        ModelList::from_list_of_model_lists(resources.into_iter().map(|r| r.databases));

    if query.is_active() {
        databases.search("subject", query)
    } else {
        Ok(databases)
    }
}

/// Find a database by its exact name.
///
/// # Errors
///
/// Returns [`BigsdbError::NotFound`] if no resource lists the database.
pub async fn find_database<F>(client: &F, name: &str) -> Result<Database>
where
    F: Fetch + ?Sized,
{
    list_databases(client, &SearchQuery::default())
        .await?
        .search("name", &SearchQuery::exact(name))?
        .into_iter()
        .next()
        .ok_or_else(|| BigsdbError::NotFound {
            entity_type: "Database",
            id: name.to_string(),
        })
}
