//! Database models.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assemble::{raw_record, FromJson};
use crate::collection::{Entity, Model, SchemeList, SearchQuery};
use crate::error::{BigsdbError, Result};
use crate::models::locus::LocusCollection;
use crate::models::scheme::SchemeCollection;
use crate::traits::{Expand, Fetch};

/// Boilerplate removed from a database description to obtain its subject.
const SUBJECT_BOILERPLATE: [&str; 5] = [
    "REST API access to ",
    " database",
    "isolates",
    "sequence/profile definitions",
    "seqdef",
];

/// Kind of BIGSdb database, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseCategory {
    /// Sequence and profile definitions.
    Seqdef,
    /// Isolate records.
    Isolates,
    Others,
}

impl DatabaseCategory {
    fn classify(name: &str) -> Self {
        if name.contains("seqdef") {
            Self::Seqdef
        } else if name.contains("isolates") {
            Self::Isolates
        } else {
            Self::Others
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seqdef => "seqdef",
            Self::Isolates => "isolates",
            Self::Others => "others",
        }
    }
}

impl fmt::Display for DatabaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database as listed inside a resource.
///
/// `category` and `subject` are derived from `name` and `description` when
/// the database is assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Database {
    pub name: String,
    pub description: String,
    /// Link to the [`FullDatabase`].
    pub href: String,
    category: DatabaseCategory,
    subject: String,
}

#[derive(Deserialize)]
struct RawDatabase {
    name: String,
    description: String,
    href: String,
}

impl Database {
    pub fn category(&self) -> DatabaseCategory {
        self.category
    }

    /// Description with the API boilerplate stripped, e.g. `"PubMLST Neisseria spp."`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    fn build(raw: RawDatabase) -> Self {
        let category = DatabaseCategory::classify(&raw.name);
        let subject = parse_subject(&raw.description);
        Self {
            name: raw.name,
            description: raw.description,
            href: raw.href,
            category,
            subject,
        }
    }
}

fn parse_subject(description: &str) -> String {
    SUBJECT_BOILERPLATE
        .iter()
        .fold(description.to_string(), |subject, pattern| subject.replace(pattern, ""))
        .trim()
        .to_string()
}

impl FromJson for Database {
    const NAME: &'static str = "Database";

    fn from_json(value: Value) -> Result<Self> {
        raw_record::<RawDatabase>(Self::NAME, value).map(Self::build)
    }
}

impl Model for Database {
    const FIELDS: &'static [&'static str] = &["name", "description", "href", "subject", "category"];

    fn url_attribute() -> Option<&'static str> {
        Some("href")
    }

    fn attribute(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            "href" => Some(&self.href),
            "subject" => Some(&self.subject),
            "category" => Some(self.category.as_str()),
            _ => None,
        }
    }

    fn category_label(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn into_entity(self) -> Entity {
        Entity::Database(self)
    }

    fn from_entity(entity: Entity) -> std::result::Result<Self, Entity> {
        match entity {
            Entity::Database(db) => Ok(db),
            other => Err(other),
        }
    }
}

#[async_trait]
impl Expand for Database {
    type Full = FullDatabase;

    async fn expand<F>(&self, client: &F) -> Result<FullDatabase>
    where
        F: Fetch + ?Sized,
    {
        tracing::debug!(database = %self.name, "expanding database");
        let value = client.fetch_json(&self.href).await?;
        FullDatabase::from_json(value)
    }
}

/// Expanded database record: links to everything the database exposes.
///
/// Isolate databases have no `schemes`; sequence-definition databases have
/// no `isolates` or `genomes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullDatabase {
    #[serde(default)]
    pub schemes: Option<String>,
    #[serde(default)]
    pub loci: Option<String>,
    #[serde(default)]
    pub submissions: Option<String>,
    #[serde(default)]
    pub curators: Option<String>,
    #[serde(default)]
    pub isolates: Option<String>,
    #[serde(default)]
    pub sequences: Option<String>,
    #[serde(default)]
    pub genomes: Option<String>,
    #[serde(default)]
    pub fields: Option<String>,
    #[serde(default)]
    pub projects: Option<String>,
}

impl FromJson for FullDatabase {
    const NAME: &'static str = "FullDatabase";

    fn from_json(value: Value) -> Result<Self> {
        raw_record(Self::NAME, value)
    }
}

impl FullDatabase {
    fn link(&self, field: &'static str, value: &Option<String>) -> Result<String> {
        value.clone().ok_or(BigsdbError::MissingLink {
            model: Self::NAME,
            field,
        })
    }

    /// Fetch the scheme listing of this database.
    ///
    /// # Errors
    ///
    /// Returns [`BigsdbError::MissingLink`] for databases without schemes.
    pub async fn scheme_collection<F>(&self, client: &F) -> Result<SchemeCollection>
    where
        F: Fetch + ?Sized,
    {
        let url = self.link("schemes", &self.schemes)?;
        tracing::debug!(%url, "fetching schemes");
        SchemeCollection::from_json(client.fetch_json(&url).await?)
    }

    /// Fetch the schemes of this database, filtered on the scheme URL.
    ///
    /// Without a pattern or category every scheme is returned.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let full = database.expand(&client).await?;
    /// let mlst = full.schemes(&client, &SearchQuery::category("MLST")).await?;
    /// ```
    pub async fn schemes<F>(&self, client: &F, query: &SearchQuery) -> Result<SchemeList>
    where
        F: Fetch + ?Sized,
    {
        let schemes = self.scheme_collection(client).await?.schemes;
        if query.is_active() {
            schemes.search("scheme", query)
        } else {
            Ok(schemes)
        }
    }

    /// Fetch the locus listing of this database.
    pub async fn loci<F>(&self, client: &F) -> Result<LocusCollection>
    where
        F: Fetch + ?Sized,
    {
        let url = self.link("loci", &self.loci)?;
        tracing::debug!(%url, "fetching loci");
        LocusCollection::from_json(client.fetch_json(&url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_cleanup() {
        let db = Database::from_json(json!({
            "name": "pubmlst_neisseria_seqdef",
            "description": "REST API access to PubMLST Neisseria spp. sequence/profile definitions database",
            "href": "https://rest.pubmlst.org/db/pubmlst_neisseria_seqdef",
        }))
        .unwrap();

        assert_eq!(db.subject(), "PubMLST Neisseria spp.");
        assert_eq!(db.category(), DatabaseCategory::Seqdef);
    }

    #[test]
    fn test_category_from_name() {
        assert_eq!(DatabaseCategory::classify("pubmlst_neisseria_seqdef"), DatabaseCategory::Seqdef);
        assert_eq!(DatabaseCategory::classify("pubmlst_neisseria_isolates"), DatabaseCategory::Isolates);
        assert_eq!(DatabaseCategory::classify("pubmlst_test"), DatabaseCategory::Others);
    }

    #[test]
    fn test_derived_fields_ignore_input() {
        let db = Database::from_json(json!({
            "name": "pubmlst_x_isolates",
            "description": "X isolates",
            "href": "https://rest.pubmlst.org/db/pubmlst_x_isolates",
            "category": "seqdef",
            "subject": "overridden",
        }))
        .unwrap();
        assert_eq!(db.category(), DatabaseCategory::Isolates);
        assert_eq!(db.subject(), "X");
    }

    #[test]
    fn test_missing_href() {
        let err = Database::from_json(json!({"name": "x", "description": "y"})).unwrap_err();
        assert!(err.is_shape());
        assert!(err.to_string().contains("href"));
    }

    #[test]
    fn test_full_database_optional_links() {
        let full = FullDatabase::from_json(json!({
            "isolates": "https://rest.pubmlst.org/db/pubmlst_x_isolates/isolates",
            "loci": null,
        }))
        .unwrap();
        assert!(full.schemes.is_none());
        assert!(full.loci.is_none());
        assert!(full.isolates.is_some());
    }

    #[test]
    fn test_missing_schemes_link() {
        let full = FullDatabase::default();
        let err = full.link("schemes", &full.schemes).unwrap_err();
        assert!(err.is_lookup());
        assert_eq!(err.to_string(), "FullDatabase has no 'schemes' link");
    }

    #[test]
    fn test_expand_and_list_schemes() {
        let href = "https://rest.pubmlst.org/db/pubmlst_x_seqdef";
        let db = Database::from_json(json!({
            "name": "pubmlst_x_seqdef",
            "description": "X sequence/profile definitions",
            "href": href,
        }))
        .unwrap();
        let client = crate::traits::FakeFetch::new("https://rest.pubmlst.org/")
            .with_json(href, json!({"schemes": format!("{href}/schemes"), "loci": format!("{href}/loci")}))
            .with_json(
                &format!("{href}/schemes"),
                json!({
                    "records": 2,
                    "schemes": [
                        {"scheme": format!("{href}/schemes/1"), "description": "MLST"},
                        {"scheme": format!("{href}/schemes/2"), "description": "X cgMLST v2"}
                    ]
                }),
            );

        let full = tokio_test::block_on(db.expand(&client)).unwrap();
        let all = tokio_test::block_on(full.schemes(&client, &SearchQuery::default())).unwrap();
        assert_eq!(all.len(), 2);

        let cgmlst =
            tokio_test::block_on(full.schemes(&client, &SearchQuery::category("cgMLST"))).unwrap();
        assert_eq!(cgmlst.len(), 1);
        assert_eq!(cgmlst[0].index(), "2");

        let by_url =
            tokio_test::block_on(full.schemes(&client, &SearchQuery::contains("schemes/1"))).unwrap();
        assert_eq!(by_url[0].description, "MLST");
    }
}
