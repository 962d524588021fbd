//! Scheme models and scheme-level navigation.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::assemble::{nested_list, raw_record, FromJson};
use crate::collection::{Entity, LocusList, Model, ModelList, SchemeList};
use crate::error::{BigsdbError, Result};
use crate::fasta::AlleleFasta;
use crate::models::locus::{Locus, LocusIndex};
use crate::models::query::{query_sequence, QueryOptions, SequenceQueryResult};
use crate::profiles::ProfileTable;
use crate::traits::{Expand, Fetch};

/// Typing scheme family, derived from the scheme description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchemeCategory {
    #[serde(rename = "MLST")]
    Mlst,
    #[serde(rename = "cgMLST")]
    Cgmlst,
    #[serde(rename = "others")]
    Others,
}

impl SchemeCategory {
    /// `cgMLST` wins over `MLST` since one contains the other.
    fn classify(description: &str) -> Self {
        if description.contains("cgMLST") {
            Self::Cgmlst
        } else if description.contains("MLST") {
            Self::Mlst
        } else {
            Self::Others
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mlst => "MLST",
            Self::Cgmlst => "cgMLST",
            Self::Others => "others",
        }
    }
}

impl fmt::Display for SchemeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheme as listed by a database or locus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scheme {
    /// Link to the [`FullScheme`].
    pub scheme: String,
    pub description: String,
    category: SchemeCategory,
    query_endpoint: String,
}

#[derive(Deserialize)]
struct RawScheme {
    scheme: String,
    description: String,
}

impl Scheme {
    pub fn category(&self) -> SchemeCategory {
        self.category
    }

    /// Sequence query URL: the scheme link followed by `/sequence`.
    pub fn query_endpoint(&self) -> &str {
        &self.query_endpoint
    }

    /// Last path segment of the scheme link (the scheme id).
    pub fn index(&self) -> &str {
        last_segment(&self.scheme)
    }

    /// Submit a sequence to this scheme's query endpoint.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = scheme.query(&client, "ATGC...", QueryOptions::scheme()).await?;
    /// for hit in &result.exact_matches {
    ///     println!("{:?}: {}", hit.allele_name, hit.allele_id);
    /// }
    /// ```
    pub async fn query<F>(
        &self,
        client: &F,
        sequence: &str,
        options: QueryOptions,
    ) -> Result<SequenceQueryResult>
    where
        F: Fetch + ?Sized,
    {
        query_sequence(client, &self.query_endpoint, sequence, options).await
    }

    fn build(raw: RawScheme) -> Self {
        let category = SchemeCategory::classify(&raw.description);
        let query_endpoint = format!("{}/sequence", raw.scheme);
        Self {
            scheme: raw.scheme,
            description: raw.description,
            category,
            query_endpoint,
        }
    }
}

pub(crate) fn last_segment(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

impl FromJson for Scheme {
    const NAME: &'static str = "Scheme";

    fn from_json(value: Value) -> Result<Self> {
        raw_record::<RawScheme>(Self::NAME, value).map(Self::build)
    }
}

impl Model for Scheme {
    const FIELDS: &'static [&'static str] = &["scheme", "description", "query_endpoint", "category"];

    fn url_attribute() -> Option<&'static str> {
        Some("scheme")
    }

    fn attribute(&self, field: &str) -> Option<&str> {
        match field {
            "scheme" => Some(&self.scheme),
            "description" => Some(&self.description),
            "query_endpoint" => Some(&self.query_endpoint),
            "category" => Some(self.category.as_str()),
            _ => None,
        }
    }

    fn category_label(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn into_entity(self) -> Entity {
        Entity::Scheme(self)
    }

    fn from_entity(entity: Entity) -> std::result::Result<Self, Entity> {
        match entity {
            Entity::Scheme(scheme) => Ok(scheme),
            other => Err(other),
        }
    }
}

#[async_trait]
impl Expand for Scheme {
    type Full = FullScheme;

    async fn expand<F>(&self, client: &F) -> Result<FullScheme>
    where
        F: Fetch + ?Sized,
    {
        tracing::debug!(scheme = %self.scheme, "expanding scheme");
        let value = client.fetch_json(&self.scheme).await?;
        FullScheme::from_json(value)
    }
}

/// Scheme listing of a database: `{"records": n, "schemes": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeCollection {
    pub records: u64,
    pub schemes: SchemeList,
}

#[derive(Deserialize)]
struct RawSchemeCollection {
    records: u64,
    schemes: Vec<Value>,
}

impl FromJson for SchemeCollection {
    const NAME: &'static str = "SchemeCollection";

    fn from_json(value: Value) -> Result<Self> {
        let raw: RawSchemeCollection = raw_record(Self::NAME, value)?;
        Ok(Self {
            records: raw.records,
            schemes: nested_list(Self::NAME, "schemes", raw.schemes)?,
        })
    }
}

impl SchemeCollection {
    /// Look up a scheme by the last path segment of its link.
    ///
    /// # Errors
    ///
    /// Returns [`BigsdbError::NotFound`] if no scheme has that index.
    pub fn scheme_by_index(&self, index: impl fmt::Display) -> Result<&Scheme> {
        let index = index.to_string();
        self.schemes
            .iter()
            .find(|scheme| scheme.index() == index)
            .ok_or(BigsdbError::NotFound {
                entity_type: "Scheme",
                id: index,
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scheme> {
        self.schemes.iter()
    }
}

impl<'a> IntoIterator for &'a SchemeCollection {
    type Item = &'a Scheme;
    type IntoIter = std::slice::Iter<'a, Scheme>;

    fn into_iter(self) -> Self::IntoIter {
        self.schemes.iter()
    }
}

/// Expanded scheme record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullScheme {
    pub id: u64,
    /// Locus links, in scheme order.
    pub loci: Vec<String>,
    pub description: String,
    pub locus_count: u64,
    pub has_primary_key_field: bool,
    pub primary_key_field: Option<String>,
    pub last_updated: Option<NaiveDate>,
    pub last_added: Option<NaiveDate>,
    /// Link to the tab-separated profile table.
    pub profiles_csv: Option<String>,
    pub records: Option<u64>,
    pub profiles: Option<String>,
    pub fields: Option<Vec<String>>,
    pub curators: Option<Vec<String>>,
    category: SchemeCategory,
}

#[serde_as]
#[derive(Deserialize)]
struct RawFullScheme {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    id: u64,
    #[serde(default)]
    loci: Vec<String>,
    description: String,
    locus_count: u64,
    has_primary_key_field: bool,
    #[serde(default)]
    primary_key_field: Option<String>,
    #[serde(default)]
    last_updated: Option<NaiveDate>,
    #[serde(default)]
    last_added: Option<NaiveDate>,
    #[serde(default)]
    profiles_csv: Option<String>,
    #[serde(default)]
    records: Option<u64>,
    #[serde(default)]
    profiles: Option<String>,
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default)]
    curators: Option<Vec<String>>,
}

impl FromJson for FullScheme {
    const NAME: &'static str = "FullScheme";

    fn from_json(value: Value) -> Result<Self> {
        let raw: RawFullScheme = raw_record(Self::NAME, value)?;
        Ok(Self {
            category: SchemeCategory::classify(&raw.description),
            id: raw.id,
            loci: raw.loci,
            description: raw.description,
            locus_count: raw.locus_count,
            has_primary_key_field: raw.has_primary_key_field,
            primary_key_field: raw.primary_key_field,
            last_updated: raw.last_updated,
            last_added: raw.last_added,
            profiles_csv: raw.profiles_csv,
            records: raw.records,
            profiles: raw.profiles,
            fields: raw.fields,
            curators: raw.curators,
        })
    }
}

impl FullScheme {
    pub fn category(&self) -> SchemeCategory {
        self.category
    }

    /// Locus name → locus link, keyed on the last path segment of each link.
    pub fn locus_index(&self) -> LocusIndex {
        LocusIndex::from_urls(self.loci.iter().map(String::as_str))
    }

    /// Allele sequences of one locus of this scheme.
    ///
    /// Fetches the locus record, then its FASTA endpoint. The returned
    /// iterator parses records lazily from the downloaded text.
    ///
    /// # Errors
    ///
    /// Returns [`BigsdbError::NotFound`] if the scheme has no such locus;
    /// callers walking many loci can skip those with [`BigsdbError::is_lookup`].
    pub async fn locus_alleles<F>(&self, client: &F, locus_name: &str) -> Result<AlleleFasta>
    where
        F: Fetch + ?Sized,
    {
        let index = self.locus_index();
        let url = index.get(locus_name)?;
        let locus = Locus::fetch(client, url).await?;
        locus.alleles_fasta(client).await
    }

    /// Allele sequences of every locus in scheme order, fetched one locus
    /// at a time.
    ///
    /// Any failure aborts the whole call.
    pub async fn all_locus_alleles<F>(&self, client: &F) -> Result<Vec<(String, AlleleFasta)>>
    where
        F: Fetch + ?Sized,
    {
        let index = self.locus_index();
        let mut fastas = Vec::with_capacity(index.len());
        for (name, url) in index.iter() {
            tracing::debug!(locus = name, "fetching alleles");
            let locus = Locus::fetch(client, url).await?;
            fastas.push((name.to_string(), locus.alleles_fasta(client).await?));
        }
        Ok(fastas)
    }

    /// Full records of every locus in this scheme, in scheme order.
    pub async fn fetch_loci<F>(&self, client: &F) -> Result<LocusList>
    where
        F: Fetch + ?Sized,
    {
        let mut loci = ModelList::default();
        for url in &self.loci {
            loci.append(Locus::fetch(client, url).await?);
        }
        Ok(loci)
    }

    /// Allelic profiles of this scheme.
    ///
    /// # Errors
    ///
    /// Returns [`BigsdbError::MissingLink`] if the scheme publishes no profiles.
    pub async fn profiles<F>(&self, client: &F) -> Result<ProfileTable>
    where
        F: Fetch + ?Sized,
    {
        let url = self.profiles_csv.as_deref().ok_or(BigsdbError::MissingLink {
            model: Self::NAME,
            field: "profiles_csv",
        })?;
        tracing::debug!(%url, "fetching profiles");
        ProfileTable::from_tsv(&client.fetch_text(url).await?)
    }
}
