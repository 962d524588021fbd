//! Locus and allele models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::assemble::{nested_list, raw_record, string_or_number, FromJson};
use crate::collection::{Entity, Model, SchemeList};
use crate::error::{BigsdbError, Result};
use crate::fasta::AlleleFasta;
use crate::models::scheme::last_segment;
use crate::traits::Fetch;

/// Full locus record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Locus {
    pub id: String,
    pub data_type: String,
    /// Schemes this locus belongs to.
    pub schemes: SchemeList,
    pub coding_sequence: bool,
    /// Link to the allele listing.
    pub alleles: String,
    pub allele_id_format: String,
    pub length_varies: bool,
    pub length: Option<u64>,
    pub curators: Vec<String>,
    /// Link to every allele of the locus in FASTA format.
    pub alleles_fasta: String,
}

#[serde_as]
#[derive(Deserialize)]
struct RawLocus {
    id: String,
    data_type: String,
    #[serde(default)]
    schemes: Vec<Value>,
    coding_sequence: bool,
    alleles: String,
    allele_id_format: String,
    length_varies: bool,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    length: Option<u64>,
    #[serde(default)]
    curators: Vec<String>,
    alleles_fasta: String,
}

impl FromJson for Locus {
    const NAME: &'static str = "Locus";

    fn from_json(value: Value) -> Result<Self> {
        let raw: RawLocus = raw_record(Self::NAME, value)?;
        Ok(Self {
            schemes: nested_list(Self::NAME, "schemes", raw.schemes)?,
            id: raw.id,
            data_type: raw.data_type,
            coding_sequence: raw.coding_sequence,
            alleles: raw.alleles,
            allele_id_format: raw.allele_id_format,
            length_varies: raw.length_varies,
            length: raw.length,
            curators: raw.curators,
            alleles_fasta: raw.alleles_fasta,
        })
    }
}

impl Model for Locus {
    const FIELDS: &'static [&'static str] =
        &["id", "data_type", "alleles", "allele_id_format", "alleles_fasta"];

    fn url_attribute() -> Option<&'static str> {
        Some("alleles_fasta")
    }

    fn attribute(&self, field: &str) -> Option<&str> {
        match field {
            "id" => Some(&self.id),
            "data_type" => Some(&self.data_type),
            "alleles" => Some(&self.alleles),
            "allele_id_format" => Some(&self.allele_id_format),
            "alleles_fasta" => Some(&self.alleles_fasta),
            _ => None,
        }
    }

    fn into_entity(self) -> Entity {
        Entity::Locus(self)
    }

    fn from_entity(entity: Entity) -> std::result::Result<Self, Entity> {
        match entity {
            Entity::Locus(locus) => Ok(locus),
            other => Err(other),
        }
    }
}

impl Locus {
    /// Fetch and assemble the locus at `url`.
    pub async fn fetch<F>(client: &F, url: &str) -> Result<Self>
    where
        F: Fetch + ?Sized,
    {
        tracing::debug!(%url, "fetching locus");
        Self::from_json(client.fetch_json(url).await?)
    }

    /// Download the allele FASTA of this locus.
    pub async fn alleles_fasta<F>(&self, client: &F) -> Result<AlleleFasta>
    where
        F: Fetch + ?Sized,
    {
        let text = client.fetch_text(&self.alleles_fasta).await?;
        Ok(AlleleFasta::from_text(text))
    }

    /// Fetch a single allele by identifier.
    pub async fn allele<F>(&self, client: &F, allele_id: &str) -> Result<Allele>
    where
        F: Fetch + ?Sized,
    {
        let url = format!(
            "{}/{}",
            self.alleles.trim_end_matches('/'),
            urlencoding::encode(allele_id)
        );
        Allele::from_json(client.fetch_json(&url).await?)
    }
}

/// A catalogued allele.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allele {
    /// Link to the locus.
    pub locus: String,
    /// Link to the curator.
    pub curator: String,
    pub status: String,
    #[serde(deserialize_with = "string_or_number")]
    pub allele_id: String,
    pub date_entered: NaiveDate,
    pub datestamp: NaiveDate,
    /// Link to the submitting user.
    pub sender: String,
    pub sequence: String,
}

impl FromJson for Allele {
    const NAME: &'static str = "Allele";

    fn from_json(value: Value) -> Result<Self> {
        raw_record(Self::NAME, value)
    }
}

/// Paging links of a listing. Parsed as data; pages are not followed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub return_all: Option<String>,
}

/// Locus listing of a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocusCollection {
    pub records: u64,
    #[serde(default)]
    pub loci: Vec<String>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl FromJson for LocusCollection {
    const NAME: &'static str = "LocusCollection";

    fn from_json(value: Value) -> Result<Self> {
        raw_record(Self::NAME, value)
    }
}

impl LocusCollection {
    pub fn index(&self) -> LocusIndex {
        LocusIndex::from_urls(self.loci.iter().map(String::as_str))
    }
}

/// Locus name → locus link lookup, in the order the links were listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocusIndex {
    entries: Vec<(String, String)>,
}

impl LocusIndex {
    /// Key each link on its last path segment. A repeated name keeps its
    /// first position and takes the later link.
    pub fn from_urls<'a, I>(urls: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for url in urls {
            let name = last_segment(url);
            match entries.iter_mut().find(|(existing, _)| existing == name) {
                Some(entry) => entry.1 = url.to_string(),
                None => entries.push((name.to_string(), url.to_string())),
            }
        }
        Self { entries }
    }

    /// Link of the named locus.
    ///
    /// # Errors
    ///
    /// Returns [`BigsdbError::NotFound`] for unknown names.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, url)| url.as_str())
            .ok_or_else(|| BigsdbError::NotFound {
                entity_type: "Locus",
                id: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
