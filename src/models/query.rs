//! Sequence query payloads and results.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::assemble::{json_type, raw_record, string_or_number, FromJson};
use crate::config::RMLST_QUERY_URL;
use crate::error::{BigsdbError, Result};
use crate::traits::Fetch;

/// Non-letter symbols of IUPAC nucleotide and amino-acid text: gap and stop.
const SEQUENCE_SYMBOLS: &[u8] = b"-*";

/// Flags sent along with a query sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryOptions {
    /// Ask for match positions and linked data.
    pub details: bool,
    /// Report best partial matches for loci without an exact match.
    pub partial_matches: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            details: false,
            partial_matches: true,
        }
    }
}

impl QueryOptions {
    /// Defaults for scheme queries.
    pub fn scheme() -> Self {
        Self {
            details: true,
            partial_matches: true,
        }
    }

    /// Defaults for rMLST species identification.
    pub fn rmlst() -> Self {
        Self {
            details: true,
            partial_matches: false,
        }
    }
}

#[derive(Serialize)]
struct SequencePayload<'a> {
    sequence: &'a str,
    details: bool,
    partial_matches: bool,
    base64: bool,
}

/// Whether `sequence` should be flagged as base64-encoded.
///
/// Nucleotide and peptide text is also valid base64 alphabet, so anything
/// made only of IUPAC letters, gaps, stops and whitespace counts as raw
/// sequence. Otherwise the text must decode to printable text.
pub fn is_base64(sequence: &str) -> bool {
    let trimmed = sequence.trim();
    if trimmed.is_empty() || is_sequence_text(trimmed) {
        return false;
    }
    match STANDARD.decode(trimmed) {
        Ok(bytes) => is_printable_text(&bytes),
        Err(_) => false,
    }
}

fn is_sequence_text(sequence: &str) -> bool {
    sequence
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .all(|b| b.is_ascii_alphabetic() || SEQUENCE_SYMBOLS.contains(&b))
}

fn is_printable_text(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
}

/// Base64-encode a sequence for submission.
pub fn encode_base64(sequence: &str) -> String {
    STANDARD.encode(sequence.as_bytes())
}

async fn submit_sequence<F>(
    client: &F,
    endpoint: &str,
    sequence: &str,
    options: QueryOptions,
) -> Result<Value>
where
    F: Fetch + ?Sized,
{
    let payload = SequencePayload {
        sequence,
        details: options.details,
        partial_matches: options.partial_matches,
        base64: is_base64(sequence),
    };
    tracing::debug!(
        %endpoint,
        length = sequence.len(),
        base64 = payload.base64,
        "submitting sequence"
    );
    client.post_json(endpoint, &serde_json::to_value(&payload)?).await
}

/// Submit a sequence to a query endpoint and assemble the result.
pub async fn query_sequence<F>(
    client: &F,
    endpoint: &str,
    sequence: &str,
    options: QueryOptions,
) -> Result<SequenceQueryResult>
where
    F: Fetch + ?Sized,
{
    let value = submit_sequence(client, endpoint, sequence, options).await?;
    SequenceQueryResult::from_json(value)
}

/// Identify a genome against the public rMLST scheme.
pub async fn query_rmlst<F>(client: &F, sequence: &str, options: QueryOptions) -> Result<RmlstResult>
where
    F: Fetch + ?Sized,
{
    query_rmlst_at(client, RMLST_QUERY_URL, sequence, options).await
}

/// rMLST identification against a specific endpoint (mirrors, test servers).
pub async fn query_rmlst_at<F>(
    client: &F,
    endpoint: &str,
    sequence: &str,
    options: QueryOptions,
) -> Result<RmlstResult>
where
    F: Fetch + ?Sized,
{
    let value = submit_sequence(client, endpoint, sequence, options).await?;
    RmlstResult::from_json(value)
}

/// One exact allele match, tagged with the locus it was reported under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleExactResult {
    pub allele_id: String,
    pub href: Option<String>,
    /// Name of the locus the match was reported under.
    pub allele_name: Option<String>,
    pub start: Option<u64>,
    pub end: Option<u64>,
    pub orientation: Option<String>,
    pub length: Option<u64>,
    pub contig: Option<String>,
    pub linked_data: Option<Value>,
}

#[serde_as]
#[derive(Deserialize)]
struct RawExactMatch {
    #[serde(deserialize_with = "string_or_number")]
    allele_id: String,
    #[serde(default)]
    href: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    start: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    end: Option<u64>,
    #[serde(default)]
    orientation: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    length: Option<u64>,
    #[serde(default)]
    contig: Option<String>,
    #[serde(default)]
    linked_data: Option<Value>,
}

impl AlleleExactResult {
    const NAME: &'static str = "AlleleExactResult";

    fn build(locus: &str, raw: RawExactMatch) -> Self {
        Self {
            allele_id: raw.allele_id,
            href: raw.href,
            allele_name: Some(locus.to_string()),
            start: raw.start,
            end: raw.end,
            orientation: raw.orientation,
            length: raw.length,
            contig: raw.contig,
            linked_data: raw.linked_data,
        }
    }
}

/// Result of a sequence query.
///
/// `exact_matches` is flattened from the per-locus mapping of the response,
/// in response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SequenceQueryResult {
    pub exact_matches: Vec<AlleleExactResult>,
    pub partial_matches: Option<Map<String, Value>>,
    /// Scheme fields resolved from the matches (e.g. `ST`, `clonal_complex`).
    pub fields: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawQueryResult {
    #[serde(default)]
    exact_matches: Option<Map<String, Value>>,
    #[serde(default)]
    partial_matches: Option<Map<String, Value>>,
    #[serde(default)]
    fields: Option<Map<String, Value>>,
}

impl FromJson for SequenceQueryResult {
    const NAME: &'static str = "SequenceQueryResult";

    fn from_json(value: Value) -> Result<Self> {
        let raw: RawQueryResult = raw_record(Self::NAME, value)?;

        let mut exact_matches = Vec::new();
        for (locus, matches) in raw.exact_matches.unwrap_or_default() {
            let matches = match matches {
                Value::Array(matches) => matches,
                other => {
                    return Err(BigsdbError::shape(
                        Self::NAME,
                        format!("exact matches for '{locus}' must be an array, got {}", json_type(&other)),
                    ))
                }
            };
            for entry in matches {
                let raw_match: RawExactMatch = raw_record(AlleleExactResult::NAME, entry)
                    .map_err(|e| BigsdbError::shape(Self::NAME, format!("locus '{locus}': {e}")))?;
                exact_matches.push(AlleleExactResult::build(&locus, raw_match));
            }
        }

        Ok(Self {
            exact_matches,
            partial_matches: raw.partial_matches,
            fields: raw.fields,
        })
    }
}

impl SequenceQueryResult {
    /// Exact matches reported under `locus`.
    pub fn matches_for<'a>(&'a self, locus: &'a str) -> impl Iterator<Item = &'a AlleleExactResult> {
        self.exact_matches
            .iter()
            .filter(move |m| m.allele_name.as_deref() == Some(locus))
    }

    /// A scheme field value such as `ST`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|fields| fields.get(name))
    }

    /// No exact and no partial matches.
    pub fn is_empty(&self) -> bool {
        self.exact_matches.is_empty()
            && self.partial_matches.as_ref().map_or(true, Map::is_empty)
    }
}

/// A taxon predicted by rMLST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Taxon {
    pub taxon: String,
    /// Lineage from the root, split on `" > "`.
    pub taxonomy: Vec<String>,
    /// Percentage of rMLST loci supporting the prediction.
    pub support: u32,
    pub rank: String,
}

#[serde_as]
#[derive(Deserialize)]
struct RawTaxon {
    taxon: String,
    taxonomy: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    support: u32,
    rank: String,
}

impl FromJson for Taxon {
    const NAME: &'static str = "Taxon";

    fn from_json(value: Value) -> Result<Self> {
        let raw: RawTaxon = raw_record(Self::NAME, value)?;
        Ok(Self {
            taxonomy: raw.taxonomy.split(" > ").map(str::to_string).collect(),
            taxon: raw.taxon,
            support: raw.support,
            rank: raw.rank,
        })
    }
}

/// rMLST query result: allele matches plus taxon predictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RmlstResult {
    #[serde(flatten)]
    pub matches: SequenceQueryResult,
    pub taxon_prediction: Vec<Taxon>,
}

impl FromJson for RmlstResult {
    const NAME: &'static str = "RmlstResult";

    fn from_json(value: Value) -> Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(BigsdbError::shape(
                    Self::NAME,
                    format!("expected a JSON object, got {}", json_type(&other)),
                ))
            }
        };

        let taxon_prediction = match object.remove("taxon_prediction") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(values)) => values
                .into_iter()
                .map(Taxon::from_json)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| {
                    BigsdbError::shape(Self::NAME, format!("error instantiating Taxon objects: {e}"))
                })?,
            Some(other) => {
                return Err(BigsdbError::shape(
                    Self::NAME,
                    format!("taxon_prediction must be an array, got {}", json_type(&other)),
                ))
            }
        };

        Ok(Self {
            matches: SequenceQueryResult::from_json(Value::Object(object))?,
            taxon_prediction,
        })
    }
}

impl RmlstResult {
    /// Prediction with the highest support.
    pub fn best_taxon(&self) -> Option<&Taxon> {
        self.taxon_prediction.iter().max_by_key(|t| t.support)
    }
}
