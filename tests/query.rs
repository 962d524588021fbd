//! Sequence query tests against a mocked BIGSdb server.

use seqtypo::{
    encode_base64, query_rmlst_at, query_sequence, sequence_from_text, BigsdbClient, FromJson,
    QueryOptions, Scheme,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEQUENCE: &str = "TTTGATACTGTTGCCGATGCAAAA";

#[tokio::test]
async fn test_scheme_query_sends_raw_sequence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/pubmlst_neisseria_seqdef/schemes/1/sequence"))
        .and(body_json(json!({
            "sequence": SEQUENCE,
            "details": true,
            "partial_matches": true,
            "base64": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "exact_matches": {
                "abcZ": [{"allele_id": "1", "start": 1, "end": 24, "orientation": "forward"}],
                "adk": [{"allele_id": 3}]
            },
            "fields": {"ST": 11, "clonal_complex": "ST-11 complex"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BigsdbClient::new(&server.uri()).unwrap();
    let scheme = Scheme::from_json(json!({
        "scheme": format!("{}/db/pubmlst_neisseria_seqdef/schemes/1", server.uri()),
        "description": "MLST"
    }))
    .unwrap();

    let result = scheme
        .query(&client, SEQUENCE, QueryOptions::scheme())
        .await
        .unwrap();

    assert_eq!(result.exact_matches.len(), 2);
    assert_eq!(result.exact_matches[0].allele_name.as_deref(), Some("abcZ"));
    assert_eq!(result.exact_matches[0].orientation.as_deref(), Some("forward"));
    assert_eq!(result.exact_matches[1].allele_id, "3");
    assert_eq!(result.field("ST"), Some(&json!(11)));
}

#[tokio::test]
async fn test_multi_contig_fasta_keeps_headers() {
    let server = MockServer::start().await;
    let file = format!(">contig_1 len=24\n{SEQUENCE}\n>contig_2\nGGGCCCAAATTT\n");
    let expected = format!(">contig_1 len=24\n{SEQUENCE}\n>contig_2\nGGGCCCAAATTT");

    Mock::given(method("POST"))
        .and(path("/db/pubmlst_neisseria_seqdef/schemes/1/sequence"))
        .and(body_json(json!({
            "sequence": expected,
            "details": true,
            "partial_matches": true,
            "base64": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "exact_matches": {
                "abcZ": [{"allele_id": "1", "contig": "contig_1", "start": 1, "end": 24}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BigsdbClient::new(&server.uri()).unwrap();
    let sequence = sequence_from_text(&file).unwrap();
    let result = query_sequence(
        &client,
        "db/pubmlst_neisseria_seqdef/schemes/1/sequence",
        &sequence,
        QueryOptions::scheme(),
    )
    .await
    .unwrap();

    assert_eq!(result.exact_matches[0].contig.as_deref(), Some("contig_1"));
}

#[tokio::test]
async fn test_generic_query_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/pubmlst_test_seqdef/sequence"))
        .and(body_json(json!({
            "sequence": SEQUENCE,
            "details": false,
            "partial_matches": true,
            "base64": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "partial_matches": {"abcZ": {"allele": "7", "identity": 99.1}}
        })))
        .mount(&server)
        .await;

    let client = BigsdbClient::new(&server.uri()).unwrap();
    let result = query_sequence(
        &client,
        "db/pubmlst_test_seqdef/sequence",
        SEQUENCE,
        QueryOptions::default(),
    )
    .await
    .unwrap();

    assert!(result.exact_matches.is_empty());
    assert!(!result.is_empty());
}

#[tokio::test]
async fn test_rmlst_query_with_base64_payload() {
    let server = MockServer::start().await;
    let encoded = encode_base64(&format!(">contig_1\n{SEQUENCE}\n"));

    Mock::given(method("POST"))
        .and(path("/db/pubmlst_rmlst_seqdef_kiosk/schemes/1/sequence"))
        .and(body_json(json!({
            "sequence": encoded,
            "details": true,
            "partial_matches": false,
            "base64": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "exact_matches": {"BACT000001": [{"allele_id": "1"}]},
            "taxon_prediction": [{
                "taxon": "Neisseria meningitidis",
                "taxonomy": "Bacteria > Proteobacteria > Betaproteobacteria > Neisseriales > Neisseriaceae > Neisseria",
                "support": 100,
                "rank": "SPECIES"
            }]
        })))
        .mount(&server)
        .await;

    let client = BigsdbClient::new(&server.uri()).unwrap();
    let endpoint = format!("{}/db/pubmlst_rmlst_seqdef_kiosk/schemes/1/sequence", server.uri());
    let result = query_rmlst_at(&client, &endpoint, &encoded, QueryOptions::rmlst())
        .await
        .unwrap();

    let taxon = result.best_taxon().unwrap();
    assert_eq!(taxon.taxon, "Neisseria meningitidis");
    assert_eq!(taxon.taxonomy.last().map(String::as_str), Some("Neisseria"));
    assert_eq!(result.matches.exact_matches.len(), 1);
}

#[tokio::test]
async fn test_query_rejected_by_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/pubmlst_test_seqdef/schemes/1/sequence"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": 400,
            "message": "Sequence is empty."
        })))
        .mount(&server)
        .await;

    let client = BigsdbClient::new(&server.uri()).unwrap();
    let err = query_sequence(
        &client,
        "db/pubmlst_test_seqdef/schemes/1/sequence",
        "",
        QueryOptions::scheme(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert!(err.to_string().contains("Sequence is empty."));
}
