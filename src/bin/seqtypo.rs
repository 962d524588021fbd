//! BIGSdb sequence-typing CLI binary.
//!
//! A command-line interface for browsing BIGSdb databases and typing sequences.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use seqtypo::cli::{Cli, Command};
use seqtypo::{
    find_database, list_databases, list_resources, query_rmlst, sequence_from_text, BigsdbClient,
    ClientConfig, Database, Expand, FullScheme, Locus, PrettyPrint, QueryOptions, Resource,
    Scheme, SearchQuery,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check BIGSDB_API_URL and BIGSDB_TIMEOUT_SECS");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_client(cli: &Cli) -> seqtypo::Result<BigsdbClient> {
    let mut config = ClientConfig::from_env()?;
    if let Some(ref url) = cli.url {
        config.base_url = url.clone();
    }
    if cli.insecure {
        config.ssl_verify = false;
    }
    BigsdbClient::with_config(config)
}

async fn run(client: &BigsdbClient, cli: Cli) -> seqtypo::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Resources => {
            let resources = list_resources(client).await?;
            output_list(resources.as_slice(), json, |r| ResourceRow::from(r))
        }
        Command::Databases {
            pattern,
            category,
            exact,
            regex,
        } => {
            let query = SearchQuery {
                pattern,
                category,
                exact_match: exact,
                use_regex: regex,
            };
            let databases = list_databases(client, &query).await?;
            output_list(databases.as_slice(), json, |d| DatabaseRow::from(d))
        }
        Command::Database { name } => {
            let database = find_database(client, &name).await?;
            output_single(&database, json)
        }
        Command::Scheme { database, scheme } => {
            let scheme = open_scheme(client, &database, &scheme).await?;
            output_single(&scheme, json)
        }
        Command::Locus {
            database,
            scheme,
            locus,
        } => {
            let scheme = open_scheme(client, &database, &scheme).await?;
            let locus = Locus::fetch(client, scheme.locus_index().get(&locus)?).await?;
            output_single(&locus, json)
        }
        Command::Schemes {
            database,
            pattern,
            category,
        } => handle_schemes(client, &database, pattern, category, json).await,
        Command::Loci { database, scheme } => {
            let scheme = open_scheme(client, &database, &scheme).await?;
            if json {
                let index: serde_json::Map<String, serde_json::Value> = scheme
                    .locus_index()
                    .iter()
                    .map(|(name, url)| (name.to_string(), url.into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&index)?);
            } else {
                let rows: Vec<LocusRow> = scheme
                    .locus_index()
                    .iter()
                    .map(|(name, link)| LocusRow {
                        locus: name.to_string(),
                        link: link.to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
            Ok(())
        }
        Command::Alleles {
            database,
            scheme,
            loci,
        } => handle_alleles(client, &database, &scheme, &loci).await,
        Command::Profiles { database, scheme } => {
            let scheme = open_scheme(client, &database, &scheme).await?;
            let table = scheme.profiles(client).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                println!("{}", table.headers.join("\t"));
                for row in &table.rows {
                    println!("{}", row.join("\t"));
                }
            }
            Ok(())
        }
        Command::Query {
            database,
            scheme,
            file,
        } => {
            let sequence = sequence_from_text(&read_sequence_file(&file)?)?;
            let scheme = open_summary_scheme(client, &database, &scheme).await?;
            let result = scheme.query(client, &sequence, QueryOptions::scheme()).await?;
            output_single(&result, json)
        }
        Command::Rmlst { file } => {
            let sequence = sequence_from_text(&read_sequence_file(&file)?)?;
            let result = query_rmlst(client, &sequence, QueryOptions::rmlst()).await?;
            output_single(&result, json)
        }
    }
}

fn read_sequence_file(file: &Path) -> seqtypo::Result<String> {
    tracing::debug!(file = %file.display(), "reading sequence file");
    std::fs::read_to_string(file).map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot read {}: {e}", file.display())).into()
    })
}

async fn handle_schemes(
    client: &BigsdbClient,
    database: &str,
    pattern: Option<String>,
    category: Option<String>,
    json: bool,
) -> seqtypo::Result<()> {
    let full = find_database(client, database).await?.expand(client).await?;
    let query = category.map(SearchQuery::category).unwrap_or_default();
    let mut schemes = full.schemes(client, &query).await?;
    if let Some(pattern) = pattern {
        schemes = schemes.search("description", &SearchQuery::contains(pattern))?;
    }
    output_list(schemes.as_slice(), json, |s| SchemeRow::from(s))
}

async fn handle_alleles(
    client: &BigsdbClient,
    database: &str,
    scheme: &str,
    loci: &[String],
) -> seqtypo::Result<()> {
    let scheme = open_scheme(client, database, scheme).await?;
    for locus in loci {
        let fasta = match scheme.locus_alleles(client, locus).await {
            Ok(fasta) => fasta,
            Err(e) if e.is_lookup() => {
                tracing::warn!(locus = %locus, error = %e, "skipping locus");
                continue;
            }
            Err(e) => return Err(e),
        };
        for record in fasta {
            println!("{}", record?);
        }
    }
    Ok(())
}

async fn open_summary_scheme(
    client: &BigsdbClient,
    database: &str,
    index: &str,
) -> seqtypo::Result<Scheme> {
    let full = find_database(client, database).await?.expand(client).await?;
    let collection = full.scheme_collection(client).await?;
    Ok(collection.scheme_by_index(index)?.clone())
}

async fn open_scheme(
    client: &BigsdbClient,
    database: &str,
    index: &str,
) -> seqtypo::Result<FullScheme> {
    open_summary_scheme(client, database, index)
        .await?
        .expand(client)
        .await
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> seqtypo::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> seqtypo::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct ResourceRow {
    name: String,
    description: String,
    databases: usize,
}

impl From<&Resource> for ResourceRow {
    fn from(r: &Resource) -> Self {
        Self {
            name: r.name.clone(),
            description: r.description.clone(),
            databases: r.databases.len(),
        }
    }
}

#[derive(Tabled)]
struct DatabaseRow {
    name: String,
    subject: String,
    category: String,
}

impl From<&Database> for DatabaseRow {
    fn from(d: &Database) -> Self {
        Self {
            name: d.name.clone(),
            subject: d.subject().to_string(),
            category: d.category().to_string(),
        }
    }
}

#[derive(Tabled)]
struct SchemeRow {
    index: String,
    description: String,
    category: String,
}

impl From<&Scheme> for SchemeRow {
    fn from(s: &Scheme) -> Self {
        Self {
            index: s.index().to_string(),
            description: s.description.clone(),
            category: s.category().to_string(),
        }
    }
}

#[derive(Tabled)]
struct LocusRow {
    locus: String,
    link: String,
}
