//! Basic example walking the PubMLST Neisseria database.
//!
//! Run with:
//! ```
//! cargo run --example basic
//! ```

use seqtypo::{find_database, list_databases, BigsdbClient, Expand, SearchQuery};

#[tokio::main]
async fn main() -> seqtypo::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating BIGSdb client...");
    let client = BigsdbClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // Sequence definition databases about Neisseria
    println!("\n--- Neisseria Databases ---");
    let query = SearchQuery::contains("Neisseria").with_category("seqdef");
    let databases = list_databases(&client, &query).await?;
    for database in &databases {
        println!("  - {} ({})", database.name, database.subject());
    }

    // Schemes of the main database
    println!("\n--- MLST Schemes ---");
    let database = find_database(&client, "pubmlst_neisseria_seqdef").await?;
    let full = database.expand(&client).await?;
    let schemes = full.schemes(&client, &SearchQuery::category("MLST")).await?;
    for scheme in &schemes {
        println!("  {}. {}", scheme.index(), scheme.description);
    }

    // Loci and alleles of the first scheme
    if let Some(first) = schemes.get(0) {
        let scheme = first.expand(&client).await?;
        println!("\n--- {} ({} loci) ---", scheme.description, scheme.locus_count);

        let index = scheme.locus_index();
        for name in index.names().take(3) {
            let alleles = scheme.locus_alleles(&client, name).await?.collect_records()?;
            println!("  {}: {} alleles", name, alleles.len());
            if let Some(first_allele) = alleles.first() {
                println!("    first: {} ({} bp)", first_allele.id, first_allele.sequence.len());
            }
        }

        // Type the first allele of the first locus back against the scheme
        if let Some(name) = index.names().next() {
            let alleles = scheme.locus_alleles(&client, name).await?.collect_records()?;
            if let Some(allele) = alleles.first() {
                println!("\n--- Typing {} ---", allele.id);
                let result = first
                    .query(&client, &allele.sequence, seqtypo::QueryOptions::scheme())
                    .await?;
                for hit in &result.exact_matches {
                    println!(
                        "  {} = {}",
                        hit.allele_name.as_deref().unwrap_or("?"),
                        hit.allele_id
                    );
                }
            }
        };
    }

    println!("\nDone!");
    Ok(())
}
