//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the seqtypo binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BIGSdb sequence-typing command-line interface.
#[derive(Parser, Debug)]
#[command(name = "seqtypo", about = "BIGSdb sequence-typing API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Base URL of the BIGSdb API.
    #[arg(long, global = true, env = "BIGSDB_API_URL")]
    pub url: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true, default_value = "false")]
    pub insecure: bool,

    /// Log requests and navigation steps to stderr.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the resources published by the server.
    Resources,

    /// List databases, optionally filtered on their subject.
    Databases {
        /// Pattern matched against the database subject.
        #[arg(long)]
        pattern: Option<String>,

        /// Restrict to a category (seqdef, isolates, others).
        #[arg(long)]
        category: Option<String>,

        /// Require the whole subject to match.
        #[arg(long, default_value = "false")]
        exact: bool,

        /// Treat the pattern as a regular expression.
        #[arg(long, default_value = "false")]
        regex: bool,
    },

    /// Show the details of one database.
    Database {
        /// Database name, e.g. pubmlst_neisseria_seqdef.
        name: String,
    },

    /// List the schemes of a sequence definition database.
    Schemes {
        /// Database name, e.g. pubmlst_neisseria_seqdef.
        database: String,

        /// Substring matched against the scheme description.
        #[arg(long)]
        pattern: Option<String>,

        /// Restrict to a category (MLST, cgMLST, others).
        #[arg(long)]
        category: Option<String>,
    },

    /// Show the details of one scheme.
    Scheme {
        /// Database name.
        database: String,

        /// Scheme index, the last segment of the scheme link.
        scheme: String,
    },

    /// List the loci of a scheme.
    Loci {
        /// Database name.
        database: String,

        /// Scheme index, the last segment of the scheme link.
        scheme: String,
    },

    /// Show the full record of one locus of a scheme.
    Locus {
        /// Database name.
        database: String,

        /// Scheme index.
        scheme: String,

        /// Locus name.
        locus: String,
    },

    /// Print every allele of one or more loci as FASTA.
    Alleles {
        /// Database name.
        database: String,

        /// Scheme index.
        scheme: String,

        /// Locus names. Unknown loci are skipped with a warning.
        #[arg(required = true)]
        loci: Vec<String>,
    },

    /// Print the allelic profiles of a scheme.
    Profiles {
        /// Database name.
        database: String,

        /// Scheme index.
        scheme: String,
    },

    /// Type a sequence against a scheme.
    Query {
        /// Database name.
        database: String,

        /// Scheme index.
        scheme: String,

        /// FASTA or raw sequence file.
        file: PathBuf,
    },

    /// Identify the species of a sequence with rMLST.
    Rmlst {
        /// FASTA or raw sequence file.
        file: PathBuf,
    },
}
