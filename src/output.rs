//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use serde_json::Value;

use crate::{Database, FullScheme, Locus, RmlstResult, SequenceQueryResult};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn divider(header: &str) -> String {
    "─".repeat(header.chars().count().max(30))
}

impl PrettyPrint for Database {
    fn pretty_print(&self) -> String {
        let header = format!("Database: {}", self.name);
        let lines = [
            divider(&header),
            format!("Description:    {}", self.description),
            format!("Subject:        {}", self.subject()),
            format!("Category:       {}", self.category()),
            format!("Link:           {}", self.href),
        ];
        format!("{}\n{}", header, lines.join("\n"))
    }
}

impl PrettyPrint for FullScheme {
    fn pretty_print(&self) -> String {
        let header = format!("Scheme {}: {}", self.id, self.description);
        let mut lines = vec![
            divider(&header),
            format!("Category:       {}", self.category()),
            format!("Loci:           {}", self.locus_count),
        ];
        lines.insert(0, header);

        if let Some(ref key) = self.primary_key_field {
            lines.push(format!("Primary key:    {}", key));
        }

        if let Some(records) = self.records {
            lines.push(format!("Profiles:       {}", records));
        }

        if let Some(updated) = self.last_updated {
            lines.push(format!("Last updated:   {}", updated.format("%Y-%m-%d")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Locus {
    fn pretty_print(&self) -> String {
        let header = format!("Locus: {}", self.id);
        let mut lines = vec![
            divider(&header),
            format!("Data type:      {}", self.data_type),
            format!("Coding:         {}", if self.coding_sequence { "yes" } else { "no" }),
            format!("Allele IDs:     {}", self.allele_id_format),
        ];
        lines.insert(0, header);

        match (self.length, self.length_varies) {
            (Some(length), true) => lines.push(format!("Length:         ~{} (varies)", length)),
            (Some(length), false) => lines.push(format!("Length:         {}", length)),
            (None, _) => {}
        }

        if !self.schemes.is_empty() {
            let schemes: Vec<&str> = self.schemes.iter().map(|s| s.description.as_str()).collect();
            lines.push(format!("Schemes:        {}", schemes.join(", ")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for SequenceQueryResult {
    fn pretty_print(&self) -> String {
        let header = format!("Exact matches: {}", self.exact_matches.len());
        let mut lines = vec![header.clone(), divider(&header)];

        for hit in &self.exact_matches {
            let locus = hit.allele_name.as_deref().unwrap_or("?");
            let mut line = format!("{:<16}{}", locus, hit.allele_id);
            if let (Some(start), Some(end)) = (hit.start, hit.end) {
                line.push_str(&format!("  [{}..{}]", start, end));
            }
            if let Some(ref contig) = hit.contig {
                line.push_str(&format!("  {}", contig));
            }
            lines.push(line);
        }

        if let Some(ref partial) = self.partial_matches {
            if !partial.is_empty() {
                lines.push(format!("Partial matches: {} loci", partial.len()));
            }
        }

        if let Some(ref fields) = self.fields {
            for (name, value) in fields {
                lines.push(format!("{:<16}{}", format!("{}:", name), display_value(value)));
            }
        }

        lines.join("\n")
    }
}

impl PrettyPrint for RmlstResult {
    fn pretty_print(&self) -> String {
        let mut lines = vec![self.matches.pretty_print(), String::new()];

        if self.taxon_prediction.is_empty() {
            lines.push("Taxon prediction: none".to_string());
        }
        for taxon in &self.taxon_prediction {
            lines.push(format!(
                "Taxon:          {} ({}, {}% support)",
                taxon.taxon, taxon.rank, taxon.support
            ));
            if !taxon.taxonomy.is_empty() {
                lines.push(format!("Lineage:        {}", taxon.taxonomy.join(" > ")));
            }
        }

        lines.join("\n")
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
