//! Status command - list stored generations

use crate::cli::args::OutputFormat;
use crate::error::LarderResult;
use crate::manifest::Manifest;
use crate::store::{DiskStore, Generation, GenerationState, GenerationStore};
use console::style;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Execute the status command
pub async fn execute(
    manifest_path: &Path,
    store: Option<PathBuf>,
    format: OutputFormat,
) -> LarderResult<()> {
    let store = DiskStore::new(super::store_root(store));
    let generations = store.list().await?;

    // The configured version gets a marker when the manifest is readable;
    // status itself never requires one.
    let configured = match Manifest::load(manifest_path).await {
        Ok(manifest) => Some(manifest.version),
        Err(e) => {
            debug!("no manifest for status marker: {}", e);
            None
        }
    };

    if generations.is_empty() {
        println!("No generations stored.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&generations, configured.as_deref()),
        OutputFormat::Json => print_json(&generations, configured.as_deref())?,
        OutputFormat::Plain => print_plain(&generations),
    }

    Ok(())
}

fn print_table(generations: &[Generation], configured: Option<&str>) {
    println!(
        "{:<30} {:<12} {:>8} {:<20}",
        "GENERATION", "STATE", "ENTRIES", "CREATED"
    );
    println!("{}", "-".repeat(74));

    for generation in generations {
        let state_display = match generation.state {
            GenerationState::Complete => style("complete").green().to_string(),
            GenerationState::Installing => style("installing").yellow().to_string(),
        };
        let marker = if Some(generation.name.as_str()) == configured {
            " *"
        } else {
            ""
        };
        let created = generation.created_at.format("%Y-%m-%d %H:%M").to_string();

        println!(
            "{:<30} {:<12} {:>8} {:<20}",
            format!("{}{}", generation.name, marker),
            state_display,
            generation.entries,
            created
        );
    }

    println!();
    println!("Total: {} generation(s)", generations.len());
}

fn print_json(generations: &[Generation], configured: Option<&str>) -> LarderResult<()> {
    #[derive(serde::Serialize)]
    struct GenerationJson {
        name: String,
        state: String,
        entries: usize,
        created_at: String,
        configured: bool,
    }

    let json: Vec<GenerationJson> = generations
        .iter()
        .map(|g| GenerationJson {
            name: g.name.clone(),
            state: g.state.to_string(),
            entries: g.entries,
            created_at: g.created_at.to_rfc3339(),
            configured: Some(g.name.as_str()) == configured,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_plain(generations: &[Generation]) {
    for generation in generations {
        println!("{}", generation.name);
    }
}
