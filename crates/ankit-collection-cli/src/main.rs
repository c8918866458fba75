//! Command-line tool for Anki collection files.
//!
//! Creates collections, adds and removes notes through the same save hooks
//! the library uses, and dumps or extracts existing files.

use std::path::PathBuf;

use ankit_collection::clock::now_millis;
use ankit_collection::defaults::basic_note_type;
use ankit_collection::{Card, CollectionStore, Note, Table};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// CLI Arguments
// ============================================================================

/// Inspect and edit Anki collection files.
#[derive(Parser, Debug)]
#[command(name = "ankit-col")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a collection file with the default deck and a "Basic" note type
    Init {
        /// Collection file to create
        collection: PathBuf,

        /// Skip adding the "Basic" note type
        #[arg(long, default_value_t = false)]
        empty: bool,
    },

    /// Add a note and one card per template of its note type
    AddNote {
        /// Collection file
        collection: PathBuf,

        /// Note type name
        #[arg(long, default_value = "Basic")]
        model: String,

        /// Deck name
        #[arg(long, default_value = "Default")]
        deck: String,

        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Field values in note type order
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Remove a note and its cards
    RemoveNote {
        /// Collection file
        collection: PathBuf,

        /// Note id
        id: i64,
    },

    /// Print the first row of every table as JSON
    Sample {
        /// Collection file
        collection: PathBuf,
    },

    /// List notes of the same type sharing a sort field
    Dupes {
        /// Collection file
        collection: PathBuf,
    },

    /// Extract an .apkg package into a directory
    Extract {
        /// Package file
        package: PathBuf,

        /// Output directory
        dest: PathBuf,
    },
}

// ============================================================================
// Commands
// ============================================================================

fn init(path: PathBuf, empty: bool) -> CliResult<()> {
    let mut store = CollectionStore::builder()
        .path(&path)
        .create_collection(true)
        .open()?;

    let mut col = store
        .collection()?
        .ok_or("collection row missing after create")?;
    if !empty && col.models.find_by_name("Basic").is_none() {
        col.add_note_type(basic_note_type(now_millis(), col.crt));
        store.save_collection(col)?;
        debug!("added Basic note type");
    }

    println!("Initialized {}", path.display());
    Ok(())
}

fn add_note(
    path: PathBuf,
    model: &str,
    deck: &str,
    tags: Vec<String>,
    mut fields: Vec<String>,
) -> CliResult<()> {
    let mut store = CollectionStore::open(&path)?;
    let mut col = store.collection()?.ok_or("not a collection: no col row")?;

    let note_type = col
        .models
        .find_by_name(model)
        .ok_or_else(|| format!("unknown note type: {model}"))?;
    let did = col
        .decks
        .find_by_name(deck)
        .map(|d| d.id)
        .ok_or_else(|| format!("unknown deck: {deck}"))?;

    let expected = note_type.flds.len();
    if fields.len() > expected {
        return Err(format!(
            "{model} has {expected} fields, got {}",
            fields.len()
        )
        .into());
    }
    fields.resize(expected, String::new());
    let mid = note_type.id;
    let templates = note_type.template_count();

    let note = store.insert_note(Note::new(mid, fields).with_tags(tags.iter().cloned()))?;
    for ord in 0..templates {
        store.insert_card(Card::new(note.id, did, ord as i64))?;
    }

    if !tags.is_empty() {
        for tag in &tags {
            col.register_tag(tag);
        }
        store.save_collection(col)?;
    }

    info!(id = note.id, cards = templates, "added note");
    println!("{}", note.id);
    Ok(())
}

fn remove_note(path: PathBuf, id: i64) -> CliResult<()> {
    let mut store = CollectionStore::open(&path)?;
    let cards = store.remove_note(id)?;
    println!("Removed note {id} and {cards} card(s)");
    Ok(())
}

fn sample(path: PathBuf) -> CliResult<()> {
    let store = CollectionStore::open(&path)?;
    let sample = store.sample()?;
    println!("{}", serde_json::to_string_pretty(&sample)?);
    Ok(())
}

fn dupes(path: PathBuf) -> CliResult<()> {
    let store = CollectionStore::open(&path)?;
    let groups = store.duplicate_groups()?;
    debug!(notes = store.count(Table::Notes)?, groups = groups.len(), "scanned notes");

    for group in &groups {
        let ids: Vec<String> = group.iter().map(|n| n.id.to_string()).collect();
        println!("{}\t{}", group[0].sfld, ids.join(" "));
    }
    if groups.is_empty() {
        println!("No duplicates");
    }
    Ok(())
}

fn extract(package: PathBuf, dest: PathBuf) -> CliResult<()> {
    let entries = ankit_collection::extract_package(&package, &dest)?;
    println!("Extracted {entries} entries to {}", dest.display());
    Ok(())
}

fn main() -> CliResult<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Init { collection, empty } => init(collection, empty),
        Command::AddNote {
            collection,
            model,
            deck,
            tags,
            fields,
        } => add_note(collection, &model, &deck, tags, fields),
        Command::RemoveNote { collection, id } => remove_note(collection, id),
        Command::Sample { collection } => sample(collection),
        Command::Dupes { collection } => dupes(collection),
        Command::Extract { package, dest } => extract(package, dest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_add_note() {
        let args = Args::parse_from([
            "ankit-col",
            "-vv",
            "add-note",
            "col.anki2",
            "--tag",
            "a",
            "--tag",
            "b",
            "front",
            "back",
        ]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::AddNote {
                model,
                deck,
                tags,
                fields,
                ..
            } => {
                assert_eq!(model, "Basic");
                assert_eq!(deck, "Default");
                assert_eq!(tags, vec!["a", "b"]);
                assert_eq!(fields, vec!["front", "back"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
