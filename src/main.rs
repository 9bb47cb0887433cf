//! dexgraph CLI - inspect and load the reference dataset

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use dexgraph::config::{self, DexConfig};
use dexgraph::ui::{self, Icons};
use dexgraph::{
    Dataset, Dictify, LoadOptions, Move, Pokemon, RelationKind, RelationshipGraph, SqliteStore, Type,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dexgraph")]
#[command(version)]
#[command(about = "Reference store for creatures, moves and the type-effectiveness chart")]
#[command(long_about = r#"
dexgraph keeps a reference dataset in SQLite and renders it as API-ready records.

Example usage:
  dexgraph init
  dexgraph load data/reference_dataset.json --strict
  dexgraph show type fire
  dexgraph show pokemon 1 --min
  dexgraph chart fire --backward
  dexgraph check
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EntityKind {
    Pokemon,
    Move,
    Type,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create an empty database
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Load a JSON reference dataset
    Load {
        /// Dataset file (defaults to the config's dataset)
        dataset: Option<PathBuf>,

        /// Fail when the type chart breaks to/from duality
        #[arg(short, long)]
        strict: bool,
    },

    /// Show one record as JSON
    Show {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Id or name
        key: String,

        /// Summary view instead of the full record
        #[arg(short, long)]
        min: bool,
    },

    /// List all records of a kind (summary view)
    List {
        #[arg(value_enum)]
        entity: EntityKind,
    },

    /// Show the type chart rows of one type
    Chart {
        /// Type id or name
        key: String,

        /// Also list the types that point at this one
        #[arg(short, long)]
        backward: bool,
    },

    /// Check that every type relation has its dual edge
    Check,

    /// Show row counts
    Stats,
}

fn resolve_database(cli_database: Option<PathBuf>, config: &DexConfig) -> PathBuf {
    cli_database.unwrap_or_else(|| config.database_path_in(Path::new(".")))
}

fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(path)?;
    Ok(SqliteStore::open(path)?)
}

fn find_pokemon(store: &SqliteStore, key: &str) -> dexgraph::Result<Pokemon> {
    match key.parse::<i64>() {
        Ok(id) => store.get_pokemon(id),
        Err(_) => store.find_pokemon_by_name(key),
    }
}

fn find_move(store: &SqliteStore, key: &str) -> dexgraph::Result<Move> {
    match key.parse::<i64>() {
        Ok(id) => store.get_move(id),
        Err(_) => store.find_move_by_name(key),
    }
}

fn find_type(store: &SqliteStore, key: &str) -> dexgraph::Result<Type> {
    match key.parse::<i64>() {
        Ok(id) => store.get_type(id),
        Err(_) => store.find_type_by_name(key),
    }
}

fn names(types: &[Type]) -> Vec<String> {
    types.iter().map(|t| t.name.clone()).collect()
}

fn render<T: Dictify>(entity: &T, store: &SqliteStore, min: bool) -> anyhow::Result<String> {
    let json = if min {
        serde_json::to_string_pretty(&entity.min_dictify(store)?)?
    } else {
        serde_json::to_string_pretty(&entity.dictify(store)?)?
    };
    Ok(json)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let dex_config = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = resolve_database(cli.database, &dex_config);

    match cli.command {
        Commands::Init { force } => {
            let new_config = DexConfig {
                database: Some(database.to_string_lossy().to_string()),
                ..dex_config
            };
            config::write_config(&config_path, &new_config, force)?;
            open_store(&database)?;

            ui::success(&format!("Wrote {}", config_path.display()));
            ui::info(&format!("{} Database", Icons::DATABASE), &database.display().to_string());
        }

        Commands::Load { dataset, strict } => {
            let dataset_path = dataset
                .or_else(|| dex_config.dataset.as_deref().map(PathBuf::from))
                .ok_or_else(|| anyhow::anyhow!("no dataset given and none configured"))?;
            let options = LoadOptions {
                strict_duality: strict || dex_config.strict_duality.unwrap_or(false),
            };

            tracing::info!("Loading {} into {:?}", dataset_path.display(), database);
            let mut store = open_store(&database)?;
            let parsed = Dataset::from_path(&dataset_path)?;
            let report = parsed.load_into(&mut store, options)?;

            ui::header(&format!("{} Loaded {}", Icons::PACKAGE, dataset_path.display()));
            print!("{}", report);
            for violation in &report.violations {
                ui::warn(&violation.to_string());
            }
        }

        Commands::Show { entity, key, min } => {
            let store = open_store(&database)?;
            let json = match entity {
                EntityKind::Pokemon => render(&find_pokemon(&store, &key)?, &store, min)?,
                EntityKind::Move => render(&find_move(&store, &key)?, &store, min)?,
                EntityKind::Type => render(&find_type(&store, &key)?, &store, min)?,
            };
            println!("{}", json);
        }

        Commands::List { entity } => {
            let store = open_store(&database)?;
            let table = match entity {
                EntityKind::Pokemon => {
                    let records = store
                        .list_pokemon()?
                        .iter()
                        .map(|p| p.min_dictify(&store))
                        .collect::<dexgraph::Result<Vec<_>>>()?;
                    ui::pokemon_table(&records)
                }
                EntityKind::Move => {
                    let records = store
                        .list_moves()?
                        .iter()
                        .map(|m| m.min_dictify(&store))
                        .collect::<dexgraph::Result<Vec<_>>>()?;
                    ui::move_table(&records)
                }
                EntityKind::Type => {
                    let records = store
                        .list_types()?
                        .iter()
                        .map(|t| t.min_dictify(&store))
                        .collect::<dexgraph::Result<Vec<_>>>()?;
                    ui::type_table(&records)
                }
            };

            if table.is_empty() {
                println!("{}", ui::dim("No records."));
            } else {
                println!("{}", table);
            }
        }

        Commands::Chart { key, backward } => {
            let store = open_store(&database)?;
            let graph = RelationshipGraph::new(&store);
            let ty = find_type(&store, &key)?;
            let relations = graph.relations(ty.id)?;

            ui::header(&format!("{} {} (gen {})", Icons::LINK, ty.name, ty.generation));
            if relations.is_empty() {
                println!("{}", ui::dim("No relations."));
            }
            for kind in RelationKind::all() {
                if !relations.get(*kind).is_empty() {
                    ui::relation_row(*kind, &names(relations.get(*kind)));
                }
            }

            if backward {
                ui::section("Listed by");
                for kind in RelationKind::all() {
                    let sources = graph.referenced_by(ty.id, *kind)?;
                    if !sources.is_empty() {
                        ui::relation_row(*kind, &names(&sources));
                    }
                }
            }
        }

        Commands::Check => {
            let store = open_store(&database)?;
            let violations = RelationshipGraph::new(&store).check_duality()?;

            if violations.is_empty() {
                ui::success(&format!("{} Every type relation has its dual edge", Icons::LINK));
            } else {
                ui::section("Duality violations");
                for violation in &violations {
                    ui::summary_row(&ui::relation_label(violation.edge.kind), &violation.to_string());
                }
                ui::error(&format!("{} relations lack their dual edge", violations.len()));
                std::process::exit(1);
            }
        }

        Commands::Stats => {
            let store = open_store(&database)?;
            let stats = store.stats()?;

            ui::header(&format!("{} dexgraph Statistics ({:?})", Icons::STATS, database));
            println!("{}", ui::stats_table(&stats));
        }
    }

    Ok(())
}
