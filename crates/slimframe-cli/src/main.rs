//! slimframe CLI: optimize delimited-text files and cache them by category.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slimframe_core::hash::hash_serde;
use slimframe_core::prelude::{SlimConfig, Table};
use slimframe_io::storage::FsStorage;
use slimframe_io::{read_csv, CategoryPhase, CategoryRegistry, CsvOptions, RegistryManifest, TableCache};
use slimframe_optimize::{optimize_with_report, OptimizeOptions};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "slimframe")]
#[command(about = "Narrow column types of tabular files and cache them by category", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize one delimited-text file and print what changed per column
    Optimize {
        /// Path to the input file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Read, optimize and cache every source file listed in a registry
    Cache {
        /// Registry manifest (YAML)
        #[arg(short, long)]
        registry: PathBuf,

        /// Only cache these categories (default: every category with sources)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Write the updated manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Load the cached tables of a registry and summarize them
    Load {
        /// Registry manifest (YAML)
        #[arg(short, long)]
        registry: PathBuf,

        /// Only load these categories (default: every cached category)
        #[arg(long = "category")]
        categories: Vec<String>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show schema, size and fingerprint of one cache blob
    Inspect {
        /// Path to the blob
        #[arg(short, long)]
        blob: PathBuf,
    },
}

/// Flags that override `SLIMFRAME_*` environment settings.
#[derive(Args, Debug, Default, Clone)]
struct Overrides {
    /// Cache directory, or `memory://name` (overrides SLIMFRAME_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<String>,

    /// Blob codec: none, zstd, lz4 (overrides SLIMFRAME_CODEC)
    #[arg(long)]
    codec: Option<String>,

    /// Distinct-ratio threshold for categorical text
    #[arg(long)]
    threshold: Option<f64>,

    /// Only narrow floats that round-trip exactly
    #[arg(long)]
    lossless_floats: bool,

    /// Field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Input files have no header row
    #[arg(long)]
    no_headers: bool,
}

struct Settings {
    config: SlimConfig,
    csv: CsvOptions,
    optimize: OptimizeOptions,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Optimize {
            input,
            json,
            overrides,
        } => run_optimize(&input, json, &overrides),
        Commands::Cache {
            registry,
            categories,
            output,
            overrides,
        } => run_cache(&registry, &categories, output.as_deref(), &overrides),
        Commands::Load {
            registry,
            categories,
            overrides,
        } => run_load(&registry, &categories, &overrides),
        Commands::Inspect { blob } => run_inspect(&blob),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(cfg: &mut SlimConfig, o: &Overrides) {
    if let Some(dir) = &o.cache_dir {
        cfg.cache_dir = dir.clone();
    }
    if let Some(codec) = &o.codec {
        cfg.codec = codec.clone();
    }
    if let Some(t) = o.threshold {
        cfg.categorical_threshold = t;
    }
    if o.lossless_floats {
        cfg.lossless_floats = true;
    }
    if let Some(d) = o.delimiter {
        cfg.csv_delimiter = d;
    }
}

fn settings(o: &Overrides) -> CliResult<Settings> {
    let mut config = SlimConfig::from_env();
    apply_overrides(&mut config, o);
    config.validate()?;

    let mut csv = CsvOptions::from_config(&config)?;
    if o.no_headers {
        csv.has_headers = false;
    }
    let optimize = OptimizeOptions::from_config(&config);
    Ok(Settings {
        config,
        csv,
        optimize,
    })
}

fn run_optimize(input: &Path, json: bool, o: &Overrides) -> CliResult<()> {
    let s = settings(o)?;
    let table = read_csv(input, &s.csv)?;
    let (_, report) = optimize_with_report(&table, &s.optimize);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run_cache(
    registry_path: &Path,
    categories: &[String],
    output: Option<&Path>,
    o: &Overrides,
) -> CliResult<()> {
    let s = settings(o)?;
    let cache = TableCache::from_config(&s.config)?;
    let mut registry = CategoryRegistry::from_manifest(RegistryManifest::load(registry_path)?);

    if categories.is_empty() {
        let n = registry.cache_all(&cache, &s.csv, &s.optimize)?;
        tracing::info!(categories = n, dir = %cache.dir().display(), "cached registry");
    } else {
        for category in categories {
            let written = registry.cache_category(category, &cache, &s.csv, &s.optimize)?;
            tracing::info!(category = %category, files = written.len(), "cached category");
        }
    }

    let manifest = registry.to_manifest();
    match output {
        Some(path) => {
            manifest.save(path)?;
            println!("✓ Registry written to {}", path.display());
        }
        None => print!("{}", manifest.to_yaml_string()?),
    }
    Ok(())
}

fn run_load(registry_path: &Path, categories: &[String], o: &Overrides) -> CliResult<()> {
    let s = settings(o)?;
    let cache = TableCache::from_config(&s.config)?;
    let mut registry = CategoryRegistry::from_manifest(RegistryManifest::load(registry_path)?);

    let selected: Vec<String> = if categories.is_empty() {
        registry
            .categories()
            .filter(|c| matches!(registry.phase(c), Some(CategoryPhase::Cached(_))))
            .map(str::to_string)
            .collect()
    } else {
        categories.to_vec()
    };

    for category in &selected {
        let tables = registry.load_category(category, &cache)?;
        println!("{category}: {} table(s)", tables.len());
        for (i, t) in tables.iter().enumerate() {
            println!("  [{i}] {}", summarize(t));
        }
    }
    Ok(())
}

fn run_inspect(blob: &Path) -> CliResult<()> {
    let dir = blob.parent().unwrap_or_else(|| Path::new("."));
    let cache = TableCache::new(Box::new(FsStorage::new()), dir);
    let table = cache.load(blob)?;

    println!("{}", summarize(&table));
    println!("Fingerprint: {}", hash_serde(&table)?);
    println!();
    for field in table.schema().fields {
        let null = if field.nullable { " (nullable)" } else { "" };
        println!("  {}: {}{}", field.name, field.data_type, null);
    }
    Ok(())
}

fn summarize(t: &Table) -> String {
    format!(
        "{} rows x {} columns, {} bytes",
        t.num_rows(),
        t.num_columns(),
        t.memory_usage()
    )
}

#[cfg(test)]
mod tests {
    use super::{apply_overrides, Overrides, SlimConfig};

    #[test]
    fn flags_override_env_defaults() {
        let mut config = SlimConfig::default();
        let flags = Overrides {
            cache_dir: Some("/tmp/flags".into()),
            codec: Some("lz4".into()),
            threshold: Some(0.2),
            lossless_floats: true,
            delimiter: Some(';'),
            no_headers: false,
        };
        apply_overrides(&mut config, &flags);
        assert_eq!(config.cache_dir, "/tmp/flags");
        assert_eq!(config.codec, "lz4");
        assert_eq!(config.categorical_threshold, 0.2);
        assert!(config.lossless_floats);
        assert_eq!(config.csv_delimiter, ';');
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = SlimConfig {
            lossless_floats: true,
            ..SlimConfig::default()
        };
        apply_overrides(&mut config, &Overrides::default());
        assert!(config.lossless_floats);
        assert_eq!(config.cache_dir, SlimConfig::default().cache_dir);
    }
}
