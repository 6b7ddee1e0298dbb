use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ua_fixtures::diff::describe;
use ua_fixtures::fonts::SystemFontSource;
use ua_fixtures::reader::parse_file;
use ua_fixtures::rules::select_rules;
use ua_fixtures::{diff_graphs, generate_all, FixtureContext, IdPolicy, Object, WriterConfig};

#[derive(Parser)]
#[command(
    name = "ua-fixtures",
    about = "Generates paired fail/pass PDF/UA-1 conformance fixtures",
    version,
    author
)]
struct Cli {
    /// Log every allocation phase
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write fixture pairs and a manifest.json
    Generate {
        /// Output root directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Clause or directory to generate (repeatable; all when omitted)
        #[arg(short, long = "rule")]
        rules: Vec<String>,

        /// TrueType font embedded by composite-font fixtures (replaces the
        /// default search locations)
        #[arg(long, env = "UA_FIXTURES_FONT")]
        font: Option<PathBuf>,

        /// Flate-compress streams
        #[arg(long)]
        compress: bool,

        /// Use a random /ID instead of one derived from the file body
        #[arg(long)]
        random_id: bool,
    },

    /// List the registered fixtures
    List,

    /// Print the objects of a generated file
    Inspect {
        /// Input PDF file
        input: PathBuf,
    },

    /// Compare two generated files structurally (exit status 1 when they differ)
    Diff {
        left: PathBuf,
        right: PathBuf,

        /// Print the differences as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "ua_fixtures=debug"
    } else {
        "ua_fixtures=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            output,
            rules,
            font,
            compress,
            random_id,
        } => {
            let selected = select_rules(&rules);
            if selected.is_empty() {
                bail!("No fixture matches {:?}; run `ua-fixtures list`", rules);
            }

            // An explicit font is the only candidate; never substitute another.
            let fonts = match font {
                Some(path) => SystemFontSource::with_candidates(vec![path]),
                None => SystemFontSource::new(),
            };
            let ctx = FixtureContext::new(fonts);
            let config = WriterConfig {
                id_policy: if random_id {
                    IdPolicy::Random
                } else {
                    IdPolicy::Deterministic
                },
                compress_streams: compress,
            };

            let report = generate_all(&selected, &output, &ctx, config);
            let manifest = report
                .write_manifest(&output)
                .with_context(|| format!("Failed to write manifest under {}", output.display()))?;

            for fixture in &report.generated {
                println!("✓ {}", fixture.path.display());
            }
            for failure in &report.failures {
                eprintln!(
                    "✗ {} ({}) {}: {}",
                    failure.rule_id, failure.output_dir, failure.variant, failure.error
                );
            }
            println!("Manifest: {}", manifest.display());

            if !report.is_success() {
                bail!(
                    "{} of {} fixtures failed",
                    report.failures.len(),
                    report.failures.len() + report.generated.len()
                );
            }
        }

        Commands::List => {
            for rule in select_rules(&[]) {
                println!("{:<10} {:<32} {}", rule.rule_id(), rule.output_dir(), rule.description());
            }
        }

        Commands::Inspect { input } => {
            let parsed = parse_file(&input)
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            println!("{}: {} objects", input.display(), parsed.graph.len());
            for (id, object) in parsed.graph.iter() {
                println!("{} {} obj {}", id.number(), id.generation(), describe(object));
                let dict = match object {
                    Object::Dictionary(dict) => Some(dict),
                    Object::Stream(stream) => Some(stream.dictionary()),
                    _ => None,
                };
                for (key, value) in dict.into_iter().flat_map(|d| d.iter()) {
                    println!("    /{key} {}", describe(value));
                }
            }
            println!("trailer");
            for (key, value) in parsed.trailer.iter() {
                println!("    /{key} {}", describe(value));
            }
        }

        Commands::Diff { left, right, json } => {
            let a = parse_file(&left).with_context(|| format!("Failed to parse {}", left.display()))?;
            let b =
                parse_file(&right).with_context(|| format!("Failed to parse {}", right.display()))?;

            let differences = diff_graphs(&a.graph, &b.graph);
            if json {
                println!("{}", serde_json::to_string_pretty(&differences)?);
            } else if differences.is_empty() {
                println!("No structural differences");
            } else {
                for difference in &differences {
                    println!("{difference}");
                }
            }

            if !differences.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
