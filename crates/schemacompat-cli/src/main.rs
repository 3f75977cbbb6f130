//! schemacompat CLI.
//!
//! Compares two table schema files the way a change planner would: are they
//! the same schema, and if not, can the table be altered in place?

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use schema_compat::{CompatConfig, SchemaDiff, SchemaPolicy};

mod logging;
mod ui;

use ui::Verdict;

#[derive(Parser)]
#[command(name = "schemacompat")]
#[command(about = "Compare table schemas and classify schema changes")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    rules: RuleArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Comparison rule overrides.
#[derive(Args)]
struct RuleArgs {
    /// Match field names case-insensitively
    #[arg(long, global = true)]
    case_insensitive_names: bool,

    /// Treat a missing policyTags block as different from an empty one
    #[arg(long, global = true)]
    strict_policy_tags: bool,

    /// Ignore field keys the engine does not model when checking equivalence
    #[arg(long, global = true)]
    ignore_extra_attributes: bool,
}

impl RuleArgs {
    fn to_config(&self) -> CompatConfig {
        CompatConfig {
            case_sensitive_names: !self.case_insensitive_names,
            empty_policy_tags_match_absent: !self.strict_policy_tags,
            compare_extra_attributes: !self.ignore_extra_attributes,
        }
    }
}

/// Old and new schema files.
#[derive(Args)]
struct SchemaPair {
    /// Old schema file (`-` for stdin)
    old: PathBuf,

    /// New schema file (`-` for stdin)
    new: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether two schemas are equivalent (exit status 1 if not)
    Equivalent {
        #[command(flatten)]
        files: SchemaPair,
    },

    /// Decide whether a schema change can be applied in place
    Classify {
        #[command(flatten)]
        files: SchemaPair,
    },

    /// List every change between two schemas
    Diff {
        #[command(flatten)]
        files: SchemaPair,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose);

    let policy = SchemaPolicy::new(cli.rules.to_config());
    tracing::debug!(config = ?policy.config(), "comparison rules");

    match cli.command {
        Commands::Equivalent { files } => {
            let (old, new) = read_pair(&files)?;
            if policy.are_schemas_equivalent(&old, &new) {
                ui::verdict(Verdict::Equivalent);
            } else {
                ui::verdict(Verdict::NotEquivalent);
                ui::hint("Run `schemacompat diff OLD NEW` to list the changes.");
                std::process::exit(1);
            }
        }

        Commands::Classify { files } => {
            let (old, new) = read_pair(&files)?;
            let force_replace = policy
                .classify_schema_change(&old, &new)
                .map_err(|e| miette::Report::new(e).wrap_err("Failed to classify schema change"))?;
            let report = policy
                .diff_schema_text(&old, &new)
                .map_err(|e| miette::Report::new(e).wrap_err("Failed to compare schemas"))?;

            if !report.is_empty() {
                ui::report(&report);
            }
            ui::verdict(if force_replace {
                Verdict::ForceReplace
            } else {
                Verdict::InPlace
            });
        }

        Commands::Diff { files, json } => {
            let (old, new) = read_pair(&files)?;
            let report = policy
                .diff_schema_text(&old, &new)
                .map_err(|e| miette::Report::new(e).wrap_err("Failed to compare schemas"))?;

            if json {
                print_json(&report)?;
            } else if report.is_empty() {
                ui::verdict(Verdict::Equivalent);
            } else {
                ui::report(&report);
                ui::verdict(if report.is_breaking() {
                    Verdict::ForceReplace
                } else {
                    Verdict::InPlace
                });
            }
        }
    }

    Ok(())
}

/// Read both schema files. At most one of them may be stdin.
fn read_pair(files: &SchemaPair) -> miette::Result<(String, String)> {
    if is_stdin(&files.old) && is_stdin(&files.new) {
        return Err(miette::miette!("Only one schema can be read from stdin"));
    }
    Ok((read_schema(&files.old)?, read_schema(&files.new)?))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_schema(path: &Path) -> miette::Result<String> {
    tracing::debug!(path = %path.display(), "reading schema");

    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| miette::miette!("Failed to read schema from stdin: {}", e))?;
        return Ok(content);
    }

    std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read schema file '{}': {}", path.display(), e))
}

fn print_json(report: &SchemaDiff) -> miette::Result<()> {
    let output = serde_json::json!({
        "equivalent": report.is_empty(),
        "force_replace": report.is_breaking(),
        "changes": report.changes,
    });
    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| miette::miette!("Failed to serialize report: {}", e))?;
    println!("{}", text);
    Ok(())
}
