use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::RecipeCorpus;
use crate::catalog::taxonomy::RestrictionTaxonomy;
use crate::cli::{OutputFormat, SourceArgs};
use crate::core::recipe::Recipe;
use crate::matching::engine::MatchingEngine;
use crate::matching::session::SessionState;

#[derive(Args)]
pub struct CorpusArgs {
    #[command(subcommand)]
    pub command: CorpusCommands,
}

#[derive(Subcommand)]
pub enum CorpusCommands {
    /// List all recipes in the corpus
    List {
        /// Path to custom corpus file (JSON or CSV)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Only list recipes satisfying these restrictions
        #[arg(short, long)]
        restriction: Option<String>,
    },

    /// Show details of a specific recipe
    Show {
        /// Recipe name (fuzzy)
        #[arg(required = true)]
        name: String,

        /// Path to custom corpus file (JSON or CSV)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },

    /// Export the corpus as normalized JSON
    Export {
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to custom corpus file to export (defaults to embedded)
        #[arg(long)]
        corpus: Option<PathBuf>,
    },
}

/// Execute corpus subcommand
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CorpusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CorpusCommands::List {
            corpus,
            restriction,
        } => run_list(corpus, restriction.as_deref(), format, verbose),
        CorpusCommands::Show { name, corpus } => run_show(&name, corpus, format),
        CorpusCommands::Export { output, corpus } => run_export(output, corpus),
    }
}

fn load(path: Option<PathBuf>) -> anyhow::Result<RecipeCorpus> {
    SourceArgs {
        corpus: path,
        config: None,
    }
    .load_corpus()
}

fn run_list(
    corpus_path: Option<PathBuf>,
    restriction: Option<&str>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let corpus = load(corpus_path)?;
    let taxonomy = RestrictionTaxonomy::builtin();
    let engine = MatchingEngine::new(&corpus, &taxonomy);

    if verbose {
        eprintln!("Loaded corpus with {} recipes", corpus.len());
    }

    let filter = engine.compliance();
    let entries = filter.resolve_restrictions(restriction.unwrap_or_default());
    let recipes: Vec<&Recipe> = corpus
        .recipes
        .iter()
        .filter(|r| filter.complies_with(r, &entries))
        .collect();

    match format {
        OutputFormat::Text => {
            let name_width = recipes
                .iter()
                .map(|r| r.name.len())
                .max()
                .unwrap_or(4)
                .max(4);

            println!("Recipe Corpus ({} recipes)\n", recipes.len());
            println!("{:<name_width$}  {:>11}  {:>5}", "Name", "Ingredients", "Steps");
            println!("{}", "-".repeat(name_width + 20));
            for r in &recipes {
                println!(
                    "{:<name_width$}  {:>11}  {:>5}",
                    r.name,
                    r.ingredients.len(),
                    r.steps.len()
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = recipes
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "name": r.name,
                        "ingredients": r.ingredients,
                        "step_count": r.steps.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("name\tingredient_count\tstep_count\tingredients");
            for r in &recipes {
                println!(
                    "{}\t{}\t{}\t{}",
                    r.name,
                    r.ingredients.len(),
                    r.steps.len(),
                    r.ingredients_text
                );
            }
        }
    }

    Ok(())
}

fn run_show(name: &str, corpus_path: Option<PathBuf>, format: OutputFormat) -> anyhow::Result<()> {
    let corpus = load(corpus_path)?;
    let taxonomy = RestrictionTaxonomy::builtin();
    let engine = MatchingEngine::new(&corpus, &taxonomy);

    let recipe = match corpus.find_by_name(name) {
        Some((_, recipe)) => recipe,
        None => {
            let result = engine.resolve_by_name(&mut SessionState::new(), name, "")?;
            &corpus.recipes[result.index]
        }
    };

    match format {
        OutputFormat::Text => {
            println!("Recipe: {}\n", recipe.name);
            println!("Ingredients ({}):", recipe.ingredients.len());
            for ingredient in &recipe.ingredients {
                println!("  - {ingredient}");
            }
            println!("\nSteps ({}):", recipe.steps.len());
            for (i, step) in recipe.steps.iter().enumerate() {
                println!("  {}. {step}", i + 1);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(recipe)?);
        }
        OutputFormat::Tsv => {
            println!("step\tinstruction");
            for (i, step) in recipe.steps.iter().enumerate() {
                println!("{}\t{step}", i + 1);
            }
        }
    }

    Ok(())
}

fn run_export(output: Option<PathBuf>, corpus_path: Option<PathBuf>) -> anyhow::Result<()> {
    let corpus = load(corpus_path)?;
    let json = corpus.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!("Exported {} recipes to {}", corpus.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
