use clap::Args;

use crate::catalog::store::RecipeCorpus;
use crate::catalog::taxonomy::RestrictionTaxonomy;
use crate::cli::{error_json, OutputFormat, SourceArgs};
use crate::core::recipe::Recipe;
use crate::matching::compliance::Violation;
use crate::matching::engine::{MatchError, MatchResult, MatchingEngine};
use crate::matching::session::SessionState;
use crate::utils::validation::validate_query_text;

#[derive(Args)]
pub struct FindArgs {
    /// Recipe name (misspellings are fine)
    #[arg(required = true)]
    pub name: String,

    /// Dietary restrictions, e.g. "vegan, gluten-free"
    #[arg(short, long, default_value = "")]
    pub restriction: String,

    /// Also print the instructions
    #[arg(long)]
    pub steps: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute find subcommand
///
/// # Errors
///
/// Returns an error if the corpus or config cannot be loaded or the query is invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FindArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let name = validate_query_text("name", &args.name)?;
    let restriction = validate_query_text("restriction", &args.restriction)?;

    let corpus = args.source.load_corpus()?;
    let config = args.source.load_config()?;
    let taxonomy = RestrictionTaxonomy::builtin();

    if verbose {
        eprintln!("Loaded corpus with {} recipes", corpus.len());
    }

    let engine = MatchingEngine::with_config(&corpus, &taxonomy, config);
    let mut session = SessionState::new();

    match engine.resolve_by_name(&mut session, name, restriction) {
        Ok(result) => {
            let recipe = &corpus.recipes[result.index];
            print_match(&result, recipe, args.steps, format)?;
        }
        Err(error) => {
            let violations = conflict_violations(&engine, &corpus, &error, restriction);
            print_error(&error, &violations, format)?;
        }
    }

    Ok(())
}

/// Why the best candidate was rejected, for restriction conflicts
fn conflict_violations(
    engine: &MatchingEngine<'_>,
    corpus: &RecipeCorpus,
    error: &MatchError,
    restriction: &str,
) -> Vec<Violation> {
    let MatchError::RestrictionConflict { name, .. } = error else {
        return Vec::new();
    };
    corpus
        .find_by_name(name)
        .map(|(_, recipe)| engine.compliance().violations(recipe, restriction))
        .unwrap_or_default()
}

fn print_match(
    result: &MatchResult,
    recipe: &Recipe,
    show_steps: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Recipe: {}\n", recipe.name);
            println!("Score:      {:.1}", result.score);
            println!("Confidence: {}", result.confidence());

            println!("\nIngredients:");
            for ingredient in &recipe.ingredients {
                println!("  - {ingredient}");
            }

            if show_steps {
                println!("\nSteps:");
                if recipe.steps.is_empty() {
                    println!("  (no instructions available)");
                }
                for (i, step) in recipe.steps.iter().enumerate() {
                    println!("  {}. {step}", i + 1);
                }
            }
        }
        OutputFormat::Json => {
            let mut json = serde_json::json!({
                "name": recipe.name,
                "score": result.score,
                "confidence": result.confidence(),
                "ingredients": recipe.ingredients,
            });
            if show_steps {
                json["steps"] = serde_json::json!(recipe.steps);
            }
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Tsv => {
            println!("name\tscore\tconfidence\tingredients");
            println!(
                "{}\t{:.1}\t{}\t{}",
                recipe.name,
                result.score,
                result.confidence(),
                recipe.ingredients_text
            );
        }
    }
    Ok(())
}

fn print_error(
    error: &MatchError,
    violations: &[Violation],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text | OutputFormat::Tsv => {
            println!("{error}");
            for v in violations {
                println!("  {} is not {} (contains {})", v.ingredient, v.restriction, v.forbidden);
            }
        }
        OutputFormat::Json => {
            let mut json = error_json(error);
            if !violations.is_empty() {
                json["violations"] = serde_json::json!(violations);
            }
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
