use clap::Args;

use crate::catalog::store::RecipeCorpus;
use crate::catalog::taxonomy::RestrictionTaxonomy;
use crate::cli::{error_json, OutputFormat, SourceArgs};
use crate::matching::engine::{MatchError, MatchingEngine};
use crate::matching::session::SessionState;
use crate::matching::suggest::Suggestion;
use crate::utils::validation::validate_query_text;

#[derive(Args)]
pub struct SuggestArgs {
    /// Comma-separated ingredients, e.g. "tomato, basil, garlic"
    #[arg(required = true)]
    pub ingredients: String,

    /// Dietary restrictions, e.g. "vegan, gluten-free"
    #[arg(short, long, default_value = "")]
    pub restriction: String,

    /// Number of suggestions to show (defaults to the configured limit)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute suggest subcommand
///
/// # Errors
///
/// Returns an error if the corpus or config cannot be loaded or the query is invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SuggestArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let ingredients = validate_query_text("ingredients", &args.ingredients)?;
    let restriction = validate_query_text("restriction", &args.restriction)?;

    let corpus = args.source.load_corpus()?;
    let mut config = args.source.load_config()?;
    if let Some(limit) = args.limit {
        config.suggestion_limit = limit;
    }
    let taxonomy = RestrictionTaxonomy::builtin();

    if verbose {
        eprintln!("Loaded corpus with {} recipes", corpus.len());
    }

    let engine = MatchingEngine::with_config(&corpus, &taxonomy, config);
    let mut session = SessionState::new();

    match engine.suggest(&mut session, ingredients, restriction) {
        Ok(round) => print_suggestions(
            &corpus,
            &round.suggestions,
            &round.ingredients.excluded,
            format,
        )?,
        Err(error) => print_error(&error, format)?,
    }

    Ok(())
}

/// One line per suggestion, numbered from 1
pub(crate) fn format_suggestion_lines(corpus: &RecipeCorpus, suggestions: &[Suggestion]) -> Vec<String> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let name = &corpus.recipes[s.index].name;
            if s.missing_ingredients.is_empty() {
                format!("{}. {name} ({:.0}, nothing missing)", i + 1, s.score)
            } else {
                format!(
                    "{}. {name} ({:.0}, missing: {})",
                    i + 1,
                    s.score,
                    s.missing_ingredients.join(", ")
                )
            }
        })
        .collect()
}

fn print_suggestions(
    corpus: &RecipeCorpus,
    suggestions: &[Suggestion],
    excluded: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if !excluded.is_empty() {
                println!("Ignoring restricted ingredients: {}\n", excluded.join(", "));
            }
            println!("Suggestions ({})\n", suggestions.len());
            for line in format_suggestion_lines(corpus, suggestions) {
                println!("  {line}");
            }
        }
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = suggestions
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    serde_json::json!({
                        "rank": i + 1,
                        "name": corpus.recipes[s.index].name,
                        "score": s.score,
                        "missing_count": s.missing_count,
                        "missing_ingredients": s.missing_ingredients,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "excluded": excluded,
                "suggestions": items,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("rank\tname\tscore\tmissing_count\tmissing_ingredients");
            for (i, s) in suggestions.iter().enumerate() {
                println!(
                    "{}\t{}\t{:.1}\t{}\t{}",
                    i + 1,
                    corpus.recipes[s.index].name,
                    s.score,
                    s.missing_count,
                    s.missing_ingredients.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn print_error(error: &MatchError, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text | OutputFormat::Tsv => println!("{error}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&error_json(error))?),
    }
    Ok(())
}
