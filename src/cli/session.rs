use std::fmt;
use std::io::{BufRead, Write};

use clap::Args;
use serde::Serialize;

use crate::catalog::taxonomy::RestrictionTaxonomy;
use crate::cli::{OutputFormat, SourceArgs};
use crate::core::types::Confidence;
use crate::matching::engine::{MatchError, MatchingEngine};
use crate::matching::scoring::Similarity;
use crate::matching::session::SessionState;
use crate::utils::validation::validate_query_text;

const HELP: &str = "\
Commands:
  restrict <restrictions>   set dietary restrictions (e.g. 'vegan, gluten-free' or 'none')
  find <name|number>        find a recipe by name, or pick a numbered suggestion
  suggest <ingredients>     suggest recipes for comma-separated ingredients
  ingredients               show the ingredients of the current recipe
  steps                     show the instructions of the current recipe
  done                      finish the current recipe
  reset                     forget the current recipe, suggestions and restrictions
  quit                      leave the session";

#[derive(Args)]
pub struct SessionArgs {
    /// Dietary restrictions to start with
    #[arg(short, long, default_value = "")]
    pub restriction: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// A recipe in a suggestion reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedRecipe {
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub missing_ingredients: Vec<String>,
}

/// Response to one line of input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Restriction {
        restriction: String,
        recognized: Vec<String>,
    },
    Found {
        name: String,
        score: f64,
        confidence: Confidence,
        ingredients: Vec<String>,
    },
    Suggestions {
        excluded: Vec<String>,
        recipes: Vec<SuggestedRecipe>,
    },
    Ingredients {
        name: String,
        ingredients: Vec<String>,
    },
    Steps {
        name: String,
        steps: Vec<String>,
    },
    Complete,
    Reset,
    Error {
        error: String,
        error_type: String,
    },
    Message {
        message: String,
    },
}

impl From<MatchError> for Reply {
    fn from(error: MatchError) -> Self {
        Self::Error {
            error: error.to_string(),
            error_type: error.kind().to_string(),
        }
    }
}

impl Reply {
    fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restriction {
                restriction,
                recognized,
            } => {
                if recognized.is_empty() {
                    if restriction.is_empty() {
                        write!(f, "No dietary restrictions.")
                    } else {
                        write!(f, "No known restriction in '{restriction}'; nothing will be filtered.")
                    }
                } else {
                    write!(f, "Restrictions: {}", recognized.join(", "))
                }
            }
            Self::Found {
                name,
                score,
                confidence,
                ingredients,
            } => {
                writeln!(f, "Found: {name} ({score:.0}, {confidence})")?;
                write!(f, "Ingredients: {}", ingredients.join(", "))
            }
            Self::Suggestions { excluded, recipes } => {
                if !excluded.is_empty() {
                    writeln!(f, "Ignoring restricted ingredients: {}", excluded.join(", "))?;
                }
                writeln!(f, "You could make:")?;
                for r in recipes {
                    if r.missing_ingredients.is_empty() {
                        writeln!(f, "  {}. {}", r.rank, r.name)?;
                    } else {
                        writeln!(
                            f,
                            "  {}. {} (missing: {})",
                            r.rank,
                            r.name,
                            r.missing_ingredients.join(", ")
                        )?;
                    }
                }
                write!(f, "Type 'find <number>' to pick one.")
            }
            Self::Ingredients { name, ingredients } => {
                write!(f, "Ingredients for {name}:")?;
                for ingredient in ingredients {
                    write!(f, "\n  - {ingredient}")?;
                }
                Ok(())
            }
            Self::Steps { name, steps } => {
                write!(f, "Steps for {name}:")?;
                if steps.is_empty() {
                    write!(f, "\n  (no instructions available)")?;
                }
                for (i, step) in steps.iter().enumerate() {
                    write!(f, "\n  {}. {step}", i + 1)?;
                }
                Ok(())
            }
            Self::Complete => write!(f, "Your recipe is complete! Enjoy your cooking!"),
            Self::Reset => write!(f, "Session cleared."),
            Self::Error { error, .. } => write!(f, "{error}"),
            Self::Message { message } => write!(f, "{message}"),
        }
    }
}

/// One interactive conversation: the engine, the session state and the active restrictions
pub struct Conversation<'e, 'a, S: Similarity> {
    engine: &'e MatchingEngine<'a, S>,
    state: SessionState,
    restriction: String,
}

impl<'e, 'a, S: Similarity> Conversation<'e, 'a, S> {
    pub fn new(engine: &'e MatchingEngine<'a, S>, restriction: &str) -> Self {
        Self {
            engine,
            state: SessionState::new(),
            restriction: restriction.trim().to_string(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle one line of input; `None` ends the conversation
    pub fn handle(&mut self, line: &str) -> Option<Reply> {
        let line = line.trim();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(c, r)| (c, r.trim()));

        let reply = match command.to_lowercase().as_str() {
            "" => return Some(Reply::message("")),
            "quit" | "exit" => return None,
            "help" => Reply::message(HELP),
            "restrict" => self.restrict(rest),
            "find" => self.find(rest),
            "suggest" => self.suggest(rest),
            "ingredients" => self.ingredients(),
            "steps" => self.steps(),
            "done" => {
                self.state.clear();
                Reply::Complete
            }
            "reset" => {
                self.state.clear();
                self.restriction.clear();
                Reply::Reset
            }
            other => Reply::message(format!("Unknown command '{other}'. Type 'help' for commands.")),
        };
        Some(reply)
    }

    fn restrict(&mut self, text: &str) -> Reply {
        self.restriction = text.to_string();
        let recognized = self
            .engine
            .compliance()
            .resolve_restrictions(text)
            .iter()
            .map(|e| e.label.clone())
            .collect();
        Reply::Restriction {
            restriction: self.restriction.clone(),
            recognized,
        }
    }

    fn find(&mut self, name: &str) -> Reply {
        if name.is_empty() {
            return Reply::message("Usage: find <name|number>");
        }
        match self
            .engine
            .resolve_by_name(&mut self.state, name, &self.restriction)
        {
            Ok(result) => {
                let recipe = &self.engine.corpus().recipes[result.index];
                Reply::Found {
                    name: recipe.name.clone(),
                    score: result.score,
                    confidence: result.confidence(),
                    ingredients: recipe.ingredients.clone(),
                }
            }
            Err(e) => e.into(),
        }
    }

    fn suggest(&mut self, ingredients: &str) -> Reply {
        match self
            .engine
            .suggest(&mut self.state, ingredients, &self.restriction)
        {
            Ok(round) => Reply::Suggestions {
                excluded: round.ingredients.excluded,
                recipes: round
                    .suggestions
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| SuggestedRecipe {
                        rank: i + 1,
                        name: self.engine.corpus().recipes[s.index].name.clone(),
                        score: s.score,
                        missing_ingredients: s.missing_ingredients,
                    })
                    .collect(),
            },
            Err(e) => e.into(),
        }
    }

    fn ingredients(&self) -> Reply {
        match self.current_recipe() {
            Some(recipe) => Reply::Ingredients {
                name: recipe.name.clone(),
                ingredients: recipe.ingredients.clone(),
            },
            None => Reply::message("No recipe selected yet. Use 'find' first."),
        }
    }

    fn steps(&self) -> Reply {
        match self.current_recipe() {
            Some(recipe) => Reply::Steps {
                name: recipe.name.clone(),
                steps: recipe.steps.clone(),
            },
            None => Reply::message("No recipe selected yet. Use 'find' first."),
        }
    }

    fn current_recipe(&self) -> Option<&'a crate::core::recipe::Recipe> {
        self.state
            .last_match()
            .and_then(|m| self.engine.corpus().get(m.index))
    }
}

/// Drive a conversation over line-oriented input until EOF or `quit`
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub fn run_conversation<S, R, W>(
    conversation: &mut Conversation<'_, '_, S>,
    input: R,
    mut output: W,
    format: OutputFormat,
) -> anyhow::Result<()>
where
    S: Similarity,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let line = match validate_query_text("input", &line) {
            Ok(line) => line,
            Err(e) => {
                writeln!(output, "{e}")?;
                continue;
            }
        };

        let Some(reply) = conversation.handle(line) else {
            break;
        };
        match format {
            OutputFormat::Json => writeln!(output, "{}", serde_json::to_string(&reply)?)?,
            OutputFormat::Text | OutputFormat::Tsv => {
                if reply != Reply::message("") {
                    writeln!(output, "{reply}")?;
                }
            }
        }
        output.flush()?;
    }
    Ok(())
}

/// Execute session subcommand
///
/// # Errors
///
/// Returns an error if the corpus or config cannot be loaded, or on I/O failure.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SessionArgs, format: OutputFormat) -> anyhow::Result<()> {
    let corpus = args.source.load_corpus()?;
    let config = args.source.load_config()?;
    let taxonomy = RestrictionTaxonomy::builtin();
    let engine = MatchingEngine::with_config(&corpus, &taxonomy, config);

    let mut conversation = Conversation::new(&engine, &args.restriction);
    if matches!(format, OutputFormat::Text) {
        eprintln!("Recipe session with {} recipes. Type 'help' for commands.", corpus.len());
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_conversation(&mut conversation, stdin.lock(), stdout.lock(), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::RecipeCorpus;
    use crate::core::recipe::Recipe;

    fn corpus() -> RecipeCorpus {
        RecipeCorpus::from_recipes([
            Recipe::new("Veggie Stew", ["carrot", "potato", "chicken broth"], ["Chop.", "Simmer."]),
            Recipe::new("Potato Soup", ["potato", "onion", "vegetable broth"], ["Boil.", "Blend."]),
            Recipe::new("Toast", ["bread", "butter"], Vec::<String>::new()),
        ])
    }

    #[test]
    fn test_find_then_steps_then_done() {
        let corpus = corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut conversation = Conversation::new(&engine, "");

        let reply = conversation.handle("find vegie stew").unwrap();
        assert!(matches!(reply, Reply::Found { ref name, .. } if name == "Veggie Stew"));

        let steps = conversation.handle("steps").unwrap();
        assert_eq!(
            steps,
            Reply::Steps {
                name: "Veggie Stew".to_string(),
                steps: vec!["Chop.".to_string(), "Simmer.".to_string()],
            }
        );

        let done = conversation.handle("done").unwrap();
        assert_eq!(done.to_string(), "Your recipe is complete! Enjoy your cooking!");
        assert!(conversation.state().last_match().is_none());
    }

    #[test]
    fn test_restriction_applies_to_find() {
        let corpus = corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut conversation = Conversation::new(&engine, "");

        let reply = conversation.handle("restrict vegetarian").unwrap();
        assert_eq!(reply.to_string(), "Restrictions: vegetarian");

        let reply = conversation.handle("find veggie stew").unwrap();
        assert!(matches!(reply, Reply::Error { ref error_type, .. } if error_type == "restriction_conflict"));
    }

    #[test]
    fn test_suggest_then_pick_by_number() {
        let corpus = corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut conversation = Conversation::new(&engine, "vegetarian");

        let Some(Reply::Suggestions { recipes, .. }) = conversation.handle("suggest potato, onion") else {
            panic!("expected suggestions");
        };
        assert_eq!(recipes[0].name, "Potato Soup");
        assert!(recipes.iter().all(|r| r.name != "Veggie Stew"));

        let reply = conversation.handle("find 1").unwrap();
        assert!(matches!(reply, Reply::Found { ref name, .. } if name == "Potato Soup"));

        let reply = conversation.handle("find 9").unwrap();
        assert!(matches!(reply, Reply::Error { ref error_type, .. } if error_type == "invalid_selection"));
    }

    #[test]
    fn test_commands_without_recipe() {
        let corpus = corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut conversation = Conversation::new(&engine, "");

        assert!(conversation.handle("ingredients").unwrap().to_string().contains("No recipe selected"));
        assert!(conversation.handle("dance").unwrap().to_string().contains("Unknown command"));
        assert!(conversation.handle("quit").is_none());
    }

    #[test]
    fn test_run_conversation_text_output() {
        let corpus = corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut conversation = Conversation::new(&engine, "");

        let input = "find toast\ningredients\nquit\nfind potato soup\n";
        let mut output = Vec::new();
        run_conversation(&mut conversation, input.as_bytes(), &mut output, OutputFormat::Text).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Found: Toast"));
        assert!(text.contains("  - butter"));
        // nothing after quit is processed
        assert!(!text.contains("Potato Soup"));
    }

    #[test]
    fn test_run_conversation_json_lines() {
        let corpus = corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut conversation = Conversation::new(&engine, "");

        let mut output = Vec::new();
        run_conversation(&mut conversation, "find qqqq\n".as_bytes(), &mut output, OutputFormat::Json).unwrap();

        let line: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(line["type"], "error");
        assert_eq!(line["error_type"], "not_found");
    }
}
