//! Centralized validation and helper functions.

/// Maximum number of recipes accepted from a single corpus file (DOS protection)
pub const MAX_RECIPES: usize = 500_000;

/// Maximum length in bytes of a single query field (name, ingredients, restriction)
pub const MAX_QUERY_LENGTH: usize = 2_048;

/// Check if adding another recipe would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new recipe.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_recipe_limit(recipes.len()).is_some() {
///     return Err(...);
/// }
/// recipes.push(recipe); // Safe to add
/// ```
#[must_use]
pub fn check_recipe_limit(count: usize) -> Option<String> {
    if count >= MAX_RECIPES {
        Some(format!(
            "Too many recipes: adding another would exceed maximum of {MAX_RECIPES}"
        ))
    } else {
        None
    }
}

/// Query validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} too long: exceeds {MAX_QUERY_LENGTH} bytes")]
    TooLong { field: &'static str },
    #[error("{field} contains control characters")]
    ControlCharacters { field: &'static str },
}

/// Validate a free-text query field before it reaches the engine.
///
/// Rejects oversized input and control characters other than tab. Returns the
/// trimmed text; empty text is allowed (the engine reports empty queries itself).
///
/// # Errors
///
/// Returns `ValidationError::TooLong` if the text exceeds [`MAX_QUERY_LENGTH`], or
/// `ValidationError::ControlCharacters` if it contains control characters.
///
/// # Examples
///
/// ```
/// use recipe_finder::utils::validation::validate_query_text;
///
/// assert_eq!(validate_query_text("name", "  pancakes ").unwrap(), "pancakes");
/// assert!(validate_query_text("name", "pan\0cakes").is_err());
/// ```
pub fn validate_query_text<'a>(
    field: &'static str,
    text: &'a str,
) -> Result<&'a str, ValidationError> {
    if text.len() > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong { field });
    }
    if text.chars().any(|c| c.is_control() && c != '\t') {
        return Err(ValidationError::ControlCharacters { field });
    }
    Ok(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_recipe_limit() {
        assert!(check_recipe_limit(0).is_none());
        assert!(check_recipe_limit(MAX_RECIPES - 1).is_none());
        assert!(check_recipe_limit(MAX_RECIPES).is_some());
    }

    #[test]
    fn test_validate_query_text() {
        assert_eq!(validate_query_text("name", "").unwrap(), "");
        assert_eq!(
            validate_query_text("ingredients", "tomato,\tbasil").unwrap(),
            "tomato,\tbasil"
        );

        let long = "a".repeat(MAX_QUERY_LENGTH + 1);
        assert_eq!(
            validate_query_text("name", &long),
            Err(ValidationError::TooLong { field: "name" })
        );
        assert_eq!(
            validate_query_text("restriction", "vegan\x07"),
            Err(ValidationError::ControlCharacters {
                field: "restriction"
            })
        );
    }
}
