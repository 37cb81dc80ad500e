use std::path::Path;

fn main() {
    let corpus_path = Path::new("corpus/recipes.json");
    validate_corpus_file(corpus_path);
    set_build_dependencies();
}

fn validate_corpus_file(corpus_path: &Path) {
    // Ensure corpus exists at build time
    assert!(
        corpus_path.exists(),
        "\n\nCORPUS BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the corpus file before building.\n",
        corpus_path.display()
    );

    // Read corpus file
    let corpus_contents = std::fs::read_to_string(corpus_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCORPUS BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            corpus_path.display()
        );
    });

    // Parse and validate JSON
    let corpus: serde_json::Value = serde_json::from_str(&corpus_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCORPUS BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            corpus_path.display()
        );
    });

    validate_corpus_structure(&corpus);
}

fn validate_corpus_structure(corpus: &serde_json::Value) {
    assert!(
        corpus.is_object(),
        "\n\nCORPUS BUILD ERROR: Root must be a JSON object\n\
         Got: {corpus}\n"
    );

    assert!(
        corpus.get("version").and_then(serde_json::Value::as_str).is_some(),
        "\n\nCORPUS BUILD ERROR: Missing 'version' string\n"
    );

    let recipes = corpus.get("recipes").unwrap_or_else(|| {
        panic!(
            "\n\nCORPUS BUILD ERROR: Missing 'recipes' field\n\
             The corpus must have a top-level 'recipes' array.\n"
        );
    });

    let recipes = recipes.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCORPUS BUILD ERROR: 'recipes' must be an array\n\
             Got: {recipes}\n"
        );
    });

    for (i, recipe) in recipes.iter().enumerate() {
        validate_recipe_fields(recipe, i);
    }

    println!(
        "cargo:warning=Validated corpus: {} recipes",
        recipes.len()
    );
}

fn validate_recipe_fields(recipe: &serde_json::Value, index: usize) {
    let name = recipe
        .get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    assert!(
        !name.trim().is_empty(),
        "\n\nCORPUS BUILD ERROR: Recipe at index {index} missing a non-empty 'name' field\n"
    );

    // Ingredients may be a list or a string (list literal or comma-separated)
    let ingredients = recipe.get("ingredients");
    let has_ingredients = match ingredients {
        Some(serde_json::Value::Array(items)) => !items.is_empty(),
        Some(serde_json::Value::String(text)) => !text.trim().is_empty(),
        _ => false,
    };
    assert!(
        has_ingredients,
        "\n\nCORPUS BUILD ERROR: Recipe '{name}' (index {index}) has no ingredients\n"
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if corpus changes
    println!("cargo:rerun-if-changed=corpus/recipes.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
