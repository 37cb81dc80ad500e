use std::io::Read;

use crate::catalog::store::{CorpusError, RawField, RecipeRecord};

/// Accepted header names for each column, matched case-insensitively
const NAME_COLUMNS: &[&str] = &["name", "title", "recipe"];
const INGREDIENT_COLUMNS: &[&str] = &["ingredients", "ner"];
const STEP_COLUMNS: &[&str] = &["steps", "directions", "instructions"];

/// Read recipe records from CSV with a header row.
///
/// The name and ingredient columns are required; the steps column is optional.
/// Ingredient and step cells are kept raw and parsed best-effort later.
///
/// # Errors
///
/// Returns `CorpusError::CsvError` on malformed CSV, or
/// `CorpusError::MissingColumn` if a required column is absent.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RecipeRecord>, CorpusError> {
    let mut reader = ::csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
    };

    let name_col = find(NAME_COLUMNS).ok_or(CorpusError::MissingColumn("name"))?;
    let ingredient_col = find(INGREDIENT_COLUMNS).ok_or(CorpusError::MissingColumn("ingredients"))?;
    let step_col = find(STEP_COLUMNS);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();

        records.push(RecipeRecord {
            name: cell(name_col),
            ingredients: RawField::Text(cell(ingredient_col)),
            steps: step_col.map(cell).map(RawField::Text).unwrap_or_default(),
        });
    }

    Ok(records)
}
