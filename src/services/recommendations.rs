use crate::{
    db::ClothingStore,
    error::AppResult,
    models::{ClothingItem, ConditionFilter, TemperatureCategory},
};

/// Builds the store filter for a weather observation
///
/// The description is lowercased; the category is its fixed lowercase literal.
/// Item tokens are matched exactly, so an item tagged `"Mild"` never matches.
pub fn build_filter(description: &str, temperature_kelvin: f64) -> ConditionFilter {
    let category = TemperatureCategory::from_kelvin(temperature_kelvin);
    ConditionFilter::any_of([description.to_lowercase(), category.as_str().to_string()])
}

/// Resolves clothing recommendations for the given weather
///
/// Returns every stored item tagged with the lowercased description or the
/// temperature bucket. Store failures are returned to the caller untouched.
pub async fn resolve(
    store: &dyn ClothingStore,
    description: &str,
    temperature_kelvin: f64,
) -> AppResult<Vec<ClothingItem>> {
    let filter = build_filter(description, temperature_kelvin);
    let records = store.find_matching(&filter).await?;

    tracing::debug!(
        description = %description,
        temperature_kelvin,
        tokens = ?filter.tokens(),
        matches = records.len(),
        store = store.name(),
        "Resolved clothing recommendations"
    );

    Ok(records.into_iter().map(ClothingItem::from).collect())
}
