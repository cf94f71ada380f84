//! Turns recipe web pages into canonical recipe records.
//!
//! A page is read by an ordered cascade of strategies: embedded structured
//! data (JSON-LD, then microdata), known recipe-plugin markup, and finally
//! generic layout heuristics. The first candidate that survives
//! normalization and the quality gate wins.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), crumb_extract::ExtractionError> {
//! let recipe = crumb_extract::extract_recipe("https://example.com/recipes/stew").await?;
//! for step in recipe.instruction_steps() {
//!     println!("{} ({} timers)", step.text, step.durations.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod durations;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod ingredient;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod url;
pub mod validate;

pub use builder::RecipeExtractorBuilder;
pub use config::{ExtractorConfig, StrategyKind};
pub use durations::{
    extract_durations_from_instruction, format_seconds_as_editable,
    parse_editable_duration_to_seconds, parse_iso8601_duration, EditableDurationError,
    HumanDuration,
};
pub use error::{ExtractionError, StrategyError};
pub use fetchers::{PageFetcher, RequestFetcher};
pub use model::{Duration, Ingredient, Recipe, RecipeCandidate, Step, Times};
pub use orchestrator::{Orchestrator, RecipeExtractor, StrategyOutcome};
pub use url::{clean_url_input, normalize_recipe_url};

/// Extracts a recipe from `url` with the default configuration.
///
/// Prefer [`RecipeExtractor::builder()`] when extracting many pages, so the
/// HTTP client and plugin registry are built once.
pub async fn extract_recipe(url: &str) -> Result<Recipe, ExtractionError> {
    extract_recipe_with_config(url, ExtractorConfig::default()).await
}

pub async fn extract_recipe_with_config(
    url: &str,
    config: ExtractorConfig,
) -> Result<Recipe, ExtractionError> {
    RecipeExtractor::builder()
        .config(config)
        .build()?
        .extract_recipe(url)
        .await
}
