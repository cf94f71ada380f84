use std::time::Duration;

use crate::config::{ExtractorConfig, StrategyKind};
use crate::extractors::{Extractor, PluginRegistry};
use crate::fetchers::{PageFetcher, RequestFetcher};
use crate::orchestrator::{Orchestrator, RecipeExtractor};
use crate::validate::QualityGate;
use crate::ExtractionError;

/// Builder for configuring a [`RecipeExtractor`]
///
/// Starts from [`ExtractorConfig::default()`]; every setter overrides one part.
#[derive(Default)]
pub struct RecipeExtractorBuilder {
    config: ExtractorConfig,
    fetcher: Option<Box<dyn PageFetcher>>,
    strategies: Option<Vec<Box<dyn Extractor>>>,
    registry: Option<PluginRegistry>,
}

impl RecipeExtractorBuilder {
    /// Replace the whole configuration, e.g. with [`ExtractorConfig::load()`]
    ///
    /// # Example
    /// ```
    /// use crumb_extract::{ExtractorConfig, RecipeExtractor};
    ///
    /// let builder = RecipeExtractor::builder().config(ExtractorConfig::default());
    /// ```
    pub fn config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a timeout for the page fetch
    ///
    /// # Example
    /// ```
    /// use crumb_extract::RecipeExtractor;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeExtractor::builder().timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.config.fetch.timeout_secs = duration.as_secs().max(1);
        self
    }

    /// Set the user agent sent with the page fetch
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = user_agent.into();
        self
    }

    /// Set the minimum ingredient and instruction-step counts
    pub fn minimums(mut self, ingredients: usize, steps: usize) -> Self {
        self.config.gate.min_ingredients = ingredients;
        self.config.gate.min_steps = steps;
        self
    }

    /// Choose which built-in strategies run, and in which order
    ///
    /// # Example
    /// ```
    /// use crumb_extract::{RecipeExtractor, StrategyKind};
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .strategies(vec![StrategyKind::StructuredData, StrategyKind::Generic]);
    /// ```
    pub fn strategies(mut self, kinds: Vec<StrategyKind>) -> Self {
        self.config.strategies = kinds;
        self
    }

    /// Use custom strategy implementations instead of the built-in ones
    pub fn custom_strategies(mut self, strategies: Vec<Box<dyn Extractor>>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    /// Use a custom plugin adapter registry for the plugin strategy
    pub fn plugin_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom page fetcher
    pub fn fetcher(mut self, fetcher: Box<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the extractor
    ///
    /// # Errors
    /// Returns `ExtractionError` if:
    /// - The strategy list is empty
    /// - The HTTP client cannot be created
    ///
    /// # Example
    /// ```no_run
    /// # use crumb_extract::RecipeExtractor;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let extractor = RecipeExtractor::builder().build()?;
    /// let recipe = extractor.extract_recipe("https://example.com/recipe").await?;
    /// println!("{}", recipe.title);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<RecipeExtractor, ExtractionError> {
        let gate = QualityGate::from_config(&self.config.gate);

        let orchestrator = match (self.strategies, self.registry) {
            (Some(strategies), _) => Orchestrator::new(strategies, gate),
            (None, Some(registry)) => Orchestrator::with_registry(&self.config, registry),
            (None, None) => Orchestrator::from_config(&self.config),
        };

        if orchestrator.strategy_kinds().is_empty() {
            return Err(ExtractionError::BuilderError(
                "At least one extraction strategy is required".to_string(),
            ));
        }

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(RequestFetcher::with_config(&self.config.fetch)?),
        };

        Ok(RecipeExtractor::new(fetcher, orchestrator))
    }
}
