//! The extraction cascade.
//!
//! Strategies run strictly in order. Each one ends `Accepted`,
//! `Insufficient` or `Failed`; the first `Accepted` candidate wins and no
//! later strategy runs. When none is accepted the call fails as a whole:
//! a recipe below the quality gate is never returned.

use crate::builder::RecipeExtractorBuilder;
use crate::config::{ExtractorConfig, StrategyKind};
use crate::error::{ExtractionError, StrategyError};
use crate::extractors::{
    meta_content, Extractor, GenericExtractor, ParsingContext, PluginExtractor, PluginRegistry,
    StructuredDataExtractor,
};
use crate::fetchers::PageFetcher;
use crate::model::{Recipe, RecipeCandidate};
use crate::normalize::Normalizer;
use crate::validate::{GateFailure, QualityGate};
use log::{debug, info, warn};

/// Result of running one strategy against a page.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// Normalized and past the quality gate.
    Accepted(RecipeCandidate),
    /// Produced a candidate that failed the quality gate.
    Insufficient(GateFailure),
    /// Produced nothing usable.
    Failed(StrategyError),
}

pub struct Orchestrator {
    strategies: Vec<Box<dyn Extractor>>,
    normalizer: Normalizer,
    gate: QualityGate,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

impl Orchestrator {
    pub fn new(strategies: Vec<Box<dyn Extractor>>, gate: QualityGate) -> Self {
        Self {
            strategies,
            normalizer: Normalizer,
            gate,
        }
    }

    /// Builds the strategy list in the configured order.
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::with_registry(config, PluginRegistry::from_config(&config.plugins))
    }

    /// Like [`Orchestrator::from_config`], with an explicit plugin registry
    /// constructed once by the caller and owned by the plugin strategy.
    pub fn with_registry(config: &ExtractorConfig, registry: PluginRegistry) -> Self {
        let mut registry = Some(registry);
        let strategies = config
            .strategies
            .iter()
            .map(|kind| -> Box<dyn Extractor> {
                match kind {
                    StrategyKind::StructuredData => Box::new(StructuredDataExtractor::default()),
                    StrategyKind::Plugin => Box::new(PluginExtractor::new(
                        registry
                            .take()
                            .unwrap_or_else(|| PluginRegistry::from_config(&config.plugins)),
                    )),
                    StrategyKind::Generic => Box::new(GenericExtractor),
                }
            })
            .collect();
        Self::new(strategies, QualityGate::from_config(&config.gate))
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Runs a single strategy through normalization and the quality gate.
    pub fn attempt(&self, strategy: &dyn Extractor, context: &ParsingContext) -> StrategyOutcome {
        let candidate = match strategy.parse(context) {
            Ok(candidate) => candidate,
            Err(e) => return StrategyOutcome::Failed(e),
        };

        let candidate = self.normalizer.normalize(with_source_name(candidate, context));
        match self.gate.check(&candidate) {
            Ok(()) => StrategyOutcome::Accepted(candidate),
            Err(failure) => StrategyOutcome::Insufficient(failure),
        }
    }

    pub fn extract(&self, context: &ParsingContext) -> Result<Recipe, ExtractionError> {
        let mut attempted = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let kind = strategy.kind();
            attempted.push(kind.to_string());
            match self.attempt(strategy.as_ref(), context) {
                StrategyOutcome::Accepted(candidate) => {
                    info!(
                        "Extracted {:?} from {} using {}",
                        candidate.title.as_deref().unwrap_or_default(),
                        context.url,
                        kind
                    );
                    return Ok(candidate.into_recipe());
                }
                StrategyOutcome::Insufficient(failure) => {
                    debug!("{} strategy insufficient: {}", kind, failure);
                }
                StrategyOutcome::Failed(e) => {
                    debug!("{} strategy failed: {}", kind, e);
                }
            }
        }

        warn!("No strategy could read a recipe from {}", context.url);
        Err(ExtractionError::Unsupported { attempted })
    }

    pub fn extract_from_html(&self, html: &str, url: &str) -> Result<Recipe, ExtractionError> {
        let context = ParsingContext::new(url, html);
        self.extract(&context)
    }
}

/// Site label: `og:site_name`, else what the strategy found (the plugin
/// label), else the page's host name.
fn with_source_name(mut candidate: RecipeCandidate, context: &ParsingContext) -> RecipeCandidate {
    if let Some(site_name) = meta_content(
        &context.document,
        &["meta[property='og:site_name']", "meta[name='application-name']"],
    ) {
        candidate.source_name = Some(site_name);
    } else if candidate.source_name.is_none() {
        candidate.source_name = host_label(&context.url);
    }
    candidate
}

fn host_label(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Fetches a page and runs the extraction cascade over it.
pub struct RecipeExtractor {
    fetcher: Box<dyn PageFetcher>,
    orchestrator: Orchestrator,
}

impl RecipeExtractor {
    pub fn new(fetcher: Box<dyn PageFetcher>, orchestrator: Orchestrator) -> Self {
        Self {
            fetcher,
            orchestrator,
        }
    }

    pub fn builder() -> RecipeExtractorBuilder {
        RecipeExtractorBuilder::default()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Fetches `url` and returns its canonical recipe.
    ///
    /// Transport problems fail fast without trying any strategy; they are
    /// not retried here.
    pub async fn extract_recipe(&self, url: &str) -> Result<Recipe, ExtractionError> {
        let html = self.fetcher.fetch(url).await?;
        self.orchestrator.extract_from_html(&html, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedExtractor {
        kind: StrategyKind,
        ingredients: usize,
        calls: Arc<AtomicUsize>,
    }

    impl Extractor for FixedExtractor {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut candidate = RecipeCandidate::new(&context.url);
            candidate.title = Some(format!("From {}", self.kind));
            for i in 0..self.ingredients {
                candidate.push_ingredient(format!("item {i}"));
            }
            for i in 0..3 {
                candidate.push_step(format!("Do thing {i}"));
            }
            Ok(candidate)
        }
    }

    fn fixed(kind: StrategyKind, ingredients: usize) -> (Box<dyn Extractor>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = FixedExtractor {
            kind,
            ingredients,
            calls: calls.clone(),
        };
        (Box::new(extractor), calls)
    }

    #[test]
    fn test_first_accepted_strategy_wins() {
        let (structured, _) = fixed(StrategyKind::StructuredData, 1);
        let (plugin, _) = fixed(StrategyKind::Plugin, 3);
        let (generic, generic_calls) = fixed(StrategyKind::Generic, 5);
        let orchestrator =
            Orchestrator::new(vec![structured, plugin, generic], QualityGate::default());

        let recipe = orchestrator
            .extract_from_html("<html></html>", "https://www.example.com/a")
            .unwrap();
        assert_eq!(recipe.title, "From plugin");
        assert_eq!(recipe.source_name.as_deref(), Some("example.com"));
        assert_eq!(generic_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_insufficient_is_unsupported() {
        let (structured, _) = fixed(StrategyKind::StructuredData, 2);
        let (generic, _) = fixed(StrategyKind::Generic, 0);
        let orchestrator = Orchestrator::new(vec![structured, generic], QualityGate::default());

        match orchestrator.extract_from_html("<html></html>", "https://example.com") {
            Err(ExtractionError::Unsupported { attempted }) => {
                assert_eq!(attempted, vec!["structured_data", "generic"]);
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn test_attempt_reports_failed_strategy() {
        let orchestrator = Orchestrator::default();
        let context = ParsingContext::new("https://example.com", "<p>nothing here</p>");
        let outcome = orchestrator.attempt(&StructuredDataExtractor::default(), &context);
        assert!(matches!(outcome, StrategyOutcome::Failed(_)));

        let outcome = orchestrator.attempt(&GenericExtractor, &context);
        assert!(matches!(
            outcome,
            StrategyOutcome::Insufficient(GateFailure::MissingTitle)
        ));
    }

    #[test]
    fn test_site_name_overrides_plugin_label() {
        let context = ParsingContext::new(
            "https://example.com",
            r#"<meta property="og:site_name" content="Pantry Mama">"#,
        );
        let mut candidate = RecipeCandidate::new("https://example.com");
        candidate.source_name = Some("WP Recipe Maker".to_string());
        let candidate = with_source_name(candidate, &context);
        assert_eq!(candidate.source_name.as_deref(), Some("Pantry Mama"));
    }

    #[test]
    fn test_from_config_respects_order() {
        let config = ExtractorConfig {
            strategies: vec![StrategyKind::Generic, StrategyKind::StructuredData],
            ..ExtractorConfig::default()
        };
        assert_eq!(
            Orchestrator::from_config(&config).strategy_kinds(),
            vec![StrategyKind::Generic, StrategyKind::StructuredData]
        );
    }
}
