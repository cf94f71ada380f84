use super::{Extractor, JsonLdExtractor, MicroDataExtractor, ParsingContext};
use crate::config::StrategyKind;
use crate::error::StrategyError;
use crate::model::RecipeCandidate;
use log::debug;

/// Embedded schema.org data: JSON-LD first, microdata when JSON-LD is
/// missing or lacks either ingredients or steps.
pub struct StructuredDataExtractor {
    json_ld: JsonLdExtractor,
    microdata: MicroDataExtractor,
}

impl Default for StructuredDataExtractor {
    fn default() -> Self {
        Self {
            json_ld: JsonLdExtractor,
            microdata: MicroDataExtractor,
        }
    }
}

impl Extractor for StructuredDataExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredData
    }

    fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError> {
        let json_ld = self.json_ld.parse(context);
        if let Ok(candidate) = &json_ld {
            if !candidate.ingredients.is_empty() && !candidate.steps.is_empty() {
                return json_ld;
            }
        }

        match self.microdata.parse(context) {
            Ok(candidate) => Ok(candidate),
            Err(e) => {
                debug!("StructuredDataExtractor: microdata unavailable: {}", e);
                json_ld
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_microdata() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">{"@type": "Recipe", "name": "Empty shell"}</script>
        </head><body>
        <div itemscope itemtype="https://schema.org/Recipe">
            <h2 itemprop="name">Toast</h2>
            <span itemprop="recipeIngredient">bread</span>
            <p itemprop="recipeInstructions">Toast the bread.</p>
        </div>
        </body></html>
        "#;
        let context = ParsingContext::new("https://example.com", html);
        let result = StructuredDataExtractor::default().parse(&context).unwrap();
        assert_eq!(result.title.as_deref(), Some("Toast"));
    }

    #[test]
    fn test_keeps_incomplete_json_ld_without_microdata() {
        let html = r#"<script type="application/ld+json">{"@type": "Recipe", "name": "Only a name"}</script>"#;
        let context = ParsingContext::new("https://example.com", html);
        let result = StructuredDataExtractor::default().parse(&context).unwrap();
        assert_eq!(result.title.as_deref(), Some("Only a name"));
        assert!(result.ingredients.is_empty());
    }
}
