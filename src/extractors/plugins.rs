//! Adapters for the recipe-card plugins that publish most recipe blogs.
//!
//! Plugin markup is far more regular than arbitrary page layout, so once a
//! plugin's signature is found its fixed container classes are trusted over
//! layout guessing.

use super::{
    element_text, image_source, item_text, page_title, selector, Extractor, ParsingContext,
};
use crate::config::{PluginsConfig, StrategyKind};
use crate::durations::{extract_durations_from_instruction, parse_iso8601_duration};
use crate::error::StrategyError;
use crate::model::{RecipeCandidate, Times};
use log::debug;
use scraper::{ElementRef, Html};

/// Extraction logic for one recipe-publishing plugin family.
pub trait PluginAdapter: Send + Sync {
    /// Registry key, also used by `plugins.disabled` in the configuration.
    fn name(&self) -> &'static str;
    /// Human readable plugin name, used as the source label when the site has none.
    fn label(&self) -> &'static str;
    fn detect(&self, document: &Html) -> bool;
    fn extract(&self, context: &ParsingContext) -> RecipeCandidate;
}

/// CSS conventions of one plugin. Selectors for ingredients and instructions
/// include the group headings so items come back in document order.
pub struct PluginSignature {
    pub name: &'static str,
    pub label: &'static str,
    pub signature: &'static str,
    pub title: &'static str,
    pub ingredients: &'static str,
    pub ingredient_heading: Option<&'static str>,
    pub instructions: &'static str,
    pub instruction_heading: Option<&'static str>,
    pub image: Option<&'static str>,
    pub author: Option<&'static str>,
    pub servings: Option<&'static str>,
    pub category: Option<&'static str>,
    pub prep_time: Option<&'static str>,
    pub cook_time: Option<&'static str>,
    pub total_time: Option<&'static str>,
}

const WP_RECIPE_MAKER: PluginSignature = PluginSignature {
    name: "wprm",
    label: "WP Recipe Maker",
    signature: ".wprm-recipe-container, .wprm-recipe",
    title: ".wprm-recipe-name",
    ingredients: ".wprm-recipe-ingredient-group-name, .wprm-recipe-ingredient",
    ingredient_heading: Some(".wprm-recipe-ingredient-group-name"),
    instructions: ".wprm-recipe-instruction-group-name, .wprm-recipe-instruction",
    instruction_heading: Some(".wprm-recipe-instruction-group-name"),
    image: Some(".wprm-recipe-image"),
    author: Some(".wprm-recipe-author"),
    servings: Some(".wprm-recipe-servings"),
    category: Some(".wprm-recipe-course"),
    prep_time: Some(".wprm-recipe-prep_time-container, .wprm-recipe-prep-time"),
    cook_time: Some(".wprm-recipe-cook_time-container, .wprm-recipe-cook-time"),
    total_time: Some(".wprm-recipe-total_time-container, .wprm-recipe-total-time"),
};

const TASTY_RECIPES: PluginSignature = PluginSignature {
    name: "tasty",
    label: "Tasty Recipes",
    signature: ".tasty-recipes",
    title: ".tasty-recipes-title",
    ingredients: ".tasty-recipes-ingredients h4, .tasty-recipes-ingredients li",
    ingredient_heading: Some(".tasty-recipes-ingredients h4"),
    instructions: ".tasty-recipes-instructions h4, .tasty-recipes-instructions li",
    instruction_heading: Some(".tasty-recipes-instructions h4"),
    image: Some(".tasty-recipes-image"),
    author: Some(".tasty-recipes-author-name"),
    servings: Some(".tasty-recipes-yield"),
    category: Some(".tasty-recipes-category"),
    prep_time: Some(".tasty-recipes-prep-time"),
    cook_time: Some(".tasty-recipes-cook-time"),
    total_time: Some(".tasty-recipes-total-time"),
};

const MEDIAVINE_CREATE: PluginSignature = PluginSignature {
    name: "mediavine",
    label: "Mediavine Create",
    signature: ".mv-create-card, .mv-create-wrapper",
    title: ".mv-create-title",
    ingredients: ".mv-create-ingredients h4, .mv-create-ingredients li",
    ingredient_heading: Some(".mv-create-ingredients h4"),
    instructions: ".mv-create-instructions h4, .mv-create-instructions li",
    instruction_heading: Some(".mv-create-instructions h4"),
    image: Some(".mv-create-image"),
    author: Some(".mv-create-author"),
    servings: Some(".mv-create-yield"),
    category: Some(".mv-create-category"),
    prep_time: Some(".mv-create-time-prep"),
    cook_time: Some(".mv-create-time-active"),
    total_time: Some(".mv-create-time-total"),
};

const WPZOOM_RECIPE_CARD: PluginSignature = PluginSignature {
    name: "wpzoom",
    label: "WPZOOM Recipe Card",
    signature: ".wp-block-wpzoom-recipe-card-block-recipe-card, .wpzoom-recipe-card",
    title: ".recipe-card-title",
    ingredients: ".ingredients-list .ingredient-item-group-title, .ingredients-list .ingredient-item",
    ingredient_heading: Some(".ingredient-item-group-title"),
    instructions: ".directions-list .direction-step-group-title, .directions-list .direction-step",
    instruction_heading: Some(".direction-step-group-title"),
    image: Some(".recipe-card-image"),
    author: Some(".recipe-card-author .author"),
    servings: Some(".detail-item-servings .detail-item-value, .recipe-card-servings"),
    category: Some(".recipe-card-course mark, .recipe-card-course"),
    prep_time: Some(".detail-item-prep-time, .recipe-card-prep-time"),
    cook_time: Some(".detail-item-cook-time, .recipe-card-cook-time"),
    total_time: Some(".detail-item-total-time, .recipe-card-total-time"),
};

const COOKED: PluginSignature = PluginSignature {
    name: "cooked",
    label: "Cooked",
    signature: ".cooked-recipe-ingredients, .cooked-recipe-directions",
    title: ".cooked-recipe-title, h1.entry-title",
    ingredients: ".cooked-recipe-ingredients .cooked-single-ingredient",
    ingredient_heading: Some(".cooked-heading"),
    instructions: ".cooked-recipe-directions .cooked-single-direction",
    instruction_heading: Some(".cooked-heading"),
    image: Some(".cooked-post-featured-image"),
    author: Some(".cooked-author .cooked-meta-title, .cooked-author"),
    servings: Some(".cooked-servings"),
    category: Some(".cooked-category"),
    prep_time: Some(".cooked-prep-time"),
    cook_time: Some(".cooked-cook-time"),
    total_time: Some(".cooked-total-time"),
};

const EASY_RECIPE: PluginSignature = PluginSignature {
    name: "easyrecipe",
    label: "EasyRecipe",
    signature: ".easyrecipe",
    title: ".ERSName",
    ingredients: ".ERSIngredients .ERSSeparator, .ERSIngredients li",
    ingredient_heading: Some(".ERSSeparator"),
    instructions: ".ERSInstructions .ERSSeparator, .ERSInstructions li",
    instruction_heading: Some(".ERSSeparator"),
    image: Some(".ERSImage, .easyrecipe img"),
    author: Some(".ERSAuthor"),
    servings: Some(".ERSServes"),
    category: Some(".ERSCategory"),
    prep_time: Some(".ERSPrepTime, time[itemprop='prepTime']"),
    cook_time: Some(".ERSCookTime, time[itemprop='cookTime']"),
    total_time: Some(".ERSTotalTime, time[itemprop='totalTime']"),
};

/// Adapter driven entirely by a [`PluginSignature`] table.
pub struct SignatureAdapter {
    signature: PluginSignature,
}

impl SignatureAdapter {
    pub const fn new(signature: PluginSignature) -> Self {
        Self { signature }
    }

    fn first_text(document: &Html, css: Option<&str>) -> Option<String> {
        let selector = selector(css?)?;
        document
            .select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    }

    fn seconds(document: &Html, css: Option<&str>) -> Option<u64> {
        let selector = selector(css?)?;
        let element = document.select(&selector).next()?;
        // Some cards carry the ISO value as an attribute next to the display text
        let iso = element
            .value()
            .attr("datetime")
            .or(element.value().attr("content"))
            .and_then(parse_iso8601_duration);
        iso.or_else(|| {
            extract_durations_from_instruction(&element_text(element))
                .first()
                .map(|d| d.seconds)
        })
    }

    /// Items in document order, with headings reported separately.
    fn items<'a>(
        document: &'a Html,
        items: &str,
        heading: Option<&str>,
    ) -> Vec<(ElementRef<'a>, bool)> {
        let Some(items) = selector(items) else {
            return Vec::new();
        };
        let heading = heading.and_then(selector);
        document
            .select(&items)
            .map(|el| {
                let is_heading = heading.as_ref().is_some_and(|h| h.matches(&el));
                (el, is_heading)
            })
            .collect()
    }
}

impl PluginAdapter for SignatureAdapter {
    fn name(&self) -> &'static str {
        self.signature.name
    }

    fn label(&self) -> &'static str {
        self.signature.label
    }

    fn detect(&self, document: &Html) -> bool {
        selector(self.signature.signature)
            .is_some_and(|selector| document.select(&selector).next().is_some())
    }

    fn extract(&self, context: &ParsingContext) -> RecipeCandidate {
        let document = &context.document;
        let sig = &self.signature;
        let mut candidate = RecipeCandidate::new(&context.url);

        candidate.title =
            Self::first_text(document, Some(sig.title)).or_else(|| page_title(document));
        candidate.author = Self::first_text(document, sig.author);
        candidate.servings = Self::first_text(document, sig.servings);
        candidate.category = Self::first_text(document, sig.category);
        candidate.source_name = Some(sig.label.to_string());
        candidate.image = sig
            .image
            .and_then(selector)
            .and_then(|s| document.select(&s).find_map(image_source));
        candidate.times = Times::from_parts(
            Self::seconds(document, sig.prep_time),
            Self::seconds(document, sig.cook_time),
            Self::seconds(document, sig.total_time),
        );

        // Ingredient groups are flattened; only steps keep their section markers
        for (element, is_heading) in Self::items(document, sig.ingredients, sig.ingredient_heading) {
            if !is_heading {
                candidate.push_ingredient(element_text(element));
            }
        }

        for (element, is_heading) in
            Self::items(document, sig.instructions, sig.instruction_heading)
        {
            if is_heading {
                let heading = element_text(element);
                if !heading.is_empty() {
                    candidate.push_section(&heading);
                }
            } else {
                candidate.push_step(item_text(element));
            }
        }

        debug!(
            "{} adapter: {} ingredients, {} steps",
            sig.label,
            candidate.ingredients.len(),
            candidate.steps.len()
        );
        candidate
    }
}

/// Ordered set of plugin adapters, most reliable signature first.
pub struct PluginRegistry {
    adapters: Vec<Box<dyn PluginAdapter>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(vec![
            Box::new(SignatureAdapter::new(WP_RECIPE_MAKER)),
            Box::new(SignatureAdapter::new(TASTY_RECIPES)),
            Box::new(SignatureAdapter::new(MEDIAVINE_CREATE)),
            Box::new(SignatureAdapter::new(WPZOOM_RECIPE_CARD)),
            Box::new(SignatureAdapter::new(COOKED)),
            Box::new(SignatureAdapter::new(EASY_RECIPE)),
        ])
    }
}

impl PluginRegistry {
    pub fn new(adapters: Vec<Box<dyn PluginAdapter>>) -> Self {
        Self { adapters }
    }

    /// The default registry minus the adapters disabled in configuration.
    pub fn from_config(config: &PluginsConfig) -> Self {
        let mut registry = Self::default();
        registry
            .adapters
            .retain(|adapter| !config.disabled.iter().any(|name| name == adapter.name()));
        registry
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|adapter| adapter.name()).collect()
    }

    /// First adapter, in priority order, whose signature matches the page.
    pub fn detect(&self, document: &Html) -> Option<&dyn PluginAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.detect(document))
            .map(|adapter| adapter.as_ref())
    }
}

/// The plugin strategy: runs the first matching adapter of its registry.
pub struct PluginExtractor {
    registry: PluginRegistry,
}

impl PluginExtractor {
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }
}

impl Extractor for PluginExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Plugin
    }

    fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError> {
        let adapter = self.registry.detect(&context.document).ok_or_else(|| {
            StrategyError::NotApplicable("no known recipe plugin signature".to_string())
        })?;
        debug!("PluginExtractor: detected {}", adapter.label());
        Ok(adapter.extract(context))
    }
}
