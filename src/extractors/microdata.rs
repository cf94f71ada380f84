use super::{element_text, image_source, Extractor, ParsingContext};
use crate::config::StrategyKind;
use crate::durations::{extract_durations_from_instruction, parse_iso8601_duration};
use crate::error::StrategyError;
use crate::model::{RecipeCandidate, Times};
use log::debug;
use scraper::{ElementRef, Selector};

pub struct MicroDataExtractor;

impl MicroDataExtractor {
    fn find_recipe_container<'a>(&self, document: &'a scraper::Html) -> Option<ElementRef<'a>> {
        // Look for elements with itemscope and itemtype containing "Recipe"
        let selector = Selector::parse("[itemscope]").unwrap();
        document.select(&selector).find(|element| {
            element.value().attr("itemtype").is_some_and(|itemtype| {
                itemtype.contains("schema.org/Recipe")
                    || itemtype.contains("data-vocabulary.org/Recipe")
            })
        })
    }

    /// Value of an itemprop: `content`/`datetime` attributes win over text.
    fn prop_value(element: ElementRef) -> String {
        element
            .value()
            .attr("content")
            .or(element.value().attr("datetime"))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| element_text(element))
    }

    /// Props under `root` that belong to it and not to a nested item such
    /// as the author's Person or a review.
    fn own_props<'a>(
        root: ElementRef<'a>,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        root.select(selector).filter(move |element| {
            element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|ancestor| ancestor.value().attr("itemscope").is_some())
                .is_some_and(|scope| scope.id() == root.id())
        })
    }

    fn get_itemprop(&self, root: ElementRef, prop: &str) -> Option<String> {
        let selector = Selector::parse(&format!("[itemprop='{prop}']")).ok()?;
        let value = Self::own_props(root, &selector)
            .map(Self::prop_value)
            .find(|v| !v.is_empty());
        value
    }

    fn get_itemprop_list(&self, root: ElementRef, prop: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(&format!("[itemprop='{prop}']")) else {
            return Vec::new();
        };
        Self::own_props(root, &selector)
            .map(Self::prop_value)
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn get_seconds(&self, root: ElementRef, prop: &str) -> Option<u64> {
        let value = self.get_itemprop(root, prop)?;
        parse_iso8601_duration(&value).or_else(|| {
            extract_durations_from_instruction(&value)
                .first()
                .map(|d| d.seconds)
        })
    }
}

impl Extractor for MicroDataExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredData
    }

    fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError> {
        debug!("Attempting to extract recipe using MicroData extractor");

        // Only look inside a Recipe item: page-wide "name"/"description" props
        // belong to the site, the author bio or ads just as often.
        let container = self
            .find_recipe_container(&context.document)
            .ok_or_else(|| {
                StrategyError::NotApplicable("No MicroData Recipe container found".to_string())
            })?;

        let mut candidate = RecipeCandidate::new(&context.url);
        candidate.title = self.get_itemprop(container, "name");
        candidate.description = self.get_itemprop(container, "description");

        let image_selector = Selector::parse("[itemprop='image']").unwrap();
        candidate.image = Self::own_props(container, &image_selector)
            .next()
            .and_then(|img| image_source(img).or_else(|| Some(element_text(img))))
            .filter(|src| !src.is_empty());

        // Author can be a string or a Person item with a nested name
        let author_selector = Selector::parse("[itemprop='author']").unwrap();
        if let Some(author_el) = Self::own_props(container, &author_selector).next() {
            let name_selector = Selector::parse("[itemprop='name']").unwrap();
            let target_el = author_el.select(&name_selector).next().unwrap_or(author_el);
            let text = Self::prop_value(target_el);
            if !text.is_empty() {
                candidate.author = Some(text);
            }
        }

        candidate.times = Times::from_parts(
            self.get_seconds(container, "prepTime"),
            self.get_seconds(container, "cookTime"),
            self.get_seconds(container, "totalTime"),
        );
        candidate.servings = self.get_itemprop(container, "recipeYield");
        candidate.category = self.get_itemprop(container, "recipeCategory");

        let mut ingredients = self.get_itemprop_list(container, "recipeIngredient");
        if ingredients.is_empty() {
            ingredients = self.get_itemprop_list(container, "ingredients");
        }
        for ingredient in ingredients {
            candidate.push_ingredient(ingredient);
        }

        let mut instructions = self.get_itemprop_list(container, "recipeInstructions");
        if instructions.is_empty() {
            instructions = self.get_itemprop_list(container, "instructions");
        }
        for instruction in instructions {
            candidate.push_step(instruction);
        }

        if candidate.ingredients.is_empty() && candidate.steps.is_empty() {
            return Err(StrategyError::Malformed(
                "Could not extract recipe content".to_string(),
            ));
        }

        Ok(candidate)
    }
}
