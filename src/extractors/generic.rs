//! Last-resort layout heuristics for pages without structured data or a
//! known plugin. Missing pieces stay empty; the quality gate judges them.

use super::{element_text, item_text, meta_content, page_title, Extractor, ParsingContext};
use crate::config::StrategyKind;
use crate::error::StrategyError;
use crate::model::RecipeCandidate;
use log::debug;
use scraper::{ElementRef, Html, Selector};

const INGREDIENT_LABELS: &[&str] = &["ingredient"];
const INSTRUCTION_LABELS: &[&str] = &[
    "instruction",
    "direction",
    "method",
    "preparation",
    "steps",
];

/// Headings and labels longer than this are prose, not section labels.
const MAX_LABEL_LEN: usize = 40;

pub struct GenericExtractor;

/// Class-name fragments used when no labelled list is found.
struct FuzzyClasses {
    ingredients: &'static [&'static str],
    instructions: &'static [&'static str],
}

const FUZZY: FuzzyClasses = FuzzyClasses {
    ingredients: &["ingredient"],
    instructions: &["instruction", "direction", "method", "step"],
};

fn is_label(element: ElementRef, keywords: &[&str]) -> bool {
    let text = element_text(element).to_lowercase();
    !text.is_empty()
        && text.len() <= MAX_LABEL_LEN
        && keywords.iter().any(|keyword| text.contains(keyword))
}

fn is_list(element: ElementRef) -> bool {
    matches!(element.value().name(), "ul" | "ol")
}

fn list_items(list: ElementRef) -> Vec<String> {
    let li = Selector::parse("li").unwrap();
    list.select(&li)
        .map(item_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Items of the first list-like block after `label`: a list sibling (or a
/// sibling containing one), otherwise the run of paragraphs up to the next heading.
fn block_after(label: ElementRef) -> Vec<String> {
    let heading = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    let nested_list = Selector::parse("ul, ol").unwrap();

    // Labels are often wrapped (<div><h3>Ingredients</h3></div>), so climb a little.
    let mut anchor = Some(label);
    for _ in 0..3 {
        let Some(current) = anchor else { break };
        let mut paragraphs = Vec::new();

        for sibling in current.next_siblings().filter_map(ElementRef::wrap) {
            if is_list(sibling) {
                return list_items(sibling);
            }
            if heading.matches(&sibling) {
                break;
            }
            if let Some(list) = sibling.select(&nested_list).next() {
                if paragraphs.is_empty() {
                    return list_items(list);
                }
                break;
            }
            if sibling.value().name() == "p" {
                let text = item_text(sibling);
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        if !paragraphs.is_empty() {
            return paragraphs;
        }
        anchor = current.parent().and_then(ElementRef::wrap);
    }

    Vec::new()
}

impl GenericExtractor {
    /// Items keyed off a heading/label such as "Ingredients" or "Directions".
    fn labelled_list(document: &Html, keywords: &[&str]) -> Vec<String> {
        let labels = Selector::parse("h1, h2, h3, h4, h5, h6, strong, b, p, span, div").unwrap();
        document
            .select(&labels)
            .filter(|element| is_label(*element, keywords))
            .map(block_after)
            .find(|items| !items.is_empty())
            .unwrap_or_default()
    }

    /// Items of the first list inside an element whose class mentions one of `fragments`.
    fn class_list(document: &Html, fragments: &[&str]) -> Vec<String> {
        let nested_list = Selector::parse("ul, ol").unwrap();
        for fragment in fragments {
            let Ok(selector) = Selector::parse(&format!("[class*='{fragment}']")) else {
                continue;
            };
            for container in document.select(&selector) {
                let list = if is_list(container) {
                    Some(container)
                } else {
                    container.select(&nested_list).next()
                };
                if let Some(list) = list {
                    let items = list_items(list);
                    if !items.is_empty() {
                        debug!("GenericExtractor: list found by class fragment {}", fragment);
                        return items;
                    }
                }
            }
        }
        Vec::new()
    }

    fn find_items(document: &Html, labels: &[&str], fragments: &[&str]) -> Vec<String> {
        let items = Self::labelled_list(document, labels);
        if items.is_empty() {
            Self::class_list(document, fragments)
        } else {
            items
        }
    }
}

impl Extractor for GenericExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Generic
    }

    fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError> {
        debug!("Attempting to extract recipe using layout heuristics");
        let document = &context.document;
        let mut candidate = RecipeCandidate::new(&context.url);

        candidate.title = page_title(document);
        candidate.description = meta_content(
            document,
            &["meta[name='description']", "meta[property='og:description']"],
        );
        candidate.image = meta_content(
            document,
            &[
                "meta[property='og:image']",
                "meta[property='og:image:url']",
                "meta[name='twitter:image']",
                "link[rel='image_src']",
            ],
        );
        candidate.author = meta_content(document, &["meta[name='author']"]);

        for ingredient in Self::find_items(document, INGREDIENT_LABELS, FUZZY.ingredients) {
            candidate.push_ingredient(ingredient);
        }
        for step in Self::find_items(document, INSTRUCTION_LABELS, FUZZY.instructions) {
            candidate.push_step(step);
        }

        debug!(
            "GenericExtractor: title {:?}, {} ingredients, {} steps",
            candidate.title,
            candidate.ingredients.len(),
            candidate.steps.len()
        );
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_after_labels() {
        let html = r#"
        <html><head>
            <title>Grandma's Pancakes | Family Kitchen</title>
            <meta property="og:image" content="https://example.com/pancakes.jpg">
            <meta name="author" content="Grandma">
        </head><body>
            <article>
                <h1>Grandma's Pancakes</h1>
                <p>These are the best pancakes.</p>
                <div><h3>Ingredients</h3></div>
                <ul><li>1 cup flour</li><li>1 egg</li><li>1 cup milk</li></ul>
                <h3>Directions</h3>
                <ol>
                    <li><strong>Batter:</strong></li>
                    <li>Whisk everything.</li>
                    <li>Rest 10 minutes.</li>
                    <li>Fry until golden.</li>
                </ol>
            </article>
        </body></html>
        "#;
        let context = ParsingContext::new("https://example.com/pancakes", html);
        let candidate = GenericExtractor.parse(&context).unwrap();

        assert_eq!(candidate.title.as_deref(), Some("Grandma's Pancakes"));
        assert_eq!(
            candidate.image.as_deref(),
            Some("https://example.com/pancakes.jpg")
        );
        assert_eq!(candidate.author.as_deref(), Some("Grandma"));
        assert_eq!(candidate.ingredients.len(), 3);
        assert_eq!(candidate.steps.len(), 4);
        assert_eq!(candidate.steps[0].text, "**Batter:**");
    }

    #[test]
    fn test_paragraph_steps() {
        let html = r#"
        <h1>Simple Soup</h1>
        <h2>Ingredients</h2>
        <ul><li>water</li><li>salt</li><li>onion</li></ul>
        <h2>Method</h2>
        <p>Chop the onion.</p>
        <p>Boil the water.</p>
        <p>Simmer 20 minutes.</p>
        <h2>Comments</h2>
        <p>Nice!</p>
        "#;
        let context = ParsingContext::new("https://example.com/soup", html);
        let candidate = GenericExtractor.parse(&context).unwrap();
        let steps: Vec<&str> = candidate.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            steps,
            vec!["Chop the onion.", "Boil the water.", "Simmer 20 minutes."]
        );
    }

    #[test]
    fn test_class_fallback() {
        let html = r#"
        <h1>Salad</h1>
        <div class="post-ingredients-box"><ul><li>lettuce</li><li>tomato</li></ul></div>
        <div class="cooking-steps"><ol><li>Chop</li><li>Toss</li></ol></div>
        "#;
        let context = ParsingContext::new("https://example.com/salad", html);
        let candidate = GenericExtractor.parse(&context).unwrap();
        assert_eq!(candidate.ingredients.len(), 2);
        assert_eq!(candidate.steps.len(), 2);
    }

    #[test]
    fn test_empty_page_never_errors() {
        let context = ParsingContext::new("https://example.com", "<html></html>");
        let candidate = GenericExtractor.parse(&context).unwrap();
        assert!(candidate.title.is_none());
        assert!(candidate.ingredients.is_empty());
    }
}
