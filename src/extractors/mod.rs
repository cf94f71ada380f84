use crate::config::StrategyKind;
use crate::error::StrategyError;
use crate::model::RecipeCandidate;
use log::debug;
use scraper::{ElementRef, Html, Selector};

mod generic;
mod json_ld;
mod microdata;
pub mod plugins;
mod structured;

pub use generic::GenericExtractor;
pub use json_ld::JsonLdExtractor;
pub use microdata::MicroDataExtractor;
pub use plugins::{PluginAdapter, PluginExtractor, PluginRegistry};
pub use structured::StructuredDataExtractor;

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }
}

/// One extraction strategy in the cascade.
pub trait Extractor: Send + Sync {
    fn kind(&self) -> StrategyKind;
    fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError>;
}

/// Parses a selector, logging and skipping invalid ones.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!("Skipping invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the label when all of an element's text sits inside `<strong>`/`<b>`
/// and ends with a colon, e.g. `<li><strong>For the glaze:</strong></li>`.
pub(crate) fn emphasis_label(element: ElementRef) -> Option<String> {
    let text = element_text(element);
    if !text.ends_with(':') || text.len() < 2 {
        return None;
    }
    let emphasis = Selector::parse("strong, b").unwrap();
    let emphasized = element
        .select(&emphasis)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");
    let squashed = |s: &str| s.split_whitespace().collect::<String>();
    (squashed(&emphasized) == squashed(&text)).then_some(text)
}

/// Text of a list item, rendering emphasis-only labels as `**Label:**`.
pub(crate) fn item_text(element: ElementRef) -> String {
    match emphasis_label(element) {
        Some(label) => format!("**{label}**"),
        None => element_text(element),
    }
}

/// First non-empty `content` attribute among the given meta selectors.
pub(crate) fn meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|selector| {
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("content").or(el.value().attr("href")))
                .map(str::trim)
                .find(|content| !content.is_empty())
                .map(str::to_string)
        })
}

/// Image URL of an `<img>` (or an element wrapping one), honouring lazy-load attributes.
pub(crate) fn image_source(element: ElementRef) -> Option<String> {
    let img = if element.value().name() == "img" {
        Some(element)
    } else {
        element.select(&Selector::parse("img").unwrap()).next()
    };
    let target = img.unwrap_or(element);
    ["data-lazy-src", "data-src", "src", "content", "href"]
        .iter()
        .filter_map(|attr| target.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(str::to_string)
}

/// Best page title: `og:title`, then the first `<h1>`, then `<title>` up to a site suffix.
pub(crate) fn page_title(document: &Html) -> Option<String> {
    if let Some(title) = meta_content(document, &["meta[property='og:title']"]) {
        return Some(title);
    }
    let h1 = Selector::parse("h1").unwrap();
    if let Some(text) = document
        .select(&h1)
        .map(element_text)
        .find(|t| !t.is_empty())
    {
        return Some(text);
    }
    let title = Selector::parse("title").unwrap();
    document
        .select(&title)
        .next()
        .map(element_text)
        .map(|t| t.split(" | ").next().unwrap_or_default().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        document.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn test_item_text_marks_emphasis_labels() {
        let document = Html::parse_fragment(
            "<ul><li id='a'><strong>For the glaze:</strong></li>\
             <li id='b'><strong>Note:</strong> stir well</li></ul>",
        );
        assert_eq!(item_text(first(&document, "#a")), "**For the glaze:**");
        assert_eq!(item_text(first(&document, "#b")), "Note: stir well");
    }

    #[test]
    fn test_image_source_prefers_lazy_attributes() {
        let document = Html::parse_fragment(
            "<div class='img'><img src='data:image/gif;base64,AAA' data-lazy-src='https://x.test/a.jpg'></div>",
        );
        assert_eq!(
            image_source(first(&document, ".img")).as_deref(),
            Some("https://x.test/a.jpg")
        );
    }

    #[test]
    fn test_page_title_fallbacks() {
        let document =
            Html::parse_document("<html><head><title>Lemon Bars | My Blog</title></head></html>");
        assert_eq!(page_title(&document).as_deref(), Some("Lemon Bars"));

        let document = Html::parse_document(
            "<html><head><meta property='og:title' content='Scones'></head><body><h1>Other</h1></body></html>",
        );
        assert_eq!(page_title(&document).as_deref(), Some("Scones"));
    }
}
