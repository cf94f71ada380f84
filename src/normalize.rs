//! Cleans a winning candidate into canonical shape: tidy text, section
//! headers marked in place, durations attached to instruction steps.
//!
//! Running the normalizer twice yields the same candidate.

use crate::durations::extract_durations_from_instruction;
use crate::ingredient::parse_ingredient;
use crate::model::{Ingredient, RecipeCandidate, Step};

/// Zero-width and byte-order characters that survive `char::is_control`.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}

/// Removes invisible/control characters and collapses whitespace runs.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !is_invisible(*c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for text that is exactly an emphasis-wrapped label ending in a
/// colon, such as `**Topping:**` or `__For the sauce:__`.
pub fn is_section_header(text: &str) -> bool {
    let text = text.trim();
    ["**", "__"].iter().any(|marker| {
        text.strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
            .map(str::trim)
            .and_then(|inner| inner.strip_suffix(':'))
            .is_some_and(|label| {
                !label.trim().is_empty() && !label.contains(['*', '_'].as_slice())
            })
    })
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v)).filter(|v| !v.is_empty())
}

/// Drops an entry identical to the one right before it, a common artifact
/// of nested plugin containers.
fn dedup_adjacent<T, F>(items: &mut Vec<T>, key: F)
where
    F: Fn(&T) -> &str,
{
    items.dedup_by(|current, previous| key(current) == key(previous));
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn normalize(&self, candidate: RecipeCandidate) -> RecipeCandidate {
        let mut ingredients: Vec<Ingredient> = candidate
            .ingredients
            .into_iter()
            .map(|ingredient| clean_text(&ingredient.raw))
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let mut ingredient = Ingredient::from_raw(raw);
                parse_ingredient(&mut ingredient);
                ingredient
            })
            .collect();
        dedup_adjacent(&mut ingredients, |i| i.raw.as_str());

        let mut steps: Vec<Step> = candidate
            .steps
            .into_iter()
            .filter_map(|step| self.normalize_step(step))
            .collect();
        dedup_adjacent(&mut steps, |s| s.text.as_str());

        RecipeCandidate {
            title: clean_optional(candidate.title),
            description: clean_optional(candidate.description),
            ingredients,
            steps,
            times: candidate.times,
            servings: clean_optional(candidate.servings),
            author: clean_optional(candidate.author),
            image: clean_optional(candidate.image),
            source_url: candidate.source_url,
            source_name: clean_optional(candidate.source_name),
            category: clean_optional(candidate.category),
        }
    }

    fn normalize_step(&self, step: Step) -> Option<Step> {
        let text = clean_text(&step.text);
        if text.is_empty() {
            return None;
        }
        let is_header = step.is_header || is_section_header(&text);
        // Durations are recomputed from the text, never appended
        let durations = if is_header {
            Vec::new()
        } else {
            extract_durations_from_instruction(&text)
        };
        Some(Step {
            text,
            is_header,
            durations,
        })
    }
}
