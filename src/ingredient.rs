//! Best-effort split of an ingredient line into quantity, unit and name.
//!
//! Parsing never rejects a line: when nothing recognizable leads the text,
//! the ingredient keeps only its raw form.

use crate::model::Ingredient;

const UNITS: &[(&str, &[&str])] = &[
    ("cup", &["cup", "cups", "c"]),
    ("tbsp", &["tbsp", "tbsps", "tablespoon", "tablespoons", "tbs", "tbl"]),
    ("tsp", &["tsp", "tsps", "teaspoon", "teaspoons"]),
    ("g", &["g", "gram", "grams", "gr"]),
    ("kg", &["kg", "kilogram", "kilograms", "kilo", "kilos"]),
    ("mg", &["mg", "milligram", "milligrams"]),
    ("ml", &["ml", "milliliter", "milliliters", "millilitre", "millilitres"]),
    ("l", &["l", "liter", "liters", "litre", "litres"]),
    ("oz", &["oz", "ounce", "ounces"]),
    ("fl oz", &["floz"]),
    ("lb", &["lb", "lbs", "pound", "pounds"]),
    ("pinch", &["pinch", "pinches"]),
    ("dash", &["dash", "dashes"]),
    ("clove", &["clove", "cloves"]),
    ("can", &["can", "cans"]),
    ("slice", &["slice", "slices"]),
    ("stick", &["stick", "sticks"]),
    ("bunch", &["bunch", "bunches"]),
    ("package", &["package", "packages", "pkg"]),
    ("quart", &["quart", "quarts", "qt"]),
    ("pint", &["pint", "pints", "pt"]),
    ("sprig", &["sprig", "sprigs"]),
];

fn vulgar_fraction(c: char) -> Option<&'static str> {
    Some(match c {
        '½' => "1/2",
        '⅓' => "1/3",
        '⅔' => "2/3",
        '¼' => "1/4",
        '¾' => "3/4",
        '⅛' => "1/8",
        '⅜' => "3/8",
        '⅝' => "5/8",
        '⅞' => "7/8",
        '⅕' => "1/5",
        _ => return None,
    })
}

/// Rewrites unicode fractions to ASCII, keeping mixed numbers apart: `1½` becomes `1 1/2`.
fn expand_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match vulgar_fraction(c) {
            Some(ascii) => {
                if out.chars().last().is_some_and(|p| p.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
    }
    out
}

fn is_number(word: &str) -> bool {
    let mut parts = word.splitn(2, '/');
    let whole = parts.next().unwrap_or_default();
    let valid = |s: &str| {
        !s.is_empty()
            && s.chars().all(|c| c.is_ascii_digit() || c == '.')
            && s.chars().filter(|&c| c == '.').count() <= 1
            && !s.starts_with('.')
    };
    match parts.next() {
        Some(denominator) => {
            valid(whole) && !denominator.is_empty() && denominator.chars().all(|c| c.is_ascii_digit())
        }
        None => valid(whole),
    }
}

fn is_range(word: &str) -> bool {
    word.split_once(['-', '–'])
        .is_some_and(|(low, high)| is_number(low) && is_number(high))
}

fn lookup_unit(word: &str) -> Option<&'static str> {
    let cleaned: String = word
        .trim_end_matches('.')
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase();
    UNITS
        .iter()
        .find(|(_, aliases)| aliases.contains(&cleaned.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Splits a leading quantity into a number token and an attached unit, as in `200g`.
fn split_attached_unit(word: &str) -> Option<(&str, &'static str)> {
    let boundary = word.find(|c: char| c.is_alphabetic())?;
    let (number, unit) = word.split_at(boundary);
    if !is_number(number) {
        return None;
    }
    lookup_unit(unit).map(|unit| (number, unit))
}

/// Fills the parsed fields of `ingredient` from its raw text.
pub fn parse_ingredient(ingredient: &mut Ingredient) {
    let expanded = expand_fractions(&ingredient.raw);
    let words: Vec<&str> = expanded.split_whitespace().collect();
    if words.is_empty() {
        return;
    }

    let mut quantity: Vec<&str> = Vec::new();
    let mut unit = None;
    let mut index = 0;

    while let Some(word) = words.get(index) {
        if is_number(word) || is_range(word) {
            quantity.push(word);
            index += 1;
        } else if quantity.is_empty() {
            if let Some((number, attached)) = split_attached_unit(word) {
                quantity.push(number);
                unit = Some(attached);
                index += 1;
            }
            break;
        } else {
            break;
        }
    }

    if quantity.is_empty() {
        return;
    }

    if unit.is_none() {
        if let Some(canonical) = words.get(index).and_then(|w| lookup_unit(w)) {
            unit = Some(canonical);
            index += 1;
        } else if let (Some(a), Some(b)) = (words.get(index), words.get(index + 1)) {
            // two-word units such as "fl oz"
            if let Some(canonical) = lookup_unit(&format!("{a}{b}")) {
                unit = Some(canonical);
                index += 2;
            }
        }
    }

    let name = words[index..]
        .join(" ")
        .trim_start_matches("of ")
        .trim()
        .to_string();

    ingredient.quantity = Some(quantity.join(" "));
    ingredient.unit = unit.map(str::to_string);
    ingredient.name = (!name.is_empty()).then_some(name);
}
