use super::{Extractor, ParsingContext};
use crate::config::StrategyKind;
use crate::durations::parse_iso8601_duration;
use crate::error::StrategyError;
use crate::model::{RecipeCandidate, Times};
use html_escape::decode_html_entities;
use log::debug;
use scraper::Selector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub struct JsonLdExtractor;

impl JsonLdExtractor {
    fn convert_to_candidate(&self, json_ld_recipe: JsonLdRecipe, url: &str) -> RecipeCandidate {
        let mut candidate = RecipeCandidate::new(url);

        candidate.title = non_empty(decode_html_symbols(&json_ld_recipe.name));

        candidate.description = json_ld_recipe.description.and_then(|desc| match desc {
            DescriptionType::String(d) => non_empty(decode_html_symbols(&d)),
            DescriptionType::Object(d) => non_empty(decode_html_symbols(&d.text)),
        });

        // Map author
        if let Some(author) = json_ld_recipe.author {
            let names: Vec<String> = author
                .into_names()
                .iter()
                .filter_map(|name| non_empty(decode_html_symbols(name)))
                .collect();
            candidate.author = non_empty(names.join(", "));
        }

        if let Some(yield_val) = json_ld_recipe.recipe_yield {
            let yield_str = match yield_val {
                RecipeYield::String(s) => s,
                RecipeYield::Number(n) => n.to_string(),
                RecipeYield::Array(arr) => {
                    let entries: Vec<String> = arr
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::String(s) => Some(s),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect();
                    // Prefer the descriptive entry ("15 pieces") over a bare number
                    entries
                        .iter()
                        .find(|s| s.contains(char::is_alphabetic))
                        .or_else(|| entries.first())
                        .cloned()
                        .unwrap_or_default()
                }
            };
            candidate.servings = non_empty(yield_str);
        }

        if let Some(category) = json_ld_recipe.recipe_category {
            let category_str = match category {
                StringOrList::String(s) => s,
                StringOrList::Multiple(v) => v.join(", "),
            };
            candidate.category = non_empty(decode_html_symbols(&category_str));
        }

        let seconds = |value: Option<String>| value.as_deref().and_then(parse_iso8601_duration);
        candidate.times = Times::from_parts(
            seconds(json_ld_recipe.prep_time),
            seconds(json_ld_recipe.cook_time),
            seconds(json_ld_recipe.total_time),
        );

        // Use the first image if multiple are available
        candidate.image = json_ld_recipe.image.and_then(|img| match img {
            ImageType::String(i) => non_empty(decode_html_symbols(&i)),
            ImageType::MultipleStrings(imgs) => imgs
                .first()
                .and_then(|i| non_empty(decode_html_symbols(i))),
            ImageType::Object(i) => i.into_url(),
            ImageType::MultipleObjects(imgs) => imgs.into_iter().find_map(ImageObject::into_url),
            ImageType::None => None,
        });

        match json_ld_recipe.recipe_ingredient {
            Some(RecipeIngredients::Single(line)) => {
                for line in decode_html_symbols(&line).lines() {
                    candidate.push_ingredient(line);
                }
            }
            Some(RecipeIngredients::Strings(ingredients)) => {
                for ing in ingredients.iter().filter(|ing| !ing.trim().is_empty()) {
                    candidate.push_ingredient(decode_html_symbols(ing));
                }
            }
            Some(RecipeIngredients::Objects(ingredients)) => {
                for ing in ingredients.iter().filter(|ing| !ing.name.trim().is_empty()) {
                    let amount = ing.amount.as_deref().unwrap_or("").trim();
                    let name = decode_html_symbols(&ing.name);
                    if amount.is_empty() {
                        candidate.push_ingredient(name);
                    } else {
                        candidate.push_ingredient(format!("{amount} {name}"));
                    }
                }
            }
            None => {}
        }

        match json_ld_recipe.recipe_instructions {
            Some(RecipeInstructions::String(instructions)) => {
                for line in decode_html_symbols(&instructions).lines() {
                    candidate.push_step(line);
                }
            }
            Some(RecipeInstructions::Items(items)) => push_items(&mut candidate, items),
            Some(RecipeInstructions::NestedSections(sections)) => {
                for section in sections {
                    push_items(&mut candidate, section);
                }
            }
            None => {}
        }

        candidate
    }
}

/// Flattens instruction items in order; each `HowToSection` contributes a
/// header step followed by its own steps.
fn push_items(candidate: &mut RecipeCandidate, items: Vec<InstructionItem>) {
    for item in items {
        match item {
            InstructionItem::Text(text) => candidate.push_step(decode_html_symbols(&text)),
            InstructionItem::HowTo(HowTo::HowToStep(step)) => {
                if let Some(text) = step.into_text() {
                    candidate.push_step(decode_html_symbols(&text));
                }
            }
            InstructionItem::HowTo(HowTo::HowToSection(section)) => {
                if let Some(name) = section.name.as_deref().filter(|n| !n.trim().is_empty()) {
                    candidate.push_section(&decode_html_symbols(name));
                }
                push_items(candidate, section.item_list_element);
            }
            InstructionItem::Object(obj) => candidate.push_step(decode_html_symbols(&obj.text)),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<DescriptionType>,
    #[serde(default, deserialize_with = "lenient")]
    image: Option<ImageType>,
    #[serde(
        rename = "recipeIngredient",
        alias = "ingredients",
        default,
        deserialize_with = "lenient"
    )]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeInstructions", default, deserialize_with = "lenient")]
    recipe_instructions: Option<RecipeInstructions>,
    #[serde(rename = "recipeYield", default, deserialize_with = "lenient")]
    recipe_yield: Option<RecipeYield>,
    #[serde(rename = "prepTime", default, deserialize_with = "lenient")]
    prep_time: Option<String>,
    #[serde(rename = "cookTime", default, deserialize_with = "lenient")]
    cook_time: Option<String>,
    #[serde(rename = "totalTime", default, deserialize_with = "lenient")]
    total_time: Option<String>,
    #[serde(rename = "recipeCategory", default, deserialize_with = "lenient")]
    recipe_category: Option<StringOrList>,
    #[serde(default, deserialize_with = "lenient")]
    author: Option<Author>,
}

/// Reads an optional field, treating a value of an unexpected shape as absent
/// so one odd field never discards the whole recipe.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: Option<String>,
    #[serde(rename = "contentUrl")]
    content_url: Option<String>,
}

impl ImageObject {
    fn into_url(self) -> Option<String> {
        self.url
            .or(self.content_url)
            .and_then(|u| non_empty(decode_html_symbols(&u)))
    }
}

#[derive(Debug, Deserialize)]
struct TextObject {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionType {
    String(String),
    Object(TextObject),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageType {
    None,
    String(String),
    MultipleStrings(Vec<String>),
    MultipleObjects(Vec<ImageObject>),
    Object(ImageObject),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Single(String),
    Strings(Vec<String>),
    Objects(Vec<IngredientObject>),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInstructions {
    String(String),
    Items(Vec<InstructionItem>),
    NestedSections(Vec<Vec<InstructionItem>>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionItem {
    Text(String),
    HowTo(HowTo),
    Object(TextObject),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "@type")]
enum HowTo {
    HowToStep(HowToStep),
    HowToSection(HowToSection),
}

#[derive(Debug, Deserialize)]
struct HowToStep {
    text: Option<String>,
    description: Option<String>,
    name: Option<String>,
}

impl HowToStep {
    // Prefer text over name
    fn into_text(self) -> Option<String> {
        [self.text, self.name, self.description]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct HowToSection {
    name: Option<String>,
    #[serde(rename = "itemListElement", default)]
    item_list_element: Vec<InstructionItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    String(String),
    Number(serde_json::Number),
    Array(Vec<Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Author {
    String(String),
    // Before Object: a derived struct also accepts a positional array
    Multiple(Vec<Author>),
    Object(AuthorObject),
}

impl Author {
    fn into_names(self) -> Vec<String> {
        match self {
            Author::String(name) => vec![name],
            Author::Object(obj) => obj.name.into_iter().collect(),
            Author::Multiple(authors) => authors
                .into_iter()
                .flat_map(Author::into_names)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthorObject {
    name: Option<String>,
    #[serde(rename = "@id")]
    _id: Option<String>,
}

impl TryFrom<&Value> for JsonLdRecipe {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value.clone())
    }
}

pub(crate) fn decode_html_symbols(text: &str) -> String {
    // Some sites double-encode entities (&amp;amp;), so decode twice
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(type_str)) => type_str.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Finds the first Recipe-typed object in top-level arrays and `@graph` lists.
fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(obj) => {
            if is_recipe_type(value) {
                return Some(value);
            }
            obj.get("@graph").and_then(find_recipe)
        }
        _ => None,
    }
}

impl Extractor for JsonLdExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredData
    }

    fn parse(&self, context: &ParsingContext) -> Result<RecipeCandidate, StrategyError> {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let selector = Selector::parse("script[type='application/ld+json']").unwrap();
        let document = &context.document;

        let scripts: Vec<_> = document.select(&selector).collect();
        debug!(
            "JsonLdExtractor: Found {} JSON-LD script tags",
            scripts.len()
        );

        // Try each script element until we find a valid recipe
        for (index, script) in scripts.iter().enumerate() {
            let raw_json = script.inner_html();
            let json_ld = match serde_json::from_str::<Value>(&raw_json) {
                Ok(value) => value,
                Err(_) => match serde_json::from_str::<Value>(&sanitize_json(&raw_json)) {
                    Ok(value) => value,
                    Err(e) => {
                        debug!("JsonLdExtractor: Failed to parse JSON-LD {}: {}", index, e);
                        continue;
                    }
                },
            };

            let Some(recipe) = find_recipe(&json_ld) else {
                debug!("JsonLdExtractor: No recipe found in JSON-LD {}", index);
                continue;
            };

            match JsonLdRecipe::try_from(recipe) {
                Ok(recipe) => {
                    debug!("JsonLdExtractor: Converted recipe from JSON-LD {}", index);
                    return Ok(self.convert_to_candidate(recipe, &context.url));
                }
                Err(e) => {
                    debug!("JsonLdExtractor: Skipping malformed recipe {}: {}", index, e);
                }
            }
        }

        Err(StrategyError::Malformed(
            "No valid recipe found in any JSON-LD script".to_string(),
        ))
    }
}

/// Repairs the most common hand-written JSON-LD mistakes: missing commas
/// between values, trailing commas and duplicate commas.
fn sanitize_json(json_str: &str) -> String {
    let mut minified = String::with_capacity(json_str.len());
    let mut in_string = false;
    let mut prev_char = None;
    let mut depth = 0;
    let chars: Vec<char> = json_str.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '"' if prev_char != Some('\\') => {
                in_string = !in_string;
                if !in_string {
                    // Closing a string: a following value means a comma went missing
                    let rest_chars = chars.get(i + 1..).unwrap_or(&[]);
                    let next_char = rest_chars.iter().find(|c| !c.is_whitespace());
                    if !matches!(prev_char, Some(',') | Some('[') | Some('{'))
                        && matches!(next_char, Some('"' | '[' | '{'))
                    {
                        minified.push('"');
                        minified.push(',');
                        prev_char = Some(',');
                        continue;
                    }
                }
                minified.push(c);
            }
            '[' | '{' if !in_string => {
                depth += 1;
                minified.push(c);
            }
            ']' | '}' if !in_string => {
                depth -= 1;
                minified.push(c);
                if let Some(rest_chars) = chars.get(i + 1..) {
                    let next_char = rest_chars.iter().find(|&&c| !c.is_whitespace());
                    if depth > 0 && matches!(next_char, Some(&'"')) {
                        minified.push(',');
                        prev_char = Some(',');
                        continue;
                    }
                }
            }
            ',' if !in_string => {
                if prev_char != Some(',') {
                    minified.push(c);
                }
            }
            ':' if !in_string => {
                if prev_char == Some(',') {
                    minified.pop();
                }
                minified.push(c);
            }
            _ => {
                if in_string || !c.is_whitespace() {
                    minified.push(c);
                }
            }
        }
        prev_char = Some(c);
    }

    minified
        .replace(",]", "]")
        .replace(",}", "}")
        .replace(",,", ",")
}
