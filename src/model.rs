use serde::Serialize;

/// Canonical recipe record handed to the caller once it passes the quality gate.
///
/// `id`, `is_favorite`, `created_at` and `updated_at` belong to the persistence
/// layer; extraction leaves them at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub times: Option<Times>,
    pub servings: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub source_url: String,
    pub source_name: Option<String>,
    pub category: Option<String>,
    pub is_favorite: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Recipe {
    /// Steps that are actual instructions, skipping section headers.
    pub fn instruction_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| !step.is_header)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    /// Text exactly as scraped (after whitespace cleanup).
    pub raw: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub name: Option<String>,
}

impl Ingredient {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            quantity: None,
            unit: None,
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub text: String,
    pub is_header: bool,
    pub durations: Vec<Duration>,
}

impl Step {
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_header: false,
            durations: Vec::new(),
        }
    }

    /// A synthetic section marker, rendered as `**Name:**`.
    pub fn section_header(name: &str) -> Self {
        let name = name.trim().trim_end_matches(':').trim();
        Self {
            text: format!("**{name}:**"),
            is_header: true,
            durations: Vec::new(),
        }
    }
}

/// A time span found inside instruction text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duration {
    pub seconds: u64,
    /// The phrase the value was read from, e.g. `"1 hour and 15 minutes"`.
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Times {
    pub prep_seconds: Option<u64>,
    pub cook_seconds: Option<u64>,
    pub total_seconds: Option<u64>,
}

impl Times {
    /// Builds a `Times` block, returning `None` when nothing is known.
    /// A missing total is derived from prep + cook when both are present
    /// and their sum fits.
    pub fn from_parts(prep: Option<u64>, cook: Option<u64>, total: Option<u64>) -> Option<Self> {
        let total = total.or(match (prep, cook) {
            (Some(p), Some(c)) => p.checked_add(c),
            _ => None,
        });
        if prep.is_none() && cook.is_none() && total.is_none() {
            return None;
        }
        Some(Self {
            prep_seconds: prep,
            cook_seconds: cook,
            total_seconds: total,
        })
    }
}

/// Raw output of a single extraction strategy, before normalization.
///
/// Every field may be missing; the quality gate decides whether the
/// candidate is usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeCandidate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub times: Option<Times>,
    pub servings: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub source_url: String,
    pub source_name: Option<String>,
    pub category: Option<String>,
}

impl RecipeCandidate {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn push_ingredient(&mut self, raw: impl Into<String>) {
        self.ingredients.push(Ingredient::from_raw(raw));
    }

    pub fn push_step(&mut self, text: impl Into<String>) {
        self.steps.push(Step::instruction(text));
    }

    pub fn push_section(&mut self, name: &str) {
        self.steps.push(Step::section_header(name));
    }

    /// Freezes an accepted candidate into the canonical record.
    pub fn into_recipe(self) -> Recipe {
        Recipe {
            id: None,
            title: self.title.unwrap_or_default(),
            description: self.description,
            ingredients: self.ingredients,
            steps: self.steps,
            times: self.times,
            servings: self.servings,
            author: self.author,
            image: self.image,
            source_url: self.source_url,
            source_name: self.source_name,
            category: self.category,
            is_favorite: false,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_header_formatting() {
        let step = Step::section_header("Topping:");
        assert_eq!(step.text, "**Topping:**");
        assert!(step.is_header);
    }

    #[test]
    fn test_times_derives_total() {
        let times = Times::from_parts(Some(600), Some(1200), None).unwrap();
        assert_eq!(times.total_seconds, Some(1800));
        assert!(Times::from_parts(None, None, None).is_none());
    }

    #[test]
    fn test_times_skips_total_on_overflow() {
        let times = Times::from_parts(Some(u64::MAX), Some(60), None).unwrap();
        assert_eq!(times.prep_seconds, Some(u64::MAX));
        assert_eq!(times.cook_seconds, Some(60));
        assert!(times.total_seconds.is_none());
    }

    #[test]
    fn test_into_recipe_leaves_storage_fields_empty() {
        let mut candidate = RecipeCandidate::new("https://example.com/pie");
        candidate.title = Some("Pie".to_string());
        let recipe = candidate.into_recipe();
        assert!(recipe.id.is_none());
        assert!(!recipe.is_favorite);
        assert!(recipe.created_at.is_none());
        assert_eq!(recipe.source_url, "https://example.com/pie");
    }
}
