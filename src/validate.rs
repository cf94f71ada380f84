use crate::config::GateConfig;
use crate::model::RecipeCandidate;
use thiserror::Error;

/// Why a normalized candidate was judged unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateFailure {
    #[error("missing title")]
    MissingTitle,
    #[error("{found} ingredients, need at least {required}")]
    TooFewIngredients { found: usize, required: usize },
    #[error("{found} instruction steps, need at least {required}")]
    TooFewSteps { found: usize, required: usize },
}

/// The minimum-quality gate: a title plus enough ingredients and
/// instruction steps. Section headers never count as steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityGate {
    min_ingredients: usize,
    min_steps: usize,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

impl QualityGate {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            min_ingredients: config.min_ingredients,
            min_steps: config.min_steps,
        }
    }

    pub fn check(&self, candidate: &RecipeCandidate) -> Result<(), GateFailure> {
        if candidate
            .title
            .as_deref()
            .map_or(true, |title| title.trim().is_empty())
        {
            return Err(GateFailure::MissingTitle);
        }

        let ingredients = candidate
            .ingredients
            .iter()
            .filter(|ingredient| !ingredient.raw.trim().is_empty())
            .count();
        if ingredients < self.min_ingredients {
            return Err(GateFailure::TooFewIngredients {
                found: ingredients,
                required: self.min_ingredients,
            });
        }

        let steps = candidate
            .steps
            .iter()
            .filter(|step| !step.is_header && !step.text.trim().is_empty())
            .count();
        if steps < self.min_steps {
            return Err(GateFailure::TooFewSteps {
                found: steps,
                required: self.min_steps,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(ingredients: usize, steps: usize) -> RecipeCandidate {
        let mut candidate = RecipeCandidate::new("https://example.com");
        candidate.title = Some("Stew".to_string());
        for i in 0..ingredients {
            candidate.push_ingredient(format!("ingredient {i}"));
        }
        for i in 0..steps {
            candidate.push_step(format!("step {i}"));
        }
        candidate
    }

    #[test]
    fn test_gate_accepts_minimum() {
        assert_eq!(QualityGate::default().check(&candidate(3, 3)), Ok(()));
    }

    #[test]
    fn test_gate_rejects_missing_title() {
        let mut c = candidate(5, 5);
        c.title = Some("  ".to_string());
        assert_eq!(QualityGate::default().check(&c), Err(GateFailure::MissingTitle));
    }

    #[test]
    fn test_gate_counts() {
        assert_eq!(
            QualityGate::default().check(&candidate(2, 5)),
            Err(GateFailure::TooFewIngredients { found: 2, required: 3 })
        );
        assert_eq!(
            QualityGate::default().check(&candidate(5, 2)),
            Err(GateFailure::TooFewSteps { found: 2, required: 3 })
        );
    }

    #[test]
    fn test_headers_do_not_count_as_steps() {
        let mut c = candidate(3, 2);
        c.push_section("Glaze");
        c.push_section("Serving");
        assert_eq!(
            QualityGate::default().check(&c),
            Err(GateFailure::TooFewSteps { found: 2, required: 3 })
        );
    }

    #[test]
    fn test_gate_from_config() {
        let gate = QualityGate::from_config(&GateConfig {
            min_ingredients: 1,
            min_steps: 1,
        });
        assert_eq!(gate.check(&candidate(1, 1)), Ok(()));
    }
}
