use log::{error, info};
use std::env;
use std::process::ExitCode;

use crumb_extract::{
    normalize_recipe_url, ExtractionError, ExtractorConfig, HumanDuration, Recipe, RecipeExtractor,
};

fn usage() -> ExitCode {
    eprintln!("Usage: crumb-extract <url>");
    ExitCode::from(64)
}

fn log_summary(recipe: &Recipe) {
    let timers = recipe
        .instruction_steps()
        .flat_map(|step| step.durations.iter())
        .count();
    info!(
        "{:?}: {} ingredients, {} steps, {} timers",
        recipe.title,
        recipe.ingredients.len(),
        recipe.instruction_steps().count(),
        timers
    );
    if let Some(total) = recipe.times.as_ref().and_then(|times| times.total_seconds) {
        info!("Total time: {}", HumanDuration(total));
    }
}

async fn run(input: &str) -> Result<Recipe, ExtractionError> {
    let url = normalize_recipe_url(input)?;
    let config = ExtractorConfig::load()?;
    let extractor = RecipeExtractor::builder().config(config).build()?;

    let recipe = extractor.extract_recipe(&url).await?;
    log_summary(&recipe);
    Ok(recipe)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let Some(input) = env::args().nth(1) else {
        return usage();
    };

    match run(&input).await {
        Ok(recipe) => match serde_json::to_string_pretty(&recipe) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Could not serialize recipe: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) if e.is_transport() => {
            error!("Could not reach the page: {}", e);
            eprintln!("Could not reach the page, check the link and your connection: {e}");
            ExitCode::from(2)
        }
        Err(e @ ExtractionError::Unsupported { .. }) => {
            error!("{}", e);
            eprintln!("No recipe found on this page: {e}");
            ExitCode::from(3)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
