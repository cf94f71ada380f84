use crumb_extract::{ExtractionError, RecipeExtractor, StrategyKind};
use std::time::{Duration, Instant};

const JSON_LD_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Honey Glazed Ham | Weeknight Kitchen</title>
    <meta property="og:site_name" content="Weeknight Kitchen">
    <script type="application/ld+json">
    {
        "@context": "https://schema.org",
        "@type": "Recipe",
        "name": "Honey Glazed Ham",
        "author": {"@type": "Person", "name": "Sam Baker"},
        "image": ["https://example.com/ham.jpg"],
        "prepTime": "PT15M",
        "cookTime": "PT1H30M",
        "recipeYield": "8 servings",
        "recipeIngredient": [
            "1 bone-in ham",
            "1/2 cup honey",
            "2 tbsp dijon mustard",
            "1/4 tsp ground cloves"
        ],
        "recipeInstructions": [
            {"@type": "HowToStep", "text": "Heat the oven to 325F."},
            {"@type": "HowToStep", "text": "Bake the ham for 1 hour and 15 minutes."},
            {
                "@type": "HowToSection",
                "name": "For the glaze",
                "itemListElement": [
                    {"@type": "HowToStep", "text": "Whisk honey, mustard and cloves."},
                    {"@type": "HowToStep", "text": "Brush over the ham and bake 10-12 minutes more."}
                ]
            }
        ]
    }
    </script>
</head>
<body><h1>Honey Glazed Ham</h1></body>
</html>
"#;

fn wprm_card(title: &str) -> String {
    format!(
        r#"
        <div class="wprm-recipe-container">
            <h2 class="wprm-recipe-name">{title}</h2>
            <ul>
                <li class="wprm-recipe-ingredient">2 cups rice</li>
                <li class="wprm-recipe-ingredient">1 onion</li>
                <li class="wprm-recipe-ingredient">3 cups stock</li>
            </ul>
            <ul>
                <li class="wprm-recipe-instruction">Saute the onion.</li>
                <li class="wprm-recipe-instruction">Add rice and toast 2 minutes.</li>
                <li class="wprm-recipe-instruction">Add stock and simmer 18 minutes.</li>
            </ul>
        </div>
        "#
    )
}

async fn serve(server: &mut mockito::Server, path: &str, body: &str) -> mockito::Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await
}

fn extractor() -> RecipeExtractor {
    RecipeExtractor::builder().build().unwrap()
}

#[tokio::test]
async fn test_extracts_json_ld_recipe() {
    let mut server = mockito::Server::new_async().await;
    let mock = serve(&mut server, "/ham", JSON_LD_PAGE).await;
    let url = format!("{}/ham", server.url());

    let recipe = extractor().extract_recipe(&url).await.unwrap();
    mock.assert_async().await;

    assert_eq!(recipe.title, "Honey Glazed Ham");
    assert_eq!(recipe.author.as_deref(), Some("Sam Baker"));
    assert_eq!(recipe.image.as_deref(), Some("https://example.com/ham.jpg"));
    assert_eq!(recipe.servings.as_deref(), Some("8 servings"));
    assert_eq!(recipe.source_url, url);
    assert_eq!(recipe.source_name.as_deref(), Some("Weeknight Kitchen"));
    assert!(!recipe.is_favorite);
    assert!(recipe.id.is_none());

    let times = recipe.times.as_ref().unwrap();
    assert_eq!(times.prep_seconds, Some(900));
    assert_eq!(times.cook_seconds, Some(5400));
    assert_eq!(times.total_seconds, Some(6300));

    assert_eq!(recipe.ingredients.len(), 4);
    assert_eq!(recipe.ingredients[1].quantity.as_deref(), Some("1/2"));
    assert_eq!(recipe.ingredients[1].unit.as_deref(), Some("cup"));

    let texts: Vec<&str> = recipe.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Heat the oven to 325F.",
            "Bake the ham for 1 hour and 15 minutes.",
            "**For the glaze:**",
            "Whisk honey, mustard and cloves.",
            "Brush over the ham and bake 10-12 minutes more.",
        ]
    );
    assert!(recipe.steps[2].is_header);
    assert_eq!(recipe.steps[1].durations.len(), 1);
    assert_eq!(recipe.steps[1].durations[0].seconds, 4500);
    assert_eq!(recipe.steps[4].durations[0].seconds, 720);
}

#[tokio::test]
async fn test_structured_data_preferred_over_plugin() {
    let mut server = mockito::Server::new_async().await;
    let page = JSON_LD_PAGE.replace(
        "<body><h1>Honey Glazed Ham</h1></body>",
        &format!("<body>{}</body>", wprm_card("Plugin Risotto")),
    );
    let _mock = serve(&mut server, "/both", &page).await;

    let recipe = extractor()
        .extract_recipe(&format!("{}/both", server.url()))
        .await
        .unwrap();
    assert_eq!(recipe.title, "Honey Glazed Ham");
}

#[tokio::test]
async fn test_insufficient_structured_data_falls_through_to_plugin() {
    let mut server = mockito::Server::new_async().await;
    let page = format!(
        r#"
        <html><head>
        <script type="application/ld+json">
        {{"@type": "Recipe", "name": "Teaser", "recipeIngredient": ["rice", "onion"],
          "recipeInstructions": "Cook it."}}
        </script>
        </head><body>{}</body></html>
        "#,
        wprm_card("Weeknight Risotto")
    );
    let _mock = serve(&mut server, "/risotto", &page).await;

    let recipe = extractor()
        .extract_recipe(&format!("{}/risotto", server.url()))
        .await
        .unwrap();
    assert_eq!(recipe.title, "Weeknight Risotto");
    assert_eq!(recipe.source_name.as_deref(), Some("WP Recipe Maker"));
    assert_eq!(recipe.instruction_steps().count(), 3);
}

#[tokio::test]
async fn test_page_without_recipe_is_unsupported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve(
        &mut server,
        "/about",
        "<html><head><title>About us</title></head><body><p>We love food.</p></body></html>",
    )
    .await;

    let err = extractor()
        .extract_recipe(&format!("{}/about", server.url()))
        .await
        .unwrap_err();
    assert!(!err.is_transport());
    match err {
        ExtractionError::Unsupported { attempted } => {
            assert_eq!(attempted, vec!["structured_data", "plugin", "generic"]);
        }
        other => panic!("expected Unsupported, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_is_transport_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let err = extractor()
        .extract_recipe(&format!("{}/missing", server.url()))
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, ExtractionError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_failure() {
    let err = extractor()
        .extract_recipe("http://127.0.0.1:1/recipe")
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, ExtractionError::FetchError(_)));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept and never answer
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let extractor = RecipeExtractor::builder()
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let started = Instant::now();
    let err = extractor
        .extract_recipe(&format!("http://{addr}/recipe"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::FetchError(_)));
    assert!(err.is_transport());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_custom_gate_and_strategy_order() {
    let mut server = mockito::Server::new_async().await;
    let page = r#"
        <html><body>
            <h1>Toast</h1>
            <h2>Ingredients</h2>
            <ul><li>1 slice bread</li></ul>
            <h2>Instructions</h2>
            <ol><li>Toast the bread 3 minutes.</li></ol>
        </body></html>
    "#;
    let _mock = serve(&mut server, "/toast", page).await;
    let url = format!("{}/toast", server.url());

    assert!(extractor().extract_recipe(&url).await.is_err());

    let relaxed = RecipeExtractor::builder()
        .strategies(vec![StrategyKind::Generic])
        .minimums(1, 1)
        .build()
        .unwrap();
    let recipe = relaxed.extract_recipe(&url).await.unwrap();
    assert_eq!(recipe.title, "Toast");
    assert_eq!(recipe.source_name.as_deref(), Some("127.0.0.1"));
    assert_eq!(recipe.steps[0].durations[0].seconds, 180);
}

#[test]
fn test_builder_rejects_empty_strategy_list() {
    let result = RecipeExtractor::builder().strategies(Vec::new()).build();
    assert!(matches!(result, Err(ExtractionError::BuilderError(_))));
}
