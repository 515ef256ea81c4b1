use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use newsdesk::{
    config::Config,
    http::{router, AppState},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn demo_server() -> TestServer {
    let config = Config {
        revalidate_secret: Some("hook".to_string()),
        demo_mode: true,
        ..Config::default()
    };
    TestServer::new(router(AppState::new(config).unwrap())).unwrap()
}

fn cache_status(response: &axum_test::TestResponse) -> String {
    response.headers()["x-page-cache"]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_root_redirects_to_default_locale() {
    let server = demo_server();
    let response = server.get("/").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()["location"], "/en");
}

#[tokio::test]
async fn test_home_lists_newest_first_and_caches() {
    let server = demo_server();

    let first = server.get("/en").await;
    first.assert_status_ok();
    assert_eq!(cache_status(&first), "MISS");

    let body = first.json::<Value>();
    assert_eq!(body["locale"], "en");
    assert_eq!(body["title"], "latestNews");
    assert_eq!(body["description"], "siteDescription");
    assert!(body["error"].is_null());
    let titles: Vec<&str> = body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|article| article["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Local Library Extends Weekend Hours",
            "City Council Approves New Bike Lane Network",
        ]
    );
    assert_eq!(body["languages"].as_array().unwrap().len(), 3);

    let second = server.get("/en").await;
    assert_eq!(cache_status(&second), "HIT");
    assert_eq!(second.json::<Value>(), body);
}

#[tokio::test]
async fn test_french_home_only_has_french_articles() {
    let server = demo_server();
    let body = server.get("/fr").await.json::<Value>();

    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(
        articles[0]["path"],
        "/fr/actualites/le-conseil-approuve-les-pistes-cyclables"
    );
}

#[tokio::test]
async fn test_article_page_with_translations() {
    let server = demo_server();
    let response = server.get("/es/noticias/consejo-aprueba-carriles-bici").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["locale"], "es");
    assert_eq!(
        body["title"],
        "El Ayuntamiento aprueba una nueva red de carriles bici"
    );
    assert_eq!(body["backHref"], "/es");
    assert_eq!(
        body["translations"],
        json!([
            {"locale": "en", "href": "/en/news/city-council-approves-bike-lanes"},
            {"locale": "fr", "href": "/fr/actualites/le-conseil-approuve-les-pistes-cyclables"},
        ])
    );
}

#[tokio::test]
async fn test_missing_article_is_404() {
    let server = demo_server();
    let response = server.get("/en/news/no-such-story").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("/en/news/no-such-story"));
}

#[tokio::test]
async fn test_revalidation_drops_cached_home() {
    let server = demo_server();

    assert_eq!(cache_status(&server.get("/es").await), "MISS");
    assert_eq!(cache_status(&server.get("/es").await), "HIT");

    server
        .post("/api/revalidate")
        .add_header(
            HeaderName::from_static("x-revalidate-secret"),
            HeaderValue::from_static("hook"),
        )
        .await
        .assert_status_ok();

    assert_eq!(cache_status(&server.get("/es").await), "MISS");
}

#[tokio::test]
async fn test_unconfigured_site_reports_setup() {
    let server = TestServer::new(router(AppState::new(Config::default()).unwrap())).unwrap();

    for path in ["/en", "/fr/actualites/anything"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["setupRequired"], true);
        assert_eq!(
            body["missingVars"],
            json!([
                "DRUPAL_BASE_URL",
                "DRUPAL_CLIENT_ID",
                "DRUPAL_CLIENT_SECRET",
                "DRUPAL_REVALIDATE_SECRET"
            ])
        );
    }
}

#[tokio::test]
async fn test_backend_errors_degrade_without_caching() {
    let mut backend = mockito::Server::new_async().await;
    let _token = backend
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_body(r#"{"access_token": "tok", "expires_in": 3600}"#)
        .create_async()
        .await;
    let graphql = backend
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errors":[{"message":"Cannot query field"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let config = Config {
        base_url: Some(backend.url()),
        client_id: Some("site".to_string()),
        client_secret: Some("shh".to_string()),
        revalidate_secret: Some("hook".to_string()),
        ..Config::default()
    };
    let server = TestServer::new(router(AppState::new(config).unwrap())).unwrap();

    for _ in 0..2 {
        let response = server.get("/en").await;
        response.assert_status_ok();
        assert_eq!(cache_status(&response), "MISS");

        let body = response.json::<Value>();
        assert_eq!(body["articles"], json!([]));
        assert_eq!(body["error"], "Cannot query field");
    }

    graphql.assert_async().await;
}

#[tokio::test]
async fn test_health() {
    let server = demo_server();
    let body = server.get("/health").await.json::<Value>();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["demoMode"], true);
    assert_eq!(body["configured"], false);
}
