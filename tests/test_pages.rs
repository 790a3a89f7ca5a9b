mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn graph_api_returns_widget_payload() {
    let env = common::TestEnv::start();
    let server = env.server();
    common::login(&server, "demo").await;

    let a = common::create_document(&server, "Alpha", "", "PUBLIC").await;
    let b = common::create_document(&server, "Beta", "", "PRIVATE").await;
    common::set_links(&server, &a, &[&b]).await;

    let graph: serde_json::Value = server.get("/api/graph").await.json();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(graph["edges"][0]["id"].as_str(), Some(format!("{a}-{b}").as_str()));
    assert_eq!(graph["edges"][0]["from"].as_str(), Some(a.as_str()));
    assert_eq!(graph["options"]["nodes"]["shape"].as_str(), Some("dot"));
    assert_eq!(graph["options"]["nodes"]["size"].as_u64(), Some(10));

    let anonymous = env.server();
    let public_graph: serde_json::Value = anonymous.get("/api/graph").await.json();
    assert_eq!(public_graph["nodes"].as_array().unwrap().len(), 1);
    assert_eq!(public_graph["nodes"][0]["label"].as_str(), Some("Alpha"));
    assert!(public_graph["edges"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn graph_page_is_served() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"id="graph""#));
    assert!(html.contains("/public/js/graph.js"));
    assert!(html.contains("data-demo-login"));
}

#[tokio::test]
async fn demo_sign_in_hidden_without_demo_mode_and_after_login() {
    let env = common::TestEnv::with_demo_mode(false);
    let html = env.server().get("/").await.text();
    assert!(!html.contains("data-demo-login"));

    let env = common::TestEnv::start();
    let server = env.server();
    common::login(&server, "alice").await;
    let html = server.get("/").await.text();
    assert!(!html.contains("data-demo-login"));
    assert!(html.contains("Sign out"));
}

#[tokio::test]
async fn document_page_renders_markdown() {
    let env = common::TestEnv::start();
    let server = env.server();
    common::login(&server, "alice").await;

    let target = common::create_document(&server, "Target", "", "PUBLIC").await;
    let id = common::create_document(
        &server,
        "Readme",
        &format!("## Section\n\nGo to [target](/documents/{target})."),
        "PUBLIC",
    )
    .await;
    server
        .put(&format!("/api/documents/{id}"))
        .json(&serde_json::json!({}))
        .await;

    let anonymous = env.server();
    let html = anonymous.get(&format!("/documents/{id}")).await.text();
    assert!(html.contains("<h2>Section</h2>"));
    assert!(html.contains("Readme"));
    assert!(html.contains("by Alice"));
    assert!(html.contains(&format!(r#"<li><a href="/documents/{target}">Target</a></li>"#)));
}

#[tokio::test]
async fn private_document_page_is_not_found_for_others() {
    let env = common::TestEnv::start();
    let owner = env.server();
    common::login(&owner, "alice").await;
    let id = common::create_document(&owner, "Diary", "secret", "PRIVATE").await;

    let anonymous = env.server_permissive();
    let response = anonymous.get(&format!("/documents/{id}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let html = response.text();
    assert!(html.contains("Document not found"));
    assert!(!html.contains("Diary"));

    owner.get(&format!("/documents/{id}")).await.assert_status_ok();
}

#[tokio::test]
async fn static_assets_are_served() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server.get("/public/js/graph.js").await;
    response.assert_status_ok();
    assert!(response.text().contains("vis.Network"));
}
