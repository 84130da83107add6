use crate::helpers::TestApp;

#[tokio::test]
async fn openapi_document_describes_every_route() {
    let test_app = TestApp::spawn_app().await;
    let url = format!("{}/api-docs/openapi.json", test_app.address);
    let response = test_app
        .api_client
        .get(url)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let document: serde_json::Value = response.json().await.expect("Document is not JSON.");

    assert!(document["openapi"].as_str().unwrap().starts_with("3."));
    for (path, method) in [
        ("/subscriptions", "post"),
        ("/subscriptions", "get"),
        ("/subscriptions/total", "get"),
        ("/subscriptions/{id}", "get"),
        ("/subscriptions/{id}", "put"),
        ("/subscriptions/{id}", "delete"),
    ] {
        assert!(
            document["paths"][path][method].is_object(),
            "{} {} is not documented",
            method,
            path
        );
    }
    assert!(document["components"]["schemas"]["Subscription"].is_object());
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let test_app = TestApp::spawn_app().await;
    let url = format!("{}/swagger-ui/", test_app.address);
    let response = test_app
        .api_client
        .get(url)
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert!(response.text().await.unwrap().contains("swagger"));
}
