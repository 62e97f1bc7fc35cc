#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use base64::{Engine, engine::general_purpose::STANDARD};
    use http_body_util::BodyExt;
    use notes_api::config::Settings;
    use results_viewer::source::ResultSource;
    use serde_json::{Value, json};
    use tempfile::tempdir;
    use tower::ServiceExt;

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let auth = format!("Basic {}", STANDARD.encode("admin:password"));
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, auth);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn note_lifecycle() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap().to_string();
        let settings = Settings::from_lookup(|key| (key == "STORE_URL").then(|| root.clone())).unwrap();
        let api = notes_api::build_router(notes_api::AppState::connect(&settings).await.unwrap());

        let (status, body) = call(&api, Method::POST, "/notes", Some(json!({"title": "A"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let note: Value = serde_json::from_str(&body).unwrap();
        let uri = format!("/notes/{}", note["id"].as_str().unwrap());

        let (status, body) = call(&api, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), note);

        let (status, _) = call(&api, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&api, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submitted_result_shows_up_in_viewer() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap().to_string();
        let settings = Settings::from_lookup(|key| (key == "STORE_URL").then(|| root.clone())).unwrap();
        let state = notes_api::AppState::connect(&settings).await.unwrap();
        let viewer = results_viewer::build_router(results_viewer::AppState {
            source: ResultSource::Store(state.results.clone()),
        });
        let api = notes_api::build_router(state);

        let payload = json!({"metrics": {"http_reqs": {"values": {"count": 100}}}});
        let (status, body) = call(&api, Method::POST, "/test-results", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Value = serde_json::from_str(&body).unwrap();

        let (status, body) = call(&api, Method::GET, "/test-results", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(listed[0]["id"], created["id"]);

        let (status, html) = call(&viewer, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Total Requests: 100"));
        assert!(html.contains(created["test_id"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn viewer_reads_the_collection_the_api_writes() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();
        let store = docstore::DocumentStore::connect(root, "notes_db").await.unwrap();

        let settings = results_viewer::config::Settings::from_lookup(|key| match key {
            "STORE_URL" => Some(root.to_string()),
            _ => None,
        })
        .unwrap();
        let viewer = results_viewer::build_router(
            results_viewer::AppState::from_settings(&settings).await.unwrap(),
        );

        let id = store
            .collection("results")
            .unwrap()
            .insert_one(&json!({"test_id": "direct", "summary": {"error_rate": 2.5}}))
            .await
            .unwrap();

        let (status, html) = call(&viewer, Method::GET, &format!("/view/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("direct"));

        let (_, html) = call(&viewer, Method::GET, "/", None).await;
        assert!(html.contains("Error Rate: 2.50%"));
    }
}
