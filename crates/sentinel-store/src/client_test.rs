use super::*;

fn test_client(base_url: &str) -> EsClient {
    EsClient::new(base_url, "tweets", ClientOptions::default())
        .expect("client construction should not fail")
}

#[test]
fn url_appends_index_endpoint() {
    let client = test_client("http://localhost:9200");
    let url = client.url(&client.index_path("_search"), &[]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:9200/tweets/_search");
}

#[test]
fn url_keeps_base_path_prefix() {
    let client = test_client("https://proxy.example.com/es/");
    let url = client.url("_bulk", &[]).unwrap();
    assert_eq!(url.as_str(), "https://proxy.example.com/es/_bulk");
}

#[test]
fn url_encodes_query_params() {
    let client = test_client("http://localhost:9200");
    let url = client
        .url(
            &client.index_path("_delete_by_query"),
            &[("refresh", "true"), ("conflicts", "proceed")],
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:9200/tweets/_delete_by_query?refresh=true&conflicts=proceed"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = EsClient::new("not a url", "tweets", ClientOptions::default()).unwrap_err();
    assert!(matches!(err, StoreError::InvalidUrl { .. }));
}

#[test]
fn record_mapping_uses_keyword_for_exact_fields() {
    let mapping = EsClient::record_mapping();
    let props = &mapping["mappings"]["properties"];
    assert_eq!(props["sentiment_label"]["type"], "keyword");
    assert_eq!(props["weapons_found"]["type"], "keyword");
    assert_eq!(props["antisemitic_flag"]["type"], "integer");
    assert_eq!(props["text"]["type"], "text");
}

#[test]
fn api_error_truncates_long_bodies() {
    let long = "x".repeat(MAX_ERROR_BODY * 2);
    let err = api_error(StatusCode::BAD_REQUEST, &long);
    match err {
        StoreError::Api { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body.len(), MAX_ERROR_BODY);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn debug_output_hides_credentials() {
    let options = ClientOptions {
        username: Some("elastic".to_string()),
        password: Some("hunter2".to_string()),
        ..ClientOptions::default()
    };
    let client = EsClient::new("http://localhost:9200", "tweets", options).unwrap();
    let rendered = format!("{client:?}");
    assert!(!rendered.contains("hunter2"));
}
