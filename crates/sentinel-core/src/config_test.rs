use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SENTINEL_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.es_url, "http://localhost:9200");
    assert!(cfg.es_username.is_none());
    assert!(cfg.es_password.is_none());
    assert_eq!(cfg.index, "tweets");
    assert_eq!(cfg.weapons_path.to_str(), Some("./data/weapons.txt"));
    assert!(cfg.sentiment_lexicon_path.is_none());
    assert_eq!(cfg.batch_size, 500);
    assert_eq!(cfg.chunk_size, 500);
    assert_eq!(cfg.scroll_keepalive, "2m");
    assert_eq!(cfg.bulk_timeout_secs, 60);
    assert_eq!(cfg.es_request_timeout_secs, 30);
    assert_eq!(cfg.es_max_retries, 3);
    assert_eq!(cfg.es_retry_backoff_ms, 500);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8001");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.text_column, "text");
    assert_eq!(cfg.flag_column, "Antisemitic");
}

#[test]
fn build_app_config_applies_overrides() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_ENV", "production");
    map.insert("SENTINEL_ES_URL", "https://es.internal:9243");
    map.insert("SENTINEL_INDEX", "posts");
    map.insert("SENTINEL_BATCH_SIZE", "1000");
    map.insert("SENTINEL_CHUNK_SIZE", "250");
    map.insert("SENTINEL_SENTIMENT_LEXICON_PATH", "/opt/vader_lexicon.txt");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.es_url, "https://es.internal:9243");
    assert_eq!(cfg.index, "posts");
    assert_eq!(cfg.batch_size, 1000);
    assert_eq!(cfg.chunk_size, 250);
    assert_eq!(
        cfg.sentiment_lexicon_path.as_deref().and_then(|p| p.to_str()),
        Some("/opt/vader_lexicon.txt")
    );
}

#[test]
fn build_app_config_rejects_zero_batch_size() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_BATCH_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SENTINEL_BATCH_SIZE"),
        "expected InvalidEnvVar(SENTINEL_BATCH_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_chunk_size() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_CHUNK_SIZE", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SENTINEL_CHUNK_SIZE"),
        "expected InvalidEnvVar(SENTINEL_CHUNK_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_http_es_url() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_ES_URL", "localhost:9200");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SENTINEL_ES_URL"),
        "expected InvalidEnvVar(SENTINEL_ES_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SENTINEL_BIND_ADDR"),
        "expected InvalidEnvVar(SENTINEL_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_requires_both_credentials() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_ES_USERNAME", "elastic");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SENTINEL_ES_PASSWORD"),
        "expected MissingEnvVar(SENTINEL_ES_PASSWORD), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_credentials() {
    let mut map = HashMap::new();
    map.insert("SENTINEL_ES_USERNAME", "elastic");
    map.insert("SENTINEL_ES_PASSWORD", "hunter2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
    assert!(!rendered.contains("\"elastic\""), "username leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
