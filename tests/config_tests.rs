use std::collections::HashMap;

use slack_digest::core::config::{AppConfig, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, FileConfig};
use slack_digest::core::models::TargetKind;
use slack_digest::errors::ErrorKind;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn reads_toml_file_and_applies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
slack_token = "xoxp-file"
openai_api_key = "sk-file"
prompt = "Keep it short."
thread_prompt = "Decisions only."
"#,
    )
    .unwrap();

    let file = FileConfig::read(&path).unwrap();
    let config = AppConfig::from_sources(file, env(&[])).unwrap();

    assert_eq!(config.slack_token, "xoxp-file");
    assert_eq!(config.openai_api_key, "sk-file");
    assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
    assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(config.prompts.for_kind(TargetKind::Thread), Some("Decisions only."));
    assert_eq!(config.prompts.for_kind(TargetKind::Channel), Some("Keep it short."));
}

#[test]
fn environment_overrides_file() {
    let file = FileConfig {
        slack_token: Some("xoxp-file".to_string()),
        openai_api_key: Some("sk-file".to_string()),
        openai_model: Some("gpt-4o".to_string()),
        ..FileConfig::default()
    };

    let config = AppConfig::from_sources(
        file,
        env(&[
            ("SLACK_TOKEN", "xoxp-env"),
            ("OPENAI_MODEL", "gpt-4.1-mini"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
        ]),
    )
    .unwrap();

    assert_eq!(config.slack_token, "xoxp-env");
    assert_eq!(config.openai_api_key, "sk-file");
    assert_eq!(config.openai_model, "gpt-4.1-mini");
    assert_eq!(config.openai_base_url, "http://localhost:8080/v1");
}

#[test]
fn bot_token_variable_is_accepted() {
    let config = AppConfig::from_sources(
        FileConfig::default(),
        env(&[("SLACK_BOT_TOKEN", "xoxb-1"), ("OPENAI_API_KEY", "sk-1")]),
    )
    .unwrap();
    assert_eq!(config.slack_token, "xoxb-1");
}

#[test]
fn missing_credentials_are_auth_failures() {
    let err = AppConfig::from_sources(FileConfig::default(), env(&[("OPENAI_API_KEY", "sk")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert!(err.to_string().contains("SLACK_TOKEN"));

    let err = AppConfig::from_sources(FileConfig::default(), env(&[("SLACK_TOKEN", "xoxp")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn blank_prompt_override_is_absent() {
    let file = FileConfig {
        prompt: Some("   ".to_string()),
        ..FileConfig::default()
    };
    let config = AppConfig::from_sources(
        file,
        env(&[("SLACK_TOKEN", "xoxp"), ("OPENAI_API_KEY", "sk")]),
    )
    .unwrap();
    assert_eq!(config.prompts.for_kind(TargetKind::Channel), None);
}

#[test]
fn missing_file_is_empty_config_and_bad_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FileConfig::read(&dir.path().join("absent.toml")).is_ok());

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "slack_token = ").unwrap();
    assert_eq!(FileConfig::read(&bad).unwrap_err().kind(), ErrorKind::Config);
}

#[test]
fn debug_output_redacts_secrets() {
    let config = AppConfig::from_sources(
        FileConfig::default(),
        env(&[("SLACK_TOKEN", "xoxp-secret"), ("OPENAI_API_KEY", "sk-secret")]),
    )
    .unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("xoxp-secret"));
    assert!(!debug.contains("sk-secret"));
}
