use sql_query_agent::config::{Config, ValidatorConfig};

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.llm.api_key.is_none());
    assert!(config.llm.provider.is_none());
    assert!(config.validator.strict);
}

#[test]
fn test_default_retry_config() {
    let config = Config::default();

    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.initial_delay_ms, 1000);
    assert_eq!(config.retry.backoff_factor, 2.0);
}

#[test]
fn test_default_ollama_url() {
    let config = Config::default();

    assert_eq!(
        config.llm.ollama_url.as_deref(),
        Some("http://localhost:11434")
    );
}

#[test]
fn test_validator_config_default_is_strict() {
    let config = ValidatorConfig::default();
    assert!(config.strict);
}

#[test]
fn test_config_from_toml() {
    let config: Config = toml::from_str(
        r#"
        [llm]
        provider = "openai"
        model = "gpt-4"

        [validator]
        strict = false
        "#
    )
    .unwrap();

    assert_eq!(config.llm.provider.as_deref(), Some("openai"));
    assert_eq!(config.llm.model.as_deref(), Some("gpt-4"));
    assert!(!config.validator.strict);
}

#[test]
fn test_config_missing_sections_use_defaults() {
    let config: Config = toml::from_str("[llm]\nmodel = \"llama3.2\"\n").unwrap();

    assert_eq!(config.llm.model.as_deref(), Some("llama3.2"));
    assert!(config.validator.strict);
    assert_eq!(config.retry.max_retries, 3);
}

#[test]
fn test_validator_section_strict_defaults_true_when_omitted() {
    let config: Config = toml::from_str("[validator]\n").unwrap();
    assert!(config.validator.strict);
}
