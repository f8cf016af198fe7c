//! Configuration and recipe catalog loading tests

use std::io::Write;
use std::time::Duration;

use airy_voice::{Assistant, Config, Error, RecipeCatalog};

fn write_file(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_file(
        r#"
        [voice]
        locale = "ja-JP"
        debounce_ms = 500
        speak_delay_ms = 50

        [wake]
        words = ["ねえシェフ"]
        ambiguous = []
        marker = "Chef"

        [timer]
        alert_repeat = 3

        [llm]
        endpoint = "https://example.com/askAI"
        timeout_secs = 10
        "#,
        ".toml",
    );

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.voice.debounce, Duration::from_millis(500));
    assert_eq!(config.voice.speak_delay, Duration::from_millis(50));
    assert_eq!(config.voice.error_retry, Duration::from_millis(1000));
    assert_eq!(config.wake.words, vec!["ねえシェフ".to_string()]);
    assert!(config.wake.ambiguous.is_empty());
    assert_eq!(config.wake.marker, "Chef");
    assert_eq!(config.timer.alert_repeat, 3);
    assert_eq!(config.llm.timeout, Duration::from_secs(10));

    // The assistant accepts the custom wake word list
    assert!(Assistant::new(&config).is_ok());
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = write_file("[voice\ndebounce_ms = ", ".toml");
    assert!(matches!(Config::load_from(file.path()), Err(Error::Toml(_))));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_invalid_values_rejected() {
    let file = write_file("[timer]\nalert_repeat = 0\n", ".toml");
    assert!(matches!(Config::load_from(file.path()), Err(Error::Config(_))));
}

#[test]
fn test_recipe_catalog_from_export() {
    let file = write_file(
        r#"[
            {
                "id": "tamagoyaki",
                "title": "卵焼き",
                "prepTime": "5分",
                "cookTime": "10分",
                "servings": 2,
                "ingredients": [{"name": "卵", "amount": "3個"}],
                "steps": [
                    {"id": "s1", "description": "卵を溶く"},
                    {"id": "s2", "description": "3分焼く"}
                ]
            },
            {"id": "miso", "title": "味噌汁"}
        ]"#,
        ".json",
    );

    let catalog = RecipeCatalog::load(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);

    let recipe = catalog.get("tamagoyaki").unwrap();
    assert_eq!(recipe.cook_time, "10分");
    assert_eq!(recipe.steps[1].description, "3分焼く");
    assert!(catalog.get("miso").unwrap().steps.is_empty());
    assert!(catalog.get("curry").is_none());
}

#[test]
fn test_duplicate_recipe_ids_rejected() {
    let result = RecipeCatalog::from_json(r#"[{"id": "a"}, {"id": "a"}]"#);
    assert!(matches!(result, Err(Error::Recipe(_))));
}
