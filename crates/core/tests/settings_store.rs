use tempfile::tempdir;
use transit_core::settings::{JsonFileStore, read_with};
use transit_core::{ApiProvider, AppError, Config, Settings, SettingsStore};

#[tokio::test]
async fn missing_file_reads_as_defaults() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("settings.json"));

    let settings = store.read().await.unwrap();
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn written_settings_are_read_back() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("settings.json"));

    let mut settings = Settings::with_provider(ApiProvider::OpenAi);
    settings.api_key = "sk-abc".to_string();
    settings.custom_prompt = "Translate into French.".to_string();
    store.write(&settings).await.unwrap();

    assert_eq!(store.read().await.unwrap(), settings);

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"apiProvider\": \"openai\""));
    assert!(raw.contains("\"customPrompt\""));
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::new(path).read().await.unwrap_err();
    assert!(matches!(err, AppError::Json(_)));
}

#[tokio::test]
async fn overrides_apply_on_top_of_stored_record() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("settings.json"));
    let mut stored = Settings::default();
    stored.api_key = "stored-key".to_string();
    store.write(&stored).await.unwrap();

    let config = Config::builder().with_provider(ApiProvider::OpenAi).build();
    let mut effective = None;
    read_with(&store, |result| effective = result.ok().map(|s| config.apply(s))).await;

    let effective = effective.unwrap();
    assert_eq!(effective.api_provider, ApiProvider::OpenAi);
    assert_eq!(effective.api_endpoint, ApiProvider::OpenAi.default_endpoint());
    assert_eq!(effective.api_key, "stored-key");
}
