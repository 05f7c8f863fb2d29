//! Config file → resolved settings → live run, mirroring what `main` does.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use incinerator_client::ApiClient;
use incinerator_config::{ConfigError, IncineratorConfig, Overrides, RunSettings};
use incinerator_engine::{Coordinator, CoordinatorOptions};
use serde_json::json;

use crate::common::{
    INCINERATE_PATH, STORAGE_PATH, TOKEN, incinerated_ids, mount_collection, mount_incinerate_ok,
    start_storage_mock,
};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[tokio::test]
async fn run_driven_by_config_file() {
    let server = start_storage_mock().await;
    mount_collection(
        &server,
        json!([
            {"thing": {"key": "K1", "wear": 0}},
            {"thing": {"key": "K2", "wear": 2}},
        ]),
    )
    .await;
    mount_incinerate_ok(&server, 1, Duration::ZERO).await;

    let file = write_config(&format!(
        r#"
[api]
fetch_url = "{uri}{STORAGE_PATH}?search="
dispatch_url = "{uri}{INCINERATE_PATH}"
bearer_token = "{TOKEN}"

[dispatch]
max_concurrency = 2

[http]
allow_insecure_http = true

[matching]
id_field = "thing.key"
degradation_field = "thing.wear"
"#,
        uri = server.uri()
    ));

    let config = IncineratorConfig::load(Some(file.path())).unwrap();
    let settings = RunSettings::resolve(config.as_ref(), Overrides::default()).unwrap();
    assert_eq!(settings.max_concurrency, 2);

    let client = ApiClient::from_settings(
        &settings.http,
        settings.endpoints.clone(),
        settings.token.clone(),
    )
    .unwrap();
    let summary = Coordinator::new(Arc::new(client), CoordinatorOptions::from(&settings))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.attempted, 1);
    assert!(summary.is_clean());
    assert_eq!(incinerated_ids(&server).await, vec!["K1"]);
}

#[tokio::test]
async fn plain_http_is_refused_without_opt_in() {
    let server = start_storage_mock().await;
    mount_incinerate_ok(&server, 0, Duration::ZERO).await;

    let overrides = Overrides {
        bearer_token: Some(TOKEN.to_string()),
        fetch_url: Some(format!("{}{STORAGE_PATH}", server.uri())),
        dispatch_url: Some(format!("{}{INCINERATE_PATH}", server.uri())),
        ..Overrides::default()
    };
    let settings = RunSettings::resolve(None, overrides).unwrap();
    assert!(!settings.http.allow_insecure_http);

    let client = ApiClient::from_settings(
        &settings.http,
        settings.endpoints.clone(),
        settings.token.clone(),
    )
    .unwrap();
    let result = Coordinator::new(Arc::new(client), CoordinatorOptions::from(&settings))
        .run()
        .await;

    assert!(result.is_err());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[test]
fn missing_token_fails_before_any_network_activity() {
    let file = write_config("[dispatch]\nmax_concurrency = 1\n");
    let config = IncineratorConfig::load(Some(file.path())).unwrap();

    let err = RunSettings::resolve(config.as_ref(), Overrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingCredential));
}
