//! Tests for configuration module.

use super::*;

#[test_log::test]
fn defaults_apply_to_empty_document() {
    let settings = Settings::from_toml("").unwrap();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8699);
    assert_eq!(settings.storage.data_dir, PathBuf::from("./data"));
    assert_eq!(settings.storage.key, DEFAULT_STORAGE_KEY);
    assert_eq!(settings.import.dedup, ImportDedup::None);
    assert_eq!(settings.import.horizon_weeks, DEFAULT_HORIZON_WEEKS);
    assert_eq!(settings.import.max_instances, DEFAULT_MAX_INSTANCES);
    assert_eq!(
        settings.import.max_document_bytes,
        usize::try_from(DEFAULT_MAX_DOCUMENT_BYTES).unwrap()
    );
    assert_eq!(settings.logging.level, "info");
}

#[test_log::test]
fn toml_overrides_defaults() {
    tracing::debug!("Loading settings from inline TOML");

    let settings = Settings::from_toml(
        r#"
        [server]
        port = 9000

        [import]
        dedup = "source_uid_and_date"
        horizon_weeks = 4
        max_document_bytes = 1024
        "#,
    )
    .unwrap();

    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.import.dedup, ImportDedup::SourceUidAndDate);
    assert_eq!(settings.import.horizon_weeks, 4);
    assert_eq!(settings.import.max_document_bytes, 1024);
    assert_eq!(settings.import.max_instances, DEFAULT_MAX_INSTANCES);
}

#[test]
fn unknown_dedup_mode_is_rejected() {
    let result = Settings::from_toml(
        r#"
        [import]
        dedup = "by_title"
        "#,
    );

    assert!(result.is_err());
}

#[test]
fn bind_address_joins_host_and_port() {
    let server = ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 8080,
    };

    assert_eq!(server.bind_address(), "0.0.0.0:8080");
}
