//! Integration tests for platform configuration loading and validation.

use std::time::Duration;

use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use rstest::*;
use tempfile::TempDir;

use semut_sdk::test_support::EnvGuard;
use semut_sdk::{ConfigError, Dispatcher, PlatformConfig, RetryPolicy};

const CONFIG_VARS: &[&str] = &[
    "SEMUT_PLATFORM_URL",
    "SEMUT_API_VERSION",
    "SEMUT_MAX_RETRIES",
    "SEMUT_RETRY_INITIAL_BACKOFF_MS",
    "SEMUT_RETRY_MAX_BACKOFF_MS",
    "SEMUT_RETRY_JITTER",
    "SEMUT_REQUEST_TIMEOUT_SECS",
    "SEMUT_CALL_DEADLINE_SECS",
];

#[fixture]
fn valid_config() -> PlatformConfig {
    PlatformConfig::new("http://platform.internal:53377")
}

#[rstest]
fn validation_rejects_missing_url_with_actionable_error(valid_config: PlatformConfig) {
    let cfg = PlatformConfig {
        platform_url: String::new(),
        ..valid_config
    };

    let error = cfg.validate().expect_err("url is required");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error");
    };
    assert!(
        message.contains("SEMUT_PLATFORM_URL"),
        "error should mention env var: {message}"
    );
    assert!(
        message.contains("semut.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains("platform_url"),
        "error should mention TOML key: {message}"
    );
}

#[rstest]
#[case::scheme(
    PlatformConfig { platform_url: String::from("platform.internal"), ..valid_config() },
    "SEMUT_PLATFORM_URL",
    "platform_url"
)]
#[case::version(
    PlatformConfig { api_version: String::from("v9"), ..valid_config() },
    "SEMUT_API_VERSION",
    "api_version"
)]
#[case::timeout(
    PlatformConfig { request_timeout_secs: 0, ..valid_config() },
    "SEMUT_REQUEST_TIMEOUT_SECS",
    "request_timeout_secs"
)]
#[case::deadline(
    PlatformConfig { call_deadline_secs: Some(0), ..valid_config() },
    "SEMUT_CALL_DEADLINE_SECS",
    "call_deadline_secs"
)]
fn validation_produces_actionable_errors(
    #[case] cfg: PlatformConfig,
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    let error = cfg.validate().expect_err("invalid value");
    let ConfigError::Invalid { field, ref message } = error else {
        panic!("expected Invalid error for {toml_key}");
    };
    assert_eq!(field, toml_key);
    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[rstest]
fn retry_settings_flow_into_the_dispatcher(valid_config: PlatformConfig) {
    let cfg = PlatformConfig {
        max_retries: 2,
        retry_jitter: false,
        call_deadline_secs: Some(10),
        ..valid_config
    };

    let dispatcher =
        Dispatcher::from_config(&cfg).unwrap_or_else(|err| panic!("valid config: {err}"));

    assert_eq!(dispatcher.base_url(), "http://platform.internal:53377");
    assert_eq!(dispatcher.retry_policy().max_retries, 2);
    assert_eq!(dispatcher.retry_policy().max_attempts(), 3);
    assert!(!dispatcher.retry_policy().jitter);
    assert_eq!(cfg.call_deadline(), Some(Duration::from_secs(10)));
}

#[rstest]
fn invalid_config_is_rejected_by_the_dispatcher(valid_config: PlatformConfig) {
    let cfg = PlatformConfig {
        api_version: String::from("v0"),
        ..valid_config
    };

    let err = Dispatcher::from_config(&cfg).expect_err("unsupported version");
    assert!(matches!(err, ConfigError::Invalid { field: "api_version", .. }));
}

#[tokio::test]
async fn load_reads_environment_overrides() {
    let _guard = EnvGuard::set_vars(&[
        ("SEMUT_PLATFORM_URL", "http://10.0.0.5:53377"),
        ("SEMUT_MAX_RETRIES", "1"),
    ])
    .await;

    let cfg = PlatformConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("load should succeed: {err}"));

    assert_eq!(cfg.platform_url, "http://10.0.0.5:53377");
    assert_eq!(cfg.max_retries, 1);
    assert_eq!(cfg.api_version, "v1");
}

#[tokio::test]
async fn load_falls_back_to_defaults() {
    let _guard = EnvGuard::unset_vars(CONFIG_VARS).await;

    let cfg = PlatformConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("load should succeed: {err}"));

    assert_eq!(cfg.retry_policy(), RetryPolicy::default());
    assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.call_deadline(), None);
}

#[tokio::test]
async fn load_reads_top_level_keys_from_config_file() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let tmp_root =
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap_or_else(|non_utf8_path| {
            panic!("temp dir should be utf8: {}", non_utf8_path.display())
        });
    Dir::open_ambient_dir(&tmp_root, ambient_authority())
        .unwrap_or_else(|err| panic!("open temp dir: {err}"))
        .write(
            "semut.toml",
            "platform_url = \"http://10.1.2.3:53377\"\nmax_retries = 2\n",
        )
        .unwrap_or_else(|err| panic!("write file: {err}"));
    let config_path = tmp_root.join("semut.toml");
    let _guard =
        EnvGuard::set_vars_clearing(&[("SEMUT_CONFIG_PATH", config_path.as_str())], CONFIG_VARS)
            .await;

    let cfg = PlatformConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("load should succeed: {err}"));

    assert_eq!(cfg.platform_url, "http://10.1.2.3:53377");
    assert_eq!(cfg.max_retries, 2);
    cfg.validate()
        .unwrap_or_else(|err| panic!("file-provided config should validate: {err}"));
}

#[rstest]
fn missing_url_hint_names_the_top_level_key(valid_config: PlatformConfig) {
    let cfg = PlatformConfig {
        platform_url: String::new(),
        ..valid_config
    };

    let error = cfg.validate().expect_err("url is required");
    let message = error.to_string();
    assert!(
        message.contains("add platform_url to semut.toml"),
        "hint should point at a top-level key: {message}"
    );
    assert!(
        !message.contains('['),
        "hint should not name a TOML section: {message}"
    );
}
