use super::*;

/// Single test for the env round trip so only one test touches the
/// `UPSTREAM_*` variables and parallel test threads cannot race on them.
#[test]
fn from_env_round_trip() {
    unsafe {
        std::env::remove_var("UPSTREAM_URL");
        std::env::remove_var("UPSTREAM_API_KEY_ENV");
        std::env::remove_var("UPSTREAM_TEST_KEY");
        std::env::remove_var("UPSTREAM_TIMEOUT_SECS");
        std::env::remove_var("UPSTREAM_CONNECT_TIMEOUT_SECS");
    }

    // Missing URL.
    let err = UpstreamConfig::from_env().unwrap_err();
    assert!(matches!(err, UpstreamError::Config(_)));

    // URL present, key indirection absent.
    unsafe { std::env::set_var("UPSTREAM_URL", "https://example.test/v1/complete/") };
    let err = UpstreamConfig::from_env().unwrap_err();
    assert!(matches!(err, UpstreamError::MissingApiKey { .. }));

    // Key var named but unset.
    unsafe { std::env::set_var("UPSTREAM_API_KEY_ENV", "UPSTREAM_TEST_KEY") };
    let err = UpstreamConfig::from_env().unwrap_err();
    assert!(matches!(err, UpstreamError::MissingApiKey { var } if var == "UPSTREAM_TEST_KEY"));

    // Fully configured, with overridden timeouts.
    unsafe {
        std::env::set_var("UPSTREAM_TEST_KEY", "secret");
        std::env::set_var("UPSTREAM_TIMEOUT_SECS", "7");
        std::env::set_var("UPSTREAM_CONNECT_TIMEOUT_SECS", "3");
    }
    let cfg = UpstreamConfig::from_env().unwrap();
    assert_eq!(cfg.endpoint, "https://example.test/v1/complete");
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.timeouts, UpstreamTimeouts { request_secs: 7, connect_secs: 3 });

    unsafe {
        std::env::remove_var("UPSTREAM_URL");
        std::env::remove_var("UPSTREAM_API_KEY_ENV");
        std::env::remove_var("UPSTREAM_TEST_KEY");
        std::env::remove_var("UPSTREAM_TIMEOUT_SECS");
        std::env::remove_var("UPSTREAM_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn env_parse_u64_defaults_when_absent() {
    assert_eq!(env_parse_u64("UPSTREAM_CONFIG_TEST_NEVER_SET", 17), 17);
}

#[test]
fn defaults_are_sane() {
    assert!(DEFAULT_UPSTREAM_TIMEOUT_SECS >= DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS);
}
