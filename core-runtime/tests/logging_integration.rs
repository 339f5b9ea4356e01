//! Integration tests for the logging configuration.
//!
//! The global subscriber can only be installed once per process, so these
//! tests exercise the builder and filter resolution rather than `init_logging`
//! output.

use core_runtime::logging::{LogFormat, LoggingConfig};
use core_runtime::RuntimeError;

#[test]
fn config_chaining_sets_every_field() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_filter("core_session=debug,provider_localfs=trace");

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(
        config.filter,
        Some("core_session=debug,provider_localfs=trace".to_string())
    );
    assert!(config.display_target);
}

#[test]
fn format_defaults_follow_the_build_profile() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn explicit_filter_resolves_to_its_directives() {
    let config = LoggingConfig::default().with_filter("core_session=trace");
    let filter = config.build_filter().unwrap();
    assert!(filter.to_string().contains("core_session=trace"));
}

#[test]
fn malformed_filter_directives_are_rejected() {
    let config = LoggingConfig::default().with_filter("== not valid ==");
    assert!(matches!(
        config.build_filter(),
        Err(RuntimeError::InvalidFilter(_))
    ));
}
