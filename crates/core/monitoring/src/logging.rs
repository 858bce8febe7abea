//! A set of utilities to enable logging configuration using tracing_subscriber.

use std::{io::IsTerminal, sync::Once};

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

static CATALOG_LOG_ENV_VAR: &str = "CATALOG_LOG";

/// Initializes a tracing subscriber for logging.
///
/// Workspace crates log at the level named by `CATALOG_LOG` (default `info`), everything else at
/// `error`. Directives in `RUST_LOG` take precedence for the crates they name.
pub fn init() {
    init_with_default_level(None);
}

/// Like [`init`], with `default_level` for the workspace crates when `CATALOG_LOG` is unset.
///
/// Only the first call in a process installs a subscriber.
pub fn init_with_default_level(default_level: Option<&str>) {
    // Tests call this from every fixture
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let log_level = catalog_log_level(std::env::var(CATALOG_LOG_ENV_VAR).ok(), default_level);
        let env_filter = env_filter(&log_level);

        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init();
        if let Err(err) = installed {
            tracing::debug!(%err, "keeping the tracing subscriber installed elsewhere");
            return;
        }

        tracing::info!("log level: {}", log_level);
    });
}

/// List of crates in the workspace.
const CATALOG_CRATES: &[&str] = &[
    "bundle_identity",
    "catalog_config",
    "monitoring",
    "object_number",
    "partition_store",
];

/// `CATALOG_LOG` wins over the configured level; `info` applies when neither is set.
fn catalog_log_level(env_level: Option<String>, default_level: Option<&str>) -> String {
    env_level
        .filter(|level| !level.is_empty())
        .or_else(|| default_level.map(ToString::to_string))
        .unwrap_or_else(|| "info".to_string())
}

fn env_filter(log_level: &str) -> EnvFilter {
    let directive_string = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(&directive_string);

    for crate_name in CATALOG_CRATES {
        if directive_string.contains(&format!("{crate_name}=")) {
            continue;
        }
        match format!("{crate_name}={log_level}").parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(err) => eprintln!("ignoring invalid log level {log_level:?}: {err}"),
        }
    }

    env_filter
}

#[test]
fn catalog_log_level_prefers_env_then_configured_level() {
    assert_eq!(catalog_log_level(Some("trace".into()), Some("debug")), "trace");
    assert_eq!(catalog_log_level(None, Some("debug")), "debug");
    assert_eq!(catalog_log_level(Some(String::new()), Some("warn")), "warn");
    assert_eq!(catalog_log_level(None, None), "info");
}

/// If this fails, just update the above `CATALOG_CRATES` to match reality.
#[test]
fn assert_catalog_crates() {
    use cargo_metadata::MetadataCommand;

    let cmd = MetadataCommand::new().exec().unwrap();
    let mut names: Vec<String> = cmd
        .workspace_packages()
        .into_iter()
        .map(|pkg| pkg.name.replace("-", "_"))
        .collect();
    names.sort();
    assert_eq!(names, CATALOG_CRATES);
}
