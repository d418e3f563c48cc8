//! Test harness helpers.

use tracing_subscriber::EnvFilter;

/// Set up test logging with the given filter.
///
/// Output goes through the test writer, so it only shows for failing tests.
/// Safe to call from every test; only the first call installs a subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// Set up test logging with the default filter (warn level).
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}

/// Build a config for a session store under `namespace`.
///
/// # Panics
///
/// Panics if the generated TOML fails to parse.
#[must_use]
pub fn session_config(namespace: &str) -> keyplex::Config {
    let text = format!("namespace = \"{namespace}\"\n[storage]\nkind = \"session\"\n");
    keyplex::Config::from_toml_str(&text).expect("valid session config")
}
