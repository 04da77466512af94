// crates/nyla-core/tests/env_overrides.rs
//
// Environment variables are process-wide, so this lives in its own test
// binary with a single test.
use nyla_core::{LogLevel, load_config};
use std::io::Write;

#[test]
fn environment_overrides_file_values() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[tracker]
site = "file-site"
endpoint = "https://stats.example.com"
log_level = "info"
"#
    )
    .unwrap();

    // SAFETY: the only test in this binary, so no other thread reads the
    // environment concurrently.
    unsafe {
        std::env::set_var("NYLA_TRACKER__SITE", "env-site");
        std::env::set_var("NYLA_TRACKER__LOG_LEVEL", "debug");
    }
    let loaded = load_config(Some(file.path()));
    unsafe {
        std::env::remove_var("NYLA_TRACKER__SITE");
        std::env::remove_var("NYLA_TRACKER__LOG_LEVEL");
    }

    let settings = loaded.unwrap();
    assert_eq!(settings.tracker.site, "env-site");
    assert_eq!(settings.tracker.log_level, LogLevel::Debug);
    assert_eq!(settings.tracker.endpoint(), "https://stats.example.com");
    assert_eq!(settings.logging.filter, "info");
}
