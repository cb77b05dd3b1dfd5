//! Test helpers shared by the dotprompt crates.

use std::sync::Once;

use similar::{ChangeTag, TextDiff};
use tracing_subscriber::EnvFilter;

static SETUP: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Respects `RUST_LOG`; defaults to warnings only so test output stays quiet.
pub fn setup() {
    SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Line diff between two texts, `-` for `expected` and `+` for `actual`.
pub fn diff(expected: &str, actual: &str) -> String {
    let mut out = String::new();
    for change in TextDiff::from_lines(expected, actual).iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Assert two multi-line texts are equal, printing a line diff otherwise.
#[track_caller]
pub fn assert_text_eq(expected: &str, actual: &str) {
    if expected != actual {
        panic!("texts differ:\n{}", diff(expected, actual));
    }
}
