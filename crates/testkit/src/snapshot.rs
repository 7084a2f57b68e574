//! Golden-file JSON snapshots.
//!
//! Values are serialized as pretty JSON with object keys sorted, so field
//! order and map iteration order never cause spurious diffs. Set
//! `TILEMINE_UPDATE_SNAPSHOTS=1` to rewrite goldens from the current output.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Environment variable that switches snapshot assertions into write mode.
pub const UPDATE_SNAPSHOTS_ENV: &str = "TILEMINE_UPDATE_SNAPSHOTS";

/// Compare `value` against the golden JSON at `path`.
///
/// In update mode the golden is (re)written instead and the call succeeds.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        write_snapshot(path, &actual)?;
        info!(path = %path.display(), "snapshot updated");
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "no golden at {} (set {}=1 to record one)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if expected != actual {
        let line = first_difference(&expected, &actual);
        anyhow::bail!(
            "snapshot {} differs from golden starting at line {} (set {}=1 to accept)\n--- golden\n{}\n+++ actual\n{}",
            path.display(),
            line + 1,
            UPDATE_SNAPSHOTS_ENV,
            expected.lines().nth(line).unwrap_or("<eof>"),
            actual.lines().nth(line).unwrap_or("<eof>"),
        );
    }

    Ok(())
}

/// Canonical pretty JSON used for goldens, newline terminated.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("serializing snapshot value")?;
    let mut text =
        serde_json::to_string_pretty(&sort_keys(value)).context("formatting snapshot JSON")?;
    text.push('\n');
    Ok(text)
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn write_snapshot(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing snapshot {}", path.display()))
}

fn first_difference(expected: &str, actual: &str) -> usize {
    expected
        .lines()
        .zip(actual.lines())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let text = canonical_json(&json!({"b": 1, "a": {"y": true, "x": null}})).unwrap();
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"x\": null,\n    \"y\": true\n  },\n  \"b\": 1\n}\n"
        );
    }

    #[test]
    fn first_difference_reports_line() {
        assert_eq!(first_difference("a\nb\nc", "a\nB\nc"), 1);
        assert_eq!(first_difference("a\nb", "a\nb\nc"), 2);
    }

    #[test]
    fn missing_golden_is_an_error() {
        if should_update_snapshots() {
            return;
        }
        let path = std::env::temp_dir().join("tilemine-no-such-golden/absent.json");
        let err = assert_json_snapshot(&path, &json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains(UPDATE_SNAPSHOTS_ENV));
    }
}
