//! config::envfile
//!
//! `.env` file reading and writing.
//!
//! Checks read `.env` files to verify required variables; the setup
//! command writes them. Parsing is tolerant: blank lines and `#` comments
//! are skipped, values may be quoted, and a malformed line is ignored
//! rather than failing the whole file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Parse a `.env` file into a sorted key/value map.
///
/// Returns an empty map if the file does not exist.
pub fn read_env(path: &Path) -> io::Result<BTreeMap<String, String>> {
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(parse_env(&raw))
}

/// Parse `.env` contents.
pub fn parse_env(raw: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}

/// Write a `.env` file from a sorted key/value map.
///
/// The map's ordering makes the output deterministic, so re-running
/// setup with unchanged answers rewrites an identical file.
pub fn write_env(path: &Path, vars: &BTreeMap<String, String>) -> io::Result<()> {
    let mut out = String::new();
    for (key, value) in vars {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    fs::write(path, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod parse {
        use super::*;

        #[test]
        fn basic_pairs() {
            let vars = parse_env("A=1\nB=two\n");
            assert_eq!(vars.get("A").map(String::as_str), Some("1"));
            assert_eq!(vars.get("B").map(String::as_str), Some("two"));
        }

        #[test]
        fn skips_comments_and_blanks() {
            let vars = parse_env("# comment\n\nA=1\n");
            assert_eq!(vars.len(), 1);
        }

        #[test]
        fn strips_quotes() {
            let vars = parse_env("A=\"quoted\"\nB='single'\n");
            assert_eq!(vars.get("A").map(String::as_str), Some("quoted"));
            assert_eq!(vars.get("B").map(String::as_str), Some("single"));
        }

        #[test]
        fn ignores_malformed_lines() {
            let vars = parse_env("no equals sign\nA=1\n=novalue\n");
            assert_eq!(vars.len(), 1);
        }

        #[test]
        fn value_may_contain_equals() {
            let vars = parse_env("URL=postgres://u:p@host?a=b\n");
            assert_eq!(
                vars.get("URL").map(String::as_str),
                Some("postgres://u:p@host?a=b")
            );
        }
    }

    mod files {
        use super::*;

        #[test]
        fn missing_file_is_empty() {
            let dir = TempDir::new().unwrap();
            let vars = read_env(&dir.path().join(".env")).unwrap();
            assert!(vars.is_empty());
        }

        #[test]
        fn write_then_read_roundtrip() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join(".env");

            let mut vars = BTreeMap::new();
            vars.insert("B".to_string(), "2".to_string());
            vars.insert("A".to_string(), "1".to_string());
            write_env(&path, &vars).unwrap();

            assert_eq!(read_env(&path).unwrap(), vars);
        }

        #[test]
        fn write_is_deterministic() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join(".env");

            let mut vars = BTreeMap::new();
            vars.insert("Z".to_string(), "last".to_string());
            vars.insert("A".to_string(), "first".to_string());
            write_env(&path, &vars).unwrap();
            let first = fs::read_to_string(&path).unwrap();
            write_env(&path, &vars).unwrap();
            let second = fs::read_to_string(&path).unwrap();
            assert_eq!(first, second);
            assert!(first.starts_with("A=first\n"));
        }
    }
}
