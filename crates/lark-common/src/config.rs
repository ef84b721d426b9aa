//! JSON configuration loading.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

/// Read a JSON file into `T`.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)
        .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), "loaded config");
    Ok(value)
}

/// Read a JSON file into `T`, or return `T::default()` when no path is given.
pub fn load_json_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => load_json(path),
        None => Ok(T::default()),
    }
}

/// Pretty-print any serializable config.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        rate: u32,
        name: String,
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("lark-common-{}-{name}", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_json_partial_uses_defaults() {
        let path = temp_file("partial.json", r#"{ "rate": 60 }"#);
        let sample: Sample = load_json(&path).unwrap();
        assert_eq!(sample.rate, 60);
        assert_eq!(sample.name, "");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_json_missing_file_is_io() {
        let err = load_json::<Sample>("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_json_bad_syntax_is_config() {
        let path = temp_file("bad.json", "{ rate: ");
        let err = load_json::<Sample>(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_json_or_default_without_path() {
        let sample: Sample = load_json_or_default(None).unwrap();
        assert_eq!(sample, Sample::default());
    }
}
