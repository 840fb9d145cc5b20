//! Local file helpers for the pipeline's JSON output files.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON classification is purely by a case-insensitive `.json` suffix;
/// everything else is treated as text.
pub fn is_json(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".json")
}

/// Writes `data` as pretty-printed JSON, creating parent directories.
pub fn save_json<T: Serialize>(filepath: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = filepath.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(data)?;
    fs::write(filepath, content)
}

pub fn read_json<T: DeserializeOwned>(filepath: &Path) -> io::Result<T> {
    let content = fs::read_to_string(filepath)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn check_file(filepath: &Path) -> bool {
    filepath.exists()
}

/// Removes the file when present; absence is not a fault.
pub fn remove_file(filepath: &Path) -> io::Result<()> {
    if filepath.exists() {
        fs::remove_file(filepath)?;
    }
    Ok(())
}

pub fn check_folder(folder: &Path) -> bool {
    folder.is_dir()
}

/// Removes the folder tree when present; absence is not a fault.
pub fn remove_folder(folder: &Path) -> io::Result<()> {
    if folder.exists() {
        fs::remove_dir_all(folder)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn json_suffix_is_case_insensitive() {
        assert!(is_json("a/b.json"));
        assert!(is_json("a/b.JSON"));
        assert!(!is_json("a/b.txt"));
        assert!(!is_json("a/bjson"));
    }

    #[test]
    fn save_and_read_json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/output.json");
        let data = json!({"order_id": "A001", "bill": 9.4});

        save_json(&path, &data).unwrap();
        let loaded: Value = read_json(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn remove_file_is_noop_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        remove_file(&path).unwrap();

        fs::write(&path, "x").unwrap();
        assert!(check_file(&path));
        remove_file(&path).unwrap();
        assert!(!check_file(&path));
    }

    #[test]
    fn remove_folder_is_noop_when_absent() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("tree");
        remove_folder(&folder).unwrap();

        fs::create_dir_all(folder.join("inner")).unwrap();
        assert!(check_folder(&folder));
        remove_folder(&folder).unwrap();
        assert!(!check_folder(&folder));
    }
}
