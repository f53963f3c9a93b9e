// src/signature/store.rs
//
// Immutable gesture signature set, loaded once at startup and shared
// read-only across every session.

use super::model::{GestureSignature, SignatureRecord};
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct SignatureStore {
    signatures: Vec<GestureSignature>,
}

impl SignatureStore {
    /// Load every `*.json` file directly under `dir`. Broken files are
    /// skipped; the call only fails when nothing usable was found.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let signatures = load_signature_dir(dir);
        if signatures.is_empty() {
            bail!("no gesture signatures could be loaded from {}", dir.display());
        }
        Self::from_signatures(signatures)
    }

    /// Build a store from already-parsed signatures, dropping duplicate names.
    pub fn from_signatures(signatures: Vec<GestureSignature>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(signatures.len());

        for signature in signatures {
            if seen.insert(signature.name.clone()) {
                unique.push(signature);
            } else {
                warn!("Duplicate gesture '{}' ignored", signature.name);
            }
        }

        if unique.is_empty() {
            bail!("signature set is empty");
        }

        info!("Total gestures loaded: {}", unique.len());
        Ok(Self { signatures: unique })
    }

    pub fn all(&self) -> &[GestureSignature] {
        &self.signatures
    }

    pub fn by_name(&self, name: &str) -> Option<&GestureSignature> {
        self.signatures.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signatures.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Scan `dir` for signature files. A missing directory yields an empty set.
pub fn load_signature_dir(dir: &Path) -> Vec<GestureSignature> {
    if !dir.is_dir() {
        error!("Gesture directory not found: {}", dir.display());
        return Vec::new();
    }

    let mut signatures = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !entry.file_type().is_file() || !is_json {
            continue;
        }

        match load_signature_file(path) {
            Ok(signature) => {
                info!(
                    "Gesture '{}' [{}] | threshold: {:.4} | dims: {}",
                    signature.name, signature.category, signature.threshold, signature.dimensions
                );
                signatures.push(signature);
            }
            Err(e) => {
                error!("Error loading {}: {:#}", path.display(), e);
            }
        }
    }

    signatures
}

pub fn load_signature_file(path: &Path) -> Result<GestureSignature> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let record: SignatureRecord = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    GestureSignature::try_from(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn signature_json(name: &str) -> String {
        format!(
            r#"{{"name": "{}", "dimensions": 3, "threshold": 0.3,
                "average_signature": [0.1, -0.2, 0.1]}}"#,
            name
        )
    }

    #[test]
    fn test_broken_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.json", &signature_json("A"));
        write_file(dir.path(), "b.json", "{ not json");
        write_file(
            dir.path(),
            "c.json",
            r#"{"name": "C", "dimensions": 4, "threshold": 0.3, "average_signature": [0.1]}"#,
        );
        write_file(dir.path(), "notes.txt", "ignored");

        let store = SignatureStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.by_name("A").is_some());
        assert!(store.by_name("C").is_none());
    }

    #[test]
    fn test_all_files_broken_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.json", "[]");
        assert!(SignatureStore::load(dir.path()).is_err());
    }

    #[test]
    fn test_missing_directory_fails_without_panic() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(load_signature_dir(&missing).is_empty());
        assert!(SignatureStore::load(&missing).is_err());
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "1.json", &signature_json("A"));
        write_file(dir.path(), "2.json", &signature_json("A"));
        write_file(dir.path(), "3.json", &signature_json("B"));

        let store = SignatureStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
