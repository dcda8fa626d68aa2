//! Loading retrieved documents from the command line.

use std::path::Path;

use anyhow::{Context, Result};
use ragguard_core::DocumentSet;

/// Documents from `--doc` flags first, then from a JSON array file.
pub fn load_documents(inline: &[String], docs_file: Option<&Path>) -> Result<DocumentSet> {
    let mut documents: Vec<String> = inline.to_vec();

    if let Some(path) = docs_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read documents file {:?}", path))?;
        let from_file: Vec<String> = serde_json::from_str(&content).with_context(|| {
            format!("Documents file {:?} must be a JSON array of strings", path)
        })?;
        documents.extend(from_file);
    }

    Ok(documents.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_inline_then_file_order_is_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, r#"["from file 1", "from file 2"]"#).unwrap();

        let docs = load_documents(&["inline".to_string()], Some(&path)).unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.text()).collect();
        assert_eq!(texts, vec!["inline", "from file 1", "from file 2"]);
    }

    #[test]
    fn test_no_documents_is_an_empty_set() {
        assert!(load_documents(&[], None).unwrap().is_empty());
    }

    #[test]
    fn test_non_array_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, r#"{"docs": ["x"]}"#).unwrap();

        let err = load_documents(&[], Some(&path)).unwrap_err();
        assert!(err.to_string().contains("JSON array of strings"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let err = load_documents(&[], Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read documents file"));
    }
}
