//! Persistence for expanded TOC material.
//!
//! The material file is the pipeline's only cross-process artifact: a
//! pretty-printed JSON object keyed by section number, written under an
//! output directory with a filename derived from the subject.

use crate::error::{Result, TocForgeError};
use crate::repair::TocMaterial;
use std::fs;
use std::path::{Path, PathBuf};

/// Default output directory for material files.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Replace filesystem-illegal characters in a subject-derived name.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Path of the material file for `subject` under `output_dir`.
pub fn material_path(output_dir: &Path, subject: &str) -> PathBuf {
    output_dir.join(format!("{}.json", sanitize_filename(subject)))
}

/// Save material as pretty JSON, creating parent directories as needed.
pub fn save_material(material: &TocMaterial, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| TocForgeError::io(parent, e))?;
        }
    }

    let data = serde_json::to_string_pretty(material)
        .map_err(|e| TocForgeError::Serialization(e.to_string()))?;
    fs::write(path, data).map_err(|e| TocForgeError::io(path, e))?;

    Ok(())
}

/// Load material from a file.
pub fn load_material(path: &Path) -> Result<TocMaterial> {
    let data = fs::read_to_string(path).map_err(|e| TocForgeError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| TocForgeError::Serialization(e.to_string()))
}

/// Check if a material file exists at the given path.
pub fn material_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Get the size of a material file in bytes.
pub fn material_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| TocForgeError::io(path, e))?;
    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::SectionMaterial;
    use tempfile::TempDir;

    fn create_test_material() -> TocMaterial {
        let mut material = TocMaterial::new();
        material.insert(
            "chapter1".to_string(),
            SectionMaterial {
                title: "绪论".to_string(),
                description: "本章介绍全书主题。读者将了解学习路径。".to_string(),
            },
        );
        material.insert(
            "chapter2".to_string(),
            SectionMaterial {
                title: "线性模型".to_string(),
                description: "本章讲解线性模型。读者将掌握回归方法。".to_string(),
            },
        );
        material
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("material.json");

        let original = create_test_material();
        save_material(&original, &path).unwrap();

        assert!(material_exists(&path));

        let loaded = load_material(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("material.json");

        save_material(&create_test_material(), &path).unwrap();
        assert!(material_exists(&path));
    }

    #[test]
    fn test_load_nonexistent() {
        let result = load_material(Path::new("/nonexistent/material.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_material_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("material.json");

        save_material(&create_test_material(), &path).unwrap();
        assert!(material_size(&path).unwrap() > 0);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("机器学习"), "机器学习");
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("what?*"), "what__");
    }

    #[test]
    fn test_material_path() {
        let path = material_path(Path::new("output"), "数学/分析");
        assert_eq!(path, Path::new("output").join("数学_分析.json"));
    }

    #[test]
    fn test_saved_file_is_readable_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("material.json");

        save_material(&create_test_material(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("chapter1"));
        assert!(content.contains("绪论"));
    }
}
