use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::fs::write_atomic;
use super::{StoreError, StoreResult};

/// Storage area an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Images,
    Certificates,
}

impl AssetCategory {
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetCategory::Images => "images",
            AssetCategory::Certificates => "certificates",
        }
    }

    /// Lower-case extensions accepted for uploads into this category.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetCategory::Images => &["jpg", "jpeg", "png", "gif"],
            AssetCategory::Certificates => &["jpg", "jpeg", "png", "gif", "pdf"],
        }
    }

    pub fn allows(&self, filename: &str) -> bool {
        extension_of(filename)
            .map(|ext| self.allowed_extensions().contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for AssetCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "images" => Ok(AssetCategory::Images),
            "certificates" => Ok(AssetCategory::Certificates),
            other => Err(StoreError::InvalidAssetPath(format!(
                "unknown asset category '{other}'"
            ))),
        }
    }
}

pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// True for a non-empty relative path made only of normal components.
pub fn is_relative_asset_path(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Category-scoped upload storage: `{root}/{category}/{filename}`.
///
/// Same-named uploads overwrite each other. Nothing is ever garbage collected.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes `bytes` and returns the relative path to embed in a document.
    pub fn store(
        &self,
        category: AssetCategory,
        filename: &str,
        bytes: &[u8],
    ) -> StoreResult<String> {
        let filename = sanitize_filename(filename)?;
        let relative = format!("{}/{}", category.dir_name(), filename);
        write_atomic(&self.root.join(category.dir_name()).join(&filename), bytes)?;
        info!("Stored asset {relative} ({} bytes)", bytes.len());
        Ok(relative)
    }

    /// Reads a previously stored asset by its relative path.
    pub fn read(&self, relative: &str) -> StoreResult<Vec<u8>> {
        if !is_relative_asset_path(relative) {
            return Err(StoreError::InvalidAssetPath(relative.to_string()));
        }
        Ok(std::fs::read(self.root.join(relative))?)
    }
}

/// Reduces a client-supplied name to a bare file name. Anything carrying
/// directory syntax, or nothing usable at all, is rejected.
pub fn sanitize_filename(filename: &str) -> StoreResult<String> {
    let trimmed = filename.trim();
    let invalid = || StoreError::InvalidFilename(filename.to_string());

    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.chars().any(char::is_control)
    {
        return Err(invalid());
    }
    if trimmed == "." || trimmed == ".." {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_writes_under_category_and_returns_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let path = store
            .store(AssetCategory::Images, "avatar.png", b"\x89PNG")
            .unwrap();
        assert_eq!(path, "images/avatar.png");
        assert!(dir.path().join("images").join("avatar.png").is_file());
        assert_eq!(store.read(&path).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_same_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        store
            .store(AssetCategory::Certificates, "aws.pdf", b"one")
            .unwrap();
        let path = store
            .store(AssetCategory::Certificates, "aws.pdf", b"two")
            .unwrap();
        assert_eq!(store.read(&path).unwrap(), b"two");
    }

    #[test]
    fn test_traversal_filenames_rejected() {
        for name in ["../secret.png", "a/b.png", "..\\x.png", "..", "", "  "] {
            assert!(
                matches!(sanitize_filename(name), Err(StoreError::InvalidFilename(_))),
                "{name:?} should be rejected"
            );
        }
        assert_eq!(sanitize_filename(" photo.jpg ").unwrap(), "photo.jpg");
    }

    #[test]
    fn test_read_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        assert!(matches!(
            store.read("../users.json"),
            Err(StoreError::InvalidAssetPath(_))
        ));
        assert!(matches!(
            store.read("/etc/passwd"),
            Err(StoreError::InvalidAssetPath(_))
        ));
    }

    #[test]
    fn test_extension_allow_list() {
        assert!(AssetCategory::Images.allows("me.JPG"));
        assert!(!AssetCategory::Images.allows("cert.pdf"));
        assert!(AssetCategory::Certificates.allows("cert.pdf"));
        assert!(!AssetCategory::Certificates.allows("script.sh"));
        assert!(!AssetCategory::Images.allows("noextension"));
    }

    #[test]
    fn test_relative_asset_path_rules() {
        assert!(is_relative_asset_path("images/a.png"));
        assert!(!is_relative_asset_path(""));
        assert!(!is_relative_asset_path("/abs/a.png"));
        assert!(!is_relative_asset_path("images/../../a.png"));
        assert!(!is_relative_asset_path("./a.png"));
    }
}
