use std::path::PathBuf;

use tracing::debug;

use super::fs::{read_json, write_json_atomic};
use super::StoreResult;
use crate::models::portfolio::Document;

/// Per-user document files: `{root}/{username}_data.json`.
///
/// This is the only place a document is persisted. Saves replace the whole
/// record atomically; there is no merge and no concurrency control, so two
/// concurrent saves for one user resolve as last-writer-wins.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, username: &str) -> PathBuf {
        self.root.join(format!("{username}_data.json"))
    }

    /// Loads the persisted document, or `None` if the user has none on disk.
    pub fn load(&self, username: &str) -> StoreResult<Option<Document>> {
        let doc = read_json(&self.path_for(username))?;
        debug!(
            "Loaded document for {username}: {}",
            if doc.is_some() { "found" } else { "absent" }
        );
        Ok(doc)
    }

    /// Replaces the persisted document wholesale.
    pub fn save(&self, username: &str, doc: &Document) -> StoreResult<()> {
        write_json_atomic(&self.path_for(username), doc)?;
        debug!("Saved document for {username}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::portfolio::{ExperienceItem, Module, ProjectItem, SkillCategory, SkillIcon};
    use uuid::Uuid;

    fn store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.load("nobody").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips_mutated_document() {
        let (_dir, store) = store();
        let mut doc = Document::build_default("carol", "carol@example.com");
        doc.modules.enable(Module::Skills);
        doc.modules.enable(Module::Projects);
        doc.personal_info.about = "Line one\nLine \"two\"".to_string();
        doc.personal_info.profile_image_path = Some("images/carol.png".to_string());
        doc.skills.categories.push(SkillCategory {
            id: Uuid::new_v4(),
            title: "Languages".to_string(),
            icon: SkillIcon::Computer,
            items: "Rust, Python".to_string(),
        });
        doc.projects.items.push(ProjectItem {
            id: Uuid::new_v4(),
            title: "Folio".to_string(),
            url: None,
            description: "ünïcödé ✓".to_string(),
        });
        doc.theme.colors.primary = "#000000".to_string();

        store.save("carol", &doc).unwrap();
        assert_eq!(store.load("carol").unwrap(), Some(doc));
    }

    #[test]
    fn test_save_is_full_replace() {
        let (_dir, store) = store();
        let mut doc = Document::build_default("dave", "d@x.io");
        doc.experience.items.push(ExperienceItem {
            id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            period: "2020-2022".to_string(),
            description: vec![],
        });
        store.save("dave", &doc).unwrap();

        let fresh = Document::build_default("dave", "d@x.io");
        store.save("dave", &fresh).unwrap();
        let loaded = store.load("dave").unwrap().unwrap();
        assert!(loaded.experience.items.is_empty());
    }
}
