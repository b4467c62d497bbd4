//! Id-addressed edits on the document's list sections.
//!
//! Every list item carries a stable id. Appends always mint a fresh id;
//! replace, remove and move address items by id only, never by position.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::portfolio::{
    CertificateItem, Document, EducationItem, ExperienceItem, Module, ProjectItem, SkillCategory,
    SocialLink,
};

#[derive(Debug, Error)]
pub enum EditError {
    #[error("No item with id {0} in {1}")]
    ItemNotFound(Uuid, Module),

    #[error("Section '{0}' has no item list")]
    NotAList(Module),

    #[error("Section '{0}' has no editable title")]
    NoSectionTitle(Module),

    #[error("Section '{0}' does not support a section image")]
    NoSectionImage(Module),

    #[error("Invalid {0} item: {1}")]
    InvalidItem(Module, serde_json::Error),
}

/// A list element with a stable identity.
pub trait ListItem {
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
}

macro_rules! impl_list_item {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ListItem for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn set_id(&mut self, id: Uuid) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_list_item!(
    ExperienceItem,
    SkillCategory,
    ProjectItem,
    EducationItem,
    CertificateItem,
    SocialLink,
);

// ────────────────────────────────────────────────────────────────────────────
// Generic list operations
// ────────────────────────────────────────────────────────────────────────────

/// Appends `item` under a freshly generated id and returns that id.
pub fn append<T: ListItem>(items: &mut Vec<T>, mut item: T) -> Uuid {
    let id = Uuid::new_v4();
    item.set_id(id);
    items.push(item);
    id
}

fn position<T: ListItem>(items: &[T], id: Uuid) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Replaces the item with `id`, keeping its id and position.
pub fn replace_by_id<T: ListItem>(items: &mut [T], id: Uuid, mut item: T) -> Option<usize> {
    let index = position(items, id)?;
    item.set_id(id);
    items[index] = item;
    Some(index)
}

pub fn remove_by_id<T: ListItem>(items: &mut Vec<T>, id: Uuid) -> Option<T> {
    let index = position(items, id)?;
    Some(items.remove(index))
}

/// Moves the item with `id` to `to_index`, clamped to the last position.
/// Returns the index it ended up at.
pub fn move_by_id<T: ListItem>(items: &mut Vec<T>, id: Uuid, to_index: usize) -> Option<usize> {
    let from = position(items, id)?;
    let item = items.remove(from);
    let to = to_index.min(items.len());
    items.insert(to, item);
    Some(to)
}

// ────────────────────────────────────────────────────────────────────────────
// Section dispatch
// ────────────────────────────────────────────────────────────────────────────

/// One edit on a list section. Item payloads arrive as raw JSON and are
/// parsed into the section's item type.
#[derive(Debug, Clone)]
pub enum ItemOp {
    Append(Value),
    Replace(Uuid, Value),
    Remove(Uuid),
    Move(Uuid, usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOpOutcome {
    pub item_id: Uuid,
    /// Position after the edit; `None` once removed.
    pub index: Option<usize>,
}

fn parse_item<T: DeserializeOwned>(module: Module, value: Value) -> Result<T, EditError> {
    serde_json::from_value(value).map_err(|e| EditError::InvalidItem(module, e))
}

fn apply_to<T>(items: &mut Vec<T>, module: Module, op: ItemOp) -> Result<ItemOpOutcome, EditError>
where
    T: ListItem + DeserializeOwned,
{
    match op {
        ItemOp::Append(value) => {
            let item_id = append(items, parse_item(module, value)?);
            Ok(ItemOpOutcome {
                item_id,
                index: Some(items.len() - 1),
            })
        }
        ItemOp::Replace(id, value) => {
            let item = parse_item(module, value)?;
            let index =
                replace_by_id(items, id, item).ok_or(EditError::ItemNotFound(id, module))?;
            Ok(ItemOpOutcome {
                item_id: id,
                index: Some(index),
            })
        }
        ItemOp::Remove(id) => {
            remove_by_id(items, id).ok_or(EditError::ItemNotFound(id, module))?;
            Ok(ItemOpOutcome {
                item_id: id,
                index: None,
            })
        }
        ItemOp::Move(id, to_index) => {
            let index =
                move_by_id(items, id, to_index).ok_or(EditError::ItemNotFound(id, module))?;
            Ok(ItemOpOutcome {
                item_id: id,
                index: Some(index),
            })
        }
    }
}

/// Applies `op` to the list belonging to `module`.
pub fn apply_item_op(
    doc: &mut Document,
    module: Module,
    op: ItemOp,
) -> Result<ItemOpOutcome, EditError> {
    match module {
        Module::PersonalInfo => Err(EditError::NotAList(module)),
        Module::Experience => apply_to(&mut doc.experience.items, module, op),
        Module::Skills => apply_to(&mut doc.skills.categories, module, op),
        Module::Projects => apply_to(&mut doc.projects.items, module, op),
        Module::Education => apply_to(&mut doc.education.items, module, op),
        Module::Certificates => apply_to(&mut doc.certificates.items, module, op),
        Module::SocialLinks => apply_to(&mut doc.social_links, module, op),
    }
}

/// Section heading and optional banner image.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMeta {
    pub section_title: String,
    #[serde(default)]
    pub section_image_path: Option<String>,
}

pub fn set_section_meta(
    doc: &mut Document,
    module: Module,
    meta: SectionMeta,
) -> Result<(), EditError> {
    let image = meta
        .section_image_path
        .filter(|path| !path.trim().is_empty());
    let (title, image_slot) = match module {
        Module::Experience => (
            &mut doc.experience.section_title,
            Some(&mut doc.experience.section_image_path),
        ),
        Module::Skills => (
            &mut doc.skills.section_title,
            Some(&mut doc.skills.section_image_path),
        ),
        Module::Education => (
            &mut doc.education.section_title,
            Some(&mut doc.education.section_image_path),
        ),
        Module::Projects => (&mut doc.projects.section_title, None),
        Module::Certificates => (&mut doc.certificates.section_title, None),
        Module::PersonalInfo | Module::SocialLinks => {
            return Err(EditError::NoSectionTitle(module))
        }
    };

    match image_slot {
        Some(slot) => *slot = image,
        None if image.is_some() => return Err(EditError::NoSectionImage(module)),
        None => {}
    }
    *title = meta.section_title;
    Ok(())
}
