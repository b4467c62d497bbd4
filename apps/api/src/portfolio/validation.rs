//! Per-field document validation.
//!
//! Reports are advisory: the editor endpoints return them alongside every
//! edit, and `save` only refuses a failing report when enforcement is
//! switched on in the config.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::portfolio::{
    Document, EducationItem, ExperienceItem, Module, PersonalInfo, ProjectItem, SkillCategory,
};
use crate::store::assets::is_relative_asset_path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub section: Module,
    /// Set for issues inside a list item.
    pub item_id: Option<Uuid>,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<FieldIssue>) -> Self {
        Self {
            passed: issues.is_empty(),
            issues,
        }
    }
}

fn require(
    issues: &mut Vec<FieldIssue>,
    section: Module,
    item_id: Option<Uuid>,
    field: &str,
    value: &str,
) {
    if value.trim().is_empty() {
        issues.push(FieldIssue {
            section,
            item_id,
            field: field.to_string(),
            message: format!("Missing required field: {field}"),
        });
    }
}

fn check_path(
    issues: &mut Vec<FieldIssue>,
    section: Module,
    item_id: Option<Uuid>,
    field: &str,
    value: Option<&str>,
) {
    if let Some(path) = value {
        if !is_relative_asset_path(path) {
            issues.push(FieldIssue {
                section,
                item_id,
                field: field.to_string(),
                message: format!("'{path}' is not a relative storage path"),
            });
        }
    }
}

pub fn validate_personal_info(info: &PersonalInfo) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    require(&mut issues, Module::PersonalInfo, None, "name", &info.name);
    require(&mut issues, Module::PersonalInfo, None, "email", &info.email);
    check_path(
        &mut issues,
        Module::PersonalInfo,
        None,
        "profileImagePath",
        info.profile_image_path.as_deref(),
    );
    issues
}

pub fn validate_experience(items: &[ExperienceItem]) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for item in items {
        let id = Some(item.id);
        require(&mut issues, Module::Experience, id, "title", &item.title);
        require(&mut issues, Module::Experience, id, "company", &item.company);
        require(&mut issues, Module::Experience, id, "period", &item.period);
    }
    issues
}

pub fn validate_skills(categories: &[SkillCategory]) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for category in categories {
        let id = Some(category.id);
        require(&mut issues, Module::Skills, id, "title", &category.title);
        require(&mut issues, Module::Skills, id, "items", &category.items);
    }
    issues
}

pub fn validate_projects(items: &[ProjectItem]) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for item in items {
        require(&mut issues, Module::Projects, Some(item.id), "title", &item.title);
    }
    issues
}

pub fn validate_education(items: &[EducationItem]) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for item in items {
        let id = Some(item.id);
        require(&mut issues, Module::Education, id, "title", &item.title);
        require(&mut issues, Module::Education, id, "period", &item.period);
    }
    issues
}

/// Validates one section of the document.
pub fn validate_section(doc: &Document, module: Module) -> Vec<FieldIssue> {
    let mut issues = match module {
        Module::PersonalInfo => return validate_personal_info(&doc.personal_info),
        Module::Experience => validate_experience(&doc.experience.items),
        Module::Skills => validate_skills(&doc.skills.categories),
        Module::Projects => validate_projects(&doc.projects.items),
        Module::Education => validate_education(&doc.education.items),
        Module::Certificates | Module::SocialLinks => Vec::new(),
    };

    match module {
        Module::Experience => check_path(
            &mut issues,
            module,
            None,
            "sectionImagePath",
            doc.experience.section_image_path.as_deref(),
        ),
        Module::Skills => check_path(
            &mut issues,
            module,
            None,
            "sectionImagePath",
            doc.skills.section_image_path.as_deref(),
        ),
        Module::Education => check_path(
            &mut issues,
            module,
            None,
            "sectionImagePath",
            doc.education.section_image_path.as_deref(),
        ),
        Module::Certificates => {
            for cert in &doc.certificates.items {
                let id = Some(cert.id);
                check_path(&mut issues, module, id, "imagePath", cert.image_path.as_deref());
                check_path(&mut issues, module, id, "pdfPath", cert.pdf_path.as_deref());
            }
        }
        _ => {}
    }
    issues
}

/// Validates personal info plus every enabled section.
pub fn validate_document(doc: &Document) -> ValidationReport {
    let issues = Module::ALL
        .into_iter()
        .filter(|module| module.is_required() || doc.modules.contains(*module))
        .flat_map(|module| validate_section(doc, module))
        .collect();
    ValidationReport::from_issues(issues)
}
