//! Read-only catalogs backing the editor choices: modules, skill icons,
//! social platforms and export templates.

use serde::Serialize;

use crate::models::portfolio::{Module, SkillIcon, SocialPlatform, Template};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub key: Module,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillIconInfo {
    pub icon: SkillIcon,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub name: SocialPlatform,
    pub glyph: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub key: Template,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub modules: Vec<ModuleInfo>,
    pub skill_icons: Vec<SkillIconInfo>,
    pub social_platforms: Vec<PlatformInfo>,
    pub templates: Vec<TemplateInfo>,
}

pub fn module_info(module: Module) -> ModuleInfo {
    let (name, description, icon) = match module {
        Module::PersonalInfo => (
            "Personal Information",
            "Your profile, summary, and about section",
            "👤",
        ),
        Module::Experience => ("Work Experience", "Your professional work history", "💼"),
        Module::Skills => ("Skills", "Technical and professional skills", "🛠️"),
        Module::Projects => ("Projects", "Showcase your projects and work", "📁"),
        Module::Education => ("Education", "Educational background", "🎓"),
        Module::Certificates => (
            "Certifications",
            "Professional certifications and awards",
            "🏆",
        ),
        Module::SocialLinks => ("Social Links", "Connect with your social profiles", "🔗"),
    };
    ModuleInfo {
        key: module,
        name,
        description,
        icon,
        required: module.is_required(),
    }
}

pub fn catalog() -> Catalog {
    Catalog {
        modules: Module::ALL.into_iter().map(module_info).collect(),
        skill_icons: SkillIcon::ALL
            .into_iter()
            .map(|icon| SkillIconInfo {
                icon,
                label: icon.label(),
            })
            .collect(),
        social_platforms: SocialPlatform::ALL
            .into_iter()
            .map(|name| PlatformInfo {
                name,
                glyph: name.glyph(),
            })
            .collect(),
        templates: Template::ALL
            .into_iter()
            .map(|key| TemplateInfo {
                key,
                description: key.description(),
            })
            .collect(),
    }
}
