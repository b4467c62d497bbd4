//! The portfolio document: a strongly-typed record with a single default constructor.
//!
//! Serialized with camelCase keys. Every list item carries a stable `id`; items
//! loaded without one are assigned a fresh id. Optional asset paths read empty
//! strings as `None`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Modules
// ────────────────────────────────────────────────────────────────────────────

/// A named section of the document that can be toggled for display and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    PersonalInfo,
    Experience,
    Skills,
    Projects,
    Education,
    Certificates,
    SocialLinks,
}

impl Module {
    /// Catalog order. Renderers emit sections in this order.
    pub const ALL: [Module; 7] = [
        Module::PersonalInfo,
        Module::Experience,
        Module::Skills,
        Module::Projects,
        Module::Education,
        Module::Certificates,
        Module::SocialLinks,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Module::PersonalInfo => "personal_info",
            Module::Experience => "experience",
            Module::Skills => "skills",
            Module::Projects => "projects",
            Module::Education => "education",
            Module::Certificates => "certificates",
            Module::SocialLinks => "social_links",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Module::PersonalInfo)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown module '{}'", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for Module {
    type Err = UnknownModule;

    /// Accepts both `social_links` and `social-links` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Module::ALL
            .into_iter()
            .find(|m| m.key() == normalized)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Ordered set of enabled modules.
///
/// Always contains `personal_info` (first when it had to be inserted) and never
/// contains duplicates. Normalised on every construction, including deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Module>", into = "Vec<Module>")]
pub struct Modules(Vec<Module>);

impl Modules {
    pub fn contains(&self, module: Module) -> bool {
        self.0.contains(&module)
    }

    /// Appends `module` if it is not already enabled. Returns whether anything changed.
    pub fn enable(&mut self, module: Module) -> bool {
        if self.contains(module) {
            return false;
        }
        self.0.push(module);
        true
    }

    /// Disables `module`. `personal_info` cannot be disabled.
    pub fn disable(&mut self, module: Module) -> bool {
        if module.is_required() {
            return false;
        }
        let before = self.0.len();
        self.0.retain(|m| *m != module);
        before != self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.0.iter()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[Module] {
        &self.0
    }
}

impl Default for Modules {
    fn default() -> Self {
        Modules(vec![Module::PersonalInfo])
    }
}

impl From<Vec<Module>> for Modules {
    fn from(raw: Vec<Module>) -> Self {
        let mut modules = Vec::with_capacity(raw.len() + 1);
        if !raw.contains(&Module::PersonalInfo) {
            modules.push(Module::PersonalInfo);
        }
        for module in raw {
            if !modules.contains(&module) {
                modules.push(module);
            }
        }
        Modules(modules)
    }
}

impl From<Modules> for Vec<Module> {
    fn from(modules: Modules) -> Self {
        modules.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Enumerated field values
// ────────────────────────────────────────────────────────────────────────────

/// Icon shown next to a skill category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkillIcon {
    #[default]
    #[serde(rename = "🔧")]
    Tool,
    #[serde(rename = "💻")]
    Computer,
    #[serde(rename = "📚")]
    Language,
    #[serde(rename = "\u{2601}\u{fe0f}")]
    Cloud,
    #[serde(rename = "🎨")]
    Design,
    #[serde(rename = "\u{2699}\u{fe0f}")]
    Backend,
    #[serde(rename = "\u{1f441}\u{fe0f}")]
    Frontend,
    #[serde(rename = "📊")]
    Data,
}

impl SkillIcon {
    pub const ALL: [SkillIcon; 8] = [
        SkillIcon::Tool,
        SkillIcon::Computer,
        SkillIcon::Language,
        SkillIcon::Cloud,
        SkillIcon::Design,
        SkillIcon::Backend,
        SkillIcon::Frontend,
        SkillIcon::Data,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            SkillIcon::Tool => "🔧",
            SkillIcon::Computer => "💻",
            SkillIcon::Language => "📚",
            SkillIcon::Cloud => "\u{2601}\u{fe0f}",
            SkillIcon::Design => "🎨",
            SkillIcon::Backend => "\u{2699}\u{fe0f}",
            SkillIcon::Frontend => "\u{1f441}\u{fe0f}",
            SkillIcon::Data => "📊",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkillIcon::Tool => "Tool / General",
            SkillIcon::Computer => "Computer / Programming",
            SkillIcon::Language => "Language / Learning",
            SkillIcon::Cloud => "Cloud / DevOps",
            SkillIcon::Design => "Design / Creative",
            SkillIcon::Backend => "Backend / Server",
            SkillIcon::Frontend => "Frontend / UI",
            SkillIcon::Data => "Data / Analytics",
        }
    }
}

/// Platform of a social link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SocialPlatform {
    #[default]
    GitHub,
    LinkedIn,
    Twitter,
    Portfolio,
    Blog,
    Instagram,
    Facebook,
    YouTube,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 8] = [
        SocialPlatform::GitHub,
        SocialPlatform::LinkedIn,
        SocialPlatform::Twitter,
        SocialPlatform::Portfolio,
        SocialPlatform::Blog,
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::YouTube,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SocialPlatform::GitHub => "GitHub",
            SocialPlatform::LinkedIn => "LinkedIn",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Portfolio => "Portfolio",
            SocialPlatform::Blog => "Blog",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::YouTube => "YouTube",
        }
    }

    /// Short glyph used by the HTML export.
    pub fn glyph(&self) -> &'static str {
        match self {
            SocialPlatform::GitHub => "🐙",
            SocialPlatform::LinkedIn => "in",
            SocialPlatform::Twitter => "𝕏",
            SocialPlatform::Portfolio => "🌐",
            SocialPlatform::Blog => "✍️",
            SocialPlatform::Instagram => "📸",
            SocialPlatform::Facebook => "f",
            SocialPlatform::YouTube => "▶️",
        }
    }
}

/// Export layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Modern,
    Classic,
    Compact,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Modern, Template::Classic, Template::Compact];

    pub fn key(&self) -> &'static str {
        match self {
            Template::Modern => "modern",
            Template::Classic => "classic",
            Template::Compact => "compact",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::Modern => "Modern (clean, colored header)",
            Template::Classic => "Classic (two-column, serif)",
            Template::Compact => "Compact (dense, single-column)",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "profileImage", deserialize_with = "empty_as_none")]
    pub profile_image_path: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub about: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: SkillIcon,
    /// Comma-separated skill names.
    #[serde(default)]
    pub items: String,
}

impl SkillCategory {
    /// Splits `items` on commas, trimming and dropping empty entries.
    pub fn skill_list(&self) -> Vec<&str> {
        self.items
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "image", deserialize_with = "empty_as_none")]
    pub image_path: Option<String>,
    #[serde(default, alias = "pdf", deserialize_with = "empty_as_none")]
    pub pdf_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: SocialPlatform,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceSection {
    pub section_title: String,
    #[serde(alias = "sectionImage", deserialize_with = "empty_as_none")]
    pub section_image_path: Option<String>,
    pub items: Vec<ExperienceItem>,
}

impl Default for ExperienceSection {
    fn default() -> Self {
        Self {
            section_title: "Experience".to_string(),
            section_image_path: None,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillsSection {
    pub section_title: String,
    #[serde(alias = "sectionImage", deserialize_with = "empty_as_none")]
    pub section_image_path: Option<String>,
    pub categories: Vec<SkillCategory>,
}

impl Default for SkillsSection {
    fn default() -> Self {
        Self {
            section_title: "Skills".to_string(),
            section_image_path: None,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectsSection {
    pub section_title: String,
    pub items: Vec<ProjectItem>,
}

impl Default for ProjectsSection {
    fn default() -> Self {
        Self {
            section_title: "Projects".to_string(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationSection {
    pub section_title: String,
    #[serde(alias = "sectionImage", deserialize_with = "empty_as_none")]
    pub section_image_path: Option<String>,
    pub items: Vec<EducationItem>,
}

impl Default for EducationSection {
    fn default() -> Self {
        Self {
            section_title: "Education".to_string(),
            section_image_path: None,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificatesSection {
    pub section_title: String,
    pub items: Vec<CertificateItem>,
}

impl Default for CertificatesSection {
    fn default() -> Self {
        Self {
            section_title: "Certifications".to_string(),
            items: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_PRIMARY: &str = "#6366f1";
pub const DEFAULT_SECONDARY: &str = "#8b5cf6";
pub const DEFAULT_ACCENT: &str = "#06b6d4";

const DEFAULT_SWATCHES: &[(&str, &str)] = &[
    ("primaryDark", "#4f46e5"),
    ("textDark", "#1e293b"),
    ("textLight", "#64748b"),
    ("bgLight", "#f8fafc"),
    ("bgWhite", "#ffffff"),
];

/// Theme palette. `primary`, `secondary` and `accent` are always present;
/// any other named swatch lives in `swatches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_secondary")]
    pub secondary: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(flatten)]
    pub swatches: BTreeMap<String, String>,
}

fn default_primary() -> String {
    DEFAULT_PRIMARY.to_string()
}

fn default_secondary() -> String {
    DEFAULT_SECONDARY.to_string()
}

fn default_accent() -> String {
    DEFAULT_ACCENT.to_string()
}

impl ThemeColors {
    /// Looks up a named swatch, falling back to the default palette.
    pub fn swatch(&self, name: &str) -> &str {
        match name {
            "primary" => &self.primary,
            "secondary" => &self.secondary,
            "accent" => &self.accent,
            other => self
                .swatches
                .get(other)
                .map(String::as_str)
                .or_else(|| {
                    DEFAULT_SWATCHES
                        .iter()
                        .find(|(k, _)| *k == other)
                        .map(|(_, v)| *v)
                })
                .unwrap_or(DEFAULT_PRIMARY),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            accent: default_accent(),
            swatches: DEFAULT_SWATCHES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub template: Template,
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// The full portfolio record owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub modules: Modules,
    #[serde(default)]
    pub experience: ExperienceSection,
    #[serde(default)]
    pub skills: SkillsSection,
    #[serde(default)]
    pub projects: ProjectsSection,
    #[serde(default)]
    pub education: EducationSection,
    #[serde(default)]
    pub certificates: CertificatesSection,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub theme: Theme,
}

impl Document {
    /// The skeleton every new user starts from.
    pub fn build_default(username: &str, email: &str) -> Self {
        Self {
            personal_info: PersonalInfo {
                name: username.to_string(),
                email: email.to_string(),
                title: format!("Hello! I'm {username}"),
                profile_image_path: None,
                summary: "Welcome to my portfolio".to_string(),
                about: String::new(),
            },
            modules: Modules::default(),
            experience: ExperienceSection::default(),
            skills: SkillsSection::default(),
            projects: ProjectsSection::default(),
            education: EducationSection::default(),
            certificates: CertificatesSection::default(),
            social_links: Vec::new(),
            theme: Theme::default(),
        }
    }

    /// Number of entries in a list-valued section. `personal_info` has none.
    pub fn item_count(&self, module: Module) -> usize {
        match module {
            Module::PersonalInfo => 0,
            Module::Experience => self.experience.items.len(),
            Module::Skills => self.skills.categories.len(),
            Module::Projects => self.projects.items.len(),
            Module::Education => self.education.items.len(),
            Module::Certificates => self.certificates.items.len(),
            Module::SocialLinks => self.social_links.len(),
        }
    }

    /// Display title of a section.
    pub fn section_title(&self, module: Module) -> &str {
        match module {
            Module::PersonalInfo => "Personal Information",
            Module::Experience => &self.experience.section_title,
            Module::Skills => &self.skills.section_title,
            Module::Projects => &self.projects.section_title,
            Module::Education => &self.education.section_title,
            Module::Certificates => &self.certificates.section_title,
            Module::SocialLinks => "Connect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_shape() {
        let doc = Document::build_default("alice", "alice@example.com");
        assert_eq!(doc.personal_info.name, "alice");
        assert_eq!(doc.personal_info.title, "Hello! I'm alice");
        assert_eq!(doc.personal_info.email, "alice@example.com");
        assert_eq!(doc.modules.as_slice(), &[Module::PersonalInfo]);
        for module in Module::ALL {
            assert_eq!(doc.item_count(module), 0, "{module} should start empty");
        }
        assert_eq!(doc.theme.template, Template::Modern);
        assert_eq!(doc.theme.colors.primary, DEFAULT_PRIMARY);
        assert_eq!(doc.theme.colors.swatch("textDark"), "#1e293b");
    }

    #[test]
    fn test_build_default_is_deterministic() {
        assert_eq!(
            Document::build_default("bob", "b@x.io"),
            Document::build_default("bob", "b@x.io")
        );
    }

    #[test]
    fn test_serializes_camel_case_keys() {
        let doc = Document::build_default("alice", "a@x.io");
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("personalInfo").is_some());
        assert!(value.get("socialLinks").is_some());
        assert_eq!(value["experience"]["sectionTitle"], "Experience");
        assert_eq!(value["modules"], serde_json::json!(["personal_info"]));
        assert_eq!(value["theme"]["colors"]["bgWhite"], "#ffffff");
        assert!(value["personalInfo"]["profileImagePath"].is_null());
    }

    #[test]
    fn test_modules_normalised_on_deserialize() {
        let modules: Modules =
            serde_json::from_str(r#"["skills", "experience", "skills"]"#).unwrap();
        assert_eq!(
            modules.as_slice(),
            &[Module::PersonalInfo, Module::Skills, Module::Experience]
        );
    }

    #[test]
    fn test_unknown_module_rejected() {
        let result: Result<Modules, _> = serde_json::from_str(r#"["personal_info", "blog"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_personal_info_cannot_be_disabled() {
        let mut modules = Modules::default();
        assert!(!modules.disable(Module::PersonalInfo));
        assert!(modules.enable(Module::Projects));
        assert!(!modules.enable(Module::Projects));
        assert!(modules.disable(Module::Projects));
        assert_eq!(modules.as_slice(), &[Module::PersonalInfo]);
    }

    #[test]
    fn test_module_from_str_accepts_kebab_case() {
        assert_eq!("social-links".parse::<Module>().unwrap(), Module::SocialLinks);
        assert_eq!("Experience".parse::<Module>().unwrap(), Module::Experience);
        assert!("resume".parse::<Module>().is_err());
    }

    #[test]
    fn test_legacy_keys_and_missing_ids() {
        let raw = r#"{
            "personalInfo": {"name": "a", "email": "a@x.io", "profileImage": ""},
            "modules": ["personal_info", "certificates"],
            "certificates": {"items": [{"title": "AWS", "issuer": "Amazon", "date": "2023", "image": "certificates/aws.png", "pdf": ""}]},
            "skills": {"categories": [{"title": "Langs", "icon": "💻", "items": "Rust, Go"}]}
        }"#;
        let doc: Document = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.personal_info.profile_image_path, None);
        let cert = &doc.certificates.items[0];
        assert_eq!(cert.image_path.as_deref(), Some("certificates/aws.png"));
        assert_eq!(cert.pdf_path, None);
        assert!(!cert.id.is_nil());
        assert_eq!(doc.certificates.section_title, "Certifications");
        assert_eq!(doc.skills.categories[0].icon, SkillIcon::Computer);
        assert_eq!(doc.skills.categories[0].skill_list(), vec!["Rust", "Go"]);
    }

    #[test]
    fn test_theme_swatches_round_trip() {
        let mut doc = Document::build_default("a", "a@x.io");
        doc.theme
            .colors
            .swatches
            .insert("highlight".to_string(), "#ff0000".to_string());
        let text = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.theme.colors.swatch("highlight"), "#ff0000");
    }

    #[test]
    fn test_skill_icon_emoji_matches_serialized_form() {
        for icon in SkillIcon::ALL {
            let text = serde_json::to_string(&icon).unwrap();
            assert_eq!(text, format!("\"{}\"", icon.emoji()));
        }
    }
}
