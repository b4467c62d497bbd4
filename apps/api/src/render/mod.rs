// Export renderers. Each format sits behind the `Renderer` trait so handlers
// pick one at runtime from the `:format` path segment.
//
// Rendering is CPU-bound and may read assets from disk, so callers run it
// inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod html;
pub mod json;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::portfolio::{Document, Module};
use crate::store::AssetStore;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use pdf::{PageSize, PdfRenderer};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown export format '{0}'")]
    UnknownFormat(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Html,
    Pdf,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(RenderError::UnknownFormat(s.to_string())),
        }
    }
}

/// Produces one export format from a document.
///
/// Implementations never fail on a missing or unreadable asset; the element
/// is omitted and a warning logged.
pub trait Renderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;

    fn render(&self, doc: &Document, assets: &AssetStore) -> Result<Bytes, RenderError>;
}

pub fn renderer_for(format: ExportFormat, page_size: PageSize) -> Box<dyn Renderer> {
    match format {
        ExportFormat::Json => Box::new(JsonRenderer),
        ExportFormat::Html => Box::new(HtmlRenderer),
        ExportFormat::Pdf => Box::new(PdfRenderer::new(page_size)),
    }
}

/// Optional sections to render, in catalog order: enabled and non-empty.
pub fn visible_sections(doc: &Document) -> Vec<Module> {
    Module::ALL
        .into_iter()
        .filter(|module| !module.is_required())
        .filter(|module| doc.modules.contains(*module) && doc.item_count(*module) > 0)
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use uuid::Uuid;

    use crate::models::portfolio::{
        CertificateItem, Document, ExperienceItem, Module, ProjectItem, SkillCategory, SkillIcon,
        SocialLink, SocialPlatform,
    };

    /// A document with every optional section enabled and populated.
    pub fn full_document() -> Document {
        let mut doc = Document::build_default("alice", "alice@example.com");
        doc.personal_info.name = "Alice Liddell".to_string();
        doc.personal_info.about = "I build reliable backend systems.".to_string();
        for module in Module::ALL {
            doc.modules.enable(module);
        }
        doc.experience.items.push(ExperienceItem {
            id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            period: "2020 - 2022".to_string(),
            description: vec![
                "Built things".to_string(),
                "Shipped the <billing> service & on-call tooling".to_string(),
            ],
        });
        doc.skills.categories.push(SkillCategory {
            id: Uuid::new_v4(),
            title: "Languages".to_string(),
            icon: SkillIcon::Computer,
            items: "Rust, Go, SQL".to_string(),
        });
        doc.projects.items.push(ProjectItem {
            id: Uuid::new_v4(),
            title: "Folio".to_string(),
            url: Some("https://example.com/folio".to_string()),
            description: "Portfolio builder".to_string(),
        });
        doc.certificates.items.push(CertificateItem {
            id: Uuid::new_v4(),
            title: "AWS Solutions Architect".to_string(),
            issuer: "Amazon".to_string(),
            date: "2023".to_string(),
            image_path: Some("certificates/missing.png".to_string()),
            pdf_path: None,
        });
        doc.social_links.push(SocialLink {
            id: Uuid::new_v4(),
            name: SocialPlatform::GitHub,
            url: "https://github.com/alice".to_string(),
        });
        doc
    }
}
