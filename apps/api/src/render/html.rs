//! Self-contained HTML export.
//!
//! One file, no external requests: CSS is inlined from the theme and every
//! readable asset is embedded as a base64 data URI.

use base64ct::{Base64, Encoding};
use bytes::Bytes;
use tracing::warn;

use super::{visible_sections, ExportFormat, RenderError, Renderer};
use crate::models::portfolio::{Document, Module, Template, ThemeColors};
use crate::store::assets::extension_of;
use crate::store::AssetStore;

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, doc: &Document, assets: &AssetStore) -> Result<Bytes, RenderError> {
        Ok(Bytes::from(render_page(doc, assets)))
    }
}

/// Escapes text for element content and double-quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn mime_for(path: &str) -> Option<&'static str> {
    match extension_of(path)?.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Reads an asset and encodes it as a data URI. `None` (with a warning) when
/// the file is unreadable or of an unknown type.
fn data_uri(assets: &AssetStore, path: &str) -> Option<String> {
    let Some(mime) = mime_for(path) else {
        warn!("Skipping asset {path}: unsupported file type");
        return None;
    };
    match assets.read(path) {
        Ok(bytes) => Some(format!(
            "data:{mime};base64,{}",
            Base64::encode_string(&bytes)
        )),
        Err(e) => {
            warn!("Skipping asset {path}: {e}");
            None
        }
    }
}

fn section_icon(module: Module) -> &'static str {
    match module {
        Module::PersonalInfo => "",
        Module::Experience => "💼",
        Module::Skills => "🛠️",
        Module::Projects => "📁",
        Module::Education => "🎓",
        Module::Certificates => "🏆",
        Module::SocialLinks => "🔗",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ────────────────────────────────────────────────────────────────────────────

fn stylesheet(colors: &ThemeColors, template: Template) -> String {
    let primary = escape_css(&colors.primary);
    let secondary = escape_css(&colors.secondary);
    let accent = escape_css(&colors.accent);
    let primary_dark = escape_css(colors.swatch("primaryDark"));
    let text_dark = escape_css(colors.swatch("textDark"));
    let text_light = escape_css(colors.swatch("textLight"));
    let bg_light = escape_css(colors.swatch("bgLight"));
    let bg_white = escape_css(colors.swatch("bgWhite"));

    let base = format!(
        ":root {{ --primary: {primary}; --primary-dark: {primary_dark}; --secondary: {secondary}; \
         --accent: {accent}; --text-dark: {text_dark}; --text-light: {text_light}; \
         --bg-light: {bg_light}; --bg-white: {bg_white}; }}\n\
         * {{ box-sizing: border-box; }}\n\
         body {{ margin: 0; color: var(--text-dark); background: var(--bg-light); }}\n\
         main {{ max-width: 960px; margin: 0 auto; padding: 24px; background: var(--bg-white); }}\n\
         a {{ color: var(--primary); }}\n\
         .muted {{ color: var(--text-light); }}\n\
         .avatar {{ width: 160px; height: 160px; object-fit: cover; border-radius: 50%; }}\n\
         .section-image {{ max-width: 100%; border-radius: 8px; }}\n\
         .badge {{ display: inline-block; background: #e0e7ff; color: var(--primary-dark); \
         padding: 4px 12px; border-radius: 20px; font-size: 13px; margin: 4px; font-weight: 500; }}\n\
         .cert {{ display: flex; gap: 16px; border: 1px solid #e2e8f0; border-radius: 8px; \
         padding: 12px; margin-bottom: 12px; }}\n\
         .cert img {{ width: 150px; object-fit: contain; }}\n\
         .social {{ text-align: center; }}\n\
         .social a {{ display: inline-block; margin: 8px 12px; text-decoration: none; font-size: 24px; }}\n\
         footer {{ text-align: center; color: #888; font-size: 14px; padding: 20px; }}\n"
    );

    let variant = match template {
        Template::Modern => "body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; }\n\
             header.hero { background: linear-gradient(135deg, var(--primary), var(--secondary)); \
             color: var(--bg-white); padding: 32px; border-radius: 12px; display: flex; gap: 24px; \
             align-items: center; }\n\
             header.hero .muted { color: var(--bg-light); }\n\
             h2 { color: var(--primary); border-bottom: 2px solid var(--accent); padding-bottom: 4px; }\n\
             section { margin-top: 32px; }\n",
        Template::Classic => "body { font-family: Georgia, 'Times New Roman', serif; }\n\
             header.hero { display: grid; grid-template-columns: 180px 1fr; gap: 24px; \
             border-bottom: 3px double var(--primary-dark); padding-bottom: 16px; }\n\
             h2 { font-variant: small-caps; color: var(--primary-dark); }\n\
             section { display: grid; grid-template-columns: 180px 1fr; gap: 16px; margin-top: 24px; }\n\
             section > h2 { margin: 0; }\n",
        Template::Compact => "body { font-family: Helvetica, Arial, sans-serif; font-size: 13px; }\n\
             main { padding: 12px; }\n\
             header.hero { display: flex; gap: 12px; align-items: center; }\n\
             .avatar { width: 72px; height: 72px; }\n\
             h1 { font-size: 20px; margin: 0; }\n\
             h2 { font-size: 15px; color: var(--primary); margin: 16px 0 4px; }\n\
             h3 { font-size: 13px; margin: 6px 0 2px; }\n\
             p, ul { margin: 2px 0; }\n",
    };

    format!("{base}{variant}")
}

/// Theme colors are free text; keep them from closing the declaration.
fn escape_css(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Page
// ────────────────────────────────────────────────────────────────────────────

fn render_page(doc: &Document, assets: &AssetStore) -> String {
    let info = &doc.personal_info;
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&info.name)));
    html.push_str(&format!(
        "<style>\n{}</style>\n</head>\n",
        stylesheet(&doc.theme.colors, doc.theme.template)
    ));
    html.push_str(&format!(
        "<body class=\"template-{}\">\n<main>\n",
        doc.theme.template.key()
    ));

    render_header(&mut html, doc, assets);
    for module in visible_sections(doc) {
        render_section(&mut html, doc, module, assets);
    }

    html.push_str("<footer>Built with ❤️ using Folio</footer>\n</main>\n</body>\n</html>\n");
    html
}

fn render_header(html: &mut String, doc: &Document, assets: &AssetStore) {
    let info = &doc.personal_info;
    html.push_str("<header class=\"hero\" id=\"personal_info\">\n");
    if let Some(uri) = info
        .profile_image_path
        .as_deref()
        .and_then(|path| data_uri(assets, path))
    {
        html.push_str(&format!(
            "<img class=\"avatar\" src=\"{uri}\" alt=\"{}\">\n",
            escape(&info.name)
        ));
    }
    html.push_str("<div>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(&info.title)));
    html.push_str(&format!("<p class=\"name\">{}</p>\n", escape(&info.name)));
    if !info.email.is_empty() {
        html.push_str(&format!(
            "<p class=\"muted\">📧 <a href=\"mailto:{0}\">{0}</a></p>\n",
            escape(&info.email)
        ));
    }
    if !info.summary.is_empty() {
        html.push_str(&format!(
            "<p class=\"summary\">{}</p>\n",
            escape(&info.summary)
        ));
    }
    if !info.about.is_empty() {
        html.push_str(&format!("<p class=\"about\">{}</p>\n", escape(&info.about)));
    }
    html.push_str("</div>\n</header>\n");
}

fn section_image(html: &mut String, path: Option<&str>, assets: &AssetStore) {
    if let Some(uri) = path.and_then(|p| data_uri(assets, p)) {
        html.push_str(&format!(
            "<img class=\"section-image\" src=\"{uri}\" alt=\"\">\n"
        ));
    }
}

fn render_section(html: &mut String, doc: &Document, module: Module, assets: &AssetStore) {
    html.push_str(&format!(
        "<section id=\"{}\">\n<h2>{} {}</h2>\n<div class=\"body\">\n",
        module.key(),
        section_icon(module),
        escape(doc.section_title(module))
    ));

    match module {
        Module::PersonalInfo => {}
        Module::Experience => {
            section_image(html, doc.experience.section_image_path.as_deref(), assets);
            for item in &doc.experience.items {
                html.push_str(&format!(
                    "<article>\n<h3>{} at {}</h3>\n<p class=\"muted\"><em>{}</em></p>\n",
                    escape(&item.title),
                    escape(&item.company),
                    escape(&item.period)
                ));
                if !item.description.is_empty() {
                    html.push_str("<ul>\n");
                    for line in &item.description {
                        html.push_str(&format!("<li>{}</li>\n", escape(line)));
                    }
                    html.push_str("</ul>\n");
                }
                html.push_str("</article>\n");
            }
        }
        Module::Skills => {
            section_image(html, doc.skills.section_image_path.as_deref(), assets);
            for category in &doc.skills.categories {
                html.push_str(&format!(
                    "<h3>{} {}</h3>\n<div class=\"badges\">",
                    category.icon.emoji(),
                    escape(&category.title)
                ));
                for skill in category.skill_list() {
                    html.push_str(&format!("<span class=\"badge\">{}</span>", escape(skill)));
                }
                html.push_str("</div>\n");
            }
        }
        Module::Projects => {
            for item in &doc.projects.items {
                match &item.url {
                    Some(url) => html.push_str(&format!(
                        "<h3><a href=\"{}\">{}</a></h3>\n",
                        escape(url),
                        escape(&item.title)
                    )),
                    None => html.push_str(&format!("<h3>{}</h3>\n", escape(&item.title))),
                }
                if !item.description.is_empty() {
                    html.push_str(&format!("<p>{}</p>\n", escape(&item.description)));
                }
            }
        }
        Module::Education => {
            section_image(html, doc.education.section_image_path.as_deref(), assets);
            for item in &doc.education.items {
                html.push_str(&format!(
                    "<h3>{}</h3>\n<p class=\"muted\"><em>{}</em></p>\n",
                    escape(&item.title),
                    escape(&item.period)
                ));
                if !item.description.is_empty() {
                    html.push_str(&format!("<p>{}</p>\n", escape(&item.description)));
                }
            }
        }
        Module::Certificates => {
            for cert in &doc.certificates.items {
                html.push_str("<div class=\"cert\">\n");
                if let Some(uri) = cert
                    .image_path
                    .as_deref()
                    .and_then(|path| data_uri(assets, path))
                {
                    html.push_str(&format!(
                        "<img src=\"{uri}\" alt=\"{}\">\n",
                        escape(&cert.title)
                    ));
                }
                html.push_str(&format!(
                    "<div>\n<h3>🏅 {}</h3>\n<p><strong>Issuer:</strong> {}</p>\n",
                    escape(&cert.title),
                    escape(&cert.issuer)
                ));
                if !cert.date.is_empty() {
                    html.push_str(&format!(
                        "<p><strong>Date:</strong> 📅 {}</p>\n",
                        escape(&cert.date)
                    ));
                }
                if let Some(uri) = cert
                    .pdf_path
                    .as_deref()
                    .and_then(|path| data_uri(assets, path))
                {
                    html.push_str(&format!(
                        "<p><a href=\"{uri}\" download=\"{}.pdf\">📥 Download certificate</a></p>\n",
                        escape(&cert.title)
                    ));
                }
                html.push_str("</div>\n</div>\n");
            }
        }
        Module::SocialLinks => {
            html.push_str("<div class=\"social\">");
            for link in &doc.social_links {
                html.push_str(&format!(
                    "<a href=\"{}\" title=\"{}\">{}</a>",
                    escape(&link.url),
                    link.name.name(),
                    link.name.glyph()
                ));
            }
            html.push_str("</div>\n");
        }
    }

    html.push_str("</div>\n</section>\n");
}
