//! PDF export built straight from document fields.
//!
//! Emits an uncompressed PDF 1.4 file using two of the standard base-14 fonts,
//! so nothing has to be embedded. Text is laid out with the static width
//! tables in `font_metrics`: greedy word wrap, a y-cursor per page and a new
//! page whenever the next line would cross the bottom margin.
//!
//! Strings are written in WinAnsiEncoding. Characters outside Latin-1 (plus a
//! few WinAnsi punctuation marks) cannot be shown by the base fonts and are
//! dropped.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use super::font_metrics::{get_metrics, FontFamily};
use super::{visible_sections, ExportFormat, RenderError, Renderer};
use crate::models::portfolio::{Document, Module, Template, ThemeColors, DEFAULT_PRIMARY};
use crate::store::AssetStore;

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
        })
    }
}

impl FromStr for PageSize {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" | "us-letter" => Ok(PageSize::Letter),
            other => Err(RenderError::Pdf(format!("unknown page size '{other}'"))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template styles
// ────────────────────────────────────────────────────────────────────────────

type Rgb = (f32, f32, f32);

/// Parses `#rrggbb` or `#rgb` into 0..=1 components.
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let hex = value.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| {
        u8::from_str_radix(expanded.get(i..i + 2)?, 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn color_or_default(value: &str) -> Rgb {
    parse_hex_color(value)
        .or_else(|| parse_hex_color(DEFAULT_PRIMARY))
        .unwrap_or((0.0, 0.0, 0.0))
}

struct Style {
    regular: FontFamily,
    bold: FontFamily,
    title_size: f32,
    heading_size: f32,
    body_size: f32,
    meta_size: f32,
    margin: f32,
    /// Baseline-to-baseline distance as a multiple of font size.
    leading: f32,
    section_gap: f32,
    heading: Rgb,
    rule: Rgb,
    text: Rgb,
    muted: Rgb,
    link: Rgb,
}

impl Style {
    fn for_theme(template: Template, colors: &ThemeColors) -> Self {
        let text = color_or_default(colors.swatch("textDark"));
        let muted = color_or_default(colors.swatch("textLight"));
        let primary = color_or_default(&colors.primary);
        match template {
            Template::Modern => Style {
                regular: FontFamily::Helvetica,
                bold: FontFamily::HelveticaBold,
                title_size: 22.0,
                heading_size: 14.0,
                body_size: 10.5,
                meta_size: 9.0,
                margin: 50.0,
                leading: 1.35,
                section_gap: 14.0,
                heading: primary,
                rule: color_or_default(&colors.accent),
                text,
                muted,
                link: primary,
            },
            Template::Classic => Style {
                regular: FontFamily::TimesRoman,
                bold: FontFamily::TimesBold,
                title_size: 24.0,
                heading_size: 14.0,
                body_size: 11.0,
                meta_size: 10.0,
                margin: 60.0,
                leading: 1.3,
                section_gap: 16.0,
                heading: color_or_default(colors.swatch("primaryDark")),
                rule: text,
                text,
                muted,
                link: color_or_default(colors.swatch("primaryDark")),
            },
            Template::Compact => Style {
                regular: FontFamily::Helvetica,
                bold: FontFamily::HelveticaBold,
                title_size: 16.0,
                heading_size: 11.5,
                body_size: 9.0,
                meta_size: 8.0,
                margin: 36.0,
                leading: 1.25,
                section_gap: 8.0,
                heading: primary,
                rule: color_or_default(&colors.accent),
                text,
                muted,
                link: primary,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text encoding
// ────────────────────────────────────────────────────────────────────────────

/// WinAnsi code for characters the base fonts can show, `None` otherwise.
fn win_ansi(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{a0}'..='\u{ff}' => Some(c as u32 as u8),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201c}' => Some(0x93),
        '\u{201d}' => Some(0x94),
        _ => None,
    }
}

/// Keeps only characters `win_ansi` can encode. Whitespace becomes a space.
pub fn printable(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else {
                win_ansi(c).map(|_| c)
            }
        })
        .collect()
}

/// Encodes text as the body of a PDF literal string.
pub fn encode_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            c if c.is_whitespace() => out.push(' '),
            _ => match win_ansi(c) {
                Some(code) if code.is_ascii() => out.push(c),
                Some(code) => out.push_str(&format!("\\{code:03o}")),
                None => {}
            },
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Page layout
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Weight {
    Regular,
    Bold,
}

impl Weight {
    fn resource(&self) -> &'static str {
        match self {
            Weight::Regular => "F1",
            Weight::Bold => "F2",
        }
    }
}

struct Layout<'a> {
    style: &'a Style,
    width: f32,
    height: f32,
    pages: Vec<String>,
    current: String,
    y: f32,
}

impl<'a> Layout<'a> {
    fn new(style: &'a Style, page_size: PageSize) -> Self {
        let (width, height) = page_size.dimensions();
        Self {
            style,
            width,
            height,
            pages: Vec::new(),
            current: String::new(),
            y: height - style.margin,
        }
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.style.margin
    }

    fn font(&self, weight: Weight) -> FontFamily {
        match weight {
            Weight::Regular => self.style.regular,
            Weight::Bold => self.style.bold,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.height - self.style.margin;
    }

    /// Starts a new page unless `needed` points still fit above the margin.
    fn ensure_space(&mut self, needed: f32) {
        let at_top = self.y >= self.height - self.style.margin;
        if !at_top && self.y - needed < self.style.margin {
            self.new_page();
        }
    }

    fn space(&mut self, points: f32) {
        self.y -= points;
    }

    fn emit_text(&mut self, weight: Weight, size: f32, color: Rgb, x: f32, baseline: f32, text: &str) {
        let (r, g, b) = color;
        self.current.push_str(&format!(
            "BT /{} {size:.2} Tf {r:.3} {g:.3} {b:.3} rg {x:.2} {baseline:.2} Td ({}) Tj ET\n",
            weight.resource(),
            encode_pdf_string(text)
        ));
    }

    /// Writes one pre-wrapped line at `indent` from the left margin.
    fn line(&mut self, weight: Weight, size: f32, color: Rgb, indent: f32, text: &str) {
        let advance = size * self.style.leading;
        self.ensure_space(advance);
        let baseline = self.y - size;
        let x = self.style.margin + indent;
        self.emit_text(weight, size, color, x, baseline, text);
        self.y -= advance;
    }

    /// Word-wraps `text` into the column starting at `indent`.
    fn paragraph(&mut self, weight: Weight, size: f32, color: Rgb, indent: f32, text: &str) {
        let text = printable(text);
        let max_em = (self.content_width() - indent) / size;
        for line in get_metrics(&self.font(weight)).wrap(&text, max_em) {
            self.line(weight, size, color, indent, &line);
        }
    }

    /// A bullet with a hanging indent for the wrapped continuation lines.
    fn bullet(&mut self, size: f32, color: Rgb, text: &str) {
        let text = printable(text);
        let hang = size * 1.2;
        let max_em = (self.content_width() - hang) / size;
        let lines = get_metrics(&self.font(Weight::Regular)).wrap(&text, max_em);
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                let advance = size * self.style.leading;
                self.ensure_space(advance);
                let baseline = self.y - size;
                self.emit_text(Weight::Regular, size, color, self.style.margin, baseline, "\u{2022}");
            }
            self.line(Weight::Regular, size, color, hang, line);
        }
    }

    fn rule(&mut self, color: Rgb) {
        let (r, g, b) = color;
        let x1 = self.style.margin;
        let x2 = self.width - self.style.margin;
        let y = self.y;
        self.current.push_str(&format!(
            "{r:.3} {g:.3} {b:.3} RG 0.75 w {x1:.2} {y:.2} m {x2:.2} {y:.2} l S\n"
        ));
        self.y -= 6.0;
    }

    fn heading(&mut self, title: &str) {
        let style = self.style;
        // Keep the heading together with at least one body line.
        self.ensure_space(style.heading_size * style.leading + style.body_size * style.leading * 2.0 + 6.0);
        self.line(Weight::Bold, style.heading_size, style.heading, 0.0, title);
        self.rule(style.rule);
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document content
// ────────────────────────────────────────────────────────────────────────────

fn layout_document(doc: &Document, style: &Style, page_size: PageSize) -> Vec<String> {
    let mut page = Layout::new(style, page_size);
    let info = &doc.personal_info;

    page.paragraph(Weight::Bold, style.title_size, style.heading, 0.0, &info.title);
    page.paragraph(Weight::Bold, style.body_size + 2.0, style.text, 0.0, &info.name);
    if !info.email.is_empty() {
        page.paragraph(Weight::Regular, style.meta_size, style.muted, 0.0, &info.email);
    }
    if !info.summary.is_empty() {
        page.space(4.0);
        page.paragraph(Weight::Regular, style.body_size, style.text, 0.0, &info.summary);
    }
    if !info.about.is_empty() {
        page.space(4.0);
        page.paragraph(Weight::Regular, style.body_size, style.text, 0.0, &info.about);
    }

    for module in visible_sections(doc) {
        page.space(style.section_gap);
        page.heading(doc.section_title(module));
        layout_section(&mut page, doc, module);
    }

    page.space(style.section_gap);
    page.line(Weight::Regular, style.meta_size, style.muted, 0.0, "Built with Folio");
    page.finish()
}

fn layout_section(page: &mut Layout<'_>, doc: &Document, module: Module) {
    let style = page.style;
    let body = style.body_size;
    match module {
        Module::PersonalInfo => {}
        Module::Experience => {
            for item in &doc.experience.items {
                let headline = format!("{} at {}", item.title, item.company);
                page.paragraph(Weight::Bold, body, style.text, 0.0, &headline);
                page.paragraph(Weight::Regular, style.meta_size, style.muted, 0.0, &item.period);
                for line in &item.description {
                    page.bullet(body, style.text, line);
                }
                page.space(body * 0.5);
            }
        }
        Module::Skills => {
            for category in &doc.skills.categories {
                page.paragraph(Weight::Bold, body, style.text, 0.0, &category.title);
                page.paragraph(
                    Weight::Regular,
                    body,
                    style.text,
                    0.0,
                    &category.skill_list().join(", "),
                );
                page.space(body * 0.3);
            }
        }
        Module::Projects => {
            for item in &doc.projects.items {
                page.paragraph(Weight::Bold, body, style.text, 0.0, &item.title);
                if let Some(url) = &item.url {
                    page.paragraph(Weight::Regular, style.meta_size, style.link, 0.0, url);
                }
                if !item.description.is_empty() {
                    page.paragraph(Weight::Regular, body, style.text, 0.0, &item.description);
                }
                page.space(body * 0.5);
            }
        }
        Module::Education => {
            for item in &doc.education.items {
                page.paragraph(Weight::Bold, body, style.text, 0.0, &item.title);
                page.paragraph(Weight::Regular, style.meta_size, style.muted, 0.0, &item.period);
                if !item.description.is_empty() {
                    page.paragraph(Weight::Regular, body, style.text, 0.0, &item.description);
                }
                page.space(body * 0.5);
            }
        }
        Module::Certificates => {
            for cert in &doc.certificates.items {
                page.paragraph(Weight::Bold, body, style.text, 0.0, &cert.title);
                let issuer = format!("Issuer: {}", cert.issuer);
                page.paragraph(Weight::Regular, body, style.text, 0.0, &issuer);
                if !cert.date.is_empty() {
                    let date = format!("Date: {}", cert.date);
                    page.paragraph(Weight::Regular, style.meta_size, style.muted, 0.0, &date);
                }
                page.space(body * 0.5);
            }
        }
        Module::SocialLinks => {
            for link in &doc.social_links {
                let text = format!("{}: {}", link.name.name(), link.url);
                page.paragraph(Weight::Regular, body, style.link, 0.0, &text);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// File assembly
// ────────────────────────────────────────────────────────────────────────────

/// Serializes page content streams into a complete PDF with a valid xref table.
fn assemble(pages: &[String], style: &Style, page_size: PageSize) -> Vec<u8> {
    let (width, height) = page_size.dimensions();
    let page_count = pages.len();
    // 1 catalog, 2 pages, 3-4 fonts, then a (page, content) pair per page.
    let object_count = 4 + 2 * page_count;
    let page_id = |i: usize| 5 + 2 * i;

    let mut out: Vec<u8> = Vec::with_capacity(4096 + pages.iter().map(String::len).sum::<usize>());
    let mut offsets = Vec::with_capacity(object_count);
    out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

    let mut object = |out: &mut Vec<u8>, body: &[u8]| {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    };

    object(&mut out, b"<< /Type /Catalog /Pages 2 0 R >>");
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_id(i))).collect();
    object(
        &mut out,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            kids.join(" ")
        )
        .as_bytes(),
    );
    for font in [style.regular, style.bold] {
        object(
            &mut out,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .as_bytes(),
        );
    }
    for (i, content) in pages.iter().enumerate() {
        object(
            &mut out,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width:.2} {height:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page_id(i) + 1
            )
            .as_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content.as_bytes());
        stream.extend_from_slice(b"\nendstream");
        object(&mut out, &stream);
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", object_count + 1).as_bytes());
    for offset in &offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            object_count + 1
        )
        .as_bytes(),
    );
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfRenderer {
    page_size: PageSize,
}

impl PdfRenderer {
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }
}

impl Renderer for PdfRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    /// Images are not embedded; the PDF carries text only.
    fn render(&self, doc: &Document, _assets: &AssetStore) -> Result<Bytes, RenderError> {
        let style = Style::for_theme(doc.theme.template, &doc.theme.colors);
        let pages = layout_document(doc, &style, self.page_size);
        Ok(Bytes::from(assemble(&pages, &style, self.page_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::portfolio::ExperienceItem;
    use crate::render::test_support::full_document;
    use uuid::Uuid;

    fn render(doc: &Document, page_size: PageSize) -> String {
        let dir = tempfile::tempdir().unwrap();
        let bytes = PdfRenderer::new(page_size)
            .render(doc, &AssetStore::new(dir.path()))
            .unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_encode_escapes_and_drops() {
        assert_eq!(encode_pdf_string(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(encode_pdf_string("café"), r"caf\351");
        assert_eq!(encode_pdf_string("\u{2022} x \u{2014}"), r"\225 x \227");
        assert_eq!(encode_pdf_string("ship 🚀 it"), "ship  it");
    }

    #[test]
    fn test_printable_normalises_whitespace() {
        assert_eq!(printable("a\tb\nc 💻"), "a b c ");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffffff"), Some((1.0, 1.0, 1.0)));
        assert_eq!(parse_hex_color("#000"), Some((0.0, 0.0, 0.0)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345g"), None);
    }

    #[test]
    fn test_page_size_parse() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!("letter".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("a5".parse::<PageSize>().is_err());
    }

    #[test]
    fn test_personal_info_only_has_no_optional_headings() {
        let doc = Document::build_default("alice", "alice@example.com");
        let pdf = render(&doc, PageSize::A4);
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("(Hello! I'm alice) Tj"));
        assert!(pdf.contains("(alice@example.com) Tj"));
        assert!(pdf.contains("(Welcome to my portfolio) Tj"));
        for heading in ["Experience", "Skills", "Projects", "Education", "Certifications"] {
            assert!(!pdf.contains(&format!("({heading}) Tj")), "unexpected {heading}");
        }
        assert!(pdf.contains("(Built with Folio) Tj"));
        assert!(pdf.contains("/Count 1"));
    }

    #[test]
    fn test_full_document_sections_in_order() {
        let pdf = render(&full_document(), PageSize::A4);
        let markers = [
            "(Experience) Tj",
            "(Engineer at Acme) Tj",
            "(Skills) Tj",
            "(Rust, Go, SQL) Tj",
            "(Projects) Tj",
            "(Certifications) Tj",
            "(Issuer: Amazon) Tj",
            "(GitHub: https://github.com/alice) Tj",
            "(Built with Folio) Tj",
        ];
        let positions: Vec<usize> = markers
            .iter()
            .map(|m| pdf.find(m).unwrap_or_else(|| panic!("missing {m}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!pdf.contains("(Education) Tj"));
        assert!(pdf.contains("/BaseFont /Helvetica "));
        assert!(pdf.contains("/BaseFont /Helvetica-Bold "));
    }

    #[test]
    fn test_classic_template_uses_times() {
        let mut doc = Document::build_default("alice", "a@x.io");
        doc.theme.template = Template::Classic;
        let pdf = render(&doc, PageSize::Letter);
        assert!(pdf.contains("/BaseFont /Times-Roman "));
        assert!(pdf.contains("/BaseFont /Times-Bold "));
        assert!(pdf.contains("/MediaBox [0 0 612.00 792.00]"));
    }

    #[test]
    fn test_long_document_breaks_pages() {
        let mut doc = Document::build_default("alice", "a@x.io");
        doc.modules.enable(Module::Experience);
        for i in 0..60 {
            doc.experience.items.push(ExperienceItem {
                id: Uuid::new_v4(),
                title: format!("Role {i}"),
                company: "Acme".to_string(),
                period: "2020".to_string(),
                description: vec!["Maintained a large service with many moving parts and a long on-call rotation".to_string()],
            });
        }
        let pdf = render(&doc, PageSize::A4);
        let count: usize = pdf
            .split("/Count ")
            .nth(1)
            .and_then(|rest| rest.split(' ').next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(count > 1, "expected several pages, got {count}");
        assert!(pdf.contains("(Role 59 at Acme) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = PdfRenderer::new(PageSize::A4)
            .render(&full_document(), &AssetStore::new(dir.path()))
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(bytes[startxref..].starts_with(b"xref\n"));

        let table = std::str::from_utf8(&bytes[startxref..]).unwrap();
        let entries: Vec<usize> = table
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert!(entries.len() >= 6);
        for (i, offset) in entries.iter().enumerate() {
            let header = format!("{} 0 obj", i + 1);
            assert!(
                bytes[*offset..].starts_with(header.as_bytes()),
                "object {} misplaced",
                i + 1
            );
        }
    }
}
