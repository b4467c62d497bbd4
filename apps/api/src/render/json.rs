use bytes::Bytes;

use super::{ExportFormat, RenderError, Renderer};
use crate::models::portfolio::Document;
use crate::store::AssetStore;

/// Lossless pretty-printed export of the whole document.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, doc: &Document, _assets: &AssetStore) -> Result<Bytes, RenderError> {
        let mut out = serde_json::to_vec_pretty(doc)?;
        out.push(b'\n');
        Ok(Bytes::from(out))
    }
}
