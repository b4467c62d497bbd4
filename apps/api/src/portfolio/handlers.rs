use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::SessionContext;
use crate::errors::AppError;
use crate::models::portfolio::{Document, Module, Modules, PersonalInfo, Theme};
use crate::portfolio::editing::{apply_item_op, set_section_meta, ItemOp, ItemOpOutcome, SectionMeta};
use crate::portfolio::validation::{validate_document, ValidationReport};
use crate::render::{renderer_for, ExportFormat};
use crate::session::Session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PortfolioView {
    pub document: Document,
    /// Unsaved edits present in the working copy.
    pub dirty: bool,
    pub validation: ValidationReport,
}

impl PortfolioView {
    fn of(session: &Session) -> Self {
        Self {
            validation: validate_document(&session.draft),
            document: session.draft.clone(),
            dirty: session.dirty,
        }
    }
}

#[derive(Serialize)]
pub struct ItemOpResponse {
    #[serde(flatten)]
    pub outcome: ItemOpOutcome,
    pub validation: ValidationReport,
}

#[derive(Deserialize)]
pub struct ModulesRequest {
    pub modules: Vec<Module>,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub to_index: usize,
}

fn parse_section(section: &str) -> Result<Module, AppError> {
    section
        .parse::<Module>()
        .map_err(|e| AppError::NotFound(e.to_string()))
}

fn with_session<R>(
    state: &AppState,
    ctx: &SessionContext,
    f: impl FnOnce(&mut Session) -> R,
) -> Result<R, AppError> {
    state
        .sessions
        .with_session(&ctx.token, f)
        .ok_or(AppError::Unauthorized)
}

/// Applies `edit` to the working copy. The draft is only marked dirty and
/// kept when the edit succeeds.
fn edit_draft<R>(
    state: &AppState,
    ctx: &SessionContext,
    edit: impl FnOnce(&mut Document) -> Result<R, AppError>,
) -> Result<(R, ValidationReport), AppError> {
    with_session(state, ctx, |session| {
        let mut draft = session.draft.clone();
        let out = edit(&mut draft)?;
        let report = validate_document(&draft);
        session.draft = draft;
        session.dirty = true;
        Ok((out, report))
    })?
}

/// GET /api/v1/portfolio
pub async fn handle_get_portfolio(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<PortfolioView>, AppError> {
    let view = with_session(&state, &ctx, |session| PortfolioView::of(session))?;
    Ok(Json(view))
}

/// POST /api/v1/portfolio/save
///
/// Commits the working copy. With enforcement on, a failing validation
/// report is returned as 422 and nothing is written.
pub async fn handle_save(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<PortfolioView>, AppError> {
    let draft = with_session(&state, &ctx, |session| session.draft.clone())?;
    let report = validate_document(&draft);
    if state.config.enforce_validation && !report.passed {
        return Err(AppError::ValidationFailed(report));
    }

    let credentials = state.credentials.clone();
    let username = ctx.username.clone();
    let saved = draft.clone();
    state
        .blocking(move || Ok(credentials.replace_document(&username, &saved)?))
        .await?;

    let view = with_session(&state, &ctx, |session| {
        // A concurrent edit on the same session keeps the draft dirty.
        if session.draft == draft {
            session.dirty = false;
        }
        PortfolioView::of(session)
    })?;
    info!(
        "Saved portfolio for {} ({} issues)",
        ctx.username,
        view.validation.issues.len()
    );
    Ok(Json(view))
}

/// POST /api/v1/portfolio/revert
pub async fn handle_revert(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<PortfolioView>, AppError> {
    let credentials = state.credentials.clone();
    let username = ctx.username.clone();
    let committed = state
        .blocking(move || Ok(credentials.get_document(&username)?))
        .await?;

    let view = with_session(&state, &ctx, |session| {
        session.draft = committed;
        session.dirty = false;
        PortfolioView::of(session)
    })?;
    debug!("Reverted working copy for {}", ctx.username);
    Ok(Json(view))
}

/// PUT /api/v1/portfolio/personal-info
pub async fn handle_put_personal_info(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(info): Json<PersonalInfo>,
) -> Result<Json<ValidationReport>, AppError> {
    let ((), report) = edit_draft(&state, &ctx, |doc| {
        doc.personal_info = info;
        Ok(())
    })?;
    Ok(Json(report))
}

/// PUT /api/v1/portfolio/modules
///
/// Order of first appearance is kept; `personal_info` is always enabled.
pub async fn handle_put_modules(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(req): Json<ModulesRequest>,
) -> Result<Json<Modules>, AppError> {
    let (modules, _) = edit_draft(&state, &ctx, |doc| {
        doc.modules = Modules::from(req.modules);
        Ok(doc.modules.clone())
    })?;
    Ok(Json(modules))
}

/// PUT /api/v1/portfolio/modules/:module
///
/// Disabling `personal_info` is a no-op.
pub async fn handle_toggle_module(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(module): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<Modules>, AppError> {
    let module = parse_section(&module)?;
    let (modules, _) = edit_draft(&state, &ctx, |doc| {
        if req.enabled {
            doc.modules.enable(module);
        } else {
            doc.modules.disable(module);
        }
        Ok(doc.modules.clone())
    })?;
    Ok(Json(modules))
}

/// PUT /api/v1/portfolio/theme
pub async fn handle_put_theme(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(theme): Json<Theme>,
) -> Result<Json<Theme>, AppError> {
    let (theme, _) = edit_draft(&state, &ctx, |doc| {
        doc.theme = theme;
        Ok(doc.theme.clone())
    })?;
    Ok(Json(theme))
}

/// PUT /api/v1/portfolio/sections/:section
pub async fn handle_put_section_meta(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(section): Path<String>,
    Json(meta): Json<SectionMeta>,
) -> Result<Json<ValidationReport>, AppError> {
    let module = parse_section(&section)?;
    let ((), report) = edit_draft(&state, &ctx, |doc| {
        Ok(set_section_meta(doc, module, meta)?)
    })?;
    Ok(Json(report))
}

async fn item_op(
    state: &AppState,
    ctx: &SessionContext,
    section: &str,
    op: ItemOp,
) -> Result<Json<ItemOpResponse>, AppError> {
    let module = parse_section(section)?;
    let (outcome, validation) =
        edit_draft(state, ctx, |doc| Ok(apply_item_op(doc, module, op)?))?;
    Ok(Json(ItemOpResponse {
        outcome,
        validation,
    }))
}

/// POST /api/v1/portfolio/sections/:section/items
pub async fn handle_append_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(section): Path<String>,
    Json(item): Json<Value>,
) -> Result<(StatusCode, Json<ItemOpResponse>), AppError> {
    let response = item_op(&state, &ctx, &section, ItemOp::Append(item)).await?;
    Ok((StatusCode::CREATED, response))
}

/// PUT /api/v1/portfolio/sections/:section/items/:id
pub async fn handle_replace_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((section, id)): Path<(String, Uuid)>,
    Json(item): Json<Value>,
) -> Result<Json<ItemOpResponse>, AppError> {
    item_op(&state, &ctx, &section, ItemOp::Replace(id, item)).await
}

/// DELETE /api/v1/portfolio/sections/:section/items/:id
pub async fn handle_remove_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((section, id)): Path<(String, Uuid)>,
) -> Result<Json<ItemOpResponse>, AppError> {
    item_op(&state, &ctx, &section, ItemOp::Remove(id)).await
}

/// POST /api/v1/portfolio/sections/:section/items/:id/move
pub async fn handle_move_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((section, id)): Path<(String, Uuid)>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<ItemOpResponse>, AppError> {
    item_op(&state, &ctx, &section, ItemOp::Move(id, req.to_index)).await
}

/// `{username}_portfolio.{ext}` reduced to characters that are safe inside a
/// quoted Content-Disposition filename.
fn download_filename(username: &str, extension: &str) -> String {
    let stem: String = username
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' '..='~' => c,
            _ => '_',
        })
        .collect();
    format!("{stem}_portfolio.{extension}")
}

/// GET /api/v1/portfolio/export/:format
///
/// Exports the committed document, not the working copy.
pub async fn handle_export(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(format): Path<String>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    let renderer = renderer_for(format, state.config.pdf_page_size);
    let content_type = renderer.content_type();
    let filename = download_filename(&ctx.username, renderer.file_extension());

    let credentials = state.credentials.clone();
    let assets = state.assets.clone();
    let username = ctx.username.clone();
    let body = state
        .blocking(move || {
            let doc = credentials.get_document(&username)?;
            Ok(renderer.render(&doc, &assets)?)
        })
        .await?;

    let disposition = match format {
        ExportFormat::Html => format!("inline; filename=\"{filename}\""),
        ExportFormat::Json | ExportFormat::Pdf => format!("attachment; filename=\"{filename}\""),
    };
    let disposition = HeaderValue::from_str(&disposition).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("invalid Content-Disposition header: {e}"))
    })?;

    info!("Exported {format} for {} ({} bytes)", ctx.username, body.len());
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_filename_plain() {
        assert_eq!(download_filename("alice", "pdf"), "alice_portfolio.pdf");
    }

    #[test]
    fn test_download_filename_is_header_safe() {
        let name = download_filename("Jos\u{e9} \"O'Neil\"", "json");
        assert_eq!(name, "Jos_ _O'Neil__portfolio.json");
        assert!(HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")).is_ok());
    }
}
