//! Media library page, picker and upload handlers.
//!
//! The picker's selection is kept in the session so the fragment can be
//! re-rendered with the current picks after every toggle. Opening the picker
//! starts a fresh selection in the requested mode.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Multipart, Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use vitrine_core::media::storage_path;
use vitrine_core::{MediaSelection, SelectionMode};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, RequireOperator};
use crate::models::session_keys;
use crate::platform::UploadFile;
use crate::state::AppState;
use crate::views::{MediaItemView, Notice, OperatorView};

const LOAD_FAILED: &str = "Failed to load media";

/// Accepted multipart field names for uploaded files.
const FILE_FIELDS: &[&str] = &["files[]", "files"];

// =============================================================================
// Request & Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PickerQuery {
    #[serde(default)]
    pub mode: SelectionMode,
    /// Name of the form field the picked path is written into.
    pub field: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub url: String,
    pub mode: Option<SelectionMode>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    /// Storage path of the toggled item.
    pub path: String,
    pub selected: bool,
    /// Every path currently picked, in pick order.
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// The library after the upload, newest first.
    pub data: Vec<MediaItemView>,
    pub added: usize,
    /// One message per rejected file.
    pub errors: Vec<String>,
    pub message: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Media library page template.
#[derive(Template, WebTemplate)]
#[template(path = "media/index.html")]
pub struct MediaIndexTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub nonce: String,
    pub items: Vec<MediaItemView>,
    pub notice: Option<Notice>,
}

/// Picker fragment, swapped into a modal by HTMX.
#[derive(Template, WebTemplate)]
#[template(path = "media/picker.html")]
pub struct MediaPickerTemplate {
    pub items: Vec<MediaItemView>,
    pub multiple: bool,
    pub field: String,
    pub notice: Option<Notice>,
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_selection(session: &Session) -> MediaSelection {
    session
        .get::<MediaSelection>(session_keys::MEDIA_SELECTION)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to read media selection: {e}");
            None
        })
        .unwrap_or_default()
}

/// Collect the uploaded files, skipping the empty part browsers send when no
/// file was chosen.
async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }
        let file_name = field
            .file_name()
            .map_or_else(|| "upload".to_string(), ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            continue;
        }
        files.push(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

// =============================================================================
// Handlers
// =============================================================================

/// Media library page.
#[instrument(skip(operator, state, nonce))]
pub async fn index(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
) -> MediaIndexTemplate {
    let (items, notice) = match state.platform().media(&operator.token).await {
        Ok(items) => (MediaItemView::list(&items, None), None),
        Err(e) => {
            tracing::error!("Failed to fetch media: {e}");
            (Vec::new(), Some(Notice::error(LOAD_FAILED)))
        }
    };

    MediaIndexTemplate {
        operator: OperatorView::from(&operator),
        current_path: "/media".to_string(),
        nonce,
        items,
        notice,
    }
}

/// Open the picker with an empty selection.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(operator, state, session))]
pub async fn picker(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PickerQuery>,
) -> Result<MediaPickerTemplate> {
    let selection = MediaSelection::new(query.mode);
    session
        .insert(session_keys::MEDIA_SELECTION, &selection)
        .await?;

    let (items, notice) = match state.platform().media(&operator.token).await {
        Ok(items) => (MediaItemView::list(&items, Some(&selection)), None),
        Err(e) => {
            tracing::error!("Failed to fetch media for picker: {e}");
            (Vec::new(), Some(Notice::error(LOAD_FAILED)))
        }
    };

    Ok(MediaPickerTemplate {
        items,
        multiple: query.mode == SelectionMode::Multiple,
        field: query.field.unwrap_or_else(|| "image".to_string()),
        notice,
    })
}

/// The library as JSON, with the current picks flagged.
///
/// # Errors
///
/// Returns 502 if the platform can't be reached.
#[instrument(skip(operator, state, session))]
pub async fn list(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<MediaItemView>>> {
    let items = state.platform().media(&operator.token).await?;
    let selection = load_selection(&session).await;
    Ok(Json(MediaItemView::list(&items, Some(&selection))))
}

/// Upload a batch of files and return the merged library.
///
/// Partially failed batches still succeed; the rejected files' messages are
/// in `errors`.
///
/// # Errors
///
/// Returns 400 when no file was sent, 413 when the batch is too large, and
/// 502 if the platform can't be reached.
#[instrument(skip(operator, state, multipart))]
pub async fn upload(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let files = read_files(multipart).await?;
    if files.is_empty() {
        return Err(AppError::BadRequest("no files selected".to_string()));
    }
    let count = files.len().to_string();
    add_breadcrumb("media", "Upload batch", &[("files", count.as_str())]);

    let batch = state.platform().upload_media(&operator.token, files).await?;

    let mut library = state
        .platform()
        .media(&operator.token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to refresh media after upload: {e}");
            Vec::new()
        });
    let added = batch.merge_into(&mut library);

    if !batch.errors.is_empty() {
        tracing::warn!(
            rejected = batch.errors.len(),
            added,
            "Some files in the upload batch were rejected"
        );
    }

    Ok(Json(UploadResponse {
        data: MediaItemView::list(&library, None),
        added,
        errors: batch.errors,
        message: batch.message,
    }))
}

/// Toggle an item in the picker selection.
///
/// # Errors
///
/// Returns 400 for an empty URL, or an error if the session store fails.
#[instrument(skip(_operator, session))]
pub async fn select(
    RequireOperator(_operator): RequireOperator,
    session: Session,
    Form(form): Form<SelectForm>,
) -> Result<Json<SelectResponse>> {
    if form.url.trim().is_empty() {
        return Err(AppError::BadRequest("missing url".to_string()));
    }

    let mut selection = load_selection(&session).await;
    if let Some(mode) = form.mode.filter(|mode| *mode != selection.mode) {
        selection = MediaSelection::new(mode);
    }
    let selected = selection.toggle(&form.url);
    session
        .insert(session_keys::MEDIA_SELECTION, &selection)
        .await?;

    Ok(Json(SelectResponse {
        path: storage_path(&form.url),
        selected,
        paths: selection.paths().to_vec(),
    }))
}
