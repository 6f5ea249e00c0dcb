//! Attachment capture
//!
//! The audio recorder, video recorder and file picker all upload through
//! the same path and come out as a uniform [`Attachment`].

use crate::models::{Attachment, AttachmentKind};
use crate::validation::{
    base_mime, sanitize_filename, validate_attachment_upload, validate_filename_extensions,
    ValidationError,
};
use chrono::Utc;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureWidget {
    Audio,
    Video,
    #[default]
    File,
}

/// Raw bytes handed over by a capture widget
#[derive(Debug, Clone)]
pub struct CapturedUpload {
    pub filename: String,
    /// MIME type declared by the client, if any
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to store attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Attachment kind for a widget. The file picker yields images or documents.
pub fn attachment_kind(widget: CaptureWidget, mime_type: &str) -> AttachmentKind {
    match widget {
        CaptureWidget::Audio => AttachmentKind::Audio,
        CaptureWidget::Video => AttachmentKind::Video,
        CaptureWidget::File if mime_type.starts_with("image/") => AttachmentKind::Image,
        CaptureWidget::File => AttachmentKind::Document,
    }
}

/// Declared MIME type, or one sniffed from magic bytes when the client sent
/// nothing useful
pub fn resolve_mime(declared: Option<&str>, data: &[u8]) -> String {
    match declared.map(base_mime) {
        Some(mime) if !mime.is_empty() && mime != OCTET_STREAM => mime,
        _ => infer::get(data)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string()),
    }
}

fn session_dir(upload_root: &Path, session_id: Uuid) -> PathBuf {
    upload_root.join(session_id.to_string())
}

/// Validate and store one captured file under `upload_root/<session>/`
pub async fn store_capture(
    upload_root: &Path,
    session_id: Uuid,
    widget: CaptureWidget,
    upload: CapturedUpload,
    max_size: usize,
) -> Result<Attachment, CaptureError> {
    validate_filename_extensions(&upload.filename)?;

    let mime_type = resolve_mime(upload.content_type.as_deref(), &upload.data);
    let kind = attachment_kind(widget, &mime_type);
    validate_attachment_upload(kind, &mime_type, upload.data.len(), max_size)?;

    let display_name = sanitize_filename(&upload.filename);
    let id = Uuid::new_v4();

    let dir = session_dir(upload_root, session_id);
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(format!("{}-{}", id, display_name));
    tokio::fs::write(&path, &upload.data).await?;

    tracing::info!(
        "Stored {:?} attachment {} ({} bytes) for session {}",
        kind,
        display_name,
        upload.data.len(),
        session_id
    );

    Ok(Attachment {
        id,
        kind,
        display_name,
        size_bytes: upload.data.len() as u64,
        data_reference: path.to_string_lossy().into_owned(),
        mime_type,
        duration_seconds: upload.duration_seconds.filter(|d| d.is_finite() && *d >= 0.0),
        created_at: Utc::now(),
    })
}

/// Best-effort removal of a stored attachment. Paths outside
/// `upload_root` are never touched.
pub async fn remove_stored_file(upload_root: &Path, attachment: &Attachment) {
    let path = Path::new(&attachment.data_reference);
    if !path.starts_with(upload_root) {
        tracing::warn!("Refusing to delete attachment outside upload dir: {:?}", path);
        return;
    }
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Failed to delete attachment file {:?}: {}", path, e);
    }
}

/// Best-effort removal of everything a session uploaded
pub async fn remove_session_uploads(upload_root: &Path, session_id: Uuid) {
    let dir = session_dir(upload_root, session_id);
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => tracing::debug!("Removed uploads for session {}", session_id),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove upload dir {:?}: {}", dir, e),
    }
}
