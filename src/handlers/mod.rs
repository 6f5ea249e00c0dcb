//! HTTP request handlers

pub mod catalog;
pub mod middleware;
pub mod preferences;
pub mod records;
pub mod wizard;

use crate::geocoding::Geocoder;
use crate::models::ApiResponse;
use crate::notifications::NotificationCenter;
use crate::preferences::PreferencesStore;
use crate::store::RecordStore;
use crate::wizard::{WizardError, WizardRegistry};
use axum::{
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub registry: Arc<WizardRegistry>,
    pub preferences: Arc<PreferencesStore>,
    pub notifications: NotificationCenter,
    pub geocoder: Arc<dyn Geocoder>,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub is_production: bool,
    pub tracking_prefix: String,
}

/// Status code plus the JSON envelope every endpoint answers with
pub type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

pub(crate) fn fail<T>(status: StatusCode, message: impl Into<String>) -> ApiResult<T> {
    (status, Json(ApiResponse::error(message)))
}

/// Map a controller error to a status code
pub(crate) fn wizard_error<T>(error: WizardError) -> ApiResult<T> {
    let status = match &error {
        WizardError::Validation(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::invalid(error.to_string(), errors.clone())),
            );
        }
        WizardError::SessionNotFound | WizardError::AttachmentNotFound => StatusCode::NOT_FOUND,
        WizardError::UnknownSubject(_)
        | WizardError::UnknownField(_)
        | WizardError::NoSubjectSelected => StatusCode::BAD_REQUEST,
        WizardError::Busy | WizardError::AlreadySubmitted => StatusCode::CONFLICT,
        WizardError::Cancelled => StatusCode::GONE,
    };
    fail(status, error.to_string())
}

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Classifier and catalog
        .route("/classify", post(catalog::classify_narrative))
        .route("/subjects", get(catalog::list_subjects))
        .route("/subjects/suggest", post(catalog::suggest_subjects))
        .route("/subjects/:id", get(catalog::get_subject))
        .route("/categories", get(catalog::list_categories))
        // Wizard sessions
        .route("/wizard", post(wizard::create_wizard))
        .route(
            "/wizard/:id",
            get(wizard::get_wizard).delete(wizard::delete_wizard),
        )
        .route("/wizard/:id/narrative", put(wizard::put_narrative))
        .route("/wizard/:id/subject", put(wizard::put_subject))
        .route("/wizard/:id/extra-fields", put(wizard::put_extra_fields))
        .route("/wizard/:id/location", put(wizard::put_location))
        .route("/wizard/:id/identity", put(wizard::put_identity))
        .route("/wizard/:id/consent", put(wizard::put_consent))
        .route("/wizard/:id/next", post(wizard::next_step))
        .route("/wizard/:id/back", post(wizard::previous_step))
        .route("/wizard/:id/attachments", post(wizard::upload_attachment))
        .route(
            "/wizard/:id/attachments/:attachment_id",
            delete(wizard::delete_attachment),
        )
        .route("/wizard/:id/location/search", get(wizard::search_location))
        .route("/wizard/:id/location/reverse", post(wizard::reverse_location))
        .route("/wizard/:id/location/current", post(wizard::current_location))
        // Records
        .route("/records/current", get(records::current_record))
        .route(
            "/records/:key",
            get(records::get_record).put(records::update_record),
        )
        // Preferences and notifications
        .route(
            "/preferences",
            get(preferences::get_preferences).put(preferences::put_preferences),
        )
        .route("/preferences/reset", post(preferences::reset_preferences))
        .route("/notifications", get(preferences::list_notifications))
}
