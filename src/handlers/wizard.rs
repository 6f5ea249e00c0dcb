//! Wizard session endpoints
//!
//! Every mutating call takes the session exclusively; a second call while
//! one is in flight gets `409 Conflict` instead of waiting.

use super::{fail, ok, wizard_error, ApiResult, AppState};
use crate::capture::{self, CaptureError, CaptureWidget, CapturedUpload};
use crate::geocoding::{self, Coordinates, GeoPlace, GeolocationReport};
use crate::models::{ApiResponse, Attachment, IdentityInput, LocationInfo};
use crate::validation::to_field_errors;
use crate::wizard::{Advance, WizardController, WizardError, WizardView};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NarrativeUpdate {
    pub narrative: String,
}

#[derive(Debug, Deserialize)]
pub struct SubjectSelection {
    pub subject_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsentUpdate {
    pub accepted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub widget: CaptureWidget,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub result: Advance,
    pub wizard: WizardView,
}

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub attachment: Attachment,
    pub wizard: WizardView,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub located: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub wizard: WizardView,
}

/// Run a synchronous action on an exclusively held session
fn mutate<F>(state: &AppState, id: Uuid, action: F) -> ApiResult<WizardView>
where
    F: FnOnce(&mut WizardController) -> Result<(), WizardError>,
{
    let mut controller = match state.registry.acquire(id) {
        Ok(c) => c,
        Err(e) => return wizard_error(e),
    };

    match action(&mut *controller) {
        Ok(()) => ok(controller.view()),
        Err(e) => wizard_error(e),
    }
}

// =============================================================================
// Session lifecycle
// =============================================================================

pub async fn create_wizard(State(state): State<AppState>) -> ApiResult<WizardView> {
    let id = state.registry.create();
    match state.registry.inspect(id).await {
        Ok(controller) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(controller.view())),
        ),
        Err(e) => wizard_error(e),
    }
}

pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<WizardView> {
    match state.registry.inspect(id).await {
        Ok(controller) => ok(controller.view()),
        Err(e) => wizard_error(e),
    }
}

/// Abandon a session and discard its uploads
pub async fn delete_wizard(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    if !state.registry.remove(id) {
        return wizard_error(WizardError::SessionNotFound);
    }

    capture::remove_session_uploads(&state.upload_dir, id).await;
    tracing::info!("Wizard session {} abandoned", id);
    ok(())
}

// =============================================================================
// Field updates
// =============================================================================

pub async fn put_narrative(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NarrativeUpdate>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.set_narrative(input.narrative))
}

pub async fn put_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SubjectSelection>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.select_subject(&input.subject_id).map(|_| ()))
}

pub async fn put_extra_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(values): Json<BTreeMap<String, String>>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.set_extra_fields(values))
}

pub async fn put_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(location): Json<LocationInfo>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.set_location(location))
}

pub async fn put_identity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(identity): Json<IdentityInput>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.set_identity(identity))
}

pub async fn put_consent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ConsentUpdate>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.set_consent(input.accepted))
}

// =============================================================================
// Navigation
// =============================================================================

/// Validate the current step and move on. Finalizing submits the record and
/// closes the session; its uploads stay referenced by the record.
pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StepResponse> {
    let mut controller = match state.registry.acquire(id) {
        Ok(c) => c,
        Err(e) => return wizard_error(e),
    };

    let result = match controller.advance(&state.store).await {
        Ok(result) => result,
        Err(e) => return wizard_error(e),
    };
    let wizard = controller.view();
    drop(controller);

    if matches!(result, Advance::Submitted(_)) {
        state.registry.remove(id);
    }

    ok(StepResponse { result, wizard })
}

pub async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<WizardView> {
    mutate(&state, id, |c| c.back().map(|_| ()))
}

// =============================================================================
// Attachments
// =============================================================================

/// Receive one file from a capture widget (single multipart field)
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<AttachmentResponse> {
    let mut controller = match state.registry.acquire(id) {
        Ok(c) => c,
        Err(e) => return wizard_error(e),
    };

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return fail(StatusCode::BAD_REQUEST, "No file provided"),
        Err(e) => {
            tracing::error!("Multipart parsing error: {}", e);
            return fail(
                StatusCode::BAD_REQUEST,
                format!("Failed to process upload ({})", e),
            );
        }
    };

    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to read file bytes: {}", e);
            return fail(
                StatusCode::BAD_REQUEST,
                format!("Failed to read uploaded file ({})", e),
            );
        }
    };

    let upload = CapturedUpload {
        filename,
        content_type,
        data: data.to_vec(),
        duration_seconds: query.duration_seconds,
    };

    let attachment = match capture::store_capture(
        &state.upload_dir,
        id,
        query.widget,
        upload,
        state.max_upload_size,
    )
    .await
    {
        Ok(a) => a,
        Err(CaptureError::Validation(e)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::invalid(e.to_string(), to_field_errors([e]))),
            );
        }
        Err(e @ CaptureError::Io(_)) => {
            tracing::error!("Session {}: {}", id, e);
            return fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    if let Err(e) = controller.add_attachment(attachment.clone()) {
        capture::remove_stored_file(&state.upload_dir, &attachment).await;
        return wizard_error(e);
    }

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(AttachmentResponse {
            attachment,
            wizard: controller.view(),
        })),
    )
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<WizardView> {
    let mut controller = match state.registry.acquire(id) {
        Ok(c) => c,
        Err(e) => return wizard_error(e),
    };

    match controller.remove_attachment(attachment_id) {
        Ok(attachment) => {
            capture::remove_stored_file(&state.upload_dir, &attachment).await;
            ok(controller.view())
        }
        Err(e) => wizard_error(e),
    }
}

// =============================================================================
// Location
// =============================================================================

/// Address autocomplete. Lookup failures come back as an empty list.
pub async fn search_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LocationSearchQuery>,
) -> ApiResult<Vec<GeoPlace>> {
    if !state.registry.contains(id) {
        return wizard_error(WizardError::SessionNotFound);
    }
    ok(geocoding::search_places(state.geocoder.as_ref(), &query.q).await)
}

/// Reverse-geocode a point and store it on the session. The lookup runs
/// before the session is taken so a slow geocoder never blocks other edits.
async fn locate(state: &AppState, id: Uuid, coords: Coordinates) -> ApiResult<LocationResponse> {
    if !coords.is_valid() {
        return fail(StatusCode::BAD_REQUEST, "Invalid coordinates");
    }
    if !state.registry.contains(id) {
        return wizard_error(WizardError::SessionNotFound);
    }

    let found = geocoding::describe_coordinates(state.geocoder.as_ref(), coords).await;

    let mut controller = match state.registry.acquire(id) {
        Ok(c) => c,
        Err(e) => return wizard_error(e),
    };
    if let Err(e) = controller.apply_reverse_geocode(coords, found) {
        return wizard_error(e);
    }

    ok(LocationResponse {
        located: true,
        message: None,
        wizard: controller.view(),
    })
}

pub async fn reverse_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(coords): Json<Coordinates>,
) -> ApiResult<LocationResponse> {
    locate(&state, id, coords).await
}

/// Device position as reported by the browser. A failed lookup is not an
/// error: the citizen gets a message and can type the address instead.
pub async fn current_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(report): Json<GeolocationReport>,
) -> ApiResult<LocationResponse> {
    match report {
        GeolocationReport::Ok {
            latitude,
            longitude,
        } => {
            locate(
                &state,
                id,
                Coordinates {
                    latitude,
                    longitude,
                },
            )
            .await
        }
        GeolocationReport::Error { reason } => {
            tracing::info!("Session {}: device location unavailable ({:?})", id, reason);
            match state.registry.inspect(id).await {
                Ok(controller) => ok(LocationResponse {
                    located: false,
                    message: Some(reason.user_message()),
                    wizard: controller.view(),
                }),
                Err(e) => wizard_error(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{test_app, TestApp};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    const DOCUMENT_NARRATIVE: &str =
        "Gostaria de solicitar uma certidão de tempo de serviço para minha aposentadoria.";

    async fn new_session(app: &TestApp) -> String {
        let (status, body) = app.call("POST", "/api/wizard", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn next(app: &TestApp, id: &str) -> (StatusCode, Value) {
        app.call("POST", &format!("/api/wizard/{}/next", id), None)
            .await
    }

    fn multipart_request(uri: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let boundary = "X-OUVIDORIA-BOUNDARY";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n",
                b = boundary,
                f = filename,
                c = content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[tokio::test]
    async fn test_anonymous_document_request_flow() {
        let app = test_app().await;
        let id = new_session(&app).await;

        app.call(
            "PUT",
            &format!("/api/wizard/{}/narrative", id),
            Some(json!({"narrative": DOCUMENT_NARRATIVE})),
        )
        .await;
        let (status, body) = next(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["result"]["step"], "subject");
        assert!(body["data"]["wizard"]["state"]["analysis"].is_object());

        let (status, body) = app
            .call(
                "PUT",
                &format!("/api/wizard/{}/subject", id),
                Some(json!({"subject_id": "servicos-certidao"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["progress"]["total"], 6);

        let (_, body) = next(&app, &id).await;
        assert_eq!(body["data"]["result"]["step"], "summary");
        let (_, body) = next(&app, &id).await;
        assert_eq!(body["data"]["result"]["step"], "identity");

        app.call(
            "PUT",
            &format!("/api/wizard/{}/identity", id),
            Some(json!({"anonymous": true})),
        )
        .await;
        let (_, body) = next(&app, &id).await;
        assert_eq!(body["data"]["result"]["step"], "attachments");
        let (_, body) = next(&app, &id).await;
        assert_eq!(body["data"]["result"]["step"], "finalize");

        // Consent is the last gate
        let (status, body) = next(&app, &id).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["field_errors"]["consent"].is_string());

        app.call(
            "PUT",
            &format!("/api/wizard/{}/consent", id),
            Some(json!({"accepted": true})),
        )
        .await;
        let (status, body) = next(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["result"]["outcome"], "submitted");
        assert_eq!(body["data"]["result"]["persisted"], true);
        assert_eq!(body["data"]["wizard"]["completed"], true);

        let record = &body["data"]["result"]["record"];
        assert_eq!(record["department"], "SEEC");
        assert_eq!(record["is_anonymous"], true);
        assert!(record.get("identity").is_none());
        assert!(record.get("location").is_none());

        // The session is closed once submitted
        let (status, _) = app.call("GET", &format!("/api/wizard/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let code = record["tracking_code"].as_str().unwrap().to_lowercase();
        let (status, body) = app.call("GET", &format!("/api/records/{}", code), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["record"]["subject_id"], "servicos-certidao");
    }

    #[tokio::test]
    async fn test_unknown_subject_and_field() {
        let app = test_app().await;
        let id = new_session(&app).await;

        let (status, _) = app
            .call(
                "PUT",
                &format!("/api/wizard/{}/extra-fields", id),
                Some(json!({"tamanho-buraco": "Pequeno (até 30cm)"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .call(
                "PUT",
                &format!("/api/wizard/{}/subject", id),
                Some(json!({"subject_id": "nao-existe"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        app.call(
            "PUT",
            &format!("/api/wizard/{}/subject", id),
            Some(json!({"subject_id": "buraco-via"})),
        )
        .await;
        let (status, body) = app
            .call(
                "PUT",
                &format!("/api/wizard/{}/extra-fields", id),
                Some(json!({"tamanho-buraco": "Pequeno (até 30cm)", "cor": "azul"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("cor"));

        let (status, body) = app
            .call(
                "PUT",
                &format!("/api/wizard/{}/extra-fields", id),
                Some(json!({"tamanho-buraco": "Pequeno (até 30cm)"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["state"]["extra_fields"]["tamanho-buraco"],
            "Pequeno (até 30cm)"
        );
    }

    #[tokio::test]
    async fn test_missing_session() {
        let app = test_app().await;
        let missing = uuid::Uuid::new_v4();

        let (status, _) = app
            .call("GET", &format!("/api/wizard/{}", missing), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call("POST", &format!("/api/wizard/{}/next", missing), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .call("DELETE", &format!("/api/wizard/{}", missing), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_and_remove_attachment() {
        let app = test_app().await;
        let id = new_session(&app).await;

        let (status, body) = app
            .send(multipart_request(
                &format!("/api/wizard/{}/attachments", id),
                "foto buraco.png",
                "image/png",
                PNG_BYTES,
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let attachment = &body["data"]["attachment"];
        assert_eq!(attachment["kind"], "image");
        assert_eq!(attachment["display_name"], "foto_buraco.png");
        let path = attachment["data_reference"].as_str().unwrap().to_string();
        assert!(std::path::Path::new(&path).exists());

        let attachment_id = attachment["id"].as_str().unwrap();
        let (status, body) = app
            .call(
                "DELETE",
                &format!("/api/wizard/{}/attachments/{}", id, attachment_id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["state"]["attachments"]
            .as_array()
            .unwrap()
            .is_empty());
        assert!(!std::path::Path::new(&path).exists());

        let (status, _) = app
            .call(
                "DELETE",
                &format!("/api/wizard/{}/attachments/{}", id, attachment_id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejects_dangerous_file() {
        let app = test_app().await;
        let id = new_session(&app).await;

        let (status, body) = app
            .send(multipart_request(
                &format!("/api/wizard/{}/attachments", id),
                "script.php.png",
                "image/png",
                PNG_BYTES,
            ))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["field_errors"]["file"].is_string());

        // Audio widget only accepts audio
        let (status, _) = app
            .send(multipart_request(
                &format!("/api/wizard/{}/attachments?widget=audio", id),
                "gravacao.png",
                "image/png",
                PNG_BYTES,
            ))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_abandoning_session_removes_uploads() {
        let app = test_app().await;
        let id = new_session(&app).await;

        let (_, body) = app
            .send(multipart_request(
                &format!("/api/wizard/{}/attachments", id),
                "foto.png",
                "image/png",
                PNG_BYTES,
            ))
            .await;
        let path = body["data"]["attachment"]["data_reference"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, _) = app.call("DELETE", &format!("/api/wizard/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!std::path::Path::new(&path).exists());
    }

    #[tokio::test]
    async fn test_location_lookup() {
        let app = test_app().await;
        let id = new_session(&app).await;

        let (status, body) = app
            .call(
                "GET",
                &format!("/api/wizard/{}/location/search?q=Setor%20Leste", id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["display_name"], "Setor Leste, Gama");

        let (_, body) = app
            .call("GET", &format!("/api/wizard/{}/location/search?q=ab", id), None)
            .await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/wizard/{}/location/reverse", id),
                Some(json!({"latitude": -16.0167, "longitude": -48.0667})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["located"], true);
        let location = &body["data"]["wizard"]["state"]["location"];
        assert_eq!(location["address"], "Setor Central, Gama");
        assert_eq!(location["region"], "Gama");
        assert_eq!(location["description"], "");

        let (status, _) = app
            .call(
                "POST",
                &format!("/api/wizard/{}/location/reverse", id),
                Some(json!({"latitude": 120.0, "longitude": 0.0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_denied_geolocation_returns_message() {
        let app = test_app().await;
        let id = new_session(&app).await;

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/wizard/{}/location/current", id),
                Some(json!({"status": "error", "reason": "permission_denied"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["located"], false);
        assert!(body["data"]["message"]
            .as_str()
            .unwrap()
            .contains("permissões"));
    }
}
