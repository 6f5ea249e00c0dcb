//! Accessibility preferences and the notification feed

use super::{ok, ApiResult, AppState};
use crate::notifications::Notification;
use crate::preferences::{AccessibilitySettings, SettingsUpdate};
use axum::{extract::State, Json};

pub async fn get_preferences(State(state): State<AppState>) -> ApiResult<AccessibilitySettings> {
    ok(state.preferences.get().await)
}

pub async fn put_preferences(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<AccessibilitySettings> {
    ok(state.preferences.update(update).await)
}

pub async fn reset_preferences(State(state): State<AppState>) -> ApiResult<AccessibilitySettings> {
    ok(state.preferences.reset().await)
}

/// Most recent notifications, newest first
pub async fn list_notifications(State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    ok(state.notifications.recent())
}
