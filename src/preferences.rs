//! Accessibility settings

use crate::notifications::NotificationCenter;
use crate::store::backend::{read_json, StorageBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const PREFERENCES_KEY: &str = "participadf-acessibilidade";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    HighContrast,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilitySettings {
    pub theme: Theme,
    pub font_size: FontSize,
    pub screen_reader: bool,
    pub reduced_motion: bool,
    pub high_contrast: bool,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub font_size: Option<FontSize>,
    pub screen_reader: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub high_contrast: Option<bool>,
}

impl AccessibilitySettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        // Switching high contrast drags the theme along; an explicit theme
        // in the same update still wins.
        if let Some(high_contrast) = update.high_contrast {
            if high_contrast != self.high_contrast {
                self.high_contrast = high_contrast;
                self.theme = if high_contrast {
                    Theme::HighContrast
                } else {
                    Theme::Light
                };
            }
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(font_size) = update.font_size {
            self.font_size = font_size;
        }
        if let Some(screen_reader) = update.screen_reader {
            self.screen_reader = screen_reader;
        }
        if let Some(reduced_motion) = update.reduced_motion {
            self.reduced_motion = reduced_motion;
        }
    }
}

pub struct PreferencesStore {
    backend: Arc<dyn StorageBackend>,
    notifications: NotificationCenter,
    settings: RwLock<AccessibilitySettings>,
}

impl PreferencesStore {
    pub async fn open(backend: Arc<dyn StorageBackend>, notifications: NotificationCenter) -> Self {
        let settings: AccessibilitySettings = read_json(backend.as_ref(), PREFERENCES_KEY).await;
        Self {
            backend,
            notifications,
            settings: RwLock::new(settings),
        }
    }

    pub async fn get(&self) -> AccessibilitySettings {
        *self.settings.read().await
    }

    pub async fn update(&self, update: SettingsUpdate) -> AccessibilitySettings {
        let mut settings = self.settings.write().await;
        settings.apply(update);
        self.save(&settings).await;
        *settings
    }

    pub async fn reset(&self) -> AccessibilitySettings {
        let mut settings = self.settings.write().await;
        *settings = AccessibilitySettings::default();
        self.save(&settings).await;
        *settings
    }

    async fn save(&self, settings: &AccessibilitySettings) {
        let result = match serde_json::to_string(settings) {
            Ok(json) => self.backend.set_item(PREFERENCES_KEY, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist accessibility settings: {}", e);
            self.notifications.publish(
                crate::notifications::NotificationLevel::Warning,
                "Preferências aplicadas apenas nesta sessão",
                None,
            );
        }
    }
}
