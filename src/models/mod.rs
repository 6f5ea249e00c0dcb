//! Data models for the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Field-level error messages keyed by field id
pub type FieldErrors = BTreeMap<String, String>;

// =============================================================================
// Enums
// =============================================================================

/// Kind of manifestation a citizen registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Complaint,
    Suggestion,
    Praise,
    Report,
    Request,
}

impl CategoryType {
    pub const ALL: [CategoryType; 5] = [
        CategoryType::Complaint,
        CategoryType::Suggestion,
        CategoryType::Praise,
        CategoryType::Report,
        CategoryType::Request,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CategoryType::Complaint => "Reclamação",
            CategoryType::Suggestion => "Sugestão",
            CategoryType::Praise => "Elogio",
            CategoryType::Report => "Denúncia",
            CategoryType::Request => "Solicitação",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CategoryType::Complaint => "Demonstração de insatisfação relativa a serviço público",
            CategoryType::Suggestion => "Proposta de melhoria de serviço público",
            CategoryType::Praise => "Demonstração de satisfação sobre serviço público",
            CategoryType::Report => "Comunicação de prática de irregularidade ou ilícito",
            CategoryType::Request => "Pedido de providência ou atendimento de interesse individual",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Government body responsible for answering a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Department {
    Cgdf,
    Seduh,
    Ses,
    Seedf,
    Ssp,
    Semob,
    Sema,
    Seagri,
    Sedes,
    Seec,
    Secti,
    Secec,
    Detran,
    Caesb,
    Ceb,
    Novacap,
    Slu,
    Other,
}

impl Department {
    pub fn code(&self) -> &'static str {
        match self {
            Department::Cgdf => "CGDF",
            Department::Seduh => "SEDUH",
            Department::Ses => "SES",
            Department::Seedf => "SEEDF",
            Department::Ssp => "SSP",
            Department::Semob => "SEMOB",
            Department::Sema => "SEMA",
            Department::Seagri => "SEAGRI",
            Department::Sedes => "SEDES",
            Department::Seec => "SEEC",
            Department::Secti => "SECTI",
            Department::Secec => "SECEC",
            Department::Detran => "DETRAN",
            Department::Caesb => "CAESB",
            Department::Ceb => "CEB",
            Department::Novacap => "NOVACAP",
            Department::Slu => "SLU",
            Department::Other => "OTHER",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    Registered,
    UnderReview,
    Forwarded,
    Answered,
    Archived,
}

impl RecordStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            RecordStatus::Registered => "Registrada",
            RecordStatus::UnderReview => "Em Análise",
            RecordStatus::Forwarded => "Encaminhada",
            RecordStatus::Answered => "Respondida",
            RecordStatus::Archived => "Arquivada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Audio,
    Video,
    Document,
}

// =============================================================================
// Attachment
// =============================================================================

/// Media captured by one of the capture widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub kind: AttachmentKind,
    pub display_name: String,
    pub size_bytes: u64,
    /// Path or URL of the stored bytes
    pub data_reference: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Identity and location
// =============================================================================

/// Identity fields as typed into the wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityInput {
    pub anonymous: bool,
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
}

/// Identity stored on a non-anonymous record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityBlock {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    /// Administrative region label (e.g. "Gama")
    pub region: Option<String>,
    pub address: Option<String>,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// =============================================================================
// Record
// =============================================================================

/// A submitted manifestation, persisted in the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub tracking_code: String,
    pub category_type: CategoryType,
    pub department: Department,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    pub subject_text: String,
    pub narrative_text: String,
    #[serde(default)]
    pub extra_fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub is_anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityBlock>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

/// Fields a response-processing collaborator may change after submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    pub status: Option<RecordStatus>,
    pub response_text: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Merge a patch and refresh `updated_at`
    pub fn apply(&mut self, patch: RecordPatch, now: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(text) = patch.response_text {
            self.response_text = Some(text);
            // An answer without an explicit timestamp is dated now
            if patch.responded_at.is_none() && self.responded_at.is_none() {
                self.responded_at = Some(now);
            }
        }
        if let Some(at) = patch.responded_at {
            self.responded_at = Some(at);
        }
        self.updated_at = now;
    }
}

// =============================================================================
// API Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            field_errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            field_errors: None,
        }
    }

    pub fn invalid(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            field_errors: Some(field_errors),
        }
    }
}
