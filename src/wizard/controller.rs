//! Wizard controller
//!
//! Owns one [`WizardFormState`] and is the only thing allowed to mutate it.
//! Advancing is gated by per-step validation; leaving the narrative step
//! runs the classifier and finalizing produces a [`Record`].

use super::state::{Analysis, WizardFormState};
use super::steps::{self, Progress, Step};
use super::WizardError;
use crate::catalog::{self, SubjectEntry};
use crate::classifier::{classify, sniff_category_type};
use crate::geocoding::{Coordinates, ReverseGeocode};
use crate::models::{
    Attachment, IdentityBlock, IdentityInput, LocationInfo, Record, RecordStatus,
};
use crate::notifications::NotificationCenter;
use crate::store::RecordStore;
use crate::tracking;
use crate::validation::{self, to_field_errors, ValidationError};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub tracking_prefix: String,
    /// Simulated processing time before suggestions are shown
    pub analysis_delay: Duration,
    /// Simulated processing time before a submission completes
    pub submission_delay: Duration,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            tracking_prefix: "PARTICIPADF".to_string(),
            analysis_delay: Duration::from_millis(1800),
            submission_delay: Duration::from_millis(1500),
        }
    }
}

/// Result of a successful finalize
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub record: Record,
    /// False when the record only lives in memory for now
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advance {
    Moved { step: Step },
    Submitted(Submission),
}

/// Owned snapshot for API responses
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub id: Uuid,
    pub current_step: Step,
    pub progress: Progress,
    pub state: WizardFormState,
    pub completed: bool,
}

pub struct WizardController {
    id: Uuid,
    state: WizardFormState,
    completed: Option<Record>,
    cancel: CancellationToken,
    settings: WizardSettings,
    notifications: NotificationCenter,
    last_activity: Instant,
}

impl WizardController {
    pub fn new(
        id: Uuid,
        settings: WizardSettings,
        notifications: NotificationCenter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            state: WizardFormState::default(),
            completed: None,
            cancel,
            settings,
            notifications,
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &WizardFormState {
        &self.state
    }

    pub fn completed(&self) -> Option<&Record> {
        self.completed.as_ref()
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    pub fn visible_steps(&self) -> Vec<Step> {
        steps::visible_steps(self.state.subject)
    }

    /// Current step, re-settled against the live visible sequence
    pub fn current_step(&self) -> Step {
        steps::settle(self.state.current_step, &self.visible_steps())
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            id: self.id,
            current_step: self.current_step(),
            progress: steps::progress(self.state.current_step, self.state.subject),
            state: self.state.clone(),
            completed: self.completed.is_some(),
        }
    }

    fn ensure_open(&mut self) -> Result<(), WizardError> {
        if self.completed.is_some() {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.cancel.is_cancelled() {
            return Err(WizardError::Cancelled);
        }
        self.last_activity = Instant::now();
        Ok(())
    }

    // =========================================================================
    // Field actions
    // =========================================================================

    pub fn set_narrative(&mut self, narrative: String) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.state.narrative = narrative;
        Ok(())
    }

    /// Select a subject, reconciling extra-field values and the step pointer
    pub fn select_subject(&mut self, subject_id: &str) -> Result<&'static SubjectEntry, WizardError> {
        self.ensure_open()?;
        let subject = catalog::get_by_id(subject_id)
            .ok_or_else(|| WizardError::UnknownSubject(subject_id.to_string()))?;

        self.state.subject = Some(subject);
        self.state.reconcile_extra_fields();
        self.state.current_step = self.current_step();
        Ok(subject)
    }

    /// Merge extra-field values. Blank values clear the field.
    pub fn set_extra_fields(&mut self, values: BTreeMap<String, String>) -> Result<(), WizardError> {
        self.ensure_open()?;
        let subject = self.state.subject.ok_or(WizardError::NoSubjectSelected)?;

        if let Some(unknown) = values.keys().find(|id| subject.field(id).is_none()) {
            return Err(WizardError::UnknownField(unknown.clone()));
        }

        for (id, value) in values {
            if value.trim().is_empty() {
                self.state.extra_fields.remove(&id);
            } else {
                self.state.extra_fields.insert(id, value);
            }
        }
        Ok(())
    }

    pub fn set_location(&mut self, location: LocationInfo) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.state.location = location;
        Ok(())
    }

    /// Fill coordinates and address from a reverse lookup. The free-text
    /// description is left to the citizen.
    pub fn apply_reverse_geocode(
        &mut self,
        coords: Coordinates,
        found: ReverseGeocode,
    ) -> Result<&LocationInfo, WizardError> {
        self.ensure_open()?;
        let location = &mut self.state.location;
        location.latitude = Some(coords.latitude);
        location.longitude = Some(coords.longitude);
        location.address = Some(found.display_name);
        if found.neighborhood_hint.is_some() {
            location.region = found.neighborhood_hint;
        }
        Ok(&self.state.location)
    }

    pub fn set_identity(&mut self, identity: IdentityInput) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.state.identity = identity;
        Ok(())
    }

    pub fn add_attachment(&mut self, attachment: Attachment) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.state.attachments.push(attachment);
        Ok(())
    }

    pub fn remove_attachment(&mut self, attachment_id: Uuid) -> Result<Attachment, WizardError> {
        self.ensure_open()?;
        let index = self
            .state
            .attachments
            .iter()
            .position(|a| a.id == attachment_id)
            .ok_or(WizardError::AttachmentNotFound)?;
        Ok(self.state.attachments.remove(index))
    }

    pub fn set_consent(&mut self, accepted: bool) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.state.consent_accepted = accepted;
        Ok(())
    }

    // =========================================================================
    // Validation and navigation
    // =========================================================================

    pub fn validate_step(&self, step: Step) -> Result<(), WizardError> {
        let state = &self.state;
        let errors: Vec<ValidationError> = match step {
            Step::Narrative => validation::validate_narrative(&state.narrative)
                .err()
                .into_iter()
                .collect(),
            Step::Subject if state.subject.is_none() => vec![ValidationError::Required {
                field: "subject".to_string(),
            }],
            Step::Subject => Vec::new(),
            Step::ExtraFields => match state.subject {
                Some(subject) => validation::validate_extra_fields(subject, &state.extra_fields),
                None => Vec::new(),
            },
            Step::Location => validation::validate_location(state.subject, &state.location)
                .err()
                .into_iter()
                .collect(),
            Step::Identity => validation::validate_identity(&state.identity),
            Step::Finalize => validation::validate_consent(state.consent_accepted)
                .err()
                .into_iter()
                .collect(),
            Step::Summary | Step::Attachments => Vec::new(),
        };

        if errors.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Validation(to_field_errors(errors)))
        }
    }

    /// Validate the current step and move forward, running the side effect
    /// attached to the step being left.
    pub async fn advance(&mut self, store: &RecordStore) -> Result<Advance, WizardError> {
        self.ensure_open()?;
        let current = self.current_step();
        self.validate_step(current)?;

        match current {
            Step::Narrative => self.analyze().await?,
            Step::Subject => {
                self.state.category_type = Some(sniff_category_type(&self.state.narrative));
            }
            Step::Finalize => {
                let submission = self.submit(store).await?;
                return Ok(Advance::Submitted(submission));
            }
            _ => {}
        }

        self.state.current_step = steps::next_step(current, &self.visible_steps());
        self.last_activity = Instant::now();
        Ok(Advance::Moved {
            step: self.state.current_step,
        })
    }

    /// Re-check every visible step before a submission. Fields stay editable
    /// after their step is passed and a subject change can add steps behind
    /// the pointer, so the pointer rewinds to the first step that fails.
    fn revalidate_visible_steps(&mut self) -> Result<(), WizardError> {
        for step in self.visible_steps() {
            if let Err(e) = self.validate_step(step) {
                tracing::info!(
                    "Session {}: submission blocked, rewinding to {:?}",
                    self.id,
                    step
                );
                self.state.current_step = step;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Move back one step. Entered data is kept.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        self.ensure_open()?;
        let current = self.current_step();
        self.state.current_step = steps::previous_step(current, &self.visible_steps());
        Ok(self.state.current_step)
    }

    async fn wait_or_cancel(&self, delay: Duration) -> Result<(), WizardError> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(WizardError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn analyze(&mut self) -> Result<(), WizardError> {
        self.wait_or_cancel(self.settings.analysis_delay).await?;

        let classification = classify(&self.state.narrative);
        let suggestions = catalog::suggest_by_narrative(&self.state.narrative);

        tracing::info!(
            "Session {}: classified as {:?} for {} (confidence {:.2}, {} suggestion(s))",
            self.id,
            classification.suggested_category_type,
            classification.suggested_department,
            classification.confidence_score,
            suggestions.len()
        );

        self.state.category_type = Some(classification.suggested_category_type);
        self.state.analysis = Some(Analysis {
            classification,
            suggestions,
        });
        Ok(())
    }

    async fn submit(&mut self, store: &RecordStore) -> Result<Submission, WizardError> {
        self.revalidate_visible_steps()?;
        let subject = self.state.subject.ok_or(WizardError::NoSubjectSelected)?;
        self.wait_or_cancel(self.settings.submission_delay).await?;

        let now = Utc::now();
        let mut tracking_code = tracking::generate(&self.settings.tracking_prefix, now);
        while store.contains_tracking_code(&tracking_code).await {
            tracking_code = tracking::generate(&self.settings.tracking_prefix, now);
        }

        let record = self.build_record(subject, tracking_code, now);
        let persisted = store.add(record.clone()).await;

        self.completed = Some(record.clone());
        self.notifications.success(
            "Manifestação registrada com sucesso!",
            format!("Protocolo: {}", tracking::format_for_display(&record.tracking_code)),
        );
        tracing::info!(
            "Session {}: submitted {} (persisted: {})",
            self.id,
            record.tracking_code,
            persisted
        );

        Ok(Submission { record, persisted })
    }

    fn build_record(
        &self,
        subject: &'static SubjectEntry,
        tracking_code: String,
        now: chrono::DateTime<Utc>,
    ) -> Record {
        let state = &self.state;
        let identity = &state.identity;

        let identity_block = (!identity.anonymous).then(|| IdentityBlock {
            name: identity.name.trim().to_string(),
            national_id: non_blank(&identity.national_id).map(validation::format_cpf),
            email: identity.email.trim().to_string(),
            phone: non_blank(&identity.phone).map(validation::format_phone),
        });

        let location = Step::Location
            .is_visible(Some(subject))
            .then(|| state.location.clone());

        Record {
            id: Uuid::new_v4(),
            tracking_code,
            category_type: state
                .category_type
                .unwrap_or_else(|| sniff_category_type(&state.narrative)),
            department: subject.department,
            status: RecordStatus::Registered,
            subject_id: Some(subject.id.to_string()),
            subject_text: subject.name.to_string(),
            narrative_text: state.narrative.trim().to_string(),
            extra_fields: state.extra_fields.clone(),
            location,
            attachments: state.attachments.clone(),
            is_anonymous: identity.anonymous,
            identity: identity_block,
            created_at: now,
            updated_at: now,
            response_text: None,
            responded_at: None,
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryType, Department};
    use crate::store::MemoryStorage;
    use std::sync::Arc;

    const HEALTH_NARRATIVE: &str = "O posto de saúde da minha quadra está sem médico hoje.";

    fn instant_settings() -> WizardSettings {
        WizardSettings {
            analysis_delay: Duration::ZERO,
            submission_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn controller() -> WizardController {
        WizardController::new(
            Uuid::new_v4(),
            instant_settings(),
            NotificationCenter::new(),
            CancellationToken::new(),
        )
    }

    async fn store() -> RecordStore {
        RecordStore::open(Arc::new(MemoryStorage::new()), NotificationCenter::new()).await
    }

    fn field_errors(result: Result<Advance, WizardError>) -> BTreeMap<String, String> {
        match result {
            Err(WizardError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_narrative_blocks_advance() {
        let store = store().await;
        let mut wizard = controller();
        wizard.set_narrative("curto demais".to_string()).unwrap();

        let errors = field_errors(wizard.advance(&store).await);
        assert!(errors.contains_key("narrative"));
        assert_eq!(wizard.current_step(), Step::Narrative);
        assert!(wizard.state().analysis.is_none());
    }

    #[tokio::test]
    async fn test_leaving_narrative_runs_analysis() {
        let store = store().await;
        let mut wizard = controller();
        wizard.set_narrative(HEALTH_NARRATIVE.to_string()).unwrap();

        let advance = wizard.advance(&store).await.unwrap();
        assert!(matches!(advance, Advance::Moved { step: Step::Subject }));

        let analysis = wizard.state().analysis.as_ref().unwrap();
        assert_eq!(analysis.classification.suggested_department, Department::Ses);
        assert_eq!(analysis.suggestions[0].id, "saude-atendimento-ubs");
    }

    #[tokio::test]
    async fn test_subject_required_and_category_sniffed() {
        let store = store().await;
        let mut wizard = controller();
        wizard.set_narrative(HEALTH_NARRATIVE.to_string()).unwrap();
        wizard.advance(&store).await.unwrap();

        let errors = field_errors(wizard.advance(&store).await);
        assert!(errors.contains_key("subject"));

        wizard.select_subject("saude-atendimento-ubs").unwrap();
        wizard.advance(&store).await.unwrap();
        assert_eq!(wizard.state().category_type, Some(CategoryType::Complaint));
        assert_eq!(wizard.current_step(), Step::ExtraFields);
    }

    #[tokio::test]
    async fn test_extra_fields_one_error_per_missing_required_field() {
        let store = store().await;
        let mut wizard = controller();
        wizard.set_narrative(HEALTH_NARRATIVE.to_string()).unwrap();
        wizard.advance(&store).await.unwrap();
        wizard.select_subject("educacao-infraestrutura").unwrap();
        wizard.advance(&store).await.unwrap();

        let errors = field_errors(wizard.advance(&store).await);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_unknown_extra_field_rejected() {
        let mut wizard = controller();
        let mut values = BTreeMap::new();
        values.insert("estacao".to_string(), "Central".to_string());
        assert!(matches!(
            wizard.set_extra_fields(values.clone()),
            Err(WizardError::NoSubjectSelected)
        ));

        wizard.select_subject("buraco-via").unwrap();
        assert!(matches!(
            wizard.set_extra_fields(values),
            Err(WizardError::UnknownField(id)) if id == "estacao"
        ));
    }

    #[test]
    fn test_changing_subject_reconciles_fields_and_step() {
        let mut wizard = controller();
        wizard.select_subject("buraco-via").unwrap();
        let mut values = BTreeMap::new();
        values.insert("tamanho-buraco".to_string(), "Pequeno (até 30cm)".to_string());
        wizard.set_extra_fields(values).unwrap();
        wizard.state.current_step = Step::Location;

        wizard.select_subject("servicos-certidao").unwrap();
        assert!(wizard.state().extra_fields.is_empty());
        assert_eq!(wizard.current_step(), Step::Subject);
        assert_eq!(wizard.visible_steps().len(), 6);
    }

    #[test]
    fn test_back_saturates_and_keeps_data() {
        let mut wizard = controller();
        wizard.set_narrative(HEALTH_NARRATIVE.to_string()).unwrap();
        assert_eq!(wizard.back().unwrap(), Step::Narrative);
        assert_eq!(wizard.state().narrative, HEALTH_NARRATIVE);
    }

    #[test]
    fn test_reverse_geocode_fills_location() {
        let mut wizard = controller();
        let location = wizard
            .apply_reverse_geocode(
                Coordinates {
                    latitude: -15.65,
                    longitude: -47.79,
                },
                ReverseGeocode {
                    display_name: "Quadra 8, Sobradinho".to_string(),
                    neighborhood_hint: Some("Sobradinho".to_string()),
                },
            )
            .unwrap();
        assert_eq!(location.region.as_deref(), Some("Sobradinho"));
        assert_eq!(location.latitude, Some(-15.65));
        assert!(location.description.is_empty());
    }

    /// Walk a document-request submission end to end
    async fn walk_to_finalize(wizard: &mut WizardController, store: &RecordStore, identity: IdentityInput) {
        wizard
            .set_narrative("Solicito a segunda via da certidão de ocupação do meu lote.".to_string())
            .unwrap();
        wizard.advance(store).await.unwrap(); // -> Subject
        wizard.select_subject("servicos-certidao").unwrap();
        wizard.advance(store).await.unwrap(); // -> Summary
        wizard.advance(store).await.unwrap(); // -> Identity
        wizard.set_identity(identity).unwrap();
        wizard.advance(store).await.unwrap(); // -> Attachments
        wizard.advance(store).await.unwrap(); // -> Finalize
        assert_eq!(wizard.current_step(), Step::Finalize);
    }

    #[tokio::test]
    async fn test_anonymous_submission_skips_identity_and_omits_block() {
        let store = store().await;
        let mut wizard = controller();
        let identity = IdentityInput {
            anonymous: true,
            ..Default::default()
        };
        walk_to_finalize(&mut wizard, &store, identity).await;

        let errors = field_errors(wizard.advance(&store).await);
        assert!(errors.contains_key("consent"));

        wizard.set_consent(true).unwrap();
        let Advance::Submitted(submission) = wizard.advance(&store).await.unwrap() else {
            panic!("expected submission");
        };

        let record = submission.record;
        assert!(submission.persisted);
        assert!(record.is_anonymous);
        assert!(record.identity.is_none());
        assert!(record.location.is_none());
        assert_eq!(record.category_type, CategoryType::Request);
        assert_eq!(record.department, Department::Seec);
        assert_eq!(record.status, RecordStatus::Registered);
        assert!(tracking::is_valid("PARTICIPADF", &record.tracking_code));
        assert_eq!(
            store.find_by_tracking_code(&record.tracking_code).await,
            Some(record)
        );
    }

    #[tokio::test]
    async fn test_identified_submission_formats_identity() {
        let store = store().await;
        let mut wizard = controller();
        let identity = IdentityInput {
            anonymous: false,
            name: " Maria da Silva ".to_string(),
            national_id: "52998224725".to_string(),
            email: "maria@example.com".to_string(),
            phone: String::new(),
        };
        walk_to_finalize(&mut wizard, &store, identity).await;
        wizard.set_consent(true).unwrap();

        let Advance::Submitted(submission) = wizard.advance(&store).await.unwrap() else {
            panic!("expected submission");
        };
        let block = submission.record.identity.unwrap();
        assert_eq!(block.name, "Maria da Silva");
        assert_eq!(block.national_id.as_deref(), Some("529.982.247-25"));
        assert!(block.phone.is_none());
    }

    #[tokio::test]
    async fn test_submission_is_one_way() {
        let store = store().await;
        let mut wizard = controller();
        walk_to_finalize(
            &mut wizard,
            &store,
            IdentityInput {
                anonymous: true,
                ..Default::default()
            },
        )
        .await;
        wizard.set_consent(true).unwrap();
        wizard.advance(&store).await.unwrap();

        assert!(wizard.completed().is_some());
        assert!(matches!(wizard.advance(&store).await, Err(WizardError::AlreadySubmitted)));
        assert!(matches!(wizard.back(), Err(WizardError::AlreadySubmitted)));
        assert!(matches!(
            wizard.set_narrative(String::new()),
            Err(WizardError::AlreadySubmitted)
        ));
    }

    #[tokio::test]
    async fn test_failed_persistence_still_submits() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_failing(true);
        let store = RecordStore::open(backend, NotificationCenter::new()).await;
        let mut wizard = controller();
        walk_to_finalize(
            &mut wizard,
            &store,
            IdentityInput {
                anonymous: true,
                ..Default::default()
            },
        )
        .await;
        wizard.set_consent(true).unwrap();

        let Advance::Submitted(submission) = wizard.advance(&store).await.unwrap() else {
            panic!("expected submission");
        };
        assert!(!submission.persisted);
        assert!(store
            .contains_tracking_code(&submission.record.tracking_code)
            .await);
    }

    #[tokio::test]
    async fn test_edits_after_passing_a_step_are_checked_on_submit() {
        let store = store().await;
        let mut wizard = controller();
        walk_to_finalize(
            &mut wizard,
            &store,
            IdentityInput {
                anonymous: true,
                ..Default::default()
            },
        )
        .await;

        wizard.set_narrative(String::new()).unwrap();
        wizard
            .set_identity(IdentityInput {
                anonymous: false,
                ..Default::default()
            })
            .unwrap();
        wizard.set_consent(true).unwrap();

        let errors = field_errors(wizard.advance(&store).await);
        assert!(errors.contains_key("narrative"));
        assert_eq!(wizard.current_step(), Step::Narrative);
        assert!(wizard.completed().is_none());
        assert_eq!(store.len().await, 0);

        wizard
            .set_narrative("Solicito a segunda via da certidão de ocupação do meu lote.".to_string())
            .unwrap();
        wizard.state.current_step = Step::Finalize;
        let errors = field_errors(wizard.advance(&store).await);
        assert!(errors.contains_key("name"));
        assert_eq!(wizard.current_step(), Step::Identity);
    }

    #[tokio::test]
    async fn test_subject_change_at_finalize_rewinds_to_added_steps() {
        let store = store().await;
        let mut wizard = controller();
        walk_to_finalize(
            &mut wizard,
            &store,
            IdentityInput {
                anonymous: true,
                ..Default::default()
            },
        )
        .await;
        wizard.set_consent(true).unwrap();

        wizard.select_subject("educacao-infraestrutura").unwrap();
        assert_eq!(wizard.current_step(), Step::Finalize);

        let errors = field_errors(wizard.advance(&store).await);
        assert_eq!(errors.len(), 2);
        assert_eq!(wizard.current_step(), Step::ExtraFields);

        let mut values = BTreeMap::new();
        values.insert("escola-nome".to_string(), "Escola Classe 10".to_string());
        values.insert("problema-infra".to_string(), "Telhado danificado".to_string());
        wizard.set_extra_fields(values).unwrap();
        wizard.advance(&store).await.unwrap();
        assert_eq!(wizard.current_step(), Step::Location);

        wizard.state.current_step = Step::Finalize;
        let errors = field_errors(wizard.advance(&store).await);
        assert!(errors.contains_key("location_description"));
        assert_eq!(wizard.current_step(), Step::Location);

        wizard
            .set_location(LocationInfo {
                description: "Bloco B, ao lado da quadra".to_string(),
                ..Default::default()
            })
            .unwrap();
        wizard.state.current_step = Step::Finalize;
        let Advance::Submitted(submission) = wizard.advance(&store).await.unwrap() else {
            panic!("expected submission");
        };
        assert_eq!(submission.record.extra_fields.len(), 2);
        assert_eq!(
            submission.record.location.unwrap().description,
            "Bloco B, ao lado da quadra"
        );
    }

    #[tokio::test]
    async fn test_cancellation_aborts_pending_analysis() {
        let store = store().await;
        let cancel = CancellationToken::new();
        let mut wizard = WizardController::new(
            Uuid::new_v4(),
            WizardSettings {
                analysis_delay: Duration::from_secs(30),
                ..Default::default()
            },
            NotificationCenter::new(),
            cancel.clone(),
        );
        wizard.set_narrative(HEALTH_NARRATIVE.to_string()).unwrap();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = wizard.advance(&store).await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(WizardError::Cancelled)));
        assert_eq!(wizard.current_step(), Step::Narrative);
        assert!(wizard.state().analysis.is_none());
    }
}
