//! Mutable form state of one in-progress submission

use super::steps::Step;
use crate::catalog::SubjectEntry;
use crate::classifier::ClassificationResult;
use crate::models::{Attachment, CategoryType, IdentityInput, LocationInfo};
use serde::Serialize;
use std::collections::BTreeMap;

/// Classifier output and subject suggestions computed when leaving the
/// narrative step
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub classification: ClassificationResult,
    pub suggestions: Vec<&'static SubjectEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardFormState {
    pub narrative: String,
    pub subject: Option<&'static SubjectEntry>,
    pub category_type: Option<CategoryType>,
    /// Keys are always ids from `subject.extra_fields`
    pub extra_fields: BTreeMap<String, String>,
    pub location: LocationInfo,
    pub identity: IdentityInput,
    pub attachments: Vec<Attachment>,
    pub consent_accepted: bool,
    pub current_step: Step,
    pub analysis: Option<Analysis>,
}

impl Default for WizardFormState {
    fn default() -> Self {
        Self {
            narrative: String::new(),
            subject: None,
            category_type: None,
            extra_fields: BTreeMap::new(),
            location: LocationInfo::default(),
            identity: IdentityInput::default(),
            attachments: Vec::new(),
            consent_accepted: false,
            current_step: Step::Narrative,
            analysis: None,
        }
    }
}

impl WizardFormState {
    /// Drop extra-field values the selected subject does not define
    pub fn reconcile_extra_fields(&mut self) {
        match self.subject {
            Some(subject) => self
                .extra_fields
                .retain(|id, _| subject.field(id).is_some()),
            None => self.extra_fields.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_by_id;

    #[test]
    fn test_reconcile_keeps_only_fields_of_new_subject() {
        let mut state = WizardFormState {
            subject: get_by_id("educacao-infraestrutura"),
            ..Default::default()
        };
        state
            .extra_fields
            .insert("escola-nome".to_string(), "CEF 01 do Gama".to_string());
        state
            .extra_fields
            .insert("problema-infra".to_string(), "Outro".to_string());

        // Shares the school-name field, not the infrastructure one
        state.subject = get_by_id("educacao-merenda");
        state.reconcile_extra_fields();

        assert_eq!(state.extra_fields.len(), 1);
        assert_eq!(state.extra_fields["escola-nome"], "CEF 01 do Gama");

        state.subject = None;
        state.reconcile_extra_fields();
        assert!(state.extra_fields.is_empty());
    }
}
