//! Wizard step model
//!
//! Single source of truth for which steps exist. The visible sequence is
//! always derived from the live subject selection and never cached.

use crate::catalog::SubjectEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Narrative,
    Subject,
    ExtraFields,
    Location,
    Summary,
    Identity,
    Attachments,
    Finalize,
}

pub const BASE_SEQUENCE: [Step; 8] = [
    Step::Narrative,
    Step::Subject,
    Step::ExtraFields,
    Step::Location,
    Step::Summary,
    Step::Identity,
    Step::Attachments,
    Step::Finalize,
];

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Narrative => "Relato",
            Step::Subject => "Assunto",
            Step::ExtraFields => "Dados complementares",
            Step::Location => "Localização",
            Step::Summary => "Resumo",
            Step::Identity => "Identificação",
            Step::Attachments => "Anexos",
            Step::Finalize => "Confirmação",
        }
    }

    /// Whether the step is shown for the given subject selection
    pub fn is_visible(&self, subject: Option<&SubjectEntry>) -> bool {
        match self {
            Step::ExtraFields => subject.map_or(false, |s| s.has_extra_fields()),
            // Shown by default until a subject opts out
            Step::Location => subject.map_or(true, |s| s.requires_location),
            _ => true,
        }
    }
}

pub fn visible_steps(subject: Option<&SubjectEntry>) -> Vec<Step> {
    BASE_SEQUENCE
        .iter()
        .copied()
        .filter(|step| step.is_visible(subject))
        .collect()
}

/// Step after `current`; saturates at the last step
pub fn next_step(current: Step, visible: &[Step]) -> Step {
    match visible.iter().position(|s| *s == current) {
        Some(i) if i + 1 < visible.len() => visible[i + 1],
        Some(_) => current,
        None => settle(current, visible),
    }
}

/// Step before `current`; saturates at the first step
pub fn previous_step(current: Step, visible: &[Step]) -> Step {
    match visible.iter().position(|s| *s == current) {
        Some(i) if i > 0 => visible[i - 1],
        Some(_) => current,
        None => settle(current, visible),
    }
}

/// Map a step that may have disappeared to the nearest visible step at or
/// before it in the base sequence.
pub fn settle(current: Step, visible: &[Step]) -> Step {
    if visible.contains(&current) {
        return current;
    }

    let base_index = BASE_SEQUENCE
        .iter()
        .position(|s| *s == current)
        .unwrap_or(0);

    BASE_SEQUENCE[..base_index]
        .iter()
        .rev()
        .find(|s| visible.contains(*s))
        .copied()
        .unwrap_or(Step::Narrative)
}

#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub step: Step,
    pub title: &'static str,
}

/// Position of the current step for progress indicators
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    /// 1-based
    pub position: usize,
    pub total: usize,
    pub steps: Vec<StepInfo>,
}

pub fn progress(current: Step, subject: Option<&SubjectEntry>) -> Progress {
    let visible = visible_steps(subject);
    let current = settle(current, &visible);
    let position = visible.iter().position(|s| *s == current).unwrap_or(0) + 1;

    Progress {
        position,
        total: visible.len(),
        steps: visible
            .into_iter()
            .map(|step| StepInfo {
                step,
                title: step.title(),
            })
            .collect(),
    }
}
