//! Subject catalog
//!
//! Static, read-only table of subjects a manifestation can be filed under.
//! Each subject names its responsible department, an optional schema of
//! extra fields and whether a physical location must be given.

mod data;

use crate::models::Department;
use serde::Serialize;

pub use data::{CATEGORIES, SUBJECTS};

/// Minimum query length accepted by [`search_by_text`]
pub const MIN_SEARCH_LEN: usize = 3;

/// Minimum narrative length accepted by [`suggest_by_narrative`]
pub const MIN_NARRATIVE_LEN: usize = 20;

/// Maximum number of suggestions returned for a narrative
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFieldKind {
    Text,
    Number,
    Date,
    Select,
    MultilineText,
}

/// Schema of one subject-specific input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtraFieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ExtraFieldKind,
    pub required: bool,
    pub placeholder: Option<&'static str>,
    /// Non-empty iff `kind` is `Select`
    pub options: &'static [&'static str],
    pub max_length: Option<usize>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SubjectEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub department: Department,
    pub extra_fields: &'static [ExtraFieldSpec],
    pub requires_location: bool,
    #[serde(skip)]
    pub(crate) keywords: &'static [&'static str],
}

impl SubjectEntry {
    pub fn field(&self, id: &str) -> Option<&'static ExtraFieldSpec> {
        self.extra_fields.iter().find(|f| f.id == id)
    }

    pub fn has_extra_fields(&self) -> bool {
        !self.extra_fields.is_empty()
    }
}

/// Look up a subject by id
pub fn get_by_id(id: &str) -> Option<&'static SubjectEntry> {
    SUBJECTS.iter().find(|s| s.id == id)
}

/// Distinct category names in display order
pub fn categories() -> &'static [&'static str] {
    CATEGORIES
}

/// Subjects filed under a category (exact name match)
pub fn by_category(category: &str) -> Vec<&'static SubjectEntry> {
    SUBJECTS.iter().filter(|s| s.category == category).collect()
}

/// Case-insensitive substring search over subject name and category name.
///
/// Queries shorter than [`MIN_SEARCH_LEN`] characters (after trimming)
/// return no results. Results keep catalog declaration order.
pub fn search_by_text(query: &str) -> Vec<&'static SubjectEntry> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_LEN {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    SUBJECTS
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.category.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Rank subjects by how many of their keywords occur in the narrative.
///
/// Only subjects with at least one hit are returned, highest score first,
/// at most [`MAX_SUGGESTIONS`]. Equal scores keep catalog order.
pub fn suggest_by_narrative(narrative: &str) -> Vec<&'static SubjectEntry> {
    if narrative.chars().count() < MIN_NARRATIVE_LEN {
        return Vec::new();
    }

    let text = narrative.to_lowercase();
    let mut scored: Vec<(&'static SubjectEntry, usize)> = SUBJECTS
        .iter()
        .filter_map(|subject| {
            let score = subject
                .keywords
                .iter()
                .filter(|k| text.contains(*k))
                .count();
            (score > 0).then_some((subject, score))
        })
        .collect();

    // sort_by is stable, so ties stay in declaration order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(subject, _)| subject)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(subjects: &[&SubjectEntry]) -> Vec<&'static str> {
        subjects.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_subject_ids_are_unique() {
        let mut seen = HashSet::new();
        for subject in SUBJECTS {
            assert!(seen.insert(subject.id), "duplicate id {}", subject.id);
        }
    }

    #[test]
    fn test_select_fields_have_options() {
        for subject in SUBJECTS {
            for field in subject.extra_fields {
                assert_eq!(
                    field.kind == ExtraFieldKind::Select,
                    !field.options.is_empty(),
                    "{}.{}",
                    subject.id,
                    field.id
                );
            }
        }
    }

    #[test]
    fn test_every_subject_category_is_listed() {
        for subject in SUBJECTS {
            assert!(CATEGORIES.contains(&subject.category), "{}", subject.id);
        }
    }

    #[test]
    fn test_search_requires_three_characters() {
        assert!(search_by_text("").is_empty());
        assert!(search_by_text("lu").is_empty());
        assert!(search_by_text("  ág ").is_empty());
        assert!(!search_by_text("ilu").is_empty());
    }

    #[test]
    fn test_search_matches_name_and_category_case_insensitive() {
        let results = search_by_text("ILUMINAÇÃO");
        let found = ids(&results);
        assert!(found.contains(&"iluminacao-falta"));
        assert!(found.contains(&"iluminacao-instalacao"));

        let by_category = search_by_text("saneamento");
        assert_eq!(
            ids(&by_category),
            vec!["agua-falta", "agua-vazamento", "esgoto-problema"]
        );
    }

    #[test]
    fn test_search_is_idempotent() {
        assert_eq!(ids(&search_by_text("escola")), ids(&search_by_text("escola")));
        assert_eq!(ids(&search_by_text("ônibus")), ids(&search_by_text("ônibus")));
    }

    #[test]
    fn test_get_by_id() {
        let subject = get_by_id("buraco-via").unwrap();
        assert_eq!(subject.department, Department::Novacap);
        assert!(subject.requires_location);
        assert!(get_by_id("does-not-exist").is_none());
    }

    #[test]
    fn test_by_category() {
        let health = by_category("Saúde");
        assert_eq!(health.len(), 5);
        assert!(health.iter().all(|s| s.department == Department::Ses));
    }

    #[test]
    fn test_suggest_ignores_short_narratives() {
        assert!(suggest_by_narrative("buraco na rua").is_empty());
    }

    #[test]
    fn test_suggest_ranks_by_score() {
        let suggestions =
            suggest_by_narrative("O posto de saúde da minha quadra está sem médico hoje.");
        assert_eq!(suggestions[0].id, "saude-atendimento-ubs");
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
    }

    #[test]
    fn test_suggest_ties_keep_catalog_order() {
        // "escola" scores one hit on both matrícula and infraestrutura
        let suggestions = suggest_by_narrative("Quero falar sobre a escola do meu bairro aqui.");
        assert_eq!(
            ids(&suggestions),
            vec!["educacao-matricula", "educacao-infraestrutura"]
        );
    }

    #[test]
    fn test_suggest_returns_nothing_without_hits() {
        assert!(suggest_by_narrative("Texto qualquer sem nenhuma relação clara.").is_empty());
    }

    #[test]
    fn test_suggest_caps_at_five() {
        let narrative = "luz escuro poste buraco asfalto lixo coleta esgoto bueiro \
                         ônibus horário dengue mosquito árvore poda semáforo";
        assert_eq!(suggest_by_narrative(narrative).len(), MAX_SUGGESTIONS);
    }
}
