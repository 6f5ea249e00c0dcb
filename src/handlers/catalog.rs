//! Classifier and subject catalog endpoints

use super::{fail, ok, ApiResult};
use crate::catalog::{self, SubjectEntry, SUBJECTS};
use crate::classifier::{classify, ClassificationResult};
use crate::models::{ApiResponse, CategoryType};
use crate::validation::{to_field_errors, validate_narrative};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NarrativeInput {
    pub narrative: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubjectQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub name: &'static str,
    pub subject_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryTypeInfo {
    pub id: CategoryType,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
    pub category_types: Vec<CategoryTypeInfo>,
}

/// Run the classifier over a narrative. Short narratives are rejected here
/// because the classifier itself never validates its input.
pub async fn classify_narrative(Json(input): Json<NarrativeInput>) -> impl IntoResponse {
    if let Err(e) = validate_narrative(&input.narrative) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<ClassificationResult>::invalid(
                e.to_string(),
                to_field_errors([e]),
            )),
        );
    }

    ok(classify(&input.narrative))
}

/// Search by text, filter by category, or list everything
pub async fn list_subjects(
    Query(query): Query<SubjectQuery>,
) -> ApiResult<Vec<&'static SubjectEntry>> {
    let subjects = match (query.q, query.category) {
        (Some(q), _) => catalog::search_by_text(&q),
        (None, Some(category)) => catalog::by_category(&category),
        (None, None) => SUBJECTS.iter().collect(),
    };
    ok(subjects)
}

pub async fn get_subject(Path(id): Path<String>) -> ApiResult<&'static SubjectEntry> {
    match catalog::get_by_id(&id) {
        Some(subject) => ok(subject),
        None => fail(StatusCode::NOT_FOUND, "Subject not found"),
    }
}

pub async fn suggest_subjects(
    Json(input): Json<NarrativeInput>,
) -> ApiResult<Vec<&'static SubjectEntry>> {
    ok(catalog::suggest_by_narrative(&input.narrative))
}

pub async fn list_categories() -> ApiResult<CategoriesResponse> {
    let categories = catalog::categories()
        .iter()
        .map(|&name| CategorySummary {
            name,
            subject_count: catalog::by_category(name).len(),
        })
        .collect();

    let category_types = CategoryType::ALL
        .iter()
        .map(|t| CategoryTypeInfo {
            id: *t,
            name: t.display_name(),
            description: t.description(),
        })
        .collect();

    ok(CategoriesResponse {
        categories,
        category_types,
    })
}
