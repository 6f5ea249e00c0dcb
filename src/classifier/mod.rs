//! Keyword classifier
//!
//! Deterministic keyword-count heuristic that suggests a category type and
//! a responsible department for a free-text narrative. This is not a trained
//! model: scores are plain substring hit counts over fixed tables.

use crate::models::{CategoryType, Department};
use serde::Serialize;

/// Upper bound of the confidence heuristic
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Maximum number of matched keywords reported
pub const MAX_MATCHED_KEYWORDS: usize = 5;

/// Keywords per category type, in tie-breaking order
const CATEGORY_KEYWORDS: &[(CategoryType, &[&str])] = &[
    (
        CategoryType::Complaint,
        &[
            "ruim",
            "péssimo",
            "insatisfeito",
            "demora",
            "falta",
            "não funciona",
            "problema",
            "falha",
            "pior",
            "descaso",
            "absurdo",
            "buraco",
            "esgoto",
            "lixo",
            "abandonado",
            "quebrado",
            "estragado",
            "não atende",
            "demorado",
            "atrasado",
        ],
    ),
    (
        CategoryType::Suggestion,
        &[
            "sugiro",
            "poderia",
            "melhorar",
            "ideia",
            "proposta",
            "seria bom",
            "gostaria que",
            "recomendo",
            "propor",
            "implementar",
            "criar",
            "desenvolver",
        ],
    ),
    (
        CategoryType::Praise,
        &[
            "parabéns",
            "excelente",
            "ótimo",
            "bom trabalho",
            "agradeço",
            "satisfeito",
            "eficiente",
            "atencioso",
            "maravilhoso",
            "obrigado",
            "prestativo",
            "rápido",
            "competente",
        ],
    ),
    (
        CategoryType::Report,
        &[
            "irregularidade",
            "corrupção",
            "desvio",
            "fraude",
            "ilegal",
            "crime",
            "abuso",
            "assédio",
            "tráfico",
            "violação",
            "ilícito",
            "propina",
            "suborno",
        ],
    ),
    (
        CategoryType::Request,
        &[
            "solicito",
            "preciso",
            "necessito",
            "requeiro",
            "peço",
            "gostaria de",
            "quero",
            "desejo",
            "informação",
            "documento",
            "atendimento",
            "serviço",
        ],
    ),
];

/// Domain keywords per department, in tie-breaking order
const DEPARTMENT_KEYWORDS: &[(Department, &[&str])] = &[
    (
        Department::Seedf,
        &[
            "escola",
            "educação",
            "professor",
            "aluno",
            "matrícula",
            "ensino",
            "aula",
            "creche",
            "estudante",
        ],
    ),
    (
        Department::Ses,
        &[
            "hospital",
            "saúde",
            "médico",
            "ubs",
            "posto de saúde",
            "remédio",
            "consulta",
            "exame",
            "dengue",
            "vacina",
            "enfermeiro",
            "clínica",
        ],
    ),
    (
        Department::Ssp,
        &[
            "segurança",
            "polícia",
            "delegacia",
            "crime",
            "violência",
            "assalto",
            "furto",
            "roubo",
            "bombeiro",
        ],
    ),
    (
        Department::Detran,
        &[
            "carro",
            "veículo",
            "cnh",
            "multa",
            "habilitação",
            "trânsito",
            "licenciamento",
            "semáforo",
            "placa",
            "motorista",
        ],
    ),
    (
        Department::Caesb,
        &[
            "água",
            "esgoto",
            "vazamento",
            "falta de água",
            "conta de água",
            "saneamento",
            "hidrômetro",
        ],
    ),
    (
        Department::Ceb,
        &[
            "luz",
            "energia",
            "falta de luz",
            "conta de luz",
            "poste",
            "iluminação",
            "elétrica",
            "apagão",
        ],
    ),
    (
        Department::Novacap,
        &[
            "buraco",
            "asfalto",
            "obra",
            "calçada",
            "praça",
            "parque",
            "árvore",
            "poda",
            "infraestrutura",
        ],
    ),
    (
        Department::Slu,
        &[
            "lixo",
            "coleta",
            "reciclagem",
            "limpeza urbana",
            "entulho",
            "container",
            "gari",
        ],
    ),
    (
        Department::Seagri,
        &["agricultura", "rural", "fazenda", "produtor", "agrícola"],
    ),
    (
        Department::Semob,
        &[
            "ônibus",
            "transporte público",
            "tarifa",
            "linha",
            "horário",
            "metrô",
            "terminal",
            "passe livre",
            "brt",
        ],
    ),
];

/// Word lists for the category sniff applied when the subject is confirmed.
/// Checked in this order; the first list with a hit decides.
const PRAISE_WORDS: &[&str] = &["elogio", "elogiar", "parabéns", "parabenizar", "agradeço"];
const SUGGESTION_WORDS: &[&str] = &["sugiro", "sugestão", "seria bom", "proponho"];
const REPORT_WORDS: &[&str] = &["denúncia", "denunciar", "corrupção", "propina", "fraude"];
const REQUEST_WORDS: &[&str] = &["solicito", "solicitação", "gostaria de", "peço", "requeiro"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub suggested_category_type: CategoryType,
    pub suggested_department: Department,
    /// Heuristic score in [0.5, 0.95]; not a probability
    pub confidence_score: f64,
    pub rationale_text: String,
    pub matched_keywords: Vec<String>,
}

fn count_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Highest-scoring key; earlier entries win ties. `None` when nothing matched.
fn best_match<K: Copy>(text: &str, table: &[(K, &[&str])]) -> Option<(K, usize)> {
    let mut best: Option<(K, usize)> = None;
    for (key, keywords) in table {
        let score = count_hits(text, keywords);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((*key, score));
        }
    }
    best
}

/// Classify a narrative.
///
/// Callers gate on the minimum narrative length; this function accepts any
/// input and falls back to `Request` / `Other` when nothing matches.
pub fn classify(text: &str) -> ClassificationResult {
    let lower = text.to_lowercase();

    let (category, category_hits) =
        best_match(&lower, CATEGORY_KEYWORDS).unwrap_or((CategoryType::Request, 0));
    let (department, department_hits) =
        best_match(&lower, DEPARTMENT_KEYWORDS).unwrap_or((Department::Other, 0));

    let matched_keywords = CATEGORY_KEYWORDS
        .iter()
        .flat_map(|(_, keywords)| keywords.iter())
        .filter(|k| lower.contains(*k))
        .take(MAX_MATCHED_KEYWORDS)
        .map(|k| k.to_string())
        .collect();

    let confidence_score = (0.5 + 0.1 * category_hits as f64 + 0.1 * department_hits as f64)
        .min(MAX_CONFIDENCE);

    ClassificationResult {
        suggested_category_type: category,
        suggested_department: department,
        confidence_score,
        rationale_text: format!(
            "Identifiquei características de {} relacionada ao órgão {}.",
            category.display_name().to_lowercase(),
            department.code()
        ),
        matched_keywords,
    }
}

/// Category type recorded on submission, sniffed from the narrative.
///
/// Uses its own short word lists and defaults to `Complaint`, unlike
/// [`classify`] which defaults to `Request`.
pub fn sniff_category_type(narrative: &str) -> CategoryType {
    let lower = narrative.to_lowercase();
    let rules: [(&[&str], CategoryType); 4] = [
        (PRAISE_WORDS, CategoryType::Praise),
        (SUGGESTION_WORDS, CategoryType::Suggestion),
        (REPORT_WORDS, CategoryType::Report),
        (REQUEST_WORDS, CategoryType::Request),
    ];

    rules
        .iter()
        .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
        .map(|(_, category)| *category)
        .unwrap_or(CategoryType::Complaint)
}
