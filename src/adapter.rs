//! Turns the summarisation backend's response into the report input model.
//!
//! The backend only returns a free-text summary plus document statistics.
//! Key points, suggested actions, the compliance score and the risk level
//! are derived here with simple heuristics; the renderer treats all of them
//! as opaque values.

use crate::color::ScoreTier;
use crate::error::{ReportError, Result};
use crate::model::{AnalysisMetadata, AnalysisResult, DocumentInfo};
use serde::{Deserialize, Serialize};

pub const EMPTY_SUMMARY: &str = "Aucun résumé généré";

const GENERIC_KEY_POINTS: [&str; 3] = [
    "Document analysé avec succès",
    "Contenu extrait et traité par IA",
    "Prêt pour exploitation des données",
];

const BASE_ACTIONS: [&str; 4] = [
    "Réviser le contenu du document",
    "Partager les insights avec l'équipe",
    "Archiver le document traité",
    "Planifier les actions de suivi",
];

// (keywords, action) pairs checked against the lower-cased summary, in order.
const CONTENT_ACTIONS: [(&[&str], &str); 3] = [
    (&["conformité", "rgpd"], "Vérifier la conformité RGPD"),
    (&["contrat", "accord"], "Examiner les clauses contractuelles"),
    (&["financier", "budget"], "Analyser l'impact financier"),
];

const MAX_KEY_POINTS: usize = 4;
const MAX_ACTIONS: usize = 4;
const MIN_SENTENCE_CHARS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub summary_type: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub tokens_used: Option<u64>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub document_analysis: Option<DocumentAnalysis>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub text_length: Option<u64>,
    #[serde(default)]
    pub extraction_method: Option<String>,
}

impl From<&DocumentAnalysis> for DocumentInfo {
    fn from(value: &DocumentAnalysis) -> Self {
        DocumentInfo {
            filename: value.filename.clone(),
            file_size: value.file_size,
            pages: value.pages,
            text_length: value.text_length,
            extraction_method: value.extraction_method.clone(),
        }
    }
}

impl SummaryResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| ReportError::InvalidInput(err.to_string()))
    }
}

/// Builds an [`AnalysisResult`] from a backend response for the uploaded
/// file `filename`. A response flagged as failed is rejected with the
/// backend's own error text.
pub fn to_analysis_result(response: &SummaryResponse, filename: &str) -> Result<AnalysisResult> {
    if !response.success {
        let message = response
            .error
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or("analysis failed");
        return Err(ReportError::InvalidInput(message.to_string()));
    }

    let summary = response
        .summary
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_SUMMARY.to_string());
    let score = compliance_score(&summary, response.document_analysis.as_ref());

    Ok(AnalysisResult {
        key_points: extract_key_points(&summary),
        suggested_actions: suggested_actions(&summary),
        risk_level: risk_level(score).to_string(),
        compliance_score: f64::from(score),
        metadata: Some(AnalysisMetadata {
            model_used: response.model_used.clone(),
            tokens_used: response.tokens_used,
            processing_time_seconds: response.processing_time,
            document_info: response.document_analysis.as_ref().map(DocumentInfo::from),
            filename: Some(filename.to_string()).filter(|f| !f.is_empty()),
        }),
        summary,
    })
}

/// Up to four sentences of meaningful length, capitalised. Short summaries
/// are padded with generic points.
pub fn extract_key_points(summary: &str) -> Vec<String> {
    let mut points: Vec<String> = summary
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
        .take(MAX_KEY_POINTS)
        .map(capitalize_first)
        .collect();
    if points.len() < 2 {
        points.extend(GENERIC_KEY_POINTS.iter().map(|p| p.to_string()));
    }
    points
}

fn capitalize_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Content-specific actions first, then the generic ones, four at most.
pub fn suggested_actions(summary: &str) -> Vec<String> {
    let lower = summary.to_lowercase();
    CONTENT_ACTIONS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, action)| *action)
        .chain(BASE_ACTIONS)
        .take(MAX_ACTIONS)
        .map(str::to_string)
        .collect()
}

pub fn compliance_score(summary: &str, analysis: Option<&DocumentAnalysis>) -> u8 {
    let length = summary.chars().count();
    let mut score: u32 = 50;
    if length > 200 {
        score += 20;
    }
    if length > 500 {
        score += 10;
    }
    if let Some(analysis) = analysis {
        if analysis.pages.is_some_and(|pages| pages > 1) {
            score += 10;
        }
        if analysis.text_length.is_some_and(|len| len > 1000) {
            score += 10;
        }
    }
    score.min(100) as u8
}

pub fn risk_level(score: u8) -> &'static str {
    match ScoreTier::from_score(score) {
        ScoreTier::Success => "Faible",
        ScoreTier::Warning => "Moyen",
        ScoreTier::Danger => "Élevé",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_response_is_rejected_with_backend_error() {
        let response = SummaryResponse {
            success: false,
            error: Some("quota exceeded".to_string()),
            ..SummaryResponse::default()
        };
        let err = to_analysis_result(&response, "a.pdf").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn key_points_keep_long_sentences_capitalised() {
        let summary = "le contrat couvre la période 2024-2026. Court. \
                       les obligations de reporting sont trimestrielles! \
                       un audit externe est prévu chaque année? fin";
        let points = extract_key_points(summary);
        assert_eq!(
            points,
            vec![
                "Le contrat couvre la période 2024-2026",
                "Les obligations de reporting sont trimestrielles",
                "Un audit externe est prévu chaque année",
            ]
        );
    }

    #[test]
    fn short_summary_gets_generic_key_points() {
        let points = extract_key_points("Une seule phrase assez longue pour compter.");
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], GENERIC_KEY_POINTS[0]);
        assert_eq!(extract_key_points("").len(), 3);
    }

    #[test]
    fn content_actions_come_first_and_list_is_capped() {
        let actions = suggested_actions("Analyse RGPD du contrat et du budget");
        assert_eq!(
            actions,
            vec![
                "Vérifier la conformité RGPD",
                "Examiner les clauses contractuelles",
                "Analyser l'impact financier",
                "Réviser le contenu du document",
            ]
        );
        assert_eq!(suggested_actions("rien de spécial"), BASE_ACTIONS.to_vec());
    }

    #[test]
    fn score_heuristic_and_risk_levels() {
        assert_eq!(compliance_score("court", None), 50);
        let long = "x".repeat(600);
        let analysis = DocumentAnalysis {
            pages: Some(3),
            text_length: Some(5000),
            ..DocumentAnalysis::default()
        };
        assert_eq!(compliance_score(&long, Some(&analysis)), 100);
        assert_eq!(compliance_score(&"x".repeat(300), None), 70);
        assert_eq!(risk_level(100), "Faible");
        assert_eq!(risk_level(70), "Moyen");
        assert_eq!(risk_level(50), "Élevé");
    }

    #[test]
    fn backend_json_maps_to_a_renderable_result() {
        let json = r#"{
            "success": true,
            "summary": "Le document décrit la politique de conformité RGPD de l'entreprise.",
            "model_used": "llama3",
            "tokens_used": 850,
            "processing_time": 3.25,
            "document_analysis": {
                "filename": "politique.pdf",
                "file_size": 20480,
                "pages": 4,
                "text_length": 12000,
                "extraction_method": "pdfplumber"
            }
        }"#;
        let response = SummaryResponse::from_json(json).unwrap();
        let result = to_analysis_result(&response, "politique.pdf").unwrap();
        assert_eq!(result.compliance_score, 70.0);
        assert_eq!(result.risk_level, "Moyen");
        assert_eq!(result.suggested_actions[0], "Vérifier la conformité RGPD");
        let metadata = result.metadata.as_ref().unwrap();
        assert_eq!(metadata.filename.as_deref(), Some("politique.pdf"));
        assert_eq!(metadata.document_info.as_ref().unwrap().pages, Some(4));
        assert!(result.validate(true).is_ok());
    }

    #[test]
    fn missing_summary_uses_placeholder() {
        let response = SummaryResponse {
            success: true,
            ..SummaryResponse::default()
        };
        let result = to_analysis_result(&response, "").unwrap();
        assert_eq!(result.summary, EMPTY_SUMMARY);
        assert_eq!(result.compliance_score, 50.0);
        assert!(result.metadata.unwrap().filename.is_none());
    }
}
