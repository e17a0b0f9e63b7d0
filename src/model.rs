use crate::color::ScoreTier;
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// The analysis payload handed in by the upstream provider. Immutable for
/// the duration of a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub risk_level: String,
    pub compliance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    #[serde(default, alias = "model_used", skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, alias = "tokens_used", skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(
        default,
        alias = "processing_time",
        alias = "processingTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub processing_time_seconds: Option<f64>,
    #[serde(default, alias = "document_info", skip_serializing_if = "Option::is_none")]
    pub document_info: Option<DocumentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, alias = "file_size", skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, alias = "text_length", skip_serializing_if = "Option::is_none")]
    pub text_length: Option<u64>,
    #[serde(default, alias = "extraction_method", skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
}

impl AnalysisResult {
    /// Parses a JSON payload. Missing or mistyped required fields are
    /// reported as invalid input.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| ReportError::InvalidInput(err.to_string()))
    }

    /// Checks the payload and produces the normalised block inputs. Runs
    /// before any page exists, so a rejected payload never yields a file.
    pub fn validate(&self, include_metadata: bool) -> Result<ReportData> {
        let score = ComplianceScore::new(self.compliance_score)?;
        let metadata = if include_metadata {
            self.metadata
                .as_ref()
                .map(MetadataEntries::from_metadata)
                .filter(|entries| !entries.is_empty())
        } else {
            None
        };
        Ok(ReportData {
            summary: self.summary.clone(),
            key_points: self.key_points.clone(),
            suggested_actions: self.suggested_actions.clone(),
            risk_level: self.risk_level.trim().to_string(),
            score,
            metadata,
        })
    }
}

/// A score known to lie in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComplianceScore(u8);

impl ComplianceScore {
    /// Rejects non-finite scores and scores outside 0..=100; in-range
    /// fractional scores are then rounded to the nearest integer.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(ReportError::InvalidInput(format!(
                "complianceScore must be a finite number, got {value}"
            )));
        }
        if !(0.0..=100.0).contains(&value) {
            return Err(ReportError::InvalidInput(format!(
                "complianceScore must be within 0..=100, got {value}"
            )));
        }
        Ok(Self(value.round() as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn tier(self) -> ScoreTier {
        ScoreTier::from_score(self.0)
    }

    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

/// The four metadata slots, already formatted for display. Slot order is
/// fixed: model and time on the first row, tokens and pages on the second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataEntries {
    pub model: Option<String>,
    pub processing_time: Option<String>,
    pub tokens: Option<String>,
    pub pages: Option<String>,
}

impl MetadataEntries {
    pub fn from_metadata(metadata: &AnalysisMetadata) -> Self {
        Self {
            model: metadata
                .model_used
                .as_deref()
                .map(str::trim)
                .filter(|model| !model.is_empty())
                .map(|model| format!("Modèle IA: {model}")),
            processing_time: metadata
                .processing_time_seconds
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(|secs| format!("Temps: {secs:.2}s")),
            tokens: metadata
                .tokens_used
                .filter(|tokens| *tokens > 0)
                .map(|tokens| format!("Tokens: {tokens}")),
            pages: metadata
                .document_info
                .as_ref()
                .and_then(|info| info.pages)
                .filter(|pages| *pages > 0)
                .map(|pages| format!("Pages: {pages}")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(Option::is_none)
    }

    pub fn slots(&self) -> [Option<&str>; 4] {
        [
            self.model.as_deref(),
            self.processing_time.as_deref(),
            self.tokens.as_deref(),
            self.pages.as_deref(),
        ]
    }
}

/// Validated block inputs consumed by the composer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub summary: String,
    pub key_points: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub risk_level: String,
    pub score: ComplianceScore,
    pub metadata: Option<MetadataEntries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            summary: "Short summary.".to_string(),
            key_points: vec!["A".to_string()],
            suggested_actions: vec!["B".to_string()],
            risk_level: "Faible".to_string(),
            compliance_score: 92.0,
            metadata: None,
        }
    }

    #[test]
    fn parses_camel_case_payload_with_snake_case_metadata() {
        let json = r#"{
            "summary": "S",
            "keyPoints": ["k"],
            "suggestedActions": ["a"],
            "riskLevel": "Moyen",
            "complianceScore": 70,
            "metadata": {
                "model_used": "gpt",
                "tokens_used": 1200,
                "processing_time": 2.5,
                "document_info": { "pages": 3, "filename": "x.pdf" },
                "somethingElse": true
            }
        }"#;
        let result = AnalysisResult::from_json(json).unwrap();
        let metadata = result.metadata.clone().unwrap();
        assert_eq!(metadata.model_used.as_deref(), Some("gpt"));
        assert_eq!(metadata.tokens_used, Some(1200));
        assert_eq!(metadata.processing_time_seconds, Some(2.5));
        assert_eq!(metadata.document_info.unwrap().pages, Some(3));

        let data = result.validate(true).unwrap();
        let entries = data.metadata.unwrap();
        assert_eq!(entries.model.as_deref(), Some("Modèle IA: gpt"));
        assert_eq!(entries.processing_time.as_deref(), Some("Temps: 2.50s"));
        assert_eq!(entries.tokens.as_deref(), Some("Tokens: 1200"));
        assert_eq!(entries.pages.as_deref(), Some("Pages: 3"));
    }

    #[test]
    fn missing_required_field_is_invalid_input() {
        let err = AnalysisResult::from_json(r#"{"summary":"S","complianceScore":10}"#).unwrap_err();
        assert!(err.is_invalid_input());
        let err = AnalysisResult::from_json(
            r#"{"summary":"S","keyPoints":"nope","suggestedActions":[],"complianceScore":10}"#,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        for bad in [-5.0, 140.0, -0.4, 100.4, 100.6, f64::NAN, f64::INFINITY] {
            let result = AnalysisResult {
                compliance_score: bad,
                ..sample()
            };
            assert!(result.validate(true).unwrap_err().is_invalid_input(), "{bad}");
        }
    }

    #[test]
    fn boundary_and_fractional_scores_are_accepted() {
        assert_eq!(ComplianceScore::new(0.0).unwrap().value(), 0);
        assert_eq!(ComplianceScore::new(100.0).unwrap().value(), 100);
        assert_eq!(ComplianceScore::new(79.6).unwrap().value(), 80);
        assert_eq!(ComplianceScore::new(0.4).unwrap().value(), 0);
        assert_eq!(ComplianceScore::new(99.5).unwrap().value(), 100);
        assert!(ComplianceScore::new(-0.4).unwrap_err().is_invalid_input());
        assert!(ComplianceScore::new(100.4).unwrap_err().is_invalid_input());
    }

    #[test]
    fn metadata_is_dropped_when_excluded_or_empty() {
        let with_meta = AnalysisResult {
            metadata: Some(AnalysisMetadata {
                model_used: Some("m".to_string()),
                ..AnalysisMetadata::default()
            }),
            ..sample()
        };
        assert!(with_meta.validate(true).unwrap().metadata.is_some());
        assert!(with_meta.validate(false).unwrap().metadata.is_none());

        let empty_meta = AnalysisResult {
            metadata: Some(AnalysisMetadata {
                tokens_used: Some(0),
                model_used: Some("  ".to_string()),
                ..AnalysisMetadata::default()
            }),
            ..sample()
        };
        assert!(empty_meta.validate(true).unwrap().metadata.is_none());
    }
}
