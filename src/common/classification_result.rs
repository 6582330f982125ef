use serde::{Deserialize, Serialize};

use crate::common::Severity;
use crate::errors::DiagnosisError;

/// One entry of the ranked alternatives list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativePrediction {
    /// Display label, e.g. `"Tomato - Late blight"`.
    #[serde(rename = "class")]
    pub label: String,
    /// Percentage, rounded to two decimals.
    pub confidence: f64,
}

impl AlternativePrediction {
    pub fn new(label: String, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// Diagnostic report for a single leaf image.
///
/// Built once by the orchestrator and never mutated afterwards; the fields are
/// only reachable through getters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    crop: String,
    disease: String,
    severity: Severity,
    confidence: f64,
    recommendations: Vec<String>,
    #[serde(rename = "all_predictions")]
    alternatives: Vec<AlternativePrediction>,
    #[serde(rename = "className")]
    class_name: String,
}

impl ClassificationResult {
    pub(crate) fn new(
        crop: String,
        disease: String,
        severity: Severity,
        confidence: f64,
        recommendations: Vec<String>,
        alternatives: Vec<AlternativePrediction>,
        class_name: String,
    ) -> Self {
        Self {
            crop,
            disease,
            severity,
            confidence,
            recommendations,
            alternatives,
            class_name,
        }
    }

    pub fn crop(&self) -> &str {
        &self.crop
    }

    pub fn disease(&self) -> &str {
        &self.disease
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Top-1 confidence as a percentage in `[0, 100]`, two decimals.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn alternatives(&self) -> &[AlternativePrediction] {
        &self.alternatives
    }

    /// Raw vocabulary label of the top-1 class.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_healthy(&self) -> bool {
        self.severity == Severity::Healthy
    }

    pub fn print_result(&self) {
        println!(
            "Diagnosis: Crop: {}, Disease: {}, Severity: {}, Confidence: {:.2}%",
            self.crop, self.disease, self.severity, self.confidence
        );
        for (i, alt) in self.alternatives.iter().enumerate() {
            println!("  {}. {} ({:.2}%)", i + 1, alt.label, alt.confidence);
        }
    }
}

/// JSON envelope handed to the HTTP layer: the flattened report plus
/// `success: true`, or `success: false` and an `error` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiagnosisResponse {
    pub fn success(result: ClassificationResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &DiagnosisError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl From<Result<ClassificationResult, DiagnosisError>> for DiagnosisResponse {
    fn from(outcome: Result<ClassificationResult, DiagnosisError>) -> Self {
        match outcome {
            Ok(result) => Self::success(result),
            Err(err) => Self::failure(&err),
        }
    }
}
