use serde::{Deserialize, Serialize};

/// Above this top-1 confidence a diagnosis is graded `High` (or `Healthy`).
pub const HIGH_CONFIDENCE: f32 = 0.8;
/// Above this top-1 confidence a diagnosis is graded `Medium`.
pub const MEDIUM_CONFIDENCE: f32 = 0.6;

/// Coarse triage tier derived from the top-1 confidence and disease label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Healthy,
    Low,
    Medium,
    High,
}

// Hardcoded tier names. Storing the "proper" spelling and the lowercase version.
const HEALTHY: [&str; 2] = ["Healthy", "healthy"];
const LOW: [&str; 2] = ["Low", "low"];
const MEDIUM: [&str; 2] = ["Medium", "medium"];
const HIGH: [&str; 2] = ["High", "high"];

impl Severity {
    /// Grades a diagnosis. Comparisons are strict, so a confidence of exactly
    /// 0.8 or 0.6 falls into the lower band.
    pub fn classify(confidence: f32, disease: &str) -> Self {
        if confidence > HIGH_CONFIDENCE {
            if disease.to_lowercase().contains("healthy") {
                Severity::Healthy
            } else {
                Severity::High
            }
        } else if confidence > MEDIUM_CONFIDENCE {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            Severity::Healthy => HEALTHY[0],
            Severity::Low => LOW[0],
            Severity::Medium => MEDIUM[0],
            Severity::High => HIGH[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            Severity::Healthy => HEALTHY[1],
            Severity::Low => LOW[1],
            Severity::Medium => MEDIUM[1],
            Severity::High => HIGH[1],
        }
    }

    pub fn from_str(severity: &str) -> Option<Self> {
        match severity.to_lowercase().as_str() {
            "healthy" => Some(Severity::Healthy),
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.str())
    }
}
