use crate::common::Severity;

/// Prepended to the category advice when a disease is graded `High`.
pub const URGENT_ACTIONS: [&str; 2] = [
    "Immediate action required - consult agricultural expert",
    "Isolate affected plants to prevent spread",
];

/// Disease families recognised by keyword, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiseaseCategory {
    Healthy,
    Blight,
    Rust,
    Spot,
    Mildew,
    Scab,
    Other,
}

impl DiseaseCategory {
    /// Keyword categories in the order they are tested. `Other` is the
    /// fallback and has no keyword.
    pub const ORDERED: [DiseaseCategory; 6] = [
        DiseaseCategory::Healthy,
        DiseaseCategory::Blight,
        DiseaseCategory::Rust,
        DiseaseCategory::Spot,
        DiseaseCategory::Mildew,
        DiseaseCategory::Scab,
    ];

    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            DiseaseCategory::Healthy => Some("healthy"),
            DiseaseCategory::Blight => Some("blight"),
            DiseaseCategory::Rust => Some("rust"),
            DiseaseCategory::Spot => Some("spot"),
            DiseaseCategory::Mildew => Some("mildew"),
            DiseaseCategory::Scab => Some("scab"),
            DiseaseCategory::Other => None,
        }
    }

    /// First category whose keyword occurs in `disease`, ignoring case.
    pub fn from_disease(disease: &str) -> Self {
        let disease = disease.to_lowercase();
        Self::ORDERED
            .into_iter()
            .find(|category| category.keyword().is_some_and(|kw| disease.contains(kw)))
            .unwrap_or(DiseaseCategory::Other)
    }

    pub fn advice(&self) -> &'static [&'static str] {
        match self {
            DiseaseCategory::Healthy => &[
                "Your plant appears healthy! Continue with regular care.",
                "Maintain proper watering schedule",
                "Ensure adequate sunlight and ventilation",
                "Regular monitoring for early disease detection",
            ],
            DiseaseCategory::Blight => &[
                "Remove affected leaves and dispose properly",
                "Improve air circulation around plants",
                "Apply copper-based fungicide",
                "Avoid overhead watering",
            ],
            DiseaseCategory::Rust => &[
                "Apply fungicide containing propiconazole",
                "Remove infected plant debris",
                "Ensure proper plant spacing for air circulation",
            ],
            DiseaseCategory::Spot => &[
                "Apply bactericide or fungicide as appropriate",
                "Remove affected leaves",
                "Improve drainage and reduce humidity",
            ],
            DiseaseCategory::Mildew => &[
                "Apply sulfur-based fungicide",
                "Improve air circulation",
                "Reduce humidity levels",
                "Remove affected plant parts",
            ],
            DiseaseCategory::Scab => &[
                "Apply preventive fungicide spray",
                "Prune for better air circulation",
                "Remove fallen leaves and debris",
            ],
            DiseaseCategory::Other => &[
                "Consult local agricultural extension office",
                "Remove affected plant parts",
                "Maintain proper plant hygiene",
                "Monitor regularly for disease progression",
            ],
        }
    }
}

/// Ordered care advice for a diagnosis.
///
/// Healthy plants get the healthy list whatever the severity. Otherwise a
/// `High` severity puts [`URGENT_ACTIONS`] in front of the category advice.
pub fn recommend(crop: &str, disease: &str, severity: Severity) -> Vec<String> {
    let category = DiseaseCategory::from_disease(disease);
    log::debug!("Recommendations for {} / {}: {:?} ({})", crop, disease, category, severity);

    if category == DiseaseCategory::Healthy {
        return category.advice().iter().map(|x| x.to_string()).collect();
    }

    let mut recommendations = Vec::with_capacity(URGENT_ACTIONS.len() + 4);
    if severity == Severity::High {
        recommendations.extend(URGENT_ACTIONS.iter().map(|x| x.to_string()));
    }
    recommendations.extend(category.advice().iter().map(|x| x.to_string()));
    recommendations
}
