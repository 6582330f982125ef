use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;

use crate::utils;

/// Label used when the classifier points past the end of the vocabulary.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// PlantVillage class names in the ordinal order the bundled classifier was
/// trained with. Never re-sort: position `i` is the meaning of output `i`.
/// `Blueberry___healthy` was added last so the first 37 ordinals are unchanged.
pub const PLANT_VILLAGE_CLASSES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Cherry_(including_sour)___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___healthy",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___healthy",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___healthy",
    "Potato___Late_blight",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___healthy",
    "Strawberry___Leaf_scorch",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___healthy",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Blueberry___healthy",
];

/// Ordered class labels. Position `i` is the label of classifier output `i`.
///
/// The labels are shared behind an `Arc` and never re-ordered after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassVocabulary {
    labels: Arc<[String]>,
}

impl Default for ClassVocabulary {
    fn default() -> Self {
        Self::plant_village()
    }
}

impl ClassVocabulary {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels: labels.into(),
        }
    }

    pub fn plant_village() -> Self {
        Self::new(PLANT_VILLAGE_CLASSES.iter().map(|x| x.to_string()).collect())
    }

    /// Reads one label per line. Blank lines are skipped, order is kept.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let labels = utils::file_to_vec(path.as_ref())?
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<String>>();

        if labels.is_empty() {
            anyhow::bail!("Labels file {:?} does not contain any class names", path.as_ref());
        }
        Ok(Self::new(labels))
    }

    /// Parses the `names` entry that exporters write into ONNX metadata.
    ///
    /// String format: `{0: 'Apple___Apple_scab', 1: 'Apple___Black_rot', ...}`
    pub fn from_model_metadata(names: &str) -> Option<Self> {
        let re = Regex::new(r#"(['"])([-(),\w '"]+?)(['"])\s*[,}\]]"#).ok()?;
        let labels = re
            .captures_iter(names)
            .map(|x| x.extract())
            .map(|(_, [_, name, _])| name.to_string())
            .collect::<Vec<String>>();

        if labels.is_empty() {
            None
        } else {
            Some(Self::new(labels))
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|x| x.as_str())
    }

    /// Label at `index`, or [`UNKNOWN_LABEL`] when the index is out of range.
    pub fn label_or_unknown(&self, index: usize) -> &str {
        self.get(index).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|x| x == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|x| x.as_str())
    }

    /// Logs a warning when the classifier width disagrees with the vocabulary.
    pub fn check_width(&self, output_width: usize) -> bool {
        if output_width != self.len() {
            log::warn!(
                "Classifier emits {} scores but the vocabulary holds {} labels; \
                 out-of-range predictions will be reported as '{}'",
                output_width,
                self.len(),
                UNKNOWN_LABEL
            );
            return false;
        }
        true
    }
}
