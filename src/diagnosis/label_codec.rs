//! Class-name parsing. Vocabulary labels look like `Crop___Disease` or just
//! `Crop`; the words inside each part are joined by underscores.

use crate::common::UNKNOWN_LABEL;

pub const LABEL_SEPARATOR: &str = "___";

/// Splits a class name into `(crop, disease)`.
///
/// Never fails: a name without separator is taken as a bare crop with an
/// `"Unknown"` disease.
pub fn decode(class_name: &str) -> (String, String) {
    match class_name.split_once(LABEL_SEPARATOR) {
        Some((crop, disease)) => {
            let crop = crop.replace('_', " ").replace(',', "").trim().to_string();
            let disease = disease.replace('_', " ").trim().to_string();
            (crop, disease)
        }
        None => (class_name.replace('_', " "), UNKNOWN_LABEL.to_string()),
    }
}

/// Human readable form used in the ranked alternatives:
/// `"Tomato___Late_blight"` becomes `"Tomato - Late blight"`.
pub fn display_label(class_name: &str) -> String {
    class_name.replace(LABEL_SEPARATOR, " - ").replace('_', " ")
}
