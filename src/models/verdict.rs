use serde::Serialize;

use crate::models::catalog::ClassKey;

/// Final classification outcome for one request. Field names are the wire
/// contract consumed by the web frontend.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Verdict {
    #[serde(skip)]
    pub class_key: ClassKey,
    pub class_name: String,
    pub lifespan: String,
    pub definition: String,
    pub confidence: f64,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_source: Option<String>,
}
