use serde::{Deserialize, Serialize};
use time::Date;

use crate::detect::dto::{Detection, ImageInfo};

/// Request body for both detect endpoints.
///
/// `image` is a data URI (`data:image/jpeg;base64,...`) exactly as the
/// capture layer produces it; it is forwarded to the detection service
/// unchanged.
#[derive(Debug, Deserialize)]
pub struct DetectImageRequest {
    pub image: String,
}

/// What a scan produced, ready for user confirmation.
///
/// Always present in a 200 response: failures degrade to placeholder
/// candidates rather than errors, so the scan flow can always complete.
#[derive(Debug, Clone, Serialize)]
pub struct ScanCandidate {
    pub name: String,
    pub category: String,
    pub carbon_footprint: f64,
    pub water_usage: f64,
    pub sustainability_score: f64,
    pub image_url: Option<String>,
    pub detailed_info: String,
    pub educational_snippets: Vec<String>,
    pub alternatives: Vec<String>,
}

/// Quality-filtered detections for the live overlay.
#[derive(Debug, Serialize)]
pub struct LiveDetections {
    pub detections: Vec<Detection>,
    pub image_info: Option<ImageInfo>,
}

/// Availability of the detection service.
#[derive(Debug, Serialize)]
pub struct DetectHealth {
    pub available: bool,
    pub endpoint: Option<String>,
}

/// Request body to record a confirmed scan.
#[derive(Debug, Deserialize)]
pub struct NewScanRequest {
    pub food_name: String,
    pub food_category: String,
    pub carbon_footprint: f64,
    pub water_usage: f64,
    pub sustainability_score: f64,
    pub scan_date: Date,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// History filters. `period` wins over an explicit range.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub from: Option<Date>,
    #[serde(default)]
    pub to: Option<Date>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}
