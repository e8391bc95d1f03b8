use serde::{Deserialize, Serialize};

/// Body sent to the detection service's `/detect-base64` endpoint.
///
/// `image` is a data URI (`data:image/jpeg;base64,...`), forwarded
/// verbatim from the client.
#[derive(Debug, Clone, Serialize)]
pub struct DetectRequest {
    pub image: String,
}

/// Top-level response of the detection service.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub image_info: Option<ImageInfo>,
}

/// One recognized food item in a submitted image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub food_name: String,
    pub confidence: f64,
    /// Pixel-space box: `[x1, y1, x2, y2]`.
    pub bbox: [f64; 4],
    #[serde(default)]
    pub carbon_footprint_info: Option<CarbonFootprintInfo>,
}

/// Environmental-impact payload attached to a detection.
///
/// The service returns human-readable sentences, not numbers; the numeric
/// parts are extracted by pattern matching downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarbonFootprintInfo {
    #[serde(default)]
    pub concise_fact: Option<String>,
    #[serde(default)]
    pub water_usage: Option<String>,
    #[serde(default)]
    pub detailed_info: Option<String>,
    #[serde(default)]
    pub educational_snippets: Option<Vec<String>>,
    #[serde(default)]
    pub alternatives: Option<Vec<String>>,
}

/// Dimensions of the image the bboxes are expressed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: f64,
    pub height: f64,
}

const MIN_LIVE_CONFIDENCE: f64 = 0.3;
const MIN_BOX_SIDE_PX: f64 = 20.0;

impl Detection {
    /// Whether this detection is worth overlaying in live mode.
    ///
    /// Requires a minimum confidence, a well-formed box, and a box big
    /// enough to label on screen.
    pub fn passes_quality(&self) -> bool {
        let [x1, y1, x2, y2] = self.bbox;
        self.confidence > MIN_LIVE_CONFIDENCE
            && x1 >= 0.0
            && y1 >= 0.0
            && x2 > x1
            && y2 > y1
            && x2 - x1 > MIN_BOX_SIDE_PX
            && y2 - y1 > MIN_BOX_SIDE_PX
    }
}
