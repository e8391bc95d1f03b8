use time::{Date, Duration};

use crate::detect::dto::DetectResponse;
use crate::detect::extract::first_number;
use crate::scoring::{normalize, round_score};

use super::dto::{Period, ScanCandidate};

pub(crate) const DEFAULT_CATEGORY: &str = "Food";

const NO_DETAILS: &str = "No additional information available.";
const NO_SNIPPETS: &str = "No educational snippets available.";
const NO_ALTERNATIVES: &str = "No alternative foods available.";

const UNKNOWN_ITEM_MSG: &str =
    "Could not identify the food item. Please try again with a clearer image.";
const CONNECTIVITY_MSG: &str =
    "Cannot connect to the detection service. Please check your network connection and try again.";

/// Candidate for a response with no usable detection: zeroed metrics,
/// minimum score.
pub fn unknown_item() -> ScanCandidate {
    ScanCandidate {
        name: "Unknown Food Item".into(),
        category: DEFAULT_CATEGORY.into(),
        carbon_footprint: 0.0,
        water_usage: 0.0,
        sustainability_score: 0.0,
        image_url: None,
        detailed_info: UNKNOWN_ITEM_MSG.into(),
        educational_snippets: vec![UNKNOWN_ITEM_MSG.into()],
        alternatives: vec!["Please try scanning a different food item.".into()],
    }
}

/// Candidate shown when every detection endpoint is unreachable: neutral
/// midpoint values, retry-prompting text.
pub fn scan_error() -> ScanCandidate {
    ScanCandidate {
        name: "Scan Error".into(),
        category: DEFAULT_CATEGORY.into(),
        carbon_footprint: 0.5,
        water_usage: 20.0,
        sustainability_score: 50.0,
        image_url: None,
        detailed_info: CONNECTIVITY_MSG.into(),
        educational_snippets: vec![CONNECTIVITY_MSG.into()],
        alternatives: vec!["Please try again or check your connection.".into()],
    }
}

/// Map a detection response onto a scan candidate.
///
/// Uses the first detection. The carbon footprint is pattern-matched out
/// of `concise_fact`; if no number can be extracted the mapping fails
/// closed to the unknown-item placeholder rather than scoring garbage.
pub fn candidate_from_response(response: &DetectResponse) -> ScanCandidate {
    if !response.success {
        return unknown_item();
    }
    let Some(detection) = response.detections.first() else {
        return unknown_item();
    };

    let info = detection.carbon_footprint_info.clone().unwrap_or_default();

    let Some(footprint) = info.concise_fact.as_deref().and_then(first_number) else {
        return unknown_item();
    };

    let water_usage = info.water_usage.as_deref().and_then(first_number).unwrap_or(0.0);

    ScanCandidate {
        name: detection.food_name.clone(),
        category: DEFAULT_CATEGORY.into(),
        carbon_footprint: footprint,
        water_usage,
        sustainability_score: round_score(normalize(footprint)),
        image_url: None,
        detailed_info: info.detailed_info.unwrap_or_else(|| NO_DETAILS.into()),
        educational_snippets: info
            .educational_snippets
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| vec![NO_SNIPPETS.into()]),
        alternatives: info
            .alternatives
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| vec![NO_ALTERNATIVES.into()]),
    }
}

/// Earliest scan date included by a period filter, relative to `today`.
pub fn period_cutoff(period: Period, today: Date) -> Date {
    match period {
        Period::Daily => today,
        Period::Weekly => today - Duration::days(7),
        Period::Monthly => today.replace_day(1).unwrap_or(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn response(json: &str) -> DetectResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn maps_a_full_detection() {
        let resp = response(
            r#"{
                "success": true,
                "detections": [{
                    "food_name": "Beef Steak",
                    "confidence": 0.92,
                    "bbox": [10, 10, 200, 200],
                    "carbon_footprint_info": {
                        "concise_fact": "Estimated 2.4 kg CO2e per kg",
                        "water_usage": "About 1800 liters per kg",
                        "detailed_info": "Beef has a large footprint.",
                        "educational_snippets": ["Cattle emit methane."],
                        "alternatives": ["Lentils", "Chicken"]
                    }
                }]
            }"#,
        );

        let candidate = candidate_from_response(&resp);
        assert_eq!(candidate.name, "Beef Steak");
        assert_eq!(candidate.category, "Food");
        assert_eq!(candidate.carbon_footprint, 2.4);
        assert_eq!(candidate.water_usage, 1800.0);
        assert_eq!(candidate.sustainability_score, 96.5);
        assert_eq!(candidate.detailed_info, "Beef has a large footprint.");
        assert_eq!(candidate.alternatives, vec!["Lentils", "Chicken"]);
    }

    #[test]
    fn missing_optional_texts_get_defaults() {
        let resp = response(
            r#"{
                "success": true,
                "detections": [{
                    "food_name": "Rice",
                    "confidence": 0.8,
                    "bbox": [0, 0, 100, 100],
                    "carbon_footprint_info": {
                        "concise_fact": "4 kg CO2e per kg"
                    }
                }]
            }"#,
        );

        let candidate = candidate_from_response(&resp);
        assert_eq!(candidate.water_usage, 0.0);
        assert_eq!(candidate.detailed_info, NO_DETAILS);
        assert_eq!(candidate.educational_snippets, vec![NO_SNIPPETS]);
        assert_eq!(candidate.alternatives, vec![NO_ALTERNATIVES]);
    }

    #[test]
    fn no_detections_degrades_to_unknown_item() {
        let resp = response(r#"{"success": true, "detections": []}"#);
        let candidate = candidate_from_response(&resp);
        assert_eq!(candidate.name, "Unknown Food Item");
        assert_eq!(candidate.sustainability_score, 0.0);
    }

    #[test]
    fn unsuccessful_response_degrades_to_unknown_item() {
        let resp = response(r#"{"success": false, "detections": []}"#);
        assert_eq!(candidate_from_response(&resp).name, "Unknown Food Item");
    }

    #[test]
    fn unparseable_footprint_fails_closed() {
        let resp = response(
            r#"{
                "success": true,
                "detections": [{
                    "food_name": "Mystery",
                    "confidence": 0.9,
                    "bbox": [0, 0, 100, 100],
                    "carbon_footprint_info": {
                        "concise_fact": "no data available"
                    }
                }]
            }"#,
        );

        let candidate = candidate_from_response(&resp);
        assert_eq!(candidate.name, "Unknown Food Item");
        assert_eq!(candidate.sustainability_score, 0.0);
    }

    #[test]
    fn scan_error_placeholder_is_the_neutral_midpoint() {
        let candidate = scan_error();
        assert_eq!(candidate.name, "Scan Error");
        assert_eq!(candidate.carbon_footprint, 0.5);
        assert_eq!(candidate.water_usage, 20.0);
        assert_eq!(candidate.sustainability_score, 50.0);
    }

    #[test]
    fn period_cutoffs() {
        let today = date!(2025 - 03 - 15);
        assert_eq!(period_cutoff(Period::Daily, today), today);
        assert_eq!(period_cutoff(Period::Weekly, today), date!(2025 - 03 - 08));
        assert_eq!(period_cutoff(Period::Monthly, today), date!(2025 - 03 - 01));
    }
}
