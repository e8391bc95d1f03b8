use lazy_static::lazy_static;
use regex::Regex;

/// Pull the first numeric substring out of free text.
///
/// The detection service phrases its facts for humans ("Estimated 2.4 kg
/// CO2e per kg"), so the contract is a pattern match, not a field read.
/// Substrings that fail to parse as a finite number (a bare "...") are
/// skipped rather than treated as zero.
pub fn first_number(text: &str) -> Option<f64> {
    lazy_static! {
        static ref NUMBER_RE: Regex = Regex::new(r"[\d.]+").unwrap();
    }
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .find(|n| n.is_finite())
}
