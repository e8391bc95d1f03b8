use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::DetectConfig;

use super::dto::{DetectRequest, DetectResponse};
use super::transport::{AttemptError, DetectTransport, HttpTransport};

/// Client for the external food-detection service.
///
/// Holds an ordered list of candidate base addresses. Each request walks
/// the list strictly in order, one attempt per candidate with its own
/// timeout, and returns the first successful response. Candidates are
/// never raced; the contract is first-success-in-order, not
/// first-response-overall.
pub struct Detector {
    transport: Arc<dyn DetectTransport>,
    candidates: Vec<String>,
    timeout: Duration,
    live_timeout: Duration,
}

/// Terminal outcome of a detection request.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Every candidate was attempted once and none succeeded.
    #[error("all {attempts} detection endpoints failed, last: {last}")]
    Exhausted { attempts: usize, last: AttemptError },

    /// The candidate list is empty.
    #[error("no detection endpoints configured")]
    NoCandidates,
}

impl Detector {
    pub fn from_config(config: &DetectConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), config)
    }

    pub fn with_transport(transport: Arc<dyn DetectTransport>, config: &DetectConfig) -> Self {
        Self {
            transport,
            candidates: config.candidate_urls(),
            timeout: Duration::from_millis(config.timeout_ms),
            live_timeout: Duration::from_millis(config.live_timeout_ms),
        }
    }

    /// Submit an image for the manual scan flow.
    pub async fn detect(&self, image: &str) -> Result<DetectResponse, DetectError> {
        self.run(image, self.timeout).await
    }

    /// Submit a frame for live detection. Same loop, shorter timeout, so
    /// a dead candidate stalls the preview for less time.
    pub async fn detect_live(&self, image: &str) -> Result<DetectResponse, DetectError> {
        self.run(image, self.live_timeout).await
    }

    async fn run(&self, image: &str, timeout: Duration) -> Result<DetectResponse, DetectError> {
        let body = DetectRequest {
            image: image.to_string(),
        };

        let mut last: Option<AttemptError> = None;
        for base in &self.candidates {
            let url = format!("{base}/detect-base64");
            match self.transport.post_detect(&url, &body, timeout).await {
                Ok(response) => {
                    debug!(endpoint = %base, "detection succeeded");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(endpoint = %base, error = %e, "detection attempt failed");
                    last = Some(e);
                }
            }
        }

        match last {
            Some(last) => Err(DetectError::Exhausted {
                attempts: self.candidates.len(),
                last,
            }),
            None => Err(DetectError::NoCandidates),
        }
    }

    /// Health probe: the first candidate whose `/health` answers 2xx.
    pub async fn probe(&self) -> Option<String> {
        for base in &self.candidates {
            let url = format!("{base}/health");
            match self.transport.get_ok(&url, self.live_timeout).await {
                Ok(()) => return Some(base.clone()),
                Err(e) => debug!(endpoint = %base, error = %e, "health probe failed"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::async_trait;

    use super::*;

    /// Scripted transport: one canned outcome per URL, records every call.
    struct ScriptedTransport {
        outcomes: HashMap<String, Result<DetectResponse, AttemptError>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<(&str, Result<DetectResponse, AttemptError>)>) -> Self {
            Self {
                outcomes: outcomes
                    .into_iter()
                    .map(|(url, outcome)| (url.to_string(), outcome))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn clone_outcome(
        outcome: &Result<DetectResponse, AttemptError>,
    ) -> Result<DetectResponse, AttemptError> {
        match outcome {
            Ok(r) => Ok(r.clone()),
            Err(AttemptError::Timeout) => Err(AttemptError::Timeout),
            Err(AttemptError::Status(s)) => Err(AttemptError::Status(*s)),
            Err(AttemptError::Transport(m)) => Err(AttemptError::Transport(m.clone())),
            Err(AttemptError::Body(m)) => Err(AttemptError::Body(m.clone())),
        }
    }

    #[async_trait]
    impl DetectTransport for ScriptedTransport {
        async fn post_detect(
            &self,
            url: &str,
            _body: &DetectRequest,
            _timeout: Duration,
        ) -> Result<DetectResponse, AttemptError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.outcomes.get(url) {
                Some(outcome) => clone_outcome(outcome),
                None => Err(AttemptError::Transport("unscripted url".into())),
            }
        }

        async fn get_ok(&self, url: &str, _timeout: Duration) -> Result<(), AttemptError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.outcomes.get(url) {
                Some(outcome) => clone_outcome(outcome).map(|_| ()),
                None => Err(AttemptError::Transport("unscripted url".into())),
            }
        }
    }

    fn config(bases: &[&str]) -> DetectConfig {
        DetectConfig {
            base_url: bases[0].to_string(),
            fallback_urls: bases[1..].iter().map(|s| s.to_string()).collect(),
            timeout_ms: 10_000,
            live_timeout_ms: 5_000,
        }
    }

    fn ok_response() -> DetectResponse {
        serde_json::from_str(
            r#"{"success": true, "detections": [{"food_name": "rice", "confidence": 0.9, "bbox": [0, 0, 100, 100]}]}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn first_success_wins_after_timeout_and_http_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ("http://a/detect-base64", Err(AttemptError::Timeout)),
            ("http://b/detect-base64", Err(AttemptError::Status(500))),
            ("http://c/detect-base64", Ok(ok_response())),
        ]));
        let detector = Detector::with_transport(
            transport.clone(),
            &config(&["http://a", "http://b", "http://c"]),
        );

        let response = detector.detect("data:image/jpeg;base64,xxxx").await.unwrap();
        assert_eq!(response.detections[0].food_name, "rice");

        // each candidate tried at most once, strictly in listed order
        assert_eq!(
            transport.calls(),
            vec![
                "http://a/detect-base64",
                "http://b/detect-base64",
                "http://c/detect-base64",
            ]
        );
    }

    #[tokio::test]
    async fn stops_at_first_successful_candidate() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ("http://a/detect-base64", Ok(ok_response())),
            ("http://b/detect-base64", Ok(ok_response())),
        ]));
        let detector =
            Detector::with_transport(transport.clone(), &config(&["http://a", "http://b"]));

        detector.detect("data:image/jpeg;base64,xxxx").await.unwrap();
        assert_eq!(transport.calls(), vec!["http://a/detect-base64"]);
    }

    #[tokio::test]
    async fn exhaustion_is_an_error_value_not_a_panic() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ("http://a/detect-base64", Err(AttemptError::Timeout)),
            (
                "http://b/detect-base64",
                Err(AttemptError::Transport("connection refused".into())),
            ),
        ]));
        let detector = Detector::with_transport(transport, &config(&["http://a", "http://b"]));

        let err = detector.detect("data:image/jpeg;base64,xxxx").await.unwrap_err();
        match err {
            DetectError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(last, AttemptError::Transport(_)));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidate_list_reports_no_candidates() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let mut cfg = config(&["http://a"]);
        cfg.base_url = String::new();
        cfg.fallback_urls.clear();
        let detector = Detector::with_transport(transport, &cfg);

        let err = detector.detect("data:image/jpeg;base64,xxxx").await.unwrap_err();
        assert!(matches!(err, DetectError::NoCandidates));
    }

    #[tokio::test]
    async fn probe_returns_first_healthy_base() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ("http://a/health", Err(AttemptError::Status(503))),
            ("http://b/health", Ok(ok_response())),
        ]));
        let detector = Detector::with_transport(transport, &config(&["http://a", "http://b"]));

        assert_eq!(detector.probe().await.as_deref(), Some("http://b"));
    }

    #[tokio::test]
    async fn probe_yields_none_when_nothing_answers() {
        let transport = Arc::new(ScriptedTransport::new(vec![(
            "http://a/health",
            Err(AttemptError::Transport("refused".into())),
        )]));
        let detector = Detector::with_transport(transport, &config(&["http://a"]));

        assert!(detector.probe().await.is_none());
    }
}
