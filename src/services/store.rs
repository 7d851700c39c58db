use reqwest::Client;
use serde_json::json;

use crate::models::config::AppConfig;
use crate::models::verdict::Verdict;

// ---------------------------------------------------------------------------
// PredictionStore — result gate + fire-and-forget persistence
// ---------------------------------------------------------------------------

/// Records accepted verdicts in an external document store. Classification
/// availability is deliberately decoupled from storage availability: a write
/// failure is logged and swallowed, never surfaced to the caller.
pub struct PredictionStore {
    client: Client,
    endpoint: Option<String>,
}

impl PredictionStore {
    pub fn new(config: &AppConfig) -> Self {
        let endpoint = config.store_url.as_ref().map(|base| {
            format!("{}/{}", base.trim_end_matches('/'), config.store_collection)
        });

        if endpoint.is_none() {
            tracing::warn!("STORE_URL not set; predictions will not be persisted");
        }

        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Only named-cultivar verdicts are worth keeping. Ambiguous-group and
    /// rejection outcomes are never persisted.
    pub fn should_persist(verdict: &Verdict) -> bool {
        verdict.is_valid
    }

    /// Queue a write for an eligible verdict and return immediately.
    pub fn record(&self, verdict: &Verdict) {
        if !Self::should_persist(verdict) {
            return;
        }
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };

        let body = json!({
            "class_name": verdict.class_name,
            "lifespan": verdict.lifespan,
            "definition": verdict.definition,
            "confidence": verdict.confidence,
            "is_valid": verdict.is_valid,
            "location": verdict.location.as_deref().unwrap_or("Unknown"),
            "image_source": verdict.image_source,
            "recorded_at": chrono::Utc::now().to_rfc3339(),
        });

        let client = self.client.clone();
        let class_name = verdict.class_name.clone();

        tokio::spawn(async move {
            let result = client
                .post(&endpoint)
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(_) => tracing::debug!("stored prediction '{}'", class_name),
                Err(e) => tracing::warn!("prediction store write failed: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ClassKey;
    use crate::services::decision::{decide, AMBIGUOUS_CONFIDENCE};

    #[test]
    fn only_valid_verdicts_are_eligible() {
        let accepted = decide(&[0.9, 0.02, 0.02, 0.02, 0.02, 0.01, 0.01], 0.6);
        assert!(PredictionStore::should_persist(&accepted));

        let rejected = decide(&[0.3, 0.3, 0.1, 0.1, 0.1, 0.05, 0.05], 0.6);
        assert!(!PredictionStore::should_persist(&rejected));

        let ambiguous = decide(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.8, 0.0], 0.6);
        assert_eq!(ambiguous.class_key, ClassKey::UnknownDwarf);
        assert_eq!(ambiguous.confidence, AMBIGUOUS_CONFIDENCE);
        assert!(!PredictionStore::should_persist(&ambiguous));
    }

    #[tokio::test]
    async fn record_without_endpoint_is_a_no_op() {
        let config = AppConfig {
            store_url: None,
            ..AppConfig::from_env()
        };
        let store = PredictionStore::new(&config);
        assert!(!store.is_enabled());

        let verdict = decide(&[0.9, 0.02, 0.02, 0.02, 0.02, 0.01, 0.01], 0.6);
        // Must not panic or spawn anything that fails the test runtime.
        store.record(&verdict);
    }
}
