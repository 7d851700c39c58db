use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub model_path: String,
    /// Minimum argmax probability for a named-cultivar verdict to be
    /// accepted. Calibration changes this independently of the decision
    /// logic, so it lives here rather than in code.
    pub acceptance_threshold: f32,
    pub fetch_timeout_secs: u64,
    pub max_upload_bytes: u64,
    pub store_url: Option<String>,
    pub store_collection: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string()),
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "./model/coconut_seedling.onnx".to_string()),
            acceptance_threshold: env::var("ACCEPTANCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.6),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_485_760),
            store_url: env::var("STORE_URL").ok().filter(|v| !v.is_empty()),
            store_collection: env::var("STORE_COLLECTION")
                .unwrap_or_else(|_| "CoconutPredictions".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
