use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::error::AppError;
use crate::models::verdict::Verdict;
use crate::services::classifier;
use crate::services::decision;
use crate::services::loader::ImageInput;
use crate::AppState;

// ---------------------------------------------------------------------------
// POST /api/v1/predict
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PredictRequest {
    pub image_base64: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

/// Accepts either a multipart upload (`file` + optional `location` fields) or
/// a JSON body with `image_base64` / `image_url`. The pipeline itself picks
/// the source when several are present (base64 > url > multipart bytes).
pub async fn predict(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Json<Verdict>, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (input, location) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::ValidationError(format!("Multipart error: {}", e)))?;
        parse_multipart(multipart).await?
    } else {
        let Json(body) = Json::<PredictRequest>::from_request(req, &())
            .await
            .map_err(|e| AppError::ValidationError(format!("Invalid JSON body: {}", e)))?;
        (
            ImageInput {
                bytes: None,
                base64: body.image_base64,
                url: body.image_url,
            },
            body.location,
        )
    };

    let verdict = run_pipeline(&state, input, location).await?;
    Ok(Json(verdict))
}

async fn parse_multipart(mut multipart: Multipart) -> Result<(ImageInput, Option<String>), AppError> {
    let mut input = ImageInput::default();
    let mut location = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Multipart error: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(format!("Failed to read upload: {}", e)))?;
                input.bytes = Some(data.to_vec());
            }
            Some("location") => {
                location = field.text().await.ok().filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    Ok((input, location))
}

/// Loader → preprocessor → model → decision → gate. Each stage is pure
/// except the model adapter; persistence is fire-and-forget.
pub(crate) async fn run_pipeline(
    state: &AppState,
    input: ImageInput,
    location: Option<String>,
) -> Result<Verdict, AppError> {
    let (img, source) = state.loader.resolve(&input).await?;
    let tensor = classifier::preprocess(&img);
    let probs = state.classifier.classify(tensor)?;

    let mut verdict = decision::decide(&probs, state.config.acceptance_threshold);
    verdict.location = location;
    verdict.image_source = Some(source.as_str().to_string());

    state.store.record(&verdict);
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::AppConfig;
    use crate::services::classifier::Classifier;
    use crate::services::decision::AMBIGUOUS_CONFIDENCE;
    use crate::services::loader::ImageLoader;
    use crate::services::store::PredictionStore;
    use image::{Rgb, RgbImage};
    use ndarray::Array4;
    use std::io::Cursor;

    struct FakeClassifier {
        probs: Vec<f32>,
    }

    impl Classifier for FakeClassifier {
        fn classify(&self, _input: Array4<f32>) -> Result<Vec<f32>, AppError> {
            Ok(self.probs.clone())
        }
    }

    fn test_state(probs: Vec<f32>) -> AppState {
        let config = AppConfig {
            store_url: None,
            acceptance_threshold: 0.6,
            ..AppConfig::from_env()
        };
        let loader = ImageLoader::new(&config);
        let store = PredictionStore::new(&config);
        AppState {
            config: Arc::new(config),
            loader,
            classifier: Arc::new(FakeClassifier { probs }),
            store,
        }
    }

    fn png_upload() -> Vec<u8> {
        let img = RgbImage::from_pixel(32, 32, Rgb([90, 160, 70]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn upload_flows_through_to_a_valid_verdict() {
        let state = test_state(vec![0.9, 0.02, 0.02, 0.02, 0.02, 0.01, 0.01]);
        let input = ImageInput {
            bytes: Some(png_upload()),
            ..ImageInput::default()
        };

        let verdict = run_pipeline(&state, input, Some("Laguna".to_string()))
            .await
            .unwrap();

        assert_eq!(verdict.class_name, "Baybay Tall Coconut");
        assert_eq!(verdict.confidence, 0.9);
        assert!(verdict.is_valid);
        assert_eq!(verdict.location.as_deref(), Some("Laguna"));
        assert_eq!(verdict.image_source.as_deref(), Some("multipart"));
    }

    #[tokio::test]
    async fn ambiguous_outcome_carries_the_fixed_confidence() {
        let state = test_state(vec![0.02, 0.02, 0.02, 0.02, 0.02, 0.85, 0.05]);
        let input = ImageInput {
            bytes: Some(png_upload()),
            ..ImageInput::default()
        };

        let verdict = run_pipeline(&state, input, None).await.unwrap();

        assert_eq!(verdict.class_name, "Unknown Dwarf Coconut");
        assert_eq!(verdict.confidence, AMBIGUOUS_CONFIDENCE);
        assert!(!verdict.is_valid);
        assert!(verdict.location.is_none());
    }

    #[tokio::test]
    async fn missing_image_never_reaches_the_classifier() {
        let state = test_state(vec![0.9, 0.02, 0.02, 0.02, 0.02, 0.01, 0.01]);
        let err = run_pipeline(&state, ImageInput::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoImageProvided));
    }

    #[tokio::test]
    async fn classifying_the_same_image_twice_is_idempotent() {
        let state = test_state(vec![0.1, 0.7, 0.05, 0.05, 0.05, 0.03, 0.02]);
        let first = run_pipeline(
            &state,
            ImageInput { bytes: Some(png_upload()), ..ImageInput::default() },
            None,
        )
        .await
        .unwrap();
        let second = run_pipeline(
            &state,
            ImageInput { bytes: Some(png_upload()), ..ImageInput::default() },
            None,
        )
        .await
        .unwrap();
        assert_eq!(first, second);
    }
}
