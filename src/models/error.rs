use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub request_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No image provided")]
    NoImageProvided,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image fetch failed: {0}")]
    FetchFailed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn to_problem_detail(&self, request_id: &str) -> ProblemDetail {
        let (status, code, title, detail) = match self {
            AppError::NoImageProvided => (
                StatusCode::BAD_REQUEST,
                "NO_IMAGE_PROVIDED",
                "No Image Provided",
                "Request carries no image upload, base64 payload, or URL".to_string(),
            ),
            AppError::InvalidImage(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_IMAGE",
                "Invalid Image",
                format!("Image could not be decoded: {}", detail),
            ),
            AppError::FetchFailed(detail) => (
                StatusCode::BAD_GATEWAY,
                "FETCH_FAILED",
                "Image Fetch Failed",
                detail.clone(),
            ),
            AppError::ValidationError(field) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation Error",
                field.clone(),
            ),
            AppError::Inference(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INFERENCE_ERROR",
                "Inference Error",
                detail.clone(),
            ),
            AppError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal Error",
                detail.clone(),
            ),
        };

        ProblemDetail {
            problem_type: format!("https://cocoscan.dev/problems/{}", code.to_lowercase()),
            title: title.to_string(),
            status: status.as_u16(),
            detail,
            code: code.to_string(),
            request_id: request_id.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Errors short-circuit before the request-id middleware can stamp the
        // response, so generate an id here; the middleware overwrites the
        // header with the canonical one afterwards.
        let request_id = uuid::Uuid::new_v4().to_string();
        let problem = self.to_problem_detail(&request_id);
        let status = StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(problem)).into_response();
        response
            .headers_mut()
            .insert("X-Request-Id", request_id.parse().unwrap());
        response
            .headers_mut()
            .insert("Content-Type", "application/problem+json".parse().unwrap());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_distinct_client_statuses() {
        let cases = [
            (AppError::NoImageProvided, 400, "NO_IMAGE_PROVIDED"),
            (AppError::InvalidImage("bad png".into()), 422, "INVALID_IMAGE"),
            (AppError::FetchFailed("timeout".into()), 502, "FETCH_FAILED"),
        ];
        for (err, status, code) in cases {
            let problem = err.to_problem_detail("req-1");
            assert_eq!(problem.status, status);
            assert_eq!(problem.code, code);
        }
    }

    #[test]
    fn inference_errors_are_server_side() {
        let problem = AppError::Inference("shape mismatch".into()).to_problem_detail("req-2");
        assert_eq!(problem.status, 500);
    }
}
