//! HTTP予測アダプタ
//!
//! reqwest（blocking）を使用して予測サービスの/predictエンドポイントと
//! multipart/form-dataで通信する。リトライはこの層では行わず、失敗方針は
//! ライブループの連続失敗カウントに委ねる。

use crate::domain::{DomainError, DomainResult, EncodedImage, Prediction, PredictionPort};
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use std::time::Duration;

/// HTTP予測アダプタ
pub struct HttpPredictionAdapter {
    endpoint: String,
    client: Client,
}

impl HttpPredictionAdapter {
    /// 新しいHTTP予測アダプタを作成
    ///
    /// # Arguments
    /// - `endpoint`: 予測エンドポイントのURL
    /// - `timeout`: リクエスト全体のタイムアウト
    pub fn new(endpoint: String, timeout: Duration) -> DomainResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            DomainError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { endpoint, client })
    }

    /// 成功レスポンス（2xx）のJSONをPredictionへ変換する
    ///
    /// 信頼度が範囲外の場合は[0,100]にクランプする。
    fn parse_success(body: &str) -> DomainResult<Prediction> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| DomainError::InvalidResponse(format!("Response is not JSON: {}", e)))?;

        let label = value
            .get("prediction")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                DomainError::InvalidResponse("Missing 'prediction' field".to_string())
            })?;
        let confidence = value
            .get("confidence")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                DomainError::InvalidResponse("Missing 'confidence' field".to_string())
            })?;

        Ok(Prediction::new(
            label,
            (confidence as f32).clamp(0.0, 100.0),
        ))
    }

    /// エラーレスポンス（非2xx）からサーバー側のメッセージを取り出す
    fn parse_error(status: StatusCode, body: &str) -> DomainError {
        let server_message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from));

        match server_message {
            Some(message) => DomainError::Network(format!(
                "Prediction service rejected the request ({}): {}",
                status, message
            )),
            None => DomainError::Network(format!("Prediction service returned {}", status)),
        }
    }
}

impl PredictionPort for HttpPredictionAdapter {
    fn predict(&mut self, image: &EncodedImage) -> DomainResult<Prediction> {
        let part = multipart::Part::bytes(image.data.clone())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| DomainError::Other(format!("Failed to build multipart body: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                DomainError::Network(format!("Request to prediction service failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            DomainError::Network(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        Self::parse_success(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let prediction =
            HttpPredictionAdapter::parse_success(r#"{"prediction": "A", "confidence": 97.5}"#)
                .unwrap();

        assert_eq!(prediction.label, "A");
        assert_eq!(prediction.confidence, 97.5);
    }

    #[test]
    fn test_parse_success_ignores_extra_fields() {
        // サーバーはpreprocessed_image等の追加フィールドも返す
        let body = r#"{"prediction": "B", "confidence": 80.0, "preprocessed_image": "data:image/jpeg;base64,..."}"#;
        let prediction = HttpPredictionAdapter::parse_success(body).unwrap();

        assert_eq!(prediction.label, "B");
    }

    #[test]
    fn test_parse_success_clamps_confidence() {
        let over =
            HttpPredictionAdapter::parse_success(r#"{"prediction": "A", "confidence": 120.0}"#)
                .unwrap();
        assert_eq!(over.confidence, 100.0);

        let under =
            HttpPredictionAdapter::parse_success(r#"{"prediction": "A", "confidence": -3.0}"#)
                .unwrap();
        assert_eq!(under.confidence, 0.0);
    }

    #[test]
    fn test_parse_success_missing_prediction_field() {
        let result = HttpPredictionAdapter::parse_success(r#"{"confidence": 90.0}"#);
        assert!(matches!(result, Err(DomainError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_success_missing_confidence_field() {
        let result = HttpPredictionAdapter::parse_success(r#"{"prediction": "A"}"#);
        assert!(matches!(result, Err(DomainError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_success_rejects_non_json() {
        let result = HttpPredictionAdapter::parse_success("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(DomainError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_error_with_server_message() {
        let error = HttpPredictionAdapter::parse_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": "No file provided"}"#,
        );

        match error {
            DomainError::Network(message) => {
                assert!(message.contains("No file provided"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_without_body() {
        let error = HttpPredictionAdapter::parse_error(StatusCode::INTERNAL_SERVER_ERROR, "");

        assert!(matches!(error, DomainError::Network(_)));
    }
}
