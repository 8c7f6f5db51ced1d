//! 予測アダプタのセレクタ（実行時選択用）
//!
//! 実行時に設定で予測方式（HTTP/モック）を選択するための列挙型。
//! trait objectではなくenumでディスパッチ。

use crate::domain::{
    config::{PredictionConfig, PredictionMode},
    DomainResult, EncodedImage, Prediction, PredictionPort,
};
use crate::infrastructure::mock_predict::MockPredictionAdapter;
use crate::infrastructure::predict_http::HttpPredictionAdapter;

/// 予測アダプタの選択
pub enum PredictionSelector {
    /// 予測サービスへのHTTP送信
    Http(HttpPredictionAdapter),
    /// 固定ラベル列を返すモック
    Mock(MockPredictionAdapter),
}

impl PredictionSelector {
    /// 設定からセレクタを構築
    pub fn from_config(config: &PredictionConfig) -> DomainResult<Self> {
        match config.mode {
            PredictionMode::Http => Ok(Self::Http(HttpPredictionAdapter::new(
                config.endpoint.clone(),
                config.timeout(),
            )?)),
            PredictionMode::Mock => Ok(Self::Mock(MockPredictionAdapter::new())),
        }
    }

    /// 選択中の予測方式
    pub fn mode_type(&self) -> &'static str {
        match self {
            Self::Http(_) => "http (prediction service)",
            Self::Mock(_) => "mock (scripted labels)",
        }
    }
}

impl PredictionPort for PredictionSelector {
    fn predict(&mut self, image: &EncodedImage) -> DomainResult<Prediction> {
        match self {
            Self::Http(adapter) => adapter.predict(image),
            Self::Mock(adapter) => adapter.predict(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_config() {
        let mut config = PredictionConfig::default();
        assert!(matches!(
            PredictionSelector::from_config(&config).unwrap(),
            PredictionSelector::Http(_)
        ));

        config.mode = PredictionMode::Mock;
        assert!(matches!(
            PredictionSelector::from_config(&config).unwrap(),
            PredictionSelector::Mock(_)
        ));
    }

    #[test]
    fn test_mock_selector_predicts() {
        let config = PredictionConfig {
            mode: PredictionMode::Mock,
            ..Default::default()
        };
        let mut selector = PredictionSelector::from_config(&config).unwrap();

        let image = EncodedImage::new(vec![0xFF, 0xD8], 640, 480);
        let prediction = selector.predict(&image).unwrap();
        assert_eq!(prediction.label, "A");
    }
}
