//! モック予測アダプタ
//!
//! テスト・開発用の予測モック実装。
//! 予測サービスなしで固定のラベル列を順番に返す。

use crate::domain::{DomainResult, EncodedImage, Prediction, PredictionPort, NO_DETECTION_LABEL};

/// モック予測アダプタ
pub struct MockPredictionAdapter {
    cursor: usize,
}

/// モックが循環して返すラベル列
const SCRIPT: &[(&str, f32)] = &[
    ("A", 97.0),
    ("A", 95.5),
    ("B", 88.5),
    (NO_DETECTION_LABEL, 41.0),
    ("C", 72.3),
];

impl MockPredictionAdapter {
    /// 新しいモック予測アダプタを作成
    pub fn new() -> Self {
        Self { cursor: 0 }
    }
}

impl Default for MockPredictionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionPort for MockPredictionAdapter {
    fn predict(&mut self, _image: &EncodedImage) -> DomainResult<Prediction> {
        let (label, confidence) = SCRIPT[self.cursor % SCRIPT.len()];
        self.cursor += 1;

        #[cfg(debug_assertions)]
        tracing::debug!("MockPrediction: {} ({:.1}%)", label, confidence);

        Ok(Prediction::new(label, confidence))
    }
}
