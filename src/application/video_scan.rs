//! 動画タイムライン解析モジュール
//!
//! 動画ファイルから一定間隔でフレームを抽出し、各フレームを予測サービスへ
//! 送信してタイムラインを構築します。結果はJSONレポートとして書き出せます。

use crate::domain::{
    config::VideoScanConfig,
    error::{DomainError, DomainResult},
    ports::{PredictionPort, VideoSourcePort},
    types::TimestampedPrediction,
};
use serde::Serialize;
use std::path::Path;

/// 動画解析レポート
#[derive(Debug, Serialize)]
pub struct VideoScanReport {
    /// 解析した動画のソース名
    pub filename: String,
    /// 動画の長さ（秒）
    pub duration_secs: f64,
    /// タイムライン上の予測結果（時刻昇順）
    pub predictions: Vec<TimestampedPrediction>,
}

/// 動画全体を走査して予測タイムラインを構築する
///
/// sample_interval_secsごとに1フレームを抽出し、各フレームを予測サービスへ
/// 送信する。フレーム取得・予測のいずれかが失敗した時点で解析を打ち切る。
pub fn scan_video<V, P>(
    source: &mut V,
    predictor: &mut P,
    config: &VideoScanConfig,
) -> DomainResult<VideoScanReport>
where
    V: VideoSourcePort,
    P: PredictionPort,
{
    let duration = source.duration_secs()?;
    if duration <= 0.0 {
        return Err(DomainError::CaptureUnavailable(
            "video reports no duration".to_string(),
        ));
    }

    let interval = config.sample_interval_secs;
    let total_chunks = (duration / interval).ceil().max(1.0) as u64;

    tracing::info!(
        "Analyzing video '{}': {:.1}s, {} frames at {:.1}s interval",
        source.name(),
        duration,
        total_chunks,
        interval
    );

    let mut predictions = Vec::with_capacity(total_chunks as usize);
    for chunk in 0..total_chunks {
        let timestamp_secs = chunk as f64 * interval;

        crate::measure_span!("video_chunk", {
            let image = source.frame_at(timestamp_secs)?;
            let prediction = predictor.predict(&image)?;
            predictions.push(TimestampedPrediction {
                timestamp_secs,
                prediction,
            });
        });

        tracing::info!(
            "Progress: {}/{} ({:.0}%)",
            chunk + 1,
            total_chunks,
            (chunk + 1) as f64 / total_chunks as f64 * 100.0
        );
    }

    Ok(VideoScanReport {
        filename: source.name().to_string(),
        duration_secs: duration,
        predictions,
    })
}

/// 解析レポートをJSONファイルとして書き出す
pub fn export_report(report: &VideoScanReport, path: &Path) -> DomainResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| DomainError::Export(format!("Failed to serialize report: {}", e)))?;

    std::fs::write(path, json)
        .map_err(|e| DomainError::Export(format!("Failed to write report file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EncodedImage, Prediction};

    // モック実装
    struct MockVideoSource {
        duration: f64,
        requested_timestamps: Vec<f64>,
    }

    impl MockVideoSource {
        fn new(duration: f64) -> Self {
            Self {
                duration,
                requested_timestamps: Vec::new(),
            }
        }
    }

    impl VideoSourcePort for MockVideoSource {
        fn duration_secs(&mut self) -> DomainResult<f64> {
            Ok(self.duration)
        }

        fn frame_at(&mut self, timestamp_secs: f64) -> DomainResult<EncodedImage> {
            self.requested_timestamps.push(timestamp_secs);
            Ok(EncodedImage::new(vec![0xFF, 0xD8, 0xFF, 0xD9], 640, 480))
        }

        fn name(&self) -> &str {
            "test.mp4"
        }
    }

    struct CountingPredictor {
        calls: usize,
    }

    impl PredictionPort for CountingPredictor {
        fn predict(&mut self, _image: &EncodedImage) -> DomainResult<Prediction> {
            self.calls += 1;
            Ok(Prediction::new("A", 90.0))
        }
    }

    struct FailingPredictor;

    impl PredictionPort for FailingPredictor {
        fn predict(&mut self, _image: &EncodedImage) -> DomainResult<Prediction> {
            Err(DomainError::Network("connection refused".to_string()))
        }
    }

    #[test]
    fn test_scan_samples_per_interval() {
        let mut source = MockVideoSource::new(3.5);
        let mut predictor = CountingPredictor { calls: 0 };
        let config = VideoScanConfig::default();

        let report = scan_video(&mut source, &mut predictor, &config).unwrap();

        // 3.5秒を1秒間隔で走査 → 0, 1, 2, 3秒の4フレーム
        assert_eq!(report.predictions.len(), 4);
        assert_eq!(source.requested_timestamps, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(predictor.calls, 4);
        assert_eq!(report.filename, "test.mp4");
        assert_eq!(report.duration_secs, 3.5);
    }

    #[test]
    fn test_scan_custom_interval() {
        let mut source = MockVideoSource::new(1.0);
        let mut predictor = CountingPredictor { calls: 0 };
        let config = VideoScanConfig {
            sample_interval_secs: 0.5,
            export_path: None,
        };

        let report = scan_video(&mut source, &mut predictor, &config).unwrap();

        assert_eq!(report.predictions.len(), 2);
        assert_eq!(source.requested_timestamps, vec![0.0, 0.5]);
    }

    #[test]
    fn test_scan_aborts_on_prediction_failure() {
        let mut source = MockVideoSource::new(10.0);
        let mut predictor = FailingPredictor;
        let config = VideoScanConfig::default();

        let result = scan_video(&mut source, &mut predictor, &config);

        assert!(matches!(result, Err(DomainError::Network(_))));
    }

    #[test]
    fn test_scan_rejects_zero_duration() {
        let mut source = MockVideoSource::new(0.0);
        let mut predictor = CountingPredictor { calls: 0 };
        let config = VideoScanConfig::default();

        let result = scan_video(&mut source, &mut predictor, &config);

        assert!(matches!(result, Err(DomainError::CaptureUnavailable(_))));
        assert_eq!(predictor.calls, 0);
    }

    #[test]
    fn test_export_report_writes_json() {
        let report = VideoScanReport {
            filename: "test.mp4".to_string(),
            duration_secs: 2.0,
            predictions: vec![TimestampedPrediction {
                timestamp_secs: 0.0,
                prediction: Prediction::new("A", 90.0),
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        export_report(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["filename"], "test.mp4");
        assert_eq!(value["duration_secs"], 2.0);
        assert_eq!(value["predictions"][0]["label"], "A");
        assert_eq!(value["predictions"][0]["timestamp_secs"], 0.0);
    }
}
