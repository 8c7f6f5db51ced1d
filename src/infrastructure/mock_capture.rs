//! モックキャプチャアダプタ
//!
//! テスト・開発用のフレーム供給モック実装。
//! 実カメラなしで合成フレーム（単色）をエンコードして返す。

use crate::domain::{DomainError, DomainResult, EncodedImage, FrameCapturePort, SourceInfo};
use crate::infrastructure::encode::encode_jpeg;
use opencv::core::{Mat, Scalar, CV_8UC3};

/// モックキャプチャアダプタ
pub struct MockCaptureAdapter {
    active: bool,
    jpeg_quality: i32,
}

impl MockCaptureAdapter {
    /// モックフレームの寸法
    const FRAME_WIDTH: i32 = 640;
    const FRAME_HEIGHT: i32 = 480;

    /// 新しいモックキャプチャアダプタを作成
    pub fn new(jpeg_quality: i32) -> Self {
        Self {
            active: false,
            jpeg_quality,
        }
    }
}

impl FrameCapturePort for MockCaptureAdapter {
    fn acquire(&mut self) -> DomainResult<()> {
        self.active = true;

        #[cfg(debug_assertions)]
        tracing::info!("MockCapture: source acquired");

        Ok(())
    }

    fn release(&mut self) {
        self.active = false;

        #[cfg(debug_assertions)]
        tracing::info!("MockCapture: source released");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn capture_frame(&mut self) -> DomainResult<EncodedImage> {
        if !self.active {
            return Err(DomainError::CaptureUnavailable(
                "no active capture source".to_string(),
            ));
        }

        // 合成フレーム: 中間グレーの単色
        let frame = Mat::new_rows_cols_with_default(
            Self::FRAME_HEIGHT,
            Self::FRAME_WIDTH,
            CV_8UC3,
            Scalar::all(128.0),
        )
        .map_err(|e| DomainError::CaptureUnavailable(format!("Failed to build frame: {}", e)))?;

        encode_jpeg(&frame, self.jpeg_quality)
    }

    fn source_info(&self) -> SourceInfo {
        SourceInfo {
            width: Self::FRAME_WIDTH as u32,
            height: Self::FRAME_HEIGHT as u32,
            name: "Mock Capture".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_capture_lifecycle() {
        let mut adapter = MockCaptureAdapter::new(80);
        assert!(!adapter.is_active());

        adapter.acquire().unwrap();
        assert!(adapter.is_active());

        let image = adapter.capture_frame().unwrap();
        assert_eq!(image.width, 640);
        assert_eq!(image.height, 480);
        assert!(!image.data.is_empty());

        adapter.release();
        assert!(!adapter.is_active());
        assert!(adapter.capture_frame().is_err());
    }
}
