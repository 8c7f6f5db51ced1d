//! キャプチャアダプタのセレクタ（実行時選択用）
//!
//! ビルド時のfeatureフラグではなく、実行時に設定でキャプチャソースを
//! 選択するための列挙型。vtableのオーバーヘッドを避けるため、
//! trait objectではなくenumでディスパッチ。

use crate::domain::{
    config::{CaptureConfig, CaptureSource},
    DomainResult, EncodedImage, FrameCapturePort, SourceInfo,
};
use crate::infrastructure::camera::CameraCaptureAdapter;
use crate::infrastructure::mock_capture::MockCaptureAdapter;

/// キャプチャアダプタの選択
pub enum CaptureSelector {
    /// Webカメラ（OpenCV VideoCapture）
    Camera(CameraCaptureAdapter),
    /// 合成フレームを返すモック
    Mock(MockCaptureAdapter),
}

impl CaptureSelector {
    /// 設定からセレクタを構築
    pub fn from_config(config: &CaptureConfig) -> Self {
        match config.source {
            CaptureSource::Camera => Self::Camera(CameraCaptureAdapter::new(
                config.device_index,
                config.frame_width,
                config.frame_height,
                config.jpeg_quality,
            )),
            CaptureSource::Mock => Self::Mock(MockCaptureAdapter::new(config.jpeg_quality)),
        }
    }

    /// 選択中のソース種別
    pub fn source_type(&self) -> &'static str {
        match self {
            Self::Camera(_) => "camera (OpenCV VideoCapture)",
            Self::Mock(_) => "mock (synthetic frames)",
        }
    }
}

impl FrameCapturePort for CaptureSelector {
    fn acquire(&mut self) -> DomainResult<()> {
        match self {
            Self::Camera(adapter) => adapter.acquire(),
            Self::Mock(adapter) => adapter.acquire(),
        }
    }

    fn release(&mut self) {
        match self {
            Self::Camera(adapter) => adapter.release(),
            Self::Mock(adapter) => adapter.release(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::Camera(adapter) => adapter.is_active(),
            Self::Mock(adapter) => adapter.is_active(),
        }
    }

    fn capture_frame(&mut self) -> DomainResult<EncodedImage> {
        match self {
            Self::Camera(adapter) => adapter.capture_frame(),
            Self::Mock(adapter) => adapter.capture_frame(),
        }
    }

    fn source_info(&self) -> SourceInfo {
        match self {
            Self::Camera(adapter) => adapter.source_info(),
            Self::Mock(adapter) => adapter.source_info(),
        }
    }
}
