//! カメラキャプチャアダプタ
//!
//! OpenCVのVideoCaptureを使用したWebカメラ入力実装。
//! 取得したフレームはJPEGにエンコードして返す。

use crate::domain::{DomainError, DomainResult, EncodedImage, FrameCapturePort, SourceInfo};
use crate::infrastructure::encode::encode_jpeg;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

#[cfg(feature = "opencv-debug-display")]
use opencv::highgui;

/// カメラキャプチャアダプタ
pub struct CameraCaptureAdapter {
    device_index: u32,
    frame_width: u32,
    frame_height: u32,
    jpeg_quality: i32,
    capture: Option<VideoCapture>,
}

impl CameraCaptureAdapter {
    /// 新しいカメラアダプタを作成（ソースは未取得の状態）
    ///
    /// # Arguments
    /// - `device_index`: カメラのデバイスインデックス（通常は0）
    /// - `frame_width` / `frame_height`: 要求する解像度
    /// - `jpeg_quality`: JPEGエンコード品質（1〜100）
    pub fn new(device_index: u32, frame_width: u32, frame_height: u32, jpeg_quality: i32) -> Self {
        Self {
            device_index,
            frame_width,
            frame_height,
            jpeg_quality,
            capture: None,
        }
    }
}

impl FrameCapturePort for CameraCaptureAdapter {
    fn acquire(&mut self) -> DomainResult<()> {
        if self.capture.is_some() {
            return Err(DomainError::SourceUnavailable(
                "capture source already active".to_string(),
            ));
        }

        let mut capture = VideoCapture::new(self.device_index as i32, videoio::CAP_ANY)
            .map_err(|e| {
                DomainError::SourceUnavailable(format!(
                    "Failed to open camera {}: {}",
                    self.device_index, e
                ))
            })?;

        let opened = capture.is_opened().map_err(|e| {
            DomainError::SourceUnavailable(format!("Failed to query camera state: {}", e))
        })?;
        if !opened {
            return Err(DomainError::SourceUnavailable(format!(
                "Camera {} is not available (in use or access denied)",
                self.device_index
            )));
        }

        // 解像度の要求（デバイスが対応しない場合は無視される）
        let _ = capture.set(videoio::CAP_PROP_FRAME_WIDTH, self.frame_width as f64);
        let _ = capture.set(videoio::CAP_PROP_FRAME_HEIGHT, self.frame_height as f64);

        tracing::info!("Camera {} acquired", self.device_index);
        self.capture = Some(capture);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            let _ = capture.release();
            tracing::info!("Camera {} released", self.device_index);
        }
    }

    fn is_active(&self) -> bool {
        self.capture.is_some()
    }

    fn capture_frame(&mut self) -> DomainResult<EncodedImage> {
        let capture = self.capture.as_mut().ok_or_else(|| {
            DomainError::CaptureUnavailable("no active capture source".to_string())
        })?;

        let mut frame = Mat::default();
        let grabbed = capture.read(&mut frame).map_err(|e| {
            DomainError::CaptureUnavailable(format!("Failed to read camera frame: {}", e))
        })?;

        let empty = frame.empty();
        if !grabbed || empty {
            return Err(DomainError::CaptureUnavailable(
                "camera returned an empty frame".to_string(),
            ));
        }
        if frame.cols() == 0 || frame.rows() == 0 {
            // ウォームアップ前のフレーム
            return Err(DomainError::CaptureUnavailable(
                "camera frame has zero dimensions".to_string(),
            ));
        }

        #[cfg(feature = "opencv-debug-display")]
        {
            let _ = highgui::imshow("capture preview", &frame);
            let _ = highgui::wait_key(1);
        }

        encode_jpeg(&frame, self.jpeg_quality)
    }

    fn source_info(&self) -> SourceInfo {
        let (width, height) = match &self.capture {
            Some(capture) => {
                let w = capture
                    .get(videoio::CAP_PROP_FRAME_WIDTH)
                    .unwrap_or(self.frame_width as f64);
                let h = capture
                    .get(videoio::CAP_PROP_FRAME_HEIGHT)
                    .unwrap_or(self.frame_height as f64);
                (w as u32, h as u32)
            }
            None => (self.frame_width, self.frame_height),
        };

        SourceInfo {
            width,
            height,
            name: format!("Camera {}", self.device_index),
        }
    }
}
