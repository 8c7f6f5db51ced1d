//! 動画ファイル入力アダプタ
//!
//! OpenCVのVideoCaptureでファイルを開き、タイムスタンプ指定でフレームを
//! 取得してJPEGにエンコードする。タイムライン解析（video_scan）から使用される。

use crate::domain::{DomainError, DomainResult, EncodedImage, VideoSourcePort};
use crate::infrastructure::encode::encode_jpeg;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;

/// 動画ファイル入力アダプタ
pub struct VideoFileAdapter {
    name: String,
    capture: VideoCapture,
    jpeg_quality: i32,
}

impl VideoFileAdapter {
    /// 動画ファイルを開く
    ///
    /// # Returns
    /// - `Ok(VideoFileAdapter)`: オープン成功
    /// - `Err(DomainError::SourceUnavailable)`: ファイルが開けない
    pub fn open<P: AsRef<Path>>(path: P, jpeg_quality: i32) -> DomainResult<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            DomainError::Configuration("Video path is not valid UTF-8".to_string())
        })?;

        let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY).map_err(|e| {
            DomainError::SourceUnavailable(format!("Failed to open video '{}': {}", path_str, e))
        })?;

        let opened = capture.is_opened().map_err(|e| {
            DomainError::SourceUnavailable(format!("Failed to query video state: {}", e))
        })?;
        if !opened {
            return Err(DomainError::SourceUnavailable(format!(
                "Video file '{}' could not be opened",
                path_str
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.to_string());

        Ok(Self {
            name,
            capture,
            jpeg_quality,
        })
    }
}

impl VideoSourcePort for VideoFileAdapter {
    fn duration_secs(&mut self) -> DomainResult<f64> {
        let fps = self
            .capture
            .get(videoio::CAP_PROP_FPS)
            .map_err(|e| DomainError::Other(format!("Failed to query FPS: {}", e)))?;
        let frames = self
            .capture
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .map_err(|e| DomainError::Other(format!("Failed to query frame count: {}", e)))?;

        if fps <= 0.0 || frames <= 0.0 {
            return Err(DomainError::CaptureUnavailable(
                "video reports no duration".to_string(),
            ));
        }

        Ok(frames / fps)
    }

    fn frame_at(&mut self, timestamp_secs: f64) -> DomainResult<EncodedImage> {
        self.capture
            .set(videoio::CAP_PROP_POS_MSEC, timestamp_secs * 1000.0)
            .map_err(|e| {
                DomainError::CaptureUnavailable(format!(
                    "Failed to seek to {:.1}s: {}",
                    timestamp_secs, e
                ))
            })?;

        let mut frame = Mat::default();
        let grabbed = self.capture.read(&mut frame).map_err(|e| {
            DomainError::CaptureUnavailable(format!("Failed to read video frame: {}", e))
        })?;

        if !grabbed || frame.empty() {
            return Err(DomainError::CaptureUnavailable(format!(
                "no frame available at {:.1}s",
                timestamp_secs
            )));
        }

        encode_jpeg(&frame, self.jpeg_quality)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
