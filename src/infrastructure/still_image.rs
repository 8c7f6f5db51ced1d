//! 静止画ファイル入力
//!
//! 画像ファイルを検証・デコードし、予測サービスへ送るJPEGに再エンコードする。
//! imageモード（1回予測）から使用される。

use crate::domain::{DomainError, DomainResult, EncodedImage};
use crate::infrastructure::encode::encode_jpeg;
use opencv::{core::MatTraitConst, imgcodecs};
use std::path::Path;

/// 受け付ける画像拡張子
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// パスが対応画像形式か判定（拡張子ベース）
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// 画像ファイルを読み込み、JPEGにエンコードして返す
///
/// # Returns
/// - `Ok(EncodedImage)`: エンコード済み画像
/// - `Err(DomainError::Configuration)`: 非対応形式、またはデコード失敗
pub fn encode_image_file(path: &Path, jpeg_quality: i32) -> DomainResult<EncodedImage> {
    if !is_supported_image(path) {
        return Err(DomainError::Configuration(format!(
            "'{}' is not a supported image file (expected {})",
            path.display(),
            IMAGE_EXTENSIONS.join("/")
        )));
    }

    let path_str = path.to_str().ok_or_else(|| {
        DomainError::Configuration("Image path is not valid UTF-8".to_string())
    })?;

    let frame = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)
        .map_err(|e| DomainError::Configuration(format!("Failed to read image: {}", e)))?;

    if frame.empty() {
        return Err(DomainError::Configuration(format!(
            "Failed to decode image '{}'",
            path.display()
        )));
    }

    encode_jpeg(&frame, jpeg_quality)
}
