//! フレームエンコードの共通ユーティリティ
//!
//! camera/video_file/still_imageの各アダプタで使用されるJPEGエンコード処理。

use crate::domain::{DomainError, DomainResult, EncodedImage};
use opencv::{
    core::{Mat, MatTraitConst, Vector},
    imgcodecs,
};

/// MatをJPEGにエンコードする
///
/// # Arguments
/// - `frame`: エンコード対象のフレーム（BGR形式）
/// - `quality`: JPEG品質（1〜100）
///
/// # Returns
/// - `Ok(EncodedImage)`: JPEGバイト列と元フレームの寸法
/// - `Err(DomainError::CaptureUnavailable)`: エンコード失敗
pub(crate) fn encode_jpeg(frame: &Mat, quality: i32) -> DomainResult<EncodedImage> {
    let mut params = Vector::<i32>::new();
    params.push(imgcodecs::IMWRITE_JPEG_QUALITY);
    params.push(quality);

    let mut buffer = Vector::<u8>::new();
    let encoded = imgcodecs::imencode(".jpg", frame, &mut buffer, &params)
        .map_err(|e| DomainError::CaptureUnavailable(format!("JPEG encode failed: {}", e)))?;

    if !encoded {
        return Err(DomainError::CaptureUnavailable(
            "JPEG encoder rejected the frame".to_string(),
        ));
    }

    Ok(EncodedImage::new(
        buffer.to_vec(),
        frame.cols() as u32,
        frame.rows() as u32,
    ))
}
