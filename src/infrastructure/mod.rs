//! Infrastructure層: 外部技術の統合
//!
//! Domain層のtraitを実装し、外部ライブラリ（OpenCV/reqwest）と接続する。

pub mod camera;
pub mod capture_selector;
pub mod console_presenter;
mod encode;
pub mod mock_capture;
pub mod mock_predict;
pub mod predict_http;
pub mod predict_selector;
pub mod still_image;
pub mod video_file;
