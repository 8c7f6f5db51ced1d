//! Application Layer
//!
//! ライブ予測ループ、動画タイムライン解析、統計管理などのユースケースを実装します。
//!
//! ## モジュール構成
//! - `live_loop`: 周期capture→predict→reconcileサイクルの状態機械
//! - `video_scan`: 動画ファイルのタイムライン解析とJSONエクスポート
//! - `stats`: tick統計管理（成功/失敗/スキップ数、レイテンシ）

pub mod live_loop;
pub mod stats;
pub mod video_scan;
