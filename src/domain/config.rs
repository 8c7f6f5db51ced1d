//! 設定管理
//!
//! TOML設定ファイルの読み込みとバリデーション。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

/// 実行モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// ライブカメラの周期予測ループ
    #[default]
    Live,
    /// 静止画ファイルの1回予測
    Image,
    /// 動画ファイルのタイムライン解析
    Video,
}

/// キャプチャソース
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// Webカメラ（OpenCV VideoCapture）
    #[default]
    Camera,
    /// 固定フレームを返すモック（カメラなしでの開発用）
    Mock,
}

/// 予測方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    /// 予測サービスへのHTTP送信
    #[default]
    Http,
    /// 固定ラベル列を返すモック（サーバーなしでの開発用）
    Mock,
}

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// 実行モード
    ///
    /// 選択肢: "live", "image", "video"
    /// デフォルト: "live"
    #[serde(default)]
    pub mode: RunMode,

    /// 入力設定（image/videoモード用）
    #[serde(default)]
    pub input: InputConfig,

    /// キャプチャ設定
    #[serde(default)]
    pub capture: CaptureConfig,

    /// 予測サービス設定
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// ライブループ設定
    #[serde(default)]
    pub live: LiveLoopConfig,

    /// 動画解析設定
    #[serde(default)]
    pub video: VideoScanConfig,
}

/// 入力設定
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InputConfig {
    /// 入力ファイルパス（image/videoモードでは必須、liveモードでは無視）
    #[serde(default)]
    pub path: Option<String>,
}

/// キャプチャ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// キャプチャソース
    ///
    /// 選択肢: "camera", "mock"
    /// デフォルト: "camera"
    #[serde(default)]
    pub source: CaptureSource,

    /// カメラのデバイスインデックス
    ///
    /// 通常は0
    pub device_index: u32,

    /// 要求するフレーム幅（ピクセル）
    ///
    /// デバイスが対応しない場合は無視される
    /// デフォルト: 640
    pub frame_width: u32,

    /// 要求するフレーム高さ（ピクセル）
    ///
    /// デフォルト: 480
    pub frame_height: u32,

    /// JPEGエンコード品質（1〜100）
    ///
    /// デフォルト: 80
    pub jpeg_quality: i32,
}

impl CaptureConfig {
    /// デフォルトのフレーム幅
    pub const DEFAULT_FRAME_WIDTH: u32 = 640;
    /// デフォルトのフレーム高さ
    pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
    /// デフォルトのJPEG品質
    pub const DEFAULT_JPEG_QUALITY: i32 = 80;
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSource::default(),
            device_index: 0,
            frame_width: Self::DEFAULT_FRAME_WIDTH,
            frame_height: Self::DEFAULT_FRAME_HEIGHT,
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// 予測サービス設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PredictionConfig {
    /// 予測方式
    ///
    /// 選択肢: "http", "mock"
    /// デフォルト: "http"
    #[serde(default)]
    pub mode: PredictionMode,

    /// 予測エンドポイントのURL
    ///
    /// multipart/form-dataのフィールド`file`で画像を受け取り、
    /// JSON `{prediction, confidence}` を返すエンドポイント
    pub endpoint: String,

    /// リクエストタイムアウト（ミリ秒）
    ///
    /// デフォルト: 10000ms
    pub timeout_ms: u64,
}

impl PredictionConfig {
    /// デフォルトのエンドポイント
    pub const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:5000/predict";
    /// デフォルトのタイムアウト（ミリ秒）
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    /// タイムアウトをDurationとして取得
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            mode: PredictionMode::default(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// ライブループ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LiveLoopConfig {
    /// tick周期（ミリ秒）
    ///
    /// デフォルト: 500ms
    pub tick_interval_ms: u64,

    /// 連続失敗の閾値（この回数に到達したら終端エラーで停止）
    ///
    /// デフォルト: 3回
    pub failure_threshold: u32,

    /// デバウンス用の信頼度差分（パーセントポイント）
    ///
    /// ラベルが同じで信頼度の差がこの値以下の結果は表示に反映しない
    /// デフォルト: 5.0
    pub confidence_delta: f32,

    /// 直近予測バッファの保持数
    ///
    /// デフォルト: 5件
    pub recent_capacity: usize,

    /// 統計情報の出力間隔（秒）
    ///
    /// デフォルト: 10秒
    pub stats_interval_sec: u64,
}

impl LiveLoopConfig {
    /// デフォルトのtick周期（ミリ秒）
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;
    /// デフォルトの連続失敗閾値
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
    /// デフォルトのデバウンス信頼度差分
    pub const DEFAULT_CONFIDENCE_DELTA: f32 = 5.0;
    /// デフォルトの直近バッファ保持数
    pub const DEFAULT_RECENT_CAPACITY: usize = 5;
    /// デフォルトの統計出力間隔（秒）
    pub const DEFAULT_STATS_INTERVAL_SEC: u64 = 10;

    /// tick周期をDurationとして取得
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// 統計出力間隔をDurationとして取得
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_sec)
    }
}

impl Default for LiveLoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            failure_threshold: Self::DEFAULT_FAILURE_THRESHOLD,
            confidence_delta: Self::DEFAULT_CONFIDENCE_DELTA,
            recent_capacity: Self::DEFAULT_RECENT_CAPACITY,
            stats_interval_sec: Self::DEFAULT_STATS_INTERVAL_SEC,
        }
    }
}

/// 動画解析設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoScanConfig {
    /// フレーム抽出間隔（秒）
    ///
    /// デフォルト: 1.0秒
    pub sample_interval_secs: f64,

    /// 解析結果のJSONエクスポート先（省略時はエクスポートしない）
    #[serde(default)]
    pub export_path: Option<String>,
}

impl VideoScanConfig {
    /// デフォルトの抽出間隔（秒）
    pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 1.0;
}

impl Default for VideoScanConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: Self::DEFAULT_SAMPLE_INTERVAL_SECS,
            export_path: None,
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    #[allow(dead_code)]
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        // ライブループの検証
        if self.live.tick_interval_ms == 0 {
            return Err(DomainError::Configuration(
                "Tick interval must be greater than 0".to_string(),
            ));
        }
        if self.live.failure_threshold == 0 {
            return Err(DomainError::Configuration(
                "Failure threshold must be at least 1".to_string(),
            ));
        }
        if self.live.confidence_delta < 0.0 {
            return Err(DomainError::Configuration(
                "Confidence delta must be non-negative".to_string(),
            ));
        }
        if self.live.recent_capacity == 0 {
            return Err(DomainError::Configuration(
                "Recent predictions capacity must be at least 1".to_string(),
            ));
        }

        // キャプチャの検証
        if self.capture.jpeg_quality < 1 || self.capture.jpeg_quality > 100 {
            return Err(DomainError::Configuration(
                "JPEG quality must be within 1-100".to_string(),
            ));
        }
        if self.capture.frame_width == 0 || self.capture.frame_height == 0 {
            return Err(DomainError::Configuration(
                "Frame width and height must be greater than 0".to_string(),
            ));
        }

        // 予測サービスの検証
        if self.prediction.mode == PredictionMode::Http && self.prediction.endpoint.is_empty() {
            return Err(DomainError::Configuration(
                "Prediction endpoint must not be empty".to_string(),
            ));
        }
        if self.prediction.timeout_ms == 0 {
            return Err(DomainError::Configuration(
                "Prediction timeout must be greater than 0".to_string(),
            ));
        }

        // 動画解析の検証
        if self.video.sample_interval_secs <= 0.0 {
            return Err(DomainError::Configuration(
                "Video sample interval must be positive".to_string(),
            ));
        }

        // image/videoモードでは入力パスが必須
        if self.mode != RunMode::Live && self.input.path.is_none() {
            return Err(DomainError::Configuration(
                "Input path is required for image/video mode".to_string(),
            ));
        }

        Ok(())
    }
}
