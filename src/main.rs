mod application;
mod domain;
mod infrastructure;
mod logging;

use crate::application::live_loop::LivePredictionLoop;
use crate::application::video_scan;
use crate::domain::config::{AppConfig, RunMode};
use crate::domain::error::DomainError;
use crate::domain::ports::PredictionPort; // traitメソッド使用のため
use crate::infrastructure::capture_selector::CaptureSelector;
use crate::infrastructure::console_presenter::ConsolePresenter;
use crate::infrastructure::predict_selector::PredictionSelector;
use crate::infrastructure::still_image;
use crate::infrastructure::video_file::VideoFileAdapter;
use crate::logging::init_logging;
use std::path::{Path, PathBuf};

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("SignOfTheTimes starting...");

    match run() {
        Ok(_) => {
            tracing::info!("SignOfTheTimes terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate()?;

    tracing::info!("Configuration validated successfully");
    tracing::info!(
        "Mode: {:?}, Endpoint: {} (timeout={}ms)",
        config.mode,
        config.prediction.endpoint,
        config.prediction.timeout_ms
    );

    // 予測アダプタの初期化
    let mut predictor = PredictionSelector::from_config(&config.prediction)?;
    tracing::info!("Prediction adapter: {}", predictor.mode_type());

    match config.mode {
        RunMode::Live => {
            let capture = CaptureSelector::from_config(&config.capture);
            tracing::info!("Capture adapter: {}", capture.source_type());
            tracing::info!(
                "Live loop: interval={}ms, failure_threshold={}, confidence_delta={}",
                config.live.tick_interval_ms,
                config.live.failure_threshold,
                config.live.confidence_delta
            );

            let presenter = ConsolePresenter::new();
            let mut live =
                LivePredictionLoop::new(capture, predictor, presenter, config.live.clone());

            // ライブループの起動（ブロッキング、終端失敗まで戻らない）
            live.run()?;
        }
        RunMode::Image => {
            let path = required_input(&config)?;
            tracing::info!("Predicting still image: {}", path.display());

            let image = still_image::encode_image_file(&path, config.capture.jpeg_quality)?;
            let prediction = predictor.predict(&image)?;

            tracing::info!(
                "Prediction: {} ({}%)",
                prediction.label,
                prediction.confidence.round() as i32
            );
        }
        RunMode::Video => {
            let path = required_input(&config)?;
            tracing::info!("Analyzing video: {}", path.display());

            let mut source = VideoFileAdapter::open(&path, config.capture.jpeg_quality)?;
            let report = video_scan::scan_video(&mut source, &mut predictor, &config.video)?;

            tracing::info!(
                "Video analysis finished: {} predictions over {:.1}s",
                report.predictions.len(),
                report.duration_secs
            );

            if let Some(export) = &config.video.export_path {
                video_scan::export_report(&report, Path::new(export))?;
                tracing::info!("Results exported to {}", export);
            }
        }
    }

    Ok(())
}

/// image/videoモードの入力パスを取得
fn required_input(config: &AppConfig) -> Result<PathBuf, DomainError> {
    config
        .input
        .path
        .as_ref()
        .map(PathBuf::from)
        .ok_or_else(|| {
            DomainError::Configuration("Input path is required for image/video mode".to_string())
        })
}
