//! ライブループ統合テスト
//!
//! モックのキャプチャ・予測・表示ポートを組み合わせたend-to-endテスト。
//! 実カメラ・実サーバーは不要。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use SignOfTheTimes::application::live_loop::LivePredictionLoop;
use SignOfTheTimes::domain::{
    config::LiveLoopConfig,
    error::{DomainError, DomainResult},
    ports::{PredictionPort, StatusPresenterPort},
    types::{EncodedImage, LoopPhase, LoopState, Prediction},
};
use SignOfTheTimes::infrastructure::mock_capture::MockCaptureAdapter;

/// 予測結果のシナリオを順番に返すテスト用ポート
struct ScriptedPredictor {
    outcomes: VecDeque<DomainResult<Prediction>>,
}

impl ScriptedPredictor {
    fn new(outcomes: Vec<DomainResult<Prediction>>) -> Self {
        Self {
            outcomes: outcomes.into(),
        }
    }
}

impl PredictionPort for ScriptedPredictor {
    fn predict(&mut self, _image: &EncodedImage) -> DomainResult<Prediction> {
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::Network("script exhausted".to_string())))
    }
}

/// 通知を記録するテスト用presenter
#[derive(Default)]
struct PresenterLog {
    phases: Vec<LoopPhase>,
    predictions: Vec<Prediction>,
    terminal_errors: Vec<String>,
}

struct RecordingPresenter {
    log: Arc<Mutex<PresenterLog>>,
}

impl RecordingPresenter {
    fn new() -> (Self, Arc<Mutex<PresenterLog>>) {
        let log = Arc::new(Mutex::new(PresenterLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl StatusPresenterPort for RecordingPresenter {
    fn on_state_change(&mut self, state: &LoopState) {
        self.log.lock().unwrap().phases.push(state.phase);
    }

    fn on_new_prediction(&mut self, prediction: &Prediction) {
        self.log.lock().unwrap().predictions.push(prediction.clone());
    }

    fn on_terminal_error(&mut self, message: &str) {
        self.log
            .lock()
            .unwrap()
            .terminal_errors
            .push(message.to_string());
    }
}

/// テスト用のループ設定（短周期）
fn fast_config() -> LiveLoopConfig {
    LiveLoopConfig {
        tick_interval_ms: 10,
        stats_interval_sec: 60,
        ..Default::default()
    }
}

fn network_error() -> DomainResult<Prediction> {
    Err(DomainError::Network("connection refused".to_string()))
}

#[test]
fn test_live_session_end_to_end() {
    let capture = MockCaptureAdapter::new(80);
    let predictor = ScriptedPredictor::new(vec![
        Ok(Prediction::new("A", 97.0)),
        Ok(Prediction::new("A", 95.5)), // デバウンスされる
        Ok(Prediction::new("B", 88.5)),
        network_error(),
        network_error(),
        network_error(),
    ]);
    let (presenter, log) = RecordingPresenter::new();

    let mut live = LivePredictionLoop::new(capture, predictor, presenter, fast_config());
    live.run().unwrap();

    // 連続失敗の閾値到達でセッションは終了している
    assert_eq!(live.state().phase, LoopPhase::Stopped);
    assert!(live.recent().is_empty());
    assert!(live.state().last_prediction.is_none());

    let log = log.lock().unwrap();
    // 採用された予測はA:97とB:88.5の2件（A:95.5は差1.5ポイントで破棄）
    assert_eq!(log.predictions.len(), 2);
    assert_eq!(log.predictions[0], Prediction::new("A", 97.0));
    assert_eq!(log.predictions[1], Prediction::new("B", 88.5));

    // 終端エラーは1回だけ通知される
    assert_eq!(log.terminal_errors.len(), 1);

    // フェーズ遷移はFailedを経てStoppedで終わる
    assert_eq!(
        &log.phases[log.phases.len() - 2..],
        &[LoopPhase::Failed, LoopPhase::Stopped]
    );
}

#[test]
fn test_reconciliation_scenario_with_manual_ticks() {
    let capture = MockCaptureAdapter::new(80);
    let predictor = ScriptedPredictor::new(vec![
        Ok(Prediction::new("A", 90.0)),
        Ok(Prediction::new("A", 92.0)),
        Ok(Prediction::new("B", 80.0)),
    ]);
    let (presenter, _log) = RecordingPresenter::new();

    let mut live = LivePredictionLoop::new(capture, predictor, presenter, fast_config());
    live.start().unwrap();

    live.tick();
    assert_eq!(
        live.state().last_prediction,
        Some(Prediction::new("A", 90.0))
    );
    let labels: Vec<String> = live.recent().iter().map(|p| p.label.clone()).collect();
    assert_eq!(labels, vec!["A"]);

    // 同一ラベル・差2ポイントは変化なし
    live.tick();
    assert_eq!(
        live.state().last_prediction,
        Some(Prediction::new("A", 90.0))
    );
    assert_eq!(live.recent().len(), 1);

    live.tick();
    assert_eq!(
        live.state().last_prediction,
        Some(Prediction::new("B", 80.0))
    );
    let entries: Vec<(String, f32)> = live
        .recent()
        .iter()
        .map(|p| (p.label.clone(), p.confidence))
        .collect();
    assert_eq!(
        entries,
        vec![("B".to_string(), 80.0), ("A".to_string(), 90.0)]
    );

    live.stop();
    assert!(live.recent().is_empty());
}

#[test]
fn test_degraded_session_recovers_below_threshold() {
    let capture = MockCaptureAdapter::new(80);
    let predictor = ScriptedPredictor::new(vec![
        network_error(),
        network_error(),
        Ok(Prediction::new("C", 70.0)),
        Ok(Prediction::new("D", 85.0)),
    ]);
    let (presenter, log) = RecordingPresenter::new();

    let mut live = LivePredictionLoop::new(capture, predictor, presenter, fast_config());
    live.start().unwrap();

    live.tick();
    live.tick();
    assert_eq!(live.state().phase, LoopPhase::Degraded);
    assert_eq!(live.state().consecutive_failures, 2);

    // 閾値到達前に成功すれば回復する
    live.tick();
    assert_eq!(live.state().phase, LoopPhase::Running);
    assert_eq!(live.state().consecutive_failures, 0);

    live.tick();
    assert_eq!(live.recent().len(), 2);

    // 終端エラーは発生していない
    assert!(log.lock().unwrap().terminal_errors.is_empty());
}

#[test]
fn test_restart_after_terminal_failure() {
    let capture = MockCaptureAdapter::new(80);
    let predictor = ScriptedPredictor::new(vec![
        network_error(),
        network_error(),
        network_error(),
        Ok(Prediction::new("A", 90.0)),
    ]);
    let (presenter, _log) = RecordingPresenter::new();

    let mut live = LivePredictionLoop::new(capture, predictor, presenter, fast_config());
    live.start().unwrap();

    for _ in 0..3 {
        live.tick();
    }
    assert_eq!(live.state().phase, LoopPhase::Stopped);

    // 終端失敗後もstart()し直せば新しいセッションとして動く
    live.start().unwrap();
    assert_eq!(live.state().phase, LoopPhase::Running);

    live.tick();
    assert_eq!(
        live.state().last_prediction,
        Some(Prediction::new("A", 90.0))
    );
}
