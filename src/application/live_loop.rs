//! ライブ予測ループモジュール
//!
//! capture → predict → reconcile の周期サイクルを駆動する状態機械。
//! バックプレッシャー（処理中のtickはスキップ）、連続失敗による縮退と打ち切り、
//! デバウンス付きの結果反映を一元管理します。

use crate::application::stats::{StatKind, TickStats};
use crate::domain::{
    config::LiveLoopConfig,
    error::{DomainError, DomainResult},
    ports::{FrameCapturePort, PredictionPort, StatusPresenterPort},
    types::{LoopPhase, LoopState, Prediction, RecentPredictions},
};
use std::time::Instant;

/// ライブ予測ループ
///
/// キャプチャソース・周期tickスケジュール・リコンシリエーション状態
/// （直近結果、処理中フラグ、連続失敗回数）を所有する。
///
/// # 状態機械
/// `Stopped → Running ↔ Degraded → Failed → Stopped`
///
/// # 並行性
/// 単一スレッドの協調スケジュール。tickは厳密に逐次であり、前のサイクルの
/// capture/predictスパンが開いている間は次のtick本体が始まらない。
/// これはキューではなくスキップ判定で保証されるため、負荷がかかった場合
/// tickは暗黙に破棄される（at-most-one-in-flight）。
pub struct LivePredictionLoop<C, P, S>
where
    C: FrameCapturePort,
    P: PredictionPort,
    S: StatusPresenterPort,
{
    capture: C,
    predictor: P,
    presenter: S,
    config: LiveLoopConfig,
    state: LoopState,
    recent: RecentPredictions,
}

impl<C, P, S> LivePredictionLoop<C, P, S>
where
    C: FrameCapturePort,
    P: PredictionPort,
    S: StatusPresenterPort,
{
    /// 新しいライブループを作成（初期状態はStopped）
    pub fn new(capture: C, predictor: P, presenter: S, config: LiveLoopConfig) -> Self {
        let recent = RecentPredictions::new(config.recent_capacity);
        Self {
            capture,
            predictor,
            presenter,
            config,
            state: LoopState::new(),
            recent,
        }
    }

    /// 現在のループ状態
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// 直近予測バッファ
    pub fn recent(&self) -> &RecentPredictions {
        &self.recent
    }

    /// ループを開始する
    ///
    /// キャプチャソースを取得し、Stopped → Running に遷移する。
    /// ソース取得に失敗した場合はStoppedのまま、presenterへ即時通知する。
    ///
    /// # Returns
    /// - `Ok(())`: 開始成功
    /// - `Err(DomainError::SourceUnavailable)`: ソース取得失敗
    pub fn start(&mut self) -> DomainResult<()> {
        if self.state.phase != LoopPhase::Stopped {
            return Err(DomainError::Other(
                "live loop already started".to_string(),
            ));
        }

        if let Err(e) = self.capture.acquire() {
            self.presenter.on_terminal_error(&e.to_string());
            return Err(e);
        }

        self.state.phase = LoopPhase::Running;
        self.presenter.on_state_change(&self.state);
        Ok(())
    }

    /// ループを停止する（冪等）
    ///
    /// ソース解放・直近バッファのクリア・状態リセットを行い、どのフェーズ
    /// からでもStoppedへ遷移する。予測呼び出しの進行中に呼ばれても安全で、
    /// その呼び出しの完了結果はfinish_tick()のフェーズ確認で破棄される。
    pub fn stop(&mut self) {
        if self.state.phase == LoopPhase::Stopped && !self.state.is_processing {
            return;
        }

        if self.capture.is_active() {
            self.capture.release();
        }
        self.recent.clear();
        self.state.reset();
        self.presenter.on_state_change(&self.state);
    }

    /// 1回のtickを実行する
    ///
    /// 処理中、またはRunning/Degraded以外のフェーズではno-op
    /// （スキップであってキューイングではない）。
    pub fn tick(&mut self) {
        if !self.begin_tick() {
            return;
        }
        let outcome = self.run_cycle();
        self.finish_tick(outcome);
    }

    /// tick本体の開始を試みる
    ///
    /// # Returns
    /// capture+predictサイクルを開始した場合はtrue。スキップ時はfalse。
    fn begin_tick(&mut self) -> bool {
        if self.state.is_processing || !self.state.phase.is_active() {
            return false;
        }
        self.state.is_processing = true;
        true
    }

    /// capture → predict を実行する
    ///
    /// フレーム取得とネットワーク往復が、このループ唯一のサスペンション
    /// ポイントになる。
    fn run_cycle(&mut self) -> DomainResult<Prediction> {
        let image = self.capture.capture_frame()?;
        self.predictor.predict(&image)
    }

    /// tickの完了処理
    ///
    /// 進行中にstop()された呼び出しの結果はここで破棄される
    /// （stale-response guard）。状態にも通知にも一切触れない。
    fn finish_tick(&mut self, outcome: DomainResult<Prediction>) {
        if !self.state.phase.is_active() {
            return;
        }

        self.state.is_processing = false;
        match outcome {
            Ok(prediction) => self.reconcile(prediction),
            Err(e) => self.absorb_failure(e),
        }
    }

    /// 成功した予測結果を表示状態へ反映する
    ///
    /// ラベルが同じで信頼度の差がconfidence_delta以下の結果は、状態の
    /// 帳簿づけだけ行って破棄する（ノイズの多いフレームによるチラつき抑制）。
    fn reconcile(&mut self, prediction: Prediction) {
        self.state.consecutive_failures = 0;
        if self.state.phase == LoopPhase::Degraded {
            self.state.phase = LoopPhase::Running;
            self.presenter.on_state_change(&self.state);
        }

        let meaningful = match &self.state.last_prediction {
            Some(last) => prediction.differs_from(last, self.config.confidence_delta),
            None => true,
        };
        if !meaningful {
            return;
        }

        self.recent.push(prediction.clone());
        self.state.last_prediction = Some(prediction.clone());
        self.presenter.on_new_prediction(&prediction);
    }

    /// tick失敗を連続失敗カウントへ吸収する
    ///
    /// 閾値未満ならDegradedとして継続、到達したらFailedへ遷移して
    /// 終端エラーを1回だけ通知し、stop()する。
    fn absorb_failure(&mut self, error: DomainError) {
        self.state.consecutive_failures += 1;
        if error.is_tick_recoverable() {
            tracing::warn!(
                failures = self.state.consecutive_failures,
                "Tick failed: {}",
                error
            );
        } else {
            tracing::error!(
                failures = self.state.consecutive_failures,
                "Unexpected tick failure: {}",
                error
            );
        }

        if self.state.consecutive_failures < self.config.failure_threshold {
            self.state.phase = LoopPhase::Degraded;
            self.presenter.on_state_change(&self.state);
            return;
        }

        self.state.phase = LoopPhase::Failed;
        self.presenter.on_state_change(&self.state);
        self.presenter.on_terminal_error(
            "Unable to reach the prediction service. Stopping live session.",
        );
        self.stop();
    }

    /// ライブループを起動する（ブロッキング）
    ///
    /// 固定周期のtickスケジュールでループを駆動し、終端失敗でStoppedに
    /// 戻った時点で戻る。サイクルが周期を超過した間に溜まった遅延tickは
    /// 破棄され、再生されない。
    pub fn run(&mut self) -> DomainResult<()> {
        self.start()?;

        let info = self.capture.source_info();
        tracing::info!(
            "Live loop started: {} ({}x{}), interval={}ms",
            info.name,
            info.width,
            info.height,
            self.config.tick_interval_ms
        );

        let ticker = crossbeam_channel::tick(self.config.tick_interval());
        let mut stats = TickStats::new(self.config.stats_interval());

        while self.state.phase.is_active() {
            if ticker.recv().is_err() {
                break;
            }

            self.timed_tick(&mut stats);

            // 周期超過中に溜まった遅延tickは破棄する（再生しない）
            while ticker.try_recv().is_ok() {
                stats.record_skipped();
            }

            if stats.should_report() {
                stats.report_and_reset();
            }
        }

        Ok(())
    }

    /// 統計収集付きのtick実行（run()専用）
    fn timed_tick(&mut self, stats: &mut TickStats) {
        if !self.begin_tick() {
            stats.record_skipped();
            return;
        }

        let started = Instant::now();
        let capture_result = self.capture.capture_frame();
        let captured_at = Instant::now();
        let outcome = capture_result.and_then(|image| self.predictor.predict(&image));
        let finished = Instant::now();

        if outcome.is_ok() {
            stats.record_success();
        } else {
            stats.record_failure();
        }
        stats.record_duration(StatKind::Capture, captured_at.duration_since(started));
        stats.record_duration(StatKind::Predict, finished.duration_since(captured_at));
        stats.record_duration(StatKind::EndToEnd, finished.duration_since(started));

        self.finish_tick(outcome);
    }
}
