//! コンソール表示アダプタ
//!
//! StatusPresenterPortの実装。状態遷移・新しい予測・終端エラーを
//! tracing経由でコンソールに表示する。

use crate::domain::{LoopPhase, LoopState, Prediction, StatusPresenterPort};

/// コンソール表示アダプタ
pub struct ConsolePresenter;

impl ConsolePresenter {
    /// 新しいコンソール表示アダプタを作成
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPresenterPort for ConsolePresenter {
    fn on_state_change(&mut self, state: &LoopState) {
        match state.phase {
            LoopPhase::Running => tracing::info!("Status: Active"),
            LoopPhase::Degraded => tracing::warn!(
                failures = state.consecutive_failures,
                "Status: Retrying..."
            ),
            LoopPhase::Failed => tracing::error!("Status: Connection Error"),
            LoopPhase::Stopped => tracing::info!("Status: Not Started"),
        }
    }

    fn on_new_prediction(&mut self, prediction: &Prediction) {
        tracing::info!(
            "Prediction: {} ({}%)",
            prediction.label,
            prediction.confidence.round() as i32
        );
    }

    fn on_terminal_error(&mut self, message: &str) {
        tracing::error!("{}", message);
    }
}
