//! 統計情報管理モジュール
//!
//! tickの成功・失敗・スキップ数と各処理段階のレイテンシを収集・出力します。

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 統計情報の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// フレーム取得＋JPEGエンコード時間
    Capture,
    /// 予測サービスとの往復時間
    Predict,
    /// エンドツーエンドのtickレイテンシ
    EndToEnd,
}

/// パーセンタイル統計値
#[derive(Debug, Clone)]
pub struct PercentileStats {
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub count: usize,
}

/// tick統計コレクター
#[derive(Debug)]
pub struct TickStats {
    /// 各処理段階の所要時間（最大1000サンプル保持）
    durations: std::collections::HashMap<StatKind, VecDeque<Duration>>,
    /// 成功したtick数
    success_count: u64,
    /// 失敗したtick数
    failure_count: u64,
    /// スキップされたtick数（処理中・非アクティブ）
    skipped_count: u64,
    /// 最後の統計出力時刻
    last_report: Instant,
    /// 統計出力間隔
    report_interval: Duration,
}

impl TickStats {
    /// 最大サンプル保持数（パーセンタイル計算用）
    const MAX_DURATION_SAMPLES: usize = 1000;

    /// 新しいTickStatsを作成
    ///
    /// # Arguments
    /// * `report_interval` - 統計出力間隔（例: 10秒）
    pub fn new(report_interval: Duration) -> Self {
        Self {
            durations: std::collections::HashMap::new(),
            success_count: 0,
            failure_count: 0,
            skipped_count: 0,
            last_report: Instant::now(),
            report_interval,
        }
    }

    /// 成功したtickを記録
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// 失敗したtickを記録
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    /// スキップされたtickを記録
    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    /// 処理時間を記録
    ///
    /// # Arguments
    /// * `kind` - 統計種別
    /// * `duration` - 処理時間
    pub fn record_duration(&mut self, kind: StatKind, duration: Duration) {
        let queue = self.durations.entry(kind).or_default();
        queue.push_back(duration);

        // 最大サンプル数を超えたら古いデータを破棄
        if queue.len() > Self::MAX_DURATION_SAMPLES {
            queue.pop_front();
        }
    }

    /// 成功tick数を取得
    #[allow(dead_code)]
    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    /// 失敗tick数を取得
    #[allow(dead_code)]
    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// スキップtick数を取得
    #[allow(dead_code)]
    pub fn skipped_count(&self) -> u64 {
        self.skipped_count
    }

    /// パーセンタイル統計を計算
    ///
    /// # Arguments
    /// * `kind` - 統計種別
    ///
    /// # Returns
    /// パーセンタイル統計値。データがない場合は None
    pub fn percentile_stats(&self, kind: StatKind) -> Option<PercentileStats> {
        let queue = self.durations.get(&kind)?;
        if queue.is_empty() {
            return None;
        }

        let mut sorted: Vec<Duration> = queue.iter().copied().collect();
        sorted.sort();

        let count = sorted.len();
        let p50 = sorted[count * 50 / 100];
        let p95 = sorted[count * 95 / 100];
        let p99 = sorted[count * 99 / 100];

        Some(PercentileStats {
            p50,
            p95,
            p99,
            count,
        })
    }

    /// 統計レポートを出力すべきか判定
    ///
    /// # Returns
    /// 出力すべき場合は true
    pub fn should_report(&self) -> bool {
        self.last_report.elapsed() >= self.report_interval
    }

    /// 統計レポートを出力してタイマーをリセット
    #[cfg(debug_assertions)]
    pub fn report_and_reset(&mut self) {
        use tracing::info;

        info!("=== Live Loop Statistics ===");
        info!(
            "Ticks: success={}, failure={}, skipped={}",
            self.success_count, self.failure_count, self.skipped_count
        );

        for kind in [StatKind::Capture, StatKind::Predict, StatKind::EndToEnd] {
            if let Some(stats) = self.percentile_stats(kind) {
                info!(
                    "{:?}: p50={:.2}ms, p95={:.2}ms, p99={:.2}ms (n={})",
                    kind,
                    stats.p50.as_secs_f64() * 1000.0,
                    stats.p95.as_secs_f64() * 1000.0,
                    stats.p99.as_secs_f64() * 1000.0,
                    stats.count
                );
            }
        }

        info!("============================");

        self.last_report = Instant::now();
    }

    /// Release build用のダミー実装
    #[cfg(not(debug_assertions))]
    pub fn report_and_reset(&mut self) {
        self.last_report = Instant::now();
    }
}
