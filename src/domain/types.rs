/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// ライブループと各アダプタの間で共有される型。

use serde::Serialize;
use std::collections::VecDeque;

/// 「検出なし」を表すラベル（予測サービス側の定義に準拠）
pub const NO_DETECTION_LABEL: &str = "No hand detected";

/// 1回の予測結果
///
/// 予測サービスから返された時点で不変。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// 予測ラベル（ASL文字等）
    pub label: String,
    /// 信頼度（0〜100のパーセント値）
    pub confidence: f32,
}

impl Prediction {
    /// 新しい予測結果を作成
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// 「検出なし」かどうか
    pub fn is_no_detection(&self) -> bool {
        self.label == NO_DETECTION_LABEL
    }

    /// 前回の結果と意味のある差があるか判定
    ///
    /// ラベルが異なる、または信頼度の差がdeltaポイントを超える場合にtrue。
    /// ほぼ同一のフレームが続くことによる表示のチラつきを抑えるために使用する。
    pub fn differs_from(&self, other: &Prediction, delta: f32) -> bool {
        self.label != other.label || (self.confidence - other.confidence).abs() > delta
    }
}

/// エンコード済みフレーム画像（JPEG）
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// JPEGバイト列
    pub data: Vec<u8>,
    /// 元フレームの幅
    pub width: u32,
    /// 元フレームの高さ
    pub height: u32,
}

impl EncodedImage {
    /// 新しいエンコード済み画像を作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

/// ライブループのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// 停止中（初期状態）
    Stopped,
    /// 正常稼働中
    Running,
    /// 失敗を経験しつつ稼働中（閾値未満）
    Degraded,
    /// 終端失敗（このセッションは終了、直後にStoppedへ戻る）
    Failed,
}

impl LoopPhase {
    /// tickを受け付けるフェーズか
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Degraded)
    }
}

/// ライブループの状態
///
/// LivePredictionLoopが排他的に所有し、tick処理の内部でのみ変更される。
#[derive(Debug, Clone)]
pub struct LoopState {
    /// 現在のフェーズ
    pub phase: LoopPhase,
    /// capture+predictの1サイクルが進行中か
    pub is_processing: bool,
    /// 連続失敗回数
    pub consecutive_failures: u32,
    /// 最後に採用した予測結果
    pub last_prediction: Option<Prediction>,
}

impl LoopState {
    /// 初期状態（Stopped）を作成
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::Stopped,
            is_processing: false,
            consecutive_failures: 0,
            last_prediction: None,
        }
    }

    /// 初期状態に戻す
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self::new()
    }
}

/// 直近予測のバッファ（新しい順、上限付き）
///
/// 「検出なし」ラベルは保持しない。上限を超えた場合は最古を破棄する。
#[derive(Debug, Clone)]
pub struct RecentPredictions {
    entries: VecDeque<Prediction>,
    capacity: usize,
}

impl RecentPredictions {
    /// デフォルトの保持数
    pub const DEFAULT_CAPACITY: usize = 5;

    /// 指定した上限でバッファを作成
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 予測結果を先頭に追加
    ///
    /// 「検出なし」は無視される。上限超過時は最古のエントリを破棄する。
    pub fn push(&mut self, prediction: Prediction) {
        if prediction.is_no_detection() {
            return;
        }
        self.entries.push_front(prediction);
        self.entries.truncate(self.capacity);
    }

    /// 全エントリを破棄
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 保持中のエントリ数
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// バッファが空か
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 新しい順のイテレータ
    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = &Prediction> {
        self.entries.iter()
    }

    /// 最新のエントリ
    #[allow(dead_code)]
    pub fn latest(&self) -> Option<&Prediction> {
        self.entries.front()
    }
}

impl Default for RecentPredictions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// タイムスタンプ付き予測（動画タイムライン解析用）
#[derive(Debug, Clone, Serialize)]
pub struct TimestampedPrediction {
    /// 動画先頭からの秒数
    pub timestamp_secs: f64,
    /// その時刻のフレームに対する予測結果
    #[serde(flatten)]
    pub prediction: Prediction,
}
