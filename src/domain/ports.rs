/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層がDIで注入する。

use crate::domain::{DomainResult, EncodedImage, LoopState, Prediction};

/// キャプチャポート: ライブソースからのフレーム取得を抽象化
pub trait FrameCapturePort: Send {
    /// キャプチャソースを取得する（カメラ起動等）
    ///
    /// start()からstop()までの間、ソースはループが排他的に所有する。
    ///
    /// # Returns
    /// - `Ok(())`: 取得成功
    /// - `Err(DomainError::SourceUnavailable)`: 権限拒否・デバイス不在
    fn acquire(&mut self) -> DomainResult<()>;

    /// キャプチャソースを解放する（冪等）
    fn release(&mut self);

    /// ソースがアクティブか
    fn is_active(&self) -> bool;

    /// 呼び出し時点のフレームを取得してJPEGにエンコードする
    ///
    /// # Returns
    /// - `Ok(EncodedImage)`: エンコード済みフレーム
    /// - `Err(DomainError::CaptureUnavailable)`: ソース未アクティブ、
    ///   またはフレームサイズが0（ウォームアップ前）
    fn capture_frame(&mut self) -> DomainResult<EncodedImage>;

    /// キャプチャソースの情報を取得
    fn source_info(&self) -> SourceInfo;
}

/// キャプチャソース情報
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub name: String,
}

/// 予測ポート: 予測サービスとのリクエスト/レスポンス交換を抽象化
///
/// リトライはこの契約に含まれない。失敗時の継続・縮退・打ち切りの方針は
/// LivePredictionLoopの連続失敗カウントが一元管理する。
pub trait PredictionPort: Send {
    /// 画像を予測サービスへ送信し、構造化された予測結果を受け取る
    ///
    /// # Returns
    /// - `Ok(Prediction)`: 予測結果
    /// - `Err(DomainError::Network)`: トランスポート失敗
    /// - `Err(DomainError::InvalidResponse)`: レスポンス不正（必須フィールド欠落等）
    fn predict(&mut self, image: &EncodedImage) -> DomainResult<Prediction>;
}

/// 動画ソースポート: タイムライン解析用のシーク付きフレーム供給を抽象化
pub trait VideoSourcePort: Send {
    /// 動画の長さ（秒）
    fn duration_secs(&mut self) -> DomainResult<f64>;

    /// 指定時刻のフレームを取得してJPEGにエンコードする
    fn frame_at(&mut self, timestamp_secs: f64) -> DomainResult<EncodedImage>;

    /// ソース名（ファイル名等）
    fn name(&self) -> &str;
}

/// 表示ポート: ループ状態の通知先を抽象化
///
/// 通知を画面上のウィジェットへ変換する処理はこのcrateの範囲外。
pub trait StatusPresenterPort: Send {
    /// ループ状態が変化した
    fn on_state_change(&mut self, state: &LoopState);

    /// 新しい予測結果が採用された
    fn on_new_prediction(&mut self, prediction: &Prediction);

    /// 終端エラーが発生した（このセッションは終了）
    fn on_terminal_error(&mut self, message: &str);
}
