/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - 回復可能性をエラー型で表現（tick内で吸収されるエラー vs 即時に表面化するエラー）

use thiserror::Error;

/// Domain層の統一エラー型
#[derive(Error, Debug)]
pub enum DomainError {
    /// キャプチャソースの取得失敗（権限拒否・デバイス不在）
    ///
    /// start()時に即座に表面化する。tick内では発生しない。
    #[error("Capture source unavailable: {0}")]
    SourceUnavailable(String),

    /// キャプチャ一時不可（ソース未アクティブ・ウォームアップ前）
    #[error("Capture not ready: {0}")]
    CaptureUnavailable(String),

    /// 通信（HTTPトランスポート）関連のエラー
    #[error("Network error: {0}")]
    Network(String),

    /// 予測サービスのレスポンス不正（必須フィールド欠落等）
    #[error("Invalid response from prediction service: {0}")]
    InvalidResponse(String),

    /// 設定・入力ファイル関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 解析結果エクスポート関連のエラー
    #[error("Export error: {0}")]
    Export(String),

    /// その他のエラー
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl DomainError {
    /// tick内で吸収されるエラーか判定
    ///
    /// これらは連続失敗カウントに計上されるのみで、閾値に到達するまで
    /// ライブループを止めない。
    pub fn is_tick_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CaptureUnavailable(_) | Self::Network(_) | Self::InvalidResponse(_)
        )
    }
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_recoverable_errors() {
        assert!(DomainError::CaptureUnavailable("warming up".to_string()).is_tick_recoverable());
        assert!(DomainError::Network("connection refused".to_string()).is_tick_recoverable());
        assert!(DomainError::InvalidResponse("missing field".to_string()).is_tick_recoverable());
    }

    #[test]
    fn test_non_recoverable_errors() {
        assert!(!DomainError::SourceUnavailable("denied".to_string()).is_tick_recoverable());
        assert!(!DomainError::Configuration("bad config".to_string()).is_tick_recoverable());
        assert!(!DomainError::Export("disk full".to_string()).is_tick_recoverable());
        assert!(!DomainError::Other("boom".to_string()).is_tick_recoverable());
    }
}
