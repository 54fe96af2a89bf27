//! 注釈付け処理のエラー型

use rehash_debuginfo::DebugInfoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    DebugInfo(#[from] DebugInfoError),

    /// アンカーが確定する前にアドレス変換が呼ばれた
    #[error("anchor address not yet available, cannot translate address")]
    AnchorUnavailable,

    #[error("failed to parse {what} {text:?}: {reason}")]
    InvalidAddress {
        what: &'static str,
        text: String,
        reason: String,
    },

    #[error("duplicate override entry for version {version:?} tag {build_tag:?}")]
    DuplicateOverride { version: String, build_tag: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
