//! クラッシュログ注釈のコア機能
//!
//! このクレートは、ログ行の分類、アンカーの決定、実行時アドレスの変換を行い、
//! `[address]` で終わる行にソース位置を書き足します。

pub mod address;
pub mod anchor;
pub mod annotator;
pub mod classify;
pub mod config;
pub mod errors;
pub mod overrides;
pub mod parse;

pub use address::{AddressTranslator, AnchorPair};
pub use anchor::{AnchorResolver, AnchorSource};
pub use annotator::{AnnotateStats, LineAnnotator};
pub use classify::{tokenize, LineToken, MetadataFields};
pub use config::{AnnotatorConfig, DEFAULT_ANCHOR_SYMBOL};
pub use errors::AnnotateError;
pub use overrides::{OverrideEntry, OverrideTable};

// 他のクレートから使用するために再エクスポート
pub use rehash_debuginfo::{AddressWidth, DebugInfo, SourceLocation};

/// 注釈付け処理の結果型
pub type Result<T> = std::result::Result<T, AnnotateError>;
