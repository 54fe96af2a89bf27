//! 注釈付けの設定

/// 既定のアンカーシンボル
pub const DEFAULT_ANCHOR_SYMBOL: &str = "Main";

/// ログ行から読み取るラベルとアンカーシンボル
///
/// ラベルは行のどこに現れてもよい（部分文字列一致）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorConfig {
    /// 実行時アドレスを与えられるシンボル
    pub anchor_symbol: String,
    pub version_label: String,
    pub tag_label: String,
    /// `<label><address>` の形でアンカーの実行時アドレスを示すラベル
    pub anchor_label: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            anchor_symbol: DEFAULT_ANCHOR_SYMBOL.to_string(),
            version_label: "Version: ".to_string(),
            tag_label: "Tag: ".to_string(),
            anchor_label: "Main is at ".to_string(),
        }
    }
}
