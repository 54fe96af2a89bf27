//! ビルドごとのアンカー補正テーブル
//!
//! 古いログには `Main is at` 行がない。既知のビルドについては、最初に現れる
//! スタックフレームのアドレスが特定のシンボルから一定量ずれていることが
//! 分かっているので、そこからアンカーを復元する。

use crate::{AnnotateError, Result};
use std::collections::HashMap;

/// 組み込みの補正エントリ `(version, build_tag, anchor_symbol, known_offset)`
const BUILTIN_OVERRIDES: &[(&str, &str, &str, u64)] = &[(
    "98.2.365 X86_64-WINDOWS-MSVC LUACONSOLE HTTPS",
    "e371d63",
    "Platform::StackTrace",
    0x146,
)];

/// 補正エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub version: String,
    pub build_tag: String,
    /// 最初のフレームが属するシンボル
    pub anchor_symbol: String,
    /// 最初のフレームのアドレスとアンカーとの差
    pub known_offset: u64,
}

impl OverrideEntry {
    pub fn new(version: &str, build_tag: &str, anchor_symbol: &str, known_offset: u64) -> Self {
        Self {
            version: version.to_string(),
            build_tag: build_tag.to_string(),
            anchor_symbol: anchor_symbol.to_string(),
            known_offset,
        }
    }
}

/// `(version, build_tag)` で完全一致検索する読み取り専用テーブル
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<(String, String), OverrideEntry>,
}

impl OverrideTable {
    /// エントリからテーブルを作る。キーの重複はエラー
    pub fn new<I: IntoIterator<Item = OverrideEntry>>(entries: I) -> Result<Self> {
        let mut map = HashMap::new();
        for entry in entries {
            let key = (entry.version.clone(), entry.build_tag.clone());
            if map.contains_key(&key) {
                return Err(AnnotateError::DuplicateOverride {
                    version: entry.version,
                    build_tag: entry.build_tag,
                });
            }
            map.insert(key, entry);
        }
        Ok(Self { entries: map })
    }

    /// 組み込みのテーブル
    ///
    /// `new` と同じくキーの重複はエラーになる。
    pub fn builtin() -> Result<Self> {
        Self::new(
            BUILTIN_OVERRIDES
                .iter()
                .map(|&(version, tag, symbol, offset)| OverrideEntry::new(version, tag, symbol, offset)),
        )
    }

    pub fn lookup(&self, version: &str, build_tag: &str) -> Option<&OverrideEntry> {
        self.entries
            .get(&(version.to_string(), build_tag.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
