//! シンボル解決機能

use crate::{DebugInfoError, DwarfLoader, Result, SymbolPattern};
use object::{Object, ObjectSymbol, SymbolKind};

/// 関数シンボル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// デバッグ情報に記録された名前
    pub name: String,
    /// デマングルされたシンボル名（可読な形式）
    pub demangled_name: String,
    /// 相対アドレス
    pub address: u64,
    pub size: u64,
}

impl Symbol {
    /// シンボルを作成し、デマングルされた名前を設定する
    pub fn new(name: String, address: u64, size: u64) -> Self {
        let demangled_name = demangle_symbol(&name);
        Self {
            name,
            demangled_name,
            address,
            size,
        }
    }
}

/// シンボル名をデマングルする
fn demangle_symbol(name: &str) -> String {
    if let Ok(demangled) = rustc_demangle::try_demangle(name) {
        return format!("{:#}", demangled);
    }

    // PDBの手続きシンボルは既にアンデコレートされている
    name.to_string()
}

/// シンボル解決
///
/// 名前からの検索は常に一意な一致を要求します。
pub struct SymbolResolver {
    symbols: Vec<Symbol>,
}

impl SymbolResolver {
    /// シンボルの一覧から作成する
    pub fn from_symbols(mut symbols: Vec<Symbol>) -> Self {
        symbols.sort_by_key(|s| s.address);
        Self { symbols }
    }

    /// オブジェクトファイルの関数シンボルから作成する
    pub fn new(loader: &DwarfLoader) -> Result<Self> {
        let object_file = loader.object_file()?;
        let symbols = object_file
            .symbols()
            .filter(|symbol| symbol.kind() == SymbolKind::Text)
            .filter_map(|symbol| {
                let name = symbol.name().ok()?;
                if name.is_empty() {
                    return None;
                }
                Some(Symbol::new(name.to_string(), symbol.address(), symbol.size()))
            })
            .collect();

        Ok(Self::from_symbols(symbols))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// パターンにマッチするシンボルを検索する
    /// マングル名とデマングル名の両方で検索する
    pub fn find_symbols(&self, pattern: &SymbolPattern) -> Vec<&Symbol> {
        self.symbols
            .iter()
            .filter(|s| pattern.matches(&s.name) || pattern.matches(&s.demangled_name))
            .collect()
    }

    /// パターンに一意にマッチするシンボルのアドレスを返す
    pub fn resolve(&self, pattern: &str) -> Result<u64> {
        let compiled = SymbolPattern::new(pattern)?;
        match self.find_symbols(&compiled).as_slice() {
            [] => Err(DebugInfoError::SymbolNotFound(pattern.to_string())),
            [symbol] => Ok(symbol.address),
            found => Err(DebugInfoError::AmbiguousSymbol {
                pattern: pattern.to_string(),
                count: found.len(),
            }),
        }
    }
}
