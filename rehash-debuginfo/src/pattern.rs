//! シンボル名パターン
//!
//! `*` は任意の文字列、`?` は任意の1文字にマッチし、それ以外の文字は
//! そのまま比較されます。パターンはシンボル名全体にマッチする必要があります。

use crate::Result;
use regex::Regex;

/// コンパイル済みのシンボル名パターン
#[derive(Debug, Clone)]
pub struct SymbolPattern {
    regex: Regex,
}

impl SymbolPattern {
    /// パターン文字列をコンパイルする
    pub fn new(pattern: &str) -> Result<Self> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut literal = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                _ => expr.push_str(&regex::escape(c.encode_utf8(&mut literal))),
            }
        }
        expr.push('$');

        Ok(Self {
            regex: Regex::new(&expr)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}
