//! ソース行情報

use crate::loader::GimliReader;
use crate::{DebugInfoError, DwarfLoader, Result};
use std::fmt;

/// 解決できなかったアドレスの表示
pub const UNRESOLVED: &str = "???";

/// アドレスに対応するソース位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Resolved { file: String, line: u32 },
    Unresolved,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        SourceLocation::Resolved {
            file: file.into(),
            line,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SourceLocation::Resolved { .. })
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Resolved { file, line } => write!(f, "{}:{}", file, line),
            SourceLocation::Unresolved => f.write_str(UNRESOLVED),
        }
    }
}

/// 行番号レコード
///
/// `[address, address + length)` の範囲が `file:line` に対応する。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineRecord {
    pub address: u64,
    pub length: u64,
    pub file: String,
    pub line: u32,
}

impl LineRecord {
    pub fn new(address: u64, length: u64, file: impl Into<String>, line: u32) -> Self {
        Self {
            address,
            // 長さ不明のレコードは先頭アドレスのみを覆う
            length: length.max(1),
            file: file.into(),
            line,
        }
    }

    fn contains(&self, address: u64) -> bool {
        address >= self.address && address - self.address < self.length
    }
}

/// アドレス順に整列した行番号テーブル
#[derive(Debug, Default)]
pub struct LineTable {
    records: Vec<LineRecord>,
    max_length: u64,
}

impl LineTable {
    pub fn new(mut records: Vec<LineRecord>) -> Self {
        records.sort();
        records.dedup();
        let max_length = records.iter().map(|r| r.length).max().unwrap_or(0);
        Self {
            records,
            max_length,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// アドレスを覆うレコードを検索する
    ///
    /// 0件なら `Unresolved`、2件以上は `AmbiguousLineInfo` エラー。
    pub fn lookup(&self, address: u64) -> Result<SourceLocation> {
        let end = self.records.partition_point(|r| r.address <= address);
        let found: Vec<&LineRecord> = self.records[..end]
            .iter()
            .rev()
            .take_while(|r| address - r.address < self.max_length)
            .filter(|r| r.contains(address))
            .collect();

        match found.as_slice() {
            [] => Ok(SourceLocation::Unresolved),
            [record] => Ok(SourceLocation::new(record.file.clone(), record.line)),
            _ => Err(DebugInfoError::AmbiguousLineInfo {
                address,
                count: found.len(),
            }),
        }
    }
}

/// DWARFの行番号プログラムを使ったソース行情報の取得
pub struct LineInfoProvider {
    context: addr2line::Context<GimliReader>,
}

impl LineInfoProvider {
    /// ソース行情報プロバイダを作成する
    pub fn new(loader: &DwarfLoader) -> Result<Self> {
        let context = addr2line::Context::from_dwarf(loader.load_dwarf()?)?;
        Ok(Self { context })
    }

    /// アドレスからソース行情報を取得する
    ///
    /// addr2lineは1アドレスにつき高々1つの位置しか返さない。
    pub fn lookup(&self, addr: u64) -> Result<SourceLocation> {
        let location = self.context.find_location(addr)?;
        Ok(match location {
            Some(addr2line::Location {
                file: Some(file),
                line: Some(line),
                ..
            }) => SourceLocation::new(file, line),
            _ => SourceLocation::Unresolved,
        })
    }
}
