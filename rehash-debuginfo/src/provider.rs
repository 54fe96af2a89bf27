//! デバッグ情報プロバイダの共通インターフェース

use crate::{DebugInfoError, DwarfDebugInfo, PdbDebugInfo, Result, SourceLocation};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// MSF 7.00 (PDB) ファイルの先頭32バイト
pub const PDB_MAGIC: &[u8] = b"Microsoft C/C++ MSF 7.00\r\n\x1a\x44\x53\x00\x00\x00";

/// 相対アドレスのネイティブな幅
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidth {
    /// PDBのRVA
    Bits32,
    Bits64,
}

impl AddressWidth {
    pub fn mask(self) -> u64 {
        match self {
            AddressWidth::Bits32 => u64::from(u32::MAX),
            AddressWidth::Bits64 => u64::MAX,
        }
    }

    /// 幅を超える上位ビットを切り捨てる
    pub fn truncate(self, address: u64) -> u64 {
        address & self.mask()
    }
}

/// 読み取り専用のデバッグ情報
pub trait DebugInfo {
    /// 相対アドレスの幅
    fn address_width(&self) -> AddressWidth;

    /// 関数シンボルの相対アドレスを取得する
    ///
    /// パターンに一致するシンボルがちょうど1つでなければエラー。
    fn find_symbol_address(&self, pattern: &str) -> Result<u64>;

    /// 相対アドレスのソース位置を取得する
    ///
    /// 行番号レコードが見つからない場合は `SourceLocation::Unresolved` を返す。
    fn find_source_location(&self, relative: u64) -> Result<SourceLocation>;
}

/// ファイルの内容から形式を判定してデバッグ情報を開く
pub fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn DebugInfo>> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| DebugInfoError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if data.starts_with(PDB_MAGIC) {
        debug!("{:?} looks like a PDB", path);
        return Ok(Box::new(PdbDebugInfo::parse(Cursor::new(data))?));
    }

    match object::FileKind::parse(&*data) {
        Ok(kind) => {
            debug!("{:?} looks like an object file ({:?})", path, kind);
            Ok(Box::new(DwarfDebugInfo::from_bytes(data)?))
        }
        Err(_) => Err(DebugInfoError::UnknownFormat(path.to_path_buf())),
    }
}
