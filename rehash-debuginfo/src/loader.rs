//! オブジェクトファイルとDWARFの読み込み機能

use crate::{DebugInfoError, Result};
use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// セクションデータを所有するgimliリーダー
pub type GimliReader = gimli::EndianRcSlice<gimli::RunTimeEndian>;

/// DWARFローダー
///
/// ファイルの内容を所有し、必要に応じてオブジェクトファイルと
/// DWARFセクションを取り出す。
pub struct DwarfLoader {
    data: Vec<u8>,
}

impl DwarfLoader {
    /// ファイルからDWARF情報を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| DebugInfoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(data)
    }

    /// メモリ上のファイル内容から作成する
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        // 形式が読めることだけ先に確認しておく
        object::File::parse(&*data)?;
        Ok(Self { data })
    }

    /// オブジェクトファイルとしてパースする
    pub fn object_file(&self) -> Result<object::File<'_>> {
        Ok(object::File::parse(&*self.data)?)
    }

    /// DWARFセクションを読み込む
    ///
    /// 各セクションは `Rc` にコピーされるので、返り値はローダーを借用しない。
    pub fn load_dwarf(&self) -> Result<gimli::Dwarf<GimliReader>> {
        let object_file = self.object_file()?;

        // エンディアンを取得
        let endian = if object_file.is_little_endian() {
            gimli::RunTimeEndian::Little
        } else {
            gimli::RunTimeEndian::Big
        };

        let load_section = |id: gimli::SectionId| -> std::result::Result<GimliReader, gimli::Error> {
            let data = object_file
                .section_by_name(id.name())
                .and_then(|section| section.uncompressed_data().ok())
                .unwrap_or(Cow::Borrowed(&[][..]));
            Ok(gimli::EndianRcSlice::new(Rc::from(&*data), endian))
        };

        Ok(gimli::Dwarf::load(load_section)?)
    }
}
