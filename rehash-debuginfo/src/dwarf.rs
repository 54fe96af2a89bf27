//! DWARFを持つオブジェクトファイル（ELF、Mach-O、PE）のプロバイダ

use crate::{
    AddressWidth, DebugInfo, DwarfLoader, LineInfoProvider, Result, SourceLocation,
    SymbolResolver,
};
use std::path::Path;
use tracing::{debug, warn};

/// DWARFデバッグ情報
///
/// 相対アドレスはオブジェクトファイル上のアドレスそのもの。
pub struct DwarfDebugInfo {
    symbols: SymbolResolver,
    lines: LineInfoProvider,
}

impl DwarfDebugInfo {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_loader(&DwarfLoader::load(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_loader(&DwarfLoader::from_bytes(data)?)
    }

    pub fn from_loader(loader: &DwarfLoader) -> Result<Self> {
        let symbols = SymbolResolver::new(loader)?;
        let lines = LineInfoProvider::new(loader)?;
        if symbols.is_empty() {
            warn!("No function symbols found, symbol lookups will fail");
        }
        debug!("Loaded DWARF debug information: {} function symbols", symbols.len());
        Ok(Self { symbols, lines })
    }
}

impl DebugInfo for DwarfDebugInfo {
    fn address_width(&self) -> AddressWidth {
        AddressWidth::Bits64
    }

    fn find_symbol_address(&self, pattern: &str) -> Result<u64> {
        self.symbols.resolve(pattern)
    }

    fn find_source_location(&self, relative: u64) -> Result<SourceLocation> {
        self.lines.lookup(relative)
    }
}
