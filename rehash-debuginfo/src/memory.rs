//! メモリ上に構築するデバッグ情報

use crate::{
    AddressWidth, DebugInfo, LineRecord, LineTable, Result, SourceLocation, Symbol,
    SymbolResolver,
};

/// シンボルと行番号レコードを直接与えるプロバイダ
///
/// # Examples
/// ```
/// use rehash_debuginfo::{AddressWidth, DebugInfo, MemoryDebugInfo, SourceLocation};
///
/// let info = MemoryDebugInfo::builder(AddressWidth::Bits32)
///     .symbol("Main", 0x10)
///     .line(0x20, 4, "foo.c", 42)
///     .build();
///
/// assert_eq!(info.find_symbol_address("Main").unwrap(), 0x10);
/// assert_eq!(info.find_source_location(0x20).unwrap(), SourceLocation::new("foo.c", 42));
/// ```
pub struct MemoryDebugInfo {
    width: AddressWidth,
    symbols: SymbolResolver,
    lines: LineTable,
}

impl MemoryDebugInfo {
    pub fn builder(width: AddressWidth) -> MemoryDebugInfoBuilder {
        MemoryDebugInfoBuilder {
            width,
            symbols: Vec::new(),
            lines: Vec::new(),
        }
    }
}

pub struct MemoryDebugInfoBuilder {
    width: AddressWidth,
    symbols: Vec<Symbol>,
    lines: Vec<LineRecord>,
}

impl MemoryDebugInfoBuilder {
    pub fn symbol(mut self, name: &str, address: u64) -> Self {
        self.symbols.push(Symbol::new(name.to_string(), address, 0));
        self
    }

    pub fn line(mut self, address: u64, length: u64, file: &str, line: u32) -> Self {
        self.lines.push(LineRecord::new(address, length, file, line));
        self
    }

    pub fn build(self) -> MemoryDebugInfo {
        MemoryDebugInfo {
            width: self.width,
            symbols: SymbolResolver::from_symbols(self.symbols),
            lines: LineTable::new(self.lines),
        }
    }
}

impl DebugInfo for MemoryDebugInfo {
    fn address_width(&self) -> AddressWidth {
        self.width
    }

    fn find_symbol_address(&self, pattern: &str) -> Result<u64> {
        self.symbols.resolve(pattern)
    }

    fn find_source_location(&self, relative: u64) -> Result<SourceLocation> {
        self.lines.lookup(self.width.truncate(relative))
    }
}
