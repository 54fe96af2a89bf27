//! PDB (MSF 7.00) のプロバイダ
//!
//! 全モジュールの手続きシンボルとC13行番号情報を読み込み時に展開する。
//! 相対アドレスはRVA（32ビット）。

use crate::{
    AddressWidth, DebugInfo, DebugInfoError, LineRecord, LineTable, Result, SourceLocation,
    Symbol, SymbolResolver,
};
use pdb::{AddressMap, FallibleIterator, ModuleInfo, StringTable, SymbolData, PDB};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// pdbクレートのエラーに操作名を付ける
trait PdbContext<T> {
    fn context(self, what: &'static str) -> Result<T>;
}

impl<T> PdbContext<T> for std::result::Result<T, pdb::Error> {
    fn context(self, what: &'static str) -> Result<T> {
        self.map_err(|e| DebugInfoError::Pdb(what, e))
    }
}

/// PDBデバッグ情報
pub struct PdbDebugInfo {
    symbols: SymbolResolver,
    lines: LineTable,
}

impl PdbDebugInfo {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DebugInfoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(file)
    }

    pub fn parse<'s, S: pdb::Source<'s> + 's>(source: S) -> Result<Self> {
        let mut pdb = PDB::open(source).context("PDB::open")?;
        let address_map = pdb.address_map().context("address_map")?;
        let string_table = match pdb.string_table() {
            Ok(table) => Some(table),
            Err(pdb::Error::StreamNameNotFound) => None,
            Err(e) => return Err(DebugInfoError::Pdb("string_table", e)),
        };
        let dbi = pdb.debug_information().context("debug_information")?;

        let mut symbols = Vec::new();
        let mut records = Vec::new();
        let mut modules = dbi.modules().context("modules")?;
        while let Some(module) = modules.next().context("modules")? {
            let info = match pdb.module_info(&module).context("module_info")? {
                Some(info) => info,
                None => continue,
            };
            collect_procedures(&info, &address_map, &mut symbols)?;
            match &string_table {
                Some(string_table) => {
                    collect_lines(&info, &address_map, string_table, &mut records)?
                }
                None => debug!("No /names stream, skipping lines of {}", module.module_name()),
            }
        }

        let symbols = SymbolResolver::from_symbols(symbols);
        let lines = LineTable::new(records);
        debug!(
            "Loaded PDB: {} procedures, {} line records",
            symbols.len(),
            lines.len()
        );
        Ok(Self { symbols, lines })
    }
}

/// モジュールの手続きシンボル（S_GPROC32 / S_LPROC32）を集める
fn collect_procedures(
    info: &ModuleInfo<'_>,
    address_map: &AddressMap<'_>,
    out: &mut Vec<Symbol>,
) -> Result<()> {
    let mut iter = info.symbols().context("module symbols")?;
    while let Some(symbol) = iter.next().context("module symbols")? {
        if let Ok(SymbolData::Procedure(procedure)) = symbol.parse() {
            if let Some(rva) = procedure.offset.to_rva(address_map) {
                out.push(Symbol::new(
                    procedure.name.to_string().into_owned(),
                    u64::from(rva.0),
                    u64::from(procedure.len),
                ));
            }
        }
    }
    Ok(())
}

/// モジュールの行番号プログラムを展開する
fn collect_lines(
    info: &ModuleInfo<'_>,
    address_map: &AddressMap<'_>,
    string_table: &StringTable<'_>,
    out: &mut Vec<LineRecord>,
) -> Result<()> {
    let program = info.line_program().context("line_program")?;
    let mut file_names: HashMap<u32, String> = HashMap::new();
    let mut lines = program.lines();
    while let Some(line) = lines.next().context("lines")? {
        let rva = match line.offset.to_rva(address_map) {
            Some(rva) => rva,
            None => continue,
        };
        let file = match file_names.get(&line.file_index.0) {
            Some(name) => name.clone(),
            None => {
                let file_info = program.get_file_info(line.file_index).context("file_info")?;
                let name = file_info
                    .name
                    .to_string_lossy(string_table)
                    .context("file name")?
                    .into_owned();
                file_names.insert(line.file_index.0, name.clone());
                name
            }
        };
        out.push(LineRecord::new(
            u64::from(rva.0),
            u64::from(line.length.unwrap_or(0)),
            file,
            line.line_start,
        ));
    }
    Ok(())
}

impl DebugInfo for PdbDebugInfo {
    fn address_width(&self) -> AddressWidth {
        AddressWidth::Bits32
    }

    fn find_symbol_address(&self, pattern: &str) -> Result<u64> {
        self.symbols.resolve(pattern)
    }

    fn find_source_location(&self, relative: u64) -> Result<SourceLocation> {
        self.lines.lookup(AddressWidth::Bits32.truncate(relative))
    }
}
