//! デバッグ情報プロバイダのエラー型

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebugInfoError {
    #[error("Failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDB error in {0}")]
    Pdb(&'static str, #[source] pdb::Error),

    #[error("Failed to parse object file")]
    Object(#[from] object::read::Error),

    #[error("Failed to load DWARF sections")]
    Dwarf(#[from] gimli::Error),

    #[error("{0:?} is neither a PDB nor an object file with debug information")]
    UnknownFormat(PathBuf),

    #[error("Invalid symbol pattern")]
    InvalidPattern(#[from] regex::Error),

    #[error("no symbol named {0} found")]
    SymbolNotFound(String),

    #[error("multiple symbols named {pattern} found ({count} matches)")]
    AmbiguousSymbol { pattern: String, count: usize },

    #[error("multiple line numbers found for relative address 0x{address:x} ({count} records)")]
    AmbiguousLineInfo { address: u64, count: usize },
}
