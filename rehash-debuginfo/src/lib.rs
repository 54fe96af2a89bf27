//! rehash デバッグ情報プロバイダ
//!
//! このクレートは、PDBとDWARFのデバッグ情報から関数シンボルの相対アドレスと
//! 相対アドレスのソース行を引くための機能を提供します。
//! どの形式も `DebugInfo` トレイトの背後に隠れます。

pub mod error;
pub mod pattern;
pub mod loader;
pub mod symbols;
pub mod lines;
pub mod provider;
pub mod dwarf;
pub mod pdb_info;
pub mod memory;

pub use error::DebugInfoError;
pub use pattern::SymbolPattern;
pub use loader::DwarfLoader;
pub use symbols::{Symbol, SymbolResolver};
pub use lines::{LineInfoProvider, LineRecord, LineTable, SourceLocation, UNRESOLVED};
pub use provider::{open, AddressWidth, DebugInfo, PDB_MAGIC};
pub use dwarf::DwarfDebugInfo;
pub use pdb_info::PdbDebugInfo;
pub use memory::{MemoryDebugInfo, MemoryDebugInfoBuilder};

/// デバッグ情報の結果型
pub type Result<T> = std::result::Result<T, DebugInfoError>;
