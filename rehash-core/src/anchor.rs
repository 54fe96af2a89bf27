//! アンカーの決定
//!
//! アンカーは次のいずれかで一度だけ確定し、以後変わらない。
//! 1. 起動時に与えられた実行時アドレス
//! 2. ログ中のアンカー行（`Main is at <address>`）
//! 3. 最初のアドレス行での補正テーブルからの復元

use crate::{AddressTranslator, AnchorPair, OverrideTable, Result};
use rehash_debuginfo::DebugInfo;
use tracing::debug;

/// アンカーの出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    Explicit,
    Marker,
    Override,
}

/// アンカーの状態機械
pub struct AnchorResolver<'d> {
    debug_info: &'d dyn DebugInfo,
    default_symbol: String,
    /// 既定のアンカーシンボルの相対アドレス（起動時に解決）
    default_relative: u64,
    overrides: OverrideTable,
    anchor: Option<(AnchorPair, AnchorSource)>,
}

impl<'d> AnchorResolver<'d> {
    /// 既定のアンカーシンボルを解決して作成する
    ///
    /// シンボルが見つからない、または複数ある場合はエラー。
    pub fn new(
        debug_info: &'d dyn DebugInfo,
        default_symbol: &str,
        overrides: OverrideTable,
    ) -> Result<Self> {
        let default_relative = debug_info.find_symbol_address(default_symbol)?;
        debug!("{} is at relative 0x{:x}", default_symbol, default_relative);

        Ok(Self {
            debug_info,
            default_symbol: default_symbol.to_string(),
            default_relative,
            overrides,
            anchor: None,
        })
    }

    pub fn default_relative(&self) -> u64 {
        self.default_relative
    }

    pub fn anchor(&self) -> Option<AnchorPair> {
        self.anchor.map(|(pair, _)| pair)
    }

    pub fn source(&self) -> Option<AnchorSource> {
        self.anchor.map(|(_, source)| source)
    }

    pub fn is_established(&self) -> bool {
        self.anchor.is_some()
    }

    /// 現在のアンカーでの変換器
    pub fn translator(&self) -> AddressTranslator {
        AddressTranslator::new(self.anchor(), self.debug_info.address_width())
    }

    /// 起動時に与えられた実行時アドレスでアンカーを確定する
    pub fn establish_explicit(&mut self, runtime: u64) -> bool {
        self.establish(runtime, AnchorSource::Explicit)
    }

    /// アンカー行の実行時アドレスでアンカーを確定する
    ///
    /// 既に確定していれば何もせず `false` を返す。
    pub fn establish_from_marker(&mut self, runtime: u64) -> bool {
        self.establish(runtime, AnchorSource::Marker)
    }

    fn establish(&mut self, runtime: u64, source: AnchorSource) -> bool {
        if self.anchor.is_some() {
            return false;
        }
        debug!(
            "{} is at 0x{:x} ({:?})",
            self.default_symbol, runtime, source
        );
        self.anchor = Some((AnchorPair::new(self.default_relative, runtime), source));
        true
    }

    /// 補正テーブルからアンカーを復元する
    ///
    /// `(version, build_tag)` に一致するエントリがあれば、その `anchor_symbol` を
    /// デバッグ情報で確認し、実行時アドレスを `embedded - known_offset` とする。
    /// 基準となる相対アドレスは既定のアンカーシンボルのもの。
    ///
    /// 一致しなければ `Ok(None)`。補正シンボルが解決できなければエラー。
    pub fn bootstrap(
        &mut self,
        version: Option<&str>,
        build_tag: Option<&str>,
        embedded: u64,
    ) -> Result<Option<AnchorPair>> {
        if self.anchor.is_some() {
            return Ok(self.anchor());
        }
        let (version, build_tag) = match (version, build_tag) {
            (Some(version), Some(build_tag)) => (version, build_tag),
            _ => {
                debug!("Version or tag unknown, no anchor override applies");
                return Ok(None);
            }
        };
        let entry = match self.overrides.lookup(version, build_tag) {
            Some(entry) => entry,
            None => {
                debug!("No anchor override for {:?}@{:?}", version, build_tag);
                return Ok(None);
            }
        };

        let override_relative = self.debug_info.find_symbol_address(&entry.anchor_symbol)?;
        let runtime = embedded.wrapping_sub(entry.known_offset);
        debug!(
            "Anchor override {:?}@{:?}: {} (relative 0x{:x}) is at 0x{:x} - 0x{:x}",
            version, build_tag, entry.anchor_symbol, override_relative, embedded, entry.known_offset
        );

        self.establish(runtime, AnchorSource::Override);
        Ok(self.anchor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnnotateError, OverrideEntry};
    use rehash_debuginfo::{AddressWidth, DebugInfoError, MemoryDebugInfo};

    fn debug_info() -> MemoryDebugInfo {
        MemoryDebugInfo::builder(AddressWidth::Bits32)
            .symbol("Main", 0x1_0000)
            .symbol("Platform::StackTrace", 0x2_0000)
            .build()
    }

    #[test]
    fn test_default_symbol_must_exist() {
        let info = MemoryDebugInfo::builder(AddressWidth::Bits32).build();
        let result = AnchorResolver::new(&info, "Main", OverrideTable::builtin().unwrap());
        assert!(matches!(
            result,
            Err(AnnotateError::DebugInfo(DebugInfoError::SymbolNotFound(_)))
        ));
    }

    #[test]
    fn test_first_anchor_wins() {
        let info = debug_info();
        let mut resolver = AnchorResolver::new(&info, "Main", OverrideTable::builtin().unwrap()).unwrap();
        assert_eq!(resolver.default_relative(), 0x1_0000);

        assert!(resolver.establish_explicit(0x7000));
        assert!(!resolver.establish_from_marker(0x9000));
        assert_eq!(resolver.anchor(), Some(AnchorPair::new(0x1_0000, 0x7000)));
        assert_eq!(resolver.source(), Some(AnchorSource::Explicit));

        // 確定後は補正テーブルも見ない
        let pair = resolver
            .bootstrap(
                Some("98.2.365 X86_64-WINDOWS-MSVC LUACONSOLE HTTPS"),
                Some("e371d63"),
                0x5_0000,
            )
            .unwrap();
        assert_eq!(pair, Some(AnchorPair::new(0x1_0000, 0x7000)));
    }

    #[test]
    fn test_bootstrap_uses_default_base() {
        let info = debug_info();
        let mut resolver = AnchorResolver::new(&info, "Main", OverrideTable::builtin().unwrap()).unwrap();

        let pair = resolver
            .bootstrap(
                Some("98.2.365 X86_64-WINDOWS-MSVC LUACONSOLE HTTPS"),
                Some("e371d63"),
                0x7ff6_0001_2346,
            )
            .unwrap();

        assert_eq!(pair, Some(AnchorPair::new(0x1_0000, 0x7ff6_0001_2200)));
        assert_eq!(resolver.source(), Some(AnchorSource::Override));
    }

    #[test]
    fn test_bootstrap_requires_metadata() {
        let info = debug_info();
        let mut resolver = AnchorResolver::new(&info, "Main", OverrideTable::builtin().unwrap()).unwrap();

        assert_eq!(resolver.bootstrap(None, Some("e371d63"), 0x1000).unwrap(), None);
        assert_eq!(
            resolver
                .bootstrap(Some("98.2.365 X86_64-WINDOWS-MSVC LUACONSOLE HTTPS"), None, 0x1000)
                .unwrap(),
            None
        );
        assert_eq!(resolver.bootstrap(Some("1.0"), Some("abc"), 0x1000).unwrap(), None);
        assert!(!resolver.is_established());
    }

    #[test]
    fn test_bootstrap_missing_override_symbol_is_fatal() {
        let info = MemoryDebugInfo::builder(AddressWidth::Bits32)
            .symbol("Main", 0x10)
            .build();
        let table = OverrideTable::new([OverrideEntry::new("1.0", "abc", "Gone", 0x8)]).unwrap();
        let mut resolver = AnchorResolver::new(&info, "Main", table).unwrap();

        let result = resolver.bootstrap(Some("1.0"), Some("abc"), 0x1000);
        assert!(matches!(
            result,
            Err(AnnotateError::DebugInfo(DebugInfoError::SymbolNotFound(name))) if name == "Gone"
        ));
        assert!(!resolver.is_established());
    }

    #[test]
    fn test_translator_follows_anchor() {
        let info = debug_info();
        let mut resolver = AnchorResolver::new(&info, "Main", OverrideTable::builtin().unwrap()).unwrap();
        assert!(matches!(
            resolver.translator().to_relative(0x1000),
            Err(AnnotateError::AnchorUnavailable)
        ));

        resolver.establish_from_marker(0x40_0000);
        assert_eq!(resolver.translator().to_relative(0x40_0010).unwrap(), 0x1_0010);
    }
}
