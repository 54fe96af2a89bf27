//! 実行時アドレスから相対アドレスへの変換

use crate::{AnnotateError, Result};
use rehash_debuginfo::AddressWidth;

/// アンカーの組
///
/// 同じシンボルについて、デバッグ情報上の相対アドレスとログ出力時の実行時アドレス。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPair {
    pub relative: u64,
    pub runtime: u64,
}

impl AnchorPair {
    pub fn new(relative: u64, runtime: u64) -> Self {
        Self { relative, runtime }
    }

    /// `relative + (runtime_address - runtime)` を符号付き64ビットで計算し、
    /// 相対アドレスの幅に切り詰める
    ///
    /// 範囲チェックはしない。範囲外のアドレスは行番号の検索で見つからないだけ。
    pub fn to_relative(&self, runtime_address: u64, width: AddressWidth) -> u64 {
        let delta = (runtime_address as i64).wrapping_sub(self.runtime as i64);
        let relative = (self.relative as i64).wrapping_add(delta);
        width.truncate(relative as u64)
    }
}

/// アンカーが確定してからのアドレス変換器
#[derive(Debug, Clone, Copy)]
pub struct AddressTranslator {
    anchor: Option<AnchorPair>,
    width: AddressWidth,
}

impl AddressTranslator {
    pub fn new(anchor: Option<AnchorPair>, width: AddressWidth) -> Self {
        Self { anchor, width }
    }

    pub fn to_relative(&self, runtime_address: u64) -> Result<u64> {
        let anchor = self.anchor.ok_or(AnnotateError::AnchorUnavailable)?;
        Ok(anchor.to_relative(runtime_address, self.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_relative() {
        let anchor = AnchorPair::new(0x10, 0x1000);
        assert_eq!(anchor.to_relative(0x1010, AddressWidth::Bits32), 0x20);
        assert_eq!(anchor.to_relative(0x1000, AddressWidth::Bits32), 0x10);
    }

    #[test]
    fn test_to_relative_below_anchor() {
        let anchor = AnchorPair::new(0x2000, 0x7ff6_0000_3000);
        assert_eq!(anchor.to_relative(0x7ff6_0000_1000, AddressWidth::Bits64), 0x0);

        // 負になった結果は幅に切り詰められるだけでエラーにはならない
        assert_eq!(
            anchor.to_relative(0x7ff6_0000_0000, AddressWidth::Bits64),
            (-0x1000i64) as u64
        );
        assert_eq!(
            anchor.to_relative(0x7ff6_0000_0000, AddressWidth::Bits32),
            0xffff_f000
        );
    }

    #[test]
    fn test_to_relative_is_linear() {
        let anchor = AnchorPair::new(0x1_4000, 0x7ff6_a0b0_1000);
        for width in [AddressWidth::Bits32, AddressWidth::Bits64] {
            for a in [0u64, 0x1000, 0x7ff6_a0b0_0000, u64::MAX - 5] {
                for k in [0u64, 1, 0x146, 0x10_0000] {
                    let lhs = anchor.to_relative(a, width);
                    let rhs = anchor.to_relative(a.wrapping_add(k), width);
                    assert_eq!(
                        width.truncate(lhs.wrapping_sub(rhs)),
                        width.truncate(k.wrapping_neg()),
                        "a=0x{:x} k=0x{:x} width={:?}",
                        a,
                        k,
                        width
                    );
                }
            }
        }
    }

    #[test]
    fn test_translator_requires_anchor() {
        let translator = AddressTranslator::new(None, AddressWidth::Bits32);
        assert!(matches!(
            translator.to_relative(0x1000),
            Err(AnnotateError::AnchorUnavailable)
        ));

        let translator =
            AddressTranslator::new(Some(AnchorPair::new(0x10, 0x1000)), AddressWidth::Bits32);
        assert_eq!(translator.to_relative(0x1010).unwrap(), 0x20);
    }
}
