//! アドレスリテラルのパース

use crate::{AnnotateError, Result};

/// アドレス文字列全体をu64にパース
///
/// 16進数（0x/0Xプレフィックス付き）または10進数をサポート
///
/// # Examples
/// ```
/// use rehash_core::parse::parse_address;
///
/// assert_eq!(parse_address("0x1234").unwrap(), 0x1234);
/// assert_eq!(parse_address("1234").unwrap(), 1234);
/// ```
pub fn parse_address(s: &str) -> Result<u64> {
    parse_address_exact(s, "address")
}

/// 前後の空白を除いた文字列全体がアドレスリテラルであることを要求する
///
/// `what` はエラーメッセージに使う。
pub fn parse_address_exact(s: &str, what: &'static str) -> Result<u64> {
    let (value, rest) = parse_address_prefix(s, what)?;
    if !rest.trim().is_empty() {
        return Err(invalid(what, s, "trailing characters"));
    }
    Ok(value)
}

/// 先頭のアドレスリテラルをパースし、残りの文字列と一緒に返す
///
/// 先頭の空白は読み飛ばす。リテラルの後ろの文字列（例: `0x1000: ...` の `: ...`）は
/// 無視してよい。数字が1つもなければエラー。
///
/// `what` はエラーメッセージに使う。
pub fn parse_address_prefix<'a>(s: &'a str, what: &'static str) -> Result<(u64, &'a str)> {
    let body = s.trim_start();

    let (digits_start, radix) = if body.starts_with("0x") || body.starts_with("0X") {
        (2, 16)
    } else {
        (0, 10)
    };
    let digits = &body[digits_start..];
    let len = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());

    if len == 0 {
        return Err(invalid(what, s, "no address literal"));
    }

    let value = u64::from_str_radix(&digits[..len], radix)
        .map_err(|e| invalid(what, s, &e.to_string()))?;
    Ok((value, &digits[len..]))
}

fn invalid(what: &'static str, text: &str, reason: &str) -> AnnotateError {
    AnnotateError::InvalidAddress {
        what,
        text: text.to_string(),
        reason: reason.to_string(),
    }
}
