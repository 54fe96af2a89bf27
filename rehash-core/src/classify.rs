//! ログ行の分類

use crate::AnnotatorConfig;

/// 1行から見つかったメタデータ
///
/// 各値はラベルの直後から行末まで。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataFields<'a> {
    pub version: Option<&'a str>,
    pub build_tag: Option<&'a str>,
    /// アンカー行の値（未パース）
    pub anchor: Option<&'a str>,
}

impl MetadataFields<'_> {
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.build_tag.is_none() && self.anchor.is_none()
    }
}

/// ログ行の分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// そのまま出力する行
    Plain,
    Metadata(MetadataFields<'a>),
    /// `]` で終わり、対応する `[` を持つ行
    AddressBearing {
        metadata: MetadataFields<'a>,
        /// 末尾の `]` を除いた行
        prefix: &'a str,
        /// `[` と `]` の間の文字列
        literal: &'a str,
    },
}

/// ラベルの直後から行末までを返す
fn labeled<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if label.is_empty() {
        return None;
    }
    line.find(label).map(|pos| &line[pos + label.len()..])
}

/// 行末の `[...]` を探す
fn trailing_brackets(line: &str) -> Option<(&str, &str)> {
    let prefix = line.strip_suffix(']')?;
    let open = prefix.rfind('[')?;
    Some((prefix, &prefix[open + 1..]))
}

/// ログ行を分類する
pub fn tokenize<'a>(line: &'a str, config: &AnnotatorConfig) -> LineToken<'a> {
    let metadata = MetadataFields {
        version: labeled(line, &config.version_label),
        build_tag: labeled(line, &config.tag_label),
        anchor: labeled(line, &config.anchor_label),
    };

    match trailing_brackets(line) {
        Some((prefix, literal)) => LineToken::AddressBearing {
            metadata,
            prefix,
            literal,
        },
        None if !metadata.is_empty() => LineToken::Metadata(metadata),
        None => LineToken::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> LineToken<'_> {
        tokenize(line, &AnnotatorConfig::default())
    }

    #[test]
    fn test_plain_lines() {
        assert_eq!(classify(""), LineToken::Plain);
        assert_eq!(classify("Unhandled exception"), LineToken::Plain);
        assert_eq!(classify("no opener here]"), LineToken::Plain);
        assert_eq!(classify("[0x1000] not at end"), LineToken::Plain);
        assert_eq!(classify("]"), LineToken::Plain);
    }

    #[test]
    fn test_metadata_lines() {
        assert_eq!(
            classify("Version: 98.2.365 X86_64-WINDOWS-MSVC LUACONSOLE HTTPS"),
            LineToken::Metadata(MetadataFields {
                version: Some("98.2.365 X86_64-WINDOWS-MSVC LUACONSOLE HTTPS"),
                ..Default::default()
            })
        );
        assert_eq!(
            classify("    Tag: e371d63"),
            LineToken::Metadata(MetadataFields {
                build_tag: Some("e371d63"),
                ..Default::default()
            })
        );
        assert_eq!(
            classify("Main is at 0x7ff6a0b01000:"),
            LineToken::Metadata(MetadataFields {
                anchor: Some("0x7ff6a0b01000:"),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_address_bearing_lines() {
        assert_eq!(
            classify("frame0 [0x1010]"),
            LineToken::AddressBearing {
                metadata: MetadataFields::default(),
                prefix: "frame0 [0x1010",
                literal: "0x1010",
            }
        );
        // 最も右の `[` が対応する
        assert_eq!(
            classify("[thread 1] - Foo::bar [0x20]"),
            LineToken::AddressBearing {
                metadata: MetadataFields::default(),
                prefix: "[thread 1] - Foo::bar [0x20",
                literal: "0x20",
            }
        );
        assert_eq!(
            classify("[]"),
            LineToken::AddressBearing {
                metadata: MetadataFields::default(),
                prefix: "[",
                literal: "",
            }
        );
    }

    #[test]
    fn test_address_bearing_keeps_metadata() {
        match classify("Main is at 0x1000 [0x1000]") {
            LineToken::AddressBearing { metadata, literal, .. } => {
                assert_eq!(metadata.anchor, Some("0x1000 [0x1000]"));
                assert_eq!(literal, "0x1000");
            }
            other => panic!("Expected AddressBearing, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_labels() {
        let config = AnnotatorConfig {
            anchor_label: "WinMain @ ".to_string(),
            tag_label: String::new(),
            ..Default::default()
        };
        assert_eq!(
            tokenize("WinMain @ 4096", &config),
            LineToken::Metadata(MetadataFields {
                anchor: Some("4096"),
                ..Default::default()
            })
        );
        // 空のラベルは何にもマッチしない
        assert_eq!(tokenize("anything", &config), LineToken::Plain);
    }
}
