//! ログの注釈付け
//!
//! 入力を1行ずつ読み、メタデータを拾いながら `[address]` で終わる行に
//! ソース位置を書き足す。

use crate::classify::{tokenize, LineToken, MetadataFields};
use crate::parse::parse_address_prefix;
use crate::{AnchorPair, AnchorResolver, AnnotateError, AnnotatorConfig, OverrideTable, Result};
use rehash_debuginfo::{DebugInfo, SourceLocation};
use std::borrow::Cow;
use std::io::{BufRead, Write};
use tracing::{debug, trace, warn};

/// 処理した行の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateStats {
    pub lines: u64,
    /// ソース位置を解決できたアドレス行
    pub annotated: u64,
    /// `???` になったアドレス行
    pub unresolved: u64,
}

/// ストリーミング注釈器
pub struct LineAnnotator<'d> {
    debug_info: &'d dyn DebugInfo,
    config: AnnotatorConfig,
    resolver: AnchorResolver<'d>,
    version: Option<String>,
    build_tag: Option<String>,
    /// 補正テーブルは最初のアドレス行でだけ試す
    bootstrap_attempted: bool,
    stats: AnnotateStats,
}

impl<'d> LineAnnotator<'d> {
    /// 注釈器を作成する
    ///
    /// 既定のアンカーシンボルはここで解決される。
    pub fn new(
        debug_info: &'d dyn DebugInfo,
        config: AnnotatorConfig,
        overrides: OverrideTable,
    ) -> Result<Self> {
        let resolver = AnchorResolver::new(debug_info, &config.anchor_symbol, overrides)?;
        Ok(Self {
            debug_info,
            config,
            resolver,
            version: None,
            build_tag: None,
            bootstrap_attempted: false,
            stats: AnnotateStats::default(),
        })
    }

    /// 起動時に与えられたアンカーの実行時アドレスを設定する
    pub fn with_explicit_anchor(mut self, runtime: u64) -> Self {
        self.resolver.establish_explicit(runtime);
        self
    }

    pub fn anchor(&self) -> Option<AnchorPair> {
        self.resolver.anchor()
    }

    pub fn resolver(&self) -> &AnchorResolver<'d> {
        &self.resolver
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn build_tag(&self) -> Option<&str> {
        self.build_tag.as_deref()
    }

    pub fn stats(&self) -> AnnotateStats {
        self.stats
    }

    /// 1行を処理し、出力する行を返す
    pub fn process_line<'l>(&mut self, line: &'l str) -> Result<Cow<'l, str>> {
        self.stats.lines += 1;

        match tokenize(line, &self.config) {
            LineToken::Plain => Ok(Cow::Borrowed(line)),
            LineToken::Metadata(metadata) => {
                self.absorb(&metadata)?;
                Ok(Cow::Borrowed(line))
            }
            LineToken::AddressBearing {
                metadata,
                prefix,
                literal,
            } => {
                self.absorb(&metadata)?;
                // `[12:34:56]` のように後ろに続く文字列は無視する
                let (runtime, _) = parse_address_prefix(literal, "mid-trace address")?;
                let location = self.resolve(runtime)?;
                Ok(Cow::Owned(format!("{} @ {}]", prefix, location)))
            }
        }
    }

    /// 入力の終わりまで注釈付けを行う
    ///
    /// 各行は処理し終えた時点で書き出してフラッシュする。
    pub fn annotate<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        mut writer: W,
    ) -> Result<AnnotateStats> {
        for line in reader.lines() {
            let line = line?;
            let output = self.process_line(&line)?;
            writeln!(writer, "{}", output)?;
            writer.flush()?;
        }
        Ok(self.stats)
    }

    /// メタデータを取り込む。どの値も最初に見つかったものが有効
    fn absorb(&mut self, metadata: &MetadataFields<'_>) -> Result<()> {
        if self.build_tag.is_none() {
            if let Some(tag) = metadata.build_tag {
                debug!("Tag: {}", tag);
                self.build_tag = Some(tag.to_string());
            }
        }
        if self.version.is_none() {
            if let Some(version) = metadata.version {
                debug!("Version: {}", version);
                self.version = Some(version.to_string());
            }
        }
        if !self.resolver.is_established() {
            if let Some(text) = metadata.anchor {
                let (runtime, _) = parse_address_prefix(text, "anchor address")?;
                self.resolver.establish_from_marker(runtime);
            }
        }
        Ok(())
    }

    /// 実行時アドレスのソース位置を求める
    fn resolve(&mut self, runtime: u64) -> Result<SourceLocation> {
        if !self.resolver.is_established() && !self.bootstrap_attempted {
            self.bootstrap_attempted = true;
            self.resolver.bootstrap(
                self.version.as_deref(),
                self.build_tag.as_deref(),
                runtime,
            )?;
        }

        let location = match self.resolver.translator().to_relative(runtime) {
            Ok(relative) => {
                let location = self.debug_info.find_source_location(relative)?;
                trace!("0x{:x} -> 0x{:x} -> {}", runtime, relative, location);
                location
            }
            Err(AnnotateError::AnchorUnavailable) => {
                warn!("Anchor address not yet available, cannot resolve 0x{:x}", runtime);
                SourceLocation::Unresolved
            }
            Err(e) => return Err(e),
        };

        if location.is_resolved() {
            self.stats.annotated += 1;
        } else {
            self.stats.unresolved += 1;
        }
        Ok(location)
    }
}
