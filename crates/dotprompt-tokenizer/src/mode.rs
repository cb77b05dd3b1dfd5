//! Lexer recognition regimes.

use crate::TokenKind;

/// The lexer's current recognition regime, selected by the parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LexMode {
    /// Start of the document, before frontmatter or body content.
    #[default]
    DocStart,
    /// Template body text and expression openers.
    Body,
    /// Between YAML lines inside the frontmatter.
    YamlLines,
    /// After a YAML key, before its `:`.
    YamlKeyEnd,
    /// After the `:` of a YAML line.
    YamlValue,
    /// Inside `{{ ... }}` or `{{# ... }}`.
    Expr,
    /// Inside `{{/ ... }}`, or wherever only a path or `}}` can follow.
    CloseExpr,
    /// Inside `{{! ... }}`.
    CommentShort,
    /// Inside `{{!-- ... --}}`.
    CommentLong,
    /// Inside `"..."`.
    DoubleQuoted,
    /// Inside `'...'`.
    SingleQuoted,
}

impl LexMode {
    /// Modes in the order parse states are matched against them.
    pub const PRIORITY: [LexMode; 11] = [
        LexMode::Body,
        LexMode::DocStart,
        LexMode::YamlLines,
        LexMode::YamlValue,
        LexMode::YamlKeyEnd,
        LexMode::CloseExpr,
        LexMode::Expr,
        LexMode::CommentShort,
        LexMode::CommentLong,
        LexMode::DoubleQuoted,
        LexMode::SingleQuoted,
    ];

    /// Token kinds this mode can produce as valid tokens.
    ///
    /// Garbage runs (unrecognized input) are not listed.
    pub fn recognized(self) -> &'static [TokenKind] {
        use TokenKind::*;
        match self {
            LexMode::DocStart => &[
                End,
                HeaderComment,
                FrontmatterDelimiter,
                OpenBlock,
                OpenEndBlock,
                Open,
                OpenComment,
                OpenLongComment,
                Text,
            ],
            LexMode::Body => &[
                End,
                OpenBlock,
                OpenEndBlock,
                Open,
                OpenComment,
                OpenLongComment,
                Text,
            ],
            LexMode::YamlLines => &[End, FrontmatterDelimiter, HeaderComment, YamlBlank, YamlKey],
            LexMode::YamlKeyEnd => &[End, Colon, Newline],
            LexMode::YamlValue => &[End, YamlValue, Newline],
            LexMode::Expr => &[
                End,
                Close,
                Gt,
                Else,
                Eq,
                AtIdentifier,
                Path,
                DoubleQuote,
                SingleQuote,
                Number,
                True,
                False,
            ],
            LexMode::CloseExpr => &[End, Path, Close],
            LexMode::CommentShort => &[End, ShortCommentBody, Close],
            LexMode::CommentLong => &[End, LongCommentBody, CloseLongComment],
            LexMode::DoubleQuoted => &[End, DoubleQuotedBody, DoubleQuote],
            LexMode::SingleQuoted => &[End, SingleQuotedBody, SingleQuote],
        }
    }

    /// Whether this mode produces `kind` as a valid token.
    pub fn recognizes(self, kind: TokenKind) -> bool {
        self.recognized().contains(&kind)
    }
}
