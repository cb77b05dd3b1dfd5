//! Token types for the dotprompt lexer.

use crate::{LexMode, Span};

/// The kind of a token.
///
/// The discriminants are the terminal symbol ids used by the parse tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TokenKind {
    /// End of input
    End = 0,

    // Document start
    /// `# ...` up to and including the line break
    HeaderComment,
    /// `---` alone on a line, including its line break
    FrontmatterDelimiter,

    // Frontmatter
    /// Blank or indentation run between YAML lines
    YamlBlank,
    /// Left-hand identifier of a YAML line
    YamlKey,
    /// `:`
    Colon,
    /// Everything after the `:` up to the end of the line
    YamlValue,
    /// `\n` or `\r\n` ending a YAML line
    Newline,

    // Template delimiters
    /// `{{#`
    OpenBlock,
    /// `}}`
    Close,
    /// `{{/`
    OpenEndBlock,
    /// `{{`
    Open,
    /// `>`
    Gt,
    /// `else`
    Else,
    /// `{{!`
    OpenComment,
    /// Body of a `{{! ... }}` comment
    ShortCommentBody,
    /// `{{!--`
    OpenLongComment,
    /// Body of a `{{!-- ... --}}` comment
    LongCommentBody,
    /// `--}}`
    CloseLongComment,

    // Expressions
    /// `=`
    Eq,
    /// `@name`
    AtIdentifier,
    /// `name`, `a.b`, `../x`, `./x`, `partials/header`
    Path,
    /// `"`
    DoubleQuote,
    /// Body of a `"..."` string
    DoubleQuotedBody,
    /// `'`
    SingleQuote,
    /// Body of a `'...'` string
    SingleQuotedBody,
    /// `42`, `-1.5`
    Number,
    /// `true`
    True,
    /// `false`
    False,

    /// Literal template text
    Text,
}

impl TokenKind {
    /// Number of token kinds.
    pub const COUNT: usize = 30;

    /// All token kinds, in terminal id order.
    pub const ALL: [TokenKind; Self::COUNT] = [
        TokenKind::End,
        TokenKind::HeaderComment,
        TokenKind::FrontmatterDelimiter,
        TokenKind::YamlBlank,
        TokenKind::YamlKey,
        TokenKind::Colon,
        TokenKind::YamlValue,
        TokenKind::Newline,
        TokenKind::OpenBlock,
        TokenKind::Close,
        TokenKind::OpenEndBlock,
        TokenKind::Open,
        TokenKind::Gt,
        TokenKind::Else,
        TokenKind::OpenComment,
        TokenKind::ShortCommentBody,
        TokenKind::OpenLongComment,
        TokenKind::LongCommentBody,
        TokenKind::CloseLongComment,
        TokenKind::Eq,
        TokenKind::AtIdentifier,
        TokenKind::Path,
        TokenKind::DoubleQuote,
        TokenKind::DoubleQuotedBody,
        TokenKind::SingleQuote,
        TokenKind::SingleQuotedBody,
        TokenKind::Number,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Text,
    ];

    /// Terminal id of this kind.
    #[inline]
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Look up a kind by terminal id.
    #[inline]
    pub fn from_id(id: u16) -> Option<TokenKind> {
        Self::ALL.get(id as usize).copied()
    }

    /// Grammar name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::End => "end",
            TokenKind::HeaderComment => "header_comment",
            TokenKind::FrontmatterDelimiter => "frontmatter_delimiter",
            TokenKind::YamlBlank => "yaml_blank",
            TokenKind::YamlKey => "yaml_key",
            TokenKind::Colon => ":",
            TokenKind::YamlValue => "yaml_value",
            TokenKind::Newline => "newline",
            TokenKind::OpenBlock => "{{#",
            TokenKind::Close => "}}",
            TokenKind::OpenEndBlock => "{{/",
            TokenKind::Open => "{{",
            TokenKind::Gt => ">",
            TokenKind::Else => "else",
            TokenKind::OpenComment => "{{!",
            TokenKind::ShortCommentBody => "handlebars_comment_short_body",
            TokenKind::OpenLongComment => "{{!--",
            TokenKind::LongCommentBody => "handlebars_comment_long_body",
            TokenKind::CloseLongComment => "--}}",
            TokenKind::Eq => "=",
            TokenKind::AtIdentifier => "@identifier",
            TokenKind::Path => "path",
            TokenKind::DoubleQuote => "\"",
            TokenKind::DoubleQuotedBody => "double_quoted_body",
            TokenKind::SingleQuote => "'",
            TokenKind::SingleQuotedBody => "single_quoted_body",
            TokenKind::Number => "number",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Text => "text",
        }
    }

    /// Whether error recovery stops skipping after this token.
    pub fn is_synchronizing(self) -> bool {
        matches!(
            self,
            TokenKind::Close
                | TokenKind::CloseLongComment
                | TokenKind::Newline
                | TokenKind::FrontmatterDelimiter
        )
    }

    /// Mode of the construct this token opens, for the openers of `{{ ... }}`
    /// forms.
    pub fn opens(self) -> Option<LexMode> {
        match self {
            TokenKind::Open | TokenKind::OpenBlock => Some(LexMode::Expr),
            TokenKind::OpenEndBlock => Some(LexMode::CloseExpr),
            TokenKind::OpenComment => Some(LexMode::CommentShort),
            TokenKind::OpenLongComment => Some(LexMode::CommentLong),
            _ => None,
        }
    }

    /// Lex modes in which parsing resumes after this synchronizing token.
    pub fn resume_modes(self) -> &'static [LexMode] {
        match self {
            TokenKind::Close | TokenKind::CloseLongComment | TokenKind::FrontmatterDelimiter => {
                &[LexMode::Body, LexMode::DocStart]
            }
            TokenKind::Newline => &[LexMode::YamlLines],
            _ => &[],
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Source location of the token content, excluding padding.
    pub span: Span,
    /// Skipped whitespace bytes immediately before `span`.
    pub padding: u32,
    /// Bytes past `span.end` the lexer had to examine.
    pub lookahead: u32,
    /// Mode the token was recognized in.
    pub mode: LexMode,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, padding: u32, lookahead: u32, mode: LexMode) -> Self {
        Self {
            kind,
            span,
            padding,
            lookahead,
            mode,
        }
    }

    /// Start of the token including its padding.
    #[inline]
    pub fn padded_start(&self) -> u32 {
        self.span.start - self.padding
    }

    /// Total bytes covered, padding included.
    #[inline]
    pub fn total_len(&self) -> u32 {
        self.padding + self.span.len()
    }

    /// Furthest byte the lexer examined to produce this token.
    #[inline]
    pub fn scan_end(&self) -> u32 {
        self.span.end + self.lookahead
    }

    /// Get the source text of the token content.
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}
