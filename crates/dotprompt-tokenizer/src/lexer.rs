//! Mode-driven lexer for dotprompt sources.

use crate::{LexMode, Span, Token, TokenKind};
use tracing::trace;

/// A lexer that produces one token at a time from a byte position and a mode.
///
/// Lexing is a pure function of `(source, position, mode)`, so the parser can
/// re-lex any position without keeping lexer state around.
#[derive(Clone, Copy)]
pub struct Lexer<'src> {
    /// The source text being tokenized.
    source: &'src str,
}

/// Cursor over the source that remembers how far it has looked.
struct Scan<'src> {
    bytes: &'src [u8],
    pos: usize,
    /// Exclusive end of every byte examined so far. Looking at the end of
    /// input counts as examining one byte past it.
    furthest: usize,
}

impl<'src> Scan<'src> {
    fn new(bytes: &'src [u8], pos: usize) -> Self {
        Self {
            bytes,
            pos,
            furthest: pos,
        }
    }

    /// Peek at the byte `n` positions ahead without consuming it.
    #[inline]
    fn peek_at(&mut self, n: usize) -> Option<u8> {
        let index = self.pos + n;
        self.furthest = self.furthest.max(index + 1);
        self.bytes.get(index).copied()
    }

    #[inline]
    fn peek(&mut self) -> Option<u8> {
        self.peek_at(0)
    }

    #[inline]
    fn at_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Advance by n bytes.
    #[inline]
    fn bump(&mut self, n: usize) {
        self.pos += n;
    }

    /// Check if the remaining text starts with the given prefix.
    fn starts_with(&mut self, prefix: &str) -> bool {
        prefix
            .bytes()
            .enumerate()
            .all(|(i, b)| self.peek_at(i) == Some(b))
    }

    fn skip_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize) -> &'src [u8] {
        &self.bytes[start..self.pos]
    }
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self { source }
    }

    /// The source text being tokenized.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Lex the token starting at `position` under `mode`.
    pub fn lex(&self, position: u32, mode: LexMode) -> Token {
        let origin = position as usize;
        let mut scan = Scan::new(self.source.as_bytes(), origin);
        let (kind, start) = match mode {
            LexMode::DocStart => doc_start(&mut scan),
            LexMode::Body => body(&mut scan),
            LexMode::YamlLines => yaml_lines(&mut scan),
            LexMode::YamlKeyEnd => yaml_key_end(&mut scan),
            LexMode::YamlValue => yaml_value(&mut scan),
            LexMode::Expr => expression(&mut scan, true),
            LexMode::CloseExpr => expression(&mut scan, false),
            LexMode::CommentShort => delimited(&mut scan, "}}", TokenKind::ShortCommentBody, TokenKind::Close),
            LexMode::CommentLong => delimited(
                &mut scan,
                "--}}",
                TokenKind::LongCommentBody,
                TokenKind::CloseLongComment,
            ),
            LexMode::DoubleQuoted => quoted(&mut scan, b'"', TokenKind::DoubleQuotedBody, TokenKind::DoubleQuote),
            LexMode::SingleQuoted => quoted(&mut scan, b'\'', TokenKind::SingleQuotedBody, TokenKind::SingleQuote),
        };
        self.token(&scan, kind, origin, start, mode)
    }

    /// Create a token from the scan state.
    fn token(&self, scan: &Scan<'_>, kind: TokenKind, origin: usize, start: usize, mode: LexMode) -> Token {
        let span = Span::new(start as u32, scan.pos as u32);
        let padding = (start - origin) as u32;
        let lookahead = scan.furthest.saturating_sub(scan.pos) as u32;
        trace!(
            "Token {:?} at {:?} in {:?}: {:?}",
            kind,
            span,
            mode,
            span.slice(self.source)
        );
        Token::new(kind, span, padding, lookahead, mode)
    }
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn is_path_continue(b: u8) -> bool {
    is_ident_continue(b) || matches!(b, b'.' | b'/')
}

/// Header comments and the frontmatter opener may be preceded by blank
/// lines, which become padding. Anything else falls through to body lexing.
fn doc_start(scan: &mut Scan<'_>) -> (TokenKind, usize) {
    let origin = scan.pos;
    if scan.at_eof() {
        return (TokenKind::End, origin);
    }
    scan.skip_while(is_space);
    let start = scan.pos;
    if scan.peek() == Some(b'#') {
        header_comment(scan);
        return (TokenKind::HeaderComment, start);
    }
    if frontmatter_delimiter(scan) {
        return (TokenKind::FrontmatterDelimiter, start);
    }
    scan.pos = origin;
    body(scan)
}

/// `#` up to and including the line break.
fn header_comment(scan: &mut Scan<'_>) {
    scan.bump(1);
    scan.skip_while(|b| b != b'\n');
    if scan.peek() == Some(b'\n') {
        scan.bump(1);
    }
}

/// `---`, trailing blanks, then a line break or end of input.
fn frontmatter_delimiter(scan: &mut Scan<'_>) -> bool {
    if !scan.starts_with("---") {
        return false;
    }
    let save = scan.pos;
    scan.bump(3);
    scan.skip_while(|b| b == b' ' || b == b'\t');
    match scan.peek() {
        None => true,
        Some(b'\n') => {
            scan.bump(1);
            true
        }
        Some(b'\r') if scan.peek_at(1) == Some(b'\n') => {
            scan.bump(2);
            true
        }
        _ => {
            scan.pos = save;
            false
        }
    }
}

fn body(scan: &mut Scan<'_>) -> (TokenKind, usize) {
    let start = scan.pos;
    if scan.at_eof() {
        return (TokenKind::End, start);
    }
    if scan.starts_with("{{") {
        let (kind, len) = if scan.starts_with("{{!--") {
            (TokenKind::OpenLongComment, 5)
        } else if scan.starts_with("{{!") {
            (TokenKind::OpenComment, 3)
        } else if scan.starts_with("{{#") {
            (TokenKind::OpenBlock, 3)
        } else if scan.starts_with("{{/") {
            (TokenKind::OpenEndBlock, 3)
        } else {
            (TokenKind::Open, 2)
        };
        scan.bump(len);
        return (kind, start);
    }

    // The first byte is text whatever it is, including `#` and a lone `{`.
    scan.bump(1);
    loop {
        match scan.peek() {
            None | Some(b'#') => break,
            Some(b'{') if scan.peek_at(1) == Some(b'{') => break,
            Some(_) => scan.bump(1),
        }
    }
    (TokenKind::Text, start)
}

fn expression(scan: &mut Scan<'_>, keywords: bool) -> (TokenKind, usize) {
    let origin = scan.pos;
    scan.skip_while(is_space);
    let start = scan.pos;

    let Some(b) = scan.peek() else {
        // Trailing whitespace is never padding of the end of input.
        return if start > origin {
            (TokenKind::Text, origin)
        } else {
            (TokenKind::End, start)
        };
    };

    let kind = match b {
        b'}' if scan.peek_at(1) == Some(b'}') => {
            scan.bump(2);
            TokenKind::Close
        }
        b'-' if scan.starts_with("--}}") => {
            scan.bump(4);
            TokenKind::CloseLongComment
        }
        b'>' => {
            scan.bump(1);
            TokenKind::Gt
        }
        b'=' => {
            scan.bump(1);
            TokenKind::Eq
        }
        b'"' => {
            scan.bump(1);
            TokenKind::DoubleQuote
        }
        b'\'' => {
            scan.bump(1);
            TokenKind::SingleQuote
        }
        b'@' if scan.peek_at(1).is_some_and(is_ident_start) => {
            scan.bump(2);
            scan.skip_while(is_ident_continue);
            TokenKind::AtIdentifier
        }
        b'-' if scan.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
            scan.bump(1);
            number(scan)
        }
        b if b.is_ascii_digit() => number(scan),
        b'.' if matches!(scan.peek_at(1), Some(b'.' | b'/')) => path(scan, start, keywords),
        b if is_ident_start(b) => path(scan, start, keywords),
        _ => {
            scan.bump(1);
            loop {
                match scan.peek() {
                    None => break,
                    Some(b) if is_space(b) => break,
                    Some(b'}') if scan.peek_at(1) == Some(b'}') => break,
                    Some(_) => scan.bump(1),
                }
            }
            TokenKind::Text
        }
    };
    (kind, start)
}

/// Digits with an optional `.digits` fraction; the sign is already consumed.
fn number(scan: &mut Scan<'_>) -> TokenKind {
    scan.skip_while(|b| b.is_ascii_digit());
    if scan.peek() == Some(b'.') && scan.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
        scan.bump(1);
        scan.skip_while(|b| b.is_ascii_digit());
    }
    TokenKind::Number
}

/// A path run, reclassified as a keyword when it matches one exactly.
fn path(scan: &mut Scan<'_>, start: usize, keywords: bool) -> TokenKind {
    scan.bump(1);
    loop {
        match scan.peek() {
            Some(b) if is_path_continue(b) => scan.bump(1),
            Some(b'-') if scan.peek_at(1).is_some_and(is_ident_continue) => scan.bump(1),
            _ => break,
        }
    }
    if !keywords {
        return TokenKind::Path;
    }
    match scan.slice(start) {
        b"else" => TokenKind::Else,
        b"true" => TokenKind::True,
        b"false" => TokenKind::False,
        _ => TokenKind::Path,
    }
}

/// A body run that ends only at `close`, or the closer itself.
fn delimited(scan: &mut Scan<'_>, close: &str, body: TokenKind, closer: TokenKind) -> (TokenKind, usize) {
    let start = scan.pos;
    if scan.at_eof() {
        return (TokenKind::End, start);
    }
    if scan.starts_with(close) {
        scan.bump(close.len());
        return (closer, start);
    }
    scan.bump(1);
    while !scan.at_eof() && !scan.starts_with(close) {
        scan.bump(1);
    }
    (body, start)
}

/// A string body with opaque `\` escapes, or the closing quote.
fn quoted(scan: &mut Scan<'_>, quote: u8, body: TokenKind, closer: TokenKind) -> (TokenKind, usize) {
    let start = scan.pos;
    match scan.peek() {
        None => return (TokenKind::End, start),
        Some(b) if b == quote => {
            scan.bump(1);
            return (closer, start);
        }
        Some(_) => {}
    }
    loop {
        match scan.peek() {
            None => break,
            Some(b) if b == quote => break,
            Some(b'\\') => {
                scan.bump(1);
                if scan.peek().is_some() {
                    scan.bump(1);
                }
            }
            Some(_) => scan.bump(1),
        }
    }
    (body, start)
}

fn yaml_lines(scan: &mut Scan<'_>) -> (TokenKind, usize) {
    let start = scan.pos;
    let Some(b) = scan.peek() else {
        return (TokenKind::End, start);
    };
    let at_line_start = start == 0 || scan.bytes[start - 1] == b'\n';
    let kind = match b {
        b'-' if at_line_start && frontmatter_delimiter(scan) => TokenKind::FrontmatterDelimiter,
        b'#' => {
            header_comment(scan);
            TokenKind::HeaderComment
        }
        b if is_space(b) => {
            scan.skip_while(is_space);
            TokenKind::YamlBlank
        }
        b if is_ident_start(b) => {
            scan.bump(1);
            scan.skip_while(|b| is_ident_continue(b) || b == b'-');
            TokenKind::YamlKey
        }
        _ => {
            // The whole rest of the line, so recovery resumes on the next one.
            scan.skip_while(|b| b != b'\n');
            if scan.peek() == Some(b'\n') {
                scan.bump(1);
            }
            TokenKind::YamlValue
        }
    };
    (kind, start)
}

fn yaml_key_end(scan: &mut Scan<'_>) -> (TokenKind, usize) {
    let origin = scan.pos;
    scan.skip_while(|b| b == b' ' || b == b'\t');
    let start = scan.pos;
    let kind = match scan.peek() {
        None if start > origin => return (TokenKind::YamlValue, origin),
        None => TokenKind::End,
        Some(b':') => {
            scan.bump(1);
            TokenKind::Colon
        }
        Some(b'\n') => {
            scan.bump(1);
            TokenKind::Newline
        }
        Some(b'\r') if scan.peek_at(1) == Some(b'\n') => {
            scan.bump(2);
            TokenKind::Newline
        }
        Some(_) => {
            scan.bump(1);
            loop {
                match scan.peek() {
                    None | Some(b'\n') => break,
                    Some(b'\r') if scan.peek_at(1) == Some(b'\n') => break,
                    Some(_) => scan.bump(1),
                }
            }
            TokenKind::YamlValue
        }
    };
    (kind, start)
}

/// The rest of the line after `:`, leading blanks included. A line holding
/// only blanks contributes them as padding of its line break instead.
fn yaml_value(scan: &mut Scan<'_>) -> (TokenKind, usize) {
    let origin = scan.pos;
    if scan.at_eof() {
        return (TokenKind::End, origin);
    }
    scan.skip_while(|b| b != b'\n');
    let line_end = scan.pos;
    let content_end = if line_end > origin && scan.bytes[line_end - 1] == b'\r' {
        line_end - 1
    } else {
        line_end
    };
    let blank = scan.bytes[origin..content_end]
        .iter()
        .all(|&b| b == b' ' || b == b'\t');

    if !blank {
        scan.pos = content_end;
        return (TokenKind::YamlValue, origin);
    }
    if scan.peek() == Some(b'\n') {
        scan.bump(1);
        return (TokenKind::Newline, content_end);
    }
    // Blanks running into the end of input.
    (TokenKind::YamlValue, origin)
}
