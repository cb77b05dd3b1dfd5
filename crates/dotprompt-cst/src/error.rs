//! Syntax error annotations and their diagnostics.

use ariadne::{Color, Label, Report, ReportKind, Source};
use dotprompt_grammar::Symbol;
use dotprompt_tokenizer::Span;

/// Why an ERROR or missing node was put in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// A token no action accepts; the node wraps the skipped input.
    UnexpectedToken { found: Symbol },
    /// Input ended inside an unfinished construct.
    UnexpectedEof,
    /// A block without its `{{/name}}`.
    UnclosedBlock,
    /// A frontmatter without its closing `---`.
    UnclosedFrontmatter,
    /// A closer that had to be synthesized.
    MissingToken { expected: Symbol },
    /// The parse was cancelled; the node covers what was not parsed.
    Cancelled,
}

/// Broad classes of syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A token that does not fit the grammar.
    Parse,
    /// Input ended with open structure.
    Structural,
    Cancelled,
}

impl SyntaxErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyntaxErrorKind::UnexpectedToken { .. } => ErrorCategory::Parse,
            SyntaxErrorKind::UnexpectedEof
            | SyntaxErrorKind::UnclosedBlock
            | SyntaxErrorKind::UnclosedFrontmatter
            | SyntaxErrorKind::MissingToken { .. } => ErrorCategory::Structural,
            SyntaxErrorKind::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// The symbol a missing node of this kind stands for.
    pub fn expected(&self) -> Option<Symbol> {
        match self {
            SyntaxErrorKind::UnclosedBlock => Some(Symbol::CLOSE_BLOCK),
            SyntaxErrorKind::UnclosedFrontmatter => Some(Symbol::FRONTMATTER_DELIMITER),
            SyntaxErrorKind::MissingToken { expected } => Some(*expected),
            _ => None,
        }
    }
}

/// `path` for named symbols, `'}}'` for anonymous ones.
fn describe(symbol: Symbol) -> String {
    if symbol.is_named() {
        symbol.name().to_string()
    } else {
        format!("'{}'", symbol.name())
    }
}

impl std::fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxErrorKind::UnexpectedToken { found } => write!(f, "unexpected {}", describe(*found)),
            SyntaxErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            SyntaxErrorKind::UnclosedBlock => write!(f, "unclosed block"),
            SyntaxErrorKind::UnclosedFrontmatter => write!(f, "unclosed frontmatter"),
            SyntaxErrorKind::MissingToken { expected } => write!(f, "missing {}", describe(*expected)),
            SyntaxErrorKind::Cancelled => write!(f, "parse cancelled"),
        }
    }
}

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Span of the ERROR or missing node.
    pub span: Span,
    /// Where the unclosed construct was opened, if known.
    pub context: Option<Span>,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: None,
        }
    }

    pub fn with_context(mut self, context: Span) -> Self {
        self.context = Some(context);
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report.finish().write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(&self, filename: &'a str) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = self.span.range();
        let builder = Report::build(ReportKind::Error, (filename, range.clone())).with_message(self.kind.to_string());

        match &self.kind {
            SyntaxErrorKind::UnexpectedToken { .. } => builder.with_label(
                Label::new((filename, range))
                    .with_message("not valid here")
                    .with_color(Color::Red),
            ),

            SyntaxErrorKind::UnexpectedEof => builder.with_label(
                Label::new((filename, range))
                    .with_message("unfinished before the end of input")
                    .with_color(Color::Red),
            ),

            SyntaxErrorKind::UnclosedBlock => {
                let builder = builder.with_label(
                    Label::new((filename, range))
                        .with_message("input ends here")
                        .with_color(Color::Red),
                );
                match self.context {
                    Some(opened) => builder
                        .with_label(
                            Label::new((filename, opened.range()))
                                .with_message("block opened here")
                                .with_color(Color::Blue),
                        )
                        .with_help("add a closing '{{/name}}'"),
                    None => builder.with_help("add a closing '{{/name}}'"),
                }
            }

            SyntaxErrorKind::UnclosedFrontmatter => {
                let builder = builder.with_label(
                    Label::new((filename, range))
                        .with_message("input ends here")
                        .with_color(Color::Red),
                );
                let builder = match self.context {
                    Some(opened) => builder.with_label(
                        Label::new((filename, opened.range()))
                            .with_message("frontmatter opened here")
                            .with_color(Color::Blue),
                    ),
                    None => builder,
                };
                builder.with_help("add a closing '---' line")
            }

            SyntaxErrorKind::MissingToken { expected } => builder
                .with_label(
                    Label::new((filename, range))
                        .with_message(format!("expected {} here", describe(*expected)))
                        .with_color(Color::Red),
                )
                .with_help(format!("add {}", describe(*expected))),

            SyntaxErrorKind::Cancelled => builder.with_label(
                Label::new((filename, range))
                    .with_message("not parsed")
                    .with_color(Color::Yellow),
            ),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.span.start)
    }
}

impl std::error::Error for SyntaxError {}
