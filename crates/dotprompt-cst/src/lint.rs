//! Checks that run over a finished tree.
//!
//! The parser accepts `{{#if x}}…{{/each}}`; [`check_block_names`] is where
//! such mismatches are reported.

use ariadne::{Color, Label, Report, ReportKind, Source};
use dotprompt_grammar::Symbol;
use dotprompt_tokenizer::Span;

use crate::Tree;

/// A warning about well-formed but suspicious input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lint {
    pub span: Span,
    pub message: String,
    /// A second location the warning refers to.
    pub related: Option<(Span, String)>,
}

impl Lint {
    /// Render this lint with ariadne.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the lint report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let range = self.span.range();
        let mut report = Report::build(ReportKind::Warning, (filename, range.clone()))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message("closed here")
                    .with_color(Color::Yellow),
            );
        if let Some((span, message)) = &self.related {
            report = report.with_label(
                Label::new((filename, span.range()))
                    .with_message(message)
                    .with_color(Color::Blue),
            );
        }
        let _ = report.finish().write((filename, Source::from(source)), writer);
    }
}

impl std::fmt::Display for Lint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.span.start)
    }
}

/// Report every block whose `{{/name}}` differs from its `{{#name}}`.
///
/// Blocks with a missing closer are left to the syntax errors.
pub fn check_block_names(tree: &Tree) -> Vec<Lint> {
    let lints: Vec<Lint> = tree
        .root()
        .walk()
        .filter(|node| node.symbol() == Symbol::HANDLEBARS_BLOCK)
        .filter_map(|block| {
            let opened = block.child(0)?.field("name")?;
            let close = block.child(block.child_count().checked_sub(1)?)?;
            if close.symbol() != Symbol::CLOSE_BLOCK || close.is_missing() {
                return None;
            }
            let closed = close.field("name")?;
            (opened.text() != closed.text()).then(|| Lint {
                span: closed.span(),
                message: format!(
                    "block `{}` is closed by `{{{{/{}}}}}`",
                    opened.text(),
                    closed.text()
                ),
                related: Some((opened.span(), "opened here".to_string())),
            })
        })
        .collect();
    tracing::debug!(count = lints.len(), "checked block names");
    lints
}
