use std::sync::Arc;

use dotprompt_parse::{InputEdit, Node, parse, parse_incremental};
use proptest::prelude::*;

/// Pieces that exercise every lex mode, well-formed or not.
const PIECES: &[&str] = &[
    "---\n",
    "# header\n",
    "model: gemini\n",
    "key:\n",
    "  \n",
    "{{",
    "}}",
    "{{#if ",
    "{{#each items}}",
    "{{/if}}",
    "{{/each}}",
    "{{else}}",
    "{{name}}",
    "{{> partial }}",
    "{{helper a b=1 c=\"s\" d=true}}",
    "{{@index}}",
    "{{! note }}",
    "{{!-- long\ncomment --}}",
    "\"",
    "'",
    "true",
    " ",
    "\n",
    "#",
    "|x|",
];

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(PIECES).prop_map(str::to_string),
        1 => prop::string::string_regex("[a-z .]{1,8}").unwrap(),
    ]
}

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..10).prop_map(|parts| parts.concat())
}

/// Every child's padded span starts where the previous one ended, and
/// together they cover the parent.
fn assert_contiguous(node: Node<'_>) -> Result<(), TestCaseError> {
    let mut end = node.padded_span().start;
    for child in node.children() {
        prop_assert_eq!(child.padded_span().start, end, "gap before {} in {}", child.kind(), node.kind());
        end = child.padded_span().end;
        assert_contiguous(child)?;
    }
    if node.child_count() > 0 {
        prop_assert_eq!(end, node.padded_span().end, "children of {} fall short", node.kind());
    }
    Ok(())
}

proptest! {
    /// Leaves tile the source byte for byte.
    #[test]
    fn leaves_cover_the_source(input in source()) {
        let tree = parse(&input);
        let text: String = tree.leaves().map(|leaf| leaf.padded_span().slice(&input)).collect();
        prop_assert_eq!(&text, &input);
        prop_assert_eq!(tree.root().padded_span().end as usize, input.len());
    }

    #[test]
    fn children_are_contiguous(input in source()) {
        let tree = parse(&input);
        assert_contiguous(tree.root())?;
    }

    #[test]
    fn parsing_is_deterministic(input in source()) {
        prop_assert_eq!(parse(&input), parse(&input));
    }

    /// A clean tree reparsed without edits is reused whole.
    #[test]
    fn unchanged_clean_tree_is_reused(input in source()) {
        let tree = parse(&input);
        if tree.has_errors() || input.is_empty() {
            return Ok(());
        }
        let again = parse_incremental(&input, &tree, &[]);
        prop_assert!(Arc::ptr_eq(tree.root_subtree(), again.root_subtree()));
    }

    /// Reparsing after an edit gives the same tree as parsing from scratch.
    #[test]
    fn incremental_matches_fresh(
        prefix in source(),
        removed in source(),
        inserted in source(),
        suffix in source(),
    ) {
        let old = format!("{prefix}{removed}{suffix}");
        let new = format!("{prefix}{inserted}{suffix}");
        let prior = parse(&old);
        let edit = InputEdit::between(&old, &new);
        let reparsed = parse_incremental(&new, &prior, &[edit]);
        prop_assert_eq!(reparsed.to_sexp(), parse(&new).to_sexp(), "{:?} -> {:?}", old, new);
        prop_assert_eq!(reparsed, parse(&new));
    }

    /// Two edits in a row, each against the previous text.
    #[test]
    fn incremental_after_two_edits(a in source(), b in source(), c in source()) {
        let edits = [InputEdit::between(&a, &b), InputEdit::between(&b, &c)];
        let prior = parse(&a);
        prop_assert_eq!(parse_incremental(&c, &prior, &edits), parse(&c));
    }

    /// Errors always point inside the source.
    #[test]
    fn errors_are_in_bounds(input in source()) {
        for error in parse(&input).errors() {
            prop_assert!(error.span.start <= error.span.end);
            prop_assert!(error.span.end as usize <= input.len());
        }
    }
}
