use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use dotprompt_testhelpers::setup;
use insta::assert_snapshot;

use super::*;

fn handlebars_block(tree: &Tree) -> &Arc<Subtree> {
    let body = tree.root().child(0).expect("template_body");
    body.child(0).expect("handlebars_block").subtree()
}

#[test]
fn true_in_expression_position_is_a_path() {
    setup();
    let tree = parse("{{true}}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_expression (expression_content (variable_reference (path))))))");
}

#[test]
fn true_as_argument_is_a_boolean() {
    setup();
    let tree = parse("{{#if true}}x{{/if}}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_block (block_expression name: (block_name) (argument (boolean))) (text) (close_block name: (block_name)))))");
}

#[test]
fn block_name_is_never_a_keyword() {
    setup();
    let tree = parse("{{#false}}{{/false}}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_block (block_expression name: (block_name)) (close_block name: (block_name)))))");
}

#[test]
fn empty_source() {
    setup();
    let tree = parse("");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document)");
}

#[test]
fn cancelled_before_the_first_token() {
    setup();
    let source = "{{#if x}}hello{{/if}}";
    let flag = Arc::new(AtomicBool::new(true));
    let tree = parse_with_options(source, &ParseOptions::new().cancellation_flag(flag));

    let root = tree.root();
    assert!(root.is_error());
    assert_eq!(root.padded_span(), Span::new(0, source.len() as u32));
    assert_eq!(root.error(), Some(&SyntaxErrorKind::Cancelled));
    assert!(tree.errors().iter().any(|e| e.category() == ErrorCategory::Cancelled));
}

#[test]
fn unset_flag_does_not_cancel() {
    setup();
    let flag = Arc::new(AtomicBool::new(false));
    let tree = parse_with_options("hi {{x}}", &ParseOptions::new().cancellation_flag(flag));
    assert!(!tree.has_errors());
}

#[test]
fn exhausted_recovery_budget_abandons() {
    setup();
    let source = "{{else}} trailing";
    let tree = parse_with_options(source, &ParseOptions::new().max_recovery_steps(0));

    let root = tree.root();
    assert!(root.is_error());
    assert_eq!(root.padded_span(), Span::new(0, source.len() as u32));
    let text: String = tree.leaves().map(|l| l.padded_span().slice(source)).collect();
    assert_eq!(text, source);
}

#[test]
fn unchanged_source_reuses_the_root() {
    setup();
    let source = "---\nmodel: x\n---\n{{#if a}}b{{/if}}";
    let tree = parse(source);
    let again = parse_incremental(source, &tree, &[]);
    assert!(Arc::ptr_eq(tree.root_subtree(), again.root_subtree()));
}

#[test]
fn edit_after_a_block_reuses_the_block() {
    setup();
    let old = "{{#if a}}x{{/if}} {{b}}";
    let new = "{{#if a}}x{{/if}} {{bc}}";
    let tree = parse(old);
    let edit = InputEdit::between(old, new);
    let reparsed = parse_incremental(new, &tree, &[edit]);

    assert_eq!(reparsed, parse(new));
    assert!(Arc::ptr_eq(handlebars_block(&tree), handlebars_block(&reparsed)));
}

#[test]
fn without_reuse_builds_everything_fresh() {
    setup();
    let source = "{{#if a}}x{{/if}}";
    let tree = parse(source);
    let options = ParseOptions::new().without_reuse();
    let again = parse_incremental_with_options(source, &tree, &[], &options);

    assert_eq!(again, tree);
    assert!(!Arc::ptr_eq(tree.root_subtree(), again.root_subtree()));
}

#[test]
fn parser_is_reusable_across_sources() {
    setup();
    let parser = Parser::new(ParseOptions::default());
    let first = parser.parse("a", None);
    let second = parser.parse("{{b}}", None);
    assert_eq!(first.source(), "a");
    assert_eq!(second.source(), "{{b}}");
    assert!(parser.options().reuse_subtrees);
}
