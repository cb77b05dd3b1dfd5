use dotprompt_parse::{Node, Tree, parse};
use dotprompt_testhelpers::setup;
use insta::assert_snapshot;

fn first<'t>(tree: &'t Tree, kind: &str) -> Node<'t> {
    tree.root()
        .walk()
        .find(|node| node.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind} in {}", tree.to_sexp()))
}

fn texts<'t>(tree: &'t Tree, kind: &str) -> Vec<&'t str> {
    tree.root().walk().filter(|node| node.kind() == kind).map(|node| node.text()).collect()
}

#[test]
fn frontmatter_and_body() {
    setup();
    let tree = parse("---\nname: hello\n---\nHi {{who}}!");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (frontmatter (frontmatter_delimiter) (yaml_content (yaml_line key: (key) value: (yaml_value))) (frontmatter_delimiter)) (template_body (text) (handlebars_expression (expression_content (variable_reference (path)))) (text)))");

    let line = first(&tree, "yaml_line");
    assert_eq!(line.field("key").map(|n| n.text()), Some("name"));
    assert_eq!(line.field("value").map(|n| n.text()), Some(" hello"));
    assert_eq!(texts(&tree, "text"), ["Hi ", "!"]);
    assert_eq!(texts(&tree, "path"), ["who"]);
}

#[test]
fn license_header() {
    setup();
    let tree = parse("# License line 1\n# License line 2\nJust text.");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (license_header (header_comment) (header_comment)) (template_body (text)))");
    assert_eq!(texts(&tree, "text"), ["Just text."]);
    assert_eq!(first(&tree, "header_comment").text(), "# License line 1\n");
}

#[test]
fn block_with_else() {
    setup();
    let tree = parse("{{#if ready}}go{{else}}wait{{/if}}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_block (block_expression name: (block_name) (argument (variable_reference (path)))) (text) (handlebars_expression (expression_content)) (text) (close_block name: (block_name)))))");

    let opener = first(&tree, "block_expression");
    assert_eq!(opener.field("name").map(|n| n.text()), Some("if"));
    assert_eq!(first(&tree, "close_block").field("name").map(|n| n.text()), Some("if"));
    assert_eq!(texts(&tree, "text"), ["go", "wait"]);
    assert_eq!(first(&tree, "handlebars_expression").text(), "{{else}}");
}

#[test]
fn partial() {
    setup();
    let tree = parse("{{> partials/header }}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_expression (expression_content (partial_reference)))))");

    let partial = first(&tree, "partial_reference");
    assert_eq!(partial.text(), "partials/header");
    assert_eq!(partial.grammar_name(), "path");
}

#[test]
fn long_comment() {
    setup();
    let tree = parse("{{!-- multi\nline --}}rest");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_comment) (text)))");
    assert_eq!(first(&tree, "handlebars_comment").text(), "{{!-- multi\nline --}}");
    assert_eq!(texts(&tree, "text"), ["rest"]);
}

#[test]
fn truncated_block() {
    setup();
    let source = "{{#each items as |x|";
    let tree = parse(source);
    assert!(tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @r#"(document (template_body (handlebars_block (block_expression name: (block_name) (argument (variable_reference (path))) (argument (variable_reference (path))) (ERROR (text)) (MISSING "}}")) (MISSING close_block))))"#);

    assert_eq!(first(&tree, "ERROR").text(), "|x|");
    let text: String = tree.leaves().map(|leaf| leaf.padded_span().slice(source)).collect();
    assert_eq!(text, source);
}

#[test]
fn helper_call_with_hash_params() {
    setup();
    let tree = parse("{{format date style=\"short\" n=2 on=true}}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_expression (expression_content (helper_name) (argument (variable_reference (path))) (argument (hash_param key: (key) value: (string_literal))) (argument (hash_param key: (key) value: (number))) (argument (hash_param key: (key) value: (boolean)))))))");
}

#[test]
fn data_variable_and_literals() {
    setup();
    let tree = parse("{{#each list}}{{@index}}{{/each}}{{#if 'a' 1.5 false}}{{/if}}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (handlebars_block (block_expression name: (block_name) (argument (variable_reference (path)))) (handlebars_expression (expression_content (variable_reference))) (close_block name: (block_name))) (handlebars_block (block_expression name: (block_name) (argument (string_literal)) (argument (number)) (argument (boolean))) (close_block name: (block_name)))))");
}

#[test]
fn short_comment_and_frontmatter_comment() {
    setup();
    let tree = parse("---\n# note\nmodel: x\n\n---\n{{! hi }}");
    assert!(!tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (frontmatter (frontmatter_delimiter) (yaml_content (header_comment) (yaml_line key: (key) value: (yaml_value))) (frontmatter_delimiter)) (template_body (handlebars_comment)))");
}
