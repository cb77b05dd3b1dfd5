use dotprompt_parse::{ErrorCategory, Span, Symbol, SyntaxErrorKind, lint, parse};
use dotprompt_testhelpers::setup;
use insta::assert_snapshot;

fn kinds(source: &str) -> Vec<SyntaxErrorKind> {
    parse(source).errors().into_iter().map(|e| e.kind).collect()
}

fn rendered(source: &str) -> Vec<String> {
    parse(source)
        .errors()
        .iter()
        .map(|e| strip_ansi_escapes::strip_str(e.render("test.prompt", source)))
        .collect()
}

#[test]
fn else_outside_a_block() {
    setup();
    let tree = parse("{{else}}");
    assert!(tree.has_errors());
    assert_snapshot!(tree.to_sexp(), @"(document (ERROR))");

    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, SyntaxErrorKind::UnexpectedToken { found: Symbol::ELSE });
    assert_eq!(errors[0].span, Span::new(2, 6));
    assert_eq!(errors[0].category(), ErrorCategory::Parse);

    let node = tree.error_nodes().next().unwrap();
    assert_eq!(node.span(), Span::new(0, 8));
}

#[test]
fn unexpected_token_is_reported_where_it_is() {
    setup();
    let tree = parse("{{x a= }}");
    assert_snapshot!(tree.to_sexp(), @"(document (ERROR (path) (path)))");

    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, SyntaxErrorKind::UnexpectedToken { found: Symbol::CLOSE });
    assert_eq!(errors[0].span, Span::new(7, 9));
    assert_eq!(errors[0].to_string(), "unexpected '}}' at offset 7");
}

#[test]
fn else_between_text_resumes_after_it() {
    setup();
    let tree = parse("a{{else}}b");
    assert_snapshot!(tree.to_sexp(), @"(document (template_body (text) (ERROR) (text)))");
    assert_eq!(tree.error_nodes().count(), 1);
}

#[test]
fn stray_closer_is_skipped_whole() {
    setup();
    let tree = parse("{{/if}} tail");
    assert_snapshot!(tree.to_sexp(), @"(document (ERROR (path)) (template_body (text)))");

    let error = tree.error_nodes().next().unwrap();
    assert_eq!(error.text(), "{{/if}}");
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        SyntaxErrorKind::UnexpectedToken { found: Symbol::OPEN_END_BLOCK }
    );
    assert_eq!(errors[0].span, Span::new(0, 3));
}

#[test]
fn data_variables_take_no_path_segments() {
    setup();
    let tree = parse("{{x @root.a}}");
    assert!(tree.has_errors());

    let errors = tree.errors();
    assert_eq!(errors[0].kind, SyntaxErrorKind::UnexpectedToken { found: Symbol::TEXT });
    assert_eq!(errors[0].span, Span::new(9, 11));
}

#[test]
fn unclosed_frontmatter() {
    setup();
    let tree = parse("---\n");
    assert_snapshot!(tree.to_sexp(), @"(document (frontmatter (frontmatter_delimiter) (MISSING frontmatter_delimiter)))");

    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, SyntaxErrorKind::UnclosedFrontmatter);
    assert_eq!(errors[0].span, Span::new(4, 4));
    assert_eq!(errors[0].context, Some(Span::new(0, 4)));
    assert_eq!(errors[0].category(), ErrorCategory::Structural);
}

#[test]
fn unclosed_frontmatter_keeps_its_lines() {
    setup();
    let tree = parse("---\nmodel: x\n");
    assert_snapshot!(tree.to_sexp(), @"(document (frontmatter (frontmatter_delimiter) (yaml_content (yaml_line key: (key) value: (yaml_value))) (MISSING frontmatter_delimiter)))");
}

#[test]
fn unclosed_expression() {
    setup();
    let tree = parse("Hi {{name");
    assert_snapshot!(tree.to_sexp(), @r#"(document (template_body (text) (handlebars_expression (expression_content (variable_reference (path))) (MISSING "}}"))))"#);
    assert_eq!(
        kinds("Hi {{name"),
        [SyntaxErrorKind::MissingToken { expected: Symbol::CLOSE }]
    );
}

#[test]
fn truncated_block_errors() {
    setup();
    let errors = parse("{{#each items as |x|").errors();
    let summary: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        summary,
        [
            "unexpected text at offset 17",
            "missing '}}' at offset 20",
            "unclosed block at offset 20",
        ]
    );
    assert_eq!(errors[2].context, Some(Span::new(0, 20)));
}

#[test]
fn unclosed_string_and_block() {
    setup();
    let kinds = kinds("{{#if \"abc");
    assert!(kinds.contains(&SyntaxErrorKind::MissingToken {
        expected: Symbol::DOUBLE_QUOTE
    }));
    assert!(kinds.contains(&SyntaxErrorKind::MissingToken { expected: Symbol::CLOSE }));
    assert_eq!(kinds.last(), Some(&SyntaxErrorKind::UnclosedBlock));
}

#[test]
fn unclosed_long_comment() {
    setup();
    assert_eq!(
        kinds("{{!-- never closed"),
        [SyntaxErrorKind::MissingToken {
            expected: Symbol::CLOSE_LONG_COMMENT
        }]
    );
}

#[test]
fn errors_render_with_source_context() {
    setup();
    let reports = rendered("{{#if x}}body");
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.contains("unclosed block"), "{report}");
    assert!(report.contains("block opened here"), "{report}");
    assert!(report.contains("test.prompt"), "{report}");
    assert!(report.contains("{{#if x}}body"), "{report}");
}

#[test]
fn unexpected_token_report() {
    setup();
    let reports = rendered("a{{else}}b");
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("unexpected 'else'"), "{}", reports[0]);
    assert!(reports[0].contains("not valid here"), "{}", reports[0]);
}

#[test]
fn syntax_error_is_a_std_error() {
    setup();
    let errors = parse("{{x").errors();
    let error: &dyn std::error::Error = &errors[0];
    assert_eq!(error.to_string(), "missing '}}' at offset 3");
}

#[test]
fn mismatched_block_names_parse_cleanly() {
    setup();
    let source = "{{#if x}}a{{/each}}";
    let tree = parse(source);
    assert!(!tree.has_errors());

    let lints = lint::check_block_names(&tree);
    assert_eq!(lints.len(), 1);
    assert_eq!(lints[0].message, "block `if` is closed by `{{/each}}`");
    assert_eq!(lints[0].span, Span::new(13, 17));

    let report = strip_ansi_escapes::strip_str(lints[0].render("test.prompt", source));
    assert!(report.contains("opened here"), "{report}");
}

#[test]
fn matching_block_names_have_no_lints() {
    setup();
    let tree = parse("{{#each xs}}{{#if y}}{{/if}}{{/each}}");
    assert!(lint::check_block_names(&tree).is_empty());
}
