//! The dotprompt grammar: productions, alias sequences and field maps.
//!
//! Productions are grouped by the production id they carry. A production id
//! selects an alias sequence and a field map, so reductions look both up in
//! O(1) by child index.

use crate::{FieldId, Symbol};

/// Identifies the alias sequence and field map of a production.
pub type ProductionId = u16;

pub const PRODUCTION_NONE: ProductionId = 0;
/// `block_expression` and `close_block`: the path names the block.
pub const PRODUCTION_BLOCK_NAME: ProductionId = 1;
/// `{{> path}}`.
pub const PRODUCTION_PARTIAL: ProductionId = 2;
/// `{{helper arg...}}`.
pub const PRODUCTION_HELPER: ProductionId = 3;
/// Frontmatter with at least one line.
pub const PRODUCTION_FRONTMATTER: ProductionId = 4;
/// `key:` with no value.
pub const PRODUCTION_YAML_KEY: ProductionId = 5;
/// `key: value` lines and `key=value` hash params.
pub const PRODUCTION_KEY_VALUE: ProductionId = 6;

/// Number of production ids.
pub const PRODUCTION_ID_COUNT: usize = 7;

/// Longest right-hand side in the grammar.
pub const MAX_ALIAS_SEQUENCE_LENGTH: usize = 4;

/// A grammar rule `lhs → rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: &'static [Symbol],
    pub production_id: ProductionId,
}

impl Production {
    /// Number of children a reduction by this production pops.
    pub fn arity(&self) -> usize {
        self.rhs.len()
    }
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} →", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        for symbol in self.rhs {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

const fn rule(lhs: Symbol, rhs: &'static [Symbol]) -> Production {
    Production {
        lhs,
        rhs,
        production_id: PRODUCTION_NONE,
    }
}

const fn rule_with(lhs: Symbol, rhs: &'static [Symbol], production_id: ProductionId) -> Production {
    Production {
        lhs,
        rhs,
        production_id,
    }
}

use Symbol as S;

/// Every production of the grammar. The start symbol is `document`.
pub static PRODUCTIONS: &[Production] = &[
    // document → license_header? frontmatter? template_body?
    rule(S::DOCUMENT, &[]),
    rule(S::DOCUMENT, &[S::LICENSE_HEADER]),
    rule(S::DOCUMENT, &[S::FRONTMATTER]),
    rule(S::DOCUMENT, &[S::TEMPLATE_BODY]),
    rule(S::DOCUMENT, &[S::LICENSE_HEADER, S::FRONTMATTER]),
    rule(S::DOCUMENT, &[S::LICENSE_HEADER, S::TEMPLATE_BODY]),
    rule(S::DOCUMENT, &[S::FRONTMATTER, S::TEMPLATE_BODY]),
    rule(S::DOCUMENT, &[S::LICENSE_HEADER, S::FRONTMATTER, S::TEMPLATE_BODY]),
    // license_header
    rule(S::LICENSE_HEADER, &[S::LICENSE_HEADER_REPEAT1]),
    rule(S::LICENSE_HEADER_REPEAT1, &[S::LICENSE_HEADER_REPEAT1, S::HEADER_COMMENT]),
    rule(S::LICENSE_HEADER_REPEAT1, &[S::HEADER_COMMENT]),
    // frontmatter
    rule(S::FRONTMATTER, &[S::FRONTMATTER_DELIMITER, S::FRONTMATTER_DELIMITER]),
    rule_with(
        S::FRONTMATTER,
        &[S::FRONTMATTER_DELIMITER, S::FRONTMATTER_REPEAT1, S::FRONTMATTER_DELIMITER],
        PRODUCTION_FRONTMATTER,
    ),
    rule(S::FRONTMATTER_REPEAT1, &[S::FRONTMATTER_REPEAT1, S::YAML_CONTENT_ITEM]),
    rule(S::FRONTMATTER_REPEAT1, &[S::YAML_CONTENT_ITEM]),
    rule(S::YAML_CONTENT_ITEM, &[S::YAML_LINE]),
    rule(S::YAML_CONTENT_ITEM, &[S::HEADER_COMMENT]),
    rule(S::YAML_CONTENT_ITEM, &[S::YAML_BLANK]),
    rule_with(S::YAML_LINE, &[S::YAML_KEY, S::COLON, S::NEWLINE], PRODUCTION_YAML_KEY),
    rule_with(
        S::YAML_LINE,
        &[S::YAML_KEY, S::COLON, S::YAML_VALUE, S::NEWLINE],
        PRODUCTION_KEY_VALUE,
    ),
    // template_body
    rule(S::TEMPLATE_BODY, &[S::TEMPLATE_BODY_REPEAT1]),
    rule(S::TEMPLATE_BODY_REPEAT1, &[S::TEMPLATE_BODY_REPEAT1, S::CONTENT]),
    rule(S::TEMPLATE_BODY_REPEAT1, &[S::CONTENT]),
    rule(S::CONTENT, &[S::TEXT]),
    rule(S::CONTENT, &[S::HANDLEBARS_BLOCK]),
    rule(S::CONTENT, &[S::HANDLEBARS_EXPRESSION]),
    rule(S::CONTENT, &[S::HANDLEBARS_COMMENT]),
    // blocks
    rule(S::HANDLEBARS_BLOCK, &[S::BLOCK_EXPRESSION, S::CLOSE_BLOCK]),
    rule(
        S::HANDLEBARS_BLOCK,
        &[S::BLOCK_EXPRESSION, S::HANDLEBARS_BLOCK_REPEAT1, S::CLOSE_BLOCK],
    ),
    rule(S::HANDLEBARS_BLOCK_REPEAT1, &[S::HANDLEBARS_BLOCK_REPEAT1, S::BLOCK_CONTENT]),
    rule(S::HANDLEBARS_BLOCK_REPEAT1, &[S::BLOCK_CONTENT]),
    rule(S::BLOCK_CONTENT, &[S::CONTENT]),
    rule(S::BLOCK_CONTENT, &[S::ELSE_EXPRESSION]),
    rule(S::ELSE_EXPRESSION, &[S::OPEN, S::ELSE_CONTENT, S::CLOSE]),
    rule(S::ELSE_CONTENT, &[S::ELSE]),
    rule_with(S::BLOCK_EXPRESSION, &[S::OPEN_BLOCK, S::PATH, S::CLOSE], PRODUCTION_BLOCK_NAME),
    rule_with(
        S::BLOCK_EXPRESSION,
        &[S::OPEN_BLOCK, S::PATH, S::BLOCK_EXPRESSION_REPEAT1, S::CLOSE],
        PRODUCTION_BLOCK_NAME,
    ),
    rule(S::BLOCK_EXPRESSION_REPEAT1, &[S::BLOCK_EXPRESSION_REPEAT1, S::ARGUMENT]),
    rule(S::BLOCK_EXPRESSION_REPEAT1, &[S::ARGUMENT]),
    rule_with(S::CLOSE_BLOCK, &[S::OPEN_END_BLOCK, S::PATH, S::CLOSE], PRODUCTION_BLOCK_NAME),
    // expressions
    rule(S::HANDLEBARS_EXPRESSION, &[S::OPEN, S::EXPRESSION_CONTENT, S::CLOSE]),
    rule(S::EXPRESSION_CONTENT, &[S::VARIABLE_REFERENCE]),
    rule_with(S::EXPRESSION_CONTENT, &[S::GT, S::PATH], PRODUCTION_PARTIAL),
    rule_with(
        S::EXPRESSION_CONTENT,
        &[S::PATH, S::BLOCK_EXPRESSION_REPEAT1],
        PRODUCTION_HELPER,
    ),
    // comments
    rule(S::HANDLEBARS_COMMENT, &[S::OPEN_COMMENT, S::CLOSE]),
    rule(S::HANDLEBARS_COMMENT, &[S::OPEN_COMMENT, S::SHORT_COMMENT_BODY, S::CLOSE]),
    rule(S::HANDLEBARS_COMMENT, &[S::OPEN_LONG_COMMENT, S::CLOSE_LONG_COMMENT]),
    rule(
        S::HANDLEBARS_COMMENT,
        &[S::OPEN_LONG_COMMENT, S::LONG_COMMENT_BODY, S::CLOSE_LONG_COMMENT],
    ),
    // arguments
    rule(S::ARGUMENT, &[S::HASH_PARAM]),
    rule(S::ARGUMENT, &[S::VARIABLE_REFERENCE]),
    rule(S::ARGUMENT, &[S::STRING_LITERAL]),
    rule(S::ARGUMENT, &[S::NUMBER]),
    rule(S::ARGUMENT, &[S::BOOLEAN]),
    rule_with(S::HASH_PARAM, &[S::PATH, S::EQ, S::VARIABLE_REFERENCE], PRODUCTION_KEY_VALUE),
    rule_with(S::HASH_PARAM, &[S::PATH, S::EQ, S::STRING_LITERAL], PRODUCTION_KEY_VALUE),
    rule_with(S::HASH_PARAM, &[S::PATH, S::EQ, S::NUMBER], PRODUCTION_KEY_VALUE),
    rule_with(S::HASH_PARAM, &[S::PATH, S::EQ, S::BOOLEAN], PRODUCTION_KEY_VALUE),
    rule(S::VARIABLE_REFERENCE, &[S::PATH]),
    rule(S::VARIABLE_REFERENCE, &[S::AT_IDENTIFIER]),
    rule(S::STRING_LITERAL, &[S::DOUBLE_QUOTE, S::DOUBLE_QUOTE]),
    rule(S::STRING_LITERAL, &[S::DOUBLE_QUOTE, S::DOUBLE_QUOTED_BODY, S::DOUBLE_QUOTE]),
    rule(S::STRING_LITERAL, &[S::SINGLE_QUOTE, S::SINGLE_QUOTE]),
    rule(S::STRING_LITERAL, &[S::SINGLE_QUOTE, S::SINGLE_QUOTED_BODY, S::SINGLE_QUOTE]),
    rule(S::BOOLEAN, &[S::TRUE]),
    rule(S::BOOLEAN, &[S::FALSE]),
];

/// Alias applied to each child index, per production id. `Symbol::END`
/// means no alias.
pub static ALIAS_SEQUENCES: [[Symbol; MAX_ALIAS_SEQUENCE_LENGTH]; PRODUCTION_ID_COUNT] = [
    [S::END, S::END, S::END, S::END],
    [S::END, S::BLOCK_NAME, S::END, S::END],
    [S::END, S::PARTIAL_REFERENCE, S::END, S::END],
    [S::HELPER_NAME, S::END, S::END, S::END],
    [S::END, S::YAML_CONTENT, S::END, S::END],
    [S::KEY, S::END, S::END, S::END],
    [S::KEY, S::END, S::END, S::END],
];

/// `(index, length)` into [`FIELD_MAP_ENTRIES`], per production id.
pub static FIELD_MAP_SLICES: [(u16, u16); PRODUCTION_ID_COUNT] =
    [(0, 0), (0, 1), (0, 0), (0, 0), (0, 0), (1, 1), (1, 2)];

/// A field binding to a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapEntry {
    pub field: FieldId,
    pub child_index: u8,
}

pub static FIELD_MAP_ENTRIES: [FieldMapEntry; 3] = [
    FieldMapEntry {
        field: FieldId::NAME,
        child_index: 1,
    },
    FieldMapEntry {
        field: FieldId::KEY,
        child_index: 0,
    },
    FieldMapEntry {
        field: FieldId::VALUE,
        child_index: 2,
    },
];

/// Aliases a hidden nonterminal may be projected as, the nonterminal itself
/// first.
pub static NON_TERMINAL_ALIAS_MAP: &[(Symbol, &[Symbol])] =
    &[(S::FRONTMATTER_REPEAT1, &[S::FRONTMATTER_REPEAT1, S::YAML_CONTENT])];

/// Alias for child `index` under `production_id`.
pub fn alias_at(production_id: ProductionId, index: usize) -> Option<Symbol> {
    ALIAS_SEQUENCES
        .get(production_id as usize)?
        .get(index)
        .copied()
        .filter(|alias| *alias != S::END)
}

/// Field bindings of a production id.
pub fn field_map(production_id: ProductionId) -> &'static [FieldMapEntry] {
    match FIELD_MAP_SLICES.get(production_id as usize) {
        Some(&(index, length)) => &FIELD_MAP_ENTRIES[index as usize..(index + length) as usize],
        None => &[],
    }
}

/// Productions whose left-hand side is `lhs`.
pub fn productions_for(lhs: Symbol) -> impl Iterator<Item = &'static Production> {
    PRODUCTIONS.iter().filter(move |p| p.lhs == lhs)
}
