//! Terminal, nonterminal and alias symbols.

use dotprompt_tokenizer::TokenKind;

/// Number of terminal symbols.
pub const TOKEN_COUNT: usize = TokenKind::COUNT;

/// Number of terminal and nonterminal symbols (the parse table width).
pub const SYMBOL_COUNT: usize = 56;

/// Number of alias symbols, numbered right after the nonterminals.
pub const ALIAS_COUNT: usize = 5;

/// A grammar symbol.
///
/// Ids `0..TOKEN_COUNT` are terminals and coincide with [`TokenKind`]
/// discriminants, ids up to [`SYMBOL_COUNT`] are nonterminals, and the next
/// [`ALIAS_COUNT`] ids are aliases. [`Symbol::ERROR`] marks error nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub u16);

/// Static facts about a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMetadata {
    /// Grammar name.
    pub name: &'static str,
    /// Hidden symbols are spliced into their parent.
    pub visible: bool,
    /// Named symbols appear in the high-level tree.
    pub named: bool,
    /// The symbol consumers see for this one.
    pub public: Symbol,
}

impl Symbol {
    // Terminals
    pub const END: Symbol = Symbol(TokenKind::End as u16);
    pub const HEADER_COMMENT: Symbol = Symbol(TokenKind::HeaderComment as u16);
    pub const FRONTMATTER_DELIMITER: Symbol = Symbol(TokenKind::FrontmatterDelimiter as u16);
    pub const YAML_BLANK: Symbol = Symbol(TokenKind::YamlBlank as u16);
    pub const YAML_KEY: Symbol = Symbol(TokenKind::YamlKey as u16);
    pub const COLON: Symbol = Symbol(TokenKind::Colon as u16);
    pub const YAML_VALUE: Symbol = Symbol(TokenKind::YamlValue as u16);
    pub const NEWLINE: Symbol = Symbol(TokenKind::Newline as u16);
    pub const OPEN_BLOCK: Symbol = Symbol(TokenKind::OpenBlock as u16);
    pub const CLOSE: Symbol = Symbol(TokenKind::Close as u16);
    pub const OPEN_END_BLOCK: Symbol = Symbol(TokenKind::OpenEndBlock as u16);
    pub const OPEN: Symbol = Symbol(TokenKind::Open as u16);
    pub const GT: Symbol = Symbol(TokenKind::Gt as u16);
    pub const ELSE: Symbol = Symbol(TokenKind::Else as u16);
    pub const OPEN_COMMENT: Symbol = Symbol(TokenKind::OpenComment as u16);
    pub const SHORT_COMMENT_BODY: Symbol = Symbol(TokenKind::ShortCommentBody as u16);
    pub const OPEN_LONG_COMMENT: Symbol = Symbol(TokenKind::OpenLongComment as u16);
    pub const LONG_COMMENT_BODY: Symbol = Symbol(TokenKind::LongCommentBody as u16);
    pub const CLOSE_LONG_COMMENT: Symbol = Symbol(TokenKind::CloseLongComment as u16);
    pub const EQ: Symbol = Symbol(TokenKind::Eq as u16);
    pub const AT_IDENTIFIER: Symbol = Symbol(TokenKind::AtIdentifier as u16);
    pub const PATH: Symbol = Symbol(TokenKind::Path as u16);
    pub const DOUBLE_QUOTE: Symbol = Symbol(TokenKind::DoubleQuote as u16);
    pub const DOUBLE_QUOTED_BODY: Symbol = Symbol(TokenKind::DoubleQuotedBody as u16);
    pub const SINGLE_QUOTE: Symbol = Symbol(TokenKind::SingleQuote as u16);
    pub const SINGLE_QUOTED_BODY: Symbol = Symbol(TokenKind::SingleQuotedBody as u16);
    pub const NUMBER: Symbol = Symbol(TokenKind::Number as u16);
    pub const TRUE: Symbol = Symbol(TokenKind::True as u16);
    pub const FALSE: Symbol = Symbol(TokenKind::False as u16);
    pub const TEXT: Symbol = Symbol(TokenKind::Text as u16);

    // Nonterminals
    pub const DOCUMENT: Symbol = Symbol(30);
    pub const LICENSE_HEADER: Symbol = Symbol(31);
    pub const FRONTMATTER: Symbol = Symbol(32);
    pub const YAML_CONTENT_ITEM: Symbol = Symbol(33);
    pub const YAML_LINE: Symbol = Symbol(34);
    pub const TEMPLATE_BODY: Symbol = Symbol(35);
    pub const CONTENT: Symbol = Symbol(36);
    pub const HANDLEBARS_BLOCK: Symbol = Symbol(37);
    pub const BLOCK_EXPRESSION: Symbol = Symbol(38);
    pub const CLOSE_BLOCK: Symbol = Symbol(39);
    pub const HANDLEBARS_EXPRESSION: Symbol = Symbol(40);
    pub const EXPRESSION_CONTENT: Symbol = Symbol(41);
    pub const HANDLEBARS_COMMENT: Symbol = Symbol(42);
    pub const ARGUMENT: Symbol = Symbol(43);
    pub const HASH_PARAM: Symbol = Symbol(44);
    pub const VARIABLE_REFERENCE: Symbol = Symbol(45);
    pub const STRING_LITERAL: Symbol = Symbol(46);
    pub const BOOLEAN: Symbol = Symbol(47);
    pub const LICENSE_HEADER_REPEAT1: Symbol = Symbol(48);
    pub const FRONTMATTER_REPEAT1: Symbol = Symbol(49);
    pub const TEMPLATE_BODY_REPEAT1: Symbol = Symbol(50);
    pub const BLOCK_EXPRESSION_REPEAT1: Symbol = Symbol(51);
    pub const HANDLEBARS_BLOCK_REPEAT1: Symbol = Symbol(52);
    pub const BLOCK_CONTENT: Symbol = Symbol(53);
    pub const ELSE_EXPRESSION: Symbol = Symbol(54);
    pub const ELSE_CONTENT: Symbol = Symbol(55);

    // Aliases
    pub const BLOCK_NAME: Symbol = Symbol(56);
    pub const HELPER_NAME: Symbol = Symbol(57);
    pub const KEY: Symbol = Symbol(58);
    pub const PARTIAL_REFERENCE: Symbol = Symbol(59);
    pub const YAML_CONTENT: Symbol = Symbol(60);

    /// Error nodes.
    pub const ERROR: Symbol = Symbol(u16::MAX);

    /// Index into per-symbol tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.index() < TOKEN_COUNT
    }

    #[inline]
    pub fn is_nonterminal(self) -> bool {
        (TOKEN_COUNT..SYMBOL_COUNT).contains(&self.index())
    }

    #[inline]
    pub fn is_alias(self) -> bool {
        (SYMBOL_COUNT..SYMBOL_COUNT + ALIAS_COUNT).contains(&self.index())
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Symbol::ERROR
    }

    /// The token kind of a terminal symbol.
    pub fn token_kind(self) -> Option<TokenKind> {
        TokenKind::from_id(self.0)
    }

    /// Metadata of this symbol.
    pub fn metadata(self) -> SymbolMetadata {
        if self.is_error() {
            return SymbolMetadata {
                name: "ERROR",
                visible: true,
                named: true,
                public: Symbol::ERROR,
            };
        }
        SYMBOL_METADATA
            .get(self.index())
            .copied()
            .unwrap_or(SymbolMetadata {
                name: "<unknown>",
                visible: false,
                named: false,
                public: self,
            })
    }

    /// Grammar name of this symbol.
    pub fn name(self) -> &'static str {
        self.metadata().name
    }

    pub fn is_visible(self) -> bool {
        self.metadata().visible
    }

    pub fn is_named(self) -> bool {
        self.metadata().named
    }

    /// The symbol consumers see when no alias applies.
    pub fn public(self) -> Symbol {
        self.metadata().public
    }

    /// Every symbol with metadata, aliases included.
    pub fn all() -> impl Iterator<Item = Symbol> {
        (0..(SYMBOL_COUNT + ALIAS_COUNT) as u16).map(Symbol)
    }
}

impl From<TokenKind> for Symbol {
    fn from(kind: TokenKind) -> Self {
        Symbol(kind.id())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const fn meta(name: &'static str, visible: bool, named: bool, public: u16) -> SymbolMetadata {
    SymbolMetadata {
        name,
        visible,
        named,
        public: Symbol(public),
    }
}

/// Metadata for every symbol, indexed by id.
static SYMBOL_METADATA: [SymbolMetadata; SYMBOL_COUNT + ALIAS_COUNT] = [
    meta("end", false, true, 0),
    meta("header_comment", true, true, 1),
    meta("frontmatter_delimiter", true, true, 2),
    meta("yaml_blank", true, false, 3),
    meta("yaml_key", true, true, 4),
    meta(":", true, false, 5),
    meta("yaml_value", true, true, 6),
    meta("newline", true, false, 7),
    meta("{{#", true, false, 8),
    meta("}}", true, false, 9),
    meta("{{/", true, false, 10),
    meta("{{", true, false, 11),
    meta(">", true, false, 12),
    meta("else", true, false, 13),
    meta("{{!", true, false, 14),
    meta("handlebars_comment_short_body", true, false, 15),
    meta("{{!--", true, false, 16),
    meta("handlebars_comment_long_body", true, false, 17),
    meta("--}}", true, false, 18),
    meta("=", true, false, 19),
    meta("@identifier", true, false, 20),
    meta("path", true, true, 21),
    meta("\"", true, false, 22),
    meta("double_quoted_body", true, false, 23),
    meta("'", true, false, 24),
    meta("single_quoted_body", true, false, 25),
    meta("number", true, true, 26),
    meta("true", true, false, 27),
    meta("false", true, false, 28),
    meta("text", true, true, 29),
    meta("document", true, true, 30),
    meta("license_header", true, true, 31),
    meta("frontmatter", true, true, 32),
    meta("_yaml_content", false, true, 33),
    meta("yaml_line", true, true, 34),
    meta("template_body", true, true, 35),
    meta("_content", false, true, 36),
    meta("handlebars_block", true, true, 37),
    meta("block_expression", true, true, 38),
    meta("close_block", true, true, 39),
    meta("handlebars_expression", true, true, 40),
    meta("expression_content", true, true, 41),
    meta("handlebars_comment", true, true, 42),
    meta("argument", true, true, 43),
    meta("hash_param", true, true, 44),
    meta("variable_reference", true, true, 45),
    meta("string_literal", true, true, 46),
    meta("boolean", true, true, 47),
    meta("license_header_repeat1", false, false, 48),
    meta("frontmatter_repeat1", false, false, 49),
    meta("template_body_repeat1", false, false, 50),
    meta("block_expression_repeat1", false, false, 51),
    meta("handlebars_block_repeat1", false, false, 52),
    meta("_block_content", false, true, 53),
    meta("else_expression", true, true, 40),
    meta("else_content", true, true, 41),
    meta("block_name", true, true, 56),
    meta("helper_name", true, true, 57),
    meta("key", true, true, 58),
    meta("partial_reference", true, true, 59),
    meta("yaml_content", true, true, 60),
];

/// A named field binding a parent to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u16);

impl FieldId {
    pub const KEY: FieldId = FieldId(1);
    pub const NAME: FieldId = FieldId(2);
    pub const VALUE: FieldId = FieldId(3);

    /// Number of fields, the unused id 0 excluded.
    pub const COUNT: usize = 3;

    /// Field name, `None` for id 0 and unknown ids.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1..=3 => Some(FIELD_NAMES[self.0 as usize]),
            _ => None,
        }
    }

    /// Look up a field by name.
    pub fn for_name(name: &str) -> Option<FieldId> {
        FIELD_NAMES
            .iter()
            .skip(1)
            .position(|n| *n == name)
            .map(|i| FieldId(i as u16 + 1))
    }
}

/// Field names by id; id 0 is reserved.
pub(crate) static FIELD_NAMES: [&str; FieldId::COUNT + 1] = ["", "key", "name", "value"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminals_match_token_kinds() {
        for kind in TokenKind::ALL {
            let symbol = Symbol::from(kind);
            assert!(symbol.is_terminal());
            assert_eq!(symbol.name(), kind.name());
            assert_eq!(symbol.token_kind(), Some(kind));
        }
    }

    #[test]
    fn symbol_classes() {
        assert!(Symbol::DOCUMENT.is_nonterminal());
        assert!(Symbol::ELSE_CONTENT.is_nonterminal());
        assert!(Symbol::BLOCK_NAME.is_alias());
        assert!(Symbol::YAML_CONTENT.is_alias());
        assert!(!Symbol::ERROR.is_alias());
        assert_eq!(Symbol::ERROR.name(), "ERROR");
        assert!(!Symbol::CONTENT.is_visible());
        assert!(!Symbol::FRONTMATTER_REPEAT1.is_visible());
        assert_eq!(Symbol::ELSE_EXPRESSION.public(), Symbol::HANDLEBARS_EXPRESSION);
        assert_eq!(Symbol::all().count(), SYMBOL_COUNT + ALIAS_COUNT);
    }

    #[test]
    fn metadata_ids_are_consistent() {
        for symbol in Symbol::all() {
            let public = symbol.public();
            assert_eq!(public.public(), public, "{symbol:?}");
            if symbol != Symbol::ELSE_EXPRESSION && symbol != Symbol::ELSE_CONTENT {
                assert_eq!(public, symbol, "{}", symbol.name());
            }
        }
        assert_eq!(Symbol::ELSE_CONTENT.public(), Symbol::EXPRESSION_CONTENT);
    }

    #[test]
    fn field_lookup() {
        assert_eq!(FieldId::for_name("name"), Some(FieldId::NAME));
        assert_eq!(FieldId::for_name("value"), Some(FieldId::VALUE));
        assert_eq!(FieldId::for_name(""), None);
        assert_eq!(FieldId::KEY.name(), Some("key"));
        assert_eq!(FieldId(0).name(), None);
    }
}
