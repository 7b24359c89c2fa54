/// Grammatical category of a node or token.
///
/// Token kinds come first, node kinds after `EOF_TOKEN`.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_ARROW_TOKEN,
    RIGHT_ARROW_TOKEN,
    OPEN_BRACE_TOKEN,
    CLOSE_BRACE_TOKEN,
    OPEN_PAREN_TOKEN,
    CLOSE_PAREN_TOKEN,
    COMMA_TOKEN,
    COLON_TOKEN,
    SEMICOLON_TOKEN,
    EQUAL_TOKEN,
    PLUS_TOKEN,
    MINUS_TOKEN,
    ASTERISK_TOKEN,
    SLASH_TOKEN,

    FUNCTION_KEYWORD,
    RETURN_KEYWORD,
    WORKER_KEYWORD,

    IDENTIFIER_TOKEN,
    DECIMAL_INTEGER_LITERAL_TOKEN,
    STRING_LITERAL_TOKEN,
    INVALID_TOKEN,
    EOF_TOKEN,

    MODULE_PART,
    ASSIGNMENT_STATEMENT,
    EXPRESSION_STATEMENT,
    RETURN_STATEMENT,
    RECEIVE_ACTION,
    RECEIVE_FIELDS,
    RECEIVE_FIELD,
    BINARY_EXPRESSION,
    BRACED_EXPRESSION,
    SIMPLE_NAME_REFERENCE,
    NUMERIC_LITERAL,
    STRING_LITERAL,
    LIST,
    ERROR,
}

impl SyntaxKind {
    #[inline]
    pub const fn is_token(self) -> bool {
        self as u16 <= Self::EOF_TOKEN as u16
    }

    #[inline]
    pub const fn is_node(self) -> bool {
        !self.is_token()
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        matches!(self, Self::FUNCTION_KEYWORD | Self::RETURN_KEYWORD | Self::WORKER_KEYWORD)
    }

    #[inline]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::LIST)
    }

    /// `LIST` and `ERROR` accept any children; every other node kind may
    /// have a fixed shape in the field table.
    #[inline]
    pub const fn is_free_form(self) -> bool {
        matches!(self, Self::LIST | Self::ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::SyntaxKind::*;

    #[test]
    fn token_and_node_kinds_are_disjoint() {
        assert!(LEFT_ARROW_TOKEN.is_token());
        assert!(EOF_TOKEN.is_token());
        assert!(WORKER_KEYWORD.is_keyword());
        assert!(MODULE_PART.is_node());
        assert!(RECEIVE_ACTION.is_node());
        assert!(!LIST.is_token());
        assert!(LIST.is_free_form());
        assert!(LIST.is_list());
        assert!(!ERROR.is_list());
        assert!(!RECEIVE_ACTION.is_free_form());
    }
}
