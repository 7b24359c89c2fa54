//! Kind-indexed field table and the typed views generated from it.
//!
//! Every fixed-shape node kind is listed once in `syntax_nodes!` with its
//! fields in child order. The builder validates shapes against
//! [`SyntaxKind::fields`]. Each listed kind also gets a `Copy` wrapper whose
//! accessors return the positional child.

use crate::SyntaxKind::*;
use crate::{NodeOrToken, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxSet, SyntaxToken};

/// What a field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Token,
    Node,
    Any,
}

impl FieldCategory {
    #[inline]
    pub fn accepts<N, T>(self, element: &NodeOrToken<N, T>) -> bool {
        matches!(
            (self, element),
            (Self::Any, _) | (Self::Token, NodeOrToken::Token(_)) | (Self::Node, NodeOrToken::Node(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: &'static str,
    pub category: FieldCategory,
}

/// Handle type a field accessor returns.
pub trait FieldValue<'t>: Sized {
    const CATEGORY: FieldCategory;

    fn from_element(element: SyntaxElement<'t>) -> Option<Self>;
}

impl<'t> FieldValue<'t> for SyntaxToken<'t> {
    const CATEGORY: FieldCategory = FieldCategory::Token;

    #[inline]
    fn from_element(element: SyntaxElement<'t>) -> Option<Self> {
        element.into_token()
    }
}

impl<'t> FieldValue<'t> for SyntaxNode<'t> {
    const CATEGORY: FieldCategory = FieldCategory::Node;

    #[inline]
    fn from_element(element: SyntaxElement<'t>) -> Option<Self> {
        element.into_node()
    }
}

impl<'t> FieldValue<'t> for SyntaxElement<'t> {
    const CATEGORY: FieldCategory = FieldCategory::Any;

    #[inline]
    fn from_element(element: SyntaxElement<'t>) -> Option<Self> {
        Some(element)
    }
}

pub trait AstNode<'t>: Copy {
    const KIND: SyntaxKind;

    fn cast(syntax: SyntaxNode<'t>) -> Option<Self>;

    fn syntax(self) -> SyntaxNode<'t>;
}

/// Position of field `name` in nodes of `kind`.
pub fn field_index(kind: SyntaxKind, name: &str) -> Option<usize> {
    kind.fields()?.iter().position(|field| field.name == name)
}

macro_rules! syntax_nodes {
    ($(
        $(#[$meta:meta])*
        $kind:ident => $name:ident {
            $($index:literal => $field:ident: $ty:ident),* $(,)?
        }
    )*) => {
        impl SyntaxKind {
            /// Field layout of a fixed-shape node kind; `None` for tokens and
            /// free-form kinds.
            pub fn fields(self) -> Option<&'static [Field]> {
                match self {
                    $(
                        $kind => {
                            const FIELDS: &[Field] = &[$(Field {
                                name: stringify!($field),
                                category: <$ty<'static> as FieldValue<'static>>::CATEGORY,
                            }),*];
                            Some(FIELDS)
                        }
                    )*
                    _ => None,
                }
            }
        }

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name<'t>(SyntaxNode<'t>);

            impl<'t> AstNode<'t> for $name<'t> {
                const KIND: SyntaxKind = $kind;

                #[inline]
                fn cast(syntax: SyntaxNode<'t>) -> Option<Self> {
                    (syntax.kind() == $kind).then_some(Self(syntax))
                }

                #[inline]
                fn syntax(self) -> SyntaxNode<'t> {
                    self.0
                }
            }

            impl<'t> $name<'t> {
                $(
                    #[inline]
                    pub fn $field(self) -> Option<$ty<'t>> {
                        self.0.child($index).and_then(FieldValue::from_element)
                    }
                )*
            }
        )*

        /// Typed view over any fixed-shape node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum AnyNode<'t> {
            $($name($name<'t>),)*
        }

        impl<'t> AnyNode<'t> {
            pub fn cast(syntax: SyntaxNode<'t>) -> Option<Self> {
                match syntax.kind() {
                    $($kind => Some(Self::$name($name(syntax))),)*
                    _ => None,
                }
            }

            pub fn syntax(self) -> SyntaxNode<'t> {
                match self {
                    $(Self::$name(node) => node.0,)*
                }
            }
        }
    };
}

syntax_nodes! {
    MODULE_PART => ModulePart {
        0 => members: SyntaxNode,
        1 => eof_token: SyntaxToken,
    }
    ASSIGNMENT_STATEMENT => AssignmentStatement {
        0 => var_ref: SyntaxNode,
        1 => equals_token: SyntaxToken,
        2 => expression: SyntaxNode,
        3 => semicolon_token: SyntaxToken,
    }
    EXPRESSION_STATEMENT => ExpressionStatement {
        0 => expression: SyntaxNode,
        1 => semicolon_token: SyntaxToken,
    }
    /// `return expr;`; the expression slot may hold a missing token.
    RETURN_STATEMENT => ReturnStatement {
        0 => return_keyword: SyntaxToken,
        1 => expression: SyntaxElement,
        2 => semicolon_token: SyntaxToken,
    }
    /// `<- peer` or `<- { a: peer, .. }`.
    RECEIVE_ACTION => ReceiveAction {
        0 => left_arrow: SyntaxToken,
        1 => receive_workers: SyntaxNode,
    }
    RECEIVE_FIELDS => ReceiveFields {
        0 => open_brace: SyntaxToken,
        1 => receive_fields: SyntaxNode,
        2 => close_brace: SyntaxToken,
    }
    RECEIVE_FIELD => ReceiveField {
        0 => field_name: SyntaxNode,
        1 => colon: SyntaxToken,
        2 => peer_worker: SyntaxNode,
    }
    BINARY_EXPRESSION => BinaryExpression {
        0 => lhs_expr: SyntaxNode,
        1 => operator: SyntaxToken,
        2 => rhs_expr: SyntaxNode,
    }
    BRACED_EXPRESSION => BracedExpression {
        0 => open_paren: SyntaxToken,
        1 => expression: SyntaxNode,
        2 => close_paren: SyntaxToken,
    }
    SIMPLE_NAME_REFERENCE => SimpleNameReference {
        0 => name: SyntaxToken,
    }
    NUMERIC_LITERAL => NumericLiteral {
        0 => literal_token: SyntaxToken,
    }
    STRING_LITERAL => StringLiteral {
        0 => content: SyntaxToken,
    }
}

/// Node kinds that may stand in expression position.
pub const EXPRESSIONS: SyntaxSet = SyntaxSet::new([
    BINARY_EXPRESSION,
    BRACED_EXPRESSION,
    SIMPLE_NAME_REFERENCE,
    NUMERIC_LITERAL,
    STRING_LITERAL,
    RECEIVE_ACTION,
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expression<'t> {
    Binary(BinaryExpression<'t>),
    Braced(BracedExpression<'t>),
    Name(SimpleNameReference<'t>),
    Numeric(NumericLiteral<'t>),
    String(StringLiteral<'t>),
    Receive(ReceiveAction<'t>),
}

impl<'t> Expression<'t> {
    pub fn cast(syntax: SyntaxNode<'t>) -> Option<Self> {
        if !EXPRESSIONS.contains(syntax.kind()) {
            return None;
        }
        Some(match AnyNode::cast(syntax)? {
            AnyNode::BinaryExpression(node) => Self::Binary(node),
            AnyNode::BracedExpression(node) => Self::Braced(node),
            AnyNode::SimpleNameReference(node) => Self::Name(node),
            AnyNode::NumericLiteral(node) => Self::Numeric(node),
            AnyNode::StringLiteral(node) => Self::String(node),
            AnyNode::ReceiveAction(node) => Self::Receive(node),
            _ => return None,
        })
    }

    pub fn syntax(self) -> SyntaxNode<'t> {
        match self {
            Self::Binary(node) => node.syntax(),
            Self::Braced(node) => node.syntax(),
            Self::Name(node) => node.syntax(),
            Self::Numeric(node) => node.syntax(),
            Self::String(node) => node.syntax(),
            Self::Receive(node) => node.syntax(),
        }
    }
}

impl<'t> BinaryExpression<'t> {
    pub fn lhs(self) -> Option<Expression<'t>> {
        self.lhs_expr().and_then(Expression::cast)
    }

    pub fn rhs(self) -> Option<Expression<'t>> {
        self.rhs_expr().and_then(Expression::cast)
    }
}

impl<'t> ModulePart<'t> {
    /// Statements listed under `members`.
    pub fn statements(self) -> impl Iterator<Item = AnyNode<'t>> {
        self.members().into_iter().flat_map(SyntaxNode::child_nodes).filter_map(AnyNode::cast)
    }
}
