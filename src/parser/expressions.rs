//! Expression parsing
//!
//! The precedence ladder from `or` down to `factor`, plus calls, argument lists, strings
//! and the list/dict literals. Every level produces its own node, so a bare name still
//! derives through the whole ladder just as the grammar spells it.
//!
//! # Precedence (low to high)
//!
//! ```text
//! expression  -> or_expr inline_if_else?
//! or_expr     -> bool_term ( "or" bool_term )*
//! bool_term   -> bool_factor ( "and" bool_factor )*
//! bool_factor -> "not" bool_factor | rel_expr
//! rel_expr    -> arith_expr ( relop arith_expr )*
//! arith_expr  -> term ( ( "+" | "-" ) term )*
//! term        -> factor ( ( "*" | "/" | "%" | "//" ) factor )*
//! factor      -> ( "+" | "-" | "~" ) factor | primary ( "**" factor )?
//! ```

use super::errors::{SyntaxErrorKind, TokenDesc};
use super::lexer::TokenKind;
use super::parse::{word_at, Parser};
use super::tree::{NodeKind, ParseTreeNode};

const SYMBOLIC_RELOPS: &[&str] = &["<", ">", "<=", ">=", "==", "!="];
const TERM_OPERATORS: &[&str] = &["*", "/", "%", "//"];
const UNARY_OPERATORS: &[&str] = &["+", "-", "~"];

/// What the current token can start at factor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primary {
    Unary,
    Group,
    List,
    Dict,
    Call,
    Name,
    Literal,
    Str,
    Missing,
}

impl Parser<'_> {
    /// `expression -> or_expr inline_if_else?`
    pub fn parse_expression(&mut self) -> ParseTreeNode {
        let mut node = self.parse_or_expression();
        if self.continues() && self.check_lexeme(TokenKind::Keyword, "if") {
            node.push(self.parse_inline_if_else());
        }
        node
    }

    fn parse_or_expression(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Expression);
        node.push(self.parse_bool_term());
        while self.continues() && self.check_word("or") {
            self.take(&mut node);
            node.push(self.parse_bool_term());
        }
        node
    }

    fn parse_inline_if_else(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::InlineIfElse);
        self.take(&mut node);
        node.push(self.parse_or_expression());
        self.expect_lexeme(&mut node, TokenKind::Keyword, "else");
        if self.enter_nesting() {
            node.push(self.parse_expression());
            self.leave_nesting();
        }
        node
    }

    fn parse_bool_term(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::BoolTerm);
        node.push(self.parse_bool_factor());
        while self.continues() && self.check_word("and") {
            self.take(&mut node);
            node.push(self.parse_bool_factor());
        }
        node
    }

    fn parse_bool_factor(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::BoolFactor);
        // `not in` belongs to the relational level
        if self.check_word("not") && !word_at(self.peek_at(1), "in") {
            self.take(&mut node);
            if self.enter_nesting() {
                node.push(self.parse_bool_factor());
                self.leave_nesting();
            }
        } else {
            node.push(self.parse_rel_expr());
        }
        node
    }

    fn parse_rel_expr(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::RelExpr);
        node.push(self.parse_arith_expr());
        while self.take_relop(&mut node) {
            node.push(self.parse_arith_expr());
        }
        node
    }

    /// Consumes a relational operator, including the two-word `not in` and `is not`.
    fn take_relop(&mut self, node: &mut ParseTreeNode) -> bool {
        if !self.continues() {
            return false;
        }
        let token = self.peek();
        if (token.kind == TokenKind::Operator && SYMBOLIC_RELOPS.contains(&token.lexeme.as_str()))
            || self.check_word("in")
        {
            self.take(node);
            return true;
        }
        if self.check_word("is") {
            self.take(node);
            if self.check_word("not") {
                self.take(node);
            }
            return true;
        }
        if self.check_word("not") && word_at(self.peek_at(1), "in") {
            self.take(node);
            self.take(node);
            return true;
        }
        false
    }

    fn parse_arith_expr(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ArithExpr);
        node.push(self.parse_term());
        while self.continues()
            && (self.check_lexeme(TokenKind::Operator, "+")
                || self.check_lexeme(TokenKind::Operator, "-"))
        {
            self.take(&mut node);
            node.push(self.parse_term());
        }
        node
    }

    fn parse_term(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Term);
        node.push(self.parse_factor());
        while self.continues()
            && self.check(TokenKind::Operator)
            && TERM_OPERATORS.contains(&self.peek().lexeme.as_str())
        {
            self.take(&mut node);
            node.push(self.parse_factor());
        }
        node
    }

    fn primary(&self) -> Primary {
        let token = self.peek();
        match (token.kind, token.lexeme.as_str()) {
            (TokenKind::Operator, op) if UNARY_OPERATORS.contains(&op) => Primary::Unary,
            (TokenKind::Delimiter, "(") => Primary::Group,
            (TokenKind::Delimiter, "[") => Primary::List,
            (TokenKind::Delimiter, "{") => Primary::Dict,
            (TokenKind::Identifier, _) if self.is_call_ahead() => Primary::Call,
            (TokenKind::Identifier, _) => Primary::Name,
            (TokenKind::Number | TokenKind::Ellipsis, _) => Primary::Literal,
            (TokenKind::Keyword, "True" | "False" | "None") => Primary::Literal,
            (TokenKind::StringQuote | TokenKind::StringLiteral, _) => Primary::Str,
            _ => Primary::Missing,
        }
    }

    fn parse_factor(&mut self) -> ParseTreeNode {
        if !self.enter_nesting() {
            return ParseTreeNode::new(NodeKind::Factor);
        }
        let node = self.parse_nested_factor();
        self.leave_nesting();
        node
    }

    fn parse_nested_factor(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Factor);
        match self.primary() {
            Primary::Unary => {
                self.take(&mut node);
                node.push(self.parse_factor());
                return node;
            }
            Primary::Group => self.parse_group(&mut node),
            Primary::List => node.push(self.parse_list_literal()),
            Primary::Dict => node.push(self.parse_dict_literal()),
            Primary::Call => {
                node.push(self.parse_func_call());
                self.parse_trailers(&mut node);
            }
            Primary::Name => {
                self.take(&mut node);
                self.parse_trailers(&mut node);
            }
            Primary::Literal => self.take(&mut node),
            Primary::Str => node.push(self.parse_string()),
            Primary::Missing => {
                let found = TokenDesc::of(self.peek());
                if !self.recovering {
                    self.report(SyntaxErrorKind::ExpectedFactor(found));
                    self.synchronize();
                }
                return node;
            }
        }

        if self.continues() && self.check_lexeme(TokenKind::Operator, "**") {
            self.take(&mut node);
            node.push(self.parse_factor());
        }
        node
    }

    /// `( expression ("," expression)* ","? )`, also the empty tuple `()`.
    fn parse_group(&mut self, node: &mut ParseTreeNode) {
        self.take(node);
        if !self.check_lexeme(TokenKind::Delimiter, ")") {
            node.push(self.parse_expression());
            while self.check_lexeme(TokenKind::Delimiter, ",") {
                self.take(node);
                if self.check_lexeme(TokenKind::Delimiter, ")") {
                    break;
                }
                node.push(self.parse_expression());
            }
        }
        self.expect_lexeme(node, TokenKind::Delimiter, ")");
    }

    /// `( "." IDENT | "[" expression "]" | "(" argument_list? ")" )*`
    fn parse_trailers(&mut self, node: &mut ParseTreeNode) {
        while self.continues() {
            if self.check_lexeme(TokenKind::Delimiter, ".") {
                self.take(node);
                self.expect(node, TokenKind::Identifier);
            } else if self.check_lexeme(TokenKind::Delimiter, "[") {
                self.take(node);
                node.push(self.parse_expression());
                self.expect_lexeme(node, TokenKind::Delimiter, "]");
            } else if self.check_lexeme(TokenKind::Delimiter, "(") {
                self.take(node);
                if !self.check_lexeme(TokenKind::Delimiter, ")") {
                    node.push(self.parse_argument_list());
                }
                self.expect_lexeme(node, TokenKind::Delimiter, ")");
            } else {
                break;
            }
        }
    }

    /// One or more adjacent string literals: `QUOTE LITERAL? QUOTE`.
    pub(crate) fn parse_string(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Str);
        if self.check(TokenKind::StringLiteral) {
            self.take(&mut node);
            return node;
        }
        while self.check(TokenKind::StringQuote) {
            self.take(&mut node);
            if self.check(TokenKind::StringLiteral) {
                self.take(&mut node);
            }
            if !self.expect(&mut node, TokenKind::StringQuote) {
                break;
            }
        }
        node
    }

    /// `name ( "." name )* "(" argument_list? ")"`
    pub(crate) fn parse_func_call(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::FuncCall);
        self.expect(&mut node, TokenKind::Identifier);
        while self.check_lexeme(TokenKind::Delimiter, ".") {
            self.take(&mut node);
            self.expect(&mut node, TokenKind::Identifier);
        }
        self.expect_lexeme(&mut node, TokenKind::Delimiter, "(");
        if !self.check_lexeme(TokenKind::Delimiter, ")") {
            node.push(self.parse_argument_list());
        }
        self.expect_lexeme(&mut node, TokenKind::Delimiter, ")");
        node
    }

    /// `argument ( "," argument )* ","?`
    fn parse_argument_list(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ArgumentList);
        self.parse_argument(&mut node);
        while self.check_lexeme(TokenKind::Delimiter, ",") {
            self.take(&mut node);
            if self.check_lexeme(TokenKind::Delimiter, ")") {
                break;
            }
            self.parse_argument(&mut node);
        }
        node
    }

    /// `IDENT "=" expression | ("*" | "**")? expression`
    fn parse_argument(&mut self, list: &mut ParseTreeNode) {
        if self.check(TokenKind::Identifier) && self.peek_at(1).is(TokenKind::Operator, "=") {
            let mut keyword = ParseTreeNode::new(NodeKind::KeywordArgument);
            self.take(&mut keyword);
            self.take(&mut keyword);
            keyword.push(self.parse_expression());
            list.push(keyword);
            return;
        }
        if self.check_lexeme(TokenKind::Operator, "*")
            || self.check_lexeme(TokenKind::Operator, "**")
        {
            self.take(list);
        }
        list.push(self.parse_expression());
    }

    /// `"[" ( expression ( "," expression )* ","? )? "]"`
    fn parse_list_literal(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ListLiteral);
        self.take(&mut node);
        if !self.check_lexeme(TokenKind::Delimiter, "]") {
            node.push(self.parse_expression());
            while self.check_lexeme(TokenKind::Delimiter, ",") {
                self.take(&mut node);
                if self.check_lexeme(TokenKind::Delimiter, "]") {
                    break;
                }
                node.push(self.parse_expression());
            }
        }
        self.expect_lexeme(&mut node, TokenKind::Delimiter, "]");
        node
    }

    /// `"{" ( dict_pair ( "," dict_pair )* ","? )? "}"`
    fn parse_dict_literal(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::DictLiteral);
        self.take(&mut node);
        if !self.check_lexeme(TokenKind::Delimiter, "}") {
            node.push(self.parse_dict_pair());
            while self.check_lexeme(TokenKind::Delimiter, ",") {
                self.take(&mut node);
                if self.check_lexeme(TokenKind::Delimiter, "}") {
                    break;
                }
                node.push(self.parse_dict_pair());
            }
        }
        self.expect_lexeme(&mut node, TokenKind::Delimiter, "}");
        node
    }

    /// `key ":" expression`. Keys are restricted to strings, names, zero-argument calls,
    /// numbers and `True`/`False`/`None`.
    fn parse_dict_pair(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::DictPair);
        let key = self.peek();
        let location = key.location;
        let constant = key.kind == TokenKind::Keyword
            && matches!(key.lexeme.as_str(), "True" | "False" | "None");

        match key.kind {
            TokenKind::StringQuote | TokenKind::StringLiteral => {
                let mut string_key = ParseTreeNode::new(NodeKind::StringKey);
                string_key.push(self.parse_string());
                node.push(string_key);
            }
            TokenKind::Identifier if self.is_call_ahead() => {
                let call = self.parse_func_call();
                if call.child(NodeKind::ArgumentList).is_some() {
                    self.report_at(
                        SyntaxErrorKind::InvalidDictKey("call with arguments".to_string()),
                        location,
                    );
                }
                node.push(call);
            }
            TokenKind::Identifier | TokenKind::Number => self.take(&mut node),
            _ if constant => self.take(&mut node),
            _ => {
                let found = TokenDesc::of(self.peek()).to_string();
                self.report(SyntaxErrorKind::InvalidDictKey(found));
                self.synchronize();
                return node;
            }
        }

        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        node.push(self.parse_expression());
        node
    }
}
