//! Statement parsing
//!
//! Statement dispatch, simple statements (assignments, calls, `return`, `del`,
//! `break`/`continue`/`pass`), the `if`/`while`/`for` compound statements and the
//! indented blocks they share.
//!
//! # Grammar
//!
//! ```text
//! statement      -> assignment | augmented_assignment | call NEWLINE
//!                 | if_stmt | while_stmt | for_stmt | func_def | class_def | try_stmt
//!                 | import_stmt | return_stmt | del_stmt | break_stmt | continue_stmt
//!                 | pass_stmt | NEWLINE
//! assignment     -> assign_target "=" expression NEWLINE
//! assign_target  -> IDENT ( "." IDENT | "[" expression "]" )*
//! block          -> NEWLINE INDENT statement_list DEDENT
//! if_stmt        -> "if" expression ":" block elif_stmt* else_part?
//! while_stmt     -> "while" expression ":" loop_block
//! for_stmt       -> "for" IDENT ("," IDENT)* "in" expression ":" loop_block
//! ```

use super::errors::{SyntaxErrorKind, TokenDesc};
use super::lexer::TokenKind;
use super::parse::Parser;
use super::tree::{NodeKind, ParseTreeNode};

/// Keywords that start statements this grammar does not cover.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "with", "lambda", "yield", "raise", "global", "nonlocal", "assert", "async", "await",
];

impl Parser<'_> {
    /// Parses one statement. Returns `None` when the statement was swallowed by error
    /// recovery.
    pub fn parse_statement(&mut self) -> Option<ParseTreeNode> {
        if self.recovering {
            self.recovering = false;
            return None;
        }

        match self.peek().kind {
            TokenKind::Newline => {
                let blank = ParseTreeNode::leaf(self.peek());
                self.advance();
                Some(blank)
            }
            TokenKind::Identifier => self.parse_identifier_statement(),
            TokenKind::Keyword => self.parse_keyword_statement(),
            _ => self.unexpected_statement(),
        }
    }

    fn parse_identifier_statement(&mut self) -> Option<ParseTreeNode> {
        let plain = self.assignment_operator().map(|op| op.lexeme == "=");
        match plain {
            Some(true) => Some(self.parse_assignment()),
            Some(false) => Some(self.parse_augmented_assignment()),
            None if self.is_call_ahead() => {
                let mut call = self.parse_func_call();
                self.expect(&mut call, TokenKind::Newline);
                Some(call)
            }
            None => self.unexpected_statement(),
        }
    }

    fn parse_keyword_statement(&mut self) -> Option<ParseTreeNode> {
        let keyword = self.peek().lexeme.clone();
        let node = match keyword.as_str() {
            "if" => self.parse_if_stmt(),
            "while" => self.parse_while_stmt(),
            "for" => self.parse_for_stmt(),
            "def" => self.parse_func_def(),
            "class" => self.parse_class_def(),
            "try" => self.parse_try_stmt(),
            "import" | "from" => self.parse_import_stmt(),
            "return" => self.parse_return_stmt(),
            "del" => self.parse_del_stmt(),
            "pass" => self.parse_pass_stmt(),
            "break" => self.parse_loop_control(NodeKind::BreakStmt),
            "continue" => self.parse_loop_control(NodeKind::ContinueStmt),
            word if UNSUPPORTED_KEYWORDS.contains(&word) => {
                self.report(SyntaxErrorKind::Unsupported(format!("'{word}' statement")));
                self.synchronize();
                return None;
            }
            _ => return self.unexpected_statement(),
        };
        Some(node)
    }

    fn unexpected_statement(&mut self) -> Option<ParseTreeNode> {
        let found = TokenDesc::of(self.peek());
        self.report(SyntaxErrorKind::UnexpectedToken(found));
        self.synchronize();
        None
    }

    /// `statement_list -> statement*` up to the closing `Dedent`.
    pub fn parse_statement_list(&mut self) -> Option<ParseTreeNode> {
        self.statement_list(NodeKind::StatementList)
    }

    /// Same as [`Parser::parse_statement_list`], labelled as a loop body.
    pub fn parse_loop_statement_list(&mut self) -> Option<ParseTreeNode> {
        self.statement_list(NodeKind::LoopStatementList)
    }

    fn statement_list(&mut self, kind: NodeKind) -> Option<ParseTreeNode> {
        if self.recovering {
            self.recovering = false;
            return None;
        }

        let mut list = ParseTreeNode::new(kind);
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            if let Some(statement) = self.parse_statement() {
                list.push(statement);
            }
        }
        Some(list)
    }

    /// `NEWLINE INDENT statement_list DEDENT`, appended to `node`. `body` picks the
    /// statement-list label.
    pub(crate) fn parse_block(&mut self, node: &mut ParseTreeNode, body: NodeKind) {
        self.expect(node, TokenKind::Newline);
        if !self.expect(node, TokenKind::Indent) {
            return;
        }

        let list = if body == NodeKind::LoopStatementList {
            self.parse_loop_statement_list()
        } else {
            self.parse_statement_list()
        };
        if let Some(list) = list {
            node.push(list);
        }
        self.expect(node, TokenKind::Dedent);
    }

    fn parse_assignment(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Assignment);
        node.push(self.parse_assign_target());
        self.expect_lexeme(&mut node, TokenKind::Operator, "=");
        node.push(self.parse_expression());
        self.expect(&mut node, TokenKind::Newline);
        node
    }

    fn parse_augmented_assignment(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::AugmentedAssignment);
        node.push(self.parse_assign_target());
        // the look-ahead already proved an augmented operator sits here
        self.take(&mut node);
        node.push(self.parse_expression());
        self.expect(&mut node, TokenKind::Newline);
        node
    }

    fn parse_assign_target(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::AssignTarget);
        self.expect(&mut node, TokenKind::Identifier);
        self.parse_target_trailers(&mut node);
        node
    }

    /// `( "." IDENT | "[" expression "]" )*`
    fn parse_target_trailers(&mut self, node: &mut ParseTreeNode) {
        loop {
            if self.check_lexeme(TokenKind::Delimiter, ".") {
                self.take(node);
                self.expect(node, TokenKind::Identifier);
            } else if self.check_lexeme(TokenKind::Delimiter, "[") {
                self.take(node);
                node.push(self.parse_expression());
                self.expect_lexeme(node, TokenKind::Delimiter, "]");
            } else {
                break;
            }
        }
    }

    fn parse_return_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ReturnStmt);
        self.take(&mut node);
        if !self.check(TokenKind::Newline) && !self.check(TokenKind::Dedent) && !self.is_at_end()
        {
            node.push(self.parse_expression());
        }
        self.expect(&mut node, TokenKind::Newline);
        node
    }

    fn parse_if_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::IfStmt);
        self.take(&mut node);
        node.push(self.parse_expression());
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::StatementList);

        while self.check_lexeme(TokenKind::Keyword, "elif") {
            let mut elif = ParseTreeNode::new(NodeKind::ElifStmt);
            self.take(&mut elif);
            elif.push(self.parse_expression());
            self.expect_lexeme(&mut elif, TokenKind::Operator, ":");
            self.parse_block(&mut elif, NodeKind::StatementList);
            node.push(elif);
        }

        if self.check_lexeme(TokenKind::Keyword, "else") {
            node.push(self.parse_else_part(NodeKind::StatementList));
        }
        node
    }

    /// `"else" ":" block`
    pub(crate) fn parse_else_part(&mut self, body: NodeKind) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ElsePart);
        self.take(&mut node);
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, body);
        node
    }

    fn parse_while_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::WhileStmt);
        self.take(&mut node);
        node.push(self.parse_expression());
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::LoopStatementList);
        node
    }

    fn parse_for_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ForStmt);
        self.take(&mut node);
        self.expect(&mut node, TokenKind::Identifier);
        while self.check_lexeme(TokenKind::Delimiter, ",") {
            self.take(&mut node);
            self.expect(&mut node, TokenKind::Identifier);
        }
        self.expect_lexeme(&mut node, TokenKind::Keyword, "in");
        node.push(self.parse_expression());
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::LoopStatementList);
        node
    }

    /// `break` / `continue`, rejected outside a loop body.
    fn parse_loop_control(&mut self, kind: NodeKind) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(kind);
        let keyword = self.peek().lexeme.clone();
        let location = self.peek().location;
        let inside = self.is_inside_loop();
        self.take(&mut node);

        if inside {
            self.expect(&mut node, TokenKind::Newline);
        } else {
            self.report_at(SyntaxErrorKind::OutsideLoop(keyword), location);
            self.synchronize();
        }
        node
    }

    fn parse_del_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::DelStmt);
        self.take(&mut node);
        node.push(self.parse_del_target());
        while self.check_lexeme(TokenKind::Delimiter, ",") {
            self.take(&mut node);
            node.push(self.parse_del_target());
        }
        self.expect(&mut node, TokenKind::Newline);
        node
    }

    fn parse_del_target(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::DelTarget);
        self.expect(&mut node, TokenKind::Identifier);
        self.parse_target_trailers(&mut node);
        node
    }

    fn parse_pass_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::PassStmt);
        self.take(&mut node);
        self.expect(&mut node, TokenKind::Newline);
        node
    }
}
