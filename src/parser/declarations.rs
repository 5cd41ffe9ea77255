//! Declaration parsing
//!
//! Function and class definitions, `import`/`from` statements and `try` blocks.
//!
//! # Grammar
//!
//! ```text
//! func_def      -> "def" IDENT "(" param_list ")" ( "->" type )? ":" ( block | statement )
//! param_list    -> ( param ( "," param )* ","? )?
//! param         -> ( "*" | "**" )? IDENT ( ":" type )? ( "=" expression )?
//! type          -> ( IDENT ( "." IDENT )* | "None" ) ( "[" type ( "," type )* "]" )?
//! class_def     -> "class" IDENT class_inheritance? ":" block
//! import_stmt   -> "import" import_item ( "," import_item )* NEWLINE
//!                | "from" "."* dotted "import" ( "*" | items | "(" items ")" ) NEWLINE
//! import_item   -> dotted import_alias?
//! try_stmt      -> "try" ":" block except_clauses else_part? finally_clause?
//! except_clause -> "except" expression? ( "as" IDENT )? ":" block
//! ```

use super::errors::{SyntaxErrorKind, TokenDesc};
use super::lexer::TokenKind;
use super::parse::Parser;
use super::tree::{NodeKind, ParseTreeNode};

impl Parser<'_> {
    pub(crate) fn parse_func_def(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::FuncDef);
        self.take(&mut node);
        self.expect(&mut node, TokenKind::Identifier);
        self.expect_lexeme(&mut node, TokenKind::Delimiter, "(");
        node.push(self.parse_param_list());
        self.expect_lexeme(&mut node, TokenKind::Delimiter, ")");

        if self.check_lexeme(TokenKind::Operator, "->") {
            self.take(&mut node);
            node.push(self.parse_type());
        }
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");

        if self.check(TokenKind::Newline) || self.recovering {
            self.parse_block(&mut node, NodeKind::StatementList);
        } else {
            let mut body = ParseTreeNode::new(NodeKind::StatementList);
            if let Some(statement) = self.parse_statement() {
                body.push(statement);
            }
            node.push(body);
        }
        node
    }

    fn parse_param_list(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ParamList);
        if self.check_lexeme(TokenKind::Delimiter, ")") {
            return node;
        }

        node.push(self.parse_param());
        while self.check_lexeme(TokenKind::Delimiter, ",") {
            self.take(&mut node);
            if self.check_lexeme(TokenKind::Delimiter, ")") {
                break;
            }
            node.push(self.parse_param());
        }
        node
    }

    fn parse_param(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Param);
        if self.check_lexeme(TokenKind::Operator, "*")
            || self.check_lexeme(TokenKind::Operator, "**")
        {
            self.take(&mut node);
        }
        self.expect(&mut node, TokenKind::Identifier);

        if self.check_lexeme(TokenKind::Operator, ":") {
            self.take(&mut node);
            node.push(self.parse_type());
        }
        if self.check_lexeme(TokenKind::Operator, "=") {
            self.take(&mut node);
            node.push(self.parse_expression());
        }
        node
    }

    fn parse_type(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::Type);
        if self.check_lexeme(TokenKind::Keyword, "None") {
            self.take(&mut node);
        } else {
            self.expect(&mut node, TokenKind::Identifier);
            while self.check_lexeme(TokenKind::Delimiter, ".") {
                self.take(&mut node);
                self.expect(&mut node, TokenKind::Identifier);
            }
        }

        if self.check_lexeme(TokenKind::Delimiter, "[") {
            self.take(&mut node);
            node.push(self.parse_type());
            while self.check_lexeme(TokenKind::Delimiter, ",") {
                self.take(&mut node);
                node.push(self.parse_type());
            }
            self.expect_lexeme(&mut node, TokenKind::Delimiter, "]");
        }
        node
    }

    pub(crate) fn parse_class_def(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ClassDef);
        self.take(&mut node);
        self.expect(&mut node, TokenKind::Identifier);
        if self.check_lexeme(TokenKind::Delimiter, "(") {
            node.push(self.parse_class_inheritance());
        }
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::StatementList);
        node
    }

    /// `"(" ( IDENT ( "," IDENT )* )? ")"`
    fn parse_class_inheritance(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ClassInheritance);
        self.take(&mut node);
        if !self.check_lexeme(TokenKind::Delimiter, ")") {
            self.parse_dotted_name(&mut node);
            while self.check_lexeme(TokenKind::Delimiter, ",") {
                self.take(&mut node);
                self.parse_dotted_name(&mut node);
            }
        }
        self.expect_lexeme(&mut node, TokenKind::Delimiter, ")");
        node
    }

    /// `IDENT ( "." IDENT )*`, appended to `node`.
    fn parse_dotted_name(&mut self, node: &mut ParseTreeNode) {
        self.expect(node, TokenKind::Identifier);
        while self.check_lexeme(TokenKind::Delimiter, ".") {
            self.take(node);
            self.expect(node, TokenKind::Identifier);
        }
    }

    pub(crate) fn parse_import_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ImportStmt);
        if self.check_lexeme(TokenKind::Keyword, "from") {
            self.take(&mut node);
            // relative imports: `from . import x`, `from ..pkg import y`
            let mut relative = false;
            while self.check_lexeme(TokenKind::Delimiter, ".") || self.check(TokenKind::Ellipsis)
            {
                self.take(&mut node);
                relative = true;
            }
            if !relative || self.check(TokenKind::Identifier) {
                self.parse_dotted_name(&mut node);
            }
            self.expect_lexeme(&mut node, TokenKind::Keyword, "import");

            if self.check_lexeme(TokenKind::Operator, "*") {
                self.take(&mut node);
            } else if self.check_lexeme(TokenKind::Delimiter, "(") {
                self.take(&mut node);
                self.parse_import_items(&mut node);
                self.expect_lexeme(&mut node, TokenKind::Delimiter, ")");
            } else {
                self.parse_import_items(&mut node);
            }
        } else {
            self.take(&mut node);
            self.parse_import_items(&mut node);
        }
        self.expect(&mut node, TokenKind::Newline);
        node
    }

    fn parse_import_items(&mut self, node: &mut ParseTreeNode) {
        node.push(self.parse_import_item());
        while self.check_lexeme(TokenKind::Delimiter, ",") {
            self.take(node);
            if self.check_lexeme(TokenKind::Delimiter, ")") {
                break;
            }
            node.push(self.parse_import_item());
        }
    }

    fn parse_import_item(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ImportItem);
        self.parse_dotted_name(&mut node);
        if self.check_lexeme(TokenKind::Keyword, "as") {
            let mut alias = ParseTreeNode::new(NodeKind::ImportAlias);
            self.take(&mut alias);
            self.expect(&mut alias, TokenKind::Identifier);
            node.push(alias);
        }
        node
    }

    pub(crate) fn parse_try_stmt(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::TryStmt);
        self.take(&mut node);
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::StatementList);

        let mut clauses = ParseTreeNode::new(NodeKind::ExceptClauses);
        while self.check_lexeme(TokenKind::Keyword, "except") {
            clauses.push(self.parse_except_clause());
        }
        let handled = !clauses.children.is_empty();
        node.push(clauses);

        if handled && self.check_lexeme(TokenKind::Keyword, "else") {
            node.push(self.parse_else_part(NodeKind::StatementList));
        }
        if self.check_lexeme(TokenKind::Keyword, "finally") {
            node.push(self.parse_finally_clause());
        } else if !handled && !self.recovering {
            // the body is closed and the cursor is on the next statement: no skipping
            let found = TokenDesc::of(self.peek());
            self.report(SyntaxErrorKind::Expected {
                expected: TokenDesc::exact(TokenKind::Keyword, "except"),
                found,
            });
        }
        node
    }

    fn parse_except_clause(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::ExceptClause);
        self.take(&mut node);
        if !self.check_lexeme(TokenKind::Operator, ":") && !self.check_lexeme(TokenKind::Keyword, "as")
        {
            node.push(self.parse_expression());
        }
        if self.check_lexeme(TokenKind::Keyword, "as") {
            self.take(&mut node);
            self.expect(&mut node, TokenKind::Identifier);
        }
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::StatementList);
        node
    }

    fn parse_finally_clause(&mut self) -> ParseTreeNode {
        let mut node = ParseTreeNode::new(NodeKind::FinallyClause);
        self.take(&mut node);
        self.expect_lexeme(&mut node, TokenKind::Operator, ":");
        self.parse_block(&mut node, NodeKind::StatementList);
        node
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::errors::SyntaxErrorKind;
    use crate::parser::lexer::{tokenize, TokenKind};
    use crate::parser::parse::{parse, Parsed};
    use crate::parser::tree::NodeKind;

    fn parse_source(source: &str) -> Parsed {
        parse(&tokenize(source).tokens)
    }

    #[test]
    fn test_func_def_with_annotations() {
        let source = "def area(w: int, h: float = 1.0, *rest, **opts) -> Dict[str, int]:\n    return w * h\n";
        let parsed = parse_source(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let def = &parsed.root.children[0];
        assert_eq!(def.kind, NodeKind::FuncDef);
        let params = def.child(NodeKind::ParamList).expect("params");
        let count = params
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::Param)
            .count();
        assert_eq!(count, 4);
        assert!(def.child(NodeKind::Type).is_some());
        assert!(def.child(NodeKind::StatementList).is_some());
    }

    #[test]
    fn test_one_line_def() {
        let parsed = parse_source("def f(): return 1\nx = f()\n");
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let body = parsed.root.children[0]
            .child(NodeKind::StatementList)
            .expect("body");
        assert_eq!(body.children[0].kind, NodeKind::ReturnStmt);
        assert_eq!(parsed.root.children[1].kind, NodeKind::Assignment);
    }

    #[test]
    fn test_class_def() {
        let source = "class Point(Base, abc.ABC):\n    def norm(self):\n        pass\n";
        let parsed = parse_source(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let class = &parsed.root.children[0];
        assert!(class.child(NodeKind::ClassInheritance).is_some());
        assert!(class.find(NodeKind::FuncDef).is_some());
    }

    #[test]
    fn test_imports() {
        let source = "import os, numpy as np\nfrom os.path import join as j, exists\nfrom . import sibling\nfrom typing import (\n    Any,\n    Dict,\n)\nfrom m import *\n";
        let parsed = parse_source(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.root.children.len(), 5);
        assert!(parsed.root.children[0].find(NodeKind::ImportAlias).is_some());
    }

    #[test]
    fn test_try_except_else_finally() {
        let source = "try:\n    x = 1\nexcept ValueError as e:\n    x = 2\nexcept:\n    pass\nelse:\n    x = 3\nfinally:\n    x = 4\n";
        let parsed = parse_source(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let try_stmt = &parsed.root.children[0];
        let clauses = try_stmt.child(NodeKind::ExceptClauses).expect("clauses");
        assert_eq!(clauses.children.len(), 2);
        assert!(try_stmt.child(NodeKind::ElsePart).is_some());
        assert!(try_stmt.child(NodeKind::FinallyClause).is_some());
    }

    #[test]
    fn test_try_without_handler() {
        let parsed = parse_source("try:\n    x = 1\ny = 2\n");
        assert_eq!(parsed.errors.len(), 1);
        assert!(matches!(
            &parsed.errors[0].kind,
            SyntaxErrorKind::Expected { expected, found }
                if expected.lexeme.as_deref() == Some("except")
                    && found.kind == TokenKind::Identifier
        ));
        assert_eq!(parsed.errors[0].location.line, 3);
        assert_eq!(parsed.root.children[1].kind, NodeKind::Assignment);
    }

    #[test]
    fn test_try_without_handler_before_compound_statement() {
        let parsed = parse_source("try:\n    pass\nif x:\n    y = 1\n");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.root.children.len(), 2);
        let if_stmt = &parsed.root.children[1];
        assert_eq!(if_stmt.kind, NodeKind::IfStmt);
        assert!(if_stmt.find(NodeKind::Assignment).is_some());
    }

    #[test]
    fn test_missing_paren_recovers() {
        let parsed = parse_source("def f(a:\n    return a\nz = 1\n");
        assert!(!parsed.errors.is_empty());
        assert_eq!(
            parsed.root.children.last().map(|n| n.kind),
            Some(NodeKind::Assignment)
        );
    }
}
