//! Concrete parse tree
//!
//! Each grammar procedure of the parser produces one [`ParseTreeNode`] labelled with a
//! [`NodeKind`]; matched tokens become leaves labelled with their token tag. Nodes own
//! their children outright, so the tree is a plain value that can be cloned, compared
//! and walked without any arena or shared pointers.

use super::lexer::{Token, TokenKind};
use std::fmt;

/// Grammar-rule label of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Assignment,
    AugmentedAssignment,
    AssignTarget,
    ReturnStmt,
    IfStmt,
    ElifStmt,
    ElsePart,
    WhileStmt,
    ForStmt,
    FuncCall,
    ArgumentList,
    KeywordArgument,
    StatementList,
    LoopStatementList,
    Expression,
    BoolTerm,
    BoolFactor,
    RelExpr,
    ArithExpr,
    Term,
    Factor,
    Str,
    ListLiteral,
    DictLiteral,
    DictPair,
    StringKey,
    InlineIfElse,
    FuncDef,
    ParamList,
    Param,
    Type,
    ImportStmt,
    ImportItem,
    ImportAlias,
    ClassDef,
    ClassInheritance,
    TryStmt,
    ExceptClauses,
    ExceptClause,
    FinallyClause,
    DelStmt,
    DelTarget,
    BreakStmt,
    ContinueStmt,
    PassStmt,
    /// A matched token.
    Terminal(TokenKind),
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Assignment => "assignment",
            NodeKind::AugmentedAssignment => "augmented_assignment",
            NodeKind::AssignTarget => "assign_target",
            NodeKind::ReturnStmt => "return_stmt",
            NodeKind::IfStmt => "if_stmt",
            NodeKind::ElifStmt => "elif_stmt",
            NodeKind::ElsePart => "else_part",
            NodeKind::WhileStmt => "while_stmt",
            NodeKind::ForStmt => "for_stmt",
            NodeKind::FuncCall => "func_call",
            NodeKind::ArgumentList => "argument_list",
            NodeKind::KeywordArgument => "keyword_argument",
            NodeKind::StatementList => "statement_list",
            NodeKind::LoopStatementList => "loop_statement_list",
            NodeKind::Expression => "expression",
            NodeKind::BoolTerm => "bool_term",
            NodeKind::BoolFactor => "bool_factor",
            NodeKind::RelExpr => "rel_expr",
            NodeKind::ArithExpr => "arith_expr",
            NodeKind::Term => "term",
            NodeKind::Factor => "factor",
            NodeKind::Str => "string",
            NodeKind::ListLiteral => "list_literal",
            NodeKind::DictLiteral => "dict_literal",
            NodeKind::DictPair => "dict_pair",
            NodeKind::StringKey => "string_key",
            NodeKind::InlineIfElse => "inline_if_else",
            NodeKind::FuncDef => "func_def",
            NodeKind::ParamList => "param_list",
            NodeKind::Param => "param",
            NodeKind::Type => "type",
            NodeKind::ImportStmt => "import_stmt",
            NodeKind::ImportItem => "import_item",
            NodeKind::ImportAlias => "import_alias",
            NodeKind::ClassDef => "class_def",
            NodeKind::ClassInheritance => "class_inheritance",
            NodeKind::TryStmt => "try_stmt",
            NodeKind::ExceptClauses => "except_clauses",
            NodeKind::ExceptClause => "except_clause",
            NodeKind::FinallyClause => "finally_clause",
            NodeKind::DelStmt => "del_stmt",
            NodeKind::DelTarget => "del_target",
            NodeKind::BreakStmt => "break_stmt",
            NodeKind::ContinueStmt => "continue_stmt",
            NodeKind::PassStmt => "pass_stmt",
            NodeKind::Terminal(kind) => kind.tag(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTreeNode {
    pub kind: NodeKind,
    pub value: Option<String>,
    pub children: Vec<ParseTreeNode>,
}

impl ParseTreeNode {
    pub fn new(kind: NodeKind) -> Self {
        ParseTreeNode {
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    /// Leaf for a matched token. Layout tokens carry no value.
    pub fn leaf(token: &Token) -> Self {
        let value = (!token.kind.is_structural()).then(|| token.lexeme.clone());
        ParseTreeNode {
            kind: NodeKind::Terminal(token.kind),
            value,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: ParseTreeNode) {
        self.children.push(child);
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal(_))
    }

    /// First direct child with the given label.
    pub fn child(&self, kind: NodeKind) -> Option<&ParseTreeNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// First node with the given label in pre-order, including `self`.
    pub fn find(&self, kind: NodeKind) -> Option<&ParseTreeNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }

    /// Every node in pre-order, paired with its depth below `self`.
    pub fn preorder(&self) -> Vec<(usize, &ParseTreeNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Number of nodes in the subtree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ParseTreeNode::size).sum::<usize>()
    }
}
