//! Abstract syntax tree for the Yu language.
//!
//! The AST is stored as two structure-of-arrays tables: [`ExprList`] for
//! expressions and [`StmtList`] for statements. Every node is identified
//! by a `u32` id equal to its index; kind-specific fields live in
//! parallel columns indexed by the same id. Nodes reference each other
//! and the parser's symbol/type tables exclusively through ids, with
//! [`crate::INVALID_INDEX`] as the "absent / unresolved" sentinel.
//!
//! Tables are append-only; ids are stable for the lifetime of the AST.

pub mod expressions;
pub mod statements;

pub use expressions::ExprList;
pub use statements::StmtList;

use crate::INVALID_INDEX;

/// Node kinds shared by the expression and statement tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    // Expressions
    Literal,
    Binary,
    Unary,
    Grouping,
    Variable,
    FunctionCall,

    // Statements
    If,
    While,
    For,
    Block,
    VarDecl,
    FunctionDecl,
    Return,
    ExpressionStmt,

    GenericParam,
}

/// Flag bits attached to expressions.
pub mod expr_flags {
    pub const CONSTANT: u8 = 1 << 0;
    pub const PURE: u8 = 1 << 1;
    pub const EVALUATED: u8 = 1 << 2;
    pub const HAS_SIDE_EFFECTS: u8 = 1 << 3;
    pub const VARIADIC: u8 = 1 << 4;
}

/// Flag bits attached to statements.
pub mod stmt_flags {
    pub const IS_CONST: u8 = 1 << 0;
    pub const IS_PUBLIC: u8 = 1 << 1;
    pub const IS_STATIC: u8 = 1 << 2;
    pub const IS_ASYNC: u8 = 1 << 3;
}

/// A parsed program: expression and statement tables plus the id of the
/// root block statement.
#[derive(Debug, Default)]
pub struct Ast<'src> {
    pub expressions: ExprList<'src>,
    pub statements: StmtList<'src>,
    pub root_stmt_index: u32,
}

impl<'src> Ast<'src> {
    pub fn new() -> Self {
        Ast {
            expressions: ExprList::new(),
            statements: StmtList::new(),
            root_stmt_index: INVALID_INDEX,
        }
    }

    /// Wraps the top-level statements in a block and records it as the
    /// program root. Returns the root's id.
    pub fn add_root_block(&mut self, stmts: &[u32], line: u32, col: u32) -> u32 {
        let root = self.statements.add_block(stmts, 0, line, col);
        self.root_stmt_index = root;
        root
    }

    /// Checks cross-reference integrity: every expression/statement id
    /// stored in a node is either in range for its target table or the
    /// sentinel where the field is optional. Symbol ids are allowed to
    /// stay unresolved and are not checked here.
    pub fn validate(&self) -> bool {
        let expr_len = self.expressions.len() as u32;
        let stmt_len = self.statements.len() as u32;

        for i in 0..self.expressions.len() {
            match self.expressions.kinds[i] {
                NodeKind::Binary => {
                    if self.expressions.left_expr_indices[i] >= expr_len
                        || self.expressions.right_expr_indices[i] >= expr_len
                    {
                        return false;
                    }
                }
                NodeKind::Unary => {
                    if self.expressions.operand_indices[i] >= expr_len {
                        return false;
                    }
                }
                NodeKind::FunctionCall => {
                    if self.expressions.callee_indices[i] >= expr_len {
                        return false;
                    }
                    let start = self.expressions.arg_list_starts[i] as usize;
                    let count = self.expressions.arg_list_lengths[i] as usize;
                    if start + count > self.expressions.arg_indices.len() {
                        return false;
                    }
                    for &arg in &self.expressions.arg_indices[start..start + count] {
                        if arg >= expr_len {
                            return false;
                        }
                    }
                }
                NodeKind::GenericParam => {
                    let nested = self.expressions.nested_generic_indices[i];
                    if nested != INVALID_INDEX && nested >= expr_len {
                        return false;
                    }
                }
                _ => {}
            }
        }

        for i in 0..self.statements.len() {
            match self.statements.kinds[i] {
                NodeKind::If => {
                    if self.statements.condition_indices[i] >= expr_len
                        || self.statements.then_stmt_indices[i] >= stmt_len
                    {
                        return false;
                    }
                    let else_idx = self.statements.else_stmt_indices[i];
                    if else_idx != INVALID_INDEX && else_idx >= stmt_len {
                        return false;
                    }
                }
                NodeKind::Block => {
                    let start = self.statements.block_stmt_starts[i] as usize;
                    let count = self.statements.block_stmt_lengths[i] as usize;
                    if start + count > self.statements.block_stmt_indices.len() {
                        return false;
                    }
                    for &stmt in &self.statements.block_stmt_indices[start..start + count] {
                        if stmt >= stmt_len {
                            return false;
                        }
                    }
                }
                NodeKind::VarDecl => {
                    if self.statements.initializer_indices[i] >= expr_len {
                        return false;
                    }
                }
                NodeKind::Return => {
                    let value = self.statements.return_value_indices[i];
                    if value != INVALID_INDEX && value >= expr_len {
                        return false;
                    }
                }
                NodeKind::FunctionDecl => {
                    if self.statements.func_body_indices[i] >= stmt_len {
                        return false;
                    }
                    let start = self.statements.param_list_starts[i] as usize;
                    let count = self.statements.param_list_lengths[i] as usize;
                    if start + count > self.statements.param_indices.len() {
                        return false;
                    }
                }
                NodeKind::ExpressionStmt => {
                    if self.statements.expr_stmt_indices[i] >= expr_len {
                        return false;
                    }
                }
                _ => {}
            }
        }

        self.root_stmt_index == INVALID_INDEX || self.root_stmt_index < stmt_len
    }
}
