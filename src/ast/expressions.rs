//! Structure-of-arrays expression table.

use super::{expr_flags, NodeKind};
use crate::lexer::TokenKind;
use crate::INVALID_INDEX;

/// All expressions of a program, one column per field.
///
/// Every `add_*` constructor pushes one entry to every column so the
/// columns stay index-aligned; fields that do not apply to the kind hold
/// sentinels. The returned id is the entry's index.
#[derive(Debug, Default)]
pub struct ExprList<'src> {
    pub kinds: Vec<NodeKind>,
    pub lines: Vec<u32>,
    pub columns: Vec<u32>,
    /// Reference into the parser's `TypeList`; sentinel while unresolved.
    pub type_indices: Vec<u32>,
    pub flags: Vec<u8>,

    // Binary
    pub left_expr_indices: Vec<u32>,
    pub right_expr_indices: Vec<u32>,
    pub operators: Vec<TokenKind>,

    // Unary
    pub operand_indices: Vec<u32>,
    pub unary_operators: Vec<TokenKind>,

    // Literal
    pub literal_values: Vec<&'src str>,

    // Variable / generic parameter
    pub var_names: Vec<&'src str>,
    pub symbol_indices: Vec<u32>,
    pub nested_generic_indices: Vec<u32>,

    // Function call; argument ids live in the shared flat array.
    pub callee_indices: Vec<u32>,
    pub arg_list_starts: Vec<u32>,
    pub arg_list_lengths: Vec<u32>,
    pub arg_indices: Vec<u32>,
}

impl<'src> ExprList<'src> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn push_defaults(&mut self, kind: NodeKind, line: u32, col: u32) -> u32 {
        let index = self.kinds.len() as u32;
        self.kinds.push(kind);
        self.lines.push(line);
        self.columns.push(col);
        self.type_indices.push(INVALID_INDEX);
        self.flags.push(0);
        self.left_expr_indices.push(INVALID_INDEX);
        self.right_expr_indices.push(INVALID_INDEX);
        self.operators.push(TokenKind::Unknown);
        self.operand_indices.push(INVALID_INDEX);
        self.unary_operators.push(TokenKind::Unknown);
        self.literal_values.push("");
        self.var_names.push("");
        self.symbol_indices.push(INVALID_INDEX);
        self.nested_generic_indices.push(INVALID_INDEX);
        self.callee_indices.push(INVALID_INDEX);
        self.arg_list_starts.push(0);
        self.arg_list_lengths.push(0);
        index
    }

    pub fn add_binary(
        &mut self,
        left: u32,
        op: TokenKind,
        right: u32,
        line: u32,
        col: u32,
    ) -> u32 {
        let index = self.push_defaults(NodeKind::Binary, line, col);
        let i = index as usize;
        self.left_expr_indices[i] = left;
        self.right_expr_indices[i] = right;
        self.operators[i] = op;
        index
    }

    pub fn add_unary(&mut self, op: TokenKind, operand: u32, line: u32, col: u32) -> u32 {
        let index = self.push_defaults(NodeKind::Unary, line, col);
        let i = index as usize;
        self.operand_indices[i] = operand;
        self.unary_operators[i] = op;
        index
    }

    pub fn add_literal(&mut self, value: &'src str, line: u32, col: u32) -> u32 {
        let index = self.push_defaults(NodeKind::Literal, line, col);
        let i = index as usize;
        self.literal_values[i] = value;
        self.flags[i] = expr_flags::CONSTANT | expr_flags::PURE;
        index
    }

    pub fn add_variable(
        &mut self,
        name: &'src str,
        symbol_index: u32,
        line: u32,
        col: u32,
    ) -> u32 {
        let index = self.push_defaults(NodeKind::Variable, line, col);
        let i = index as usize;
        self.var_names[i] = name;
        self.symbol_indices[i] = symbol_index;
        index
    }

    pub fn add_call(&mut self, callee: u32, args: &[u32], line: u32, col: u32) -> u32 {
        let arg_start = self.arg_indices.len() as u32;
        self.arg_indices.extend_from_slice(args);

        let index = self.push_defaults(NodeKind::FunctionCall, line, col);
        let i = index as usize;
        self.callee_indices[i] = callee;
        self.arg_list_starts[i] = arg_start;
        self.arg_list_lengths[i] = args.len() as u32;
        self.flags[i] = expr_flags::HAS_SIDE_EFFECTS;
        index
    }

    pub fn add_generic_param(
        &mut self,
        name: &'src str,
        symbol_index: u32,
        variadic: bool,
        line: u32,
        col: u32,
        nested: u32,
    ) -> u32 {
        let index = self.push_defaults(NodeKind::GenericParam, line, col);
        let i = index as usize;
        self.var_names[i] = name;
        self.symbol_indices[i] = symbol_index;
        self.nested_generic_indices[i] = nested;
        if variadic {
            self.flags[i] = expr_flags::VARIADIC;
        }
        index
    }

    /// Argument ids of a call expression.
    pub fn call_args(&self, index: u32) -> &[u32] {
        let start = self.arg_list_starts[index as usize] as usize;
        let count = self.arg_list_lengths[index as usize] as usize;
        &self.arg_indices[start..start + count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut exprs = ExprList::new();
        assert_eq!(exprs.add_literal("1", 1, 1), 0);
        assert_eq!(exprs.add_literal("2", 1, 3), 1);
        assert_eq!(exprs.add_binary(0, TokenKind::Plus, 1, 1, 2), 2);
        assert_eq!(exprs.len(), 3);
        assert_eq!(exprs.kinds[2], NodeKind::Binary);
    }

    #[test]
    fn test_columns_stay_parallel() {
        let mut exprs = ExprList::new();
        exprs.add_literal("42", 1, 1);
        exprs.add_variable("x", 7, 1, 4);
        exprs.add_call(1, &[0], 1, 4);

        assert_eq!(exprs.kinds.len(), exprs.literal_values.len());
        assert_eq!(exprs.kinds.len(), exprs.callee_indices.len());
        assert_eq!(exprs.kinds.len(), exprs.symbol_indices.len());
        assert_eq!(exprs.call_args(2), &[0]);
    }

    #[test]
    fn test_literal_is_constant() {
        let mut exprs = ExprList::new();
        let id = exprs.add_literal("3.5", 1, 1);
        assert_ne!(exprs.flags[id as usize] & expr_flags::CONSTANT, 0);
    }
}
