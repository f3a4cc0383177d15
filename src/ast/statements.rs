//! Structure-of-arrays statement table.

use super::NodeKind;
use crate::INVALID_INDEX;

/// All statements of a program, one column per field.
///
/// Same discipline as `ExprList`: every constructor pushes one entry to
/// every column, unrelated fields hold sentinels, and the returned id is
/// the entry's index. Block members and function parameter symbols live
/// in shared flat arrays sliced by (start, length).
#[derive(Debug, Default)]
pub struct StmtList<'src> {
    pub kinds: Vec<NodeKind>,
    pub lines: Vec<u32>,
    pub columns: Vec<u32>,
    pub flags: Vec<u8>,

    // If
    pub condition_indices: Vec<u32>,
    pub then_stmt_indices: Vec<u32>,
    pub else_stmt_indices: Vec<u32>,

    // Block
    pub block_stmt_starts: Vec<u32>,
    pub block_stmt_lengths: Vec<u32>,
    pub block_stmt_indices: Vec<u32>,
    pub scope_levels: Vec<u32>,

    // Variable declaration
    pub var_names: Vec<&'src str>,
    pub var_type_indices: Vec<u32>,
    pub initializer_indices: Vec<u32>,
    pub symbol_indices: Vec<u32>,

    // Return
    pub return_value_indices: Vec<u32>,

    // Expression statement
    pub expr_stmt_indices: Vec<u32>,

    // Function declaration
    pub func_names: Vec<&'src str>,
    pub func_type_indices: Vec<u32>,
    pub func_body_indices: Vec<u32>,
    pub param_list_starts: Vec<u32>,
    pub param_list_lengths: Vec<u32>,
    pub param_indices: Vec<u32>,
}

impl<'src> StmtList<'src> {
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
        self.flags.push(0);
        self.condition_indices.push(INVALID_INDEX);
        self.then_stmt_indices.push(INVALID_INDEX);
        self.else_stmt_indices.push(INVALID_INDEX);
        self.block_stmt_starts.push(0);
        self.block_stmt_lengths.push(0);
        self.scope_levels.push(0);
        self.var_names.push("");
        self.var_type_indices.push(INVALID_INDEX);
        self.initializer_indices.push(INVALID_INDEX);
        self.symbol_indices.push(INVALID_INDEX);
        self.return_value_indices.push(INVALID_INDEX);
        self.expr_stmt_indices.push(INVALID_INDEX);
        self.func_names.push("");
        self.func_type_indices.push(INVALID_INDEX);
        self.func_body_indices.push(INVALID_INDEX);
        self.param_list_starts.push(0);
        self.param_list_lengths.push(0);
        index
    }

    pub fn add_if(
        &mut self,
        cond: u32,
        then_stmt: u32,
        else_stmt: u32,
        line: u32,
        col: u32,
    ) -> u32 {
        let index = self.push_defaults(NodeKind::If, line, col);
        let i = index as usize;
        self.condition_indices[i] = cond;
        self.then_stmt_indices[i] = then_stmt;
        self.else_stmt_indices[i] = else_stmt;
        index
    }

    pub fn add_block(&mut self, stmts: &[u32], scope: u32, line: u32, col: u32) -> u32 {
        let start = self.block_stmt_indices.len() as u32;
        self.block_stmt_indices.extend_from_slice(stmts);

        let index = self.push_defaults(NodeKind::Block, line, col);
        let i = index as usize;
        self.block_stmt_starts[i] = start;
        self.block_stmt_lengths[i] = stmts.len() as u32;
        self.scope_levels[i] = scope;
        index
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_var_decl(
        &mut self,
        name: &'src str,
        type_index: u32,
        init_index: u32,
        symbol_index: u32,
        flags: u8,
        line: u32,
        col: u32,
    ) -> u32 {
        let index = self.push_defaults(NodeKind::VarDecl, line, col);
        let i = index as usize;
        self.var_names[i] = name;
        self.var_type_indices[i] = type_index;
        self.initializer_indices[i] = init_index;
        self.symbol_indices[i] = symbol_index;
        self.flags[i] = flags;
        index
    }

    pub fn add_return(&mut self, value_index: u32, line: u32, col: u32) -> u32 {
        let index = self.push_defaults(NodeKind::Return, line, col);
        self.return_value_indices[index as usize] = value_index;
        index
    }

    pub fn add_expression(&mut self, expr_index: u32, line: u32, col: u32) -> u32 {
        let index = self.push_defaults(NodeKind::ExpressionStmt, line, col);
        self.expr_stmt_indices[index as usize] = expr_index;
        index
    }

    pub fn add_function(
        &mut self,
        name: &'src str,
        type_index: u32,
        params: &[u32],
        body_index: u32,
        line: u32,
        col: u32,
    ) -> u32 {
        let start = self.param_indices.len() as u32;
        self.param_indices.extend_from_slice(params);

        let index = self.push_defaults(NodeKind::FunctionDecl, line, col);
        let i = index as usize;
        self.func_names[i] = name;
        self.func_type_indices[i] = type_index;
        self.func_body_indices[i] = body_index;
        self.param_list_starts[i] = start;
        self.param_list_lengths[i] = params.len() as u32;
        index
    }

    /// Statement ids contained in a block.
    pub fn block_stmts(&self, index: u32) -> &[u32] {
        let start = self.block_stmt_starts[index as usize] as usize;
        let count = self.block_stmt_lengths[index as usize] as usize;
        &self.block_stmt_indices[start..start + count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::stmt_flags;

    #[test]
    fn test_block_slices() {
        let mut stmts = StmtList::new();
        let a = stmts.add_return(INVALID_INDEX, 1, 1);
        let b = stmts.add_return(0, 2, 1);
        let block = stmts.add_block(&[a, b], 1, 1, 1);
        assert_eq!(stmts.block_stmts(block), &[a, b]);
        assert_eq!(stmts.kinds[block as usize], NodeKind::Block);
        assert_eq!(stmts.scope_levels[block as usize], 1);
    }

    #[test]
    fn test_var_decl_flags() {
        let mut stmts = StmtList::new();
        let id = stmts.add_var_decl("x", 0, 0, 0, stmt_flags::IS_CONST, 1, 1);
        assert_ne!(stmts.flags[id as usize] & stmt_flags::IS_CONST, 0);
        assert_eq!(stmts.var_names[id as usize], "x");
    }

    #[test]
    fn test_function_params() {
        let mut stmts = StmtList::new();
        let body = stmts.add_block(&[], 1, 1, 1);
        let func = stmts.add_function("main", 0, &[3, 4], body, 1, 1);
        let start = stmts.param_list_starts[func as usize] as usize;
        let len = stmts.param_list_lengths[func as usize] as usize;
        assert_eq!(&stmts.param_indices[start..start + len], &[3, 4]);
    }
}
