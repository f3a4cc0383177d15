//! Stateful, append-only IR construction.
//!
//! The builder passes through two phases. While **building**, functions,
//! blocks, and instructions are appended through a write cursor
//! (`current_function`, `current_bb`); ids are assigned monotonically
//! and never change. The consuming [`IRBuilder::seal`] ends the phase:
//! it finalizes block extents, derives control-flow edges from the block
//! terminators, and returns an immutable [`IRModule`]. Post-seal
//! mutation is impossible by construction.
//!
//! Misuse of the lifecycle — adding an instruction before a function or
//! block exists, emitting a block's instructions non-contiguously — is a
//! contract violation and panics.

use super::function::{BasicBlockList, FunctionList};
use super::instruction::InstructionList;
use super::module::IRModule;
use super::opcode::IrOp;
use crate::INVALID_INDEX;

/// Builds IR functions, basic blocks, and instructions in order.
///
/// ```
/// use yuc::ir::{IRBuilder, IrOp};
///
/// let mut builder = IRBuilder::new();
/// builder.create_function("answer", &[], IrOp::TypeI32);
/// builder.create_bb();
/// let value = builder.add_instruction(IrOp::TypeI32, &[42]);
/// builder.add_instruction(IrOp::Return, &[value]);
/// let module = builder.seal();
/// assert!(module.dump().contains("ret %0"));
/// ```
pub struct IRBuilder {
    instructions: InstructionList,
    blocks: BasicBlockList,
    functions: FunctionList,
    current_function: u32,
    current_bb: u32,
}

impl Default for IRBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IRBuilder {
    /// Builder with the default capacity hint.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Builder that reserves room for roughly `initial_capacity`
    /// instructions up front.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        IRBuilder {
            instructions: InstructionList::with_capacity(initial_capacity),
            blocks: BasicBlockList::default(),
            functions: FunctionList::default(),
            current_function: INVALID_INDEX,
            current_bb: INVALID_INDEX,
        }
    }

    /// Starts a new function and makes it current. Parameter registers
    /// are allocated implicitly as the first `param_types.len()`
    /// register ids of the function.
    pub fn create_function(
        &mut self,
        name: &str,
        param_types: &[IrOp],
        return_type: IrOp,
    ) -> u32 {
        let func_index = self.functions.len() as u32;

        self.functions
            .bb_start_indices
            .push(self.blocks.len() as u32);
        self.functions.bb_counts.push(0);
        self.functions
            .param_starts
            .push(self.functions.param_types.len() as u32);
        self.functions.param_counts.push(param_types.len() as u32);
        self.functions.param_types.extend_from_slice(param_types);
        self.functions.return_types.push(return_type);
        self.functions.names.push(name.to_string());

        self.current_function = func_index;
        self.current_bb = INVALID_INDEX;
        func_index
    }

    /// Appends a basic block to the current function and moves the write
    /// cursor to it.
    pub fn create_bb(&mut self) -> u32 {
        assert!(
            self.current_function != INVALID_INDEX,
            "must create function before basic block"
        );

        let bb_index = self.blocks.len() as u32;
        self.blocks
            .start_indices
            .push(self.instructions.len() as u32);
        self.blocks.instruction_counts.push(0);
        self.blocks.successor_counts.push(0);
        self.blocks.successor_starts.push(0);
        self.blocks.predecessor_counts.push(0);
        self.blocks.predecessor_starts.push(0);

        self.functions.bb_counts[self.current_function as usize] += 1;

        self.current_bb = bb_index;
        bb_index
    }

    /// Appends an instruction to the current block and returns its
    /// destination register id. For type-marker opcodes the operands are
    /// the literal value's bits and are also recorded as immediates.
    pub fn add_instruction(&mut self, op: IrOp, operands: &[u32]) -> u32 {
        assert!(
            self.current_function != INVALID_INDEX,
            "must create function before adding instructions"
        );
        assert!(
            self.current_bb != INVALID_INDEX,
            "must create basic block before adding instructions"
        );

        let dest = self.instructions.push(op, operands, self.current_bb);
        self.blocks.instruction_counts[self.current_bb as usize] += 1;
        dest
    }

    /// [`IRBuilder::add_instruction`] variant that records the
    /// conversion's source and target types.
    pub fn add_conversion(
        &mut self,
        op: IrOp,
        operands: &[u32],
        from_type: IrOp,
        to_type: IrOp,
    ) -> u32 {
        let dest = self.add_instruction(op, operands);
        self.instructions.push_operand_types(&[from_type, to_type]);
        dest
    }

    /// [`IRBuilder::add_instruction`] variant that records the value
    /// type moved by a memory operation.
    pub fn add_memory_op(&mut self, op: IrOp, operands: &[u32], value_type: IrOp) -> u32 {
        let dest = self.add_instruction(op, operands);
        self.instructions.push_operand_types(&[value_type]);
        dest
    }

    /// Moves the write cursor to an existing block. Used for out-of-order
    /// emission, e.g. creating successor blocks before emitting the
    /// entry branch.
    pub fn set_current_bb(&mut self, bb_index: u32) {
        assert!(
            (bb_index as usize) < self.blocks.len(),
            "set_current_bb on unknown block"
        );
        self.current_bb = bb_index;
    }

    /// Ends the building phase: recomputes block extents from the
    /// per-instruction block assignment, derives successor/predecessor
    /// edges from terminators, and returns the immutable module.
    pub fn seal(mut self) -> IRModule {
        self.finalize_block_extents();
        self.compute_edges();
        IRModule::new(self.instructions, self.blocks, self.functions)
    }

    /// Recomputes `start_indices`/`instruction_counts` from
    /// `bb_indices`. Out-of-order emission through `set_current_bb` is
    /// fine as long as each block's instructions form one contiguous run
    /// and runs appear in block order.
    fn finalize_block_extents(&mut self) {
        let block_count = self.blocks.len();
        let total = self.instructions.len() as u32;
        let mut starts = vec![total; block_count];
        let mut counts = vec![0u32; block_count];

        for i in 0..self.instructions.len() {
            let bb = self.instructions.bb_indices[i] as usize;
            if counts[bb] == 0 {
                starts[bb] = i as u32;
            } else {
                assert!(
                    starts[bb] + counts[bb] == i as u32,
                    "instructions of bb{} are not contiguous",
                    bb
                );
            }
            counts[bb] += 1;
        }

        // Empty blocks take the start of the next non-empty run.
        let mut next_start = total;
        for b in (0..block_count).rev() {
            if counts[b] == 0 {
                starts[b] = next_start;
            } else {
                next_start = starts[b];
            }
        }

        for b in 1..block_count {
            assert!(
                starts[b] == starts[b - 1] + counts[b - 1],
                "basic blocks are not laid out in order"
            );
        }

        self.blocks.start_indices = starts;
        self.blocks.instruction_counts = counts;
    }

    /// Derives the successor and predecessor arrays from each block's
    /// terminator. Targets are taken as-is; range checking is the
    /// control-flow validator's job.
    fn compute_edges(&mut self) {
        let block_count = self.blocks.len();
        let mut successors: Vec<Vec<u32>> = vec![Vec::new(); block_count];

        for b in 0..block_count {
            let count = self.blocks.instruction_counts[b];
            if count == 0 {
                continue;
            }
            let last = self.blocks.start_indices[b] + count - 1;
            let operands = self.instructions.operands_of(last);
            match self.instructions.ops[last as usize] {
                IrOp::Jump => {
                    if let Some(&target) = operands.first() {
                        successors[b].push(target);
                    }
                }
                IrOp::Branch => {
                    if operands.len() >= 3 {
                        successors[b].push(operands[1]);
                        successors[b].push(operands[2]);
                    }
                }
                IrOp::Switch => {
                    // Operand 0 is the scrutinee; the rest are targets.
                    for &target in operands.iter().skip(1) {
                        successors[b].push(target);
                    }
                }
                _ => {}
            }
        }

        let mut predecessors: Vec<Vec<u32>> = vec![Vec::new(); block_count];
        for (b, succs) in successors.iter().enumerate() {
            for &target in succs {
                if (target as usize) < block_count {
                    predecessors[target as usize].push(b as u32);
                }
            }
        }

        self.blocks.successors.clear();
        self.blocks.predecessors.clear();
        for b in 0..block_count {
            self.blocks.successor_starts[b] = self.blocks.successors.len() as u32;
            self.blocks.successor_counts[b] = successors[b].len() as u32;
            self.blocks.successors.extend_from_slice(&successors[b]);

            self.blocks.predecessor_starts[b] = self.blocks.predecessors.len() as u32;
            self.blocks.predecessor_counts[b] = predecessors[b].len() as u32;
            self.blocks.predecessors.extend_from_slice(&predecessors[b]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_straight_line_function() {
        let mut builder = IRBuilder::new();
        let func = builder.create_function("f", &[], IrOp::TypeI32);
        assert_eq!(func, 0);
        let bb = builder.create_bb();
        assert_eq!(bb, 0);

        let a = builder.add_instruction(IrOp::TypeI32, &[10]);
        let b = builder.add_instruction(IrOp::TypeI32, &[5]);
        let sum = builder.add_instruction(IrOp::Add, &[a, b]);
        builder.add_instruction(IrOp::Return, &[sum]);

        let module = builder.seal();
        let instructions = module.instructions();
        assert_eq!(instructions.len(), 4);
        for i in 0..instructions.len() {
            assert_eq!(instructions.destinations[i], i as u32);
        }
        assert_eq!(module.blocks().instruction_counts[0], 4);
        assert_eq!(module.functions().names[0], "f");
    }

    #[test]
    fn test_blocks_are_contiguous_after_seal() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        let entry = builder.create_bb();

        let c = builder.add_instruction(IrOp::TypeBool, &[1]);
        let then_bb = builder.create_bb();
        let else_bb = builder.create_bb();

        // Out-of-order: the entry branch is emitted after the successor
        // blocks exist.
        builder.set_current_bb(entry);
        builder.add_instruction(IrOp::Branch, &[c, then_bb, else_bb]);

        builder.set_current_bb(then_bb);
        let v1 = builder.add_instruction(IrOp::TypeI32, &[1]);
        builder.add_instruction(IrOp::Return, &[v1]);

        builder.set_current_bb(else_bb);
        let v2 = builder.add_instruction(IrOp::TypeI32, &[2]);
        builder.add_instruction(IrOp::Return, &[v2]);

        let module = builder.seal();
        let blocks = module.blocks();
        let total = module.instructions().len() as u32;
        for b in 0..blocks.len() {
            let end = blocks.start_indices[b] + blocks.instruction_counts[b];
            let next = if b + 1 < blocks.len() {
                blocks.start_indices[b + 1]
            } else {
                total
            };
            assert_eq!(end, next, "block {} is not contiguous", b);
        }
    }

    #[test]
    fn test_seal_derives_edges() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        let entry = builder.create_bb();
        let c = builder.add_instruction(IrOp::TypeBool, &[0]);
        let then_bb = builder.create_bb();
        let else_bb = builder.create_bb();
        builder.set_current_bb(entry);
        builder.add_instruction(IrOp::Branch, &[c, then_bb, else_bb]);
        builder.set_current_bb(then_bb);
        let a = builder.add_instruction(IrOp::TypeI32, &[1]);
        builder.add_instruction(IrOp::Return, &[a]);
        builder.set_current_bb(else_bb);
        let b = builder.add_instruction(IrOp::TypeI32, &[2]);
        builder.add_instruction(IrOp::Return, &[b]);

        let module = builder.seal();
        let blocks = module.blocks();
        assert_eq!(blocks.successors_of(entry), &[then_bb, else_bb]);
        assert_eq!(blocks.successors_of(then_bb), &[] as &[u32]);
        assert_eq!(blocks.predecessors_of(then_bb), &[entry]);
        assert_eq!(blocks.predecessors_of(else_bb), &[entry]);
        assert_eq!(blocks.predecessors_of(entry), &[] as &[u32]);
    }

    #[test]
    #[should_panic(expected = "must create function")]
    fn test_bb_requires_function() {
        let mut builder = IRBuilder::new();
        builder.create_bb();
    }

    #[test]
    #[should_panic(expected = "must create basic block")]
    fn test_instruction_requires_block() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeVoid);
        builder.add_instruction(IrOp::Return, &[]);
    }

    #[test]
    fn test_functions_own_disjoint_block_ranges() {
        let mut builder = IRBuilder::new();
        builder.create_function("a", &[], IrOp::TypeVoid);
        builder.create_bb();
        builder.add_instruction(IrOp::Return, &[]);

        builder.create_function("b", &[IrOp::TypeI32], IrOp::TypeVoid);
        builder.create_bb();
        builder.add_instruction(IrOp::Return, &[]);

        let module = builder.seal();
        let functions = module.functions();
        assert_eq!(functions.block_range(0), (0, 1));
        assert_eq!(functions.block_range(1), (1, 2));
        assert_eq!(functions.param_types_of(1), &[IrOp::TypeI32]);
    }
}
