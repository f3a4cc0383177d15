//! Structure-of-arrays instruction storage.

use super::opcode::IrOp;
use crate::INVALID_INDEX;

/// All instructions of a module in one SoA table.
///
/// The destination register of instruction `i` is always `i`: registers
/// are single-assignment by construction. Operands live in one flat
/// array, sliced per instruction by `(operand_starts[i],
/// operand_counts[i])`. Conversion and memory operations additionally
/// record value types in the `operand_types` tail, sliced by
/// `operand_type_starts[i]` (sentinel when the instruction has none).
///
/// The `immediates` list is parallel to the instructions; only
/// type-marker opcodes carry a non-empty entry, holding the literal bits
/// of the constant they materialize.
#[derive(Debug, Default)]
pub struct InstructionList {
    pub ops: Vec<IrOp>,
    pub destinations: Vec<u32>,
    pub operand_counts: Vec<u32>,
    pub operand_starts: Vec<u32>,
    pub operands: Vec<u32>,
    pub operand_types: Vec<IrOp>,
    pub operand_type_starts: Vec<u32>,
    pub bb_indices: Vec<u32>,
    pub immediates: Vec<Vec<u32>>,
}

impl InstructionList {
    pub fn with_capacity(capacity: usize) -> Self {
        InstructionList {
            ops: Vec::with_capacity(capacity),
            destinations: Vec::with_capacity(capacity),
            operand_counts: Vec::with_capacity(capacity),
            operand_starts: Vec::with_capacity(capacity),
            operands: Vec::with_capacity(capacity * 2),
            operand_types: Vec::new(),
            operand_type_starts: Vec::with_capacity(capacity),
            bb_indices: Vec::with_capacity(capacity),
            immediates: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Appends an instruction and returns its destination register id.
    pub fn push(&mut self, op: IrOp, operands: &[u32], bb_index: u32) -> u32 {
        let dest = self.destinations.len() as u32;
        self.ops.push(op);
        self.destinations.push(dest);
        self.operand_counts.push(operands.len() as u32);
        self.operand_starts.push(self.operands.len() as u32);
        self.operands.extend_from_slice(operands);
        self.operand_type_starts.push(INVALID_INDEX);
        self.bb_indices.push(bb_index);
        if op.is_type_marker() {
            self.immediates.push(operands.to_vec());
        } else {
            self.immediates.push(Vec::new());
        }
        dest
    }

    /// Records `types` in the operand-type tail for the most recently
    /// appended instruction.
    pub fn push_operand_types(&mut self, types: &[IrOp]) {
        let last = self.operand_type_starts.len() - 1;
        self.operand_type_starts[last] = self.operand_types.len() as u32;
        self.operand_types.extend_from_slice(types);
    }

    /// Operand slice of instruction `index`.
    pub fn operands_of(&self, index: u32) -> &[u32] {
        let start = self.operand_starts[index as usize] as usize;
        let count = self.operand_counts[index as usize] as usize;
        &self.operands[start..start + count]
    }

    /// Recorded operand types of a conversion (`[from, to]`) or memory
    /// operation (`[value_type]`); empty for anything else.
    pub fn operand_types_of(&self, index: u32) -> &[IrOp] {
        let start = self.operand_type_starts[index as usize];
        if start == INVALID_INDEX {
            return &[];
        }
        let count = match self.ops[index as usize] {
            IrOp::ZExt
            | IrOp::SExt
            | IrOp::Trunc
            | IrOp::Bitcast
            | IrOp::IntToPtr
            | IrOp::PtrToInt
            | IrOp::FpToInt
            | IrOp::IntToFp
            | IrOp::FpExt
            | IrOp::FpTrunc => 2,
            _ => 1,
        };
        &self.operand_types[start as usize..start as usize + count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_equals_index() {
        let mut list = InstructionList::with_capacity(4);
        let a = list.push(IrOp::TypeI32, &[10], 0);
        let b = list.push(IrOp::TypeI32, &[5], 0);
        let c = list.push(IrOp::Add, &[a, b], 0);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(c, 2);
        for i in 0..list.len() {
            assert_eq!(list.destinations[i], i as u32);
        }
    }

    #[test]
    fn test_operand_slices() {
        let mut list = InstructionList::with_capacity(4);
        list.push(IrOp::TypeI32, &[10], 0);
        list.push(IrOp::TypeI32, &[5], 0);
        let add = list.push(IrOp::Add, &[0, 1], 0);
        assert_eq!(list.operands_of(add), &[0, 1]);
        assert_eq!(list.operands_of(0), &[10]);
    }

    #[test]
    fn test_immediates_only_for_type_markers() {
        let mut list = InstructionList::with_capacity(4);
        list.push(IrOp::TypeI32, &[42], 0);
        list.push(IrOp::Add, &[0, 0], 0);
        assert_eq!(list.immediates[0], vec![42]);
        assert!(list.immediates[1].is_empty());
    }

    #[test]
    fn test_operand_type_tail() {
        let mut list = InstructionList::with_capacity(4);
        list.push(IrOp::TypeI32, &[42], 0);
        let conv = list.push(IrOp::ZExt, &[0], 0);
        list.push_operand_types(&[IrOp::TypeI32, IrOp::TypeI64]);
        assert_eq!(list.operand_types_of(conv), &[IrOp::TypeI32, IrOp::TypeI64]);
        assert_eq!(list.operand_types_of(0), &[] as &[IrOp]);

        let store = list.push(IrOp::MemStore, &[0, 0], 0);
        list.push_operand_types(&[IrOp::TypeI32]);
        assert_eq!(list.operand_types_of(store), &[IrOp::TypeI32]);
    }
}
