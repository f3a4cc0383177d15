//! Structure-of-arrays basic-block and function storage.

use super::opcode::IrOp;

/// All basic blocks of a module.
///
/// A block is a contiguous run of instructions: `start_indices[b]` is the
/// index of its first instruction and `instruction_counts[b]` the run
/// length. Successor and predecessor block ids live in flat arrays
/// sliced by `(successor_starts[b], successor_counts[b])` and the
/// predecessor equivalents; both edge sets are derived from terminators
/// when the builder seals.
#[derive(Debug, Default)]
pub struct BasicBlockList {
    pub start_indices: Vec<u32>,
    pub instruction_counts: Vec<u32>,
    pub successor_counts: Vec<u32>,
    pub successor_starts: Vec<u32>,
    pub successors: Vec<u32>,
    pub predecessor_counts: Vec<u32>,
    pub predecessor_starts: Vec<u32>,
    pub predecessors: Vec<u32>,
}

impl BasicBlockList {
    pub fn len(&self) -> usize {
        self.start_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_indices.is_empty()
    }

    /// Successor block ids of block `index`.
    pub fn successors_of(&self, index: u32) -> &[u32] {
        let start = self.successor_starts[index as usize] as usize;
        let count = self.successor_counts[index as usize] as usize;
        &self.successors[start..start + count]
    }

    /// Predecessor block ids of block `index`.
    pub fn predecessors_of(&self, index: u32) -> &[u32] {
        let start = self.predecessor_starts[index as usize] as usize;
        let count = self.predecessor_counts[index as usize] as usize;
        &self.predecessors[start..start + count]
    }
}

/// All functions of a module.
///
/// A function owns the contiguous block range `[bb_start_indices[f],
/// bb_start_indices[f] + bb_counts[f])`. Parameter types live in a flat
/// array sliced by `(param_starts[f], param_counts[f])`; parameter
/// registers are the first `param_counts[f]` register ids of the
/// function.
#[derive(Debug, Default)]
pub struct FunctionList {
    pub bb_start_indices: Vec<u32>,
    pub bb_counts: Vec<u32>,
    pub param_counts: Vec<u32>,
    pub param_starts: Vec<u32>,
    pub param_types: Vec<IrOp>,
    pub return_types: Vec<IrOp>,
    pub names: Vec<String>,
}

impl FunctionList {
    pub fn len(&self) -> usize {
        self.bb_start_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bb_start_indices.is_empty()
    }

    /// Parameter types of function `index`.
    pub fn param_types_of(&self, index: u32) -> &[IrOp] {
        let start = self.param_starts[index as usize] as usize;
        let count = self.param_counts[index as usize] as usize;
        &self.param_types[start..start + count]
    }

    /// Block id range `[start, end)` of function `index`.
    pub fn block_range(&self, index: u32) -> (u32, u32) {
        let start = self.bb_start_indices[index as usize];
        (start, start + self.bb_counts[index as usize])
    }
}
