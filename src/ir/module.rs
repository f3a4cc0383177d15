//! Sealed IR and its textual dump.

use std::fmt::Write;

use super::function::{BasicBlockList, FunctionList};
use super::instruction::InstructionList;
use super::opcode::IrOp;

/// An immutable IR module produced by sealing a builder.
///
/// All tables are read-only; the analyzer and code emitters borrow the
/// module and never retain references beyond the call.
#[derive(Debug)]
pub struct IRModule {
    instructions: InstructionList,
    blocks: BasicBlockList,
    functions: FunctionList,
}

impl IRModule {
    pub(crate) fn new(
        instructions: InstructionList,
        blocks: BasicBlockList,
        functions: FunctionList,
    ) -> Self {
        IRModule {
            instructions,
            blocks,
            functions,
        }
    }

    pub fn instructions(&self) -> &InstructionList {
        &self.instructions
    }

    pub fn blocks(&self) -> &BasicBlockList {
        &self.blocks
    }

    pub fn functions(&self) -> &FunctionList {
        &self.functions
    }

    /// Renders the module as line-oriented textual IR: a `func` header
    /// with the parameter signature, `bb<n>:` labels local to the
    /// function, and one instruction per line indented four spaces.
    pub fn dump(&self) -> String {
        let mut out = String::new();

        for func in 0..self.functions.len() as u32 {
            out.push_str("func (");
            let params = self.functions.param_types_of(func);
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "%p{}: {}", i, param.as_str());
            }
            let _ = writeln!(
                out,
                ") -> {}:",
                self.functions.return_types[func as usize].as_str()
            );

            let (bb_start, bb_end) = self.functions.block_range(func);
            for bb in bb_start..bb_end {
                let _ = writeln!(out, "bb{}:", bb - bb_start);

                let start = self.blocks.start_indices[bb as usize];
                let count = self.blocks.instruction_counts[bb as usize];
                for inst in start..start + count {
                    out.push_str("    ");
                    self.render_instruction(&mut out, inst, bb_start);
                    out.push('\n');
                }
                out.push('\n');
            }
        }

        out
    }

    fn render_instruction(&self, out: &mut String, inst: u32, bb_start: u32) {
        let op = self.instructions.ops[inst as usize];
        let dest = self.instructions.destinations[inst as usize];
        let operands = self.instructions.operands_of(inst);

        match op {
            _ if op.is_type_marker() => {
                let _ = write!(out, "%{} = {}", dest, op.as_str());
                if let Some(imm) = self.instructions.immediates[inst as usize].first() {
                    let _ = write!(out, " {}", imm);
                }
            }
            IrOp::Branch => {
                let _ = write!(
                    out,
                    "br %{}, bb{}, bb{}",
                    operands[0],
                    operands[1] - bb_start,
                    operands[2] - bb_start
                );
            }
            IrOp::Jump => {
                let _ = write!(out, "jump bb{}", operands[0] - bb_start);
            }
            IrOp::Return => {
                out.push_str("ret");
                if let Some(&value) = operands.first() {
                    let _ = write!(out, " %{}", value);
                }
            }
            IrOp::Unreachable => {
                out.push_str("unreachable");
            }
            IrOp::Phi => {
                let _ = write!(out, "%{} = phi {}", dest, self.phi_type_name(operands));
                for (i, pair) in operands.chunks(2).enumerate() {
                    out.push_str(if i == 0 { " [" } else { ", " });
                    let _ = write!(out, "%{}, bb{}", pair[0], pair[1] - bb_start);
                }
                out.push(']');
            }
            IrOp::MemStore => {
                let _ = write!(out, "store %{}, %{}", operands[0], operands[1]);
            }
            IrOp::MemLoad => {
                let _ = write!(out, "%{} = load %{}", dest, operands[0]);
            }
            IrOp::ZExt | IrOp::SExt | IrOp::Trunc => {
                let types = self.instructions.operand_types_of(inst);
                let (from, to) = match types {
                    [from, to] => (from.as_str(), to.as_str()),
                    _ => ("i32", "i64"),
                };
                let _ = write!(
                    out,
                    "%{} = {} {} %{} to {}",
                    dest,
                    op.as_str(),
                    from,
                    operands[0],
                    to
                );
            }
            _ => {
                let _ = write!(out, "%{} = {}", dest, op.as_str());
                for (i, operand) in operands.iter().enumerate() {
                    let _ = write!(out, "{} %{}", if i > 0 { "," } else { "" }, operand);
                }
            }
        }
    }

    /// Phi operands are untyped pairs; recover a display type from the
    /// defining instruction of the first incoming value.
    fn phi_type_name(&self, operands: &[u32]) -> &'static str {
        if let Some(&value) = operands.first() {
            if (value as usize) < self.instructions.len() {
                let def_op = self.instructions.ops[value as usize];
                if def_op.is_type_marker() {
                    return def_op.as_str();
                }
            }
        }
        "i32"
    }
}
