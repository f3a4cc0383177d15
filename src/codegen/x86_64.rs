//! Minimal x86-64 machine-code emitter.
//!
//! Registers are allocated by first-free scan over the 16 general
//! purpose slots, with `rsp`, `rbp`, and `rax` reserved (stack, frame,
//! return value). No spilling: running out of slots is a codegen error.
//! The translated opcode set is deliberately small — integer constants,
//! `add`, and `ret` — enough to lower straight-line constant functions
//! end to end.

use crate::error::{Result, YucError};
use crate::ir::{IRModule, IrOp};
use crate::INVALID_INDEX;

const REGISTER_COUNT: usize = 16;
const RAX: u32 = 0;
const RSP: u32 = 4;
const RBP: u32 = 5;

/// Machine code for one function.
#[derive(Debug, Default, Clone)]
pub struct MachineBlock {
    pub code: Vec<u8>,
}

/// Emits x86-64 machine code for a sealed module, one function at a
/// time.
pub struct X86Generator<'ir> {
    module: &'ir IRModule,
    register_in_use: [bool; REGISTER_COUNT],
    register_mapping: Vec<u32>,
    code_blocks: Vec<MachineBlock>,
}

impl<'ir> X86Generator<'ir> {
    pub fn new(module: &'ir IRModule) -> Self {
        let mut register_in_use = [false; REGISTER_COUNT];
        register_in_use[RSP as usize] = true;
        register_in_use[RBP as usize] = true;
        register_in_use[RAX as usize] = true;

        X86Generator {
            module,
            register_in_use,
            register_mapping: vec![INVALID_INDEX; module.instructions().len()],
            code_blocks: Vec::new(),
        }
    }

    /// Emits one function: conventional prologue, the translated
    /// instruction subset, conventional epilogue.
    pub fn generate_function(&mut self, function_index: u32) -> Result<MachineBlock> {
        let mut block = MachineBlock::default();

        // push rbp; mov rbp, rsp
        block.code.push(0x55);
        block.code.push(0x48);
        block.code.push(0x89);
        block.code.push(0xe5);

        let instructions = self.module.instructions();
        let blocks = self.module.blocks();
        let (bb_start, bb_end) = self.module.functions().block_range(function_index);

        for bb in bb_start..bb_end {
            let start = blocks.start_indices[bb as usize];
            let count = blocks.instruction_counts[bb as usize];
            for inst in start..start + count {
                let op = instructions.ops[inst as usize];
                let dest = instructions.destinations[inst as usize];
                let operands = instructions.operands_of(inst);

                match op {
                    _ if op.is_type_marker() => {
                        let value = instructions.immediates[inst as usize]
                            .first()
                            .copied()
                            .unwrap_or(0);
                        self.emit_const(&mut block, dest, value)?;
                    }
                    IrOp::Add => {
                        self.emit_add(&mut block, dest, operands[0], operands[1])?;
                    }
                    IrOp::Return => {
                        if let Some(&value) = operands.first() {
                            self.emit_return(&mut block, value)?;
                        }
                    }
                    _ => {
                        return Err(YucError::CodegenError(format!(
                            "unsupported instruction '{}' in function {}",
                            op.as_str(),
                            function_index
                        )));
                    }
                }
            }
        }

        // leave; ret
        block.code.push(0xc9);
        block.code.push(0xc3);

        self.code_blocks.push(block.clone());
        Ok(block)
    }

    /// Concatenates all generated functions into one byte buffer.
    pub fn finalize(self) -> Vec<u8> {
        let mut out = Vec::new();
        for block in &self.code_blocks {
            out.extend_from_slice(&block.code);
        }
        out
    }

    fn register_for_value(&mut self, value: u32) -> Result<u32> {
        let mapped = self.register_mapping[value as usize];
        if mapped != INVALID_INDEX {
            return Ok(mapped);
        }

        for slot in 0..REGISTER_COUNT {
            if !self.register_in_use[slot] {
                self.register_in_use[slot] = true;
                self.register_mapping[value as usize] = slot as u32;
                return Ok(slot as u32);
            }
        }

        Err(YucError::CodegenError(
            "no registers available".to_string(),
        ))
    }

    fn emit_rex_prefix(block: &mut MachineBlock, w_bit: bool, reg: u32, rm: u32) {
        let mut rex = 0x40u8;
        if w_bit {
            rex |= 0x08;
        }
        if reg & 0x8 != 0 {
            rex |= 0x04; // REX.R extends the ModR/M reg field
        }
        if rm & 0x8 != 0 {
            rex |= 0x01; // REX.B extends the ModR/M r/m field
        }
        block.code.push(rex);
    }

    fn emit_modrm(block: &mut MachineBlock, mod_bits: u8, reg: u32, rm: u32) {
        block
            .code
            .push((mod_bits << 6) | (((reg & 0x7) as u8) << 3) | (rm & 0x7) as u8);
    }

    /// mov r64, imm32
    fn emit_const(&mut self, block: &mut MachineBlock, dest: u32, value: u32) -> Result<()> {
        let dest_reg = self.register_for_value(dest)?;
        Self::emit_rex_prefix(block, true, 0, dest_reg);
        block.code.push(0xc7);
        Self::emit_modrm(block, 0b11, 0, dest_reg);
        block.code.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// mov dest, src1; add dest, src2
    fn emit_add(
        &mut self,
        block: &mut MachineBlock,
        dest: u32,
        src1: u32,
        src2: u32,
    ) -> Result<()> {
        let dest_reg = self.register_for_value(dest)?;
        let src1_reg = self.register_for_value(src1)?;
        let src2_reg = self.register_for_value(src2)?;

        Self::emit_rex_prefix(block, true, src1_reg, dest_reg);
        block.code.push(0x89);
        Self::emit_modrm(block, 0b11, src1_reg, dest_reg);

        Self::emit_rex_prefix(block, true, src2_reg, dest_reg);
        block.code.push(0x01);
        Self::emit_modrm(block, 0b11, src2_reg, dest_reg);
        Ok(())
    }

    /// mov rax, value (skipped when the value already lives in rax)
    fn emit_return(&mut self, block: &mut MachineBlock, value: u32) -> Result<()> {
        let value_reg = self.register_for_value(value)?;
        if value_reg != RAX {
            Self::emit_rex_prefix(block, true, value_reg, RAX);
            block.code.push(0x89);
            Self::emit_modrm(block, 0b11, value_reg, RAX);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IRBuilder;

    fn constant_add_module() -> IRModule {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[10]);
        let b = builder.add_instruction(IrOp::TypeI32, &[32]);
        let sum = builder.add_instruction(IrOp::Add, &[a, b]);
        builder.add_instruction(IrOp::Return, &[sum]);
        builder.seal()
    }

    #[test]
    fn test_prologue_and_epilogue() {
        let module = constant_add_module();
        let mut generator = X86Generator::new(&module);
        let block = generator.generate_function(0).expect("codegen failed");

        assert_eq!(&block.code[..4], &[0x55, 0x48, 0x89, 0xe5]);
        assert_eq!(&block.code[block.code.len() - 2..], &[0xc9, 0xc3]);
    }

    #[test]
    fn test_constants_are_materialized() {
        let module = constant_add_module();
        let mut generator = X86Generator::new(&module);
        let block = generator.generate_function(0).expect("codegen failed");

        // Two mov r64, imm32 with the literal bits 10 and 32.
        let ten = 10u32.to_le_bytes();
        let thirty_two = 32u32.to_le_bytes();
        let find = |needle: &[u8]| {
            block
                .code
                .windows(needle.len())
                .any(|window| window == needle)
        };
        assert!(find(&ten));
        assert!(find(&thirty_two));
    }

    #[test]
    fn test_unsupported_instruction_is_an_error() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeF64);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeF64, &[1]);
        builder.add_instruction(IrOp::FAdd, &[a, a]);
        builder.add_instruction(IrOp::Return, &[1]);
        let module = builder.seal();

        let mut generator = X86Generator::new(&module);
        let err = generator.generate_function(0).unwrap_err();
        assert!(matches!(err, YucError::CodegenError(_)));
    }

    #[test]
    fn test_finalize_concatenates_functions() {
        let mut builder = IRBuilder::new();
        builder.create_function("a", &[], IrOp::TypeI32);
        builder.create_bb();
        let v = builder.add_instruction(IrOp::TypeI32, &[1]);
        builder.add_instruction(IrOp::Return, &[v]);
        builder.create_function("b", &[], IrOp::TypeI32);
        builder.create_bb();
        let w = builder.add_instruction(IrOp::TypeI32, &[2]);
        builder.add_instruction(IrOp::Return, &[w]);
        let module = builder.seal();

        let mut generator = X86Generator::new(&module);
        let first = generator.generate_function(0).expect("codegen failed");
        let second = generator.generate_function(1).expect("codegen failed");
        let all = generator.finalize();
        assert_eq!(all.len(), first.code.len() + second.code.len());
    }
}
