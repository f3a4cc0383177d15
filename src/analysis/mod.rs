//! IR validation and analysis passes.
//!
//! The analyzer borrows a sealed [`IRModule`] and never mutates it. Three
//! validators are implemented: SSA single-definition ([`IRAnalyzer::validate_ssa`]),
//! per-opcode typing ([`IRAnalyzer::validate_type`]), and control-flow
//! well-formedness ([`IRAnalyzer::validate_control_flow`]). Each returns
//! a boolean and, on failure, writes a one-line cause to the analyzer's
//! diagnostic sink.
//!
//! The dominator, liveness, and loop analyses expose their data shapes
//! but return empty containers; a future revision computes them. Def-use
//! chains are computed.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::ir::{IRModule, IrOp};
use crate::INVALID_INDEX;

/// Immediate-dominator tree shape, one entry per block of the function.
#[derive(Debug, Default, Clone)]
pub struct DominatorInfo {
    pub idom_indices: Vec<u32>,
    pub dominator_counts: Vec<u32>,
    pub dominators: Vec<u32>,
}

/// Per-register definition/use points and per-block live sets.
#[derive(Debug, Default, Clone)]
pub struct LivenessInfo {
    pub def_points: Vec<u32>,
    pub use_points: Vec<u32>,
    pub live_in_counts: Vec<u32>,
    pub live_in: Vec<u32>,
    pub live_out_counts: Vec<u32>,
    pub live_out: Vec<u32>,
}

/// Loop headers, per-block nesting depths, and member blocks.
#[derive(Debug, Default, Clone)]
pub struct LoopInfo {
    pub header_indices: Vec<u32>,
    pub loop_depths: Vec<u32>,
    pub block_counts: Vec<u32>,
    pub blocks: Vec<u32>,
}

/// Definition and use sites per register. Parameter registers have the
/// sentinel as their defining instruction and the entry block as their
/// defining block.
#[derive(Debug, Default)]
pub struct DefUseInfo {
    pub def: HashMap<u32, u32>,
    pub uses: HashMap<u32, Vec<u32>>,
    pub def_block: HashMap<u32, u32>,
    pub use_blocks: HashMap<u32, Vec<u32>>,
}

#[derive(Debug, Clone, Default)]
struct RegType {
    ty: Option<IrOp>,
    known_values: Vec<u32>,
}

/// Validates and analyzes a sealed IR module.
pub struct IRAnalyzer<'ir> {
    module: &'ir IRModule,
    diagnostics: Vec<String>,
}

/// Operand slots of terminators that hold block ids instead of
/// registers. Block ids are not registers, so the SSA and type walks
/// skip them; range checking belongs to control-flow validation.
fn is_block_id_operand(op: IrOp, slot: usize) -> bool {
    match op {
        IrOp::Jump => slot == 0,
        IrOp::Branch => slot == 1 || slot == 2,
        IrOp::Switch => slot >= 1,
        _ => false,
    }
}

impl<'ir> IRAnalyzer<'ir> {
    pub fn new(module: &'ir IRModule) -> Self {
        IRAnalyzer {
            module,
            diagnostics: Vec::new(),
        }
    }

    /// One-line causes recorded by failed validators and warnings from
    /// the def-use pass.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    fn fail(&mut self, message: String) -> bool {
        self.diagnostics.push(message);
        false
    }

    /// Instruction index range `[start, end)` of a function, derived
    /// from its contiguous block range. `None` for functions without
    /// blocks.
    fn instruction_range(&self, func: u32) -> Option<(u32, u32)> {
        let blocks = self.module.blocks();
        let (bb_start, bb_end) = self.module.functions().block_range(func);
        if bb_start == bb_end {
            return None;
        }
        let start = blocks.start_indices[bb_start as usize];
        let last = (bb_end - 1) as usize;
        let end = blocks.start_indices[last] + blocks.instruction_counts[last];
        Some((start, end))
    }

    /// Global register ids of a function's parameters: the first
    /// `param_count` ids of the function.
    fn param_registers(&self, func: u32) -> HashSet<u32> {
        let param_count = self.module.functions().param_counts[func as usize];
        match self.instruction_range(func) {
            Some((start, _)) => (start..start + param_count).collect(),
            None => HashSet::new(),
        }
    }

    // --- SSA validation ---

    /// Checks single definition and def-before-use per function. A
    /// type-marker (immediate-carrying) instruction defines its
    /// destination without reading registers. Phi operands come in
    /// `(value, predecessor_block)` pairs; a value is acceptable if it
    /// is a parameter register or defined in the named predecessor
    /// block. All other opcodes require every register operand to be
    /// defined by an earlier instruction.
    pub fn validate_ssa(&mut self) -> bool {
        let instructions = self.module.instructions();

        for func in 0..self.module.functions().len() as u32 {
            let Some((start, end)) = self.instruction_range(func) else {
                continue;
            };
            let param_regs = self.param_registers(func);
            let mut defined: HashSet<u32> = param_regs.clone();
            let mut block_defs: HashMap<u32, HashSet<u32>> = HashMap::new();

            for inst in start..end {
                let op = instructions.ops[inst as usize];
                let dest = instructions.destinations[inst as usize];
                let bb = instructions.bb_indices[inst as usize];

                if op.is_type_marker() || !instructions.immediates[inst as usize].is_empty() {
                    if defined.contains(&dest) {
                        return self.fail(format!(
                            "SSA violation: multiple definitions of %{} in instruction {}",
                            dest, inst
                        ));
                    }
                    defined.insert(dest);
                    block_defs.entry(bb).or_default().insert(dest);
                    continue;
                }

                let operands = instructions.operands_of(inst);
                if op == IrOp::Phi {
                    for pair in operands.chunks(2) {
                        if pair.len() != 2 {
                            return self.fail(format!(
                                "SSA violation: phi in instruction {} has an odd operand count",
                                inst
                            ));
                        }
                        let (value, pred) = (pair[0], pair[1]);
                        let defined_in_pred = block_defs
                            .get(&pred)
                            .is_some_and(|defs| defs.contains(&value));
                        if !param_regs.contains(&value) && !defined_in_pred {
                            return self.fail(format!(
                                "SSA violation: phi uses %{} which is not defined in predecessor bb{}",
                                value, pred
                            ));
                        }
                    }
                } else {
                    for (slot, &operand) in operands.iter().enumerate() {
                        if is_block_id_operand(op, slot) {
                            continue;
                        }
                        if !defined.contains(&operand) {
                            return self.fail(format!(
                                "SSA violation: use of undefined value %{} in instruction {}",
                                operand, inst
                            ));
                        }
                    }
                }

                if defined.contains(&dest) {
                    return self.fail(format!(
                        "SSA violation: multiple definitions of %{} in instruction {}",
                        dest, inst
                    ));
                }
                defined.insert(dest);
                block_defs.entry(bb).or_default().insert(dest);
            }
        }

        true
    }

    // --- Type validation ---

    /// Checks operand and result types per opcode family, seeding each
    /// function's parameter registers with their declared types.
    pub fn validate_type(&mut self) -> bool {
        let instructions = self.module.instructions();
        let functions = self.module.functions();

        for func in 0..functions.len() as u32 {
            let Some((start, end)) = self.instruction_range(func) else {
                continue;
            };

            let mut reg_types: HashMap<u32, RegType> = HashMap::new();
            for (i, &param_type) in functions.param_types_of(func).iter().enumerate() {
                reg_types.insert(
                    start + i as u32,
                    RegType {
                        ty: Some(param_type),
                        known_values: Vec::new(),
                    },
                );
            }

            for inst in start..end {
                let op = instructions.ops[inst as usize];
                let dest = instructions.destinations[inst as usize];
                let operands = instructions.operands_of(inst);
                let count = operands.len();

                if op.is_type_marker() {
                    reg_types.insert(
                        dest,
                        RegType {
                            ty: Some(op),
                            known_values: instructions.immediates[inst as usize].clone(),
                        },
                    );
                    continue;
                }

                // Types of the register operands; block-id slots yield
                // placeholders that the rules below never consult.
                let mut operand_type_list = Vec::with_capacity(count);
                for (slot, &operand) in operands.iter().enumerate() {
                    if is_block_id_operand(op, slot) || (op == IrOp::Phi && slot % 2 == 1) {
                        operand_type_list.push(IrOp::TypeVoid);
                        continue;
                    }
                    match reg_types.get(&operand).and_then(|info| info.ty) {
                        Some(ty) => operand_type_list.push(ty),
                        None => {
                            return self.fail(format!(
                                "type violation: use of undefined register %{} in instruction {}",
                                operand, inst
                            ));
                        }
                    }
                }

                let define = |reg_types: &mut HashMap<u32, RegType>, ty: IrOp| {
                    reg_types.insert(
                        dest,
                        RegType {
                            ty: Some(ty),
                            known_values: Vec::new(),
                        },
                    );
                };

                match op {
                    IrOp::Add | IrOp::Sub | IrOp::Mul | IrOp::Div | IrOp::Mod => {
                        if count != 2 {
                            return self.fail(format!(
                                "type violation: arithmetic instruction {} needs two operands",
                                inst
                            ));
                        }
                        if !operand_type_list[0].is_integer_type()
                            || !operand_type_list[1].is_integer_type()
                        {
                            return self.fail(format!(
                                "type violation: integer operands required in instruction {}",
                                inst
                            ));
                        }
                        define(
                            &mut reg_types,
                            operand_type_list[0].max(operand_type_list[1]),
                        );
                    }

                    IrOp::FAdd | IrOp::FSub | IrOp::FMul | IrOp::FDiv => {
                        if count != 2 {
                            return self.fail(format!(
                                "type violation: floating instruction {} needs two operands",
                                inst
                            ));
                        }
                        if !operand_type_list[0].is_float_type()
                            || !operand_type_list[1].is_float_type()
                        {
                            return self.fail(format!(
                                "type violation: floating operands required in instruction {}",
                                inst
                            ));
                        }
                        define(
                            &mut reg_types,
                            operand_type_list[0].max(operand_type_list[1]),
                        );
                    }

                    IrOp::And | IrOp::Or | IrOp::Xor => {
                        if count != 2 {
                            return self.fail(format!(
                                "type violation: bitwise instruction {} needs two operands",
                                inst
                            ));
                        }
                        if !operand_type_list[0].is_integer_type()
                            || !operand_type_list[1].is_integer_type()
                        {
                            return self.fail(format!(
                                "type violation: integer operands required in instruction {}",
                                inst
                            ));
                        }
                        define(
                            &mut reg_types,
                            operand_type_list[0].max(operand_type_list[1]),
                        );
                    }

                    IrOp::Not => {
                        if count != 1 {
                            return self.fail(format!(
                                "type violation: not instruction {} needs one operand",
                                inst
                            ));
                        }
                        if !operand_type_list[0].is_integer_type() {
                            return self.fail(format!(
                                "type violation: integer operand required in instruction {}",
                                inst
                            ));
                        }
                        define(&mut reg_types, operand_type_list[0]);
                    }

                    IrOp::Eq | IrOp::Ne | IrOp::Lt | IrOp::Le | IrOp::Gt | IrOp::Ge => {
                        if count != 2
                            || !operand_type_list[0].is_integer_type()
                            || !operand_type_list[1].is_integer_type()
                        {
                            return self.fail(format!(
                                "type violation: integer comparison instruction {} is ill-typed",
                                inst
                            ));
                        }
                        define(&mut reg_types, IrOp::TypeBool);
                    }

                    IrOp::FEq | IrOp::FNe | IrOp::FLt | IrOp::FLe | IrOp::FGt | IrOp::FGe => {
                        if count != 2
                            || !operand_type_list[0].is_float_type()
                            || !operand_type_list[1].is_float_type()
                        {
                            return self.fail(format!(
                                "type violation: floating comparison instruction {} is ill-typed",
                                inst
                            ));
                        }
                        define(&mut reg_types, IrOp::TypeBool);
                    }

                    IrOp::Branch => {
                        if count != 3 {
                            return self.fail(format!(
                                "type violation: branch {} requires condition and two target blocks",
                                inst
                            ));
                        }
                        if operand_type_list[0] != IrOp::TypeBool {
                            return self.fail(format!(
                                "type violation: branch condition must be boolean in instruction {}",
                                inst
                            ));
                        }
                    }

                    IrOp::Jump => {
                        if count != 1 {
                            return self.fail(format!(
                                "type violation: jump {} requires exactly one target block",
                                inst
                            ));
                        }
                    }

                    IrOp::Return => {
                        let return_type = functions.return_types[func as usize];
                        if count == 0 {
                            if return_type != IrOp::TypeVoid {
                                return self.fail(format!(
                                    "type violation: missing return value in instruction {}",
                                    inst
                                ));
                            }
                        } else if operand_type_list[0] != return_type {
                            return self.fail(format!(
                                "type violation: return type mismatch in instruction {}",
                                inst
                            ));
                        }
                    }

                    IrOp::Phi => {
                        if count < 2 || count % 2 != 0 {
                            return self.fail(format!(
                                "type violation: invalid phi operand count in instruction {}",
                                inst
                            ));
                        }
                        let phi_type = operand_type_list[0];
                        for slot in (0..count).step_by(2) {
                            if operand_type_list[slot] != phi_type {
                                return self.fail(format!(
                                    "type violation: inconsistent phi value types in instruction {}",
                                    inst
                                ));
                            }
                        }
                        define(&mut reg_types, phi_type);
                    }

                    IrOp::MemLoad => {
                        if count != 1 {
                            return self.fail(format!(
                                "type violation: load {} requires exactly one pointer operand",
                                inst
                            ));
                        }
                        if !operand_type_list[0].is_pointer_type() {
                            return self.fail(format!(
                                "type violation: load {} requires a pointer operand",
                                inst
                            ));
                        }
                        let value_type = instructions
                            .operand_types_of(inst)
                            .first()
                            .copied()
                            .unwrap_or_else(IrOp::pointee_type);
                        define(&mut reg_types, value_type);
                    }

                    IrOp::MemStore => {
                        if count != 2 {
                            return self.fail(format!(
                                "type violation: store {} requires pointer and value operands",
                                inst
                            ));
                        }
                        if !operand_type_list[0].is_pointer_type() {
                            return self.fail(format!(
                                "type violation: store {} first operand must be a pointer",
                                inst
                            ));
                        }
                    }

                    IrOp::ZExt | IrOp::SExt => {
                        if count != 1 {
                            return self.fail(format!(
                                "type violation: extension {} requires one operand",
                                inst
                            ));
                        }
                        let [from, to] = match instructions.operand_types_of(inst) {
                            [from, to] => [*from, *to],
                            _ => {
                                return self.fail(format!(
                                    "type violation: extension {} has no recorded types",
                                    inst
                                ));
                            }
                        };
                        if !operand_type_list[0].is_integer_type()
                            || !from.is_integer_type()
                            || !to.is_integer_type()
                        {
                            return self.fail(format!(
                                "type violation: extension {} requires integer types",
                                inst
                            ));
                        }
                        if to.byte_size() <= from.byte_size() {
                            return self.fail(format!(
                                "type violation: extension {} target type must be wider",
                                inst
                            ));
                        }
                        define(&mut reg_types, to);
                    }

                    IrOp::Trunc => {
                        if count != 1 {
                            return self.fail(format!(
                                "type violation: truncation {} requires one operand",
                                inst
                            ));
                        }
                        let [from, to] = match instructions.operand_types_of(inst) {
                            [from, to] => [*from, *to],
                            _ => {
                                return self.fail(format!(
                                    "type violation: truncation {} has no recorded types",
                                    inst
                                ));
                            }
                        };
                        if !operand_type_list[0].is_integer_type()
                            || !from.is_integer_type()
                            || !to.is_integer_type()
                        {
                            return self.fail(format!(
                                "type violation: truncation {} requires integer types",
                                inst
                            ));
                        }
                        if to.byte_size() >= from.byte_size() {
                            return self.fail(format!(
                                "type violation: truncation {} target type must be narrower",
                                inst
                            ));
                        }
                        define(&mut reg_types, to);
                    }

                    IrOp::Unreachable => {
                        if count != 0 {
                            return self.fail(format!(
                                "type violation: unreachable {} takes no operands",
                                inst
                            ));
                        }
                    }

                    _ => {
                        return self.fail(format!(
                            "type violation: unknown operation {:?} in instruction {}",
                            op, inst
                        ));
                    }
                }
            }
        }

        true
    }

    // --- Control-flow validation ---

    /// Checks, per function: the entry block has no predecessors, every
    /// successor id stays in the function's block range, every block is
    /// reachable from entry, and every exit block ends in `ret` or
    /// `unreachable`.
    pub fn validate_control_flow(&mut self) -> bool {
        let blocks = self.module.blocks();
        let instructions = self.module.instructions();

        for func in 0..self.module.functions().len() as u32 {
            let (bb_start, bb_end) = self.module.functions().block_range(func);
            if bb_start == bb_end {
                continue;
            }

            if blocks.predecessor_counts[bb_start as usize] != 0 {
                return self.fail(format!(
                    "control-flow violation: entry block bb{} has predecessors",
                    bb_start
                ));
            }

            for bb in bb_start..bb_end {
                for &target in blocks.successors_of(bb) {
                    if target < bb_start || target >= bb_end {
                        return self.fail(format!(
                            "control-flow violation: bb{} targets bb{} outside its function",
                            bb, target
                        ));
                    }
                }
            }

            let block_count = (bb_end - bb_start) as usize;
            let mut reachable = vec![false; block_count];
            let mut worklist = VecDeque::new();
            reachable[0] = true;
            worklist.push_back(bb_start);
            while let Some(bb) = worklist.pop_front() {
                for &target in blocks.successors_of(bb) {
                    let local = (target - bb_start) as usize;
                    if !reachable[local] {
                        reachable[local] = true;
                        worklist.push_back(target);
                    }
                }
            }
            for (local, is_reachable) in reachable.iter().enumerate() {
                if !is_reachable {
                    return self.fail(format!(
                        "control-flow violation: unreachable block bb{}",
                        bb_start + local as u32
                    ));
                }
            }

            for bb in bb_start..bb_end {
                if blocks.successor_counts[bb as usize] != 0 {
                    continue;
                }
                let count = blocks.instruction_counts[bb as usize];
                if count == 0 {
                    return self.fail(format!(
                        "control-flow violation: empty block bb{} has no terminator",
                        bb
                    ));
                }
                let last = blocks.start_indices[bb as usize] + count - 1;
                let op = instructions.ops[last as usize];
                if op != IrOp::Return && op != IrOp::Unreachable {
                    return self.fail(format!(
                        "control-flow violation: bb{} must end with return or unreachable",
                        bb
                    ));
                }
            }
        }

        true
    }

    // --- Analyses ---

    /// Dominator tree skeleton; returns empty, well-typed containers.
    pub fn analyze_dominator(&self, _function_index: u32) -> DominatorInfo {
        DominatorInfo::default()
    }

    /// Liveness skeleton; returns empty, well-typed containers.
    pub fn analyze_liveness(&self, _function_index: u32) -> LivenessInfo {
        LivenessInfo::default()
    }

    /// Loop-nest skeleton; returns empty, well-typed containers.
    pub fn analyze_loop(&self, _function_index: u32) -> LoopInfo {
        LoopInfo::default()
    }

    /// Builds definition and use sites for every register. Phi uses are
    /// attributed to their predecessor block. Uses of registers that
    /// have no definition and are not parameters are reported to the
    /// diagnostic sink as warnings.
    pub fn build_def_use_chains(&mut self) -> DefUseInfo {
        let instructions = self.module.instructions();
        let functions = self.module.functions();
        let mut info = DefUseInfo::default();

        for inst in 0..instructions.len() as u32 {
            let dest = instructions.destinations[inst as usize];
            info.def.insert(dest, inst);
            info.def_block.insert(dest, instructions.bb_indices[inst as usize]);
        }

        let mut all_params = HashSet::new();
        for func in 0..functions.len() as u32 {
            let (bb_start, bb_end) = functions.block_range(func);
            if bb_start == bb_end {
                continue;
            }
            for reg in self.param_registers(func) {
                info.def.entry(reg).or_insert(INVALID_INDEX);
                info.def_block.entry(reg).or_insert(bb_start);
                all_params.insert(reg);
            }
        }

        for inst in 0..instructions.len() as u32 {
            let op = instructions.ops[inst as usize];
            if op.is_type_marker() {
                continue;
            }
            let operands = instructions.operands_of(inst);
            if op == IrOp::Phi {
                for pair in operands.chunks(2) {
                    if let [value, pred] = *pair {
                        info.uses.entry(value).or_default().push(inst);
                        info.use_blocks.entry(value).or_default().push(pred);
                    }
                }
            } else {
                let bb = instructions.bb_indices[inst as usize];
                for (slot, &operand) in operands.iter().enumerate() {
                    if is_block_id_operand(op, slot) {
                        continue;
                    }
                    info.uses.entry(operand).or_default().push(inst);
                    info.use_blocks.entry(operand).or_default().push(bb);
                }
            }
        }

        for reg in info.uses.keys() {
            if !info.def.contains_key(reg) && !all_params.contains(reg) {
                self.diagnostics
                    .push(format!("warning: use of undefined register %{}", reg));
            }
        }

        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IRBuilder;

    fn straight_line_module() -> IRModule {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[10]);
        let b = builder.add_instruction(IrOp::TypeI32, &[5]);
        let sum = builder.add_instruction(IrOp::Add, &[a, b]);
        builder.add_instruction(IrOp::Return, &[sum]);
        builder.seal()
    }

    #[test]
    fn test_straight_line_validates() {
        let module = straight_line_module();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(analyzer.validate_ssa());
        assert!(analyzer.validate_type());
        assert!(analyzer.validate_control_flow());
        assert!(analyzer.diagnostics().is_empty());
    }

    #[test]
    fn test_use_before_definition_fails_ssa() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[1]);
        // Operand 3 is only defined after this instruction.
        builder.add_instruction(IrOp::Add, &[a, 3]);
        builder.add_instruction(IrOp::TypeI32, &[2]);
        builder.add_instruction(IrOp::Return, &[1]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_ssa());
        assert!(analyzer.diagnostics()[0].contains("undefined value %3"));
    }

    #[test]
    fn test_duplicate_destination_fails_ssa() {
        // A one-parameter function pre-defines register ids starting at
        // its first instruction index, so the first instruction collides.
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[IrOp::TypeI32], IrOp::TypeI32);
        builder.create_bb();
        builder.add_instruction(IrOp::TypeI32, &[7]);
        builder.add_instruction(IrOp::Return, &[0]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_ssa());
        assert!(analyzer.diagnostics()[0].contains("multiple definitions"));
    }

    #[test]
    fn test_phi_requires_definition_along_edge() {
        let build = |swap_pred: bool| {
            let mut builder = IRBuilder::new();
            builder.create_function("f", &[], IrOp::TypeI32);
            let entry = builder.create_bb();
            let cond = builder.add_instruction(IrOp::TypeBool, &[1]);
            let then_bb = builder.create_bb();
            let else_bb = builder.create_bb();
            let merge = builder.create_bb();
            builder.set_current_bb(entry);
            builder.add_instruction(IrOp::Branch, &[cond, then_bb, else_bb]);

            builder.set_current_bb(then_bb);
            let v1 = builder.add_instruction(IrOp::TypeI32, &[42]);
            builder.add_instruction(IrOp::Jump, &[merge]);
            builder.set_current_bb(else_bb);
            let v2 = builder.add_instruction(IrOp::TypeI32, &[24]);
            builder.add_instruction(IrOp::Jump, &[merge]);

            builder.set_current_bb(merge);
            // In the broken variant %v1 is claimed to arrive from the
            // else block, where it is not defined.
            let first_pred = if swap_pred { else_bb } else { then_bb };
            let r = builder.add_instruction(IrOp::Phi, &[v1, first_pred, v2, else_bb]);
            builder.add_instruction(IrOp::Return, &[r]);
            builder.seal()
        };

        let good = build(false);
        let mut analyzer = IRAnalyzer::new(&good);
        assert!(analyzer.validate_ssa());

        let bad = build(true);
        let mut analyzer = IRAnalyzer::new(&bad);
        assert!(!analyzer.validate_ssa());
    }

    #[test]
    fn test_add_widens_to_i64() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI64);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[1]);
        let b = builder.add_instruction(IrOp::TypeI64, &[2]);
        let sum = builder.add_instruction(IrOp::Add, &[a, b]);
        builder.add_instruction(IrOp::Return, &[sum]);

        // Returning the i64-typed sum from an i64 function type-checks.
        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(analyzer.validate_type());
    }

    #[test]
    fn test_add_result_is_not_i32() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[1]);
        let b = builder.add_instruction(IrOp::TypeI64, &[2]);
        let sum = builder.add_instruction(IrOp::Add, &[a, b]);
        builder.add_instruction(IrOp::Return, &[sum]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_type());
        assert!(analyzer.diagnostics()[0].contains("return type mismatch"));
    }

    #[test]
    fn test_float_ops_reject_integers() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeF64);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[1]);
        let b = builder.add_instruction(IrOp::TypeF64, &[2]);
        builder.add_instruction(IrOp::FAdd, &[a, b]);
        builder.add_instruction(IrOp::Return, &[2]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_type());
    }

    #[test]
    fn test_zext_must_widen() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        let v = builder.add_instruction(IrOp::TypeI32, &[42]);
        builder.add_conversion(IrOp::ZExt, &[v], IrOp::TypeI32, IrOp::TypeI32);
        builder.add_instruction(IrOp::Return, &[v]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_type());
        assert!(analyzer.diagnostics()[0].contains("must be wider"));
    }

    #[test]
    fn test_trunc_must_narrow() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI64);
        builder.create_bb();
        let v = builder.add_instruction(IrOp::TypeI32, &[42]);
        builder.add_conversion(IrOp::Trunc, &[v], IrOp::TypeI32, IrOp::TypeI64);
        builder.add_instruction(IrOp::Return, &[v]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_type());
    }

    #[test]
    fn test_missing_return_value_fails() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        builder.add_instruction(IrOp::Return, &[]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_type());
        assert!(analyzer.diagnostics()[0].contains("missing return value"));
    }

    #[test]
    fn test_void_return_accepts_no_operand() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeVoid);
        builder.create_bb();
        builder.add_instruction(IrOp::Return, &[]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(analyzer.validate_type());
        assert!(analyzer.validate_control_flow());
    }

    #[test]
    fn test_branch_condition_must_be_bool() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        let entry = builder.create_bb();
        let c = builder.add_instruction(IrOp::TypeI32, &[1]);
        let exit = builder.create_bb();
        builder.set_current_bb(entry);
        builder.add_instruction(IrOp::Branch, &[c, exit, exit]);
        builder.set_current_bb(exit);
        builder.add_instruction(IrOp::Return, &[c]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_type());
        assert!(analyzer.diagnostics()[0].contains("must be boolean"));
    }

    #[test]
    fn test_entry_with_predecessor_fails_control_flow() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeVoid);
        let entry = builder.create_bb();
        let looper = builder.create_bb();
        builder.set_current_bb(entry);
        builder.add_instruction(IrOp::Jump, &[looper]);
        builder.set_current_bb(looper);
        builder.add_instruction(IrOp::Jump, &[entry]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_control_flow());
        assert!(analyzer.diagnostics()[0].contains("entry block"));
    }

    #[test]
    fn test_fallthrough_block_fails_control_flow() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeI32);
        builder.create_bb();
        let a = builder.add_instruction(IrOp::TypeI32, &[1]);
        builder.add_instruction(IrOp::Add, &[a, a]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_control_flow());
        assert!(analyzer.diagnostics()[0].contains("return or unreachable"));
    }

    #[test]
    fn test_unreachable_block_fails_control_flow() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeVoid);
        builder.create_bb();
        builder.add_instruction(IrOp::Return, &[]);
        // Never targeted by anything.
        builder.create_bb();
        builder.add_instruction(IrOp::Return, &[]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_control_flow());
        assert!(analyzer.diagnostics()[0].contains("unreachable block"));
    }

    #[test]
    fn test_target_outside_function_fails_control_flow() {
        let mut builder = IRBuilder::new();
        builder.create_function("f", &[], IrOp::TypeVoid);
        builder.create_bb();
        builder.add_instruction(IrOp::Jump, &[7]);

        let module = builder.seal();
        let mut analyzer = IRAnalyzer::new(&module);
        assert!(!analyzer.validate_control_flow());
        assert!(analyzer.diagnostics()[0].contains("outside its function"));
    }

    #[test]
    fn test_analysis_skeletons_are_empty() {
        let module = straight_line_module();
        let analyzer = IRAnalyzer::new(&module);

        let dom = analyzer.analyze_dominator(0);
        assert!(dom.idom_indices.is_empty());
        assert!(dom.dominators.is_empty());

        let live = analyzer.analyze_liveness(0);
        assert!(live.def_points.is_empty());
        assert!(live.live_in.is_empty());

        let loops = analyzer.analyze_loop(0);
        assert!(loops.header_indices.is_empty());
        assert!(loops.blocks.is_empty());
    }

    #[test]
    fn test_def_use_chains() {
        let module = straight_line_module();
        let mut analyzer = IRAnalyzer::new(&module);
        let info = analyzer.build_def_use_chains();

        // %0 and %1 feed the add; %2 feeds the return.
        assert_eq!(info.def[&2], 2);
        assert_eq!(info.uses[&0], vec![2]);
        assert_eq!(info.uses[&1], vec![2]);
        assert_eq!(info.uses[&2], vec![3]);
        assert!(analyzer.diagnostics().is_empty());
    }
}
