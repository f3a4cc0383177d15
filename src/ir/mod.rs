//! # Yu Intermediate Representation (IR)
//!
//! A register-based SSA IR structured as functions containing basic
//! blocks of typed instructions, stored throughout as structure-of-arrays
//! tables addressed by `u32` ids.
//!
//! ## Core concepts
//!
//! - **Registers are instruction indices.** The destination register of
//!   an instruction is its own index in the instruction table, so every
//!   register is assigned exactly once by construction.
//! - **A block header is an instruction.** Type-marker opcodes
//!   (`TYPE_VOID..TYPE_PTR`) materialize constants: they carry the
//!   literal bits as immediate operands and establish the SSA type of
//!   their destination register.
//! - **Phi nodes** take `(value, predecessor_block)` operand pairs and
//!   select a value based on the incoming edge.
//! - **Terminators** (`jump`, `br`, `switch`, `ret`, `invoke`,
//!   `unreachable`) end every basic block; control-flow edges are
//!   derived from them at seal time.
//!
//! ## Module organization
//!
//! - [`opcode`] — the [`IrOp`] catalogue and its range predicates
//! - [`instruction`] — the SoA instruction table
//! - [`function`] — SoA basic-block and function tables
//! - [`builder`] — append-only construction behind a write cursor
//! - [`module`] — the sealed, immutable [`IRModule`] and its textual dump
//!
//! ## Building and sealing
//!
//! ```
//! use yuc::ir::{IRBuilder, IrOp};
//!
//! let mut builder = IRBuilder::new();
//! builder.create_function("max_plus_one", &[], IrOp::TypeI32);
//! builder.create_bb();
//! let a = builder.add_instruction(IrOp::TypeI32, &[3]);
//! let b = builder.add_instruction(IrOp::TypeI32, &[4]);
//! let sum = builder.add_instruction(IrOp::Add, &[a, b]);
//! builder.add_instruction(IrOp::Return, &[sum]);
//!
//! let module = builder.seal();
//! println!("{}", module.dump());
//! ```
//!
//! Sealing is the visible fence between construction and analysis:
//! before it, nothing may observe the builder's tables; after it, the
//! module is immutable and any number of readers may share it.

pub mod builder;
pub mod function;
pub mod instruction;
pub mod module;
pub mod opcode;

pub use builder::IRBuilder;
pub use function::{BasicBlockList, FunctionList};
pub use instruction::InstructionList;
pub use module::IRModule;
pub use opcode::IrOp;
