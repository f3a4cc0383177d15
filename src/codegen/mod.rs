//! Machine-code emission from sealed IR.
//!
//! One target is shipped: a deliberately small x86-64 emitter that
//! lowers the constant/add/return subset of the IR. Everything else is
//! reported as a [`crate::YucError::CodegenError`].

pub mod x86_64;

pub use x86_64::X86Generator;
