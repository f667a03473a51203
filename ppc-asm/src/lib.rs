//! Decoder for 32-bit big-endian PowerPC (Xenon/VMX128) instructions.
//!
//! This crate owns the table-driven instruction decode described by the
//! recompiler's analysis and code-generation stages: bitfield extraction
//! helpers ([`bits`]), the operand descriptor table ([`operand`]), the
//! opcode identity table ([`opcode`]), and the decoded instruction form
//! ([`instruction`]) that the higher-level crate walks.

pub mod bits;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod operand;

pub use error::DecodeError;
pub use instruction::GuestInstruction;
pub use opcode::{Dialect, OpcodeEntry, OpcodeId};
pub use operand::{OperandDesc, OperandFlags};
