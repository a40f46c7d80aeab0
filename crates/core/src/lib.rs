//! Game Boy (Sharp LR35902) instruction core.
//!
//! Three pieces:
//!
//! - [`mmu`]: the flat 64 KiB memory unit and its readiness gate
//! - [`registers`]: the 8/16-bit register file and the last-instruction cycle counter
//! - [`instruction`]: operand × operation instructions sharing one
//!   load → transform → store → charge skeleton
//!
//! Fetching and decoding opcodes is left to the caller, which builds an
//! [`Instruction`] and calls [`Instruction::execute`] once per opcode:
//!
//! ```rust
//! use gbz80_core::{Instruction, MemoryUnit, Operand, Reg8, RegisterFile};
//!
//! let mut regs = RegisterFile::new();
//! let mut mmu = MemoryUnit::new();
//! mmu.set_system_ready(true);
//!
//! regs.set_8bit_register_value(Reg8::B, 0b0000_0011);
//! let res = Instruction::reset_bit(0, Operand::Register(Reg8::B)).unwrap();
//! res.execute(&mut regs, &mut mmu);
//!
//! assert_eq!(regs.get_8bit_register_value(Reg8::B), 0b0000_0010);
//! assert_eq!(regs.get_last_instruction_execution_time(), 2);
//! ```

pub mod error;
pub mod instruction;
pub mod logging;
pub mod mmu;
pub mod registers;
pub mod snapshot;

pub use error::{InstructionError, SnapshotError};
pub use instruction::{Bit, Instruction, Operand, Operation, Writeback};
pub use mmu::{Memory, MemoryUnit, Readiness, MEMORY_SIZE};
pub use registers::{Flag, Reg16, Reg8, RegisterFile};
pub use snapshot::Snapshot;
