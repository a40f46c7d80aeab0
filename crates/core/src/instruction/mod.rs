//! Instruction execution
//!
//! An [`Instruction`] pairs an [`Operand`] (where the value lives) with an
//! [`Operation`] (what happens to it). Every instruction runs the same four
//! steps:
//!
//! 1. load the operand
//! 2. apply the operation, which may update flags
//! 3. write the result back (to the operand, to A, or nowhere)
//! 4. record the machine cycles this operation costs for this operand
//!
//! so an algorithm such as "clear bit n" is written once in [`Operation`] and
//! shared by the register, `(HL)` and any other addressing variant.
//!
//! Instructions are built by the dispatcher right before use. They hold no
//! state and borrow the register file and memory only for the duration of
//! [`Instruction::execute`].

mod operand;
mod operation;

pub use operand::Operand;
pub use operation::{Bit, Operation, Writeback};

use std::fmt;

use crate::error::InstructionError;
use crate::logging::{log, LogCategory, LogLevel};
use crate::mmu::Memory;
use crate::registers::{Reg16, Reg8, RegisterFile};

/// A fully configured operation on one operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    operation: Operation,
    operand: Operand,
}

impl Instruction {
    /// Build an instruction, rejecting combinations the CPU does not have.
    ///
    /// Only the accumulator ALU takes an immediate operand, and memory can
    /// only be addressed through BC, DE or HL.
    pub fn new(operation: Operation, operand: Operand) -> Result<Self, InstructionError> {
        match operand {
            Operand::Immediate(_) if !operation.uses_accumulator() => {
                Err(InstructionError::ImmediateOperand(operation.mnemonic()))
            }
            Operand::Indirect(pair @ (Reg16::AF | Reg16::SP | Reg16::PC)) => {
                Err(InstructionError::UnsupportedIndirectPair(pair))
            }
            _ => Ok(Self { operation, operand }),
        }
    }

    /// `RES bit,operand`
    pub fn reset_bit(bit: u8, operand: Operand) -> Result<Self, InstructionError> {
        Self::new(Operation::ResetBit(Bit::new(bit)?), operand)
    }

    /// `SET bit,operand`
    pub fn set_bit(bit: u8, operand: Operand) -> Result<Self, InstructionError> {
        Self::new(Operation::SetBit(Bit::new(bit)?), operand)
    }

    /// `BIT bit,operand`
    pub fn test_bit(bit: u8, operand: Operand) -> Result<Self, InstructionError> {
        Self::new(Operation::TestBit(Bit::new(bit)?), operand)
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn operand(&self) -> Operand {
        self.operand
    }

    /// Machine cycles this instruction charges.
    pub fn cycles(&self) -> u32 {
        self.operation.cycles(&self.operand)
    }

    /// Run the instruction against `regs` and `memory`.
    pub fn execute<M: Memory>(&self, regs: &mut RegisterFile, memory: &mut M) {
        let value = self.operand.load(regs, memory);
        match self.operation.apply(value, regs) {
            Writeback::Operand(result) => self.operand.store(regs, memory, result),
            Writeback::Accumulator(result) => regs.set_8bit_register_value(Reg8::A, result),
            Writeback::Nothing => {}
        }
        let cycles = self.cycles();
        regs.set_last_instruction_execution_time(cycles);

        log(LogCategory::Cpu, LogLevel::Trace, || {
            format!(
                "CPU: {:<12} PC={:04X} AF={:04X} BC={:04X} DE={:04X} HL={:04X} cycles={}",
                self.to_string(),
                regs.get_16bit_register_value(Reg16::PC),
                regs.get_16bit_register_value(Reg16::AF),
                regs.get_16bit_register_value(Reg16::BC),
                regs.get_16bit_register_value(Reg16::DE),
                regs.get_16bit_register_value(Reg16::HL),
                cycles
            )
        });
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Operation::ResetBit(_) | Operation::SetBit(_) | Operation::TestBit(_) => {
                write!(f, "{},{}", self.operation, self.operand)
            }
            Operation::Add | Operation::Adc | Operation::Sbc => {
                write!(f, "{} A,{}", self.operation, self.operand)
            }
            _ => write!(f, "{} {}", self.operation, self.operand),
        }
    }
}
