//! Addressing modes: where an instruction's 8-bit operand lives.

use std::fmt;

use crate::error::InstructionError;
use crate::mmu::Memory;
use crate::registers::{Reg16, Reg8, RegisterFile};

/// Operand location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// An 8-bit register
    Register(Reg8),
    /// The memory cell addressed by a register pair, e.g. `(HL)`
    Indirect(Reg16),
    /// A constant fetched by the dispatcher (`d8`)
    Immediate(u8),
}

impl Operand {
    /// Decode the 3-bit operand field: B,C,D,E,H,L,(HL),A.
    pub fn from_code(code: u8) -> Result<Self, InstructionError> {
        match code {
            6 => Ok(Operand::Indirect(Reg16::HL)),
            _ => Reg8::from_code(code).map(Operand::Register),
        }
    }

    pub(crate) fn load<M: Memory>(&self, regs: &RegisterFile, memory: &M) -> u8 {
        match *self {
            Operand::Register(reg) => regs.get_8bit_register_value(reg),
            Operand::Indirect(pair) => memory.read_byte(regs.get_16bit_register_value(pair)),
            Operand::Immediate(value) => value,
        }
    }

    pub(crate) fn store<M: Memory>(&self, regs: &mut RegisterFile, memory: &mut M, value: u8) {
        match *self {
            Operand::Register(reg) => regs.set_8bit_register_value(reg, value),
            Operand::Indirect(pair) => {
                memory.write_byte(regs.get_16bit_register_value(pair), value)
            }
            Operand::Immediate(_) => {
                unreachable!("immediate operands are rejected when the instruction is built")
            }
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(reg) => write!(f, "{}", reg),
            Operand::Indirect(pair) => write!(f, "({})", pair),
            Operand::Immediate(value) => write!(f, "${:02X}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmu::MemoryUnit;

    #[test]
    fn test_from_code() {
        assert_eq!(Operand::from_code(0), Ok(Operand::Register(Reg8::B)));
        assert_eq!(Operand::from_code(6), Ok(Operand::Indirect(Reg16::HL)));
        assert_eq!(Operand::from_code(7), Ok(Operand::Register(Reg8::A)));
        assert_eq!(
            Operand::from_code(9),
            Err(InstructionError::UnknownRegisterCode(9))
        );
    }

    #[test]
    fn test_indirect_follows_pair() {
        let mut regs = RegisterFile::new();
        let mut mmu = MemoryUnit::new();
        mmu.set_system_ready(true);
        regs.set_16bit_register_value(Reg16::DE, 0xC000);

        let operand = Operand::Indirect(Reg16::DE);
        operand.store(&mut regs, &mut mmu, 0x5A);
        assert_eq!(mmu.read_byte(0xC000), 0x5A);
        assert_eq!(operand.load(&regs, &mmu), 0x5A);
    }

    #[test]
    fn test_register_and_immediate_load() {
        let mut regs = RegisterFile::new();
        let mmu = MemoryUnit::new();
        regs.set_8bit_register_value(Reg8::L, 0x99);
        assert_eq!(Operand::Register(Reg8::L).load(&regs, &mmu), 0x99);
        assert_eq!(Operand::Immediate(0x07).load(&regs, &mmu), 0x07);
    }

    #[test]
    fn test_display() {
        assert_eq!(Operand::Register(Reg8::C).to_string(), "C");
        assert_eq!(Operand::Indirect(Reg16::HL).to_string(), "(HL)");
        assert_eq!(Operand::Immediate(0x0A).to_string(), "$0A");
    }
}
