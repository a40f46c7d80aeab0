//! Operand transforms and their cycle tables.
//!
//! Each [`Operation`] is a pure function of the loaded operand and the flags.
//! It never touches memory and never decides where its result lands beyond
//! returning a [`Writeback`]. That keeps one implementation of each algorithm
//! shared by every addressing mode.

use std::fmt;

use super::operand::Operand;
use crate::error::InstructionError;
use crate::registers::{Flag, Reg8, RegisterFile};

/// A bit position, 0 (LSB) to 7 (MSB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bit(u8);

impl Bit {
    pub fn new(index: u8) -> Result<Self, InstructionError> {
        if index < 8 {
            Ok(Bit(index))
        } else {
            Err(InstructionError::BitOutOfRange(index))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn mask(self) -> u8 {
        1 << self.0
    }
}

impl TryFrom<u8> for Bit {
    type Error = InstructionError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Bit::new(index)
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the result of an [`Operation`] goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writeback {
    /// Back to the location the operand was loaded from
    Operand(u8),
    /// Into register A
    Accumulator(u8),
    /// Flags only
    Nothing,
}

/// The transform half of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ResetBit(Bit),
    SetBit(Bit),
    TestBit(Bit),
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Inc,
    Dec,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl Operation {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Operation::ResetBit(_) => "RES",
            Operation::SetBit(_) => "SET",
            Operation::TestBit(_) => "BIT",
            Operation::Rlc => "RLC",
            Operation::Rrc => "RRC",
            Operation::Rl => "RL",
            Operation::Rr => "RR",
            Operation::Sla => "SLA",
            Operation::Sra => "SRA",
            Operation::Swap => "SWAP",
            Operation::Srl => "SRL",
            Operation::Inc => "INC",
            Operation::Dec => "DEC",
            Operation::Add => "ADD",
            Operation::Adc => "ADC",
            Operation::Sub => "SUB",
            Operation::Sbc => "SBC",
            Operation::And => "AND",
            Operation::Xor => "XOR",
            Operation::Or => "OR",
            Operation::Cp => "CP",
        }
    }

    /// True for operations that combine A with the operand.
    pub fn uses_accumulator(self) -> bool {
        matches!(
            self,
            Operation::Add
                | Operation::Adc
                | Operation::Sub
                | Operation::Sbc
                | Operation::And
                | Operation::Xor
                | Operation::Or
                | Operation::Cp
        )
    }

    /// Machine cycles charged for this operation on `operand`.
    pub fn cycles(self, operand: &Operand) -> u32 {
        let indirect = matches!(operand, Operand::Indirect(_));
        match self {
            Operation::TestBit(_) => {
                if indirect {
                    3
                } else {
                    2
                }
            }
            Operation::Inc | Operation::Dec => {
                if indirect {
                    3
                } else {
                    1
                }
            }
            op if op.uses_accumulator() => match operand {
                Operand::Register(_) => 1,
                Operand::Indirect(_) | Operand::Immediate(_) => 2,
            },
            // RES, SET, rotates, shifts and SWAP
            _ => {
                if indirect {
                    4
                } else {
                    2
                }
            }
        }
    }

    /// Compute the result for `value`, updating flags in `regs`.
    pub fn apply(self, value: u8, regs: &mut RegisterFile) -> Writeback {
        match self {
            Operation::ResetBit(bit) => Writeback::Operand(value & !bit.mask()),
            Operation::SetBit(bit) => Writeback::Operand(value | bit.mask()),
            Operation::TestBit(bit) => {
                regs.set_flag(Flag::Z, value & bit.mask() == 0);
                regs.set_flag(Flag::N, false);
                regs.set_flag(Flag::H, true);
                Writeback::Nothing
            }
            Operation::Rlc => {
                let carry = value & 0x80 != 0;
                shifted(regs, value.rotate_left(1), carry)
            }
            Operation::Rrc => {
                let carry = value & 0x01 != 0;
                shifted(regs, value.rotate_right(1), carry)
            }
            Operation::Rl => {
                let old_carry = regs.get_flag(Flag::C) as u8;
                shifted(regs, (value << 1) | old_carry, value & 0x80 != 0)
            }
            Operation::Rr => {
                let old_carry = (regs.get_flag(Flag::C) as u8) << 7;
                shifted(regs, (value >> 1) | old_carry, value & 0x01 != 0)
            }
            Operation::Sla => shifted(regs, value << 1, value & 0x80 != 0),
            Operation::Sra => shifted(regs, (value >> 1) | (value & 0x80), value & 0x01 != 0),
            Operation::Srl => shifted(regs, value >> 1, value & 0x01 != 0),
            Operation::Swap => shifted(regs, value.rotate_left(4), false),
            Operation::Inc => {
                let result = value.wrapping_add(1);
                regs.set_flag(Flag::Z, result == 0);
                regs.set_flag(Flag::N, false);
                regs.set_flag(Flag::H, value & 0x0F == 0x0F);
                Writeback::Operand(result)
            }
            Operation::Dec => {
                let result = value.wrapping_sub(1);
                regs.set_flag(Flag::Z, result == 0);
                regs.set_flag(Flag::N, true);
                regs.set_flag(Flag::H, value & 0x0F == 0);
                Writeback::Operand(result)
            }
            Operation::Add => Writeback::Accumulator(add(regs, value, false)),
            Operation::Adc => Writeback::Accumulator(add(regs, value, true)),
            Operation::Sub => Writeback::Accumulator(sub(regs, value, false)),
            Operation::Sbc => Writeback::Accumulator(sub(regs, value, true)),
            Operation::Cp => {
                sub(regs, value, false);
                Writeback::Nothing
            }
            Operation::And => {
                let result = regs.get_8bit_register_value(Reg8::A) & value;
                regs.set_flags(result == 0, false, true, false);
                Writeback::Accumulator(result)
            }
            Operation::Xor => {
                let result = regs.get_8bit_register_value(Reg8::A) ^ value;
                regs.set_flags(result == 0, false, false, false);
                Writeback::Accumulator(result)
            }
            Operation::Or => {
                let result = regs.get_8bit_register_value(Reg8::A) | value;
                regs.set_flags(result == 0, false, false, false);
                Writeback::Accumulator(result)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ResetBit(bit) | Operation::SetBit(bit) | Operation::TestBit(bit) => {
                write!(f, "{} {}", self.mnemonic(), bit)
            }
            _ => f.write_str(self.mnemonic()),
        }
    }
}

// Rotates, shifts and SWAP: Z from result, N and H cleared.
fn shifted(regs: &mut RegisterFile, result: u8, carry: bool) -> Writeback {
    regs.set_flags(result == 0, false, false, carry);
    Writeback::Operand(result)
}

fn add(regs: &mut RegisterFile, value: u8, with_carry: bool) -> u8 {
    let a = regs.get_8bit_register_value(Reg8::A);
    let c = (with_carry && regs.get_flag(Flag::C)) as u8;
    let result = a as u16 + value as u16 + c as u16;
    let half = (a & 0x0F) + (value & 0x0F) + c > 0x0F;
    regs.set_flags(result as u8 == 0, false, half, result > 0xFF);
    result as u8
}

fn sub(regs: &mut RegisterFile, value: u8, with_carry: bool) -> u8 {
    let a = regs.get_8bit_register_value(Reg8::A);
    let c = (with_carry && regs.get_flag(Flag::C)) as u8;
    let result = a as i16 - value as i16 - c as i16;
    let half = (a & 0x0F) < (value & 0x0F) + c;
    regs.set_flags(result as u8 == 0, true, half, result < 0);
    result as u8
}
