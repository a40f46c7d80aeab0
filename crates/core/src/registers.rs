//! LR35902 register file
//!
//! Eight 8-bit registers, combinable into big-endian pairs (high register is the
//! most significant byte), plus the 16-bit stack pointer and program counter.
//! Pairs are computed from their halves on every access, so pair and half views
//! can never disagree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InstructionError;

/// Addressable 8-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg8 {
    pub const ALL: [Reg8; 8] = [
        Reg8::A,
        Reg8::F,
        Reg8::B,
        Reg8::C,
        Reg8::D,
        Reg8::E,
        Reg8::H,
        Reg8::L,
    ];

    /// Map the 3-bit register field used by opcodes (B,C,D,E,H,L,-,A).
    ///
    /// Code 6 selects `(HL)`, which is not a register; see
    /// [`Operand::from_code`](crate::instruction::Operand::from_code).
    pub fn from_code(code: u8) -> Result<Self, InstructionError> {
        match code {
            0 => Ok(Reg8::B),
            1 => Ok(Reg8::C),
            2 => Ok(Reg8::D),
            3 => Ok(Reg8::E),
            4 => Ok(Reg8::H),
            5 => Ok(Reg8::L),
            7 => Ok(Reg8::A),
            _ => Err(InstructionError::UnknownRegisterCode(code)),
        }
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg8::A => "A",
            Reg8::F => "F",
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
        };
        f.write_str(name)
    }
}

impl FromStr for Reg8 {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Reg8::A),
            "F" => Ok(Reg8::F),
            "B" => Ok(Reg8::B),
            "C" => Ok(Reg8::C),
            "D" => Ok(Reg8::D),
            "E" => Ok(Reg8::E),
            "H" => Ok(Reg8::H),
            "L" => Ok(Reg8::L),
            _ => Err(InstructionError::UnknownRegister(s.to_string())),
        }
    }
}

/// 16-bit registers and register pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl Reg16 {
    /// The (high, low) halves of a pair, or `None` for SP and PC.
    pub fn halves(self) -> Option<(Reg8, Reg8)> {
        match self {
            Reg16::AF => Some((Reg8::A, Reg8::F)),
            Reg16::BC => Some((Reg8::B, Reg8::C)),
            Reg16::DE => Some((Reg8::D, Reg8::E)),
            Reg16::HL => Some((Reg8::H, Reg8::L)),
            Reg16::SP | Reg16::PC => None,
        }
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg16::AF => "AF",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::SP => "SP",
            Reg16::PC => "PC",
        };
        f.write_str(name)
    }
}

impl FromStr for Reg16 {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AF" => Ok(Reg16::AF),
            "BC" => Ok(Reg16::BC),
            "DE" => Ok(Reg16::DE),
            "HL" => Ok(Reg16::HL),
            "SP" => Ok(Reg16::SP),
            "PC" => Ok(Reg16::PC),
            _ => Err(InstructionError::UnknownRegister(s.to_string())),
        }
    }
}

/// Flag bits in the F register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Zero
    Z,
    /// Subtract (BCD)
    N,
    /// Half carry (BCD)
    H,
    /// Carry
    C,
}

impl Flag {
    pub const fn mask(self) -> u8 {
        match self {
            Flag::Z => 0b1000_0000,
            Flag::N => 0b0100_0000,
            Flag::H => 0b0010_0000,
            Flag::C => 0b0001_0000,
        }
    }
}

// Lower 4 bits of F are hardwired to zero.
const F_MASK: u8 = 0xF0;

/// CPU register storage plus the cost of the most recent instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegisterState")]
pub struct RegisterFile {
    a: u8,
    f: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    h: u8,
    l: u8,
    sp: u16,
    pc: u16,
    /// Machine cycles charged by the last `Instruction::execute`
    last_instruction_execution_time: u32,
}

/// Serialized form of [`RegisterFile`]; F is masked on the way in.
#[derive(Deserialize)]
struct RegisterState {
    a: u8,
    f: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    h: u8,
    l: u8,
    sp: u16,
    pc: u16,
    last_instruction_execution_time: u32,
}

impl From<RegisterState> for RegisterFile {
    fn from(state: RegisterState) -> Self {
        Self {
            a: state.a,
            f: state.f & F_MASK,
            b: state.b,
            c: state.c,
            d: state.d,
            e: state.e,
            h: state.h,
            l: state.l,
            sp: state.sp,
            pc: state.pc,
            last_instruction_execution_time: state.last_instruction_execution_time,
        }
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every register and the cycle counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get_8bit_register_value(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.f,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    /// Writing F drops its low nibble, as the hardware does.
    pub fn set_8bit_register_value(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::F => self.f = value & F_MASK,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    pub fn get_16bit_register_value(&self, reg: Reg16) -> u16 {
        match reg.halves() {
            Some((hi, lo)) => u16::from_be_bytes([
                self.get_8bit_register_value(hi),
                self.get_8bit_register_value(lo),
            ]),
            None if reg == Reg16::SP => self.sp,
            None => self.pc,
        }
    }

    pub fn set_16bit_register_value(&mut self, reg: Reg16, value: u16) {
        match reg.halves() {
            Some((hi, lo)) => {
                let [high, low] = value.to_be_bytes();
                self.set_8bit_register_value(hi, high);
                self.set_8bit_register_value(lo, low);
            }
            None if reg == Reg16::SP => self.sp = value,
            None => self.pc = value,
        }
    }

    pub fn get_flag(&self, flag: Flag) -> bool {
        (self.f & flag.mask()) != 0
    }

    pub fn set_flag(&mut self, flag: Flag, val: bool) {
        if val {
            self.f |= flag.mask();
        } else {
            self.f &= !flag.mask();
        }
    }

    /// Set all four flags at once.
    pub(crate) fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.set_flag(Flag::Z, z);
        self.set_flag(Flag::N, n);
        self.set_flag(Flag::H, h);
        self.set_flag(Flag::C, c);
    }

    pub fn get_last_instruction_execution_time(&self) -> u32 {
        self.last_instruction_execution_time
    }

    pub(crate) fn set_last_instruction_execution_time(&mut self, cycles: u32) {
        self.last_instruction_execution_time = cycles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_register_file_is_zeroed() {
        let regs = RegisterFile::new();
        for reg in Reg8::ALL {
            assert_eq!(regs.get_8bit_register_value(reg), 0);
        }
        assert_eq!(regs.get_16bit_register_value(Reg16::SP), 0);
        assert_eq!(regs.get_16bit_register_value(Reg16::PC), 0);
        assert_eq!(regs.get_last_instruction_execution_time(), 0);
    }

    #[test]
    fn test_set_8bit_register_does_not_touch_others() {
        let mut regs = RegisterFile::new();
        regs.set_8bit_register_value(Reg8::D, 0x42);
        for reg in Reg8::ALL {
            let expected = if reg == Reg8::D { 0x42 } else { 0 };
            assert_eq!(regs.get_8bit_register_value(reg), expected, "register {}", reg);
        }
    }

    #[test]
    fn test_pairs_are_big_endian() {
        let mut regs = RegisterFile::new();
        regs.set_16bit_register_value(Reg16::BC, 0x1234);
        assert_eq!(regs.get_8bit_register_value(Reg8::B), 0x12);
        assert_eq!(regs.get_8bit_register_value(Reg8::C), 0x34);

        regs.set_8bit_register_value(Reg8::H, 0xAB);
        regs.set_8bit_register_value(Reg8::L, 0xCD);
        assert_eq!(regs.get_16bit_register_value(Reg16::HL), 0xABCD);
    }

    #[test]
    fn test_pair_write_follows_half_write() {
        let mut regs = RegisterFile::new();
        regs.set_16bit_register_value(Reg16::DE, 0xFFFF);
        regs.set_8bit_register_value(Reg8::E, 0x00);
        assert_eq!(regs.get_16bit_register_value(Reg16::DE), 0xFF00);
    }

    #[test]
    fn test_f_low_nibble_is_always_zero() {
        let mut regs = RegisterFile::new();
        regs.set_8bit_register_value(Reg8::F, 0xFF);
        assert_eq!(regs.get_8bit_register_value(Reg8::F), 0xF0);

        regs.set_16bit_register_value(Reg16::AF, 0x12FF);
        assert_eq!(regs.get_16bit_register_value(Reg16::AF), 0x12F0);
        assert_eq!(regs.get_8bit_register_value(Reg8::A), 0x12);
    }

    #[test]
    fn test_sp_and_pc_are_independent() {
        let mut regs = RegisterFile::new();
        regs.set_16bit_register_value(Reg16::SP, 0xFFFE);
        regs.set_16bit_register_value(Reg16::PC, 0x0100);
        assert_eq!(regs.get_16bit_register_value(Reg16::SP), 0xFFFE);
        assert_eq!(regs.get_16bit_register_value(Reg16::PC), 0x0100);
        assert_eq!(regs.get_16bit_register_value(Reg16::HL), 0);
    }

    #[test]
    fn test_flags() {
        let mut regs = RegisterFile::new();
        regs.set_flag(Flag::Z, true);
        regs.set_flag(Flag::C, true);
        assert_eq!(regs.get_8bit_register_value(Reg8::F), 0b1001_0000);
        assert!(regs.get_flag(Flag::Z));
        assert!(!regs.get_flag(Flag::N));

        regs.set_flag(Flag::Z, false);
        assert_eq!(regs.get_8bit_register_value(Reg8::F), 0b0001_0000);
    }

    #[test]
    fn test_register_parsing() {
        assert_eq!("a".parse::<Reg8>(), Ok(Reg8::A));
        assert_eq!("L".parse::<Reg8>(), Ok(Reg8::L));
        assert_eq!("hl".parse::<Reg16>(), Ok(Reg16::HL));
        assert_eq!(
            "X".parse::<Reg8>(),
            Err(InstructionError::UnknownRegister("X".to_string()))
        );
        assert!("IX".parse::<Reg16>().is_err());
    }

    #[test]
    fn test_register_codes() {
        assert_eq!(Reg8::from_code(0), Ok(Reg8::B));
        assert_eq!(Reg8::from_code(7), Ok(Reg8::A));
        assert_eq!(
            Reg8::from_code(6),
            Err(InstructionError::UnknownRegisterCode(6))
        );
        assert!(Reg8::from_code(8).is_err());
    }

    #[test]
    fn test_deserialize_masks_f() {
        let mut regs = RegisterFile::new();
        regs.set_16bit_register_value(Reg16::AF, 0x12F0);
        let mut v = serde_json::to_value(&regs).unwrap();
        v["f"] = serde_json::json!(0xFF);

        let parsed: RegisterFile = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.get_8bit_register_value(Reg8::F), 0xF0);
        assert_eq!(parsed.get_16bit_register_value(Reg16::AF), 0x12F0);
        assert_eq!(parsed, regs);
    }

    #[test]
    fn test_reset() {
        let mut regs = RegisterFile::new();
        regs.set_16bit_register_value(Reg16::HL, 0xBEEF);
        regs.set_last_instruction_execution_time(4);
        regs.reset();
        assert_eq!(regs, RegisterFile::new());
    }
}
