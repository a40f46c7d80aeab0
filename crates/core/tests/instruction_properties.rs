//! Property tests for the instruction skeleton.
//!
//! The same bit algorithm must behave identically through every addressing
//! mode, and only the cycle charge may differ.

use gbz80_core::{Instruction, Memory, MemoryUnit, Operand, Reg16, Reg8, RegisterFile};
use proptest::prelude::*;

const TARGETS: [Reg8; 7] = [Reg8::A, Reg8::B, Reg8::C, Reg8::D, Reg8::E, Reg8::H, Reg8::L];

fn setup() -> (RegisterFile, MemoryUnit) {
    let mut mmu = MemoryUnit::new();
    mmu.set_system_ready(true);
    (RegisterFile::new(), mmu)
}

proptest! {
    #[test]
    fn reset_bit_register(value in any::<u8>(), bit in 0u8..8, target in 0usize..7, fill in any::<u8>()) {
        let (mut regs, mut mmu) = setup();
        let target = TARGETS[target];
        for reg in TARGETS {
            regs.set_8bit_register_value(reg, fill);
        }
        regs.set_8bit_register_value(target, value);
        let before = regs.clone();

        Instruction::reset_bit(bit, Operand::Register(target))
            .unwrap()
            .execute(&mut regs, &mut mmu);

        prop_assert_eq!(regs.get_8bit_register_value(target), value & !(1 << bit));
        prop_assert_eq!(regs.get_last_instruction_execution_time(), 2);
        for reg in Reg8::ALL.into_iter().filter(|&r| r != target) {
            prop_assert_eq!(regs.get_8bit_register_value(reg), before.get_8bit_register_value(reg));
        }
    }

    #[test]
    fn reset_bit_matches_across_modes(value in any::<u8>(), bit in 0u8..8, addr in any::<u16>()) {
        let (mut regs, mut mmu) = setup();
        regs.set_8bit_register_value(Reg8::A, value);
        regs.set_16bit_register_value(Reg16::HL, addr);
        mmu.write_byte(addr, value);

        let direct = Instruction::reset_bit(bit, Operand::Register(Reg8::A)).unwrap();
        let indirect = Instruction::reset_bit(bit, Operand::Indirect(Reg16::HL)).unwrap();

        direct.execute(&mut regs, &mut mmu);
        let register_cycles = regs.get_last_instruction_execution_time();
        indirect.execute(&mut regs, &mut mmu);
        let memory_cycles = regs.get_last_instruction_execution_time();

        prop_assert_eq!(regs.get_16bit_register_value(Reg16::HL), addr);
        prop_assert_eq!(mmu.read_byte(addr), regs.get_8bit_register_value(Reg8::A));
        prop_assert!(memory_cycles > register_cycles);
    }

    #[test]
    fn set_then_reset_restores_bit(value in any::<u8>(), bit in 0u8..8) {
        let (mut regs, mut mmu) = setup();
        regs.set_8bit_register_value(Reg8::E, value);

        Instruction::set_bit(bit, Operand::Register(Reg8::E)).unwrap().execute(&mut regs, &mut mmu);
        prop_assert_eq!(regs.get_8bit_register_value(Reg8::E), value | (1 << bit));

        Instruction::reset_bit(bit, Operand::Register(Reg8::E)).unwrap().execute(&mut regs, &mut mmu);
        prop_assert_eq!(regs.get_8bit_register_value(Reg8::E), value & !(1 << bit));
    }

    #[test]
    fn out_of_range_bits_are_rejected(bit in 8u8..=255) {
        prop_assert!(Instruction::reset_bit(bit, Operand::Register(Reg8::B)).is_err());
        prop_assert!(Instruction::set_bit(bit, Operand::Indirect(Reg16::HL)).is_err());
        prop_assert!(Instruction::test_bit(bit, Operand::Register(Reg8::A)).is_err());
    }
}

#[test]
fn reset_bit_concrete_scenarios() {
    let (mut regs, mut mmu) = setup();
    let res0 = Instruction::reset_bit(0, Operand::Register(Reg8::C)).unwrap();

    regs.set_8bit_register_value(Reg8::C, 0b0000_0011);
    res0.execute(&mut regs, &mut mmu);
    assert_eq!(regs.get_8bit_register_value(Reg8::C), 0b0000_0010);

    regs.set_8bit_register_value(Reg8::C, 0b0000_0001);
    res0.execute(&mut regs, &mut mmu);
    assert_eq!(regs.get_8bit_register_value(Reg8::C), 0);
}

#[test]
fn decoded_operands_cover_the_cb_register_field() {
    let (mut regs, mut mmu) = setup();
    for reg in TARGETS {
        regs.set_8bit_register_value(reg, 0xFF);
    }
    regs.set_16bit_register_value(Reg16::HL, 0xD000);
    // RES 4,H and RES 5,L run first and move HL to 0xC000.
    mmu.write_byte(0xC000, 0xFF);

    for code in 0..8 {
        let operand = Operand::from_code(code).unwrap();
        Instruction::reset_bit(code, operand)
            .unwrap()
            .execute(&mut regs, &mut mmu);
        let expected = if code == 6 { 4 } else { 2 };
        assert_eq!(regs.get_last_instruction_execution_time(), expected, "code {}", code);
    }

    assert_eq!(regs.get_8bit_register_value(Reg8::B), 0xFE);
    assert_eq!(regs.get_8bit_register_value(Reg8::C), 0xFD);
    assert_eq!(regs.get_8bit_register_value(Reg8::D), 0xFB);
    assert_eq!(regs.get_8bit_register_value(Reg8::E), 0xF7);
    assert_eq!(regs.get_16bit_register_value(Reg16::HL), 0xC000);
    assert_eq!(mmu.read_byte(0xC000), 0xBF);
    assert_eq!(regs.get_8bit_register_value(Reg8::A), 0x7F);
}
