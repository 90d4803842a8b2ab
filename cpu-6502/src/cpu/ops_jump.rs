//! Branches, jumps, subroutine/interrupt returns, BRK, the CMOS bit-test
//! branches (BBRn/BBSn) and bit-set/clear instructions (RMBn/SMBn), and NOP.

use super::{page_crossed, Cpu};
use crate::bus::Bus;
use crate::opcode::AddressingMode;
use crate::registers::FLAG_B;

/// Conditional branch. Reads a signed displacement unconditionally (it is
/// always part of the instruction's bytes); if `taken`, adds one cycle, and
/// a further cycle if the branch target lands on a different page than the
/// instruction following the branch.
pub(super) fn op_branch<B: Bus>(cpu: &mut Cpu<B>, taken: bool) {
    let offset = cpu.fetch_operand_byte() as i8;
    if !taken {
        return;
    }
    let origin = cpu.registers.pc;
    let target = origin.wrapping_add(offset as i16 as u16);
    cpu.registers.pc = target;
    cpu.charge_extra_cycle();
    if page_crossed(origin, target) {
        cpu.charge_extra_cycle();
    }
}

/// BBRn/BBSn (CMOS only): branch if bit `bit` of the zero-page operand is
/// clear (`set == false`) or set (`set == true`). Fixed 5-cycle cost with no
/// additional charge for the branch being taken or crossing a page - unlike
/// the unconditional branches, WDC's datasheet documents this one as a flat
/// cost regardless of outcome.
pub(super) fn op_branch_on_bit<B: Bus>(cpu: &mut Cpu<B>, bit: u8, set: bool) {
    let zp = cpu.fetch_operand_byte();
    let value = cpu.bus_mut().peek_data(zp as u16);
    let offset = cpu.fetch_operand_byte() as i8;
    let bit_set = value & (1 << bit) != 0;
    if bit_set == set {
        cpu.registers.pc = cpu.registers.pc.wrapping_add(offset as i16 as u16);
    }
}

/// RMBn (CMOS only): clear bit `bit` of the zero-page operand.
pub(super) fn op_rmb<B: Bus>(cpu: &mut Cpu<B>, bit: u8) {
    let zp = cpu.fetch_operand_byte();
    let value = cpu.bus_mut().peek_data(zp as u16);
    cpu.bus_mut().poke(zp as u16, value & !(1 << bit));
}

/// SMBn (CMOS only): set bit `bit` of the zero-page operand.
pub(super) fn op_smb<B: Bus>(cpu: &mut Cpu<B>, bit: u8) {
    let zp = cpu.fetch_operand_byte();
    let value = cpu.bus_mut().peek_data(zp as u16);
    cpu.bus_mut().poke(zp as u16, value | (1 << bit));
}

/// JMP. `Absolute` jumps straight to the operand; `Indirect` dereferences a
/// pointer (with the NMOS page-wrap bug); CMOS's `(abs,X)` form indexes the
/// pointer by X before dereferencing it, fixing the one case a plain
/// indirect jump could never reach a computed target.
pub(super) fn op_jmp<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let target = match mode {
        AddressingMode::Absolute => cpu.fetch_operand_u16(),
        AddressingMode::Indirect => cpu.resolve_indirect(),
        AddressingMode::AbsoluteX => {
            let base = cpu.fetch_operand_u16();
            let pointer = base.wrapping_add(cpu.registers.x as u16);
            cpu.bus_mut().peek_data_u16(pointer)
        }
        _ => unreachable!("JMP only uses Absolute, Indirect or AbsoluteX"),
    };
    cpu.registers.pc = target;
}

/// Jump to subroutine. Pushes the address of the *last byte of the operand*
/// (not the following instruction), which is why RTS increments after
/// pulling it back.
pub(super) fn op_jsr<B: Bus>(cpu: &mut Cpu<B>) {
    let target = cpu.fetch_operand_u16();
    let return_address = cpu.registers.pc.wrapping_sub(1);
    cpu.push_u16(return_address);
    cpu.registers.pc = target;
}

/// Return from subroutine. Pulls the pushed address and adds one to land on
/// the instruction after JSR.
pub(super) fn op_rts<B: Bus>(cpu: &mut Cpu<B>) {
    let address = cpu.pull_u16();
    cpu.registers.pc = address.wrapping_add(1);
}

/// Return from interrupt. Pulls P (via the normal bit-5/B normalization)
/// then PC, with no adjustment - unlike RTS, the pushed PC already points at
/// the instruction to resume.
pub(super) fn op_rti<B: Bus>(cpu: &mut Cpu<B>) {
    let p = cpu.pull_u8();
    cpu.registers.set_p(p);
    cpu.registers.pc = cpu.pull_u16();
}

/// Software interrupt. Increments PC past the signature byte that follows
/// the opcode, pushes PC then P with the B flag set, sets I (and clears D
/// on CMOS), and loads PC from the IRQ/BRK vector.
pub(super) fn op_brk<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.pc = cpu.registers.pc.wrapping_add(1);
    cpu.push_u16(cpu.registers.pc);
    let pushed = cpu.registers.get_p() | crate::registers::FLAG_UNUSED | FLAG_B;
    cpu.push_u8(pushed);
    cpu.registers.set_flag(crate::registers::FLAG_I, true);
    if cpu.variant().is_cmos() {
        cpu.registers.set_flag(crate::registers::FLAG_D, false);
    }
    cpu.registers.pc = cpu.bus_mut().peek_data_u16(0xFFFE);
}

/// No operation. Still consumes whatever bytes/cycles its addressing mode
/// calls for - several illegal-opcode NOPs read memory through modes other
/// than `Implicit`.
pub(super) fn op_nop<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    if mode != AddressingMode::Implicit {
        cpu.read_value(mode, page_penalty);
    }
}
