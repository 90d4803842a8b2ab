//! Undocumented NMOS opcodes. Most are a documented read-modify-write
//! combined with a second operation against A; a handful (AHX/SHY/SHX/TAS)
//! are the well known "unstable" family whose real silicon behavior depends
//! on bus noise this emulator doesn't model; we follow the commonly accepted
//! approximate model used by most conformance suites and note that in the
//! design ledger.

use super::ops_arith::{adc_to_registers, sbc_to_registers};
use super::Cpu;
use crate::bus::Bus;
use crate::opcode::AddressingMode;
use crate::registers::FLAG_C;

/// SLO/ASO: ASL memory then OR it into A.
pub(super) fn op_slo<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let result = cpu.apply_rmw(mode, |r, v| {
        r.set_flag(FLAG_C, v & 0x80 != 0);
        v << 1
    });
    cpu.registers.a |= result;
    cpu.registers.set_nz(cpu.registers.a);
}

/// RLA: ROL memory then AND it into A.
pub(super) fn op_rla<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let result = cpu.apply_rmw(mode, |r, v| {
        let carry_in = r.flag(FLAG_C) as u8;
        r.set_flag(FLAG_C, v & 0x80 != 0);
        (v << 1) | carry_in
    });
    cpu.registers.a &= result;
    cpu.registers.set_nz(cpu.registers.a);
}

/// SRE/LSE: LSR memory then EOR it into A.
pub(super) fn op_sre<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let result = cpu.apply_rmw(mode, |r, v| {
        r.set_flag(FLAG_C, v & 0x01 != 0);
        v >> 1
    });
    cpu.registers.a ^= result;
    cpu.registers.set_nz(cpu.registers.a);
}

/// RRA: ROR memory then ADC it into A, sharing ADC's decimal-mode handling.
pub(super) fn op_rra<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let decimal = cpu.registers.flag(crate::registers::FLAG_D);
    let cmos = cpu.variant().is_cmos();
    let result = cpu.apply_rmw(mode, |r, v| {
        let carry_in = r.flag(FLAG_C) as u8;
        r.set_flag(FLAG_C, v & 0x01 != 0);
        (v >> 1) | (carry_in << 7)
    });
    adc_to_registers(&mut cpu.registers, result, decimal, cmos);
}

/// SAX/AXS: store A&X, touching no flags.
pub(super) fn op_sax<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let value = cpu.registers.a & cpu.registers.x;
    cpu.bus_mut().poke(address, value);
}

/// LAX: load both A and X from memory.
pub(super) fn op_lax<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.a = value;
    cpu.registers.x = value;
    cpu.registers.set_nz(value);
}

/// DCP/DCM: DEC memory then CMP A against it.
pub(super) fn op_dcp<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let result = cpu.apply_rmw(mode, |_r, v| v.wrapping_sub(1));
    let a = cpu.registers.a;
    cpu.registers.set_flag(FLAG_C, a >= result);
    cpu.registers.set_nz(a.wrapping_sub(result));
}

/// ISC/ISB/INS: INC memory then SBC it from A, sharing SBC's decimal-mode
/// handling.
pub(super) fn op_isc<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let decimal = cpu.registers.flag(crate::registers::FLAG_D);
    let cmos = cpu.variant().is_cmos();
    let result = cpu.apply_rmw(mode, |_r, v| v.wrapping_add(1));
    sbc_to_registers(&mut cpu.registers, result, decimal, cmos);
}

/// ANC: AND with A, then copy the sign bit of the result into carry (as if
/// the result had been rotated/shifted out of the top).
pub(super) fn op_anc<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    cpu.registers.a &= value;
    cpu.registers.set_nz(cpu.registers.a);
    cpu.registers.set_flag(FLAG_C, cpu.registers.a & 0x80 != 0);
}

/// ALR/ASR: AND with A, then LSR the accumulator.
pub(super) fn op_alr<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    let anded = cpu.registers.a & value;
    cpu.registers.set_flag(FLAG_C, anded & 0x01 != 0);
    cpu.registers.a = anded >> 1;
    cpu.registers.set_nz(cpu.registers.a);
}

/// ARR: AND with A, then ROR the accumulator, with C/V derived from the
/// result's top two bits rather than the usual rotate-out bit.
pub(super) fn op_arr<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    let carry_in = cpu.registers.flag(FLAG_C) as u8;
    let anded = cpu.registers.a & value;
    let result = (anded >> 1) | (carry_in << 7);
    cpu.registers.a = result;
    cpu.registers.set_nz(result);
    cpu.registers.set_flag(FLAG_C, result & 0x40 != 0);
    cpu.registers
        .set_flag(crate::registers::FLAG_V, ((result >> 6) ^ (result >> 5)) & 0x01 != 0);
}

/// XAA/ANE: highly unstable on real silicon (depends on analog bus
/// capacitance effects); modeled here as the commonly used approximation
/// `A := X & operand`.
pub(super) fn op_xaa<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    cpu.registers.a = cpu.registers.x & value;
    cpu.registers.set_nz(cpu.registers.a);
}

/// AXS/SBX: X := (A&X) - operand, setting C like CMP (no V, no borrow-in).
pub(super) fn op_axs<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    let anded = cpu.registers.a & cpu.registers.x;
    let result = anded.wrapping_sub(value);
    cpu.registers.set_flag(FLAG_C, anded >= value);
    cpu.registers.set_nz(result);
    cpu.registers.x = result;
}

/// AHX/SHA/AXA: unstable. Stores `A & X & (high_byte(address)+1)`.
pub(super) fn op_ahx<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let high = (address >> 8) as u8;
    let value = cpu.registers.a & cpu.registers.x & high.wrapping_add(1);
    cpu.bus_mut().poke(address, value);
}

/// SHY/SYA: unstable. Stores `Y & (high_byte(address)+1)`.
pub(super) fn op_shy<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let high = (address >> 8) as u8;
    let value = cpu.registers.y & high.wrapping_add(1);
    cpu.bus_mut().poke(address, value);
}

/// SHX/SXA: unstable. Stores `X & (high_byte(address)+1)`.
pub(super) fn op_shx<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let high = (address >> 8) as u8;
    let value = cpu.registers.x & high.wrapping_add(1);
    cpu.bus_mut().poke(address, value);
}

/// TAS/SHS: unstable. `S := A&X`, then stores `S & (high_byte(address)+1)`.
pub(super) fn op_tas<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    cpu.registers.s = cpu.registers.a & cpu.registers.x;
    let high = (address >> 8) as u8;
    let value = cpu.registers.s & high.wrapping_add(1);
    cpu.bus_mut().poke(address, value);
}

/// LAS/LAR: A, X and S all take on `memory & S`.
pub(super) fn op_las<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    let result = value & cpu.registers.s;
    cpu.registers.a = result;
    cpu.registers.x = result;
    cpu.registers.s = result;
    cpu.registers.set_nz(result);
}
