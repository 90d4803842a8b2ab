//! Bitwise logic, shifts/rotates, increment/decrement and comparisons.

use super::Cpu;
use crate::bus::Bus;
use crate::opcode::AddressingMode;
use crate::registers::{Registers, FLAG_C, FLAG_N, FLAG_V, FLAG_Z};

/// Bitwise AND with A. Function: A:=A&{adr}. Flags: N Z
pub(super) fn op_and<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.a &= value;
    cpu.registers.set_nz(cpu.registers.a);
}

/// Bitwise OR with A. Function: A:=A|{adr}. Flags: N Z
pub(super) fn op_ora<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.a |= value;
    cpu.registers.set_nz(cpu.registers.a);
}

/// Bitwise XOR with A. Function: A:=A^{adr}. Flags: N Z
pub(super) fn op_eor<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.a ^= value;
    cpu.registers.set_nz(cpu.registers.a);
}

/// Test bits. Flags: Z:=(A&{adr})=0. For every mode except immediate, N and
/// V are additionally copied from bits 7 and 6 of the tested byte -
/// immediate has no "memory" whose top bits would mean anything, so the
/// CMOS `BIT #imm` form only ever touches Z.
pub(super) fn op_bit<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    cpu.registers.set_flag(FLAG_Z, cpu.registers.a & value == 0);
    if mode != AddressingMode::Immediate {
        cpu.registers.set_flag(FLAG_N, value & 0x80 != 0);
        cpu.registers.set_flag(FLAG_V, value & 0x40 != 0);
    }
}

/// Test and reset bits (CMOS only). Function: {adr}:={adr}&~A.
/// Flags: Z:=({adr}&A)=0, tested against the *original* memory value.
pub(super) fn op_trb<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let (address, value) = cpu.address_and_value(mode);
    cpu.bus_mut().poke(address, value);
    cpu.registers.set_flag(FLAG_Z, value & cpu.registers.a == 0);
    cpu.bus_mut().poke(address, value & !cpu.registers.a);
}

/// Test and set bits (CMOS only). Function: {adr}:={adr}|A.
/// Flags: Z:=({adr}&A)=0, tested against the *original* memory value.
pub(super) fn op_tsb<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let (address, value) = cpu.address_and_value(mode);
    cpu.bus_mut().poke(address, value);
    cpu.registers.set_flag(FLAG_Z, value & cpu.registers.a == 0);
    cpu.bus_mut().poke(address, value | cpu.registers.a);
}

/// Arithmetic shift left. Function: {adr}:={adr}*2. Flags: N Z C
pub(super) fn op_asl<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    cpu.apply_rmw(mode, |r, v| {
        r.set_flag(FLAG_C, v & 0x80 != 0);
        let result = v << 1;
        r.set_nz(result);
        result
    });
}

/// Logical shift right. Function: {adr}:={adr}/2. Flags: N Z C
pub(super) fn op_lsr<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    cpu.apply_rmw(mode, |r, v| {
        r.set_flag(FLAG_C, v & 0x01 != 0);
        let result = v >> 1;
        r.set_nz(result);
        result
    });
}

/// Rotate left through carry. Flags: N Z C
pub(super) fn op_rol<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    cpu.apply_rmw(mode, |r, v| {
        let carry_in = r.flag(FLAG_C) as u8;
        r.set_flag(FLAG_C, v & 0x80 != 0);
        let result = (v << 1) | carry_in;
        r.set_nz(result);
        result
    });
}

/// Rotate right through carry. Flags: N Z C
pub(super) fn op_ror<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    cpu.apply_rmw(mode, |r, v| {
        let carry_in = r.flag(FLAG_C) as u8;
        r.set_flag(FLAG_C, v & 0x01 != 0);
        let result = (v >> 1) | (carry_in << 7);
        r.set_nz(result);
        result
    });
}

/// Increment memory. Function: {adr}:={adr}+1. Flags: N Z
pub(super) fn op_inc<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    cpu.apply_rmw(mode, |r, v| {
        let result = v.wrapping_add(1);
        r.set_nz(result);
        result
    });
}

/// Decrement memory. Function: {adr}:={adr}-1. Flags: N Z
pub(super) fn op_dec<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    cpu.apply_rmw(mode, |r, v| {
        let result = v.wrapping_sub(1);
        r.set_nz(result);
        result
    });
}

/// Increment X. Function: X:=X+1. Flags: N Z
pub(super) fn op_inx<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.x = cpu.registers.x.wrapping_add(1);
    cpu.registers.set_nz(cpu.registers.x);
}

/// Increment Y. Function: Y:=Y+1. Flags: N Z
pub(super) fn op_iny<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.y = cpu.registers.y.wrapping_add(1);
    cpu.registers.set_nz(cpu.registers.y);
}

/// Decrement X. Function: X:=X-1. Flags: N Z
pub(super) fn op_dex<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.x = cpu.registers.x.wrapping_sub(1);
    cpu.registers.set_nz(cpu.registers.x);
}

/// Decrement Y. Function: Y:=Y-1. Flags: N Z
pub(super) fn op_dey<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.y = cpu.registers.y.wrapping_sub(1);
    cpu.registers.set_nz(cpu.registers.y);
}

/// Compare A. Flags: N Z C
pub(super) fn op_cmp<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    let a = cpu.registers.a;
    compare(&mut cpu.registers, a, value);
}

/// Compare X. Flags: N Z C
pub(super) fn op_cpx<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    let x = cpu.registers.x;
    compare(&mut cpu.registers, x, value);
}

/// Compare Y. Flags: N Z C
pub(super) fn op_cpy<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let value = cpu.read_value(mode, false);
    let y = cpu.registers.y;
    compare(&mut cpu.registers, y, value);
}

fn compare(registers: &mut Registers, lhs: u8, rhs: u8) {
    let result = lhs.wrapping_sub(rhs);
    registers.set_flag(FLAG_C, lhs >= rhs);
    registers.set_nz(result);
}
