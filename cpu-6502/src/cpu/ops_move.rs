//! Loads, stores, register transfers and the stack instructions (PHA/PLA
//! and friends). Nothing here touches N/Z except through `set_nz`, and
//! nothing here touches any other flag at all.

use super::Cpu;
use crate::bus::Bus;
use crate::opcode::AddressingMode;

/// Load register A. Function: A:={adr}. Flags: N Z
pub(super) fn op_lda<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.a = value;
    cpu.registers.set_nz(value);
}

/// Load register X. Function: X:={adr}. Flags: N Z
pub(super) fn op_ldx<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.x = value;
    cpu.registers.set_nz(value);
}

/// Load register Y. Function: Y:={adr}. Flags: N Z
pub(super) fn op_ldy<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode, page_penalty: bool) {
    let value = cpu.read_value(mode, page_penalty);
    cpu.registers.y = value;
    cpu.registers.set_nz(value);
}

/// Store register A. Function: {adr}:=A
pub(super) fn op_sta<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let a = cpu.registers.a;
    cpu.bus_mut().poke(address, a);
}

/// Store register X. Function: {adr}:=X
pub(super) fn op_stx<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let x = cpu.registers.x;
    cpu.bus_mut().poke(address, x);
}

/// Store register Y. Function: {adr}:=Y
pub(super) fn op_sty<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    let y = cpu.registers.y;
    cpu.bus_mut().poke(address, y);
}

/// Store zero. Function: {adr}:=0 (CMOS only)
pub(super) fn op_stz<B: Bus>(cpu: &mut Cpu<B>, mode: AddressingMode) {
    let address = cpu.address_for_write(mode);
    cpu.bus_mut().poke(address, 0);
}

/// Transfer A to X. Function: X:=A. Flags: N Z
pub(super) fn op_tax<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.x = cpu.registers.a;
    cpu.registers.set_nz(cpu.registers.x);
}

/// Transfer A to Y. Function: Y:=A. Flags: N Z
pub(super) fn op_tay<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.y = cpu.registers.a;
    cpu.registers.set_nz(cpu.registers.y);
}

/// Transfer X to A. Function: A:=X. Flags: N Z
pub(super) fn op_txa<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.a = cpu.registers.x;
    cpu.registers.set_nz(cpu.registers.a);
}

/// Transfer Y to A. Function: A:=Y. Flags: N Z
pub(super) fn op_tya<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.a = cpu.registers.y;
    cpu.registers.set_nz(cpu.registers.a);
}

/// Transfer SP to X. Function: X:=S. Flags: N Z
pub(super) fn op_tsx<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.x = cpu.registers.s;
    cpu.registers.set_nz(cpu.registers.x);
}

/// Transfer X to SP. Function: S:=X
pub(super) fn op_txs<B: Bus>(cpu: &mut Cpu<B>) {
    cpu.registers.s = cpu.registers.x;
}

/// Push A. Function: {S}:=A, S:=S-1
pub(super) fn op_pha<B: Bus>(cpu: &mut Cpu<B>) {
    let a = cpu.registers.a;
    cpu.push_u8(a);
}

/// Push P. The byte on the stack has the B flag set, unlike the live
/// register, per the same rule BRK follows.
pub(super) fn op_php<B: Bus>(cpu: &mut Cpu<B>) {
    let pushed = cpu.registers.get_p() | crate::registers::FLAG_B | crate::registers::FLAG_UNUSED;
    cpu.push_u8(pushed);
}

/// Pull A. Function: S:=S+1, A:={S}. Flags: N Z
pub(super) fn op_pla<B: Bus>(cpu: &mut Cpu<B>) {
    let value = cpu.pull_u8();
    cpu.registers.a = value;
    cpu.registers.set_nz(value);
}

/// Pull P. Function: S:=S+1, P:={S}
pub(super) fn op_plp<B: Bus>(cpu: &mut Cpu<B>) {
    let value = cpu.pull_u8();
    cpu.registers.set_p(value);
}

/// Push X (CMOS only).
pub(super) fn op_phx<B: Bus>(cpu: &mut Cpu<B>) {
    let x = cpu.registers.x;
    cpu.push_u8(x);
}

/// Push Y (CMOS only).
pub(super) fn op_phy<B: Bus>(cpu: &mut Cpu<B>) {
    let y = cpu.registers.y;
    cpu.push_u8(y);
}

/// Pull X (CMOS only). Flags: N Z
pub(super) fn op_plx<B: Bus>(cpu: &mut Cpu<B>) {
    let value = cpu.pull_u8();
    cpu.registers.x = value;
    cpu.registers.set_nz(value);
}

/// Pull Y (CMOS only). Flags: N Z
pub(super) fn op_ply<B: Bus>(cpu: &mut Cpu<B>) {
    let value = cpu.pull_u8();
    cpu.registers.y = value;
    cpu.registers.set_nz(value);
}
