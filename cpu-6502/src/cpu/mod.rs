//! The execution engine: fetch/decode/dispatch, addressing-mode resolution,
//! the stack, and interrupt servicing. The actual opcode bodies live in the
//! sibling `ops_*` modules; this module is the machinery they run on top of.

use crate::bus::Bus;
use crate::error::CpuError;
use crate::opcode::{cmos_table, nmos_table, AddressingMode, OpcodeEntry, Operation};
use crate::registers::{Registers, FLAG_B, FLAG_C, FLAG_I, FLAG_UNUSED};
use crate::trace::{StdoutTrace, TraceEvent, TraceSink};
use crate::variant::Variant;

mod ops_arith;
mod ops_illegal;
mod ops_jump;
mod ops_logical;
mod ops_move;

const STACK_PAGE: u16 = 0x0100;
const VECTOR_NMI: u16 = 0xFFFA;
const VECTOR_RESET: u16 = 0xFFFC;
const VECTOR_IRQ_BRK: u16 = 0xFFFE;

/// A 6502/65C02 core wired to a host-supplied [`Bus`]. `B` is generic rather
/// than boxed so hot-loop memory access monomorphizes down to the host's
/// concrete implementation.
pub struct Cpu<B: Bus> {
    pub registers: Registers,
    bus: B,
    variant: Variant,
    table: [OpcodeEntry; 256],
    cycles: u64,
    nmi_pending: bool,
    irq_line: bool,
    /// Set by JAM/KIL. The real chip wedges the bus permanently; we model
    /// that as `execute_instruction` becoming a no-op.
    halted: bool,
    /// Set by WAI (CMOS only). Cleared the instant a pending interrupt is
    /// serviced.
    waiting: bool,
    trace: Option<Box<dyn TraceSink>>,
}

/// Construct a CPU modeling the original NMOS 6502: undocumented opcodes
/// execute, decimal-mode N/V/Z are the well-known "broken" values, and
/// `JMP (ind)` has the page-wrap bug.
pub fn new_nmos_6502<B: Bus>(bus: B) -> Cpu<B> {
    Cpu::new(Variant::Nmos6502, bus)
}

/// Construct a CPU modeling the WDC 65C02: every opcode slot is defined,
/// decimal mode computes correct flags, `JMP (ind)` fetches correctly, and
/// BRK clears the D flag.
pub fn new_cmos_65c02<B: Bus>(bus: B) -> Cpu<B> {
    Cpu::new(Variant::Cmos65C02, bus)
}

impl<B: Bus> Cpu<B> {
    pub(crate) fn new(variant: Variant, bus: B) -> Cpu<B> {
        let table = if variant.is_cmos() {
            cmos_table()
        } else {
            nmos_table()
        };
        if let Err(err) = validate_table(variant, &table) {
            panic!("{err}");
        }
        Cpu {
            registers: Registers::new(),
            bus,
            variant,
            table,
            cycles: 0,
            nmi_pending: false,
            irq_line: false,
            halted: false,
            waiting: false,
            trace: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Alias for [`Cpu::cycles`] matching the public contract's naming
    /// (`get_cycles`), kept alongside the idiomatic accessor for hosts and
    /// the conformance harness that were written against that name.
    pub fn get_cycles(&self) -> u64 {
        self.cycles
    }

    pub fn get_a(&self) -> u8 {
        self.registers.a
    }

    pub fn set_a(&mut self, value: u8) {
        self.registers.a = value;
    }

    pub fn get_x(&self) -> u8 {
        self.registers.x
    }

    pub fn set_x(&mut self, value: u8) {
        self.registers.x = value;
    }

    pub fn get_y(&self) -> u8 {
        self.registers.y
    }

    pub fn set_y(&mut self, value: u8) {
        self.registers.y = value;
    }

    pub fn get_sp(&self) -> u8 {
        self.registers.s
    }

    pub fn set_sp(&mut self, value: u8) {
        self.registers.s = value;
    }

    pub fn get_pc(&self) -> u16 {
        self.registers.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.registers.pc = value;
    }

    pub fn get_p(&self) -> u8 {
        self.registers.get_p()
    }

    pub fn set_p(&mut self, value: u8) {
        self.registers.set_p(value);
    }

    /// Combined A/X/Y/P setter, for hosts (and the conformance harness) that
    /// want to prime a whole scenario's starting state in one call.
    pub fn set_axyp(&mut self, a: u8, x: u8, y: u8, p: u8) {
        self.registers.a = a;
        self.registers.x = x;
        self.registers.y = y;
        self.registers.set_p(p);
    }

    pub fn get_axyp(&self) -> (u8, u8, u8, u8) {
        (
            self.registers.a,
            self.registers.x,
            self.registers.y,
            self.registers.get_p(),
        )
    }

    /// Charge one extra cycle, for corrections that don't fall out of the
    /// opcode table's static cost (CMOS decimal-mode ADC/SBC).
    fn charge_extra_cycle(&mut self) {
        self.cycles += 1;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Enable or disable tracing to stdout. Installing a specific sink via
    /// `set_trace_sink` is preferred when the host wants the lines somewhere
    /// other than stdout.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = if enabled {
            Some(Box::new(StdoutTrace))
        } else {
            None
        };
    }

    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Drive RESET: clears pending NMI/IRQ, sets the I flag, loads PC from
    /// the reset vector, and charges the 7 cycles hardware spends doing it.
    pub fn assert_reset(&mut self) {
        self.nmi_pending = false;
        self.irq_line = false;
        self.halted = false;
        self.waiting = false;
        self.registers.s = 0xFD;
        self.registers.set_flag(FLAG_I, true);
        self.registers.pc = self.bus.peek_data_u16(VECTOR_RESET);
        self.cycles += 7;
    }

    /// Latch an edge-triggered NMI. Serviced on the next `execute_instruction`
    /// regardless of the I flag.
    pub fn assert_nmi(&mut self) {
        if self.nmi_pending {
            tracing::warn!("assert_nmi called while an NMI is already pending");
        }
        self.nmi_pending = true;
    }

    /// Raise the level-sensitive IRQ line. Stays pending until
    /// `deassert_irq` — real hardware re-samples it every cycle, so a
    /// masked IRQ (I set) is serviced as soon as software clears I while the
    /// line is still held.
    pub fn assert_irq(&mut self) {
        if self.nmi_pending {
            tracing::warn!("assert_irq called while a higher-priority NMI is already pending");
        }
        self.irq_line = true;
    }

    pub fn deassert_irq(&mut self) {
        self.irq_line = false;
    }

    /// Fetch, decode and execute exactly one instruction (or service one
    /// pending interrupt), advancing `cycles` by however many it cost.
    pub fn execute_instruction(&mut self) {
        if self.halted {
            return;
        }

        if self.waiting {
            if self.nmi_pending || (self.irq_line && !self.registers.flag(FLAG_I)) {
                self.waiting = false;
            } else {
                self.cycles += 1;
                return;
            }
        }

        if self.poll_interrupts() {
            return;
        }

        let start_pc = self.registers.pc;
        let opcode_byte = self.bus.peek_code(start_pc);
        self.registers.pc = start_pc.wrapping_add(1);
        let entry = self.table[opcode_byte as usize];
        self.cycles += entry.cycles as u64;

        let trace_bytes = if self.trace.is_some() {
            Some(self.capture_instruction_bytes(start_pc, opcode_byte, entry.mode))
        } else {
            None
        };

        self.dispatch(entry.op, entry.mode, entry.page_penalty);

        if let Some(bytes) = trace_bytes {
            self.emit_trace(entry, start_pc, bytes);
        }
    }

    /// Service RESET/NMI/IRQ in priority order. Returns true if one was
    /// serviced (in which case no instruction fetch happens this call).
    fn poll_interrupts(&mut self) -> bool {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.service_interrupt(VECTOR_NMI, false);
            return true;
        }
        if self.irq_line && !self.registers.flag(FLAG_I) {
            self.service_interrupt(VECTOR_IRQ_BRK, false);
            return true;
        }
        false
    }

    /// Push PC and P, set I (and clear D on CMOS), load PC from `vector`.
    /// `is_brk` controls whether the pushed P has the B bit set: BRK is a
    /// software interrupt and pushes B=1, NMI/IRQ push B=0.
    fn service_interrupt(&mut self, vector: u16, is_brk: bool) {
        self.push_u16(self.registers.pc);
        let mut pushed_p = self.registers.get_p() | FLAG_UNUSED;
        if is_brk {
            pushed_p |= FLAG_B;
        } else {
            pushed_p &= !FLAG_B;
        }
        self.push_u8(pushed_p);
        self.registers.set_flag(FLAG_I, true);
        if self.variant.is_cmos() {
            self.registers.set_flag(crate::registers::FLAG_D, false);
        }
        self.registers.pc = self.bus.peek_data_u16(vector);
        self.cycles += 7;
    }

    fn capture_instruction_bytes(
        &mut self,
        start_pc: u16,
        opcode_byte: u8,
        mode: AddressingMode,
    ) -> Vec<u8> {
        let len = operand_byte_len(mode);
        let mut bytes = vec![opcode_byte];
        for i in 0..len {
            bytes.push(self.bus.peek_code(start_pc.wrapping_add(1 + i)));
        }
        bytes
    }

    fn emit_trace(&mut self, entry: OpcodeEntry, start_pc: u16, bytes: Vec<u8>) {
        let operand_text = format_operand(entry.mode, &bytes);
        let event = TraceEvent {
            pc: start_pc,
            opcode_bytes: bytes,
            mnemonic: entry.mnemonic,
            operand_text,
            a: self.registers.a,
            x: self.registers.x,
            y: self.registers.y,
            s: self.registers.s,
            p: self.registers.get_p(),
            cycles: self.cycles,
        };
        let line = event.format();
        if let Some(sink) = self.trace.as_mut() {
            sink.trace(&line);
        }
    }

    fn dispatch(&mut self, op: Operation, mode: AddressingMode, page_penalty: bool) {
        use Operation::*;
        match op {
            Lda => ops_move::op_lda(self, mode, page_penalty),
            Ldx => ops_move::op_ldx(self, mode, page_penalty),
            Ldy => ops_move::op_ldy(self, mode, page_penalty),
            Sta => ops_move::op_sta(self, mode),
            Stx => ops_move::op_stx(self, mode),
            Sty => ops_move::op_sty(self, mode),
            Stz => ops_move::op_stz(self, mode),
            Tax => ops_move::op_tax(self),
            Tay => ops_move::op_tay(self),
            Txa => ops_move::op_txa(self),
            Tya => ops_move::op_tya(self),
            Tsx => ops_move::op_tsx(self),
            Txs => ops_move::op_txs(self),
            Pha => ops_move::op_pha(self),
            Php => ops_move::op_php(self),
            Pla => ops_move::op_pla(self),
            Plp => ops_move::op_plp(self),
            Phx => ops_move::op_phx(self),
            Phy => ops_move::op_phy(self),
            Plx => ops_move::op_plx(self),
            Ply => ops_move::op_ply(self),

            And => ops_logical::op_and(self, mode, page_penalty),
            Ora => ops_logical::op_ora(self, mode, page_penalty),
            Eor => ops_logical::op_eor(self, mode, page_penalty),
            Bit => ops_logical::op_bit(self, mode),
            Trb => ops_logical::op_trb(self, mode),
            Tsb => ops_logical::op_tsb(self, mode),
            Asl => ops_logical::op_asl(self, mode),
            Lsr => ops_logical::op_lsr(self, mode),
            Rol => ops_logical::op_rol(self, mode),
            Ror => ops_logical::op_ror(self, mode),
            Inc => ops_logical::op_inc(self, mode),
            Dec => ops_logical::op_dec(self, mode),
            Inx => ops_logical::op_inx(self),
            Iny => ops_logical::op_iny(self),
            Dex => ops_logical::op_dex(self),
            Dey => ops_logical::op_dey(self),
            Cmp => ops_logical::op_cmp(self, mode, page_penalty),
            Cpx => ops_logical::op_cpx(self, mode),
            Cpy => ops_logical::op_cpy(self, mode),

            Adc => ops_arith::op_adc(self, mode, page_penalty),
            Sbc => ops_arith::op_sbc(self, mode, page_penalty),

            Bpl => {
                let taken = !self.registers.flag(crate::registers::FLAG_N);
                ops_jump::op_branch(self, taken)
            }
            Bmi => {
                let taken = self.registers.flag(crate::registers::FLAG_N);
                ops_jump::op_branch(self, taken)
            }
            Bvc => {
                let taken = !self.registers.flag(crate::registers::FLAG_V);
                ops_jump::op_branch(self, taken)
            }
            Bvs => {
                let taken = self.registers.flag(crate::registers::FLAG_V);
                ops_jump::op_branch(self, taken)
            }
            Bcc => {
                let taken = !self.registers.flag(FLAG_C);
                ops_jump::op_branch(self, taken)
            }
            Bcs => {
                let taken = self.registers.flag(FLAG_C);
                ops_jump::op_branch(self, taken)
            }
            Bne => {
                let taken = !self.registers.flag(crate::registers::FLAG_Z);
                ops_jump::op_branch(self, taken)
            }
            Beq => {
                let taken = self.registers.flag(crate::registers::FLAG_Z);
                ops_jump::op_branch(self, taken)
            }
            Bra => ops_jump::op_branch(self, true),
            Bbr(bit) => ops_jump::op_branch_on_bit(self, bit, false),
            Bbs(bit) => ops_jump::op_branch_on_bit(self, bit, true),
            Rmb(bit) => ops_jump::op_rmb(self, bit),
            Smb(bit) => ops_jump::op_smb(self, bit),

            Jmp => ops_jump::op_jmp(self, mode),
            Jsr => ops_jump::op_jsr(self),
            Rts => ops_jump::op_rts(self),
            Rti => ops_jump::op_rti(self),
            Brk => ops_jump::op_brk(self),

            Clc => self.registers.set_flag(FLAG_C, false),
            Sec => self.registers.set_flag(FLAG_C, true),
            Cld => self
                .registers
                .set_flag(crate::registers::FLAG_D, false),
            Sed => self.registers.set_flag(crate::registers::FLAG_D, true),
            Cli => self.registers.set_flag(FLAG_I, false),
            Sei => self.registers.set_flag(FLAG_I, true),
            Clv => self
                .registers
                .set_flag(crate::registers::FLAG_V, false),

            Nop => ops_jump::op_nop(self, mode, page_penalty),
            Stp => self.halted = true,
            Wai => self.waiting = true,

            Slo => ops_illegal::op_slo(self, mode),
            Rla => ops_illegal::op_rla(self, mode),
            Sre => ops_illegal::op_sre(self, mode),
            Rra => ops_illegal::op_rra(self, mode),
            Sax => ops_illegal::op_sax(self, mode),
            Lax => ops_illegal::op_lax(self, mode, page_penalty),
            Dcp => ops_illegal::op_dcp(self, mode),
            Isc => ops_illegal::op_isc(self, mode),
            Anc => ops_illegal::op_anc(self, mode),
            Alr => ops_illegal::op_alr(self, mode),
            Arr => ops_illegal::op_arr(self, mode),
            Xaa => ops_illegal::op_xaa(self, mode),
            Axs => ops_illegal::op_axs(self, mode),
            Ahx => ops_illegal::op_ahx(self, mode),
            Shy => ops_illegal::op_shy(self, mode),
            Shx => ops_illegal::op_shx(self, mode),
            Tas => ops_illegal::op_tas(self, mode),
            Las => ops_illegal::op_las(self, mode, page_penalty),
            Jam => self.halted = true,
        }
    }

    // -- Stack -----------------------------------------------------------

    fn push_u8(&mut self, value: u8) {
        self.bus.poke(STACK_PAGE | self.registers.s as u16, value);
        self.registers.s = self.registers.s.wrapping_sub(1);
    }

    fn pull_u8(&mut self) -> u8 {
        self.registers.s = self.registers.s.wrapping_add(1);
        self.bus.peek_data(STACK_PAGE | self.registers.s as u16)
    }

    fn push_u16(&mut self, value: u16) {
        self.push_u8((value >> 8) as u8);
        self.push_u8((value & 0xFF) as u8);
    }

    fn pull_u16(&mut self) -> u16 {
        let lo = self.pull_u8();
        let hi = self.pull_u8();
        u16::from_le_bytes([lo, hi])
    }

    // -- Addressing mode resolution --------------------------------------

    fn fetch_operand_byte(&mut self) -> u8 {
        let value = self.bus.peek_code(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);
        value
    }

    fn fetch_operand_u16(&mut self) -> u16 {
        let lo = self.fetch_operand_byte();
        let hi = self.fetch_operand_byte();
        u16::from_le_bytes([lo, hi])
    }

    /// Resolve `mode` to an effective address plus whether indexing crossed
    /// a page boundary. Not meaningful for `Implicit`, `Accumulator`,
    /// `Relative` or `ZeroPageRelative`, which each have their own handling.
    fn resolve_address(&mut self, mode: AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::ZeroPage => (self.fetch_operand_byte() as u16, false),
            AddressingMode::ZeroPageX => {
                let zp = self.fetch_operand_byte();
                (zp.wrapping_add(self.registers.x) as u16, false)
            }
            AddressingMode::ZeroPageY => {
                let zp = self.fetch_operand_byte();
                (zp.wrapping_add(self.registers.y) as u16, false)
            }
            AddressingMode::Absolute => (self.fetch_operand_u16(), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_operand_u16();
                let address = base.wrapping_add(self.registers.x as u16);
                (address, page_crossed(base, address))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_operand_u16();
                let address = base.wrapping_add(self.registers.y as u16);
                (address, page_crossed(base, address))
            }
            AddressingMode::IndirectX => {
                let zp = self.fetch_operand_byte();
                let ptr = zp.wrapping_add(self.registers.x);
                (self.bus.peek_zero_page_u16(ptr), false)
            }
            AddressingMode::IndirectY => {
                let zp = self.fetch_operand_byte();
                let base = self.bus.peek_zero_page_u16(zp);
                let address = base.wrapping_add(self.registers.y as u16);
                (address, page_crossed(base, address))
            }
            AddressingMode::ZeroPageIndirect => {
                let zp = self.fetch_operand_byte();
                (self.bus.peek_zero_page_u16(zp), false)
            }
            AddressingMode::Immediate => {
                let pc = self.registers.pc;
                self.registers.pc = self.registers.pc.wrapping_add(1);
                (pc, false)
            }
            AddressingMode::Implicit
            | AddressingMode::Accumulator
            | AddressingMode::Relative
            | AddressingMode::Indirect
            | AddressingMode::ZeroPageRelative => {
                unreachable!("{mode:?} has its own resolution path")
            }
        }
    }

    /// Read the operand value for a mode, charging the indexed page-cross
    /// penalty when `page_penalty` is set and the effective address crossed
    /// a page.
    fn read_value(&mut self, mode: AddressingMode, page_penalty: bool) -> u8 {
        let (address, crossed) = self.resolve_address(mode);
        if page_penalty && crossed {
            self.cycles += 1;
        }
        self.bus.peek_data(address)
    }

    fn address_and_value(&mut self, mode: AddressingMode) -> (u16, u8) {
        let (address, _) = self.resolve_address(mode);
        let value = self.bus.peek_data(address);
        (address, value)
    }

    fn address_for_write(&mut self, mode: AddressingMode) -> u16 {
        let (address, _) = self.resolve_address(mode);
        address
    }

    /// Run a read-modify-write instruction: for `Accumulator` this operates
    /// directly on A; otherwise it performs the bus's dummy write of the
    /// unmodified value before writing the final result, matching the extra
    /// bus cycle real RMW instructions spend. Returns the computed result so
    /// combo illegal opcodes (RRA, ISC, ...) can chain a second operation
    /// onto it.
    fn apply_rmw(
        &mut self,
        mode: AddressingMode,
        f: impl FnOnce(&mut Registers, u8) -> u8,
    ) -> u8 {
        if mode == AddressingMode::Accumulator {
            let value = self.registers.a;
            let result = f(&mut self.registers, value);
            self.registers.a = result;
            result
        } else {
            let (address, value) = self.resolve_address(mode);
            let value = self.bus.peek_data(address);
            self.bus.poke(address, value);
            let result = f(&mut self.registers, value);
            self.bus.poke(address, result);
            result
        }
    }

    /// `JMP (ind)`'s pointer fetch. NMOS has the famous bug where a pointer
    /// stored at a page boundary (low byte `$xxFF`) reads its high byte from
    /// `$xx00` instead of the next page; CMOS fixed this (at the cost of one
    /// extra cycle, already reflected in the table).
    fn resolve_indirect(&mut self) -> u16 {
        let pointer = self.fetch_operand_u16();
        let lo = self.bus.peek_data(pointer);
        let hi_address = if !self.variant.is_cmos() && (pointer & 0x00FF) == 0x00FF {
            pointer & 0xFF00
        } else {
            pointer.wrapping_add(1)
        };
        let hi = self.bus.peek_data(hi_address);
        u16::from_le_bytes([lo, hi])
    }
}

fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

fn operand_byte_len(mode: AddressingMode) -> u16 {
    match mode {
        AddressingMode::Implicit | AddressingMode::Accumulator => 0,
        AddressingMode::Immediate
        | AddressingMode::ZeroPage
        | AddressingMode::ZeroPageX
        | AddressingMode::ZeroPageY
        | AddressingMode::IndirectX
        | AddressingMode::IndirectY
        | AddressingMode::ZeroPageIndirect
        | AddressingMode::Relative => 1,
        AddressingMode::Absolute
        | AddressingMode::AbsoluteX
        | AddressingMode::AbsoluteY
        | AddressingMode::Indirect
        | AddressingMode::ZeroPageRelative => 2,
    }
}

fn format_operand(mode: AddressingMode, bytes: &[u8]) -> String {
    match mode {
        AddressingMode::Implicit => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate => format!("#${:02X}", bytes.get(1).copied().unwrap_or(0)),
        AddressingMode::ZeroPage => format!("${:02X}", bytes.get(1).copied().unwrap_or(0)),
        AddressingMode::ZeroPageX => format!("${:02X},X", bytes.get(1).copied().unwrap_or(0)),
        AddressingMode::ZeroPageY => format!("${:02X},Y", bytes.get(1).copied().unwrap_or(0)),
        AddressingMode::IndirectX => format!("(${:02X},X)", bytes.get(1).copied().unwrap_or(0)),
        AddressingMode::IndirectY => format!("(${:02X}),Y", bytes.get(1).copied().unwrap_or(0)),
        AddressingMode::ZeroPageIndirect => {
            format!("(${:02X})", bytes.get(1).copied().unwrap_or(0))
        }
        AddressingMode::Relative => {
            let offset = bytes.get(1).copied().unwrap_or(0) as i8;
            format!("*{offset:+}")
        }
        AddressingMode::ZeroPageRelative => {
            let zp = bytes.get(1).copied().unwrap_or(0);
            let offset = bytes.get(2).copied().unwrap_or(0) as i8;
            format!("${zp:02X},*{offset:+}")
        }
        AddressingMode::Absolute => {
            let word = u16::from_le_bytes([
                bytes.get(1).copied().unwrap_or(0),
                bytes.get(2).copied().unwrap_or(0),
            ]);
            format!("${word:04X}")
        }
        AddressingMode::AbsoluteX => {
            let word = u16::from_le_bytes([
                bytes.get(1).copied().unwrap_or(0),
                bytes.get(2).copied().unwrap_or(0),
            ]);
            format!("${word:04X},X")
        }
        AddressingMode::AbsoluteY => {
            let word = u16::from_le_bytes([
                bytes.get(1).copied().unwrap_or(0),
                bytes.get(2).copied().unwrap_or(0),
            ]);
            format!("${word:04X},Y")
        }
        AddressingMode::Indirect => {
            let word = u16::from_le_bytes([
                bytes.get(1).copied().unwrap_or(0),
                bytes.get(2).copied().unwrap_or(0),
            ]);
            format!("(${word:04X})")
        }
    }
}

fn validate_table(variant: Variant, table: &[OpcodeEntry; 256]) -> Result<(), CpuError> {
    let name = if variant.is_cmos() {
        "CMOS 65C02"
    } else {
        "NMOS 6502"
    };
    if variant.is_cmos() {
        for (opcode, entry) in table.iter().enumerate() {
            if entry.mnemonic.is_empty() {
                return Err(CpuError::MissingOpcodeEntry {
                    variant: name,
                    opcode: opcode as u8,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bus::FlatMemory;

    fn cpu_at(pc: u16, program: &[u8]) -> Cpu<FlatMemory> {
        let mut mem = FlatMemory::new();
        mem.load(pc, program);
        let mut cpu = new_nmos_6502(mem);
        cpu.registers.pc = pc;
        cpu
    }

    #[test]
    fn reset_loads_pc_from_vector_and_charges_seven_cycles() {
        let mut mem = FlatMemory::new();
        mem.load(VECTOR_RESET, &[0x00, 0x80]);
        let mut cpu = new_nmos_6502(mem);
        cpu.assert_reset();
        assert_eq!(cpu.registers.pc, 0x8000);
        assert_eq!(cpu.cycles(), 7);
    }

    #[test]
    fn lda_immediate_sets_accumulator_and_flags() {
        let mut cpu = cpu_at(0x0200, &[0xA9, 0x00]);
        cpu.execute_instruction();
        assert_eq!(cpu.registers.a, 0x00);
        assert!(cpu.registers.flag(crate::registers::FLAG_Z));
        assert_eq!(cpu.cycles(), 2);
    }

    #[test]
    fn absolute_x_read_charges_page_cross_penalty() {
        let mut cpu = cpu_at(0x0200, &[0xBD, 0xFF, 0x00]);
        cpu.registers.x = 1;
        cpu.execute_instruction();
        assert_eq!(cpu.cycles(), 5);
    }

    #[test]
    fn jsr_then_rts_round_trips_program_counter() {
        let mut cpu = cpu_at(0x0200, &[0x20, 0x00, 0x03]);
        cpu.bus_mut().load(0x0300, &[0x60]);
        cpu.execute_instruction();
        assert_eq!(cpu.registers.pc, 0x0300);
        cpu.execute_instruction();
        assert_eq!(cpu.registers.pc, 0x0203);
    }

    #[test]
    fn nmi_has_priority_over_irq_and_pushes_b_clear() {
        let mut cpu = cpu_at(0x0200, &[0xEA]);
        cpu.bus_mut().load(VECTOR_NMI, &[0x00, 0x90]);
        cpu.bus_mut().load(VECTOR_IRQ_BRK, &[0x00, 0xA0]);
        cpu.registers.s = 0xFD;
        cpu.assert_nmi();
        cpu.assert_irq();
        cpu.execute_instruction();
        assert_eq!(cpu.registers.pc, 0x9000);
        let pushed_p = cpu.bus_mut().peek_data(0x01FD);
        assert_eq!(pushed_p & FLAG_B, 0);
    }

    #[test]
    fn jmp_indirect_has_nmos_page_wrap_bug() {
        // Pointer is $03FF: the bug reads the high byte back from $0300
        // instead of $0400.
        let mut cpu = cpu_at(0x0200, &[0x6C, 0xFF, 0x03]);
        cpu.bus_mut().load(0x03FF, &[0x34]);
        cpu.bus_mut().load(0x0300, &[0x12]);
        cpu.bus_mut().load(0x0400, &[0x99]);
        cpu.execute_instruction();
        assert_eq!(cpu.registers.pc, 0x1234);
    }

    #[test]
    fn stp_halts_further_execution() {
        let mut cpu = cpu_at(0x0200, &[0xDB, 0xEA]);
        cpu.variant = Variant::Cmos65C02;
        cpu.table = cmos_table();
        cpu.execute_instruction();
        assert!(cpu.is_halted());
        let cycles = cpu.cycles();
        cpu.execute_instruction();
        assert_eq!(cpu.cycles(), cycles);
    }
}
