//! The decoded opcode tables: the actual decoder. Hot-path dispatch never
//! does string matching — `Cpu::execute_instruction` looks an entry up by
//! indexing a 256-element array with the fetched opcode byte, then matches
//! on the entry's `Operation` tag. One table is built for NMOS, one for
//! CMOS; which one a `Cpu` holds is fixed at construction by its `Variant`.

/// The effective-address computation an opcode selects. Distinguishing
/// `Accumulator` from `Implicit` (both "no memory operand") lets shift/inc/dec
/// operations share one implementation across "on A" and "on memory" forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implicit,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Relative,
    Indirect,
    IndirectX,
    IndirectY,
    /// CMOS-only `(zp)`.
    ZeroPageIndirect,
    /// CMOS-only dual operand used by BBRn/BBSn: a zero-page address to test
    /// a bit in, followed by a branch displacement.
    ZeroPageRelative,
}

/// The operation an opcode selects, independent of how its operand was
/// fetched. One function per variant implements it in `cpu.rs`'s `impl`
/// blocks; the opcode table only ever supplies the tag plus the addressing
/// mode, cycle count and page-cross correction to pair with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Txa,
    Tya,
    Tsx,
    Txs,
    Pha,
    Php,
    Pla,
    Plp,
    Phx,
    Phy,
    Plx,
    Ply,
    And,
    Ora,
    Eor,
    Bit,
    Trb,
    Tsb,
    Adc,
    Sbc,
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
    Inx,
    Iny,
    Dex,
    Dey,
    Cmp,
    Cpx,
    Cpy,
    Bpl,
    Bmi,
    Bvc,
    Bvs,
    Bcc,
    Bcs,
    Bne,
    Beq,
    Bra,
    /// Branch on bit `n` of the zero-page operand being clear/set (CMOS).
    Bbr(u8),
    Bbs(u8),
    /// Reset/set bit `n` of the zero-page operand (CMOS).
    Rmb(u8),
    Smb(u8),
    Jmp,
    Jsr,
    Rts,
    Rti,
    Clc,
    Sec,
    Cld,
    Sed,
    Cli,
    Sei,
    Clv,
    Brk,
    Nop,
    Stp,
    Wai,
    // Undocumented NMOS opcodes.
    Slo,
    Rla,
    Sre,
    Rra,
    Sax,
    Lax,
    Dcp,
    Isc,
    Anc,
    Alr,
    Arr,
    Xaa,
    Axs,
    Ahx,
    Shy,
    Shx,
    Tas,
    Las,
    /// Halt-and-catch-fire opcode (aka KIL). Hardware locks the bus up
    /// permanently; see `Cpu::execute_instruction`'s halted-state handling.
    Jam,
}

/// How an addressing mode's bus accesses are shaped, for cycle-count
/// derivation. The 6502's cycle counts are overwhelmingly a function of
/// *mode* plus this read/write/read-modify-write shape, not of the specific
/// mnemonic, so `default_cycles` derives the bulk of the table mechanically
/// and only a handful of opcodes (stack ops, jumps, BRK, branches) need an
/// explicit override below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
    ReadModifyWrite,
}

/// One decoded table slot.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeEntry {
    pub mnemonic: &'static str,
    pub op: Operation,
    pub mode: AddressingMode,
    pub cycles: u8,
    /// Whether an indexed read should charge +1 cycle when the index
    /// crosses a page boundary. Never set on writes or RMW entries — those
    /// always perform the dummy read/write and so already carry the cost in
    /// `cycles`.
    pub page_penalty: bool,
}

fn default_cycles(mode: AddressingMode, kind: AccessKind) -> u8 {
    use AccessKind::*;
    use AddressingMode::*;
    match mode {
        Implicit | Accumulator | Immediate | Relative => 2,
        ZeroPage => match kind {
            Read | Write => 3,
            ReadModifyWrite => 5,
        },
        ZeroPageX | ZeroPageY => match kind {
            Read | Write => 4,
            ReadModifyWrite => 6,
        },
        Absolute => match kind {
            Read | Write => 4,
            ReadModifyWrite => 6,
        },
        AbsoluteX | AbsoluteY => match kind {
            Read => 4,
            Write => 5,
            ReadModifyWrite => 7,
        },
        Indirect => 5,
        IndirectX => match kind {
            Read | Write => 6,
            ReadModifyWrite => 8,
        },
        IndirectY => match kind {
            Read => 5,
            Write => 6,
            ReadModifyWrite => 8,
        },
        ZeroPageIndirect => match kind {
            Read | Write => 5,
            ReadModifyWrite => 7,
        },
        ZeroPageRelative => 5,
    }
}

fn entry(mnemonic: &'static str, op: Operation, mode: AddressingMode, kind: AccessKind) -> OpcodeEntry {
    let page_penalty = kind == AccessKind::Read
        && matches!(
            mode,
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteY | AddressingMode::IndirectY
        );
    OpcodeEntry {
        mnemonic,
        op,
        mode,
        cycles: default_cycles(mode, kind),
        page_penalty,
    }
}

fn entry_cycles(
    mnemonic: &'static str,
    op: Operation,
    mode: AddressingMode,
    cycles: u8,
) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        op,
        mode,
        cycles,
        page_penalty: false,
    }
}

fn undefined() -> OpcodeEntry {
    OpcodeEntry {
        mnemonic: "",
        op: Operation::Jam,
        mode: AddressingMode::Implicit,
        cycles: 2,
        page_penalty: false,
    }
}

/// Build the 256-entry NMOS 6502 decode table. See the source comments on
/// each row for the opcode-matrix grouping; the layout mirrors the widely
/// published "undocumented 6502 opcodes" grid (e.g. the one on
/// oxyron.de/html/opcodes02.html), which this implementation treats as the
/// ground truth for opcode→(mnemonic, mode) assignment.
pub fn nmos_table() -> [OpcodeEntry; 256] {
    use AccessKind::*;
    use AddressingMode::*;
    use Operation::*;

    let mut t = [undefined(); 256];
    macro_rules! set {
        ($opcode:expr, $mnemonic:expr, $op:expr, $mode:expr, $kind:expr) => {
            t[$opcode] = entry($mnemonic, $op, $mode, $kind);
        };
    }
    macro_rules! setc {
        ($opcode:expr, $mnemonic:expr, $op:expr, $mode:expr, $cycles:expr) => {
            t[$opcode] = entry_cycles($mnemonic, $op, $mode, $cycles);
        };
    }

    // Row 0x0_
    setc!(0x00, "BRK", Brk, Implicit, 7);
    set!(0x01, "ORA", Ora, IndirectX, Read);
    set!(0x03, "SLO", Slo, IndirectX, ReadModifyWrite);
    set!(0x04, "NOP", Nop, ZeroPage, Read);
    set!(0x05, "ORA", Ora, ZeroPage, Read);
    set!(0x06, "ASL", Asl, ZeroPage, ReadModifyWrite);
    set!(0x07, "SLO", Slo, ZeroPage, ReadModifyWrite);
    setc!(0x08, "PHP", Php, Implicit, 3);
    set!(0x09, "ORA", Ora, Immediate, Read);
    setc!(0x0A, "ASL", Asl, Accumulator, 2);
    set!(0x0B, "ANC", Anc, Immediate, Read);
    set!(0x0C, "NOP", Nop, Absolute, Read);
    set!(0x0D, "ORA", Ora, Absolute, Read);
    set!(0x0E, "ASL", Asl, Absolute, ReadModifyWrite);
    set!(0x0F, "SLO", Slo, Absolute, ReadModifyWrite);

    // Row 0x1_
    setc!(0x10, "BPL", Bpl, Relative, 2);
    set!(0x11, "ORA", Ora, IndirectY, Read);
    set!(0x13, "SLO", Slo, IndirectY, ReadModifyWrite);
    set!(0x14, "NOP", Nop, ZeroPageX, Read);
    set!(0x15, "ORA", Ora, ZeroPageX, Read);
    set!(0x16, "ASL", Asl, ZeroPageX, ReadModifyWrite);
    set!(0x17, "SLO", Slo, ZeroPageX, ReadModifyWrite);
    setc!(0x18, "CLC", Clc, Implicit, 2);
    set!(0x19, "ORA", Ora, AbsoluteY, Read);
    setc!(0x1A, "NOP", Nop, Implicit, 2);
    set!(0x1B, "SLO", Slo, AbsoluteY, ReadModifyWrite);
    set!(0x1C, "NOP", Nop, AbsoluteX, Read);
    set!(0x1D, "ORA", Ora, AbsoluteX, Read);
    set!(0x1E, "ASL", Asl, AbsoluteX, ReadModifyWrite);
    set!(0x1F, "SLO", Slo, AbsoluteX, ReadModifyWrite);

    // Row 0x2_
    setc!(0x20, "JSR", Jsr, Absolute, 6);
    set!(0x21, "AND", And, IndirectX, Read);
    set!(0x23, "RLA", Rla, IndirectX, ReadModifyWrite);
    set!(0x24, "BIT", Bit, ZeroPage, Read);
    set!(0x25, "AND", And, ZeroPage, Read);
    set!(0x26, "ROL", Rol, ZeroPage, ReadModifyWrite);
    set!(0x27, "RLA", Rla, ZeroPage, ReadModifyWrite);
    setc!(0x28, "PLP", Plp, Implicit, 4);
    set!(0x29, "AND", And, Immediate, Read);
    setc!(0x2A, "ROL", Rol, Accumulator, 2);
    set!(0x2B, "ANC", Anc, Immediate, Read);
    set!(0x2C, "BIT", Bit, Absolute, Read);
    set!(0x2D, "AND", And, Absolute, Read);
    set!(0x2E, "ROL", Rol, Absolute, ReadModifyWrite);
    set!(0x2F, "RLA", Rla, Absolute, ReadModifyWrite);

    // Row 0x3_
    setc!(0x30, "BMI", Bmi, Relative, 2);
    set!(0x31, "AND", And, IndirectY, Read);
    set!(0x33, "RLA", Rla, IndirectY, ReadModifyWrite);
    set!(0x34, "NOP", Nop, ZeroPageX, Read);
    set!(0x35, "AND", And, ZeroPageX, Read);
    set!(0x36, "ROL", Rol, ZeroPageX, ReadModifyWrite);
    set!(0x37, "RLA", Rla, ZeroPageX, ReadModifyWrite);
    setc!(0x38, "SEC", Sec, Implicit, 2);
    set!(0x39, "AND", And, AbsoluteY, Read);
    setc!(0x3A, "NOP", Nop, Implicit, 2);
    set!(0x3B, "RLA", Rla, AbsoluteY, ReadModifyWrite);
    set!(0x3C, "NOP", Nop, AbsoluteX, Read);
    set!(0x3D, "AND", And, AbsoluteX, Read);
    set!(0x3E, "ROL", Rol, AbsoluteX, ReadModifyWrite);
    set!(0x3F, "RLA", Rla, AbsoluteX, ReadModifyWrite);

    // Row 0x4_
    setc!(0x40, "RTI", Rti, Implicit, 6);
    set!(0x41, "EOR", Eor, IndirectX, Read);
    set!(0x43, "SRE", Sre, IndirectX, ReadModifyWrite);
    set!(0x44, "NOP", Nop, ZeroPage, Read);
    set!(0x45, "EOR", Eor, ZeroPage, Read);
    set!(0x46, "LSR", Lsr, ZeroPage, ReadModifyWrite);
    set!(0x47, "SRE", Sre, ZeroPage, ReadModifyWrite);
    setc!(0x48, "PHA", Pha, Implicit, 3);
    set!(0x49, "EOR", Eor, Immediate, Read);
    setc!(0x4A, "LSR", Lsr, Accumulator, 2);
    set!(0x4B, "ALR", Alr, Immediate, Read);
    setc!(0x4C, "JMP", Jmp, Absolute, 3);
    set!(0x4D, "EOR", Eor, Absolute, Read);
    set!(0x4E, "LSR", Lsr, Absolute, ReadModifyWrite);
    set!(0x4F, "SRE", Sre, Absolute, ReadModifyWrite);

    // Row 0x5_
    setc!(0x50, "BVC", Bvc, Relative, 2);
    set!(0x51, "EOR", Eor, IndirectY, Read);
    set!(0x53, "SRE", Sre, IndirectY, ReadModifyWrite);
    set!(0x54, "NOP", Nop, ZeroPageX, Read);
    set!(0x55, "EOR", Eor, ZeroPageX, Read);
    set!(0x56, "LSR", Lsr, ZeroPageX, ReadModifyWrite);
    set!(0x57, "SRE", Sre, ZeroPageX, ReadModifyWrite);
    setc!(0x58, "CLI", Cli, Implicit, 2);
    set!(0x59, "EOR", Eor, AbsoluteY, Read);
    setc!(0x5A, "NOP", Nop, Implicit, 2);
    set!(0x5B, "SRE", Sre, AbsoluteY, ReadModifyWrite);
    set!(0x5C, "NOP", Nop, AbsoluteX, Read);
    set!(0x5D, "EOR", Eor, AbsoluteX, Read);
    set!(0x5E, "LSR", Lsr, AbsoluteX, ReadModifyWrite);
    set!(0x5F, "SRE", Sre, AbsoluteX, ReadModifyWrite);

    // Row 0x6_
    setc!(0x60, "RTS", Rts, Implicit, 6);
    set!(0x61, "ADC", Adc, IndirectX, Read);
    set!(0x63, "RRA", Rra, IndirectX, ReadModifyWrite);
    set!(0x64, "NOP", Nop, ZeroPage, Read);
    set!(0x65, "ADC", Adc, ZeroPage, Read);
    set!(0x66, "ROR", Ror, ZeroPage, ReadModifyWrite);
    set!(0x67, "RRA", Rra, ZeroPage, ReadModifyWrite);
    setc!(0x68, "PLA", Pla, Implicit, 4);
    set!(0x69, "ADC", Adc, Immediate, Read);
    setc!(0x6A, "ROR", Ror, Accumulator, 2);
    set!(0x6B, "ARR", Arr, Immediate, Read);
    setc!(0x6C, "JMP", Jmp, Indirect, 5);
    set!(0x6D, "ADC", Adc, Absolute, Read);
    set!(0x6E, "ROR", Ror, Absolute, ReadModifyWrite);
    set!(0x6F, "RRA", Rra, Absolute, ReadModifyWrite);

    // Row 0x7_
    setc!(0x70, "BVS", Bvs, Relative, 2);
    set!(0x71, "ADC", Adc, IndirectY, Read);
    set!(0x73, "RRA", Rra, IndirectY, ReadModifyWrite);
    set!(0x74, "NOP", Nop, ZeroPageX, Read);
    set!(0x75, "ADC", Adc, ZeroPageX, Read);
    set!(0x76, "ROR", Ror, ZeroPageX, ReadModifyWrite);
    set!(0x77, "RRA", Rra, ZeroPageX, ReadModifyWrite);
    setc!(0x78, "SEI", Sei, Implicit, 2);
    set!(0x79, "ADC", Adc, AbsoluteY, Read);
    setc!(0x7A, "NOP", Nop, Implicit, 2);
    set!(0x7B, "RRA", Rra, AbsoluteY, ReadModifyWrite);
    set!(0x7C, "NOP", Nop, AbsoluteX, Read);
    set!(0x7D, "ADC", Adc, AbsoluteX, Read);
    set!(0x7E, "ROR", Ror, AbsoluteX, ReadModifyWrite);
    set!(0x7F, "RRA", Rra, AbsoluteX, ReadModifyWrite);

    // Row 0x8_
    set!(0x80, "NOP", Nop, Immediate, Read);
    set!(0x81, "STA", Sta, IndirectX, Write);
    set!(0x82, "NOP", Nop, Immediate, Read);
    set!(0x83, "SAX", Sax, IndirectX, Write);
    set!(0x84, "STY", Sty, ZeroPage, Write);
    set!(0x85, "STA", Sta, ZeroPage, Write);
    set!(0x86, "STX", Stx, ZeroPage, Write);
    set!(0x87, "SAX", Sax, ZeroPage, Write);
    setc!(0x88, "DEY", Dey, Implicit, 2);
    set!(0x89, "NOP", Nop, Immediate, Read);
    setc!(0x8A, "TXA", Txa, Implicit, 2);
    set!(0x8B, "XAA", Xaa, Immediate, Read);
    set!(0x8C, "STY", Sty, Absolute, Write);
    set!(0x8D, "STA", Sta, Absolute, Write);
    set!(0x8E, "STX", Stx, Absolute, Write);
    set!(0x8F, "SAX", Sax, Absolute, Write);

    // Row 0x9_
    setc!(0x90, "BCC", Bcc, Relative, 2);
    set!(0x91, "STA", Sta, IndirectY, Write);
    set!(0x93, "AHX", Ahx, IndirectY, Write);
    set!(0x94, "STY", Sty, ZeroPageX, Write);
    set!(0x95, "STA", Sta, ZeroPageX, Write);
    set!(0x96, "STX", Stx, ZeroPageY, Write);
    set!(0x97, "SAX", Sax, ZeroPageY, Write);
    setc!(0x98, "TYA", Tya, Implicit, 2);
    set!(0x99, "STA", Sta, AbsoluteY, Write);
    setc!(0x9A, "TXS", Txs, Implicit, 2);
    set!(0x9B, "TAS", Tas, AbsoluteY, Write);
    set!(0x9C, "SHY", Shy, AbsoluteX, Write);
    set!(0x9D, "STA", Sta, AbsoluteX, Write);
    set!(0x9E, "SHX", Shx, AbsoluteY, Write);
    set!(0x9F, "AHX", Ahx, AbsoluteY, Write);

    // Row 0xA_
    set!(0xA0, "LDY", Ldy, Immediate, Read);
    set!(0xA1, "LDA", Lda, IndirectX, Read);
    set!(0xA2, "LDX", Ldx, Immediate, Read);
    set!(0xA3, "LAX", Lax, IndirectX, Read);
    set!(0xA4, "LDY", Ldy, ZeroPage, Read);
    set!(0xA5, "LDA", Lda, ZeroPage, Read);
    set!(0xA6, "LDX", Ldx, ZeroPage, Read);
    set!(0xA7, "LAX", Lax, ZeroPage, Read);
    setc!(0xA8, "TAY", Tay, Implicit, 2);
    set!(0xA9, "LDA", Lda, Immediate, Read);
    setc!(0xAA, "TAX", Tax, Implicit, 2);
    set!(0xAB, "LAX", Lax, Immediate, Read);
    set!(0xAC, "LDY", Ldy, Absolute, Read);
    set!(0xAD, "LDA", Lda, Absolute, Read);
    set!(0xAE, "LDX", Ldx, Absolute, Read);
    set!(0xAF, "LAX", Lax, Absolute, Read);

    // Row 0xB_
    setc!(0xB0, "BCS", Bcs, Relative, 2);
    set!(0xB1, "LDA", Lda, IndirectY, Read);
    set!(0xB3, "LAX", Lax, IndirectY, Read);
    set!(0xB4, "LDY", Ldy, ZeroPageX, Read);
    set!(0xB5, "LDA", Lda, ZeroPageX, Read);
    set!(0xB6, "LDX", Ldx, ZeroPageY, Read);
    set!(0xB7, "LAX", Lax, ZeroPageY, Read);
    setc!(0xB8, "CLV", Clv, Implicit, 2);
    set!(0xB9, "LDA", Lda, AbsoluteY, Read);
    setc!(0xBA, "TSX", Tsx, Implicit, 2);
    set!(0xBB, "LAS", Las, AbsoluteY, Read);
    set!(0xBC, "LDY", Ldy, AbsoluteX, Read);
    set!(0xBD, "LDA", Lda, AbsoluteX, Read);
    set!(0xBE, "LDX", Ldx, AbsoluteY, Read);
    set!(0xBF, "LAX", Lax, AbsoluteY, Read);

    // Row 0xC_
    set!(0xC0, "CPY", Cpy, Immediate, Read);
    set!(0xC1, "CMP", Cmp, IndirectX, Read);
    set!(0xC2, "NOP", Nop, Immediate, Read);
    set!(0xC3, "DCP", Dcp, IndirectX, ReadModifyWrite);
    set!(0xC4, "CPY", Cpy, ZeroPage, Read);
    set!(0xC5, "CMP", Cmp, ZeroPage, Read);
    set!(0xC6, "DEC", Dec, ZeroPage, ReadModifyWrite);
    set!(0xC7, "DCP", Dcp, ZeroPage, ReadModifyWrite);
    setc!(0xC8, "INY", Iny, Implicit, 2);
    set!(0xC9, "CMP", Cmp, Immediate, Read);
    setc!(0xCA, "DEX", Dex, Implicit, 2);
    set!(0xCB, "AXS", Axs, Immediate, Read);
    set!(0xCC, "CPY", Cpy, Absolute, Read);
    set!(0xCD, "CMP", Cmp, Absolute, Read);
    set!(0xCE, "DEC", Dec, Absolute, ReadModifyWrite);
    set!(0xCF, "DCP", Dcp, Absolute, ReadModifyWrite);

    // Row 0xD_
    setc!(0xD0, "BNE", Bne, Relative, 2);
    set!(0xD1, "CMP", Cmp, IndirectY, Read);
    set!(0xD3, "DCP", Dcp, IndirectY, ReadModifyWrite);
    set!(0xD4, "NOP", Nop, ZeroPageX, Read);
    set!(0xD5, "CMP", Cmp, ZeroPageX, Read);
    set!(0xD6, "DEC", Dec, ZeroPageX, ReadModifyWrite);
    set!(0xD7, "DCP", Dcp, ZeroPageX, ReadModifyWrite);
    setc!(0xD8, "CLD", Cld, Implicit, 2);
    set!(0xD9, "CMP", Cmp, AbsoluteY, Read);
    setc!(0xDA, "NOP", Nop, Implicit, 2);
    set!(0xDB, "DCP", Dcp, AbsoluteY, ReadModifyWrite);
    set!(0xDC, "NOP", Nop, AbsoluteX, Read);
    set!(0xDD, "CMP", Cmp, AbsoluteX, Read);
    set!(0xDE, "DEC", Dec, AbsoluteX, ReadModifyWrite);
    set!(0xDF, "DCP", Dcp, AbsoluteX, ReadModifyWrite);

    // Row 0xE_
    set!(0xE0, "CPX", Cpx, Immediate, Read);
    set!(0xE1, "SBC", Sbc, IndirectX, Read);
    set!(0xE2, "NOP", Nop, Immediate, Read);
    set!(0xE3, "ISC", Isc, IndirectX, ReadModifyWrite);
    set!(0xE4, "CPX", Cpx, ZeroPage, Read);
    set!(0xE5, "SBC", Sbc, ZeroPage, Read);
    set!(0xE6, "INC", Inc, ZeroPage, ReadModifyWrite);
    set!(0xE7, "ISC", Isc, ZeroPage, ReadModifyWrite);
    setc!(0xE8, "INX", Inx, Implicit, 2);
    set!(0xE9, "SBC", Sbc, Immediate, Read);
    setc!(0xEA, "NOP", Nop, Implicit, 2);
    set!(0xEB, "SBC", Sbc, Immediate, Read);
    set!(0xEC, "CPX", Cpx, Absolute, Read);
    set!(0xED, "SBC", Sbc, Absolute, Read);
    set!(0xEE, "INC", Inc, Absolute, ReadModifyWrite);
    set!(0xEF, "ISC", Isc, Absolute, ReadModifyWrite);

    // Row 0xF_
    setc!(0xF0, "BEQ", Beq, Relative, 2);
    set!(0xF1, "SBC", Sbc, IndirectY, Read);
    set!(0xF3, "ISC", Isc, IndirectY, ReadModifyWrite);
    set!(0xF4, "NOP", Nop, ZeroPageX, Read);
    set!(0xF5, "SBC", Sbc, ZeroPageX, Read);
    set!(0xF6, "INC", Inc, ZeroPageX, ReadModifyWrite);
    set!(0xF7, "ISC", Isc, ZeroPageX, ReadModifyWrite);
    setc!(0xF8, "SED", Sed, Implicit, 2);
    set!(0xF9, "SBC", Sbc, AbsoluteY, Read);
    setc!(0xFA, "NOP", Nop, Implicit, 2);
    set!(0xFB, "ISC", Isc, AbsoluteY, ReadModifyWrite);
    set!(0xFC, "NOP", Nop, AbsoluteX, Read);
    set!(0xFD, "SBC", Sbc, AbsoluteX, Read);
    set!(0xFE, "INC", Inc, AbsoluteX, ReadModifyWrite);
    set!(0xFF, "ISC", Isc, AbsoluteX, ReadModifyWrite);

    // The JAM/KIL opcodes: every opcode byte ending in 0x02/0x12/0x22/... on
    // row boundaries that has not been assigned above locks the bus up.
    for &opcode in &[
        0x02u8, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
    ] {
        setc!(opcode as usize, "JAM", Jam, Implicit, 2);
    }

    t
}

/// Build the 256-entry CMOS 65C02 decode table. Every slot is defined: the
/// NMOS undocumented-opcode slots are replaced by WDC's documented
/// extensions (STZ/TRB/TSB/BRA/PHX/PHY/PLX/PLY/BBRn/BBSn/RMBn/SMBn) where WDC
/// assigned one, and by single/double-byte NOPs (matching the opcode's own
/// operand width and NMOS cycle count) everywhere else.
pub fn cmos_table() -> [OpcodeEntry; 256] {
    use AccessKind::*;
    use AddressingMode::*;
    use Operation::*;

    // Start from the NMOS table and overwrite slot by slot; this keeps every
    // documented opcode's position and a correct cycle count for the
    // "became a NOP" slots without re-deriving them all from scratch.
    let mut t = nmos_table();
    macro_rules! set {
        ($opcode:expr, $mnemonic:expr, $op:expr, $mode:expr, $kind:expr) => {
            t[$opcode] = entry($mnemonic, $op, $mode, $kind);
        };
    }
    macro_rules! setc {
        ($opcode:expr, $mnemonic:expr, $op:expr, $mode:expr, $cycles:expr) => {
            t[$opcode] = entry_cycles($mnemonic, $op, $mode, $cycles);
        };
    }

    // JMP (ind) fetches correctly on CMOS, at the cost of one extra cycle,
    // and no longer has the NMOS page-wrap bug (see Cpu::resolve_indirect).
    setc!(0x6C, "JMP", Jmp, Indirect, 6);

    // BRK clears D on CMOS in addition to everything NMOS BRK does; same
    // opcode slot, same cycle count, handled inside the Brk operation.
    setc!(0x00, "BRK", Brk, Implicit, 7);

    // Former illegal opcode slots become documented CMOS instructions or
    // NOPs. Each replaces an NMOS-illegal combo one-for-one by opcode byte.
    set!(0x04, "TSB", Tsb, ZeroPage, ReadModifyWrite);
    set!(0x0C, "TSB", Tsb, Absolute, ReadModifyWrite);
    set!(0x12, "ORA", Ora, ZeroPageIndirect, Read);
    set!(0x14, "TRB", Trb, ZeroPage, ReadModifyWrite);
    setc!(0x1A, "INC", Inc, Accumulator, 2);
    set!(0x1C, "TRB", Trb, Absolute, ReadModifyWrite);

    set!(0x32, "AND", And, ZeroPageIndirect, Read);
    set!(0x34, "BIT", Bit, ZeroPageX, Read);
    setc!(0x3A, "DEC", Dec, Accumulator, 2);
    set!(0x3C, "BIT", Bit, AbsoluteX, Read);

    set!(0x52, "EOR", Eor, ZeroPageIndirect, Read);
    setc!(0x5A, "PHY", Phy, Implicit, 3);
    set!(0x5C, "NOP", Nop, Absolute, Read);

    set!(0x64, "STZ", Stz, ZeroPage, Write);
    set!(0x72, "ADC", Adc, ZeroPageIndirect, Read);
    set!(0x74, "STZ", Stz, ZeroPageX, Write);
    setc!(0x7A, "PLY", Ply, Implicit, 4);
    setc!(0x7C, "JMP", Jmp, AbsoluteX, 6);

    setc!(0x80, "BRA", Bra, Relative, 2);
    set!(0x89, "BIT", Bit, Immediate, Read);
    set!(0x92, "STA", Sta, ZeroPageIndirect, Write);
    setc!(0x9C, "STZ", Stz, Absolute, 4);
    setc!(0x9E, "STZ", Stz, AbsoluteX, 5);

    set!(0xB2, "LDA", Lda, ZeroPageIndirect, Read);

    set!(0xD2, "CMP", Cmp, ZeroPageIndirect, Read);
    setc!(0xDA, "PHX", Phx, Implicit, 3);

    set!(0xF2, "SBC", Sbc, ZeroPageIndirect, Read);
    setc!(0xFA, "PLX", Plx, Implicit, 4);

    // Remaining illegal-on-NMOS slots that WDC repurposed as WAI/STP plus
    // the two-byte/one-cycle or three-byte/four-cycle NOPs that fill out
    // the rest of the opcode space (e.g. $02/$22/.. became 2-byte NOPs
    // instead of JAM on CMOS — the CPU never locks up on an undefined
    // opcode).
    for &opcode in &[0x02u8, 0x22, 0x42, 0x62, 0x82, 0xC2, 0xE2] {
        setc!(opcode as usize, "NOP", Nop, Immediate, 2);
    }
    for &opcode in &[0x44u8] {
        setc!(opcode as usize, "NOP", Nop, ZeroPage, 3);
    }
    for &opcode in &[0x54u8, 0xD4, 0xF4] {
        setc!(opcode as usize, "NOP", Nop, ZeroPageX, 4);
    }
    for &opcode in &[0xDC, 0xFC] {
        setc!(opcode as usize, "NOP", Nop, AbsoluteX, 4);
    }
    for &opcode in &[0x03u8, 0x13, 0x23, 0x33, 0x43, 0x53, 0x63, 0x73, 0x83, 0x93, 0xA3, 0xB3,
        0xC3, 0xD3, 0xE3, 0xF3, 0x0B, 0x1B, 0x2B, 0x3B, 0x4B, 0x5B, 0x6B, 0x7B, 0x8B, 0x9B, 0xAB,
        0xBB, 0xCB, 0xEB, 0xFB] {
        setc!(opcode as usize, "NOP", Nop, Implicit, 1);
    }

    setc!(0xCB, "WAI", Wai, Implicit, 3);
    setc!(0xDB, "STP", Stp, Implicit, 3);

    // BBRn/BBSn ($0F,$1F,...,$7F / $8F,...,$FF) and RMBn/SMBn
    // ($07,$17,...,$77 / $87,...,$F7) — one per bit 0..=7, laid out in the
    // high nibble of the opcode byte.
    for bit in 0u8..8 {
        let rmb_opcode = (bit << 4) | 0x07;
        let bbr_opcode = (bit << 4) | 0x0F;
        let smb_opcode = (bit << 4) | 0x87;
        let bbs_opcode = (bit << 4) | 0x8F;
        setc!(
            rmb_opcode as usize,
            "RMB",
            Rmb(bit),
            ZeroPage,
            5
        );
        setc!(
            bbr_opcode as usize,
            "BBR",
            Bbr(bit),
            ZeroPageRelative,
            5
        );
        setc!(
            smb_opcode as usize,
            "SMB",
            Smb(bit),
            ZeroPage,
            5
        );
        setc!(
            bbs_opcode as usize,
            "BBS",
            Bbs(bit),
            ZeroPageRelative,
            5
        );
    }

    t
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_cmos_slot_is_defined() {
        let table = cmos_table();
        for (opcode, e) in table.iter().enumerate() {
            assert!(
                !e.mnemonic.is_empty(),
                "cmos opcode {opcode:#04x} has no mnemonic"
            );
        }
    }

    #[test]
    fn nmos_table_has_256_entries_and_reset_vector_friendly_brk() {
        let table = nmos_table();
        assert_eq!(table.len(), 256);
        assert_eq!(table[0x00].mnemonic, "BRK");
        assert_eq!(table[0x00].cycles, 7);
    }

    #[test]
    fn bit_branch_opcodes_cover_all_eight_bits() {
        let table = cmos_table();
        for bit in 0u8..8 {
            let bbr = (bit << 4) | 0x0F;
            match table[bbr as usize].op {
                Operation::Bbr(n) => assert_eq!(n, bit),
                other => panic!("expected Bbr({bit}) at {bbr:#04x}, got {other:?}"),
            }
        }
    }
}
