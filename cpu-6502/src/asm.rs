//! A minimal inline assembler for writing test programs as source text
//! instead of raw opcode bytes. Test-only: no host ever needs to assemble
//! code at runtime, so this never ships in the public API.
//!
//! Supports one instruction (or `label:`) per line, comments starting with
//! `;`, implicit/accumulator/immediate/zero-page/absolute addressing with
//! the usual `,X`/`,Y` index suffixes, the three indirect forms, relative
//! branches and `JMP`/`JSR` by label, and BBRn/BBSn's `$zp,label` dual
//! operand.

use std::collections::HashMap;

use colored::Colorize;

use crate::opcode::{cmos_table, nmos_table, AddressingMode, OpcodeEntry};
use crate::variant::Variant;

#[derive(Debug, PartialEq, Eq)]
pub struct AssembleError(pub String);

impl std::fmt::Display for AssembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.bright_red())
    }
}

#[derive(Debug, Clone)]
enum Operand {
    None,
    Accumulator,
    Immediate(u8),
    Byte(u8, Option<char>),
    Word(u16, Option<char>),
    IndirectX(u8),
    IndirectY(u8),
    IndirectZp(u8),
    Indirect16(u16),
    Relative(i8),
    ZpRelative(u8, i8),
    /// Unresolved until the label table is known. Which shape it resolves
    /// to (branch displacement vs. absolute address) depends on whether the
    /// owning mnemonic is a branch.
    Label(String),
    ZpThenLabel(u8, String),
}

struct RawInstruction {
    address: u16,
    mnemonic: String,
    operand: Operand,
}

/// Assemble `source` into raw bytes, starting at `origin`.
pub fn assemble(variant: Variant, origin: u16, source: &str) -> Result<Vec<u8>, AssembleError> {
    let table = if variant.is_cmos() {
        cmos_table()
    } else {
        nmos_table()
    };

    let mut labels: HashMap<String, u16> = HashMap::new();
    let mut instructions = Vec::new();
    let mut address = origin;

    for (line_number, raw_line) in source.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = line.strip_suffix(':') {
            labels.insert(label.trim().to_string(), address);
            continue;
        }
        let (mnemonic, operand_text) = split_mnemonic(line);
        let operand = parse_operand(&mnemonic, operand_text)
            .map_err(|msg| AssembleError(format!("line {}: {msg}", line_number + 1)))?;
        let placeholder_mode = placeholder_operand_mode(&operand);
        let len = 1 + operand_byte_len(placeholder_mode);
        instructions.push(RawInstruction {
            address,
            mnemonic: mnemonic.to_ascii_uppercase(),
            operand,
        });
        address = address.wrapping_add(len);
    }

    let mut bytes = Vec::new();
    for instruction in &instructions {
        let next_address = instruction
            .address
            .wrapping_add(1 + operand_byte_len(placeholder_operand_mode(&instruction.operand)));
        let resolved = resolve_labels(
            &instruction.mnemonic,
            &instruction.operand,
            &labels,
            next_address,
        )
        .map_err(AssembleError)?;
        let mode = operand_mode(&resolved);
        let (opcode, entry) = find_entry(&table, &instruction.mnemonic, mode).ok_or_else(|| {
            AssembleError(format!(
                "no {variant_name} opcode for {} in mode {mode:?}",
                instruction.mnemonic,
                variant_name = if variant.is_cmos() { "CMOS" } else { "NMOS" },
            ))
        })?;
        let _ = entry;
        bytes.push(opcode as u8);
        push_operand_bytes(&resolved, &mut bytes);
    }

    Ok(bytes)
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(index) => &line[..index],
        None => line,
    }
}

fn split_mnemonic(line: &str) -> (String, &str) {
    match line.find(char::is_whitespace) {
        Some(index) => (line[..index].to_string(), line[index..].trim()),
        None => (line.to_string(), ""),
    }
}

const BRANCH_MNEMONICS: &[&str] = &[
    "BPL", "BMI", "BVC", "BVS", "BCC", "BCS", "BNE", "BEQ", "BRA",
];

fn parse_operand(mnemonic: &str, text: &str) -> Result<Operand, String> {
    let mnemonic = mnemonic.to_ascii_uppercase();
    if text.is_empty() {
        return Ok(Operand::None);
    }
    if text.eq_ignore_ascii_case("A") {
        return Ok(Operand::Accumulator);
    }
    if (mnemonic.starts_with("BBR") || mnemonic.starts_with("BBS")) && text.starts_with('$') {
        if let Some((zp_text, label)) = text[1..].split_once(',') {
            let zp = parse_hex_byte(zp_text)?;
            return Ok(Operand::ZpThenLabel(zp, label.trim().to_string()));
        }
    }
    if let Some(rest) = text.strip_prefix('#') {
        let rest = rest
            .strip_prefix('$')
            .ok_or("immediate operand must be hex")?;
        return Ok(Operand::Immediate(parse_hex_byte(rest)?));
    }
    if let Some(inner) = text.strip_prefix('(') {
        if let Some(zp_text) = inner
            .strip_suffix(",X)")
            .or_else(|| inner.strip_suffix(",x)"))
        {
            let zp_text = zp_text
                .strip_prefix('$')
                .ok_or("indirect operand must be hex")?;
            return Ok(Operand::IndirectX(parse_hex_byte(zp_text)?));
        }
        if let Some(zp_text) = inner.strip_suffix("),Y").or_else(|| inner.strip_suffix("),y")) {
            let zp_text = zp_text
                .strip_prefix('$')
                .ok_or("indirect operand must be hex")?;
            return Ok(Operand::IndirectY(parse_hex_byte(zp_text)?));
        }
        if let Some(hex_text) = inner.strip_suffix(')') {
            let hex_text = hex_text
                .strip_prefix('$')
                .ok_or("indirect operand must be hex")?;
            return if hex_text.len() <= 2 {
                Ok(Operand::IndirectZp(parse_hex_byte(hex_text)?))
            } else {
                Ok(Operand::Indirect16(parse_hex_word(hex_text)?))
            };
        }
        return Err(format!("unrecognized indirect operand: {text}"));
    }
    if let Some(rest) = text.strip_prefix('$') {
        let (digits, index) = split_index_suffix(rest);
        return if digits.len() <= 2 {
            Ok(Operand::Byte(parse_hex_byte(digits)?, index))
        } else {
            Ok(Operand::Word(parse_hex_word(digits)?, index))
        };
    }
    if BRANCH_MNEMONICS.contains(&mnemonic.as_str()) || mnemonic == "JMP" || mnemonic == "JSR" {
        return Ok(Operand::Label(text.to_string()));
    }
    Err(format!("unrecognized operand syntax: {text}"))
}

fn split_index_suffix(text: &str) -> (&str, Option<char>) {
    if let Some(digits) = text.strip_suffix(",X").or_else(|| text.strip_suffix(",x")) {
        (digits, Some('X'))
    } else if let Some(digits) = text.strip_suffix(",Y").or_else(|| text.strip_suffix(",y")) {
        (digits, Some('Y'))
    } else {
        (text, None)
    }
}

fn parse_hex_byte(text: &str) -> Result<u8, String> {
    u8::from_str_radix(text.trim(), 16).map_err(|_| format!("not a hex byte: {text}"))
}

fn parse_hex_word(text: &str) -> Result<u16, String> {
    u16::from_str_radix(text.trim(), 16).map_err(|_| format!("not a hex word: {text}"))
}

/// The mode used only to compute an instruction's byte length during the
/// first pass, before labels are resolved. Labels always placehold as their
/// final shape's width: branches and BBRn/BBSn are always 1/2 bytes
/// regardless of the target, and JMP/JSR labels are always absolute (2
/// bytes) since this assembler never targets zero page by label.
fn placeholder_operand_mode(operand: &Operand) -> AddressingMode {
    match operand {
        Operand::Label(_) => AddressingMode::Relative,
        _ => operand_mode(operand),
    }
}

fn operand_mode(operand: &Operand) -> AddressingMode {
    match operand {
        Operand::None => AddressingMode::Implicit,
        Operand::Accumulator => AddressingMode::Accumulator,
        Operand::Immediate(_) => AddressingMode::Immediate,
        Operand::Byte(_, None) => AddressingMode::ZeroPage,
        Operand::Byte(_, Some('X')) => AddressingMode::ZeroPageX,
        Operand::Byte(_, Some('Y')) => AddressingMode::ZeroPageY,
        Operand::Byte(_, Some(_)) => unreachable!(),
        Operand::Word(_, None) => AddressingMode::Absolute,
        Operand::Word(_, Some('X')) => AddressingMode::AbsoluteX,
        Operand::Word(_, Some('Y')) => AddressingMode::AbsoluteY,
        Operand::Word(_, Some(_)) => unreachable!(),
        Operand::IndirectX(_) => AddressingMode::IndirectX,
        Operand::IndirectY(_) => AddressingMode::IndirectY,
        Operand::IndirectZp(_) => AddressingMode::ZeroPageIndirect,
        Operand::Indirect16(_) => AddressingMode::Indirect,
        Operand::Relative(_) => AddressingMode::Relative,
        Operand::ZpRelative(_, _) => AddressingMode::ZeroPageRelative,
        Operand::Label(_) => AddressingMode::Relative,
        Operand::ZpThenLabel(_, _) => AddressingMode::ZeroPageRelative,
    }
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

fn resolve_labels(
    mnemonic: &str,
    operand: &Operand,
    labels: &HashMap<String, u16>,
    next_address: u16,
) -> Result<Operand, String> {
    match operand {
        Operand::Label(name) => {
            let target = *labels
                .get(name)
                .ok_or_else(|| format!("unknown label: {name}"))?;
            if BRANCH_MNEMONICS.contains(&mnemonic) {
                let displacement = target as i32 - next_address as i32;
                if !(-128..=127).contains(&displacement) {
                    return Err(format!("branch target {name} out of range"));
                }
                Ok(Operand::Relative(displacement as i8))
            } else {
                Ok(Operand::Word(target, None))
            }
        }
        Operand::ZpThenLabel(zp, name) => {
            let target = *labels
                .get(name)
                .ok_or_else(|| format!("unknown label: {name}"))?;
            let displacement = target as i32 - next_address as i32;
            if !(-128..=127).contains(&displacement) {
                return Err(format!("branch target {name} out of range"));
            }
            Ok(Operand::ZpRelative(*zp, displacement as i8))
        }
        other => Ok(other.clone()),
    }
}

fn find_entry(
    table: &[OpcodeEntry; 256],
    mnemonic: &str,
    mode: AddressingMode,
) -> Option<(usize, OpcodeEntry)> {
    table
        .iter()
        .enumerate()
        .find(|(_, entry)| entry.mnemonic.eq_ignore_ascii_case(mnemonic) && entry.mode == mode)
        .map(|(i, entry)| (i, *entry))
}

fn push_operand_bytes(operand: &Operand, bytes: &mut Vec<u8>) {
    match operand {
        Operand::None | Operand::Accumulator => {}
        Operand::Immediate(value) => bytes.push(*value),
        Operand::Byte(value, _) => bytes.push(*value),
        Operand::Word(value, _) => bytes.extend_from_slice(&value.to_le_bytes()),
        Operand::IndirectX(value) | Operand::IndirectY(value) | Operand::IndirectZp(value) => {
            bytes.push(*value)
        }
        Operand::Indirect16(value) => bytes.extend_from_slice(&value.to_le_bytes()),
        Operand::Relative(displacement) => bytes.push(*displacement as u8),
        Operand::ZpRelative(zp, displacement) => {
            bytes.push(*zp);
            bytes.push(*displacement as u8);
        }
        Operand::Label(_) | Operand::ZpThenLabel(_, _) => {
            unreachable!("labels must be resolved before emission")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assembles_implicit_and_immediate() {
        let bytes = assemble(Variant::Nmos6502, 0x0200, "LDA #$05\nCLC\nADC #$03").unwrap();
        assert_eq!(bytes, vec![0xA9, 0x05, 0x18, 0x69, 0x03]);
    }

    #[test]
    fn assembles_zero_page_and_absolute() {
        let bytes = assemble(Variant::Nmos6502, 0x0200, "STA $10\nSTA $1234").unwrap();
        assert_eq!(bytes, vec![0x85, 0x10, 0x8D, 0x34, 0x12]);
    }

    #[test]
    fn assembles_indexed_and_indirect_forms() {
        let bytes = assemble(
            Variant::Nmos6502,
            0x0200,
            "LDA ($20,X)\nLDA ($20),Y\nSTA $2000,Y",
        )
        .unwrap();
        assert_eq!(bytes, vec![0xA1, 0x20, 0xB1, 0x20, 0x99, 0x00, 0x20]);
    }

    #[test]
    fn resolves_forward_branch_label() {
        let bytes = assemble(Variant::Nmos6502, 0x0200, "loop:\nNOP\nBNE loop").unwrap();
        assert_eq!(bytes, vec![0xEA, 0xD0, 0xFD]);
    }

    #[test]
    fn resolves_jmp_to_absolute_label() {
        let bytes = assemble(Variant::Nmos6502, 0x0200, "start:\nNOP\nJMP start").unwrap();
        assert_eq!(bytes, vec![0xEA, 0x4C, 0x00, 0x02]);
    }

    #[test]
    fn assembles_cmos_zero_page_indirect_and_stz() {
        let bytes = assemble(Variant::Cmos65C02, 0x0200, "LDA ($20)\nSTZ $10").unwrap();
        assert_eq!(bytes, vec![0xB2, 0x20, 0x64, 0x10]);
    }
}
