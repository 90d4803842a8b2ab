/// Which silicon the decoded opcode table, cycle corrections and quirky
/// behaviors (JMP indirect page wrap, decimal-mode flags, BRK's D flag)
/// should follow. Chosen once at construction and frozen for the CPU's
/// lifetime — there is no "mode switch" on real hardware either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// The original NMOS 6502: undocumented opcodes execute, decimal-mode
    /// N/V/Z are the well-known "broken" values, JMP (ind) has the page-wrap
    /// bug.
    Nmos6502,
    /// WDC's CMOS 65C02: every opcode slot is defined, decimal mode computes
    /// correct flags (at the cost of one extra cycle), JMP (ind) fetches
    /// correctly, and BRK clears the D flag.
    Cmos65C02,
}

impl Variant {
    pub fn is_cmos(self) -> bool {
        matches!(self, Variant::Cmos65C02)
    }
}
