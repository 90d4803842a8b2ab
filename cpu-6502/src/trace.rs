/// A capability for receiving one human-readable line per executed
/// instruction. The core never owns a concrete logger — it holds a boxed
/// sink and writes to it only when tracing is enabled, which keeps the
/// core free of any global mutable logging state.
pub trait TraceSink {
    fn trace(&mut self, line: &str);
}

/// Writes trace lines to stdout. The default sink used by `set_trace(true)`
/// when the host has not installed its own.
pub struct StdoutTrace;

impl TraceSink for StdoutTrace {
    fn trace(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects trace lines in memory instead of writing them anywhere, for
/// tests that want to assert on the disassembly without capturing stdout.
#[derive(Default)]
pub struct BufferTrace {
    pub lines: Vec<String>,
}

impl TraceSink for BufferTrace {
    fn trace(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// One disassembled instruction and the register snapshot taken just after
/// it executed, the data a trace line is built from.
pub struct TraceEvent {
    pub pc: u16,
    pub opcode_bytes: Vec<u8>,
    pub mnemonic: &'static str,
    pub operand_text: String,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    pub cycles: u64,
}

impl TraceEvent {
    pub fn format(&self) -> String {
        let bytes = self
            .opcode_bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{pc:04X}  {bytes:<8} {mnemonic} {operand:<12} A:{a:02X} X:{x:02X} Y:{y:02X} S:{s:02X} P:{p:02X} CYC:{cyc}",
            pc = self.pc,
            bytes = bytes,
            mnemonic = self.mnemonic,
            operand = self.operand_text,
            a = self.a,
            x = self.x,
            y = self.y,
            s = self.s,
            p = self.p,
            cyc = self.cycles,
        )
    }
}
