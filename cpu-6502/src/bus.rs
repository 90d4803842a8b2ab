/// A byte-addressable memory space the CPU reads instructions and data from.
///
/// `peek_code` and `peek_data` are kept distinct so a host with memory-mapped
/// I/O can avoid side effects (e.g. clearing a UART status register) when a
/// debugger disassembles code rather than executes it. On plain RAM both are
/// identical reads.
pub trait Bus {
    fn peek_data(&mut self, address: u16) -> u8;
    fn peek_code(&mut self, address: u16) -> u8;
    fn poke(&mut self, address: u16, value: u8);

    /// Little-endian 16-bit data read. Hosts should not need to override this;
    /// it is provided so addressing modes do not duplicate the byte order logic.
    fn peek_data_u16(&mut self, address: u16) -> u16 {
        let lo = self.peek_data(address);
        let hi = self.peek_data(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Like `peek_data_u16`, but the high byte is read from the *same page* as
    /// the low byte rather than the next address. This is the wrap used by
    /// zero-page pointer fetches ((ind,X), (ind),Y, and CMOS (ind)): reading
    /// the pointer at zero-page address $FF wraps the high byte back to $00,
    /// never into page 1.
    fn peek_zero_page_u16(&mut self, zp_address: u8) -> u16 {
        let lo = self.peek_data(zp_address as u16);
        let hi = self.peek_data(zp_address.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }
}

/// Default 64 KiB flat memory with no side effects. Out-of-range addresses
/// are impossible since `u16` already spans exactly this space.
pub struct FlatMemory {
    memory: [u8; 0x1_0000],
}

impl FlatMemory {
    pub fn new() -> FlatMemory {
        FlatMemory {
            memory: [0; 0x1_0000],
        }
    }

    /// Bulk-load bytes starting at `address`, for tests and small demos.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory[address.wrapping_add(offset as u16) as usize] = *byte;
        }
    }
}

impl Default for FlatMemory {
    fn default() -> FlatMemory {
        FlatMemory::new()
    }
}

impl Bus for FlatMemory {
    fn peek_data(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn peek_code(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn poke(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_a_byte() {
        let mut mem = FlatMemory::new();
        mem.poke(0x1234, 0xAB);
        assert_eq!(mem.peek_data(0x1234), 0xAB);
        assert_eq!(mem.peek_code(0x1234), 0xAB);
    }

    #[test]
    fn reads_little_endian_words() {
        let mut mem = FlatMemory::new();
        mem.poke(0x10, 0x34);
        mem.poke(0x11, 0x12);
        assert_eq!(mem.peek_data_u16(0x10), 0x1234);
    }

    #[test]
    fn wraps_zero_page_pointer_fetch_within_page_zero() {
        let mut mem = FlatMemory::new();
        mem.poke(0x00FF, 0x34);
        mem.poke(0x0000, 0x12);
        assert_eq!(mem.peek_zero_page_u16(0xFF), 0x1234);
    }
}
