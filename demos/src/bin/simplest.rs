//! The smallest possible host: one instruction (`INX`) looping back on
//! itself via `JMP`, traced to stdout, stopping once X wraps around to
//! 0x10. Useful as a sanity check that a `Bus` impl and the fetch/decode
//! loop are wired up correctly before reaching for anything bigger.

use cpu_6502::{new_nmos_6502, Bus, FlatMemory};

fn main() {
    let mut memory = FlatMemory::new();
    memory.poke(0x0000, 0xE8); // INX
    memory.poke(0x0001, 0x4C); // JMP $0000
    memory.poke(0x0002, 0x00);
    memory.poke(0x0003, 0x00);

    let mut cpu = new_nmos_6502(memory);
    cpu.set_trace(true);
    cpu.set_axyp(0, 0, 0, 0);
    cpu.set_pc(0x0000);

    loop {
        cpu.execute_instruction();

        let (_, x, _, _) = cpu.get_axyp();
        if x == 0x10 {
            break;
        }
    }
}
