//! Runs Microsoft's EhBASIC ROM image, wiring its memory-mapped ACIA ports
//! ($F001 output, $F004 input) to stdout/stdin. Stdin is read from its own
//! thread into a buffered channel so the CPU loop can poll for a waiting
//! character without blocking on a line read, the way the Go original feeds
//! its emulation goroutine from a channel.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use cpu_6502::{new_nmos_6502, Bus};

const OUTPUT_PORT: u16 = 0xF001;
const INPUT_PORT: u16 = 0xF004;
const LOAD_ADDRESS: u16 = 0xC000;

struct Machine {
    memory: [u8; 0x1_0000],
    input: Receiver<u8>,
}

impl Bus for Machine {
    fn peek_data(&mut self, address: u16) -> u8 {
        if address == INPUT_PORT {
            return self.input.try_recv().unwrap_or(0);
        }
        self.memory[address as usize]
    }

    fn peek_code(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn poke(&mut self, address: u16, value: u8) {
        if address == OUTPUT_PORT {
            print!("{}", value as char);
        }
        self.memory[address as usize] = value;
    }
}

fn main() -> ExitCode {
    let rom_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("basic.bin"));

    let rom = match std::fs::read(&rom_path) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!(
                "could not read {} ({err}); pass the path to an EhBASIC ROM image as the first argument",
                rom_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let (sender, receiver): (Sender<u8>, Receiver<u8>) = mpsc::channel();

    let mut memory = [0u8; 0x1_0000];
    load_range(&mut memory, LOAD_ADDRESS, &rom);
    load_range(&mut memory, 0xFF80, &rom[rom.len() - 0x80 + 3..]);
    load_range(&mut memory, 0xFFFA, &rom[rom.len() - 6..]);

    let machine = Machine {
        memory,
        input: receiver,
    };
    let mut cpu = new_nmos_6502(machine);
    cpu.set_axyp(0, 0, 0, 0);
    cpu.set_pc(0xFF80);

    for &byte in b"C\r\n" {
        let _ = sender.send(byte);
    }

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for ch in line.chars() {
                if sender.send(ch as u8).is_err() {
                    return;
                }
            }
            let _ = sender.send(b'\r');
        }
    });

    println!("EhBASIC for 6502 emulator");
    println!("Press Ctrl+D to exit");

    loop {
        cpu.execute_instruction();
    }
}

fn load_range(memory: &mut [u8; 0x1_0000], address: u16, bytes: &[u8]) {
    for (offset, &byte) in bytes.iter().enumerate() {
        memory[address.wrapping_add(offset as u16) as usize] = byte;
    }
}
