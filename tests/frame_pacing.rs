// Copyright (c) 2017, 2018, 2023 Marek Benc <benc.marek.elektro98@proton.me>
//
// Permission to use, copy, modify, and distribute this software for any
// purpose with or without fee is hereby granted, provided that the above
// copyright notice and this permission notice appear in all copies.
//
// THE SOFTWARE IS PROVIDED "AS IS" AND THE AUTHOR DISCLAIMS ALL WARRANTIES
// WITH REGARD TO THIS SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF
// MERCHANTABILITY AND FITNESS. IN NO EVENT SHALL THE AUTHOR BE LIABLE FOR
// ANY SPECIAL, DIRECT, INDIRECT, OR CONSEQUENTIAL DAMAGES OR ANY DAMAGES
// WHATSOEVER RESULTING FROM LOSS OF USE, DATA OR PROFITS, WHETHER IN AN
// ACTION OF CONTRACT, NEGLIGENCE OR OTHER TORTIOUS ACTION, ARISING OUT OF
// OR IN CONNECTION WITH THE USE OR PERFORMANCE OF THIS SOFTWARE.
//

//! Exercises the public `step`/`step_with_clock` surface instead of the
//! internal single-instruction helper the unit tests use.

use z80_core::{CpuConfig, NullClock, CPU};

fn looping_program() -> CPU {
    let mut config = CpuConfig::default();
    // A tiny frequency keeps this test fast: one frame is a handful of NOPs.
    config.cpu_frequency_hz = 400;
    config.refresh_rate_hz = 100;
    let mut cpu = CPU::with_config(config);
    for addr in 0..0x10 {
        cpu.memory.write_byte(addr, 0x00); // NOP
    }
    cpu.memory.write_byte(0x10, 0xC3); // JP 0x0000
    cpu.memory.write_byte(0x11, 0x00);
    cpu.memory.write_byte(0x12, 0x00);
    cpu
}

#[test]
fn step_with_null_clock_executes_exactly_one_frame_budget() {
    let mut cpu = looping_program();
    let executed = cpu.step_with_clock(&NullClock).unwrap();
    // Budget is 400 / 100 = 4 cycles; each NOP costs 4, so exactly one runs.
    assert_eq!(executed, 4);
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn running_several_frames_wraps_around_the_jp_loop() {
    let mut cpu = looping_program();
    for _ in 0..20 {
        cpu.step_with_clock(&NullClock).unwrap();
    }
    assert!(cpu.regs.pc <= 0x0013);
}

#[test]
fn load_rejects_a_rom_larger_than_the_address_space() {
    use std::io::Write;
    let mut path = std::env::temp_dir();
    path.push("z80_core_oversized_rom_test.bin");
    {
        let mut f = std::fs::File::create(&path).unwrap();
        let oversized = vec![0u8; 0x10001];
        f.write_all(&oversized).unwrap();
    }
    let mut cpu = CPU::new();
    let result = cpu.load(&path);
    assert!(result.is_err());
    std::fs::remove_file(&path).ok();
}
