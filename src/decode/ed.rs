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

//! The `ED`-prefixed table (`spec.md` §4.3/C7): 16-bit `ADC`/`SBC`, the
//! extended `LD` forms, interrupt-mode/refresh-register access, and the
//! block instructions of §4.2. Sparse by construction -- most of the 256
//! second bytes are undefined and, per the error taxonomy in `spec.md` §7,
//! treated as a logged 2-byte `NOP` rather than a fault.
//!
//! Cost is always charged against the final opcode, never the `ED` prefix
//! byte itself (`spec.md` §9, open question 5): the prefix fetch contributes
//! no cycles of its own here, only the table lookup below does.

use log::warn;

use crate::alu;
use crate::cpu::{InterruptMode, CPU, StepOutcome};
use crate::error::CpuFault;
use crate::interrupt;

pub fn execute(cpu: &mut CPU, prefix_pc: u16) -> Result<StepOutcome, CpuFault> {
    let opcode = cpu.fetch_byte_at(prefix_pc.wrapping_add(1));
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 1;

    let next_pc = prefix_pc.wrapping_add(2);

    match x {
        1 => normal(cpu, opcode, y, z, p, q, next_pc),
        2 if z <= 3 && y >= 4 => {
            let cycles = block_op(cpu, y, z, next_pc);
            Ok(StepOutcome { cycles, reti: false })
        }
        _ => {
            warn!("ED {:#04x} at {:#06x} is undefined; treated as a NOP.", opcode, prefix_pc);
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles: 8, reti: false })
        }
    }
}

fn get_rp(cpu: &CPU, p: u8) -> u16 {
    match p {
        0 => cpu.regs.bc.0,
        1 => cpu.regs.de.0,
        2 => cpu.regs.hl.0,
        3 => cpu.regs.sp,
        _ => unreachable!(),
    }
}
fn set_rp(cpu: &mut CPU, p: u8, val: u16) {
    match p {
        0 => cpu.regs.bc.0 = val,
        1 => cpu.regs.de.0 = val,
        2 => cpu.regs.hl.0 = val,
        3 => cpu.regs.sp = val,
        _ => unreachable!(),
    }
}

/// `IN r,(C)`/`OUT (C),r`'s register field: same 8-way encoding as elsewhere,
/// except index 6 means "flags only, no register" (the undocumented
/// `IN F,(C)` / `OUT (C),0` forms).
fn get_io_reg(cpu: &CPU, y: u8) -> u8 {
    if y == 6 {
        0
    } else {
        cpu.regs.reg8(y)
    }
}
fn set_io_reg(cpu: &mut CPU, y: u8, val: u8) {
    if y != 6 {
        cpu.regs.set_reg8(y, val);
    }
}

fn normal(cpu: &mut CPU, opcode: u8, y: u8, z: u8, p: u8, q: u8, next_pc: u16) -> Result<StepOutcome, CpuFault> {
    match z {
        0 => {
            let port = cpu.regs.bc.lo();
            let val = cpu.port_in(port);
            set_io_reg(cpu, y, val);
            let f = &mut cpu.regs.f;
            f.zero = val == 0;
            f.sign = val & 0x80 != 0;
            f.pv = alu::parity8(val);
            f.half = false;
            f.add_sub = false;
            f.copy_undoc(val);
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles: 12, reti: false })
        }
        1 => {
            let port = cpu.regs.bc.lo();
            let val = get_io_reg(cpu, y);
            cpu.port_out(port, val);
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles: 12, reti: false })
        }
        2 => {
            let hl = cpu.regs.hl.0;
            let operand = get_rp(cpu, p);
            let carry = cpu.regs.f.carry;
            let result = if q == 0 {
                alu::sbc16(&mut cpu.regs.f, hl, operand, carry)
            } else {
                alu::adc16(&mut cpu.regs.f, hl, operand, carry)
            };
            cpu.regs.hl.0 = result;
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles: 15, reti: false })
        }
        3 => {
            let nn = cpu.fetch_word_at(next_pc);
            if q == 0 {
                let val = get_rp(cpu, p);
                cpu.memory.write_word(nn, val);
            } else {
                let val = cpu.memory.read_word(nn);
                set_rp(cpu, p, val);
            }
            cpu.regs.pc = next_pc.wrapping_add(2);
            Ok(StepOutcome { cycles: 20, reti: false })
        }
        4 => {
            let a = cpu.regs.a;
            cpu.regs.a = alu::neg(&mut cpu.regs.f, a);
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles: 8, reti: false })
        }
        5 => {
            let ret_pc = if q == 0 { interrupt::retn(cpu) } else { interrupt::reti(cpu) };
            cpu.regs.pc = ret_pc;
            Ok(StepOutcome { cycles: 14, reti: q == 1 })
        }
        6 => {
            cpu.interrupt_mode = match y & 0x03 {
                0 | 1 => InterruptMode::Mode0,
                2 => InterruptMode::Mode1,
                3 => InterruptMode::Mode2,
                _ => unreachable!(),
            };
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles: 8, reti: false })
        }
        7 => {
            match y {
                0 => cpu.regs.i = cpu.regs.a,
                1 => cpu.regs.r = cpu.regs.a,
                2 => {
                    cpu.regs.a = cpu.regs.i;
                    ld_a_ir_flags(cpu);
                }
                3 => {
                    cpu.regs.a = cpu.regs.r;
                    ld_a_ir_flags(cpu);
                }
                4 => {
                    let mem = cpu.read_mem(cpu.regs.hl.0);
                    let (new_a, new_mem) = alu::rrd(&mut cpu.regs.f, cpu.regs.a, mem);
                    cpu.regs.a = new_a;
                    cpu.write_mem(cpu.regs.hl.0, new_mem);
                }
                5 => {
                    let mem = cpu.read_mem(cpu.regs.hl.0);
                    let (new_a, new_mem) = alu::rld(&mut cpu.regs.f, cpu.regs.a, mem);
                    cpu.regs.a = new_a;
                    cpu.write_mem(cpu.regs.hl.0, new_mem);
                }
                _ => {}
            }
            let cycles = if y == 4 || y == 5 { 18 } else { 9 };
            cpu.regs.pc = next_pc;
            Ok(StepOutcome { cycles, reti: false })
        }
        _ => unreachable!(),
    }
}

/// `LD A,I`/`LD A,R`: `SF`/`ZF` from the loaded value, `PV` from `IFF2`
/// (the interrupted-during-DI escape hatch programs use this for), `HF`/`NF`
/// cleared.
fn ld_a_ir_flags(cpu: &mut CPU) {
    let val = cpu.regs.a;
    let iff2 = cpu.iff2;
    let f = &mut cpu.regs.f;
    f.sign = val & 0x80 != 0;
    f.zero = val == 0;
    f.half = false;
    f.add_sub = false;
    f.pv = iff2;
}

/// Every block instruction (`spec.md` §4.2), dispatched by `y` (which
/// direction / which kind) and `z` (LD/CP/IN/OUT). Returns this step's cycle
/// cost; the repeat-vs-terminate decision (and the associated `PC`
/// rewind-by-2) is made per kind below.
fn block_op(cpu: &mut CPU, y: u8, z: u8, next_pc: u16) -> u32 {
    let increment: i32 = if y == 4 || y == 6 { 1 } else { -1 };
    let repeating = y == 6 || y == 7;

    let cycles = match z {
        0 => block_ld(cpu, increment),
        1 => block_cp(cpu, increment),
        2 => block_in(cpu, increment),
        3 => block_out(cpu, increment),
        _ => unreachable!(),
    };

    let should_repeat = match z {
        0 => repeating && cpu.regs.bc.0 != 0,
        1 => repeating && cpu.regs.bc.0 != 0 && !cpu.regs.f.zero,
        2 | 3 => repeating && cpu.regs.bc.hi() != 0,
        _ => unreachable!(),
    };

    if should_repeat {
        cpu.regs.pc = next_pc.wrapping_sub(2);
        cycles + 5
    } else {
        cpu.regs.pc = next_pc;
        cycles
    }
}

fn step_hl(cpu: &mut CPU, increment: i32) {
    cpu.regs.hl.0 = cpu.regs.hl.0.wrapping_add(increment as u16);
}
fn step_de(cpu: &mut CPU, increment: i32) {
    cpu.regs.de.0 = cpu.regs.de.0.wrapping_add(increment as u16);
}

/// `LDI`/`LDD`: `mem[DE] <- mem[HL]`, `HL`/`DE` step, `BC` decrements.
/// `NF`/`HF` clear, `PV = (BC != 0)` (`spec.md` §9, open question 5's
/// sibling: repeat is driven purely off this `PV`/`BC` state).
fn block_ld(cpu: &mut CPU, increment: i32) -> u32 {
    let val = cpu.read_mem(cpu.regs.hl.0);
    cpu.write_mem(cpu.regs.de.0, val);
    step_hl(cpu, increment);
    step_de(cpu, increment);
    cpu.regs.bc.0 = cpu.regs.bc.0.wrapping_sub(1);

    let f = &mut cpu.regs.f;
    f.half = false;
    f.add_sub = false;
    f.pv = cpu.regs.bc.0 != 0;
    let carry_bits = val.wrapping_add(cpu.regs.a);
    f.f3 = carry_bits & 0x08 != 0;
    f.f5 = carry_bits & 0x02 != 0;
    16
}

/// `CPI`/`CPD`: compare `A` with `mem[HL]` like `CP`, but `CF` is left
/// untouched and `PV` reports `BC != 0` instead of signed overflow. Repeat
/// termination is `BC == 0 OR A == mem[HL]` (`spec.md` §9, open question 6).
fn block_cp(cpu: &mut CPU, increment: i32) -> u32 {
    let val = cpu.read_mem(cpu.regs.hl.0);
    let a = cpu.regs.a;
    let saved_carry = cpu.regs.f.carry;
    alu::cp8(&mut cpu.regs.f, a, val);
    cpu.regs.f.carry = saved_carry;
    step_hl(cpu, increment);
    cpu.regs.bc.0 = cpu.regs.bc.0.wrapping_sub(1);
    cpu.regs.f.pv = cpu.regs.bc.0 != 0;
    16
}

/// `INI`/`IND`: read port `C` into `mem[HL]`, `HL` steps, `B` decrements.
/// The undocumented `HF`/`PV`/`F3`/`F5` results of real silicon depend on a
/// carry out of `C +/- 1 + val`; this core reports the documented subset
/// (`ZF`/`NF`/`SF`) precisely and leaves the rest at a conservative default,
/// matching the simplification the teacher's own core makes for this family.
fn block_in(cpu: &mut CPU, increment: i32) -> u32 {
    let port = cpu.regs.bc.lo();
    let val = cpu.port_in(port);
    cpu.write_mem(cpu.regs.hl.0, val);
    step_hl(cpu, increment);
    let b = cpu.regs.bc.hi().wrapping_sub(1);
    cpu.regs.bc.set_hi(b);

    let f = &mut cpu.regs.f;
    f.zero = b == 0;
    f.sign = b & 0x80 != 0;
    f.add_sub = true;
    f.copy_undoc(b);
    16
}

/// `OUTI`/`OUTD`: write `mem[HL]` to port `C`, `HL` steps, `B` decrements.
fn block_out(cpu: &mut CPU, increment: i32) -> u32 {
    let val = cpu.read_mem(cpu.regs.hl.0);
    let port = cpu.regs.bc.lo();
    cpu.port_out(port, val);
    step_hl(cpu, increment);
    let b = cpu.regs.bc.hi().wrapping_sub(1);
    cpu.regs.bc.set_hi(b);

    let f = &mut cpu.regs.f;
    f.zero = b == 0;
    f.sign = b & 0x80 != 0;
    f.add_sub = true;
    f.copy_undoc(b);
    16
}
