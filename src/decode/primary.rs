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

//! The unprefixed, 256-entry primary table (`spec.md` §4.3/C5). Laid out by
//! the `xx yyy zzz` bit grouping the silicon itself uses, rather than one
//! named function per opcode -- `x = opcode >> 6`, `y = (opcode >> 3) & 7`,
//! `z = opcode & 7`, and `p`/`q` splitting `y` further where a field selects
//! a register pair.

use log::warn;

use crate::alu;
use crate::cpu::{CPU, StepOutcome};
use crate::decode::{add_signed, alu_op, read_r8_hl, test_condition, write_r8_hl};
use crate::error::CpuFault;
use crate::interrupt;
use crate::registers::REG_MEM_HL;

pub fn execute(cpu: &mut CPU, opcode: u8) -> Result<StepOutcome, CpuFault> {
    let pc = cpu.regs.pc;

    match opcode {
        0xCB => return crate::decode::cb::execute(cpu, pc),
        0xED => return crate::decode::ed::execute(cpu, pc),
        0xDD => return crate::decode::dd::execute(cpu, pc),
        0xFD => {
            warn!("FD prefix at {:#06x} is not implemented (IY is unsupported); treated as a NOP.", pc);
            cpu.regs.pc = pc.wrapping_add(2);
            return Ok(StepOutcome { cycles: 8, reti: false });
        }
        _ => {}
    }

    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 1;

    match x {
        0 => block0(cpu, pc, opcode, y, z, p, q),
        1 => block1(cpu, pc, y, z),
        2 => block2(cpu, pc, y, z),
        3 => block3(cpu, pc, opcode, y, z, p, q),
        _ => unreachable!(),
    }
}

fn imm8(cpu: &CPU, pc: u16) -> u8 {
    cpu.fetch_byte_at(pc.wrapping_add(1))
}
fn imm16(cpu: &CPU, pc: u16) -> u16 {
    cpu.fetch_word_at(pc.wrapping_add(1))
}

fn advance(cpu: &mut CPU, pc: u16, len: u16, cycles: u32) -> Result<StepOutcome, CpuFault> {
    cpu.regs.pc = pc.wrapping_add(len);
    Ok(StepOutcome { cycles, reti: false })
}

/// `rp` table: `BC DE HL SP`, used by `LD rp,nn`/`INC rp`/`DEC rp`/`ADD HL,rp`.
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

/// `rp2` table: `BC DE HL AF`, used by `PUSH`/`POP`.
fn get_rp2(cpu: &CPU, p: u8) -> u16 {
    match p {
        0 => cpu.regs.bc.0,
        1 => cpu.regs.de.0,
        2 => cpu.regs.hl.0,
        3 => cpu.regs.af(),
        _ => unreachable!(),
    }
}
fn set_rp2(cpu: &mut CPU, p: u8, val: u16) {
    match p {
        0 => cpu.regs.bc.0 = val,
        1 => cpu.regs.de.0 = val,
        2 => cpu.regs.hl.0 = val,
        3 => cpu.regs.set_af(val),
        _ => unreachable!(),
    }
}

fn block0(cpu: &mut CPU, pc: u16, _opcode: u8, y: u8, z: u8, p: u8, q: u8) -> Result<StepOutcome, CpuFault> {
    match z {
        0 => match y {
            0 => advance(cpu, pc, 1, 4), // NOP
            1 => {
                cpu.regs.swap_af();
                advance(cpu, pc, 1, 4)
            }
            2 => {
                // DJNZ d
                let b = cpu.regs.bc.hi().wrapping_sub(1);
                cpu.regs.bc.set_hi(b);
                let d = imm8(cpu, pc);
                if b != 0 {
                    cpu.regs.pc = add_signed(pc.wrapping_add(2), d);
                    Ok(StepOutcome { cycles: 13, reti: false })
                } else {
                    advance(cpu, pc, 2, 8)
                }
            }
            3 => {
                let d = imm8(cpu, pc);
                cpu.regs.pc = add_signed(pc.wrapping_add(2), d);
                Ok(StepOutcome { cycles: 12, reti: false })
            }
            4..=7 => {
                let d = imm8(cpu, pc);
                if test_condition(&cpu.regs.f, y - 4) {
                    cpu.regs.pc = add_signed(pc.wrapping_add(2), d);
                    Ok(StepOutcome { cycles: 12, reti: false })
                } else {
                    advance(cpu, pc, 2, 7)
                }
            }
            _ => unreachable!(),
        },
        1 => {
            if q == 0 {
                let nn = imm16(cpu, pc);
                set_rp(cpu, p, nn);
                advance(cpu, pc, 3, 10)
            } else {
                let hl = cpu.regs.hl.0;
                let operand = get_rp(cpu, p);
                let result = alu::add16(&mut cpu.regs.f, hl, operand);
                cpu.regs.hl.0 = result;
                advance(cpu, pc, 1, 11)
            }
        }
        2 => {
            if q == 0 {
                match p {
                    0 => cpu.write_mem(cpu.regs.bc.0, cpu.regs.a),
                    1 => cpu.write_mem(cpu.regs.de.0, cpu.regs.a),
                    2 => {
                        let nn = imm16(cpu, pc);
                        cpu.memory.write_word(nn, cpu.regs.hl.0);
                        return advance(cpu, pc, 3, 16);
                    }
                    3 => {
                        let nn = imm16(cpu, pc);
                        cpu.write_mem(nn, cpu.regs.a);
                        return advance(cpu, pc, 3, 13);
                    }
                    _ => unreachable!(),
                }
                advance(cpu, pc, 1, 7)
            } else {
                match p {
                    0 => {
                        cpu.regs.a = cpu.read_mem(cpu.regs.bc.0);
                        advance(cpu, pc, 1, 7)
                    }
                    1 => {
                        cpu.regs.a = cpu.read_mem(cpu.regs.de.0);
                        advance(cpu, pc, 1, 7)
                    }
                    2 => {
                        let nn = imm16(cpu, pc);
                        cpu.regs.hl.0 = cpu.memory.read_word(nn);
                        advance(cpu, pc, 3, 16)
                    }
                    3 => {
                        let nn = imm16(cpu, pc);
                        cpu.regs.a = cpu.read_mem(nn);
                        advance(cpu, pc, 3, 13)
                    }
                    _ => unreachable!(),
                }
            }
        }
        3 => {
            let val = get_rp(cpu, p);
            if q == 0 {
                set_rp(cpu, p, val.wrapping_add(1));
            } else {
                set_rp(cpu, p, val.wrapping_sub(1));
            }
            advance(cpu, pc, 1, 6)
        }
        4 => {
            let val = read_r8_hl(cpu, y);
            let result = alu::inc8(&mut cpu.regs.f, val);
            write_r8_hl(cpu, y, result);
            advance(cpu, pc, 1, if y == REG_MEM_HL { 11 } else { 4 })
        }
        5 => {
            let val = read_r8_hl(cpu, y);
            let result = alu::dec8(&mut cpu.regs.f, val);
            write_r8_hl(cpu, y, result);
            advance(cpu, pc, 1, if y == REG_MEM_HL { 11 } else { 4 })
        }
        6 => {
            let n = imm8(cpu, pc);
            write_r8_hl(cpu, y, n);
            advance(cpu, pc, 2, if y == REG_MEM_HL { 10 } else { 7 })
        }
        7 => {
            let a = cpu.regs.a;
            let f = &mut cpu.regs.f;
            cpu.regs.a = match y {
                0 => alu::rlca(f, a),
                1 => alu::rrca(f, a),
                2 => alu::rla(f, a),
                3 => alu::rra(f, a),
                4 => alu::daa(f, a),
                5 => alu::cpl(f, a),
                6 => {
                    alu::scf(f);
                    a
                }
                7 => {
                    alu::ccf(f);
                    a
                }
                _ => unreachable!(),
            };
            advance(cpu, pc, 1, 4)
        }
        _ => unreachable!(),
    }
}

fn block1(cpu: &mut CPU, pc: u16, y: u8, z: u8) -> Result<StepOutcome, CpuFault> {
    if y == REG_MEM_HL && z == REG_MEM_HL {
        // PC stays parked on the HALT opcode itself for the whole stall;
        // only `leave_halt` moves it, by exactly one, when the halt ends.
        interrupt::halt(cpu);
        return Ok(StepOutcome { cycles: 4, reti: false });
    }
    let val = read_r8_hl(cpu, z);
    write_r8_hl(cpu, y, val);
    let cycles = if y == REG_MEM_HL || z == REG_MEM_HL { 7 } else { 4 };
    advance(cpu, pc, 1, cycles)
}

fn block2(cpu: &mut CPU, pc: u16, y: u8, z: u8) -> Result<StepOutcome, CpuFault> {
    let val = read_r8_hl(cpu, z);
    alu_op(cpu, y, val);
    advance(cpu, pc, 1, if z == REG_MEM_HL { 7 } else { 4 })
}

fn block3(cpu: &mut CPU, pc: u16, opcode: u8, y: u8, z: u8, p: u8, q: u8) -> Result<StepOutcome, CpuFault> {
    match z {
        0 => {
            if test_condition(&cpu.regs.f, y) {
                let ret_pc = cpu.pop16();
                cpu.regs.pc = ret_pc;
                Ok(StepOutcome { cycles: 11, reti: false })
            } else {
                advance(cpu, pc, 1, 5)
            }
        }
        1 => {
            if q == 0 {
                let val = cpu.pop16();
                set_rp2(cpu, p, val);
                advance(cpu, pc, 1, 10)
            } else {
                match p {
                    0 => {
                        let ret_pc = cpu.pop16();
                        cpu.regs.pc = ret_pc;
                        Ok(StepOutcome { cycles: 10, reti: false })
                    }
                    1 => {
                        cpu.regs.exx();
                        advance(cpu, pc, 1, 4)
                    }
                    2 => {
                        cpu.regs.pc = cpu.regs.hl.0;
                        Ok(StepOutcome { cycles: 4, reti: false })
                    }
                    3 => {
                        cpu.regs.sp = cpu.regs.hl.0;
                        advance(cpu, pc, 1, 6)
                    }
                    _ => unreachable!(),
                }
            }
        }
        2 => {
            let nn = imm16(cpu, pc);
            if test_condition(&cpu.regs.f, y) {
                cpu.regs.pc = nn;
            } else {
                cpu.regs.pc = pc.wrapping_add(3);
            }
            Ok(StepOutcome { cycles: 10, reti: false })
        }
        3 => match y {
            0 => {
                let nn = imm16(cpu, pc);
                cpu.regs.pc = nn;
                Ok(StepOutcome { cycles: 10, reti: false })
            }
            1 => unreachable!("0xCB is intercepted before block3 dispatch"),
            2 => {
                let n = imm8(cpu, pc);
                cpu.port_out(n, cpu.regs.a);
                advance(cpu, pc, 2, 11)
            }
            3 => {
                let n = imm8(cpu, pc);
                cpu.regs.a = cpu.port_in(n);
                advance(cpu, pc, 2, 11)
            }
            4 => {
                let sp_val = cpu.memory.read_word(cpu.regs.sp);
                cpu.memory.write_word(cpu.regs.sp, cpu.regs.hl.0);
                cpu.regs.hl.0 = sp_val;
                advance(cpu, pc, 1, 19)
            }
            5 => {
                std::mem::swap(&mut cpu.regs.de, &mut cpu.regs.hl);
                advance(cpu, pc, 1, 4)
            }
            6 => {
                interrupt::disable_interrupts(cpu);
                advance(cpu, pc, 1, 4)
            }
            7 => {
                interrupt::enable_interrupts(cpu);
                advance(cpu, pc, 1, 4)
            }
            _ => unreachable!(),
        },
        4 => {
            let nn = imm16(cpu, pc);
            if test_condition(&cpu.regs.f, y) {
                cpu.push16(pc.wrapping_add(3));
                cpu.regs.pc = nn;
                Ok(StepOutcome { cycles: 17, reti: false })
            } else {
                advance(cpu, pc, 3, 10)
            }
        }
        5 => {
            if q == 0 {
                let val = get_rp2(cpu, p);
                cpu.push16(val);
                advance(cpu, pc, 1, 11)
            } else {
                match p {
                    0 => {
                        let nn = imm16(cpu, pc);
                        cpu.push16(pc.wrapping_add(3));
                        cpu.regs.pc = nn;
                        Ok(StepOutcome { cycles: 17, reti: false })
                    }
                    // p=1 (0xDD) and p=2 (0xED) are intercepted in `execute`
                    // before block3 is reached; p=3 (0xFD) likewise.
                    _ => unreachable!("prefix opcode {:#04x} reached block3", opcode),
                }
            }
        }
        6 => {
            let n = imm8(cpu, pc);
            alu_op(cpu, y, n);
            advance(cpu, pc, 2, 7)
        }
        7 => {
            cpu.push16(pc.wrapping_add(1));
            cpu.regs.pc = (y as u16) * 8;
            Ok(StepOutcome { cycles: 11, reti: false })
        }
        _ => unreachable!(),
    }
}

