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

//! The `DD`-prefixed (`IX`) table (`spec.md` §4.3/C8). Only the documented
//! `IX`-indexed forms are implemented; `IY` (`FD`) and the doubly-prefixed
//! `DDCB` bit-op table are out of scope (`spec.md` §9, open question 7) and
//! fall back to a logged `NOP` like every other undefined `DD` second byte.

use log::warn;

use crate::decode::{add_signed, alu_op};
use crate::cpu::{CPU, StepOutcome};
use crate::error::CpuFault;
use crate::registers::{REG_A, REG_B, REG_C, REG_D, REG_E, REG_H, REG_L};

pub fn execute(cpu: &mut CPU, prefix_pc: u16) -> Result<StepOutcome, CpuFault> {
    let opcode = cpu.fetch_byte_at(prefix_pc.wrapping_add(1));

    match opcode {
        0x21 => {
            let nn = cpu.fetch_word_at(prefix_pc.wrapping_add(2));
            cpu.regs.ix = nn;
            done(cpu, prefix_pc, 4, 14)
        }
        0x22 => {
            let nn = cpu.fetch_word_at(prefix_pc.wrapping_add(2));
            cpu.memory.write_word(nn, cpu.regs.ix);
            done(cpu, prefix_pc, 4, 20)
        }
        0x2A => {
            let nn = cpu.fetch_word_at(prefix_pc.wrapping_add(2));
            cpu.regs.ix = cpu.memory.read_word(nn);
            done(cpu, prefix_pc, 4, 20)
        }
        0x23 => {
            cpu.regs.ix = cpu.regs.ix.wrapping_add(1);
            done(cpu, prefix_pc, 2, 10)
        }
        0x2B => {
            cpu.regs.ix = cpu.regs.ix.wrapping_sub(1);
            done(cpu, prefix_pc, 2, 10)
        }
        0x09 | 0x19 | 0x29 | 0x39 => {
            let operand = match opcode {
                0x09 => cpu.regs.bc.0,
                0x19 => cpu.regs.de.0,
                0x29 => cpu.regs.ix,
                0x39 => cpu.regs.sp,
                _ => unreachable!(),
            };
            let ix = cpu.regs.ix;
            let result = crate::alu::add16(&mut cpu.regs.f, ix, operand);
            cpu.regs.ix = result;
            done(cpu, prefix_pc, 2, 15)
        }
        0xE5 => {
            cpu.push16(cpu.regs.ix);
            done(cpu, prefix_pc, 2, 15)
        }
        0xE1 => {
            cpu.regs.ix = cpu.pop16();
            done(cpu, prefix_pc, 2, 14)
        }
        0xE3 => {
            let sp_val = cpu.memory.read_word(cpu.regs.sp);
            cpu.memory.write_word(cpu.regs.sp, cpu.regs.ix);
            cpu.regs.ix = sp_val;
            done(cpu, prefix_pc, 2, 23)
        }
        0xE9 => {
            cpu.regs.pc = cpu.regs.ix;
            Ok(StepOutcome { cycles: 8, reti: false })
        }
        0xF9 => {
            cpu.regs.sp = cpu.regs.ix;
            done(cpu, prefix_pc, 2, 10)
        }
        0x34 => {
            let addr = indexed_addr(cpu, prefix_pc);
            let val = cpu.read_mem(addr);
            let result = crate::alu::inc8(&mut cpu.regs.f, val);
            cpu.write_mem(addr, result);
            done(cpu, prefix_pc, 3, 23)
        }
        0x35 => {
            let addr = indexed_addr(cpu, prefix_pc);
            let val = cpu.read_mem(addr);
            let result = crate::alu::dec8(&mut cpu.regs.f, val);
            cpu.write_mem(addr, result);
            done(cpu, prefix_pc, 3, 23)
        }
        0x36 => {
            let addr = indexed_addr(cpu, prefix_pc);
            let n = cpu.fetch_byte_at(prefix_pc.wrapping_add(3));
            cpu.write_mem(addr, n);
            done(cpu, prefix_pc, 4, 19)
        }
        0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
            let addr = indexed_addr(cpu, prefix_pc);
            let val = cpu.read_mem(addr);
            let dest = ld_r_ix_dest(opcode);
            cpu.regs.set_reg8(dest, val);
            done(cpu, prefix_pc, 3, 19)
        }
        0x70..=0x77 if opcode != 0x76 => {
            let addr = indexed_addr(cpu, prefix_pc);
            let src = opcode & 0x07;
            let val = cpu.regs.reg8(src);
            cpu.write_mem(addr, val);
            done(cpu, prefix_pc, 3, 19)
        }
        0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
            let addr = indexed_addr(cpu, prefix_pc);
            let val = cpu.read_mem(addr);
            let op = (opcode >> 3) & 0x07;
            alu_op(cpu, op, val);
            done(cpu, prefix_pc, 3, 19)
        }
        0xCB => {
            // DDCB: a doubly-indirected bit-op table (`RLC (IX+d)`, etc.) is
            // deliberately unimplemented; fall back to the generic 2-byte
            // NOP below, but skip the displacement byte and sub-opcode too
            // so PC lands past the full 4-byte DDCB instruction.
            warn!("DDCB at {:#06x} is not implemented; treated as a NOP.", prefix_pc);
            cpu.regs.pc = prefix_pc.wrapping_add(4);
            Ok(StepOutcome { cycles: 23, reti: false })
        }
        _ => {
            warn!("DD {:#04x} at {:#06x} is not implemented; treated as a NOP.", opcode, prefix_pc);
            done(cpu, prefix_pc, 2, 8)
        }
    }
}

fn indexed_addr(cpu: &CPU, prefix_pc: u16) -> u16 {
    let d = cpu.fetch_byte_at(prefix_pc.wrapping_add(2));
    add_signed(cpu.regs.ix, d)
}

fn ld_r_ix_dest(opcode: u8) -> u8 {
    match opcode {
        0x46 => REG_B,
        0x4E => REG_C,
        0x56 => REG_D,
        0x5E => REG_E,
        0x66 => REG_H,
        0x6E => REG_L,
        0x7E => REG_A,
        _ => unreachable!(),
    }
}

fn done(cpu: &mut CPU, prefix_pc: u16, len: u16, cycles: u32) -> Result<StepOutcome, CpuFault> {
    cpu.regs.pc = prefix_pc.wrapping_add(len);
    Ok(StepOutcome { cycles, reti: false })
}
