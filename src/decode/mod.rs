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

//! The four decode tables (C5-C8). Rather than ~700 named per-opcode
//! functions, the register/condition/ALU-op fields that repeat across many
//! opcodes are decoded algorithmically from the opcode's bit groups, the
//! way the byte is actually laid out on real silicon: `xx yyy zzz` for most
//! of the primary table, `xx yyy zzz` again for CB, row/column pairs for ED.

pub mod cb;
pub mod dd;
pub mod ed;
pub mod primary;

use crate::alu;
use crate::cpu::CPU;
use crate::registers::{Flags, REG_MEM_HL};

/// Read one of the 8 register-field operands against `(HL)`, per the shared
/// `B C D E H L (HL) A` encoding.
pub fn read_r8_hl(cpu: &CPU, index: u8) -> u8 {
    if index == REG_MEM_HL {
        cpu.read_mem(cpu.regs.hl.0)
    } else {
        cpu.regs.reg8(index)
    }
}

pub fn write_r8_hl(cpu: &mut CPU, index: u8, val: u8) {
    if index == REG_MEM_HL {
        let addr = cpu.regs.hl.0;
        cpu.write_mem(addr, val);
    } else {
        cpu.regs.set_reg8(index, val);
    }
}

/// The 8 `ALU A,op` forms selected by the `yyy` field of `0x80-0xBF` and
/// `0xC6-0xFE` (`spec.md` §4.1).
pub fn alu_op(cpu: &mut CPU, op: u8, value: u8) {
    let a = cpu.regs.a;
    let carry = cpu.regs.f.carry;
    let result = match op {
        0 => alu::add8(&mut cpu.regs.f, a, value, false),
        1 => alu::add8(&mut cpu.regs.f, a, value, carry),
        2 => alu::sub8(&mut cpu.regs.f, a, value, false),
        3 => alu::sub8(&mut cpu.regs.f, a, value, carry),
        4 => alu::and8(&mut cpu.regs.f, a, value),
        5 => alu::xor8(&mut cpu.regs.f, a, value),
        6 => alu::or8(&mut cpu.regs.f, a, value),
        7 => {
            alu::cp8(&mut cpu.regs.f, a, value);
            a
        }
        _ => unreachable!(),
    };
    if op != 7 {
        cpu.regs.a = result;
    }
}

/// The 8 CB-prefixed rotate/shift forms selected by the `yyy` field of
/// `0x00-0x3F` in the CB table.
pub fn rotate_shift_op(f: &mut Flags, op: u8, value: u8) -> u8 {
    match op {
        0 => alu::rlc8(f, value),
        1 => alu::rrc8(f, value),
        2 => alu::rl8(f, value),
        3 => alu::rr8(f, value),
        4 => alu::sla8(f, value),
        5 => alu::sra8(f, value),
        6 => alu::sll8(f, value),
        7 => alu::srl8(f, value),
        _ => unreachable!(),
    }
}

/// `cc` condition codes for `JP cc,nn`/`CALL cc,nn`/`RET cc` (and the first
/// four for `JR cc,d`): `NZ Z NC C PO PE P M`.
pub fn test_condition(f: &Flags, cc: u8) -> bool {
    match cc {
        0 => !f.zero,
        1 => f.zero,
        2 => !f.carry,
        3 => f.carry,
        4 => !f.pv,
        5 => f.pv,
        6 => !f.sign,
        7 => f.sign,
        _ => unreachable!(),
    }
}

/// Sign-extend a displacement/offset byte and add it to a 16-bit base,
/// wrapping within the 64 KiB address space (`spec.md` §4.3).
pub fn add_signed(base: u16, offset: u8) -> u16 {
    base.wrapping_add(offset as i8 as i16 as u16)
}

