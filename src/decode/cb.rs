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

//! The `CB`-prefixed bit-op table (`spec.md` §4.3/C6): rotate/shift, `BIT`,
//! `RES`, `SET`, all sharing the `xx yyy zzz` layout, `x` selecting the
//! operation group and `z` the usual 8-register field.

use crate::alu;
use crate::cpu::{CPU, StepOutcome};
use crate::decode::{read_r8_hl, rotate_shift_op, write_r8_hl};
use crate::error::CpuFault;
use crate::registers::REG_MEM_HL;

pub fn execute(cpu: &mut CPU, prefix_pc: u16) -> Result<StepOutcome, CpuFault> {
    let opcode = cpu.fetch_byte_at(prefix_pc.wrapping_add(1));
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;

    let operand = read_r8_hl(cpu, z);
    let on_mem = z == REG_MEM_HL;

    let cycles = match x {
        0 => {
            let result = rotate_shift_op(&mut cpu.regs.f, y, operand);
            write_r8_hl(cpu, z, result);
            if on_mem { 15 } else { 8 }
        }
        1 => {
            alu::bit_test(&mut cpu.regs.f, y, operand);
            if on_mem { 12 } else { 8 }
        }
        2 => {
            let result = alu::res(y, operand);
            write_r8_hl(cpu, z, result);
            if on_mem { 15 } else { 8 }
        }
        3 => {
            let result = alu::set(y, operand);
            write_r8_hl(cpu, z, result);
            if on_mem { 15 } else { 8 }
        }
        _ => unreachable!(),
    };

    cpu.regs.pc = prefix_pc.wrapping_add(2);
    Ok(StepOutcome { cycles, reti: false })
}
