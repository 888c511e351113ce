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

//! `DI`/`EI`/`HALT` semantics and interrupt entry (C10). The EI-delay rule
//! of `spec.md` §4.4 / §9 open question 4 is realized the way the teacher's
//! newer core does it: `EI` commits `IFF1`/`IFF2` immediately, but a second
//! flag (`accepting_interrupts`) only flips true once *another* instruction
//! has been fetched and executed, so a pending interrupt can't be serviced
//! until the instruction after `EI` has run.

use log::warn;

use crate::cpu::{InterruptMode, CPU};

pub fn disable_interrupts(cpu: &mut CPU) {
    cpu.iff1 = false;
    cpu.iff2 = false;
}

pub fn enable_interrupts(cpu: &mut CPU) {
    cpu.iff1 = true;
    cpu.iff2 = true;
    // Accepting_interrupts is deliberately left alone here: if it was
    // already true (interrupts were enabled before this EI), it stays true
    // and an interrupt may be serviced after the very next instruction, same
    // as real hardware. If it was false, the call below re-establishes the
    // one-instruction delay.
}

pub fn halt(cpu: &mut CPU) {
    cpu.halted = true;
    cpu.set_halt_pin(true);
}

/// Call once per `step_instruction`, after dispatch: `accepting_interrupts`
/// picks up `IFF1` as it stood *before* the instruction that just ran, so
/// `EI` followed by one instruction then a check is the earliest a pending
/// interrupt can be taken, never the instruction right after `EI` itself.
pub(crate) fn tick_ei_delay(cpu: &mut CPU) {
    cpu.accepting_interrupts = cpu.iff1_prev;
    cpu.iff1_prev = cpu.iff1;
}

pub(crate) fn maskable_interrupt_ready(cpu: &CPU) -> bool {
    cpu.interrupt_pending && cpu.iff1 && cpu.accepting_interrupts
}

/// `RETN`: pop PC, `IFF1 <- IFF2` (`spec.md` §4.4).
pub fn retn(cpu: &mut CPU) -> u16 {
    let pc = cpu.pop16();
    cpu.iff1 = cpu.iff2;
    pc
}

/// `RETI`: pop PC, `IFF1 <- IFF2`; the "interrupt completed" signal to a
/// peripheral is the caller's responsibility (`spec.md` §4.4 names it a
/// boundary behavior only -- see `StepOutcome::reti`).
pub fn reti(cpu: &mut CPU) -> u16 {
    let pc = cpu.pop16();
    cpu.iff1 = cpu.iff2;
    pc
}

/// Leave `HALT`, advancing PC past the opcode that parked it there.
fn leave_halt(cpu: &mut CPU) {
    if cpu.halted {
        cpu.halted = false;
        cpu.set_halt_pin(false);
        cpu.regs.pc = cpu.regs.pc.wrapping_add(1);
    }
}

/// Non-maskable interrupt entry: always accepted, vector `0x0066`. `IFF2`
/// is left holding the pre-NMI value of `IFF1` so `RETN` can restore it;
/// `IFF1` itself is cleared so maskable interrupts stay masked during the
/// NMI handler (`SPEC_FULL.md` §C).
pub fn perform_nmi(cpu: &mut CPU) -> u32 {
    leave_halt(cpu);
    cpu.iff2 = cpu.iff1;
    cpu.iff1 = false;
    cpu.iff1_prev = false;

    cpu.push16(cpu.regs.pc);
    cpu.regs.pc = 0x0066;
    cpu.nmi_pending = false;

    11
}

/// Maskable interrupt entry for modes 0/1/2 (`spec.md` §4.4). In mode 0 the
/// bus is expected to supply an opcode; since this core has no daisy-chained
/// peripheral to ask, it assumes the common case of `RST 38h`, matching the
/// teacher's documented simplification.
pub fn perform_interrupt(cpu: &mut CPU) -> u32 {
    leave_halt(cpu);
    cpu.iff1 = false;
    cpu.iff2 = false;
    cpu.accepting_interrupts = false;
    cpu.iff1_prev = false;
    cpu.interrupt_pending = false;

    match cpu.interrupt_mode {
        InterruptMode::Mode0 => {
            cpu.push16(cpu.regs.pc);
            cpu.regs.pc = 0x0038;
            13
        }
        InterruptMode::Mode1 => {
            cpu.push16(cpu.regs.pc);
            cpu.regs.pc = 0x0038;
            13
        }
        InterruptMode::Mode2 => {
            cpu.push16(cpu.regs.pc);
            let vector_base = ((cpu.regs.i as u16) << 8) | (cpu.mode2_vector_low as u16);
            cpu.regs.pc = cpu.memory.read_word(vector_base);
            19
        }
    }
}

/// The minimal external `interrupt()` entry point of `spec.md` §6: clears a
/// parked `HALT` and, if interrupts are actually being accepted, performs
/// full interrupt entry.
pub fn interrupt(cpu: &mut CPU) -> u32 {
    if !maskable_interrupt_ready(cpu) {
        if cpu.halted {
            warn!("interrupt() called while halted but interrupts are masked; HALT pin stays set.");
        }
        return 0;
    }
    perform_interrupt(cpu)
}
