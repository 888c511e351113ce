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

//! An instruction-accurate emulated core for the Zilog Z80 CPU, built for
//! embedding into a host that supplies memory, I/O and pacing around it --
//! a calculator ROM, a home computer, a test harness. See `CPU` for the
//! external interface.

pub mod alu;
pub mod bus;
pub mod clock;
pub mod cpu;
pub mod decode;
pub mod error;
pub mod interrupt;
pub mod registers;

pub use bus::{Memory, Pins, Ports};
pub use clock::{Clock, NullClock, RealTimeClock};
pub use cpu::{CpuConfig, InterruptMode, StepOutcome, CPU};
pub use error::{CpuFault, LoadError};

use log::trace;

/// Execute exactly one instruction at the current `PC`: service a pending
/// `NMI` or accepted maskable interrupt first, then the `HALT` stall, then
/// fetch-decode-execute. This is the unit `clock::run_frame` accumulates
/// cycles over, and the thing `spec.md` §4.5 calls "one step of the
/// emulation loop".
pub(crate) fn step_instruction(cpu: &mut CPU) -> Result<StepOutcome, error::CpuFault> {
    if cpu.nmi_pending {
        let cycles = interrupt::perform_nmi(cpu);
        return Ok(StepOutcome { cycles, reti: false });
    }

    if interrupt::maskable_interrupt_ready(cpu) {
        let cycles = interrupt::perform_interrupt(cpu);
        return Ok(StepOutcome { cycles, reti: false });
    }

    if cpu.halted {
        // A halted CPU keeps executing NOPs in place so the R register and
        // cycle accounting stay correct, without ever advancing PC past the
        // HALT opcode (spec.md §4.4).
        interrupt::tick_ei_delay(cpu);
        return Ok(StepOutcome { cycles: 4, reti: false });
    }

    let pc = cpu.regs.pc;
    let opcode = cpu.fetch_byte_at(pc);
    cpu.regs.r = (cpu.regs.r & 0x80) | (cpu.regs.r.wrapping_add(1) & 0x7F);
    trace!("pc={:#06x} opcode={:#04x}", pc, opcode);

    let outcome = decode::primary::execute(cpu, opcode)?;
    interrupt::tick_ei_delay(cpu);
    cpu.cycle_accumulator = cpu.cycle_accumulator.wrapping_add(outcome.cycles as u64);
    Ok(outcome)
}

impl CPU {
    /// Run one instruction, without any wall-clock pacing. Useful for tests
    /// and headless fast-forward embedders that drive their own loop.
    pub fn step_instruction(&mut self) -> Result<StepOutcome, error::CpuFault> {
        step_instruction(self)
    }

    /// Run one frame's worth of instructions (`cpu_frequency_hz /
    /// refresh_rate_hz` cycles), pacing the remainder of the frame against
    /// the wall clock (`spec.md` §4.5/§6).
    pub fn step(&mut self) -> Result<u32, error::CpuFault> {
        clock::run_frame(self, &clock::RealTimeClock)
    }

    /// Same as `step`, but against a caller-supplied `Clock` -- the hook
    /// tests use to run frames instantly instead of sleeping out the real
    /// refresh interval.
    pub fn step_with_clock<C: Clock>(&mut self, clock: &C) -> Result<u32, error::CpuFault> {
        clock::run_frame(self, clock)
    }

    /// The external `interrupt()` entry point of `spec.md` §6: request a
    /// maskable interrupt, to be serviced at the next instruction boundary
    /// if `IFF1` is set and the `EI` delay has elapsed.
    pub fn interrupt(&mut self) {
        self.request_interrupt();
    }

    /// Request a non-maskable interrupt, always serviced at the next
    /// instruction boundary regardless of `IFF1` (`SPEC_FULL.md` §C).
    pub fn nmi(&mut self) {
        self.request_nmi();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with_program(bytes: &[u8]) -> CPU {
        let mut cpu = CPU::new();
        for (i, b) in bytes.iter().enumerate() {
            cpu.memory.write_byte(i as u16, *b);
        }
        cpu
    }

    #[test]
    fn immediate_load_and_add() {
        // LD A,5 ; LD B,10 ; ADD A,B
        let mut cpu = cpu_with_program(&[0x3E, 0x05, 0x06, 0x0A, 0x80]);
        cpu.step_instruction().unwrap();
        cpu.step_instruction().unwrap();
        cpu.step_instruction().unwrap();
        assert_eq!(cpu.regs.a, 15);
        assert!(!cpu.regs.f.zero);
    }

    #[test]
    fn inc_wraps_and_sets_zero_flag() {
        // LD A,0xFF ; INC A
        let mut cpu = cpu_with_program(&[0x3E, 0xFF, 0x3C]);
        cpu.step_instruction().unwrap();
        cpu.step_instruction().unwrap();
        assert_eq!(cpu.regs.a, 0);
        assert!(cpu.regs.f.zero);
        assert!(cpu.regs.f.half);
    }

    #[test]
    fn call_and_ret_round_trip_the_stack() {
        // At 0: CALL 0x0010. At 0x10: RET.
        let mut cpu = cpu_with_program(&[0xCD, 0x10, 0x00]);
        cpu.memory.write_byte(0x0010, 0xC9);
        cpu.regs.sp = 0xFFF0;

        cpu.step_instruction().unwrap();
        assert_eq!(cpu.regs.pc, 0x0010);
        assert_eq!(cpu.regs.sp, 0xFFEE);

        cpu.step_instruction().unwrap();
        assert_eq!(cpu.regs.pc, 0x0003);
        assert_eq!(cpu.regs.sp, 0xFFF0);
    }

    #[test]
    fn ex_af_af_prime_round_trips() {
        // LD A,0x42 ; EX AF,AF' ; EX AF,AF'
        let mut cpu = cpu_with_program(&[0x3E, 0x42, 0x08, 0x08]);
        cpu.step_instruction().unwrap();
        let before = cpu.regs.a;
        cpu.step_instruction().unwrap();
        cpu.step_instruction().unwrap();
        assert_eq!(cpu.regs.a, before);
    }

    #[test]
    fn conditional_jump_not_taken_costs_fewer_cycles() {
        // XOR A (clears Z..no, sets Z) ; JP NZ,0x0100
        let mut cpu = cpu_with_program(&[0xAF, 0xC2, 0x00, 0x01]);
        cpu.step_instruction().unwrap();
        assert!(cpu.regs.f.zero);
        let outcome = cpu.step_instruction().unwrap();
        assert_eq!(outcome.cycles, 10);
        assert_eq!(cpu.regs.pc, 0x0004);
    }

    #[test]
    fn ldir_copies_a_block_and_leaves_bc_zero() {
        // LDIR from 0x0100 (3 bytes) to 0x0200, BC=3.
        let mut cpu = CPU::new();
        cpu.memory.write_byte(0x0100, 0xAA);
        cpu.memory.write_byte(0x0101, 0xBB);
        cpu.memory.write_byte(0x0102, 0xCC);
        cpu.regs.hl.0 = 0x0100;
        cpu.regs.de.0 = 0x0200;
        cpu.regs.bc.0 = 3;
        cpu.memory.write_byte(0x0000, 0xED);
        cpu.memory.write_byte(0x0001, 0xB0);

        let mut total_cycles = 0u64;
        loop {
            let outcome = cpu.step_instruction().unwrap();
            total_cycles += outcome.cycles as u64;
            if cpu.regs.pc != 0x0000 {
                break;
            }
        }

        assert_eq!(cpu.regs.bc.0, 0);
        assert_eq!(cpu.memory.read_byte(0x0200), 0xAA);
        assert_eq!(cpu.memory.read_byte(0x0201), 0xBB);
        assert_eq!(cpu.memory.read_byte(0x0202), 0xCC);
        assert_eq!(total_cycles, 21 + 21 + 16);
    }

    #[test]
    fn ei_delays_interrupt_acceptance_by_one_instruction() {
        // EI ; NOP ; NOP, with an interrupt requested right after EI.
        let mut cpu = cpu_with_program(&[0xFB, 0x00, 0x00]);
        cpu.step_instruction().unwrap(); // EI
        cpu.request_interrupt();

        // The instruction immediately after EI must NOT take the interrupt.
        cpu.step_instruction().unwrap();
        assert_eq!(cpu.regs.pc, 0x0002);

        // The one after that may.
        let before_pc = cpu.regs.pc;
        cpu.step_instruction().unwrap();
        assert_ne!(cpu.regs.pc, before_pc.wrapping_add(1));
    }

    #[test]
    fn halt_then_interrupt_resumes_past_halt() {
        // HALT at 0x0000.
        let mut cpu = cpu_with_program(&[0x76]);
        cpu.iff1 = true;
        cpu.iff2 = true;
        cpu.accepting_interrupts = true;
        cpu.iff1_prev = true;
        cpu.interrupt_mode = InterruptMode::Mode1;
        cpu.regs.sp = 0xFFF0;

        cpu.step_instruction().unwrap();
        assert!(cpu.halted);

        cpu.request_interrupt();
        cpu.step_instruction().unwrap();
        assert!(!cpu.halted);
        assert_eq!(cpu.regs.pc, 0x0038);
        assert_eq!(cpu.memory.read_word(cpu.regs.sp), 0x0001);
    }
}
