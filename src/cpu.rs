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

//! The CPU state (C1) and the operand-fetch helpers (C4) that mediate every
//! memory and port access the decoders make.

use log::info;

use crate::bus::{Memory, Pins, Ports, PIN_HALT};
use crate::error::LoadError;
use crate::registers::Registers;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    Mode0,
    Mode1,
    Mode2,
}

/// Tunable pacing parameters (`spec.md` §6). Defaults match the datasheet
/// numbers the spec names: 4.8 MHz, 60 Hz refresh.
#[derive(Debug, Clone, Copy)]
pub struct CpuConfig {
    pub cpu_frequency_hz: u32,
    pub refresh_rate_hz: u32,
}

impl Default for CpuConfig {
    fn default() -> CpuConfig {
        CpuConfig { cpu_frequency_hz: 4_800_000, refresh_rate_hz: 60 }
    }
}

impl CpuConfig {
    pub fn cycles_per_frame(&self) -> u32 {
        self.cpu_frequency_hz / self.refresh_rate_hz
    }
}

/// What a single `step_instruction` call did, surfaced for embedders that
/// want to react to `HALT` exit or a `RETI` boundary signal (`spec.md` §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub cycles: u32,
    pub reti: bool,
}

pub struct CPU {
    pub regs: Registers,
    pub memory: Memory,
    pub ports: Ports,
    pub pins: Pins,

    pub iff1: bool,
    pub iff2: bool,
    pub interrupt_mode: InterruptMode,
    pub halted: bool,

    /// True once the one-instruction EI delay has elapsed and maskable
    /// interrupts are actually being accepted (`spec.md` §4.4, §9 open
    /// question 4). Updated from `iff1_prev`, not `iff1` directly, so the
    /// instruction immediately after `EI` always runs uninterrupted.
    pub(crate) accepting_interrupts: bool,
    /// `IFF1` as it stood before the instruction just dispatched; `tick_ei_delay`
    /// folds this into `accepting_interrupts` one step late.
    pub(crate) iff1_prev: bool,
    pub(crate) interrupt_pending: bool,
    pub(crate) nmi_pending: bool,

    /// Low byte of the mode-2 interrupt vector address (`I:low-byte`); the
    /// host sets this from the byte the interrupting peripheral places on
    /// the data bus during the `IORQ`/`M1` cycle, the way the teacher's
    /// `Memory::mode2_int_vec` field is driven from its daisy-chain stub.
    /// Defaults to `0xFF`, the bus-idle (pulled-high) value.
    pub mode2_vector_low: u8,

    pub config: CpuConfig,
    pub cycle_accumulator: u64,
}

impl CPU {
    pub fn new() -> CPU {
        CPU::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> CPU {
        info!("Created an emulated Z80 CPU ({} Hz, {} Hz refresh).", config.cpu_frequency_hz, config.refresh_rate_hz);
        CPU {
            regs: Registers::new(),
            memory: Memory::new(),
            ports: Ports::new(),
            pins: Pins::new(),

            iff1: false,
            iff2: false,
            interrupt_mode: InterruptMode::Mode0,
            halted: false,

            accepting_interrupts: false,
            iff1_prev: false,
            interrupt_pending: false,
            nmi_pending: false,

            mode2_vector_low: 0xFF,

            config,
            cycle_accumulator: 0,
        }
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        self.memory.load(path)
    }

    /// Request a maskable interrupt; serviced the next time `step_instruction`
    /// (or `step`) runs, provided `IFF1` is set and the EI delay has elapsed.
    pub fn request_interrupt(&mut self) {
        self.interrupt_pending = true;
    }

    /// Request a non-maskable interrupt (`SPEC_FULL.md` §C); always serviced
    /// on the next instruction boundary regardless of `IFF1`.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    // ---- Operand fetch (C4): all PC-relative reads advance nothing by
    // themselves -- the decoder owns PC and advances it once, after side
    // effects, per `spec.md` §4.3's "PC advance rule".

    #[inline]
    pub fn fetch_byte_at(&self, addr: u16) -> u8 {
        self.memory.read_byte(addr)
    }
    #[inline]
    pub fn fetch_word_at(&self, addr: u16) -> u16 {
        self.memory.read_word(addr)
    }
    #[inline]
    pub fn read_mem(&self, addr: u16) -> u8 {
        self.memory.read_byte(addr)
    }
    #[inline]
    pub fn write_mem(&mut self, addr: u16, val: u8) {
        self.memory.write_byte(addr, val);
    }

    pub fn push16(&mut self, val: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.memory.write_word(self.regs.sp, val);
    }
    pub fn pop16(&mut self) -> u16 {
        let val = self.memory.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        val
    }

    pub fn port_in(&mut self, port: u8) -> u8 {
        self.ports.read(port)
    }
    pub fn port_out(&mut self, port: u8, val: u8) {
        self.ports.write(port, val);
    }

    pub(crate) fn set_halt_pin(&mut self, val: bool) {
        self.pins.set(PIN_HALT, val);
    }
    pub(crate) fn halt_pin(&self) -> bool {
        self.pins.get(PIN_HALT)
    }
}

impl Default for CPU {
    fn default() -> CPU {
        CPU::new()
    }
}
