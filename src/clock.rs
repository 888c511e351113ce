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

//! The frame loop of `spec.md` §4.5/C9, with real-time pacing pulled out
//! behind a `Clock` trait (`spec.md` §9: "make pacing pluggable"). The
//! default `RealTimeClock` sleeps with `std::thread::sleep`, the way the
//! teacher's `emulator::run` frame loop does with `std::time`/`thread::sleep`;
//! a `NullClock` lets tests and fast-forward embedders skip the sleep
//! entirely.

use std::thread;
use std::time::{Duration, Instant};

use crate::cpu::CPU;
use crate::error::CpuFault;

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Paces execution against the wall clock, the default for `CPU::step`.
pub struct RealTimeClock;

impl Clock for RealTimeClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Never sleeps; `now()` still reports real elapsed time so overshoot
/// accounting in callers keeps working, it just never waits for the
/// refresh-rate budget. Used by headless/fast-mode embedders and by this
/// crate's own tests.
pub struct NullClock;

impl Clock for NullClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep(&self, _duration: Duration) {}
}

/// Run one frame: execute instructions until the accumulated cycle count
/// reaches `cpu_frequency / refresh_rate`, then sleep out the rest of
/// `1 / refresh_rate` seconds of wall-clock time. If the loop already ran
/// long, no sleep happens (`spec.md` §4.5).
pub fn run_frame<C: Clock>(cpu: &mut CPU, clock: &C) -> Result<u32, CpuFault> {
    let budget = cpu.config.cycles_per_frame();
    let frame_duration = Duration::from_secs_f64(1.0 / cpu.config.refresh_rate_hz as f64);

    let frame_start = clock.now();
    let mut executed: u32 = 0;

    while executed < budget {
        let outcome = super::step_instruction(cpu)?;
        executed = executed.saturating_add(outcome.cycles);
    }

    let elapsed = clock.now().duration_since(frame_start);
    if elapsed < frame_duration {
        clock.sleep(frame_duration - elapsed);
    }

    Ok(executed)
}
