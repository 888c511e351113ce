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

use std::fmt;
use std::io;

/// Failure modes of `Cpu::load`. The core never panics on a load failure;
/// it reports one of these and leaves the CPU state untouched (`spec.md` §7).
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    TooLarge { size: usize, max: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "failed to read ROM image: {}", err),
            LoadError::TooLarge { size, max } => {
                write!(f, "ROM image is {} bytes, but the address space only has room for {}", size, max)
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> LoadError {
        LoadError::Io(err)
    }
}

/// The two fatal conditions of `spec.md` §7. In the original C++ these
/// terminate the process; as a library we hand control back to the caller
/// instead via `Err`, which is the only form of "terminate" a library can
/// honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuFault {
    /// PC walked past the end of the mapped ROM before RAM was mapped in
    /// over it. `pc` is where execution stopped.
    PcOverflow { pc: u16 },
    /// Reached a primary opcode slot with no decoded instruction. This is a
    /// debug net: the primary table is total over all 256 byte values, so
    /// this should be unreachable in a correct build.
    UnrecognizedOpcode { pc: u16, opcode: u8 },
}

impl fmt::Display for CpuFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CpuFault::PcOverflow { pc } => write!(f, "PC overflowed at 0x{:04X}", pc),
            CpuFault::UnrecognizedOpcode { pc, opcode } => {
                write!(f, "unrecognized primary opcode 0x{:02X} at 0x{:04X}", opcode, pc)
            }
        }
    }
}

impl std::error::Error for CpuFault {}
