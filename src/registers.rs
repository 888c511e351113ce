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

//! The register file. Every pair is stored as a single `u16`; the 8-bit
//! halves are computed with shift/mask accessors rather than a union, so
//! there's no aliasing or host-endianness to worry about.

pub const FLAG_CARRY:   u8 = 0b0000_0001;
pub const FLAG_ADDSUB:  u8 = 0b0000_0010;
pub const FLAG_PV:      u8 = 0b0000_0100;
pub const FLAG_F3:      u8 = 0b0000_1000;
pub const FLAG_HALF:    u8 = 0b0001_0000;
pub const FLAG_F5:      u8 = 0b0010_0000;
pub const FLAG_ZERO:    u8 = 0b0100_0000;
pub const FLAG_SIGN:    u8 = 0b1000_0000;

/// The F register, bit-addressable per `spec.md` §3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub carry:   bool,
    pub add_sub: bool,
    pub pv:      bool,
    pub f3:      bool,
    pub half:    bool,
    pub f5:      bool,
    pub zero:    bool,
    pub sign:    bool,
}

impl Flags {
    pub fn to_byte(self) -> u8 {
        (if self.carry   { FLAG_CARRY }  else { 0 }) |
        (if self.add_sub { FLAG_ADDSUB } else { 0 }) |
        (if self.pv      { FLAG_PV }     else { 0 }) |
        (if self.f3      { FLAG_F3 }     else { 0 }) |
        (if self.half    { FLAG_HALF }   else { 0 }) |
        (if self.f5      { FLAG_F5 }     else { 0 }) |
        (if self.zero    { FLAG_ZERO }   else { 0 }) |
        (if self.sign    { FLAG_SIGN }   else { 0 })
    }

    pub fn from_byte(byte: u8) -> Flags {
        Flags {
            carry:   byte & FLAG_CARRY  != 0,
            add_sub: byte & FLAG_ADDSUB != 0,
            pv:      byte & FLAG_PV     != 0,
            f3:      byte & FLAG_F3     != 0,
            half:    byte & FLAG_HALF   != 0,
            f5:      byte & FLAG_F5     != 0,
            zero:    byte & FLAG_ZERO   != 0,
            sign:    byte & FLAG_SIGN   != 0,
        }
    }

    /// Copy F3/F5 from the low byte of a result, as most flag-setting ops do.
    pub fn copy_undoc(&mut self, result: u8) {
        self.f3 = result & FLAG_F3 != 0;
        self.f5 = result & FLAG_F5 != 0;
    }
}

/// A 16-bit register pair with byte-addressable halves. No storage
/// aliasing: `hi`/`lo` are computed from the single `u16` on every access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegPair(pub u16);

impl RegPair {
    pub fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }
    pub fn lo(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
    pub fn set_hi(&mut self, v: u8) {
        self.0 = (self.0 & 0x00FF) | ((v as u16) << 8);
    }
    pub fn set_lo(&mut self, v: u8) {
        self.0 = (self.0 & 0xFF00) | (v as u16);
    }
}

/// The register index encoding shared by the primary, CB and DD tables:
/// 0=B 1=C 2=D 3=E 4=H 5=L 6=(HL)/(IX+d) 7=A.
pub const REG_B: u8 = 0;
pub const REG_C: u8 = 1;
pub const REG_D: u8 = 2;
pub const REG_E: u8 = 3;
pub const REG_H: u8 = 4;
pub const REG_L: u8 = 5;
pub const REG_MEM_HL: u8 = 6;
pub const REG_A: u8 = 7;

#[derive(Debug, Default)]
pub struct Registers {
    pub pc: u16,
    pub sp: u16,
    pub ix: u16,
    pub iy: u16,
    pub i:  u8,
    pub r:  u8,

    pub a:  u8,
    pub f:  Flags,
    pub bc: RegPair,
    pub de: RegPair,
    pub hl: RegPair,

    pub a_prime: u8,
    pub f_prime: Flags,
    pub bc_prime: RegPair,
    pub de_prime: RegPair,
    pub hl_prime: RegPair,
}

impl Registers {
    pub fn new() -> Registers {
        Registers::default()
    }

    pub fn af(&self) -> u16 {
        ((self.a as u16) << 8) | (self.f.to_byte() as u16)
    }
    pub fn set_af(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.f = Flags::from_byte((val & 0xFF) as u8);
    }

    /// Read an 8-bit GP register by the shared index encoding, except
    /// `REG_MEM_HL`, which the decoder must special-case (it needs bus
    /// access, which this accessor has none of).
    pub fn reg8(&self, index: u8) -> u8 {
        match index {
            REG_B => self.bc.hi(),
            REG_C => self.bc.lo(),
            REG_D => self.de.hi(),
            REG_E => self.de.lo(),
            REG_H => self.hl.hi(),
            REG_L => self.hl.lo(),
            REG_A => self.a,
            _ => unreachable!("reg8({}) is not a plain register", index),
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            REG_B => self.bc.set_hi(val),
            REG_C => self.bc.set_lo(val),
            REG_D => self.de.set_hi(val),
            REG_E => self.de.set_lo(val),
            REG_H => self.hl.set_hi(val),
            REG_L => self.hl.set_lo(val),
            REG_A => self.a = val,
            _ => unreachable!("set_reg8({}) is not a plain register", index),
        }
    }

    pub fn swap_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_prime);
        std::mem::swap(&mut self.f, &mut self.f_prime);
    }
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.bc, &mut self.bc_prime);
        std::mem::swap(&mut self.de, &mut self.de_prime);
        std::mem::swap(&mut self.hl, &mut self.hl_prime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regpair_halves_match_storage() {
        let mut rp = RegPair(0);
        rp.set_hi(0x12);
        rp.set_lo(0x34);
        assert_eq!(rp.0, 0x1234);
        assert_eq!(rp.hi(), 0x12);
        assert_eq!(rp.lo(), 0x34);
    }

    #[test]
    fn flags_roundtrip_through_byte() {
        let f = Flags { carry: true, add_sub: false, pv: true, f3: false, half: true, f5: true, zero: false, sign: true };
        assert_eq!(Flags::from_byte(f.to_byte()), f);
    }

    #[test]
    fn af_pair_is_a_and_f_combined() {
        let mut regs = Registers::new();
        regs.a = 0x80;
        regs.f = Flags::from_byte(0x45);
        assert_eq!(regs.af(), 0x8045);
    }

    #[test]
    fn exx_and_ex_af_af_prime_are_self_inverse() {
        let mut regs = Registers::new();
        regs.bc = RegPair(0x1122);
        regs.de = RegPair(0x3344);
        regs.hl = RegPair(0x5566);
        regs.a = 0x77;

        let (bc0, de0, hl0, a0) = (regs.bc, regs.de, regs.hl, regs.a);
        regs.exx();
        regs.exx();
        assert_eq!((regs.bc, regs.de, regs.hl), (bc0, de0, hl0));

        regs.swap_af();
        regs.swap_af();
        assert_eq!(regs.a, a0);
    }
}
