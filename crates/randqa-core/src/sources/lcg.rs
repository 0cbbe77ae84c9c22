//! Linear congruential generator emitting one bit per state step.

use crate::source::BitSource;

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;

/// 32-bit LCG (`state = a * state + c mod 2^32`).
///
/// Each draw advances the state once and emits its least-significant bit.
/// The LSB of a power-of-two modulus LCG alternates, which makes this the
/// canonical "obviously broken" source for the test battery.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }
}

impl BitSource for Lcg {
    fn name(&self) -> &str {
        "lcg"
    }

    fn next_bit(&mut self) -> Option<u8> {
        Some((self.step() & 1) as u8)
    }
}
