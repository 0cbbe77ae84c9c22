//! Bit source implementations.
//!
//! The seeded generators are deterministic state machines; `OsRandom` wraps the
//! operating system CSPRNG; `PayloadSource` replays a finite byte payload.
//! Each value owns its own state, so several sources can be analysed side by
//! side without interfering.

pub mod lcg;
pub mod os_random;
pub mod payload;
pub mod xorshift;

pub use lcg::Lcg;
pub use os_random::OsRandom;
pub use payload::PayloadSource;
pub use xorshift::XorShift32;
