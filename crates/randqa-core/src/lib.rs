//! # randqa-core
//!
//! Input side of the randqa randomness screening toolkit.
//!
//! `randqa-core` turns bit producers into the immutable [`BitSequence`] that the
//! statistical engine (`randqa-tests`) consumes, and defines the parameters of
//! a run.
//!
//! ## Quick Start
//!
//! ```
//! use randqa_core::{SourceKind, bits_from_source};
//!
//! let mut src = SourceKind::Xorshift.build(42);
//! let acquired = bits_from_source(src.as_mut(), 10_000);
//! assert_eq!(acquired.bits.len(), 10_000);
//! assert!(!acquired.is_short());
//! ```
//!
//! ## Architecture
//!
//! Source → `next_bytes` / `next_bit` → LSB-first unpack → [`BitSequence`]
//!
//! Every generator implements the [`BitSource`] trait and owns its own state.
//! Byte payloads (files, hex strings) go through [`bits_from_bytes`] or a
//! [`PayloadSource`]. Short reads are reported through [`Acquisition`], never
//! as errors.

pub mod bits;
pub mod config;
pub mod error;
pub mod source;
pub mod sources;

pub use bits::{
    Acquisition, BitSequence, bits_from_bytes, bits_from_source, pack_lsb_first, parse_hex,
};
pub use config::{
    DEFAULT_ALPHA, DEFAULT_APT_WINDOW, DEFAULT_BLOCK_SIZE, DEFAULT_ML_K, DEFAULT_RCT_CUTOFF,
    DEFAULT_TRAIN_FRACTION, MAX_ML_K, PARAMETER_HELP, RunConfig,
};
pub use error::{ParamError, RandqaError};
pub use source::{BitSource, SourceKind};
pub use sources::{Lcg, OsRandom, PayloadSource, XorShift32};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
