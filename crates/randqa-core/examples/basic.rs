//! Basic bit acquisition example.
//!
//! Builds every registered source, pulls a few hundred bits from each and
//! prints them packed LSB-first as hex.
//!
//! Run: `cargo run --example basic`

use randqa_core::{SourceKind, bits_from_source};

fn main() {
    for kind in SourceKind::ALL {
        let mut src = kind.build(42);
        let acquired = bits_from_source(src.as_mut(), 256);

        print!("{:<9} ", kind.name());
        for b in acquired.bits.to_bytes_lsb_first() {
            print!("{b:02x}");
        }
        println!();
        println!(
            "          ones={} zeros={} ({})",
            acquired.bits.count_ones(),
            acquired.bits.count_zeros(),
            kind.description()
        );
    }
}
