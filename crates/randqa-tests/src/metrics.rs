//! Supporting quality metrics: empirical entropy and compressibility.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use randqa_core::BitSequence;

/// Advisory pass threshold for empirical entropy (bits per bit).
pub const ENTROPY_PASS_THRESHOLD: f64 = 0.98;
/// Advisory pass threshold for the compression ratio.
pub const COMPRESSION_PASS_THRESHOLD: f64 = 0.95;

/// Shannon entropy of the 0/1 distribution, in bits per bit.
///
/// Zero-probability terms contribute 0. An empty sequence has entropy 0.
pub fn shannon_entropy_bits_per_bit(bits: &BitSequence) -> f64 {
    let n = bits.len();
    if n == 0 {
        return 0.0;
    }
    let p1 = bits.count_ones() as f64 / n as f64;
    [1.0 - p1, p1]
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// zlib (maximum level) compressed size over raw size for a byte buffer.
/// Returns 0.0 for empty input.
pub fn compression_ratio_bytes(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    match zlib_compress(data) {
        Ok(compressed) => compressed.len() as f64 / data.len() as f64,
        Err(e) => {
            log::error!("zlib compression of {} bytes failed: {e}", data.len());
            0.0
        }
    }
}

fn zlib_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Compression ratio of the sequence packed LSB-first (tail zero-padded).
pub fn compression_ratio(bits: &BitSequence) -> f64 {
    compression_ratio_bytes(&bits.to_bytes_lsb_first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use randqa_core::{SourceKind, bits_from_source};

    #[test]
    fn zlib_stream_decodes_to_input() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
        let compressed = zlib_compress(&data).unwrap();
        let mut restored = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut restored)
            .unwrap();
        assert_eq!(restored, data);
        assert_eq!(
            compression_ratio_bytes(&data),
            compressed.len() as f64 / data.len() as f64
        );
    }

    #[test]
    fn entropy_edge_cases() {
        assert_eq!(shannon_entropy_bits_per_bit(&BitSequence::zeros(0)), 0.0);
        assert_eq!(shannon_entropy_bits_per_bit(&BitSequence::zeros(1000)), 0.0);
        assert_eq!(shannon_entropy_bits_per_bit(&BitSequence::ones(1000)), 0.0);
        assert!((shannon_entropy_bits_per_bit(&BitSequence::alternating(1000)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_biased_sequence() {
        // p1 = 0.25 -> H = 0.811278...
        let bits = BitSequence::from_bools((0..4000).map(|i| i % 4 == 0));
        let h = shannon_entropy_bits_per_bit(&bits);
        assert!((h - 0.811_278_124_459_132_8).abs() < 1e-9);
    }

    #[test]
    fn compression_empty_is_zero() {
        assert_eq!(compression_ratio(&BitSequence::zeros(0)), 0.0);
        assert_eq!(compression_ratio_bytes(&[]), 0.0);
    }

    #[test]
    fn compression_detects_structure() {
        assert!(compression_ratio(&BitSequence::zeros(100_000)) < 0.05);
        assert!(compression_ratio(&BitSequence::alternating(100_000)) < 0.05);
    }

    #[test]
    fn compression_random_near_one() {
        let mut src = SourceKind::OsRandom.build(0);
        let bits = bits_from_source(src.as_mut(), 80_000).bits;
        assert!(compression_ratio(&bits) >= COMPRESSION_PASS_THRESHOLD);
    }
}
