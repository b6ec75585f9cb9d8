//! Deterministic test corpus provisioning.
//!
//! Record files and access patterns are generated from a ChaCha stream seeded with
//! a fixed value, so every run of a benchmark or test sees the same bytes and the
//! same index sequence.

use crate::error::{RecfileError, Result};
use crate::record_file::RecordGeometry;
use log::debug;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Seed used for the standard corpus
pub const DEFAULT_CORPUS_SEED: u64 = 12345;

/// Seed used for standard access patterns
pub const DEFAULT_INDEX_SEED: u64 = 42;

/// Create (or truncate) `path` and fill it with `record_count` pseudo-random records
///
/// The same `geometry` and `seed` always produce a byte-identical file.
pub fn generate_corpus(path: &Path, geometry: &RecordGeometry, seed: u64) -> Result<()> {
    let file = File::create(path).map_err(|e| RecfileError::open_failure(path, e))?;
    let mut writer = BufWriter::with_capacity(1 << 20, file);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut record = vec![0u8; geometry.record_size()];

    debug!(
        "generating {} records of {} bytes into {}",
        geometry.record_count(),
        geometry.record_size(),
        path.display()
    );

    for _ in 0..geometry.record_count() {
        rng.fill_bytes(&mut record);
        writer
            .write_all(&record)
            .map_err(|e| RecfileError::io(format!("Failed to write {}", path.display()), e))?;
    }

    writer
        .flush()
        .map_err(|e| RecfileError::io(format!("Failed to flush {}", path.display()), e))?;

    Ok(())
}

/// `count` deterministic record indices drawn uniformly from `[0, record_count)`
pub fn random_indices(seed: u64, count: usize, geometry: &RecordGeometry) -> Vec<u64> {
    if geometry.record_count() == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| rng.gen_range(0..geometry.record_count()))
        .collect()
}

/// A record-sized payload drawn from `rng`
pub fn random_payload<R: RngCore>(rng: &mut R, geometry: &RecordGeometry) -> Vec<u8> {
    let mut payload = vec![0u8; geometry.record_size()];
    rng.fill_bytes(&mut payload);
    payload
}
