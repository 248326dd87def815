// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Posts come off disk grouped by location, so they are shuffled
// before the cut; otherwise validation would only ever see the
// last few locations.
//
//   [ s0 s1 s2 ... sN ]  ── seeded shuffle ──▶  [ train | val ]
//                                               ^ round(N · rate)
//
// The shuffle is seeded: a resumed run rebuilds exactly the
// validation set that produced the checkpoint's best loss.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and cut them into
/// (train, validation) at `train_fraction`.
///
/// Fractions outside [0, 1] are clamped, NaN counts as 0.
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    samples.shuffle(&mut StdRng::seed_from_u64(seed));

    let total    = samples.len();
    let fraction = if train_fraction.is_nan() { 0.0 } else { train_fraction.clamp(0.0, 1.0) };
    let cut      = ((total as f64) * fraction).round() as usize;

    let val = samples.split_off(cut.min(total));

    tracing::debug!(
        "Dataset split (seed {}): {} training, {} validation",
        seed,
        samples.len(),
        val.len(),
    );

    (samples, val)
}
