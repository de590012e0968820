//! Spectrum chunking.
//!
//! A spectrum is split into `n` contiguous chunks by repeatedly taking
//! `ceil(remaining_len / remaining_chunks)` bins off the front, so chunk
//! sizes shrink toward the high end. Each chunk reduces to its peak bin.

/// Half-open `(start, end)` bounds of `n` chunks over a `len`-element
/// sequence. `n` must be at least 1; `len` may be 0, in which case every
/// chunk is empty.
pub fn chunk_bounds(len: usize, n: usize) -> Vec<(usize, usize)> {
    debug_assert!(n >= 1, "chunk count must be at least 1");
    let mut bounds = Vec::with_capacity(n);
    let mut start = 0usize;
    for remaining in (1..=n).rev() {
        let take = (len - start).div_ceil(remaining);
        bounds.push((start, start + take));
        start += take;
    }
    bounds
}

/// Peak magnitude per chunk, low-frequency chunk first. Always exactly `n`
/// values; an empty chunk reports 0.0.
pub fn chunk_peaks(spectrum: &[f32], n: usize) -> Vec<f32> {
    chunk_bounds(spectrum.len(), n)
        .into_iter()
        .map(|(start, end)| peak(&spectrum[start..end]))
        .collect()
}

fn peak(chunk: &[f32]) -> f32 {
    chunk.iter().copied().fold(0.0f32, f32::max)
}
