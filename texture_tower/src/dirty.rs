//! Damage arithmetic for the pyramid levels.
//!
//! Each derived level tracks a single bounding box of its stale pixels. This
//! over-approximates the damage when unrelated regions are updated, but keeps
//! the bookkeeping and the number of draw calls per level constant.
use cggeom::{box2, prelude::*, Box2};

/// Compute the number of levels (including the base level) for a base image
/// of the specified size.
///
/// This is `1 + floor(log2(max(width, height)))`, limited by `max_levels`.
/// A zero-sized image still has a base level.
pub fn level_count(size: [u32; 2], max_levels: usize) -> usize {
    let longest = size[0].max(size[1]);
    // `floor(log2(x)) + 1` is the bit length of `x`
    let count = (32 - longest.leading_zeros()) as usize;
    count.max(1).min(max_levels.max(1))
}

/// Iterate over the sizes of the first `count` levels, starting from the base
/// level of size `size`.
///
/// Each dimension is halved and rounded down, but never goes below `1`. This
/// matches the convention for non-power-of-two textures.
pub fn level_sizes(size: [u32; 2], count: usize) -> impl Iterator<Item = [u32; 2]> {
    std::iter::successors(Some(size), |&[w, h]| Some([(w / 2).max(1), (h / 2).max(1)])).take(count)
}

/// Get a box covering the whole image of the specified size.
pub fn full_rect(size: [u32; 2]) -> Box2<u32> {
    box2! { min: [0, 0], max: [size[0], size[1]] }
}

/// Project a damaged region of a level onto the next level, whose size is
/// `level_size`.
///
/// The result covers every pixel of the next level whose 2×2 source block
/// intersects `bx`.
pub fn downsample(bx: Box2<u32>, level_size: [u32; 2]) -> Box2<u32> {
    box2! {
        min: [bx.min.x / 2, bx.min.y / 2],
        max: [
            // `ceil(max / 2)` without overflowing
            (bx.max.x / 2 + bx.max.x % 2).min(level_size[0]),
            (bx.max.y / 2 + bx.max.y % 2).min(level_size[1])
        ]
    }
}

/// Add `bx` to the damage accumulated in `dirty`.
///
/// The result is the bounding box of both. An empty `bx` leaves `dirty`
/// unchanged, and an empty `dirty` is simply replaced.
pub fn accumulate(dirty: &mut Box2<u32>, bx: Box2<u32>) {
    *dirty = dirty.union_nonempty(&bx);
}

/// Get the region of the parent level to sample from when regenerating the
/// pixels in `dirty`. The result is normalized by `parent_size`.
pub fn source_rect(dirty: Box2<u32>, parent_size: [u32; 2]) -> Box2<f32> {
    let [pw, ph] = [parent_size[0] as u64, parent_size[1] as u64];
    let clip = |x: u32, limit: u64| (x as u64 * 2).min(limit) as f32;
    let (pw_f, ph_f) = (pw as f32, ph as f32);
    box2! {
        min: [clip(dirty.min.x, pw) / pw_f, clip(dirty.min.y, ph) / ph_f],
        max: [clip(dirty.max.x, pw) / pw_f, clip(dirty.max.y, ph) / ph_f]
    }
}
