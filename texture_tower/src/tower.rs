use cggeom::{box2, prelude::*, Box2};
use log::{debug, trace, warn};

use super::{
    config::TowerConfig,
    dirty,
    lod::{paint_level, PaintTransform},
    port::{Bitmap, PortError, RasterPort},
};

/// A pyramid of progressively half-resolution copies of a base image, used to
/// emulate mipmapping for surfaces painted at a reduced scale.
///
/// Level 0 is the base image itself, which is shared with (and only ever
/// modified by) the owner of the surface. The other levels are created lazily
/// by [`get_best_image`](TextureTower::get_best_image) and only the parts
/// invalidated by [`mark_region_dirty`](TextureTower::mark_region_dirty) are
/// regenerated.
///
/// `TextureTower` isn't designed for concurrent access. All methods are meant
/// to be called from the paint thread.
#[derive(Debug)]
pub struct TextureTower<P: RasterPort> {
    config: TowerConfig,
    /// Empty iff no base image is set.
    levels: Vec<Level<P>>,
}

#[derive(Debug)]
struct Level<P: RasterPort> {
    size: [u32; 2],
    /// The base image for level 0. Lazily created for other levels.
    image: Option<P::Bitmap>,
    /// Always `None` for level 0.
    target: Option<P::Target>,
    /// The stale region of `image`. Unused for level 0.
    dirty: Box2<u32>,
}

impl<P: RasterPort> Level<P> {
    fn new(size: [u32; 2]) -> Self {
        Self {
            size,
            image: None,
            target: None,
            dirty: Box2::zero(),
        }
    }
}

impl<P: RasterPort> Default for TextureTower<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: RasterPort> TextureTower<P> {
    /// Construct an empty `TextureTower`. The base image has to be set with
    /// [`set_base_image`](TextureTower::set_base_image) before use.
    pub fn new() -> Self {
        Self::with_config(TowerConfig::default())
    }

    pub fn with_config(config: TowerConfig) -> Self {
        Self {
            config: config.with_max_levels(config.max_levels),
            levels: Vec::new(),
        }
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    /// Get the current base image.
    pub fn base_image(&self) -> Option<&P::Bitmap> {
        self.levels.first().and_then(|level| level.image.as_ref())
    }

    /// Get the number of levels, including the base level. Returns `0` if no
    /// base image is set.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Get the size of the specified level.
    pub fn level_size(&self, level: usize) -> Option<[u32; 2]> {
        self.levels.get(level).map(|level| level.size)
    }

    /// Get the image of the specified level if it has been created. The image
    /// might be stale.
    pub fn level_image(&self, level: usize) -> Option<&P::Bitmap> {
        self.levels.get(level).and_then(|level| level.image.as_ref())
    }

    /// Get the region of the specified level that will be regenerated when
    /// it's requested next time. Returns `None` for the base level (whose
    /// staleness is tracked by its owner) and non-existent levels.
    pub fn dirty_rect(&self, level: usize) -> Option<Box2<u32>> {
        if level == 0 {
            None
        } else {
            self.levels.get(level).map(|level| level.dirty)
        }
    }

    /// Set the image used as level 0. The image is referenced until it's
    /// replaced or the tower is dropped.
    ///
    /// All derived levels are discarded unless `image` is the current base
    /// image.
    pub fn set_base_image(&mut self, image: Option<P::Bitmap>) {
        match (self.base_image(), &image) {
            (Some(current), Some(new)) if current.ptr_eq(new) => return,
            (None, None) => return,
            _ => {}
        }

        // Release the derived levels and the old base image
        self.levels.clear();

        let image = if let Some(image) = image {
            image
        } else {
            debug!("Base image unset");
            return;
        };

        let size = image.size();
        let count = dirty::level_count(size, self.config.max_levels);
        debug!("New base image of size {:?}, {} level(s)", size, count);

        self.levels.extend(dirty::level_sizes(size, count).map(Level::new));
        self.levels[0].image = Some(image);

        self.mark_region_dirty(0, 0, size[0], size[1]);
    }

    /// Mark a region of the base image as having changed. The next time a
    /// scaled-down version of the base image is retrieved, the corresponding
    /// area of it will be regenerated.
    pub fn mark_region_dirty(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let base_size = match self.levels.first() {
            Some(level) => level.size,
            None => return,
        };

        let bx = box2! {
            min: [x, y],
            max: [x.saturating_add(width), y.saturating_add(height)]
        };
        let mut bx = match bx.intersection(&dirty::full_rect(base_size)) {
            Some(bx) => bx,
            None => return,
        };

        for level in self.levels[1..].iter_mut() {
            bx = dirty::downsample(bx, level.size);
            if bx.is_empty() {
                // The damage lies in the part of the parent level that
                // coarser levels don't sample from
                break;
            }
            dirty::accumulate(&mut level.dirty, bx);
        }
    }

    /// Get the image that best matches the scale at which the surface is
    /// painted by `xform`, creating and regenerating levels as needed.
    ///
    /// Returns `None` if no base image is set or `xform` is degenerate (the
    /// surface is scaled to nothing, so there's nothing to paint).
    ///
    /// If `port` fails to provide a level, the finest level below it is
    /// returned instead. The failed level is retried on the next call.
    pub fn get_best_image(&mut self, port: &mut P, xform: &PaintTransform) -> Option<&P::Bitmap> {
        let base_size = self.levels.first()?.size;

        let level = paint_level(xform, base_size, self.config.lod_bias)?;
        let level = level.min(self.levels.len() - 1);

        let level = self.realize_levels(port, level);
        self.levels[level].image.as_ref()
    }

    /// Make sure the levels `1..=level` are allocated and up-to-date. Returns
    /// the highest level that could be made so.
    fn realize_levels(&mut self, port: &mut P, level: usize) -> usize {
        // Allocate all levels first. Regenerating a level requires its parent
        // level to exist.
        let mut top = 0;
        for (i, lvl) in self.levels.iter_mut().enumerate().take(level + 1).skip(1) {
            if lvl.image.is_none() || lvl.target.is_none() {
                if let Err(e) = Self::allocate_level(port, lvl) {
                    warn!("Could not allocate level {} ({:?}): {}", i, lvl.size, e);
                    break;
                }
            }
            top = i;
        }

        for i in 1..=top {
            self.regenerate_level(port, i);
        }

        top
    }

    fn allocate_level(port: &mut P, level: &mut Level<P>) -> Result<(), PortError> {
        // Don't keep an image without a target; both are retried together
        level.target = None;
        level.image = None;

        let image = port.new_image(level.size)?;
        let target = port.new_target(&image)?;

        level.image = Some(image);
        level.target = Some(target);

        // A brand new image has undefined contents
        level.dirty = dirty::full_rect(level.size);

        Ok(())
    }

    fn regenerate_level(&mut self, port: &mut P, i: usize) {
        let (parents, rest) = self.levels.split_at_mut(i);
        let parent = &parents[i - 1];
        let level = &mut rest[0];

        if level.dirty.is_empty() {
            return;
        }

        let (source, target) = match (&parent.image, &mut level.target) {
            (Some(source), Some(target)) => (source, target),
            _ => return,
        };

        let src = dirty::source_rect(level.dirty, parent.size);
        trace!("Regenerating {:?} of level {} from {:?}", level.dirty, i, src);

        port.draw_filtered_rect(target, source, level.dirty, src);

        level.dirty = Box2::zero();
    }
}
