//! Software implementation of [`RasterPort`].
//!
//! # Restrictions
//!
//!  - The maximum image size is 16384×16384.
//!  - The only supported pixel format is RGBA8888 (premultiplied or not; the
//!    filter doesn't care).
//!  - Images are not thread-safe. They must stay on the paint thread.
//!
use cggeom::{prelude::*, Box2};
use itertools::izip;
use log::warn;
use rayon::prelude::*;
use rgb::RGBA8;
use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use super::{
    dirty::full_rect,
    port::{Bitmap, PortError, RasterPort},
};

/// The maximum image size along each axis.
pub const MAX_SIZE: u32 = 16384;

/// A ref-counted RGBA8 image.
#[derive(Clone)]
pub struct SwBitmap {
    inner: Rc<BitmapInner>,
}

struct BitmapInner {
    size: [u32; 2],
    pixels: RefCell<Vec<RGBA8>>,
    /// The pool the pixels are accounted to. `None` if the image was created
    /// by [`SwBitmap::new`] rather than by `SwRast`.
    pool: Option<Rc<Pool>>,
}

#[derive(Debug)]
struct Pool {
    /// The number of pixels of the live images allocated from this pool.
    used: Cell<u64>,
    limit: Option<u64>,
}

impl Drop for BitmapInner {
    fn drop(&mut self) {
        if let Some(pool) = &self.pool {
            pool.used.set(pool.used.get() - area(self.size));
        }
    }
}

fn area(size: [u32; 2]) -> u64 {
    size[0] as u64 * size[1] as u64
}

impl SwBitmap {
    /// Construct a transparent black bitmap.
    pub fn new(size: [u32; 2]) -> Self {
        Self::with_pool(size, None)
    }

    /// Construct a bitmap with the specified contents.
    ///
    /// `pixels` is in row-major order and its length must be
    /// `size[0] * size[1]`.
    pub fn from_pixels(size: [u32; 2], pixels: Vec<RGBA8>) -> Self {
        assert_eq!(pixels.len() as u64, area(size), "pixel count mismatch");
        Self {
            inner: Rc::new(BitmapInner {
                size,
                pixels: RefCell::new(pixels),
                pool: None,
            }),
        }
    }

    fn with_pool(size: [u32; 2], pool: Option<Rc<Pool>>) -> Self {
        Self {
            inner: Rc::new(BitmapInner {
                size,
                pixels: RefCell::new(vec![RGBA8::new(0, 0, 0, 0); area(size) as usize]),
                pool,
            }),
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.inner.size
    }

    fn index(&self, x: u32, y: u32) -> usize {
        let [w, h] = self.inner.size;
        assert!(x < w && y < h, "({}, {}) is out of bounds", x, y);
        y as usize * w as usize + x as usize
    }

    /// Get the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> RGBA8 {
        self.inner.pixels.borrow()[self.index(x, y)]
    }

    pub fn set_pixel(&self, x: u32, y: u32, color: RGBA8) {
        let i = self.index(x, y);
        self.inner.pixels.borrow_mut()[i] = color;
    }

    /// Fill the part of `bx` inside the image with `color`.
    pub fn fill_rect(&self, bx: Box2<u32>, color: RGBA8) {
        let bx = match bx.intersection(&full_rect(self.inner.size)) {
            Some(bx) => bx,
            None => return,
        };
        let stride = self.inner.size[0] as usize;
        let mut pixels = self.inner.pixels.borrow_mut();
        for row in pixels
            .chunks_exact_mut(stride)
            .skip(bx.min.y as usize)
            .take((bx.max.y - bx.min.y) as usize)
        {
            for px in &mut row[bx.min.x as usize..bx.max.x as usize] {
                *px = color;
            }
        }
    }

    /// Copy the contents into a `Vec` in row-major order.
    pub fn to_vec(&self) -> Vec<RGBA8> {
        self.inner.pixels.borrow().clone()
    }
}

impl Bitmap for SwBitmap {
    fn size(&self) -> [u32; 2] {
        self.inner.size
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SwBitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SwBitmap")
            .field("ptr", &Rc::as_ptr(&self.inner))
            .field("size", &self.inner.size)
            .finish()
    }
}

/// A [`SwBitmap`] bound as a paint destination.
#[derive(Debug)]
pub struct SwTarget {
    bitmap: SwBitmap,
}

impl SwTarget {
    pub fn bitmap(&self) -> &SwBitmap {
        &self.bitmap
    }
}

/// Counters of the operations performed by a [`SwRast`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SwRastStats {
    pub images_created: usize,
    pub targets_bound: usize,
    pub draws: usize,
    pub pixels_written: u64,
}

/// The software raster port.
#[derive(Debug)]
pub struct SwRast {
    pool: Rc<Pool>,
    stats: SwRastStats,
}

impl Default for SwRast {
    fn default() -> Self {
        Self::new()
    }
}

impl SwRast {
    /// Construct a `SwRast` with no limit on the image memory.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Construct a `SwRast` that fails to allocate images once the total
    /// number of pixels of the live images it allocated would exceed `limit`.
    pub fn with_pixel_budget(limit: u64) -> Self {
        Self::with_limit(Some(limit))
    }

    fn with_limit(limit: Option<u64>) -> Self {
        Self {
            pool: Rc::new(Pool {
                used: Cell::new(0),
                limit,
            }),
            stats: SwRastStats::default(),
        }
    }

    pub fn stats(&self) -> SwRastStats {
        self.stats
    }

    /// Get the number of pixels of the live images allocated by `self`.
    pub fn pixels_in_use(&self) -> u64 {
        self.pool.used.get()
    }
}

impl RasterPort for SwRast {
    type Bitmap = SwBitmap;
    type Target = SwTarget;

    fn new_image(&mut self, size: [u32; 2]) -> Result<SwBitmap, PortError> {
        if size[0] > MAX_SIZE || size[1] > MAX_SIZE {
            return Err(PortError::TooLarge { size });
        }

        let used = self.pool.used.get() + area(size);
        if let Some(limit) = self.pool.limit {
            if used > limit {
                return Err(PortError::OutOfMemory { size });
            }
        }
        self.pool.used.set(used);

        self.stats.images_created += 1;
        Ok(SwBitmap::with_pool(size, Some(Rc::clone(&self.pool))))
    }

    fn new_target(&mut self, image: &SwBitmap) -> Result<SwTarget, PortError> {
        match &image.inner.pool {
            Some(pool) if Rc::ptr_eq(pool, &self.pool) => {}
            _ => return Err(PortError::TargetUnavailable),
        }

        self.stats.targets_bound += 1;
        Ok(SwTarget {
            bitmap: image.clone(),
        })
    }

    fn draw_filtered_rect(
        &mut self,
        target: &mut SwTarget,
        source: &SwBitmap,
        dst: Box2<u32>,
        src: Box2<f32>,
    ) {
        if source.ptr_eq(&target.bitmap) {
            warn!("Ignoring a draw whose source and destination are the same image");
            return;
        }

        let [sw, sh] = source.size();
        let [tw, _] = target.bitmap.size();
        let clipped = match dst.intersection(&full_rect(target.bitmap.size())) {
            Some(bx) if sw > 0 && sh > 0 => bx,
            _ => return,
        };

        // Map destination pixel coordinates to source texel coordinates. The
        // mapping is derived from the unclipped `dst`.
        let scale = [
            (src.max.x - src.min.x) * sw as f32 / (dst.max.x - dst.min.x) as f32,
            (src.max.y - src.min.y) * sh as f32 / (dst.max.y - dst.min.y) as f32,
        ];
        let origin = [
            src.min.x * sw as f32 - dst.min.x as f32 * scale[0],
            src.min.y * sh as f32 - dst.min.y as f32 * scale[1],
        ];

        let src_pixels = source.inner.pixels.borrow();
        let sampler = Sampler {
            pixels: &src_pixels,
            size: [sw as usize, sh as usize],
        };

        let mut dst_pixels = target.bitmap.inner.pixels.borrow_mut();
        let stride = tw as usize;
        let rows = clipped.min.y as usize * stride..clipped.max.y as usize * stride;
        let (x0, x1) = (clipped.min.x as usize, clipped.max.x as usize);

        // For each row of the destination...
        dst_pixels[rows]
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(i, row)| {
                let y = (clipped.min.y as usize + i) as f32;
                // Texel centres are at half-integer coordinates
                let v = origin[1] + (y + 0.5) * scale[1] - 0.5;
                for (x, px) in (x0..x1).zip(&mut row[x0..x1]) {
                    let u = origin[0] + (x as f32 + 0.5) * scale[0] - 0.5;
                    *px = sampler.bilinear(u, v);
                }
            });

        self.stats.draws += 1;
        let size = clipped.size();
        self.stats.pixels_written += area([size.x, size.y]);
    }
}

/// Bilinear sampler with clamp-to-edge addressing.
struct Sampler<'a> {
    pixels: &'a [RGBA8],
    size: [usize; 2],
}

impl Sampler<'_> {
    fn texel(&self, x: usize, y: usize) -> [f32; 4] {
        let p = self.pixels[y * self.size[0] + x];
        [p.r as f32, p.g as f32, p.b as f32, p.a as f32]
    }

    fn bilinear(&self, u: f32, v: f32) -> RGBA8 {
        let u = u.max(0.0).min((self.size[0] - 1) as f32);
        let v = v.max(0.0).min((self.size[1] - 1) as f32);
        let (x0, y0) = (u as usize, v as usize);
        let (x1, y1) = (
            (x0 + 1).min(self.size[0] - 1),
            (y0 + 1).min(self.size[1] - 1),
        );
        let (fx, fy) = (u - x0 as f32, v - y0 as f32);

        let [p00, p10, p01, p11] = [
            self.texel(x0, y0),
            self.texel(x1, y0),
            self.texel(x0, y1),
            self.texel(x1, y1),
        ];

        let mut out = [0u8; 4];
        for (out, &c00, &c10, &c01, &c11) in izip!(&mut out, &p00, &p10, &p01, &p11) {
            let top = c00 + (c10 - c00) * fx;
            let bottom = c01 + (c11 - c01) * fx;
            let value = top + (bottom - top) * fy;
            *out = (value + 0.5).max(0.0).min(255.0) as u8;
        }

        RGBA8::new(out[0], out[1], out[2], out[3])
    }
}
