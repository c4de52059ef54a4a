//! Mipmap emulation for compositor surfaces.
//!
//! A [`TextureTower`] keeps a pyramid of progressively half-resolution copies
//! of a surface's base image. The copies are created on demand when the
//! surface is painted at a reduced scale, and only the damaged part of each
//! level is regenerated after the base image changes.
//!
//! The tower does not rasterize anything by itself. All image allocation and
//! filtering goes through a [`RasterPort`](port::RasterPort), which is passed
//! to [`TextureTower::get_best_image`] explicitly. [`swrast`] provides a
//! software implementation.
//!
//! ```
//! use cgmath::{ortho, vec2, Matrix4};
//! use texture_tower::{swrast::{SwBitmap, SwRast}, PaintTransform, TextureTower};
//!
//! let mut port = SwRast::new();
//! let mut tower = TextureTower::<SwRast>::new();
//! tower.set_base_image(Some(SwBitmap::new([512, 512])));
//!
//! // Paint the surface at a quarter of its size
//! let xform = PaintTransform {
//!     modelview: Matrix4::from_nonuniform_scale(0.25, 0.25, 1.0),
//!     projection: ortho(0.0, 1024.0, 768.0, 0.0, -1.0, 1.0),
//!     viewport: vec2(1024.0, 768.0),
//! };
//! let image = tower.get_best_image(&mut port, &xform).unwrap();
//! assert_eq!(image.size(), [128, 128]);
//! ```
pub mod config;
pub mod dirty;
pub mod lod;
pub mod port;
pub mod swrast;
mod tower;

pub use self::{
    config::TowerConfig,
    lod::PaintTransform,
    port::{Bitmap, PortError, RasterPort},
    tower::TextureTower,
};
