//! A helper library for `cgmath`.
//!
//! Provides axis-aligned boxes used for damage tracking and texture-space
//! rectangles.
pub extern crate cgmath;

mod boxes;
#[cfg(feature = "quickcheck")]
mod arbitrary;

pub use self::boxes::*;

/// The prelude.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::AxisAlignedBox;
}
