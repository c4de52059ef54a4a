//! The interface between the tower and a graphics backend.
use cggeom::Box2;
use quick_error::quick_error;
use std::fmt::Debug;

/// A ref-counted image handle.
///
/// Cloning a `Bitmap` creates another reference to the same image, not a
/// copy of its contents.
pub trait Bitmap: Clone + Sized + Debug {
    /// Get the dimensions of a bitmap.
    fn size(&self) -> [u32; 2];

    /// Check if `self` and `other` refer to the same image.
    fn ptr_eq(&self, other: &Self) -> bool;
}

/// A graphics backend capable of allocating images and performing filtered
/// blits between them.
///
/// All methods are called from the paint thread. Drawing operations are only
/// recorded in the order they are issued; the backend may execute them
/// asynchronously.
pub trait RasterPort {
    type Bitmap: Bitmap;

    /// An image bound as a paint destination.
    type Target: Debug;

    /// Allocate an image of the specified size. The initial contents are
    /// unspecified.
    fn new_image(&mut self, size: [u32; 2]) -> Result<Self::Bitmap, PortError>;

    /// Wrap `image` as a paint destination.
    fn new_target(&mut self, image: &Self::Bitmap) -> Result<Self::Target, PortError>;

    /// Replace the pixels of `target` inside `dst` (measured in pixels of the
    /// target) with a filtered copy of the region `src` of `source`.
    ///
    /// `src` is normalized to the source image's size, i.e., `[0, 1]²` covers
    /// the whole source image. No blending is performed.
    fn draw_filtered_rect(
        &mut self,
        target: &mut Self::Target,
        source: &Self::Bitmap,
        dst: Box2<u32>,
        src: Box2<f32>,
    );
}

quick_error! {
    /// An error reported by [`RasterPort`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum PortError {
        /// The backend ran out of memory for images.
        OutOfMemory { size: [u32; 2] } {
            display("out of image memory while allocating a {}×{} image", size[0], size[1])
        }
        /// The requested size exceeds the backend's limit.
        TooLarge { size: [u32; 2] } {
            display("image size {}×{} exceeds the backend's limit", size[0], size[1])
        }
        /// The image can't be used as a paint destination.
        TargetUnavailable {
            display("the image can't be bound as a render target")
        }
        /// Any other backend-specific failure.
        Backend(msg: String) {
            display("backend error: {}", msg)
        }
    }
}
