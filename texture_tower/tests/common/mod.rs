#![allow(dead_code)]
use cggeom::Box2;
use cgmath::{ortho, vec2, Matrix4};
use std::rc::Rc;
use texture_tower::{Bitmap, PaintTransform, PortError, RasterPort};

pub fn try_init_logger_for_default_harness() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const VIEWPORT: [f32; 2] = [1920.0, 1080.0];

/// Paint a surface at a uniform scale with a pixel-aligned projection.
pub fn scaled(scale: f32) -> PaintTransform {
    PaintTransform {
        modelview: Matrix4::from_nonuniform_scale(scale, scale, 1.0),
        projection: ortho(0.0, VIEWPORT[0], VIEWPORT[1], 0.0, -1.0, 1.0),
        viewport: vec2(VIEWPORT[0], VIEWPORT[1]),
    }
}

/// An image handle that only knows its size.
#[derive(Debug, Clone)]
pub struct FakeBmp(Rc<[u32; 2]>);

impl FakeBmp {
    pub fn new(size: [u32; 2]) -> Self {
        Self(Rc::new(size))
    }
}

impl Bitmap for FakeBmp {
    fn size(&self) -> [u32; 2] {
        *self.0
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    NewImage([u32; 2]),
    NewTarget([u32; 2]),
    Draw {
        target: [u32; 2],
        source: [u32; 2],
        dst: Box2<u32>,
        src: Box2<f32>,
    },
}

#[derive(Debug)]
pub struct FakeTarget([u32; 2]);

/// `RasterPort` recording every operation issued to it.
#[derive(Debug, Default)]
pub struct RecordingPort {
    pub ops: Vec<Op>,
    /// Images of these sizes can't be allocated.
    pub failing_image_sizes: Vec<[u32; 2]>,
    /// Fail the next `n` target creations.
    pub failing_targets: usize,
}

impl RecordingPort {
    pub fn draws(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Draw { .. }))
            .collect()
    }

    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }
}

impl RasterPort for RecordingPort {
    type Bitmap = FakeBmp;
    type Target = FakeTarget;

    fn new_image(&mut self, size: [u32; 2]) -> Result<FakeBmp, PortError> {
        if self.failing_image_sizes.contains(&size) {
            return Err(PortError::OutOfMemory { size });
        }
        self.ops.push(Op::NewImage(size));
        Ok(FakeBmp::new(size))
    }

    fn new_target(&mut self, image: &FakeBmp) -> Result<FakeTarget, PortError> {
        if self.failing_targets > 0 {
            self.failing_targets -= 1;
            return Err(PortError::TargetUnavailable);
        }
        self.ops.push(Op::NewTarget(image.size()));
        Ok(FakeTarget(image.size()))
    }

    fn draw_filtered_rect(
        &mut self,
        target: &mut FakeTarget,
        source: &FakeBmp,
        dst: Box2<u32>,
        src: Box2<f32>,
    ) {
        self.ops.push(Op::Draw {
            target: target.0,
            source: source.size(),
            dst,
            src,
        });
    }
}
