//! Level-of-detail estimation.
//!
//! This determines the mipmap level to use when drawing a texture in a way
//! that corresponds to what the OpenGL specification does for mip-mapping
//! (OpenGL 3.2 core profile, section 3.8.9). We only do this once per paint of
//! a surface, so following the specification is simpler than coming up with
//! something cheaper.
//!
//! The texture is assumed to be drawn with vertex coordinates matching its
//! size in pixels, i.e., a 200×200 texture covers the rectangle
//! `(0, 0)–(200, 200)` in object space. If the surface is painted at an angle
//! from the viewer, the level is evaluated at the centre of the texture.
use cgmath::{vec4, Matrix4, Vector2};

/// The default level-of-detail bias.
///
/// Scaling a surface up by even a small amount generally looks worse than
/// scaling it down using bilinear filtering, so we pick the *larger* adjacent
/// level.
pub const LOD_BIAS: f64 = -0.49;

/// The transformation used to paint a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintTransform {
    /// Maps texel coordinates to eye coordinates.
    pub modelview: Matrix4<f32>,
    /// Maps eye coordinates to clip coordinates.
    pub projection: Matrix4<f32>,
    /// The viewport size in window pixels.
    pub viewport: Vector2<f32>,
}

/// Estimate the continuous level of detail `λ` for painting a texture of size
/// `size` (in texels) using `xform`.
///
/// Returns `None` if the transformation is singular at the texture's centre,
/// meaning the texture is scaled to nothing on the screen.
pub fn estimate_lambda(xform: &PaintTransform, size: [u32; 2], bias: f64) -> Option<f64> {
    // Since texels map 1:1 to object coordinates, the clip coordinates are
    //
    //   (x_c, y_c, z_c, w_c) = P·M·(u, v, 0, 1)
    //
    let pm: Matrix4<f64> = (xform.projection * xform.modelview).cast()?;
    let viewport: Vector2<f64> = xform.viewport.cast()?;

    let (u0, v0) = (size[0] as f64 / 2.0, size[1] as f64 / 2.0);
    let c = pm * vec4(u0, v0, 0.0, 1.0);
    let (xc, yc, wc) = (c.x, c.y, c.w);

    // The window coordinates are
    //
    //   x_w = 0.5 · viewport_width  · x_c / w_c + viewport_center_x
    //   y_w = 0.5 · viewport_height · y_c / w_c + viewport_center_y
    //
    // The following are their partial derivatives with respect to `u` and
    // `v`, multiplied by `w_c`.
    let dxdu = 0.5 * viewport.x * (pm.x.x - pm.x.w * (xc / wc));
    let dxdv = 0.5 * viewport.x * (pm.y.x - pm.y.w * (xc / wc));
    let dydu = 0.5 * viewport.y * (pm.x.y - pm.x.w * (yc / wc));
    let dydv = 0.5 * viewport.y * (pm.y.y - pm.y.w * (yc / wc));

    // det · w_c²
    let det = dxdu * dydv - dxdv * dydu;
    let det_sq = det * det;
    if det_sq == 0.0 {
        return None;
    }

    // The inverse Jacobian gives the texel distance per window pixel. `ρ` is
    // the larger of the distances for one pixel step along X and along Y:
    //
    //   ρ = max(|(∂u/∂x, ∂v/∂x)|, |(∂u/∂y, ∂v/∂y)|)
    //     = max(|(dydv, dydu)|, |(dxdv, dxdu)|) · w_c / det
    //
    // `rho_sq` is `(ρ · det / w_c)²`.
    let rho_sq = (dydv * dydv + dydu * dydu).max(dxdv * dxdv + dxdu * dxdu);

    let lambda = 0.5 * (rho_sq * wc * wc / det_sq).log2() + bias;

    // `w_c == 0` and friends
    if lambda.is_finite() {
        Some(lambda)
    } else {
        None
    }
}

/// Convert a continuous level of detail to an integral level, rounding to
/// nearest (ties go to the coarser level). Never returns a level below the
/// base level.
pub fn lambda_to_level(lambda: f64) -> usize {
    if lambda <= 0.0 {
        0
    } else {
        (lambda + 0.5) as usize
    }
}

/// Estimate the integral level of detail. Combines [`estimate_lambda`] and
/// [`lambda_to_level`].
pub fn paint_level(xform: &PaintTransform, size: [u32; 2], bias: f64) -> Option<usize> {
    estimate_lambda(xform, size, bias).map(lambda_to_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{ortho, perspective, vec2, Deg, Vector3};
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    const VIEWPORT: [f32; 2] = [1280.0, 720.0];

    /// A pixel-aligned orthographic projection, as a compositor would use for
    /// 2D painting.
    fn scaled(sx: f32, sy: f32) -> PaintTransform {
        PaintTransform {
            modelview: Matrix4::from_nonuniform_scale(sx, sy, 1.0),
            projection: ortho(0.0, VIEWPORT[0], VIEWPORT[1], 0.0, -1.0, 1.0),
            viewport: vec2(VIEWPORT[0], VIEWPORT[1]),
        }
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1.0e-5,
            "expected ≈ {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn identity_scale() {
        let lambda = estimate_lambda(&scaled(1.0, 1.0), [256, 256], 0.0).unwrap();
        assert_approx(lambda, 0.0);
        assert_eq!(paint_level(&scaled(1.0, 1.0), [256, 256], LOD_BIAS), Some(0));
    }

    #[test]
    fn uniform_minification() {
        for &(scale, expected) in &[(0.5, 1.0), (0.25, 2.0), (0.125, 3.0), (2.0, -1.0)] {
            let lambda = estimate_lambda(&scaled(scale, scale), [512, 512], 0.0).unwrap();
            assert_approx(lambda, expected);
        }
    }

    #[test]
    fn bias_prefers_finer_level() {
        // Without bias, 0.7 would round to level 1 (λ ≈ 0.515)
        let xform = scaled(0.7, 0.7);
        assert_eq!(paint_level(&xform, [512, 512], 0.0), Some(1));
        assert_eq!(paint_level(&xform, [512, 512], LOD_BIAS), Some(0));

        assert_eq!(paint_level(&scaled(0.5, 0.5), [512, 512], LOD_BIAS), Some(1));
        assert_eq!(paint_level(&scaled(0.25, 0.25), [512, 512], LOD_BIAS), Some(2));
    }

    #[test]
    fn anisotropic_uses_larger_rate() {
        // X is minified by 4, Y by 2
        let lambda = estimate_lambda(&scaled(0.25, 0.5), [512, 512], 0.0).unwrap();
        assert_approx(lambda, 2.0);
    }

    #[test]
    fn rounding() {
        assert_eq!(lambda_to_level(-3.0), 0);
        assert_eq!(lambda_to_level(0.0), 0);
        assert_eq!(lambda_to_level(0.49), 0);
        assert_eq!(lambda_to_level(0.5), 1);
        assert_eq!(lambda_to_level(1.49), 1);
        assert_eq!(lambda_to_level(2.5), 3);
    }

    #[test]
    fn zero_scale_is_degenerate() {
        assert_eq!(estimate_lambda(&scaled(0.0, 0.0), [64, 64], LOD_BIAS), None);
        assert_eq!(estimate_lambda(&scaled(1.0, 0.0), [64, 64], LOD_BIAS), None);
    }

    #[test]
    fn non_finite_transform_is_degenerate() {
        assert_eq!(estimate_lambda(&scaled(std::f32::NAN, 1.0), [64, 64], LOD_BIAS), None);
        assert_eq!(estimate_lambda(&scaled(std::f32::INFINITY, 1.0), [64, 64], LOD_BIAS), None);
    }

    #[test]
    fn edge_on_is_degenerate() {
        // The U axis is mapped to the depth axis, so the surface is seen
        // edge-on
        let mut xform = scaled(1.0, 1.0);
        #[cfg_attr(rustfmt, rustfmt_skip)]
        let modelview = Matrix4::new(
            0.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        xform.modelview = modelview;
        assert_eq!(paint_level(&xform, [64, 64], LOD_BIAS), None);
    }

    #[test]
    fn perspective_farther_is_coarser() {
        let xform_at = |distance: f32| PaintTransform {
            modelview: Matrix4::from_translation(Vector3::new(-256.0, -256.0, -distance)),
            projection: perspective(Deg(60.0), VIEWPORT[0] / VIEWPORT[1], 1.0, 100000.0),
            viewport: vec2(VIEWPORT[0], VIEWPORT[1]),
        };

        let levels: Vec<_> = [300.0, 600.0, 1200.0, 2400.0, 4800.0]
            .iter()
            .map(|&d| paint_level(&xform_at(d), [512, 512], LOD_BIAS).unwrap())
            .collect();

        assert!(levels.windows(2).all(|w| w[0] <= w[1]), "{:?}", levels);
        assert!(levels[0] < levels[4], "{:?}", levels);
    }

    #[quickcheck]
    fn smaller_never_finer(a: u16, b: u16, w: u16, h: u16) -> TestResult {
        if a == 0 || b == 0 || w == 0 || h == 0 {
            return TestResult::discard();
        }
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let small = small as f32 / 1024.0;
        let large = large as f32 / 1024.0;
        let size = [w as u32, h as u32];

        let level_small = paint_level(&scaled(small, small), size, LOD_BIAS);
        let level_large = paint_level(&scaled(large, large), size, LOD_BIAS);

        match (level_small, level_large) {
            (Some(s), Some(l)) if s >= l => TestResult::passed(),
            (s, l) => TestResult::error(format!(
                "scale {} → {:?}, scale {} → {:?}",
                small, s, large, l
            )),
        }
    }
}
