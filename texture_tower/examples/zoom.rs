//! Drives a texture tower through a zoom-out animation using the software
//! raster port, and reports the level chosen for each frame.
use cggeom::box2;
use cgmath::{ortho, vec2, Matrix4};
use log::info;
use rgb::RGBA8;
use structopt::StructOpt;
use texture_tower::{
    swrast::{SwBitmap, SwRast},
    PaintTransform, TextureTower, TowerConfig,
};

#[derive(StructOpt, Debug)]
#[structopt(name = "zoom")]
struct Opt {
    /// The width of the surface.
    #[structopt(short = "w", long = "width", default_value = "1024")]
    width: u32,

    /// The height of the surface.
    #[structopt(short = "H", long = "height", default_value = "768")]
    height: u32,

    /// The number of frames.
    #[structopt(short = "n", long = "frames", default_value = "60")]
    frames: u32,

    /// The scale at the last frame.
    #[structopt(short = "s", long = "final_scale", default_value = "0.05")]
    final_scale: f32,

    /// Damage a small region of the surface every frame.
    #[structopt(short = "d", long = "damage")]
    damage: bool,

    /// Override the level-of-detail bias.
    #[structopt(long = "lod_bias")]
    lod_bias: Option<f64>,
}

const VIEWPORT: [f32; 2] = [1920.0, 1080.0];

fn main() {
    env_logger::init();

    let opt = Opt::from_args();

    let mut config = TowerConfig::default();
    if let Some(bias) = opt.lod_bias {
        config = config.with_lod_bias(bias);
    }

    let base = SwBitmap::new([opt.width, opt.height]);
    // A checkerboard, which aliases badly without mipmapping
    for y in 0..opt.height {
        for x in 0..opt.width {
            let v = if (x / 4 + y / 4) % 2 == 0 { 255 } else { 0 };
            base.set_pixel(x, y, RGBA8::new(v, v, v, 255));
        }
    }

    let mut port = SwRast::new();
    let mut tower = TextureTower::<SwRast>::with_config(config);
    tower.set_base_image(Some(base.clone()));

    let frames = opt.frames.max(2);
    for frame in 0..frames {
        let t = frame as f32 / (frames - 1) as f32;
        let scale = opt.final_scale.powf(t);

        if opt.damage {
            let x = frame * 7 % opt.width.max(1);
            base.fill_rect(
                box2! { top_left: [x, 0], size: [4, 4] },
                RGBA8::new(255, 0, 0, 255),
            );
            tower.mark_region_dirty(x, 0, 4, 4);
        }

        let xform = PaintTransform {
            modelview: Matrix4::from_nonuniform_scale(scale, scale, 1.0),
            projection: ortho(0.0, VIEWPORT[0], VIEWPORT[1], 0.0, -1.0, 1.0),
            viewport: vec2(VIEWPORT[0], VIEWPORT[1]),
        };

        let draws_before = port.stats().draws;
        match tower.get_best_image(&mut port, &xform) {
            Some(image) => info!(
                "frame {:3}: scale {:.4} → {:?} ({} draw(s))",
                frame,
                scale,
                image.size(),
                port.stats().draws - draws_before
            ),
            None => info!("frame {:3}: scale {:.4} → nothing", frame, scale),
        }
    }

    let stats = port.stats();
    println!(
        "{} level(s), {} image(s) created, {} draw(s), {} pixel(s) written",
        tower.level_count(),
        stats.images_created,
        stats.draws,
        stats.pixels_written
    );
}
