use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::{error, info, warn};

use webgl_triangle::backend::soft::{Framebuffer, SoftCanvas};
use webgl_triangle::config::parse_level;
use webgl_triangle::logging::init_logging;
use webgl_triangle::renderer::{self, shader, Extent, Sources};
use webgl_triangle::{Error, Variant};

/// Renders the triangle headless and saves the drawing buffer as a PNG.
#[derive(Debug, Parser)]
#[command(name = "webgl-triangle", version)]
struct Args {
    /// Canvas client width in pixels.
    #[arg(long, default_value_t = 300)]
    width: u32,
    /// Canvas client height in pixels.
    #[arg(long, default_value_t = 150)]
    height: u32,
    /// Variant whose call sequence is replayed: dynamic, cached, typed or glow.
    #[arg(long, value_parser = str::parse::<Variant>)]
    variant: Option<Variant>,
    #[arg(short, long, default_value = "triangle.png")]
    output: PathBuf,
    /// Vertex shader source to use instead of the built-in one.
    #[arg(long)]
    vertex: Option<PathBuf>,
    /// Fragment shader source to use instead of the built-in one.
    #[arg(long)]
    fragment: Option<PathBuf>,
    /// Pretend the host has no WebGL.
    #[arg(long)]
    no_webgl: bool,
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log: log::LevelFilter,
}

fn load(path: &Option<PathBuf>, builtin: &'static str) -> Result<String, String> {
    match path {
        Some(path) => {
            read_to_string(path).map_err(|err| format!("{}: {}", path.display(), err))
        }
        None => Ok(builtin.to_owned()),
    }
}

/// Writes `fb` as a PNG. An empty drawing buffer has nothing to save, so it
/// returns `Ok(false)` without touching `path`.
fn write_png(fb: &Framebuffer, dims: Extent, path: &Path) -> Result<bool, String> {
    if dims.width == 0 || dims.height == 0 {
        return Ok(false);
    }
    let image = image::RgbaImage::from_raw(dims.width, dims.height, fb.to_rgba_top_down())
        .ok_or_else(|| "drawing buffer does not match its size".to_owned())?;
    image.save(path).map_err(|err| err.to_string())?;
    Ok(true)
}

fn main() {
    let args = Args::parse();
    init_logging(args.log);

    let variant = args.variant.or_else(Variant::preferred);
    match variant {
        Some(variant) => info!("emulating the {} variant on the CPU", variant),
        None => info!("rendering on the CPU"),
    }

    let sources = load(&args.vertex, shader::VERTEX)
        .and_then(|vertex| Ok((vertex, load(&args.fragment, shader::FRAGMENT)?)));
    let (vertex, fragment) = match sources {
        Ok(pair) => pair,
        Err(err) => {
            error!("{}", err);
            process::exit(2);
        }
    };

    let mut canvas = SoftCanvas::new(args.width, args.height);
    if args.no_webgl {
        canvas = canvas.without_webgl();
    }

    let sources = Sources {
        vertex: &vertex,
        fragment: &fragment,
    };
    let dims = match renderer::run(&canvas, &sources) {
        Ok(dims) => dims,
        // Already reported; nothing was drawn.
        Err(Error::Unsupported) => return,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    match write_png(&canvas.snapshot(), dims, &args.output) {
        Ok(true) => info!("wrote {}", args.output.display()),
        Ok(false) => warn!(
            "drawing buffer is {}x{}; not writing {}",
            dims.width,
            dims.height,
            args.output.display()
        ),
        Err(err) => {
            error!("{}: {}", args.output.display(), err);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_flag() {
        for variant in Variant::enabled() {
            let args =
                Args::try_parse_from(["webgl-triangle", "--variant", variant.name()]).unwrap();
            assert_eq!(args.variant, Some(variant));
        }
        assert!(Args::try_parse_from(["webgl-triangle", "--variant", "webgpu"]).is_err());

        let args = Args::try_parse_from(["webgl-triangle"]).unwrap();
        assert_eq!(args.variant, None);
        assert_eq!((args.width, args.height), (300, 150));
    }

    #[test]
    fn zero_sized_canvas_skips_png() {
        let canvas = SoftCanvas::new(0, 10);
        let dims = renderer::run(&canvas, &Sources::default()).unwrap();
        let path = std::env::temp_dir().join("webgl-triangle-zero-size.png");
        let _ = std::fs::remove_file(&path);

        assert_eq!(write_png(&canvas.snapshot(), dims, &path), Ok(false));
        assert!(!path.exists());
    }

    #[test]
    fn png_matches_drawing_buffer() {
        let canvas = SoftCanvas::new(40, 20);
        let dims = renderer::run(&canvas, &Sources::default()).unwrap();
        let path = std::env::temp_dir().join("webgl-triangle-40x20.png");

        assert_eq!(write_png(&canvas.snapshot(), dims, &path), Ok(true));
        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (40, 20));
        // Row 0 of the file is the top of the canvas.
        assert_eq!(image.get_pixel(22, 20 - 1 - 11).0, [255, 0, 128, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        let _ = std::fs::remove_file(&path);
    }
}
