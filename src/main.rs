use std::path::PathBuf;

use anyhow::Result;
use beamscan::beam_trace::{EdgeCfg, EdgeMode};
use beamscan::config::BeamConfig;
use beamscan::path::{ContourOrdering, GeneratorKind};
use clap::Parser;

/// Render images as beam paths for X/Y vector displays.
#[derive(Parser, Debug)]
#[command(name = "beamscan")]
#[command(about = "Render images into fixed-size beam sample frames")]
#[command(long_about = "Render images into fixed-size beam sample frames for vector displays.
Each input image becomes exactly WIDTHxHEIGHT packed [x, y, intensity, 0] records,
drawn either by tracing contours or by a serpentine raster scan.")]
struct Args {
    /// Input images, rendered in order
    #[arg(required = true, help = "Input image files (any format the image crate decodes)")]
    inputs: Vec<PathBuf>,

    #[arg(short, long, default_value = "vector.bin", help = "Output file for packed sample records")]
    output: String,

    #[arg(short, long, value_enum, default_value_t = GeneratorKind::Contour,
          help = "Path generator: contour (trace outlines) or raster (serpentine scan)")]
    mode: GeneratorKind,

    #[arg(short, long, default_value = "800x600",
          help = "Device buffer size WIDTHxHEIGHT; samples per frame = WIDTH * HEIGHT")]
    resolution: String,

    #[arg(long, default_value_t = 0.0,
          help = "Travel cost per source pixel between contours (0 disables move segments)")]
    move_speed: f64,

    #[arg(long, default_value_t = 0.0, help = "Beam-off share of each move segment, 0.0-1.0")]
    blank_fraction: f64,

    #[arg(long, default_value_t = 3, help = "Drop contours with fewer points than this")]
    min_length: usize,

    #[arg(long, help = "Dither contour points between neighbouring device coordinates")]
    dither: bool,

    #[arg(long, value_enum, default_value_t = ContourOrdering::Identity,
          help = "Contour order: identity (as traced) or greedy (nearest next contour)")]
    ordering: ContourOrdering,

    #[arg(long, value_enum, default_value_t = EdgeMode::Canny,
          help = "Edge detection before tracing: canny or off")]
    edges: EdgeMode,

    #[arg(long, default_value = "128,130", help = "Canny thresholds LOW,HIGH")]
    canny: String,

    #[arg(long, default_value_t = 0, help = "Clear luma at or below this value before tracing")]
    threshold: u8,

    #[arg(long, default_value = "512x256", help = "Raster scan grid COLUMNSxROWS")]
    scan: String,

    #[arg(long, default_value = "0,0", help = "Device coordinate X,Y for blank samples")]
    park: String,

    #[arg(short, long, default_value_t = 1, help = "Passes over the inputs (0 = forever)")]
    loops: u32,

    #[arg(long, help = "Write one JSON line per frame with generation diagnostics")]
    report: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (output_width, output_height) = parse_size(&args.resolution)?;
    let (scan_width, scan_height) = parse_size(&args.scan)?;
    let (low, high) = parse_pair::<f32>(&args.canny, "Canny thresholds")?;
    let park = parse_pair::<u8>(&args.park, "park position")?;

    let mut config = BeamConfig::new(args.output, output_width, output_height, args.mode);
    config.move_speed = args.move_speed;
    config.blank_fraction = args.blank_fraction;
    config.min_contour_length = args.min_length;
    config.dither = args.dither;
    config.ordering = args.ordering;
    config.scan_width = scan_width;
    config.scan_height = scan_height;
    config.canny = match args.edges {
        EdgeMode::Canny => Some(EdgeCfg::new(low, high)),
        EdgeMode::Off => None,
    };
    config.trace_threshold = args.threshold;
    config.park = park;

    config.validate().map_err(anyhow::Error::msg)?;
    let summary = beamscan::render_images(&config, args.inputs, args.loops, args.report).await?;

    log::info!(
        "wrote {} frames ({} samples) to '{}'",
        summary.frames,
        summary.samples_written,
        config.output
    );
    if summary.truncated_frames > 0 {
        log::warn!("{} frames were truncated", summary.truncated_frames);
    }
    Ok(())
}

/// Parse "WIDTHxHEIGHT" like "800x600"
fn parse_size(size: &str) -> Result<(u32, u32)> {
    let (w, h) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("Invalid size: {}. Use WIDTHxHEIGHT, e.g. 800x600", size))?;
    let w = w
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid width in size: {}", size))?;
    let h = h
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid height in size: {}", size))?;
    Ok((w, h))
}

/// Parse "A,B" into two values
fn parse_pair<T: std::str::FromStr>(pair: &str, what: &str) -> Result<(T, T)> {
    let invalid = || anyhow::anyhow!("Invalid {}: {}. Use A,B", what, pair);
    let (a, b) = pair.split_once(',').ok_or_else(invalid)?;
    let a = a.trim().parse().map_err(|_| invalid())?;
    let b = b.trim().parse().map_err(|_| invalid())?;
    Ok((a, b))
}
