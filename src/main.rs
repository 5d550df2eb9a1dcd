use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use terrain_generator::display::FileDisplay;
use terrain_generator::export::{self, GenerationRecord};
use terrain_generator::generator::{DrawMode, MapGenerator};
use terrain_generator::params::{GenerationParameters, LevelOfDetail, MAX_LEVEL_OF_DETAIL};
use terrain_generator::regions::RegionPreset;

#[derive(Parser, Debug)]
#[command(name = "terrain_generator")]
#[command(about = "Generate procedural heightfield terrain with region colors and LOD meshes")]
struct Args {
    /// Start from a saved generation record (JSON); other flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the height field in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the height field in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Noise seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pick a random seed (overrides --seed)
    #[arg(long)]
    random_seed: bool,

    /// Add one to the seed before generating
    #[arg(long)]
    increment_seed: bool,

    /// Noise zoom; larger values give broader features
    #[arg(long)]
    scale: Option<f32>,

    /// Number of noise octaves (negative values are clamped to 0)
    #[arg(short, long, allow_hyphen_values = true)]
    octaves: Option<i32>,

    /// Amplitude multiplier per octave (0.0-1.0)
    #[arg(short, long)]
    persistence: Option<f32>,

    /// Frequency multiplier per octave (values below 1 are clamped)
    #[arg(short, long)]
    lacunarity: Option<f32>,

    /// Horizontal pan of the noise plane
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f32>,

    /// Vertical pan of the noise plane
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f32>,

    /// Mesh level of detail (0 = full resolution)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=MAX_LEVEL_OF_DETAIL as i64))]
    lod: Option<u8>,

    /// Vertical scale of the mesh
    #[arg(long)]
    height_multiplier: Option<f32>,

    /// Region palette: default, desert, forest, mountain, snowy, water
    #[arg(long)]
    preset: Option<RegionPreset>,

    /// What to produce: noise, color or mesh
    #[arg(short, long)]
    mode: Option<DrawMode>,

    /// Output directory
    #[arg(long, default_value = "output")]
    out: PathBuf,

    /// Print a histogram of generated heights
    #[arg(long)]
    histogram: bool,
}

impl Args {
    fn apply_to(&self, params: &mut GenerationParameters) {
        if let Some(width) = self.width {
            params.width = width;
        }
        if let Some(height) = self.height {
            params.height = height;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(scale) = self.scale {
            params.scale = scale;
        }
        if let Some(octaves) = self.octaves {
            params.octaves = octaves;
        }
        if let Some(persistence) = self.persistence {
            params.persistence = persistence;
        }
        if let Some(lacunarity) = self.lacunarity {
            params.lacunarity = lacunarity;
        }
        if let Some(x) = self.offset_x {
            params.offset[0] = x;
        }
        if let Some(y) = self.offset_y {
            params.offset[1] = y;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut generator = match &args.config {
        Some(path) => {
            let record: GenerationRecord = export::load_record(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            println!("Loaded settings from {}", path.display());
            MapGenerator::from_record(record)
        }
        None => MapGenerator::default(),
    };

    args.apply_to(&mut generator.params);
    if let Some(level) = args.lod {
        generator.level_of_detail = LevelOfDetail::new(level)?;
    }
    if let Some(multiplier) = args.height_multiplier {
        generator.mesh_height_multiplier = multiplier;
    }
    if let Some(mode) = args.mode {
        generator.draw_mode = mode;
    }

    println!(
        "Generating {}x{} terrain ({} mode, {})",
        generator.params.width, generator.params.height, generator.draw_mode, generator.level_of_detail
    );

    // Each of these regenerates on its own
    let mut generated = false;
    if let Some(preset) = args.preset {
        println!("Applying {} preset: {}", preset, preset.description());
        generator.apply_preset(preset)?;
        generated = true;
    }
    if args.random_seed {
        generator.randomize_seed(&mut rand::thread_rng())?;
        generated = true;
    }
    if args.increment_seed {
        generator.increment_seed()?;
        generated = true;
    }
    if !generated {
        generator.generate()?;
    }
    let output = generator
        .last_output()
        .context("generation produced no output")?;

    let labels = generator.labels();
    println!("{} | {} | {}", labels.seed, labels.height, labels.scale);
    if let Some(mesh) = output.mesh() {
        println!("Mesh: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
    }
    if args.histogram {
        output.field().stats(10).print_histogram();
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output directory {}", args.out.display()))?;

    let heightmap_path = args.out.join("heightmap.png");
    export::export_heightmap_png(output.field(), &heightmap_path)
        .with_context(|| format!("failed to export {}", heightmap_path.display()))?;
    println!("Exported heightmap to: {}", heightmap_path.display());

    let record_path = args.out.join("terrain.json");
    export::save_record(&generator.record(), &record_path)
        .with_context(|| format!("failed to export {}", record_path.display()))?;
    println!("Exported settings to: {}", record_path.display());

    let mut display = FileDisplay::new(&args.out, "terrain");
    generator.draw(&mut display).context("failed to draw terrain")?;
    for path in display.written() {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
