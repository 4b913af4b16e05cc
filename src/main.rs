//! Terramesh CLI - procedural terrain chunk generator.
//!
//! Generate seeded fractal terrain chunks, export their heightmaps, and
//! report mesh statistics for a chosen level of detail.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use terramesh::export::{export_grid_png, export_grid_raw, PngExportOptions, RawFormat};
use terramesh::{
    CrossNeighbor, FaceAveraging, FalloffMask, LevelOfDetail, NoiseConfig, NormalStrategy,
    TerrainConfig, TerrainGenerator, DEFAULT_CHUNK_SIZE,
};

/// Procedural terrain chunk generator.
#[derive(Parser)]
#[command(name = "terramesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a terrain chunk and export its heightmap.
    Generate {
        /// Chunk side length in cells, before border padding.
        #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: u32,

        /// Random seed for reproducible generation.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Noise sampling scale (larger = wider terrain features).
        #[arg(long, default_value = "50.0")]
        scale: f32,

        /// Number of noise octaves (1-16).
        #[arg(long, default_value = "4")]
        octaves: u32,

        /// Amplitude decay per octave (persistence).
        #[arg(long, default_value = "0.5")]
        persistence: f32,

        /// Frequency growth per octave (lacunarity).
        #[arg(long, default_value = "2.0")]
        lacunarity: f32,

        /// Sample window offset, x component.
        #[arg(long, default_value = "0.0")]
        offset_x: f32,

        /// Sample window offset, y component.
        #[arg(long, default_value = "0.0")]
        offset_y: f32,

        /// Level of detail (0 = full resolution, up to 6).
        #[arg(short, long, default_value = "0")]
        lod: u8,

        /// Vertical exaggeration of the mesh.
        #[arg(long, default_value = "20.0")]
        height_multiplier: f32,

        /// Carve an island shape with a falloff mask.
        #[arg(long)]
        falloff: bool,

        /// Normal computation strategy for the mesh.
        #[arg(long, default_value = "face")]
        normals: NormalsMode,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "chunk")]
        name: String,

        /// Export format for the heightmap.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Also export the falloff mask used for island shaping.
        #[arg(long)]
        falloff_map: bool,

        /// Skip mesh construction (heightmap export only).
        #[arg(long)]
        skip_mesh: bool,
    },

    /// Display mesh and memory statistics for a configuration.
    Info {
        /// Chunk side length in cells, before border padding.
        #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: u32,

        /// Level of detail (0 = full resolution, up to 6).
        #[arg(short, long, default_value = "0")]
        lod: u8,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit grayscale PNG.
    Png,
    /// 16-bit RAW little-endian.
    Raw,
    /// 32-bit float RAW.
    RawFloat,
}

#[derive(Clone, Copy, ValueEnum)]
enum NormalsMode {
    /// Face-normal accumulation over adjacent triangles.
    Face,
    /// Central differences from the four lattice neighbors.
    Cross,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            chunk_size,
            seed,
            scale,
            octaves,
            persistence,
            lacunarity,
            offset_x,
            offset_y,
            lod,
            height_multiplier,
            falloff,
            normals,
            output,
            name,
            format,
            falloff_map,
            skip_mesh,
        } => run_generate(GenerateArgs {
            chunk_size,
            seed,
            scale,
            octaves,
            persistence,
            lacunarity,
            offset_x,
            offset_y,
            lod,
            height_multiplier,
            falloff,
            normals,
            output,
            name,
            format,
            falloff_map,
            skip_mesh,
        }),
        Commands::Info { chunk_size, lod } => run_info(chunk_size, lod),
    }
}

struct GenerateArgs {
    chunk_size: u32,
    seed: Option<u64>,
    scale: f32,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
    offset_x: f32,
    offset_y: f32,
    lod: u8,
    height_multiplier: f32,
    falloff: bool,
    normals: NormalsMode,
    output: PathBuf,
    name: String,
    format: ExportFormat,
    falloff_map: bool,
    skip_mesh: bool,
}

fn run_generate(args: GenerateArgs) {
    if args.chunk_size < 4 || args.chunk_size > 4096 {
        eprintln!("Error: Chunk size must be between 4 and 4096");
        std::process::exit(1);
    }

    if args.octaves < 1 || args.octaves > 16 {
        eprintln!("Error: Octaves must be between 1 and 16");
        std::process::exit(1);
    }

    let lod = LevelOfDetail::new(args.lod).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // Generate seed if not provided
    let seed = args.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    });

    println!("Terramesh - Procedural Terrain Generator");
    println!("========================================");
    println!("Chunk size: {} (+2 border padding)", args.chunk_size);
    println!("Seed: {}", seed);
    println!("Output: {}", args.output.display());

    let noise_config = NoiseConfig {
        seed,
        scale: args.scale,
        octaves: args.octaves,
        persistence: args.persistence,
        lacunarity: args.lacunarity,
        offset: glam::Vec2::new(args.offset_x, args.offset_y),
    };
    let terrain_config = TerrainConfig {
        height_multiplier: args.height_multiplier,
        use_falloff: args.falloff,
        ..Default::default()
    };

    let strategy: Arc<dyn NormalStrategy> = match args.normals {
        NormalsMode::Face => Arc::new(FaceAveraging),
        NormalsMode::Cross => Arc::new(CrossNeighbor),
    };
    let mut generator = TerrainGenerator::with_strategy(
        noise_config,
        terrain_config,
        args.chunk_size,
        strategy,
    );

    println!("\nGenerating height grid...");
    let start = Instant::now();
    let map_data = generator.generate_map_data();
    println!("Height grid generated in {:.2?}", start.elapsed());
    println!(
        "Material height range: [{:.2}, {:.2}]",
        map_data.min_height, map_data.max_height
    );

    std::fs::create_dir_all(&args.output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });

    match args.format {
        ExportFormat::Png => {
            let path = args.output.join(format!("{}.png", args.name));
            export_grid_png(&map_data.height_grid, &path, &PngExportOptions::default())
                .unwrap_or_else(|e| {
                    eprintln!("Error exporting PNG: {}", e);
                    std::process::exit(1);
                });
            println!("  Exported heightmap: {}", path.display());
        }
        ExportFormat::Raw => {
            let path = args.output.join(format!("{}.raw", args.name));
            export_grid_raw(
                &map_data.height_grid,
                &path,
                RawFormat::R16LittleEndian,
                0.0,
                1.0,
            )
            .unwrap_or_else(|e| {
                eprintln!("Error exporting RAW: {}", e);
                std::process::exit(1);
            });
            println!("  Exported heightmap (R16): {}", path.display());
        }
        ExportFormat::RawFloat => {
            let path = args.output.join(format!("{}.r32", args.name));
            export_grid_raw(&map_data.height_grid, &path, RawFormat::R32Float, 0.0, 1.0)
                .unwrap_or_else(|e| {
                    eprintln!("Error exporting RAW: {}", e);
                    std::process::exit(1);
                });
            println!("  Exported heightmap (R32 float): {}", path.display());
        }
    }

    if args.falloff_map {
        let mask = FalloffMask::generate(generator.grid_size());
        let path = args.output.join(format!("{}_falloff.png", args.name));
        export_grid_png(mask.as_grid(), &path, &PngExportOptions::default()).unwrap_or_else(
            |e| {
                eprintln!("Error exporting falloff map: {}", e);
                std::process::exit(1);
            },
        );
        println!("  Exported falloff mask: {}", path.display());
    }

    if !args.skip_mesh {
        println!("\nBuilding mesh at LOD {}...", lod.level());
        let mesh_start = Instant::now();
        let mesh = generator.generate_mesh(&map_data, lod).unwrap_or_else(|e| {
            eprintln!("Error building mesh: {}", e);
            std::process::exit(1);
        });
        println!("Mesh built in {:.2?}", mesh_start.elapsed());

        println!("  Normal strategy:    {}", generator_strategy_name(args.normals));
        println!("  Vertices per line:  {}", mesh.vertices_per_line());
        println!("  Interior vertices:  {}", mesh.vertex_count());
        println!("  Interior triangles: {}", mesh.triangle_count());
        println!("  Border vertices:    {}", mesh.border_vertices.len());
        println!("  Border triangles:   {}", mesh.border_triangles.len());
    }

    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn generator_strategy_name(mode: NormalsMode) -> &'static str {
    match mode {
        NormalsMode::Face => FaceAveraging.name(),
        NormalsMode::Cross => CrossNeighbor.name(),
    }
}

fn run_info(chunk_size: u32, lod: u8) {
    let lod = LevelOfDetail::new(lod).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let bordered = (chunk_size + 2) as u64;
    let stride = lod.stride() as u64;
    let mesh_size = bordered as i64 - 2 * stride as i64;
    let vertices_per_line = (mesh_size - 1) / stride as i64 + 1;

    println!("Terramesh - Chunk Configuration Info");
    println!("====================================");
    println!();
    println!("Chunk size:        {} cells", chunk_size);
    println!("Padded grid:       {}x{} cells", bordered, bordered);
    println!("LOD {} stride:      {}", lod.level(), stride);

    if (bordered - 1) % stride != 0 {
        println!();
        println!("Warning: stride {} does not evenly divide the grid span; mesh construction will fail", stride);
        return;
    }
    if vertices_per_line < 2 {
        println!();
        println!("Warning: this LOD leaves fewer than 2 vertices per line; mesh construction will fail");
        return;
    }

    let vpl = vertices_per_line as u64;
    let vertices = vpl * vpl;
    let triangles = 2 * (vpl - 1) * (vpl - 1);
    let border_vertices = 4 * vpl + 4;

    let grid_bytes = bordered * bordered * 4;
    // Positions + normals are 12 bytes each, UVs 8, indices 3x4 per triangle.
    let mesh_bytes = vertices * (12 + 12 + 8) + triangles * 12 + border_vertices * 12;
    let png_bytes = bordered * bordered * 2;

    println!();
    println!("Mesh statistics:");
    println!("  Vertices per line:  {:>12}", vpl);
    println!("  Interior vertices:  {:>12}", vertices);
    println!("  Interior triangles: {:>12}", triangles);
    println!("  Border vertices:    {:>12}", border_vertices);
    println!();
    println!("Memory usage (in-memory):");
    println!(
        "  Height grid:  {:>12} bytes ({:.2} MB)",
        grid_bytes,
        grid_bytes as f64 / 1024.0 / 1024.0
    );
    println!(
        "  Mesh buffers: {:>12} bytes ({:.2} MB)",
        mesh_bytes,
        mesh_bytes as f64 / 1024.0 / 1024.0
    );
    println!();
    println!("Export file sizes:");
    println!(
        "  PNG (16-bit): {:>12} bytes ({:.2} MB)",
        png_bytes,
        png_bytes as f64 / 1024.0 / 1024.0
    );
}
