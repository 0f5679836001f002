//! Command-line interface for the cloud path pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::core::writers;
use crate::processors::pipeline::{run_pipeline, PipelineOutput};
use crate::visualization::{self, RenderOptions, SeriesKind, SeriesView};

#[derive(Parser)]
#[command(name = "cloud-path")]
#[command(about = "Order a point cloud into a traversal path and smooth it", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, sort and smooth a cloud, then export and render the results
    Run {
        /// Input CSV with x,y,z records
        input: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
        /// Smoothing window size (odd)
        #[arg(long)]
        window: Option<usize>,
        /// Smoothing polynomial order
        #[arg(long)]
        order: Option<usize>,
        /// Keep every Nth sorted point in downsampled.csv
        #[arg(long)]
        downsample: Option<usize>,
        /// Also write colored PLY files for each series
        #[arg(long)]
        ply: bool,
        /// Skip the PNG and GIF rendering
        #[arg(long)]
        no_render: bool,
    },

    /// Write the angularly sorted cloud to CSV
    Sort {
        /// Input CSV with x,y,z records
        input: PathBuf,
        /// Output CSV file
        output: PathBuf,
    },

    /// Write the smoothed path to CSV
    Smooth {
        /// Input CSV with x,y,z records
        input: PathBuf,
        /// Output CSV file
        output: PathBuf,
        /// Smoothing window size (odd)
        #[arg(long)]
        window: Option<usize>,
        /// Smoothing polynomial order
        #[arg(long)]
        order: Option<usize>,
    },

    /// Render a comparison plot (PNG) and optionally an animation (GIF)
    Render {
        /// Input CSV with x,y,z records
        input: PathBuf,
        /// Output PNG file (defaults to input name with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write an animated GIF to this path
        #[arg(long)]
        animate: Option<PathBuf>,
        /// Maximum number of animation frames
        #[arg(long)]
        max_frames: Option<usize>,
        /// Title for the plot
        #[arg(long)]
        title: Option<String>,
    },

    /// Write the default configuration to a YAML file
    InitConfig {
        /// Destination YAML file
        path: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 37 {
            let head: String = value.chars().take(34).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<37} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

fn load_config(path: Option<&Path>) -> PipelineConfig {
    match path {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    }
}

fn apply_smoothing_overrides(config: &mut PipelineConfig, window: Option<usize>, order: Option<usize>) {
    if let Some(w) = window {
        config.smoothing.window_size = w;
    }
    if let Some(p) = order {
        config.smoothing.polynomial_order = p;
    }
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    if let Err(e) = dispatch(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            window,
            order,
            downsample,
            ply,
            no_render,
        } => {
            apply_smoothing_overrides(&mut config, window, order);
            if let Some(interval) = downsample {
                config.output.downsample_interval = interval;
            }
            config.validate()?;
            cmd_run(&input, &output_dir, ply, no_render, &config)
        }
        Commands::Sort { input, output } => {
            config.validate()?;
            cmd_sort(&input, &output, &config)
        }
        Commands::Smooth {
            input,
            output,
            window,
            order,
        } => {
            apply_smoothing_overrides(&mut config, window, order);
            config.validate()?;
            cmd_smooth(&input, &output, &config)
        }
        Commands::Render {
            input,
            output,
            animate,
            max_frames,
            title,
        } => {
            if let Some(frames) = max_frames {
                config.output.max_frames = frames;
            }
            config.validate()?;
            cmd_render(&input, output, animate, title, &config)
        }
        Commands::InitConfig { path } => cmd_init_config(&path),
    }
}

fn run_with_spinner(input: &Path, config: &PipelineConfig) -> Result<PipelineOutput> {
    let spinner = create_spinner("Loading, sorting and smoothing point cloud...");
    let result = run_pipeline(input, config)
        .with_context(|| format!("Pipeline failed for {}", input.display()));
    spinner.finish_and_clear();
    result
}

fn cmd_run(
    input: &Path,
    output_dir: &Path,
    ply: bool,
    no_render: bool,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();

    println!("Running path pipeline...");
    println!("Input: {}", input.display());
    println!("Output directory: {}", output_dir.display());
    println!(
        "Smoothing: window {}, order {}",
        config.smoothing.window_size, config.smoothing.polynomial_order
    );

    let output = run_with_spinner(input, config)?;

    let sorted_path = output_dir.join("sorted.csv");
    let smoothed_path = output_dir.join("smoothed.csv");
    let downsampled_path = output_dir.join("downsampled.csv");
    let downsampled = output.downsampled_sorted(config.output.downsample_interval);

    writers::write_points_csv(&sorted_path, &output.sorted)?;
    writers::write_channels_csv(&smoothed_path, &output.smoothed)?;
    writers::write_points_csv(&downsampled_path, &downsampled)?;

    if ply {
        writers::write_ply(&output_dir.join("raw.ply"), &output.raw, SeriesKind::Raw.rgb())?;
        writers::write_ply(&output_dir.join("sorted.ply"), &output.sorted, SeriesKind::Sorted.rgb())?;
        writers::write_ply(
            &output_dir.join("smoothed.ply"),
            &output.smoothed_cloud(),
            SeriesKind::Smoothed.rgb(),
        )?;
    }

    let mut rendered = "skipped".to_string();
    if !no_render {
        let view = SeriesView::from_output(&output);
        let options = RenderOptions::from_config(&config.output);
        let spinner = create_spinner("Rendering comparison...");

        let png = output_dir.join("comparison.png");
        let gif = output_dir.join("animation.gif");
        let result = visualization::plot_comparison(&png, &view, &options)
            .and_then(|()| visualization::animate_comparison(&gif, &view, &options));
        spinner.finish_and_clear();

        // Exports are already on disk, so a rendering failure is not fatal
        rendered = match result {
            Ok(frames) => format!("comparison.png, animation.gif ({} frames)", frames),
            Err(e) => {
                warn!("Rendering failed: {}", e);
                "failed".to_string()
            }
        };
    }

    print_summary(
        "Path Pipeline Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Points kept", output.raw.len().to_string()),
            (
                "Origin",
                format!("({:.4}, {:.4})", output.origin.x, output.origin.y),
            ),
            ("Sorted CSV", sorted_path.display().to_string()),
            ("Smoothed CSV", smoothed_path.display().to_string()),
            ("Downsampled points", downsampled.len().to_string()),
            ("Rendering", rendered),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_sort(input: &Path, output_path: &Path, config: &PipelineConfig) -> Result<()> {
    use crate::core::loaders::load_filtered_csv;
    use crate::processors::sorting::{sort_from_first_point, ReferenceVector};

    let start = Instant::now();

    let spinner = create_spinner("Sorting point cloud...");
    let cloud = load_filtered_csv(input, &config.bounds, &config.input);
    spinner.finish_and_clear();
    let cloud = cloud.with_context(|| format!("Failed to load {}", input.display()))?;

    let reference = ReferenceVector::try_from(config.sorting.reference)?;
    let (origin, sorted) = sort_from_first_point(&cloud, reference)?;

    writers::write_points_csv(output_path, &sorted)?;

    print_summary(
        "Sort Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Output file", output_path.display().to_string()),
            ("Points sorted", sorted.len().to_string()),
            ("Origin", format!("({:.4}, {:.4})", origin.x, origin.y)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_smooth(input: &Path, output_path: &Path, config: &PipelineConfig) -> Result<()> {
    let start = Instant::now();

    let output = run_with_spinner(input, config)?;
    writers::write_channels_csv(output_path, &output.smoothed)?;

    print_summary(
        "Smoothing Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Output file", output_path.display().to_string()),
            ("Points smoothed", output.smoothed.len().to_string()),
            ("Window size", config.smoothing.window_size.to_string()),
            ("Polynomial order", config.smoothing.polynomial_order.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_render(
    input: &Path,
    output: Option<PathBuf>,
    animate: Option<PathBuf>,
    title: Option<String>,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();

    // Default output path is the input name with a .png extension
    let output_path = output.unwrap_or_else(|| input.with_extension("png"));

    let mut options = RenderOptions::from_config(&config.output);
    if let Some(title) = title {
        options.title = title;
    }

    let result = run_with_spinner(input, config)?;
    let view = SeriesView::from_output(&result);

    let spinner = create_spinner("Generating plot...");
    let plotted = visualization::plot_comparison(&output_path, &view, &options);
    spinner.finish_and_clear();
    plotted.context("Visualization failed")?;

    let mut items = vec![
        ("Input file", input.display().to_string()),
        ("Output PNG", output_path.display().to_string()),
        ("Points in cloud", result.raw.len().to_string()),
    ];

    if let Some(gif_path) = animate {
        let spinner = create_spinner("Rendering animation...");
        let frames = visualization::animate_comparison(&gif_path, &view, &options);
        spinner.finish_and_clear();
        let frames = frames.context("Animation failed")?;

        items.push(("Output GIF", gif_path.display().to_string()));
        items.push(("Frames", frames.to_string()));
    }

    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Visualization Complete", &items);

    Ok(())
}

fn cmd_init_config(path: &Path) -> Result<()> {
    PipelineConfig::default()
        .to_yaml(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    println!("Default configuration written to {}", path.display());
    Ok(())
}
