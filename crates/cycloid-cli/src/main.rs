//! cycloid CLI - cycloidal-disc profile generator
//!
//! Derives drive geometry from nominal dimensions and prints adaptively
//! sampled lobe profiles or full rotor outlines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cycloid_math::Point2;
use cycloid_profile::{
    sample_half_lobe, DriveGeometry, LobeProfile, ProfileConfig, RotorOptions, RotorPlacement,
    SamplerSettings,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cycloid")]
#[command(about = "Cycloidal-disc lobe profile generator", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of ring-gear pins
    #[arg(long, global = true)]
    pins: Option<u32>,

    /// Override the nominal rotor diameter
    #[arg(long, global = true)]
    diameter: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the derived drive geometry
    Info,
    /// Print the sampled profile of one lobe
    Sample {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Print the closed outline of a full rotor
    Outline {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Which of the two opposing rotors to place
        #[arg(long, value_enum)]
        placement: Option<Placement>,
    },
    /// Print the effective configuration as TOML
    InitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Placement {
    Primary,
    Inverted,
}

#[derive(Serialize)]
struct SampleRow {
    theta: f64,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct OutlineRow {
    x: f64,
    y: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = load_config(&cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Info => {
            let (geometry, _) = config.resolve().context("invalid drive configuration")?;
            write_info(&mut out, &geometry)?;
        }
        Commands::Sample { format } => {
            let (geometry, settings) = config.resolve().context("invalid drive configuration")?;
            let profile = sample(&geometry, &settings)?;
            write_samples(&mut out, &profile, format)?;
        }
        Commands::Outline { format, placement } => {
            let (geometry, settings) = config.resolve().context("invalid drive configuration")?;
            let profile = sample(&geometry, &settings)?;
            let outline = place_outline(profile.rotor_outline(), &geometry, placement);
            write_outline(&mut out, &outline, format)?;
        }
        Commands::InitConfig => {
            let toml = config.to_toml_string()?;
            out.write_all(toml.as_bytes())?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(verbosity_level(verbose).into()));

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(())
}

fn verbosity_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn load_config(cli: &Cli) -> Result<ProfileConfig> {
    let mut config = match &cli.config {
        Some(path) => ProfileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ProfileConfig::default(),
    };
    apply_overrides(&mut config, cli.pins, cli.diameter);
    Ok(config)
}

fn apply_overrides(config: &mut ProfileConfig, pins: Option<u32>, diameter: Option<f64>) {
    if let Some(pins) = pins {
        config.drive.pin_count = pins;
    }
    if let Some(diameter) = diameter {
        config.drive.rotor_diameter = diameter;
    }
}

fn sample(geometry: &DriveGeometry, settings: &SamplerSettings) -> Result<LobeProfile> {
    sample_half_lobe(geometry, settings, geometry.lobe_count()).with_context(|| {
        format!(
            "failed to sample lobe profile for {} pins, major radius {}",
            geometry.pin_count(),
            geometry.major_radius()
        )
    })
}

fn place_outline(
    outline: Vec<Point2>,
    geometry: &DriveGeometry,
    placement: Option<Placement>,
) -> Vec<Point2> {
    let placement = match placement {
        Some(Placement::Primary) => RotorPlacement::primary(geometry),
        Some(Placement::Inverted) => {
            RotorPlacement::inverted(geometry, RotorOptions::default().stack_offset())
        }
        None => return outline,
    };
    let transform = placement.transform();
    outline.iter().map(|p| transform.apply_point(p)).collect()
}

fn write_info(out: &mut impl Write, geometry: &DriveGeometry) -> Result<()> {
    writeln!(out, "Drive geometry")?;
    writeln!(out, "  Major radius:    {}", geometry.major_radius())?;
    writeln!(out, "  Pins:            {}", geometry.pin_count())?;
    writeln!(out, "  Pin radius:      {}", geometry.pin_radius())?;
    writeln!(out, "  Eccentricity:    {}", geometry.eccentricity())?;
    writeln!(out, "  Lobes:           {}", geometry.lobe_count())?;
    writeln!(out, "  Reduction ratio: {}", geometry.reduction_ratio())?;
    writeln!(out, "  Lobe angle:      {}", geometry.full_lobe_angle())?;
    Ok(())
}

fn write_samples(out: &mut impl Write, profile: &LobeProfile, format: Format) -> Result<()> {
    let rows: Vec<SampleRow> = profile
        .samples()
        .iter()
        .map(|s| SampleRow {
            theta: s.theta,
            x: s.point.x,
            y: s.point.y,
        })
        .collect();

    match format {
        Format::Csv => {
            writeln!(out, "theta,x,y")?;
            for row in &rows {
                writeln!(out, "{},{},{}", row.theta, row.x, row.y)?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_outline(out: &mut impl Write, outline: &[Point2], format: Format) -> Result<()> {
    match format {
        Format::Csv => {
            writeln!(out, "x,y")?;
            for p in outline {
                writeln!(out, "{},{}", p.x, p.y)?;
            }
        }
        Format::Json => {
            let rows: Vec<OutlineRow> = outline
                .iter()
                .map(|p| OutlineRow { x: p.x, y: p.y })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycloid_profile::DriveSpec;

    fn reference() -> (DriveGeometry, SamplerSettings) {
        ProfileConfig::default().resolve().unwrap()
    }

    #[test]
    fn test_parse_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from(["cycloid", "sample", "--pins", "12", "-vv"]).unwrap();
        assert_eq!(cli.pins, Some(12));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Sample { format: Format::Csv }));
    }

    #[test]
    fn test_parse_outline_options() {
        let cli = Cli::try_parse_from([
            "cycloid",
            "--diameter",
            "60",
            "outline",
            "--format",
            "json",
            "--placement",
            "inverted",
        ])
        .unwrap();
        assert_eq!(cli.diameter, Some(60.0));
        assert!(matches!(
            cli.command,
            Commands::Outline {
                format: Format::Json,
                placement: Some(Placement::Inverted),
            }
        ));
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["cycloid"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity_level(0), tracing::Level::WARN);
        assert_eq!(verbosity_level(1), tracing::Level::INFO);
        assert_eq!(verbosity_level(2), tracing::Level::DEBUG);
        assert_eq!(verbosity_level(3), tracing::Level::TRACE);
        assert_eq!(verbosity_level(9), tracing::Level::TRACE);
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = ProfileConfig::default();
        apply_overrides(&mut config, Some(12), None);
        assert_eq!(config.drive, DriveSpec::new(5.1, 12));

        apply_overrides(&mut config, None, Some(60.0));
        assert_eq!(config.drive, DriveSpec::new(60.0, 12));
    }

    #[test]
    fn test_csv_samples() {
        let (geometry, settings) = reference();
        let profile = sample(&geometry, &settings).unwrap();

        let mut buf = Vec::new();
        write_samples(&mut buf, &profile, Format::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "theta,x,y");
        assert_eq!(lines.len(), profile.len() + 1);
        assert!(lines[1].starts_with("0,"));
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 3);
        }
    }

    #[test]
    fn test_json_samples() {
        let (geometry, settings) = reference();
        let profile = sample(&geometry, &settings).unwrap();

        let mut buf = Vec::new();
        write_samples(&mut buf, &profile, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();

        assert_eq!(rows.len(), profile.len());
        assert_eq!(rows[0]["theta"], 0.0);
        let last = rows.last().unwrap()["theta"].as_f64().unwrap();
        assert!((last - geometry.full_lobe_angle()).abs() < 1e-12);
    }

    #[test]
    fn test_outline_csv_row_count() {
        let (geometry, settings) = reference();
        let profile = sample(&geometry, &settings).unwrap();
        let outline = place_outline(profile.rotor_outline(), &geometry, None);

        let mut buf = Vec::new();
        write_outline(&mut buf, &outline, Format::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let expected = geometry.lobe_count() as usize * (profile.len() - 1);
        assert_eq!(text.lines().count(), expected + 1);
    }

    #[test]
    fn test_inverted_placement_shifts_outline() {
        let (geometry, settings) = reference();
        let profile = sample(&geometry, &settings).unwrap();
        let outline = profile.rotor_outline();
        let placed = place_outline(outline.clone(), &geometry, Some(Placement::Inverted));

        assert_eq!(placed.len(), outline.len());
        let transform = RotorPlacement::inverted(&geometry, 0.6).transform();
        let expected = transform.apply_point(&outline[0]);
        assert!((placed[0] - expected).norm() < 1e-12);
        assert!((placed[0] - outline[0]).norm() > geometry.eccentricity() / 2.0);
    }

    #[test]
    fn test_info_lists_lobes_and_ratio() {
        let (geometry, _) = reference();
        let mut buf = Vec::new();
        write_info(&mut buf, &geometry).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Lobes:           39"));
        assert!(text.contains("Pins:            40"));
    }
}
