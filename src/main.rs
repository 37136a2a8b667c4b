// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use eikonal_fmm::io;
use eikonal_fmm::{signed_distance, unsigned_distance, Algorithm, SpeedField};

#[derive(Parser)]
#[command(name = "eikonal-fmm", about = "Fast Marching Method distance solver")]
struct Cli {
    /// Dimensionality (2 or 3)
    #[arg(short = 'd', long)]
    dim: usize,

    /// Grid size, comma-separated (e.g., 256,256 or 128,128,128)
    #[arg(short = 's', long)]
    size: String,

    /// Grid spacing: one value for all axes or comma-separated per axis
    #[arg(long, default_value = "1.0")]
    spacing: String,

    /// Speed field: "uniform:<val>", "speed-file:<path>", or
    /// "slowness-file:<path>"
    #[arg(long, default_value = "uniform:1.0")]
    speed: String,

    /// Seed cell as "i,j[,k]:distance" (repeatable)
    #[arg(long = "seed", num_args = 1)]
    seeds: Vec<String>,

    /// Compute signed distances (seed signs mark inside/outside)
    #[arg(long)]
    signed: bool,

    /// Discretization order: "first" or "high"
    #[arg(long, default_value = "first")]
    order: String,

    /// Output file path (.npy or .mat)
    #[arg(short = 'o', long, default_value = "distance.npy")]
    output: PathBuf,
}

fn parse_size(s: &str, dim: usize) -> Result<Vec<usize>> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("invalid --size: expected comma-separated integers")?;
    if parts.len() != dim {
        bail!("--size has {} components but --dim is {}", parts.len(), dim);
    }
    Ok(parts)
}

fn parse_spacing(s: &str, dim: usize) -> Result<Vec<f64>> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("invalid --spacing: expected comma-separated floats")?;
    if parts.len() == 1 {
        return Ok(vec![parts[0]; dim]);
    }
    if parts.len() != dim {
        bail!(
            "--spacing has {} components but --dim is {}",
            parts.len(),
            dim
        );
    }
    Ok(parts)
}

/// Parses one "--seed i,j[,k]:distance" argument.
fn parse_seed(s: &str, dim: usize) -> Result<(Vec<i32>, f64)> {
    let (index_str, distance_str) = s
        .rsplit_once(':')
        .with_context(|| format!("invalid --seed '{}': expected 'i,j[,k]:distance'", s))?;
    let index: Vec<i32> = index_str
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid --seed index in '{}'", s))?;
    if index.len() != dim {
        bail!(
            "--seed '{}' has {} index components but --dim is {}",
            s,
            index.len(),
            dim
        );
    }
    let distance: f64 = distance_str
        .trim()
        .parse()
        .with_context(|| format!("invalid --seed distance in '{}'", s))?;
    Ok((index, distance))
}

enum SpeedMode {
    Uniform(f64),
    Buffer(Vec<f64>),
}

fn build_speed_mode(mode: &str, shape: &[usize]) -> Result<SpeedMode> {
    if let Some(val_str) = mode.strip_prefix("uniform:") {
        let val: f64 = val_str.parse().context("invalid uniform speed value")?;
        return Ok(SpeedMode::Uniform(val));
    }
    if let Some(path_str) = mode.strip_prefix("speed-file:") {
        let buffer = io::load_speed(Path::new(path_str), shape)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        return Ok(SpeedMode::Buffer(buffer));
    }
    if let Some(path_str) = mode.strip_prefix("slowness-file:") {
        let buffer = io::load_slowness_as_speed(Path::new(path_str), shape)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        return Ok(SpeedMode::Buffer(buffer));
    }
    bail!(
        "unknown --speed mode: '{}'. Expected 'uniform:<val>', 'speed-file:<path>', \
         or 'slowness-file:<path>'",
        mode
    );
}

fn parse_order(s: &str) -> Result<Algorithm> {
    match s {
        "first" => Ok(Algorithm::FirstOrder),
        "high" => Ok(Algorithm::HighOrder),
        other => bail!("--order must be 'first' or 'high', got '{}'", other),
    }
}

fn run<const N: usize>(cli: &Cli, size: Vec<usize>, spacing: Vec<f64>) -> Result<()> {
    let mut grid_size = [0usize; N];
    grid_size.copy_from_slice(&size);
    let mut grid_spacing = [0f64; N];
    grid_spacing.copy_from_slice(&spacing);

    let mut seed_indices: Vec<[i32; N]> = Vec::new();
    let mut seed_distances: Vec<f64> = Vec::new();
    for seed_str in &cli.seeds {
        let (index, distance) = parse_seed(seed_str, N)?;
        let mut seed = [0i32; N];
        seed.copy_from_slice(&index);
        seed_indices.push(seed);
        seed_distances.push(distance);
    }

    let speed_mode = build_speed_mode(&cli.speed, &size)?;
    let speed = match &speed_mode {
        SpeedMode::Uniform(v) => SpeedField::Uniform(*v),
        SpeedMode::Buffer(buffer) => SpeedField::Varying(buffer),
    };
    let algorithm = parse_order(&cli.order)?;

    let buffer = if cli.signed {
        signed_distance(
            grid_size,
            grid_spacing,
            speed,
            &seed_indices,
            &seed_distances,
            algorithm,
        )
    } else {
        unsigned_distance(
            grid_size,
            grid_spacing,
            speed,
            &seed_indices,
            &seed_distances,
            algorithm,
        )
    }
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    io::save_distance(&size, &buffer, &cli.output).map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.dim != 2 && cli.dim != 3 {
        bail!("--dim must be 2 or 3, got {}", cli.dim);
    }
    if cli.seeds.is_empty() {
        bail!("at least one --seed must be specified");
    }

    let size = parse_size(&cli.size, cli.dim)?;
    let spacing = parse_spacing(&cli.spacing, cli.dim)?;

    match cli.dim {
        2 => run::<2>(&cli, size, spacing),
        3 => run::<3>(&cli, size, spacing),
        _ => unreachable!(),
    }
}
