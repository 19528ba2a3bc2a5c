// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! floorplan-to-obj - build a floorplan scene description and export it as OBJ.
//!
//! ```text
//! floorplan-to-obj <scene.json> [--output path] [--exploded factor] [--hide-floor id]...
//! ```
//!
//! Without `--output` the OBJ is written to stdout. Logging goes to stderr and
//! follows `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use floorplan_model::SceneDescription;
use floorplan_scene::{write_obj, FloorplanScene};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    exploded: f64,
    hidden_floors: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut output = None;
    let mut exploded = 0.0;
    let mut hidden_floors = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                output = Some(PathBuf::from(args.next().context("--output needs a path")?));
            }
            "--exploded" => {
                let value = args.next().context("--exploded needs a factor")?;
                exploded = value
                    .parse()
                    .with_context(|| format!("invalid exploded factor '{}'", value))?;
            }
            "--hide-floor" => {
                hidden_floors.push(args.next().context("--hide-floor needs a floor id")?);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            path => {
                if input.replace(PathBuf::from(path)).is_some() {
                    bail!("only one input file is supported");
                }
            }
        }
    }

    Ok(Args {
        input: input.context(
            "usage: floorplan-to-obj <scene.json> [--output path] [--exploded f] [--hide-floor id]...",
        )?,
        output,
        exploded,
        hidden_floors,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let args = parse_args()?;

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let description = SceneDescription::from_json(&json)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let (mut scene, report) = FloorplanScene::from_description(&description)
        .with_context(|| format!("failed to build {}", args.input.display()))?;
    for warning in &report.warnings {
        tracing::warn!(kind = ?warning.kind, floor = ?warning.floor, "{}", warning.message);
    }

    scene.set_exploded_view(args.exploded);
    for floor in &args.hidden_floors {
        scene.set_floor_visible(floor, false)?;
    }

    let stats = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            let stats = write_obj(&scene, &mut out)?;
            out.flush()?;
            stats
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let stats = write_obj(&scene, &mut out)?;
            out.flush()?;
            stats
        }
    };

    tracing::info!(
        objects = stats.objects,
        vertices = stats.vertices,
        triangles = stats.triangles,
        warnings = report.warnings.len(),
        "OBJ written"
    );
    Ok(())
}
