use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facematch_core::{
    Encoder, EuclideanMatcher, ManifestEncoder, MatchError, Matcher, Registry, Renderer, Report,
};
use facematch_render::ImageRenderer;
use image::Rgb;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod locate;

use config::Config;

#[derive(Parser)]
#[command(name = "facematch", about = "Find known people in a group photo")]
struct Cli {
    /// TOML configuration file (FACEMATCH_* variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match the faces in a target image against reference identities
    Match {
        /// Reference identity as NAME=IMAGE (repeatable)
        #[arg(short, long = "reference", value_name = "NAME=IMAGE", required = true, value_parser = parse_reference)]
        references: Vec<(String, String)>,
        /// Image to search; a bare file name is looked up under the search root
        target: String,
        /// Where to write the annotated image (default: <target>_annotated.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip writing the annotated image
        #[arg(long, conflicts_with = "output")]
        no_image: bool,
        /// Override the distance threshold
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find an image by file name under the search root
    Locate {
        name: String,
    },
    /// List the faces the encoder reports for an image
    Inspect {
        image: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Match {
            references,
            target,
            output,
            no_image,
            threshold,
            json,
        } => {
            let threshold = threshold.unwrap_or(config.threshold);
            let image_output = if no_image {
                ImageOutput::Skip
            } else {
                output.map_or(ImageOutput::NextToTarget, ImageOutput::Path)
            };
            run_match(&config, &references, &target, threshold, image_output, json)?;
        }
        Commands::Locate { name } => {
            let path = find(&config, &name)?;
            println!("{}", path.display());
        }
        Commands::Inspect { image } => {
            let path = find(&config, &image)?;
            let faces = manifest_encoder(&config).encode(&path)?;
            println!("{}: {} face(s)", path.display(), faces.len());
            for (i, face) in faces.iter().enumerate() {
                println!(
                    "  face {i}: {} ({}-dim encoding)",
                    face.bounding_box,
                    face.encoding.dimension()
                );
            }
        }
    }

    Ok(())
}

/// Where the annotated copy of the target goes.
enum ImageOutput {
    Skip,
    NextToTarget,
    Path(PathBuf),
}

fn run_match(
    config: &Config,
    references: &[(String, String)],
    target: &str,
    threshold: f32,
    image_output: ImageOutput,
    json: bool,
) -> Result<()> {
    let matcher = EuclideanMatcher::with_threshold(threshold)?;
    let mut encoder = manifest_encoder(config);

    let mut registry = Registry::new();
    for (name, file) in references {
        let path = find(config, file)?;
        let faces = encoder
            .encode(&path)
            .with_context(|| format!("encoding reference image for {name}"))?;
        let index = registry.add_from_faces(name.as_str(), faces)?;
        tracing::info!(index, name = %name, path = %path.display(), "reference loaded");
    }
    if registry.is_empty() {
        bail!(MatchError::EmptyRegistry);
    }

    let target_path = find(config, target)?;
    let faces = encoder
        .encode(&target_path)
        .context("encoding target image")?;
    tracing::info!(path = %target_path.display(), faces = faces.len(), "target encoded");

    let outcome = matcher.match_all(&registry, &faces)?;
    let report = Report::new(&outcome, &faces);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
        if !report.skipped_faces.is_empty() {
            println!("skipped {} face(s) with incompatible encodings", report.skipped_faces.len());
        }
    }

    let output = match image_output {
        ImageOutput::Skip => None,
        ImageOutput::NextToTarget => Some(default_output_path(&target_path)),
        ImageOutput::Path(path) => Some(path),
    };
    if let Some(output) = output {
        let renderer = ImageRenderer {
            color: Rgb(config.box_color),
            thickness: config.box_thickness,
            label_scale: config.label_scale,
        };
        renderer
            .render(&target_path, &report.matches, &output)
            .context("writing annotated image")?;
        if !json {
            println!("annotated image: {}", output.display());
        }
    }

    Ok(())
}

fn manifest_encoder(config: &Config) -> ManifestEncoder {
    match &config.manifest_dir {
        Some(dir) => ManifestEncoder::with_manifest_dir(dir),
        None => ManifestEncoder::new(),
    }
}

fn find(config: &Config, name: &str) -> Result<PathBuf> {
    match locate::resolve(name, &config.search_root) {
        Some(path) => {
            tracing::debug!(name, path = %path.display(), "image located");
            Ok(path)
        }
        None => bail!(
            "image {name:?} not found (searched {})",
            config.search_root.display()
        ),
    }
}

fn parse_reference(raw: &str) -> Result<(String, String), String> {
    let (name, file) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=IMAGE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() || file.trim().is_empty() {
        return Err(format!("expected NAME=IMAGE, got {raw:?}"));
    }
    Ok((name.to_string(), file.trim().to_string()))
}

/// `party.jpg` → `party_annotated.jpg` in the same directory.
fn default_output_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = target
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    target.with_file_name(format!("{stem}_annotated.{ext}"))
}
