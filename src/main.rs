use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn, LevelFilter};

mod raytracing;
use raytracing::core::MAX_REFLECTIONS;
use raytracing::parser::{ImageData, SceneParser};

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// scene files or directories searched recursively for `.json` scenes
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// number of render threads, 0 uses one per core
    #[arg(short, long, default_value_t = 0)]
    threads: usize,
    /// how many times a ray may bounce off reflective surfaces
    #[arg(long, default_value_t = MAX_REFLECTIONS)]
    max_reflections: u32,
    /// logging level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn collect_scenes(path: &Path, scenes: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if path.is_dir() {
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        for entry in entries {
            collect_scenes(&entry, scenes)?;
        }
    } else if path.extension().is_some_and(|ext| ext == "json") {
        scenes.push(path.to_path_buf());
    }
    Ok(())
}

fn render_scene(path: &Path, args: &Args) -> Result<PathBuf, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let parser = SceneParser::new(&content);
    let ImageData {
        width,
        height,
        mut camera,
        scene,
    } = parser.parse_scene().map_err(|parser_error| {
        if let Some(location) = parser_error.error_location(&content) {
            error!("{}:\n{}", path.display(), location);
        }
        parser_error
    })?;

    info!(
        "Rendering scene (using {} lens) from: {}",
        camera.lens_name(),
        path.display()
    );
    debug!(
        "{}x{} image, {} objects, ambient light {:?}",
        width,
        height,
        scene.object_count(),
        scene.ambient_light()
    );
    camera.render(&scene, args.max_reflections, args.threads)?;

    let output = path.with_extension("png");
    camera.save(&output)?;
    Ok(output)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    let mut scenes = Vec::new();
    for path in &args.paths {
        if let Err(e) = collect_scenes(path, &mut scenes) {
            error!("unable to read {}: {}", path.display(), e);
        }
    }
    if scenes.is_empty() {
        warn!("no scene files found");
    }

    let mut rendered = 0;
    for scene in &scenes {
        match render_scene(scene, &args) {
            Ok(output) => {
                info!("Saved {}", output.display());
                rendered += 1;
            }
            Err(e) => error!("Failed to render {}: {}", scene.display(), e),
        }
    }
    info!("Rendered {} of {} scenes", rendered, scenes.len());
    Ok(())
}
