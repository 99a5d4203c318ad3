//! Command dispatch: one handler per subcommand

use std::io;
use std::path::Path;

use clap::CommandFactory;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::spring::FRAME_SECONDS;
use crate::application::{ApplicationError, Scene, TreeView};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::NodeKey;
use crate::infrastructure::{load_values, InfraError};
use crate::util::path::expand_path;

/// Frame cap for commands that run the animation to rest.
pub const SETTLE_FRAMES: usize = 10_000;

#[derive(Debug, Serialize)]
struct NodePosition<'a> {
    key: &'a NodeKey,
    label: Option<&'a str>,
    depth: usize,
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct Frame<'a> {
    frame: usize,
    animating: bool,
    scene: &'a Scene,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `springtree --help`".into(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "springtree", &mut io::stdout());
        return Ok(());
    }

    let local = cli.config.as_deref().map(expand_path);
    let settings = Settings::load(local.as_deref())?;
    debug!(?settings, "settings loaded");

    match command {
        Commands::Tree { file } => cmd_tree(&settings, file),
        Commands::Layout {
            file,
            width,
            height,
            json,
        } => cmd_layout(&settings, file, *width, *height, *json),
        Commands::Scene {
            file,
            select,
            frames,
        } => cmd_scene(&settings, file, select.as_deref(), *frames),
        Commands::Animate {
            from,
            to,
            select,
            fps,
            max_frames,
        } => cmd_animate(&settings, from, to, select.as_deref(), *fps, *max_frames),
        Commands::Config { command } => cmd_config(&settings, local.as_deref(), command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn load_view(settings: &Settings, file: &Path) -> CliResult<TreeView> {
    let mut view = TreeView::new(settings.view_options())?;
    let values = load_values(&expand_path(file))?;
    view.set_values(&values)?;
    Ok(view)
}

fn to_json<T: Serialize>(value: &T, pretty: bool, context: &str) -> CliResult<String> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| {
        CliError::Infra(InfraError::Json {
            context: context.to_string(),
            source: e,
        })
    })
}

#[instrument(skip(settings))]
fn cmd_tree(settings: &Settings, file: &Path) -> CliResult<()> {
    let view = load_view(settings, file)?;
    match view.hierarchy() {
        Some(hierarchy) => {
            output::info(hierarchy.render_tree(hierarchy.root()).trim_end());
            Ok(())
        }
        None => {
            output::warning("no records");
            Ok(())
        }
    }
}

#[instrument(skip(settings))]
fn cmd_layout(
    settings: &Settings,
    file: &Path,
    width: Option<f64>,
    height: Option<f64>,
    json: bool,
) -> CliResult<()> {
    let mut settings = settings.clone();
    if let Some(width) = width {
        settings.view.width = width;
    }
    if let Some(height) = height {
        settings.view.height = height;
    }
    let view = load_view(&settings, file)?;
    let Some(hierarchy) = view.hierarchy() else {
        output::warning("no records");
        return Ok(());
    };

    let mut positions = Vec::with_capacity(hierarchy.len());
    for (_, node) in hierarchy.iter() {
        let point = node
            .position
            .ok_or(ApplicationError::NotLaidOut)?
            .transposed();
        positions.push(NodePosition {
            key: &node.key,
            label: node.label.as_deref(),
            depth: node.depth,
            x: point.x,
            y: point.y,
        });
    }

    if json {
        output::info(&to_json(&positions, true, "layout output")?);
    } else {
        output::header(&format!(
            "{} nodes, depth {}",
            hierarchy.len(),
            hierarchy.depth()
        ));
        for p in &positions {
            output::detail(&format!(
                "{}{} ({}, {})",
                "  ".repeat(p.depth),
                p.label
                    .filter(|label| !label.is_empty())
                    .unwrap_or(&settings.view.default_label),
                p.x,
                p.y
            ));
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_scene(
    settings: &Settings,
    file: &Path,
    select: Option<&str>,
    frames: Option<usize>,
) -> CliResult<()> {
    let mut view = load_view(settings, file)?;
    view.select(select);
    match frames {
        Some(frames) => {
            for _ in 0..frames {
                view.tick(FRAME_SECONDS);
            }
        }
        None => {
            let used = view.settle(SETTLE_FRAMES);
            debug!(frames = used, "settled");
        }
    }
    if let Some(scene) = view.scene() {
        output::info(&to_json(&scene, true, "scene output")?);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_animate(
    settings: &Settings,
    from: &Path,
    to: &Path,
    select: Option<&str>,
    fps: f64,
    max_frames: usize,
) -> CliResult<()> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(CliError::InvalidArgs(format!(
            "fps must be a positive number, got {fps}"
        )));
    }
    let mut view = load_view(settings, from)?;
    view.settle(SETTLE_FRAMES);

    let values = load_values(&expand_path(to))?;
    view.set_values(&values)?;
    view.select(select);

    let dt = 1.0 / fps;
    let mut frame = 0;
    while view.is_animating() && frame < max_frames {
        view.tick(dt);
        frame += 1;
        if let Some(scene) = view.scene() {
            let line = Frame {
                frame,
                animating: view.is_animating(),
                scene: &scene,
            };
            output::info(&to_json(&line, false, "frame output")?);
        }
    }

    if view.is_animating() {
        output::warning(&format!("still moving after {max_frames} frames"));
    } else {
        info!(frames = frame, "animation converged");
    }
    Ok(())
}

fn cmd_config(
    settings: &Settings,
    local: Option<&Path>,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::field("global", &format!("{}{}", path.display(), state));
                }
                None => output::field("global", "no config directory on this platform"),
            }
            match local {
                Some(path) => output::field("local", &path.display()),
                None => output::field("local", "none (use --config)"),
            }
        }
    }
    Ok(())
}
