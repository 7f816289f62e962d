// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


// Runs the air-hockey scene against the headless device and prints what a
// GPU would have been asked to do.
// Run with: cargo run -p rink-sandbox -- --mode textured --frames 2

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rink_core::renderer::{GraphicsDevice, RenderMode, SceneConfig, SurfaceRenderer};
use rink_infra::graphics::headless::{DeviceCommand, HeadlessDevice};
use rink_lanes::render_lane::SceneRenderer;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Flat,
    Uniform,
    Textured,
    Perspective,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Flat => RenderMode::FlatColor,
            Mode::Uniform => RenderMode::UniformColor,
            Mode::Textured => RenderMode::Textured,
            Mode::Perspective => RenderMode::Perspective,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Scene configuration file (TOML). Command-line flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rendering mode.
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Surface width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Number of frames to render.
    #[arg(long)]
    frames: Option<u32>,

    /// Lose and recreate the surface halfway through.
    #[arg(long)]
    recreate: bool,

    /// Skip the puck.
    #[arg(long)]
    no_puck: bool,
}

/// The run section of a configuration file.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RunSettings {
    width: u32,
    height: u32,
    frames: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frames: 3,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SandboxFile {
    run: RunSettings,
    scene: SceneConfig,
}

fn load_file(path: &Path) -> Result<SandboxFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file at '{}'", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
}

fn render_frames(
    renderer: &mut SceneRenderer,
    device: &mut HeadlessDevice,
    frames: u32,
) -> Result<()> {
    for _ in 0..frames {
        device.clear_commands();
        renderer.on_frame_requested(device)?;

        let stats = renderer.last_frame_stats();
        log::info!(
            "Frame {}: {} draw calls, {} vertices",
            stats.frame_number,
            stats.draw_calls,
            stats.vertices
        );
        for command in device.commands() {
            match command {
                DeviceCommand::UseProgram(program) => log::info!("  use {program:?}"),
                DeviceCommand::Draw(call) => log::info!(
                    "  draw {:?} first={} count={}",
                    call.topology,
                    call.first,
                    call.count
                ),
                other => log::debug!("  {other:?}"),
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut file = match &args.config {
        Some(path) => load_file(path)?,
        None => SandboxFile::default(),
    };
    if let Some(mode) = args.mode {
        file.scene.mode = mode.into();
    }
    if args.no_puck {
        file.scene.draw_puck = false;
    }
    let width = args.width.unwrap_or(file.run.width);
    let height = args.height.unwrap_or(file.run.height);
    let frames = args.frames.unwrap_or(file.run.frames);

    let mut device = HeadlessDevice::new();
    let info = device.adapter_info();
    log::info!("Using {} ({})", info.name, info.version);

    let mut renderer = SceneRenderer::new(file.scene);
    renderer.on_surface_created(&mut device)?;
    renderer.on_viewport_resized(&mut device, width, height);

    if args.recreate {
        let before = frames / 2;
        render_frames(&mut renderer, &mut device, before)?;

        log::info!("Simulating surface loss");
        device.simulate_context_loss();
        renderer.on_surface_created(&mut device)?;
        renderer.on_viewport_resized(&mut device, width, height);
        render_frames(&mut renderer, &mut device, frames - before)?;
    } else {
        render_frames(&mut renderer, &mut device, frames)?;
    }

    renderer.release(&mut device)?;
    log::info!("Done: {} live programs left", device.live_program_count());
    Ok(())
}
