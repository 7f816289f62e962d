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

//! The renderer driven by the host's surface lifecycle.

use super::drawables::{
    upload_scene_vertices, DrawSummary, Drawable, Mallet, Puck, Table, BLUE_MALLET_INDEX,
    RED_MALLET_INDEX,
};
use super::program::{
    ColorShaderProgram, ColorSource, ShaderProgram, TextureShaderProgram, VertexInputs,
    U_MATRIX, U_TEXTURE_UNIT,
};
use super::shaders::EmbeddedShaderSources;
use super::state::PipelineState;
use super::texture::{TextureData, TABLE_TEXTURE_SIZE};
use super::transform::TransformPipeline;
use super::vertex_array::VertexArray;
use rink_core::math::{LinearRgba, Mat4};
use rink_core::renderer::{
    AttributeSlot, BufferId, FrameStats, GraphicsDevice, ProgramId, RenderError, RenderMode,
    ResourceError, SceneConfig, ShaderSourceProvider, SurfaceRenderer, TextureId, UniformSlot,
    Viewport,
};
use std::fmt;
use std::rc::Rc;

/// Where the renderer is in the surface lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// No surface yet, or the last surface failed to initialize.
    Uninitialized,
    /// Programs and buffers exist; the viewport is not known yet.
    Ready,
    /// The viewport is known; the next frame will render.
    Sized,
    /// At least one frame was rendered on this surface.
    Rendering,
}

/// Every device handle and resolved location owned by the current surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneHandles {
    /// Linked programs.
    pub programs: Vec<ProgramId>,
    /// Vertex buffers.
    pub buffers: Vec<BufferId>,
    /// Textures.
    pub textures: Vec<TextureId>,
    /// Resolved attribute locations.
    pub attributes: Vec<AttributeSlot>,
    /// Resolved uniform locations.
    pub uniforms: Vec<UniformSlot>,
}

/// The textured pass: its program and the table texture.
#[derive(Debug)]
struct TexturedPass {
    program: TextureShaderProgram,
    texture: TextureId,
}

/// Everything built on surface creation.
#[derive(Debug)]
struct SceneResources {
    color_program: ColorShaderProgram,
    textured: Option<TexturedPass>,
    table: Table,
    mallets: Vec<Mallet>,
    puck: Option<Puck>,
    arrays: Vec<Rc<VertexArray>>,
}

fn record_program(handles: &mut SceneHandles, program: &ShaderProgram, inputs: &dyn VertexInputs) {
    handles.programs.push(program.id());
    handles.attributes.push(inputs.position());
    handles.attributes.extend(inputs.color());
    handles.attributes.extend(inputs.texture_coordinates());
}

/// Device objects created by a surface build that has not completed.
#[derive(Debug, Default)]
struct PendingObjects {
    programs: Vec<ProgramId>,
    textures: Vec<TextureId>,
    buffers: Vec<BufferId>,
}

impl PendingObjects {
    fn len(&self) -> usize {
        self.programs.len() + self.textures.len() + self.buffers.len()
    }

    /// Destroys everything recorded so far. Failures are logged only.
    fn release(self, device: &mut dyn GraphicsDevice) {
        let mut results = Vec::with_capacity(self.len());
        for id in self.programs {
            results.push(device.destroy_program(id));
        }
        for id in self.textures {
            results.push(device.destroy_texture(id));
        }
        for id in self.buffers {
            results.push(device.destroy_buffer(id));
        }
        for e in results.into_iter().filter_map(Result::err) {
            log::warn!("Could not release a partially built surface object: {e}");
        }
    }
}

impl SceneResources {
    /// Builds the resources for `config.mode`. On failure nothing built
    /// so far is left alive on the device.
    fn build(
        device: &mut dyn GraphicsDevice,
        sources: &dyn ShaderSourceProvider,
        config: &SceneConfig,
    ) -> Result<Self, ResourceError> {
        let mut pending = PendingObjects::default();
        let built = Self::build_tracked(device, sources, config, &mut pending);
        if let Err(e) = &built {
            log::warn!(
                "Surface setup failed ({e}); releasing {} objects created before the failure",
                pending.len()
            );
            pending.release(device);
        }
        built
    }

    fn build_tracked(
        device: &mut dyn GraphicsDevice,
        sources: &dyn ShaderSourceProvider,
        config: &SceneConfig,
        pending: &mut PendingObjects,
    ) -> Result<Self, ResourceError> {
        let validate = config.should_validate();

        match config.mode {
            RenderMode::FlatColor | RenderMode::UniformColor => {
                let color_source = if config.mode == RenderMode::FlatColor {
                    ColorSource::PerVertex
                } else {
                    ColorSource::Uniform
                };
                let color_program = ColorShaderProgram::new(device, sources, color_source, validate)?;
                pending.programs.push(color_program.id());
                let shared = upload_scene_vertices(device)?;
                pending.buffers.push(shared.buffer());

                Ok(Self {
                    color_program,
                    textured: None,
                    table: Table::with_center_line(shared.clone()),
                    mallets: vec![
                        Mallet::in_shared(shared.clone(), BLUE_MALLET_INDEX, LinearRgba::BLUE),
                        Mallet::in_shared(shared.clone(), RED_MALLET_INDEX, LinearRgba::RED),
                    ],
                    puck: config.draw_puck.then(|| Puck::in_shared(shared.clone())),
                    arrays: vec![shared],
                })
            }
            RenderMode::Textured | RenderMode::Perspective => {
                let texture_program = TextureShaderProgram::new(device, sources, validate)?;
                pending.programs.push(texture_program.id());
                let color_program =
                    ColorShaderProgram::new(device, sources, ColorSource::PerVertex, validate)?;
                pending.programs.push(color_program.id());
                let texture = TextureData::table_markings(TABLE_TEXTURE_SIZE, TABLE_TEXTURE_SIZE)
                    .upload(device)?;
                pending.textures.push(texture);

                let table = Table::textured(device)?;
                pending.buffers.push(table.shape().array().buffer());
                let mallets = Mallet::pair(device)?;
                pending.buffers.push(mallets.shape().array().buffer());
                let puck = if config.draw_puck {
                    let puck = Puck::standalone(device)?;
                    pending.buffers.push(puck.shape().array().buffer());
                    Some(puck)
                } else {
                    None
                };

                let mut arrays = vec![table.shape().array().clone(), mallets.shape().array().clone()];
                arrays.extend(puck.iter().map(|p| p.shape().array().clone()));

                Ok(Self {
                    color_program,
                    textured: Some(TexturedPass {
                        program: texture_program,
                        texture,
                    }),
                    table,
                    mallets: vec![mallets],
                    puck,
                    arrays,
                })
            }
        }
    }

    fn handles(&self) -> SceneHandles {
        let mut handles = SceneHandles::default();

        let color = &self.color_program;
        record_program(&mut handles, color.program(), color);
        handles.uniforms.push(color.matrix_uniform());
        handles.uniforms.extend(color.color_uniform());

        if let Some(pass) = &self.textured {
            let program = pass.program.program();
            record_program(&mut handles, program, &pass.program);
            handles.uniforms.extend(
                [U_MATRIX, U_TEXTURE_UNIT]
                    .iter()
                    .filter_map(|name| program.uniform(name)),
            );
            handles.textures.push(pass.texture);
        }

        handles.buffers = self.arrays.iter().map(|a| a.buffer()).collect();
        handles
    }

    fn destroy(self, device: &mut dyn GraphicsDevice) -> Result<(), ResourceError> {
        let Self {
            color_program,
            textured,
            arrays,
            ..
        } = self;
        color_program.destroy(device)?;
        if let Some(pass) = textured {
            pass.program.destroy(device)?;
            device.destroy_texture(pass.texture)?;
        }
        for array in arrays {
            array.destroy(device)?;
        }
        Ok(())
    }
}

/// Renders the air-hockey scene from the three host lifecycle events.
///
/// ```text
/// Uninitialized --surface created--> Ready --resized--> Sized --frame--> Rendering
///        ^                             |                                    |
///        +------ surface failed -------+---------- surface created ---------+
/// ```
pub struct SceneRenderer<P: ShaderSourceProvider = EmbeddedShaderSources> {
    config: SceneConfig,
    sources: P,
    state: SceneState,
    resources: Option<SceneResources>,
    transform: TransformPipeline,
    pipeline: PipelineState,
    stats: FrameStats,
    frames_rendered: u64,
}

impl SceneRenderer<EmbeddedShaderSources> {
    /// Creates a renderer using the embedded GLSL sources.
    pub fn new(config: SceneConfig) -> Self {
        Self::with_sources(config, EmbeddedShaderSources)
    }
}

impl<P: ShaderSourceProvider> SceneRenderer<P> {
    /// Creates a renderer pulling shader sources from `sources`.
    pub fn with_sources(config: SceneConfig, sources: P) -> Self {
        Self {
            transform: TransformPipeline::from_config(&config),
            config,
            sources,
            state: SceneState::Uninitialized,
            resources: None,
            pipeline: PipelineState::new(),
            stats: FrameStats::default(),
            frames_rendered: 0,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// The scene configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The transform pipeline.
    pub fn transform(&self) -> &TransformPipeline {
        &self.transform
    }

    /// The tracked pipeline state.
    pub fn pipeline_state(&self) -> &PipelineState {
        &self.pipeline
    }

    /// Handles and locations owned by the current surface, if initialized.
    pub fn handles(&self) -> Option<SceneHandles> {
        self.resources.as_ref().map(SceneResources::handles)
    }

    /// Releases every device object of the current surface.
    ///
    /// Only meaningful while the surface is still alive; after a surface loss
    /// the host has already released them.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), RenderError> {
        self.state = SceneState::Uninitialized;
        self.pipeline.reset();
        if let Some(resources) = self.resources.take() {
            resources.destroy(device)?;
            log::debug!("Released scene resources");
        }
        Ok(())
    }

    fn render(&mut self, device: &mut dyn GraphicsDevice) -> Result<DrawSummary, ResourceError> {
        let resources = self
            .resources
            .as_ref()
            .ok_or(ResourceError::NotFound)?;
        let state = &mut self.pipeline;
        let mut summary = DrawSummary::default();

        device.clear();

        let objects_matrix: &Mat4 = match &resources.textured {
            Some(pass) => {
                pass.program.activate(device, state)?;
                pass.program
                    .set_uniforms(device, state, self.transform.table_matrix(), pass.texture)?;
                resources.table.bind_data(device, state, &pass.program)?;
                summary += resources.table.draw(device, state, None)?;
                self.transform.object_matrix()
            }
            None => self.transform.table_matrix(),
        };

        let color = &resources.color_program;
        color.activate(device, state)?;
        color.set_uniforms(device, state, objects_matrix)?;
        let tint = color.color_uniform();

        let mut color_drawables: Vec<&dyn Drawable> = Vec::with_capacity(4);
        if resources.textured.is_none() {
            color_drawables.push(&resources.table);
        }
        color_drawables.extend(resources.mallets.iter().map(|m| m as &dyn Drawable));
        if let Some(puck) = &resources.puck {
            color_drawables.push(puck);
        }

        for drawable in color_drawables {
            drawable.bind_data(device, state, color)?;
            summary += drawable.draw(device, state, tint)?;
        }
        Ok(summary)
    }
}

impl<P: ShaderSourceProvider> fmt::Debug for SceneRenderer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRenderer")
            .field("mode", &self.config.mode)
            .field("state", &self.state)
            .field("frames_rendered", &self.frames_rendered)
            .finish_non_exhaustive()
    }
}

impl<P: ShaderSourceProvider> SurfaceRenderer for SceneRenderer<P> {
    fn on_surface_created(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), RenderError> {
        // The previous surface's objects died with its context: forget them
        // without destroying.
        self.resources = None;
        self.pipeline.reset();
        self.state = SceneState::Uninitialized;

        let resources = SceneResources::build(device, &self.sources, &self.config)
            .inspect_err(|e| log::error!("Surface initialization failed: {e}"))?;

        device.set_clear_color(self.config.clear_color);
        self.resources = Some(resources);
        self.state = SceneState::Ready;
        log::info!(
            "Surface created on {} ({:?} mode)",
            device.adapter_info().name,
            self.config.mode
        );
        Ok(())
    }

    fn on_viewport_resized(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) {
        if let Err(e) = self.transform.resize(width, height) {
            log::warn!("Ignoring resize to {width}x{height}: {e}");
            return;
        }
        self.pipeline
            .set_viewport(device, Viewport::from_size(width, height));
        if self.state == SceneState::Ready {
            self.state = SceneState::Sized;
        }
        log::debug!("Viewport resized to {width}x{height}");
    }

    fn on_frame_requested(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), RenderError> {
        match self.state {
            SceneState::Uninitialized => return Err(RenderError::NotInitialized),
            SceneState::Ready => {
                log::debug!("Frame skipped: viewport size not known yet");
                return Ok(());
            }
            SceneState::Sized | SceneState::Rendering => {}
        }

        let summary = self.render(device)?;
        self.frames_rendered += 1;
        self.stats = FrameStats {
            frame_number: self.frames_rendered,
            draw_calls: summary.draw_calls,
            vertices: summary.vertices,
        };
        self.state = SceneState::Rendering;
        log::trace!("{:?}", self.stats);
        Ok(())
    }

    fn last_frame_stats(&self) -> &FrameStats {
        &self.stats
    }
}
