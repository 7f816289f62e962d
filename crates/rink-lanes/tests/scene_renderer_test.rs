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


//! Integration tests for the scene renderer driven through the surface
//! lifecycle against the headless device.

use rink_core::math::{LinearRgba, Vec4};
use rink_core::renderer::{
    AttributeDescriptor, GraphicsDevice, PrimitiveTopology, RenderError, RenderMode,
    ResourceError, SceneConfig, ShaderError, ShaderSourceProvider, SurfaceRenderer, Viewport,
};
use rink_infra::graphics::headless::{DeviceCommand, DrawCall, HeadlessDevice, UniformValue};
use rink_lanes::render_lane::drawables::{VertexLayout, SCENE_VERTICES, TEXTURED_TABLE_VERTICES};
use rink_lanes::render_lane::program::{A_COLOR, A_POSITION};
use rink_lanes::render_lane::shaders::{self, EmbeddedShaderSources};
use rink_lanes::render_lane::{SceneRenderer, SceneState, TABLE_TEXTURE_SIZE};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Serves the embedded sources, with some identifiers replaced.
#[derive(Debug, Default)]
struct OverridingSources {
    overrides: HashMap<&'static str, &'static str>,
}

impl OverridingSources {
    fn with(identifier: &'static str, source: &'static str) -> Self {
        Self {
            overrides: HashMap::from([(identifier, source)]),
        }
    }
}

impl ShaderSourceProvider for OverridingSources {
    fn load_shader_source(&self, identifier: &str) -> Result<Cow<'_, str>, ShaderError> {
        match self.overrides.get(identifier) {
            Some(source) => Ok(Cow::Borrowed(*source)),
            None => EmbeddedShaderSources.load_shader_source(identifier),
        }
    }
}

fn ready(config: SceneConfig, width: u32, height: u32) -> (SceneRenderer, HeadlessDevice) {
    let mut device = HeadlessDevice::new();
    let mut renderer = SceneRenderer::new(config);
    renderer.on_surface_created(&mut device).unwrap();
    renderer.on_viewport_resized(&mut device, width, height);
    device.clear_commands();
    (renderer, device)
}

fn draws(device: &HeadlessDevice) -> Vec<(PrimitiveTopology, u32, u32)> {
    device
        .draw_calls()
        .iter()
        .map(|c| (c.topology, c.first, c.count))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_frame_before_surface_is_not_initialized() {
    let mut device = HeadlessDevice::new();
    let mut renderer = SceneRenderer::new(SceneConfig::default());
    assert!(matches!(
        renderer.on_frame_requested(&mut device),
        Err(RenderError::NotInitialized)
    ));
    assert!(device.commands().is_empty());
}

#[test]
fn test_frame_before_first_resize_is_skipped() {
    let mut device = HeadlessDevice::new();
    let mut renderer = SceneRenderer::new(SceneConfig::default());
    renderer.on_surface_created(&mut device).unwrap();
    assert_eq!(renderer.state(), SceneState::Ready);

    renderer.on_frame_requested(&mut device).unwrap();
    assert!(device.draw_calls().is_empty());
    assert_eq!(renderer.state(), SceneState::Ready);
}

#[test]
fn test_surface_creation_sets_the_clear_color() {
    let mut config = SceneConfig::default();
    config.clear_color = LinearRgba::new(0.1, 0.2, 0.3, 1.0);
    let (renderer, device) = ready(config, 320, 240);
    assert_eq!(device.clear_color(), LinearRgba::new(0.1, 0.2, 0.3, 1.0));
    assert_eq!(renderer.state(), SceneState::Sized);
    assert_eq!(device.viewport(), Viewport::from_size(320, 240));
}

#[test]
fn test_zero_area_resize_is_ignored() {
    let (mut renderer, mut device) = ready(SceneConfig::default(), 1000, 500);
    let matrix = *renderer.transform().table_matrix();

    renderer.on_viewport_resized(&mut device, 0, 500);
    assert_eq!(device.viewport(), Viewport::from_size(1000, 500));
    assert_eq!(renderer.transform().table_matrix(), &matrix);
    assert!(device.commands().is_empty());

    renderer.on_frame_requested(&mut device).unwrap();
    assert_eq!(renderer.last_frame_stats().draw_calls, 5);
}

#[test]
fn test_surface_recreation_never_reuses_handles() {
    let (mut renderer, mut device) = ready(SceneConfig::default(), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();
    let before = renderer.handles().unwrap();

    device.simulate_context_loss();
    renderer.on_surface_created(&mut device).unwrap();
    renderer.on_viewport_resized(&mut device, 800, 600);
    let after = renderer.handles().unwrap();

    let old_programs: HashSet<_> = before.programs.iter().collect();
    assert!(after.programs.iter().all(|p| !old_programs.contains(p)));
    let old_buffers: HashSet<_> = before.buffers.iter().collect();
    assert!(after.buffers.iter().all(|b| !old_buffers.contains(b)));
    let old_uniforms: HashSet<_> = before.uniforms.iter().map(|u| u.index).collect();
    assert!(after.uniforms.iter().all(|u| !old_uniforms.contains(&u.index)));
    assert!(after
        .attributes
        .iter()
        .all(|a| after.programs.contains(&a.program)));

    device.clear_commands();
    renderer.on_frame_requested(&mut device).unwrap();
    assert_eq!(device.draw_calls().len(), 5);
}

#[test]
fn test_release_destroys_every_object() {
    let (mut renderer, mut device) = ready(SceneConfig::with_mode(RenderMode::Textured), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();
    let handles = renderer.handles().unwrap();

    renderer.release(&mut device).unwrap();
    assert_eq!(renderer.state(), SceneState::Uninitialized);
    assert_eq!(device.live_program_count(), 0);
    for buffer in handles.buffers {
        assert!(device.buffer_contents(buffer).is_none());
    }
    assert!(matches!(
        renderer.on_frame_requested(&mut device),
        Err(RenderError::NotInitialized)
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw order
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_flat_color_frame_draws_the_shared_buffer_in_order() {
    let (mut renderer, mut device) = ready(SceneConfig::default(), 1000, 500);
    renderer.on_frame_requested(&mut device).unwrap();

    assert_eq!(
        draws(&device),
        vec![
            (PrimitiveTopology::TriangleFan, 0, 6),
            (PrimitiveTopology::LineList, 6, 2),
            (PrimitiveTopology::PointList, 8, 1),
            (PrimitiveTopology::PointList, 9, 1),
            (PrimitiveTopology::PointList, 10, 1),
        ]
    );
    let stats = renderer.last_frame_stats();
    assert_eq!(stats.frame_number, 1);
    assert_eq!(stats.draw_calls, 5);
    assert_eq!(stats.vertices, 11);
    assert_eq!(renderer.state(), SceneState::Rendering);
}

#[test]
fn test_four_draw_call_scene() {
    // Table fan, center line and both mallets. The center line takes the
    // fourth call, so the puck is left out to match that draw list.
    let mut config = SceneConfig::default();
    config.draw_puck = false;
    let (mut renderer, mut device) = ready(config, 1000, 500);
    renderer.on_frame_requested(&mut device).unwrap();

    let firsts: Vec<u32> = device.draw_calls().iter().map(|c| c.first).collect();
    assert_eq!(firsts, vec![0, 6, 8, 9]);
}

#[test]
fn test_uniform_color_tints_precede_each_draw() {
    let (mut renderer, mut device) = ready(SceneConfig::with_mode(RenderMode::UniformColor), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();

    let mut tints = Vec::new();
    let mut pending = None;
    for command in device.commands() {
        match command {
            DeviceCommand::SetUniform {
                value: UniformValue::Vec4(color),
                ..
            } => pending = Some(*color),
            DeviceCommand::Draw(_) => tints.push(pending.take().expect("tint before draw")),
            _ => {}
        }
    }
    let expected: Vec<Vec4> = [
        LinearRgba::WHITE,
        LinearRgba::RED,
        LinearRgba::BLUE,
        LinearRgba::RED,
        LinearRgba::BLACK,
    ]
    .into_iter()
    .map(Vec4::from)
    .collect();
    assert_eq!(tints, expected);
}

#[test]
fn test_frames_are_idempotent() {
    let (mut renderer, mut device) = ready(SceneConfig::default(), 640, 480);
    renderer.on_frame_requested(&mut device).unwrap();
    let first = device.take_commands();
    renderer.on_frame_requested(&mut device).unwrap();
    let second = device.take_commands();

    assert_eq!(first, second);
    assert_eq!(renderer.last_frame_stats().frame_number, 2);
}

#[test]
fn test_textured_frame_switches_programs_between_passes() {
    let (mut renderer, mut device) = ready(SceneConfig::with_mode(RenderMode::Textured), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();
    let handles = renderer.handles().unwrap();
    let (color_program, texture_program) = (handles.programs[0], handles.programs[1]);

    let calls = device.draw_calls();
    assert_eq!(
        calls,
        vec![
            DrawCall {
                program: texture_program,
                topology: PrimitiveTopology::TriangleFan,
                first: 0,
                count: 6
            },
            DrawCall {
                program: color_program,
                topology: PrimitiveTopology::PointList,
                first: 0,
                count: 2
            },
            DrawCall {
                program: color_program,
                topology: PrimitiveTopology::PointList,
                first: 0,
                count: 1
            },
        ]
    );

    let position = |wanted: &DeviceCommand| device.commands().iter().position(|c| c == wanted);
    let bind = device
        .commands()
        .iter()
        .position(|c| matches!(c, DeviceCommand::BindTexture { unit: 0, .. }))
        .unwrap();
    let use_texture = position(&DeviceCommand::UseProgram(texture_program)).unwrap();
    let use_color = position(&DeviceCommand::UseProgram(color_program)).unwrap();
    let first_draw = position(&DeviceCommand::Draw(calls[0])).unwrap();
    assert!(use_texture < bind && bind < first_draw && first_draw < use_color);
}

#[test]
fn test_perspective_objects_use_the_lifted_matrix() {
    let (mut renderer, mut device) =
        ready(SceneConfig::with_mode(RenderMode::Perspective), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();

    let matrices: Vec<_> = device
        .commands()
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::SetUniform {
                value: UniformValue::Mat4(m),
                ..
            } => Some(*m),
            _ => None,
        })
        .collect();
    assert_eq!(
        matrices,
        vec![
            *renderer.transform().table_matrix(),
            *renderer.transform().object_matrix()
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Vertex data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bound_attributes_read_back_the_scene_vertices() {
    let (mut renderer, mut device) = ready(SceneConfig::default(), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();
    let handles = renderer.handles().unwrap();
    let fpv = VertexLayout::PositionColor.floats_per_vertex() as usize;

    let check = |descriptor: AttributeDescriptor, offset: usize, comps: usize| {
        let bytes = device.buffer_contents(handles.buffers[0]).unwrap();
        for vertex in 0..SCENE_VERTICES.len() / fpv {
            let start = vertex * fpv + offset;
            assert_eq!(
                descriptor.read_vertex(bytes, vertex).unwrap(),
                SCENE_VERTICES[start..start + comps].to_vec(),
                "vertex {vertex}"
            );
        }
    };

    let position = handles.attributes[0];
    let color = handles.attributes[1];
    let (_, position_layout) = device.attribute_binding(position.index).unwrap();
    let (_, color_layout) = device.attribute_binding(color.index).unwrap();
    check(position_layout, 0, 2);
    check(color_layout, 2, 3);
    assert_eq!(position_layout.stride_bytes, 20);
}

#[test]
fn test_location_resolution_is_stable_across_frames() {
    let (mut renderer, mut device) = ready(SceneConfig::default(), 800, 600);
    renderer.on_frame_requested(&mut device).unwrap();
    let first = renderer.handles().unwrap();
    renderer.on_frame_requested(&mut device).unwrap();
    assert_eq!(renderer.handles().unwrap(), first);

    let program = first.programs[0];
    assert_eq!(
        device.attribute_location(program, A_POSITION).unwrap(),
        first.attributes[0]
    );
    assert_eq!(
        device.attribute_location(program, A_COLOR).unwrap(),
        first.attributes[1]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Shader failures
// ─────────────────────────────────────────────────────────────────────────────

fn create_with(sources: OverridingSources, mode: RenderMode) -> (RenderError, SceneRenderer<OverridingSources>, HeadlessDevice) {
    let mut device = HeadlessDevice::new();
    let mut renderer = SceneRenderer::with_sources(SceneConfig::with_mode(mode), sources);
    let err = renderer.on_surface_created(&mut device).unwrap_err();
    (err, renderer, device)
}

#[test]
fn test_compile_error_leaves_renderer_uninitialized() {
    let sources = OverridingSources::with(
        shaders::SIMPLE_FRAGMENT_SHADER,
        "precision mediump float;\nvoid main() {\n gl_FragColor = vec4(1.0);\n",
    );
    let (err, renderer, device) = create_with(sources, RenderMode::FlatColor);
    assert!(matches!(
        err,
        RenderError::ResourceError(ResourceError::Shader(ShaderError::CompilationError { .. }))
    ));
    assert_eq!(renderer.state(), SceneState::Uninitialized);
    assert!(renderer.handles().is_none());
    assert_eq!(device.live_shader_count(), 0, "shader objects leaked");
}

#[test]
fn test_link_error_is_reported() {
    let sources = OverridingSources::with(
        shaders::SIMPLE_FRAGMENT_SHADER,
        "precision mediump float;\nvarying vec4 v_Tint;\nvoid main() { gl_FragColor = v_Tint; }",
    );
    let (err, _, device) = create_with(sources, RenderMode::FlatColor);
    match err {
        RenderError::ResourceError(ResourceError::Shader(ShaderError::LinkError {
            details,
            ..
        })) => assert!(details.contains("v_Tint")),
        other => panic!("expected a link error, got {other:?}"),
    }
    assert_eq!(device.live_shader_count(), 0);
}

#[test]
fn test_missing_attribute_is_unresolved() {
    let sources = OverridingSources::with(
        shaders::SIMPLE_VERTEX_SHADER,
        "uniform mat4 u_Matrix;\nattribute vec4 a_Position;\nvarying vec4 v_Color;\nvoid main() {\n v_Color = vec4(1.0);\n gl_Position = u_Matrix * a_Position;\n}",
    );
    let (err, _, _) = create_with(sources, RenderMode::FlatColor);
    match err {
        RenderError::ResourceError(ResourceError::Shader(ShaderError::UnresolvedName {
            name,
            ..
        })) => assert_eq!(name, A_COLOR),
        other => panic!("expected an unresolved name, got {other:?}"),
    }
}

#[test]
fn test_failed_surface_releases_earlier_programs() {
    // The texture program links before the color program fails.
    let sources = OverridingSources::with(
        shaders::SIMPLE_FRAGMENT_SHADER,
        "precision mediump float;\nvarying vec4 v_Tint;\nvoid main() { gl_FragColor = v_Tint; }",
    );
    let mut device = HeadlessDevice::new();
    let mut renderer = SceneRenderer::with_sources(SceneConfig::with_mode(RenderMode::Textured), sources);

    for attempt in 1..=2 {
        assert!(
            renderer.on_surface_created(&mut device).is_err(),
            "attempt {attempt} should fail"
        );
        assert_eq!(device.live_program_count(), 0, "programs left after attempt {attempt}");
        assert_eq!(device.live_shader_count(), 0, "shaders left after attempt {attempt}");
        assert_eq!(renderer.state(), SceneState::Uninitialized);
    }
}

#[test]
fn test_unresolved_color_input_releases_its_program() {
    let sources = OverridingSources::with(
        shaders::SIMPLE_VERTEX_SHADER,
        "uniform mat4 u_Matrix;\nattribute vec4 a_Position;\nvarying vec4 v_Color;\nvoid main() {\n v_Color = vec4(1.0);\n gl_Position = u_Matrix * a_Position;\n}",
    );
    let (_, _, device) = create_with(sources, RenderMode::FlatColor);
    assert_eq!(device.live_program_count(), 0);
}

#[test]
fn test_failed_upload_releases_programs_texture_and_buffers() {
    // Room for the texture and the table buffer, not for the mallets.
    let texture_bytes = (TABLE_TEXTURE_SIZE * TABLE_TEXTURE_SIZE * 4) as usize;
    let table_bytes = TEXTURED_TABLE_VERTICES.len() * std::mem::size_of::<f32>();
    let mut device = HeadlessDevice::with_memory_limit(texture_bytes + table_bytes + 4);
    let mut renderer = SceneRenderer::new(SceneConfig::with_mode(RenderMode::Textured));

    let err = renderer.on_surface_created(&mut device).unwrap_err();
    assert!(
        matches!(err, RenderError::ResourceError(ResourceError::UploadError(_))),
        "expected an upload error, got {err:?}"
    );
    assert_eq!(device.live_program_count(), 0);
    assert_eq!(device.live_texture_count(), 0);
    assert_eq!(device.live_buffer_count(), 0);
}

#[test]
fn test_surface_succeeds_after_releasing_a_failed_attempt() {
    let texture_bytes = (TABLE_TEXTURE_SIZE * TABLE_TEXTURE_SIZE * 4) as usize;
    let mut device = HeadlessDevice::with_memory_limit(texture_bytes + 1024);
    let mut renderer = SceneRenderer::new(SceneConfig::with_mode(RenderMode::Textured));
    renderer.on_surface_created(&mut device).unwrap();
    let created = device.live_buffer_count();

    // A second surface on the same context would double the texture.
    assert!(SceneRenderer::new(SceneConfig::with_mode(RenderMode::Textured))
        .on_surface_created(&mut device)
        .is_err());
    assert_eq!(device.live_buffer_count(), created);
    assert_eq!(device.live_texture_count(), 1);
    assert_eq!(device.live_program_count(), 2);
}

#[test]
fn test_missing_source_is_a_load_error() {
    #[derive(Debug)]
    struct Empty;
    impl ShaderSourceProvider for Empty {
        fn load_shader_source(&self, identifier: &str) -> Result<Cow<'_, str>, ShaderError> {
            Err(ShaderError::LoadError {
                path: identifier.to_string(),
                source_error: "not found".to_string(),
            })
        }
    }

    let mut device = HeadlessDevice::new();
    let mut renderer = SceneRenderer::with_sources(SceneConfig::default(), Empty);
    assert!(matches!(
        renderer.on_surface_created(&mut device),
        Err(RenderError::ResourceError(ResourceError::Shader(ShaderError::LoadError { .. })))
    ));
}
