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


//! Integration tests for the transform pipeline: aspect-ratio correction in
//! the orthographic modes and the tilted-table composition in perspective.

use approx::assert_relative_eq;
use rink_core::math::{Mat4, Vec4};
use rink_core::renderer::{ConfigurationError, RenderMode, SceneConfig};
use rink_lanes::render_lane::{Projection, TransformPipeline};

fn ortho() -> TransformPipeline {
    TransformPipeline::new(Projection::Orthographic)
}

fn perspective() -> TransformPipeline {
    TransformPipeline::from_config(&SceneConfig::with_mode(RenderMode::Perspective))
}

// ─────────────────────────────────────────────────────────────────────────────
// Orthographic
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ortho_landscape_scenario() {
    let mut transform = ortho();
    transform.resize(1000, 500).unwrap();
    let extents = transform.ortho_extents().unwrap();
    assert_relative_eq!(extents.horizontal, 2.0);
    assert_relative_eq!(extents.vertical, 1.0);

    let corner = *transform.table_matrix() * Vec4::new(2.0, 1.0, 0.0, 1.0);
    assert_relative_eq!(corner.x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(corner.y, 1.0, epsilon = 1e-6);
}

#[test]
fn test_ortho_short_axis_always_spans_unit_range() {
    let sizes = [
        (1, 1),
        (2, 1),
        (1, 2),
        (640, 480),
        (480, 640),
        (1920, 1080),
        (1080, 1920),
        (333, 777),
        (4096, 17),
        (17, 4096),
    ];
    for (w, h) in sizes {
        let mut transform = ortho();
        transform.resize(w, h).unwrap();
        let extents = transform.ortho_extents().unwrap();

        assert_relative_eq!(extents.horizontal.min(extents.vertical), 1.0);
        assert_relative_eq!(
            extents.horizontal / extents.vertical,
            w as f32 / h as f32,
            max_relative = 1e-5
        );

        // The visible rectangle maps exactly onto clip space.
        let m = transform.table_matrix();
        let corner = *m * Vec4::new(extents.horizontal, extents.vertical, 0.0, 1.0);
        let opposite = *m * Vec4::new(-extents.horizontal, -extents.vertical, 0.0, 1.0);
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(opposite.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(opposite.y, -1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_ortho_objects_share_the_table_matrix() {
    let mut transform = ortho();
    transform.resize(800, 600).unwrap();
    assert_eq!(transform.table_matrix(), transform.object_matrix());
    assert_eq!(transform.model(), &Mat4::IDENTITY);
}

#[test]
fn test_zero_area_resize_keeps_previous_matrices() {
    let mut transform = ortho();
    transform.resize(1000, 500).unwrap();
    let before = *transform.table_matrix();

    for (w, h) in [(0, 500), (1000, 0), (0, 0)] {
        assert_eq!(
            transform.resize(w, h),
            Err(ConfigurationError::ZeroAreaViewport {
                width: w,
                height: h
            })
        );
        assert_eq!(transform.table_matrix(), &before);
    }
    assert!(transform.is_sized());
}

// ─────────────────────────────────────────────────────────────────────────────
// Perspective
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_perspective_focal_length_scenario() {
    let mut transform = perspective();
    transform.resize(800, 600).unwrap();
    let projection = transform.projection();
    let focal = 1.0 / (22.5f32.to_radians()).tan();
    assert_relative_eq!(projection.cols[1].y, focal, max_relative = 1e-5);
    assert_relative_eq!(projection.cols[0].x, focal / (800.0 / 600.0), max_relative = 1e-5);
    assert_relative_eq!(projection.cols[2].w, -1.0);
}

#[test]
fn test_perspective_table_is_pushed_back_and_tilted() {
    let mut transform = perspective();
    transform.resize(800, 600).unwrap();

    // The table center ends up in front of the camera, inside the frustum.
    let center = *transform.table_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(center.w, 2.5, epsilon = 1e-5);
    let ndc_z = center.z / center.w;
    assert!(ndc_z > -1.0 && ndc_z < 1.0, "table center clipped: {ndc_z}");

    // A tilt of -60 degrees pushes the far edge (+y) away from the camera.
    let far_edge = *transform.table_matrix() * Vec4::new(0.0, 0.8, 0.0, 1.0);
    assert!(far_edge.w > center.w);
}

#[test]
fn test_perspective_objects_are_lifted_off_the_table() {
    let mut transform = perspective();
    transform.resize(800, 600).unwrap();

    let expected = *transform.table_matrix()
        * Mat4::from_translation(rink_core::math::Vec3::new(0.0, 0.0, 0.01));
    let actual = transform.object_matrix();
    for (a, e) in actual.to_cols_array().iter().zip(expected.to_cols_array()) {
        assert_relative_eq!(*a, e, epsilon = 1e-5);
    }
    assert_ne!(transform.object_matrix(), transform.table_matrix());
}

#[test]
fn test_invalid_perspective_is_rejected() {
    let mut config = SceneConfig::with_mode(RenderMode::Perspective);
    config.z_near = 10.0;
    config.z_far = 1.0;
    let mut transform = TransformPipeline::from_config(&config);
    assert!(matches!(
        transform.resize(800, 600),
        Err(ConfigurationError::InvalidProjection(_))
    ));
    assert!(!transform.is_sized());
}
