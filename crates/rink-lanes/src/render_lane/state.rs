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

//! Explicit tracking of the device's "currently bound" state.

use rink_core::renderer::{
    AttributeDescriptor, AttributeSlot, BufferId, GraphicsDevice, ProgramId, ResourceError,
    UniformSlot, Viewport,
};

/// One enabled vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    /// The buffer the attribute reads from.
    pub buffer: BufferId,
    /// How the attribute reads it.
    pub descriptor: AttributeDescriptor,
}

/// The pipeline state owned by the renderer on the render thread.
///
/// Every mutation of program, attribute or viewport state goes through this
/// value, so the renderer never has to query the device for what is bound.
#[derive(Debug, Default, Clone)]
pub struct PipelineState {
    active_program: Option<ProgramId>,
    bindings: Vec<AttributeBinding>,
    viewport: Option<Viewport>,
}

impl PipelineState {
    /// Creates an empty state: no program, no bindings, unknown viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `program` current on the device.
    ///
    /// Attribute bindings recorded for a previous program are dropped, since
    /// slot numbers are not stable across programs.
    pub fn activate(
        &mut self,
        device: &mut dyn GraphicsDevice,
        program: ProgramId,
    ) -> Result<(), ResourceError> {
        device.use_program(program)?;
        if self.active_program != Some(program) {
            self.bindings.clear();
        }
        self.active_program = Some(program);
        Ok(())
    }

    /// The program currently in use.
    pub fn active_program(&self) -> Option<ProgramId> {
        self.active_program
    }

    /// Fails with [`ResourceError::StaleLocation`] unless `program` is the active one.
    pub fn ensure_active(&self, program: ProgramId) -> Result<(), ResourceError> {
        if self.active_program == Some(program) {
            Ok(())
        } else {
            Err(ResourceError::StaleLocation {
                expected: program,
                active: self.active_program,
            })
        }
    }

    /// Checks that an attribute slot belongs to the active program.
    pub fn check_attribute(&self, slot: AttributeSlot) -> Result<(), ResourceError> {
        self.ensure_active(slot.program)
    }

    /// Checks that a uniform slot belongs to the active program.
    pub fn check_uniform(&self, slot: UniformSlot) -> Result<(), ResourceError> {
        self.ensure_active(slot.program)
    }

    /// Records a binding issued to the device, replacing any previous
    /// binding of the same attribute index.
    pub fn record_binding(&mut self, buffer: BufferId, descriptor: AttributeDescriptor) {
        let binding = AttributeBinding { buffer, descriptor };
        match self
            .bindings
            .iter_mut()
            .find(|b| b.descriptor.slot.index == descriptor.slot.index)
        {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    /// The attribute bindings enabled for the active program.
    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    /// Sets the viewport on the device and remembers it.
    pub fn set_viewport(&mut self, device: &mut dyn GraphicsDevice, viewport: Viewport) {
        device.set_viewport(viewport);
        self.viewport = Some(viewport);
    }

    /// The last viewport set, if any.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Forgets everything. Used when the surface, and with it the device state, is recreated.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(program: usize, index: u32, offset_bytes: u32) -> AttributeDescriptor {
        AttributeDescriptor {
            component_count: 2,
            stride_bytes: 16,
            offset_bytes,
            slot: AttributeSlot {
                program: ProgramId(program),
                index,
            },
        }
    }

    #[test]
    fn stale_location_is_rejected() {
        let state = PipelineState::new();
        let slot = UniformSlot {
            program: ProgramId(3),
            index: 0,
        };
        assert!(matches!(
            state.check_uniform(slot),
            Err(ResourceError::StaleLocation {
                expected: ProgramId(3),
                active: None
            })
        ));
    }

    #[test]
    fn record_binding_replaces_same_index() {
        let mut state = PipelineState::new();
        state.record_binding(BufferId(1), desc(1, 0, 0));
        state.record_binding(BufferId(1), desc(1, 1, 8));
        state.record_binding(BufferId(2), desc(1, 0, 0));
        assert_eq!(state.bindings().len(), 2);
        assert_eq!(state.bindings()[0].buffer, BufferId(2));
    }
}
