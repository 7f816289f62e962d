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

use rink_core::renderer::{ProgramId, UniformSlot};
use std::collections::HashMap;

/// Native uniform locations handed out as [`UniformSlot`]s.
///
/// Slot indices are never reused. Asking twice for the same name of the same
/// program returns the same slot, and destroying a program drops its slots.
#[derive(Debug)]
pub(super) struct UniformTable<L> {
    next_index: u32,
    names: HashMap<(ProgramId, String), u32>,
    locations: HashMap<u32, (ProgramId, L)>,
}

impl<L> Default for UniformTable<L> {
    fn default() -> Self {
        Self {
            next_index: 0,
            names: HashMap::new(),
            locations: HashMap::new(),
        }
    }
}

impl<L> UniformTable<L> {
    /// The slot already handed out for `name`, if any.
    pub(super) fn cached(&self, program: ProgramId, name: &str) -> Option<UniformSlot> {
        self.names
            .get(&(program, name.to_string()))
            .map(|&index| UniformSlot { program, index })
    }

    pub(super) fn insert(&mut self, program: ProgramId, name: &str, location: L) -> UniformSlot {
        let index = self.next_index;
        self.next_index += 1;
        self.names.insert((program, name.to_string()), index);
        self.locations.insert(index, (program, location));
        UniformSlot { program, index }
    }

    /// The native location behind `slot`, if its program is still alive.
    pub(super) fn get(&self, slot: UniformSlot) -> Option<&L> {
        self.locations
            .get(&slot.index)
            .filter(|(program, _)| *program == slot.program)
            .map(|(_, location)| location)
    }

    /// Drops every slot of `program`, returning how many there were.
    pub(super) fn forget_program(&mut self, program: ProgramId) -> usize {
        let before = self.locations.len();
        self.names.retain(|(owner, _), _| *owner != program);
        self.locations.retain(|_, (owner, _)| *owner != program);
        before - self.locations.len()
    }

    pub(super) fn len(&self) -> usize {
        self.locations.len()
    }
}
