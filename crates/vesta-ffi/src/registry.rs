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

//! Process-wide tables mapping the ids handed to C callers onto live objects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use vesta_core::rhi::{CommandList, Device};
use vesta_infra::{HeadlessBackend, WgpuBackend};

/// A device on whichever backend its configuration selected.
#[derive(Clone)]
pub(crate) enum AnyDevice {
    Wgpu(Device<WgpuBackend>),
    Headless(Device<HeadlessBackend>),
}

pub(crate) enum AnyCommandList {
    Wgpu(CommandList<WgpuBackend>),
    Headless(CommandList<HeadlessBackend>),
}

/// Runs `$body` with `$name` bound to the backend-specific value inside an
/// [`AnyDevice`] or [`AnyCommandList`].
macro_rules! dispatch {
    (list $any:expr, $name:ident => $body:expr) => {
        match $any {
            $crate::registry::AnyCommandList::Wgpu($name) => $body,
            $crate::registry::AnyCommandList::Headless($name) => $body,
        }
    };
    ($any:expr, $name:ident => $body:expr) => {
        match $any {
            $crate::registry::AnyDevice::Wgpu($name) => $body,
            $crate::registry::AnyDevice::Headless($name) => $body,
        }
    };
}
pub(crate) use dispatch;

pub(crate) type SharedCommandList = Arc<Mutex<AnyCommandList>>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static DEVICES: LazyLock<Mutex<HashMap<u64, AnyDevice>>> = LazyLock::new(Default::default);
static COMMAND_LISTS: LazyLock<Mutex<HashMap<u64, SharedCommandList>>> = LazyLock::new(Default::default);

/// Locks a table, recovering it if a panicking thread poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn insert_device(device: AnyDevice) -> u64 {
    let id = next_id();
    lock(&DEVICES).insert(id, device);
    id
}

/// A clone of the device, so callers never hold the table lock while working.
pub(crate) fn device(id: u64) -> Option<AnyDevice> {
    let found = lock(&DEVICES).get(&id).cloned();
    if found.is_none() {
        log::warn!("FFI: Unknown device {id}");
    }
    found
}

pub(crate) fn remove_device(id: u64) -> Option<AnyDevice> {
    lock(&DEVICES).remove(&id)
}

pub(crate) fn insert_command_list(list: AnyCommandList) -> u64 {
    let id = next_id();
    lock(&COMMAND_LISTS).insert(id, Arc::new(Mutex::new(list)));
    id
}

pub(crate) fn command_list(id: u64) -> Option<SharedCommandList> {
    let found = lock(&COMMAND_LISTS).get(&id).cloned();
    if found.is_none() {
        log::warn!("FFI: Unknown command list {id}");
    }
    found
}

pub(crate) fn remove_command_list(id: u64) -> Option<SharedCommandList> {
    lock(&COMMAND_LISTS).remove(&id)
}
