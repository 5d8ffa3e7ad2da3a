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

//! Recycling of command lists across frames.

use crate::rhi::command_list::CommandList;
use crate::rhi::device::Device;
use crate::rhi::traits::RhiBackend;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Number of idle lists a pool starts with.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Counts of the lists a pool knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Lists created by the pool and not cleared.
    pub total: usize,
    /// Idle lists ready to be acquired.
    pub available: usize,
    /// Lists handed out and not yet released.
    pub in_use: usize,
}

#[derive(Debug)]
struct PoolState<B: RhiBackend> {
    available: Vec<CommandList<B>>,
    in_use: usize,
}

/// A thread-safe pool of reusable command lists.
///
/// Lists leave the pool by value on [`acquire`](Self::acquire) and come back
/// through [`release`](Self::release), which resets them.
#[derive(Debug)]
pub struct CommandListPool<B: RhiBackend> {
    device: Device<B>,
    state: Mutex<PoolState<B>>,
}

impl<B: RhiBackend> CommandListPool<B> {
    /// Creates a pool holding [`DEFAULT_POOL_SIZE`] idle lists.
    pub fn new(device: Device<B>) -> Self {
        Self::with_capacity(device, DEFAULT_POOL_SIZE)
    }

    /// Creates a pool holding `initial_size` idle lists.
    pub fn with_capacity(device: Device<B>, initial_size: usize) -> Self {
        let pool = Self {
            device,
            state: Mutex::new(PoolState {
                available: Vec::new(),
                in_use: 0,
            }),
        };
        pool.reserve(initial_size);
        pool
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands out a list that is already recording.
    pub fn acquire(&self) -> CommandList<B> {
        let mut state = self.lock();
        state.in_use += 1;
        match state.available.pop() {
            Some(mut list) => {
                list.begin();
                log::debug!(
                    "CommandListPool: Reusing command list (available: {}).",
                    state.available.len()
                );
                list
            }
            None => {
                let list = self.device.begin_command_list();
                log::info!(
                    "CommandListPool: Created new command list (total: {}).",
                    state.available.len() + state.in_use
                );
                list
            }
        }
    }

    /// Resets a list and makes it available again.
    pub fn release(&self, mut list: CommandList<B>) {
        list.reset();
        let mut state = self.lock();
        state.in_use = state.in_use.saturating_sub(1);
        state.available.push(list);
        log::debug!(
            "CommandListPool: Released command list (available: {}).",
            state.available.len()
        );
    }

    /// Releases several lists at once.
    pub fn release_all(&self, lists: impl IntoIterator<Item = CommandList<B>>) {
        let mut released = 0usize;
        let mut reset: Vec<CommandList<B>> = lists
            .into_iter()
            .map(|mut list| {
                list.reset();
                released += 1;
                list
            })
            .collect();
        let mut state = self.lock();
        state.in_use = state.in_use.saturating_sub(released);
        state.available.append(&mut reset);
        log::debug!(
            "CommandListPool: Released {} command lists (available: {}).",
            released,
            state.available.len()
        );
    }

    /// Grows the pool with idle lists until it knows about at least `count`.
    pub fn reserve(&self, count: usize) {
        let mut state = self.lock();
        let total = state.available.len() + state.in_use;
        for _ in total..count {
            state.available.push(CommandList::new(self.device.clone()));
        }
    }

    /// Destroys every idle list. Lists still in use are not affected.
    pub fn clear(&self) {
        let mut state = self.lock();
        if state.in_use > 0 {
            log::warn!(
                "CommandListPool: Clearing pool with {} command lists still in use.",
                state.in_use
            );
        }
        for list in state.available.drain(..) {
            list.destroy();
        }
        log::info!("CommandListPool: Cleared.");
    }

    /// Current counts.
    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        PoolStats {
            total: state.available.len() + state.in_use,
            available: state.available.len(),
            in_use: state.in_use,
        }
    }

    /// Acquires a list that is submitted and released when dropped.
    pub fn scoped(&self) -> ScopedCommandList<'_, B> {
        ScopedCommandList {
            pool: self,
            list: Some(self.acquire()),
        }
    }
}

/// A pooled command list that is closed and returned to its pool on drop.
#[derive(Debug)]
pub struct ScopedCommandList<'p, B: RhiBackend> {
    pool: &'p CommandListPool<B>,
    list: Option<CommandList<B>>,
}

impl<B: RhiBackend> Deref for ScopedCommandList<'_, B> {
    type Target = CommandList<B>;

    fn deref(&self) -> &Self::Target {
        // Only `drop` empties the slot.
        match &self.list {
            Some(list) => list,
            None => unreachable!("scoped command list used after release"),
        }
    }
}

impl<B: RhiBackend> DerefMut for ScopedCommandList<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.list {
            Some(list) => list,
            None => unreachable!("scoped command list used after release"),
        }
    }
}

impl<B: RhiBackend> Drop for ScopedCommandList<'_, B> {
    fn drop(&mut self) {
        if let Some(mut list) = self.list.take() {
            if list.is_recording() {
                list.close();
            }
            self.pool.release(list);
        }
    }
}
