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

//! Frame pacing.
//!
//! [`FrameFences`] keeps the CPU at most [`FRAMES_IN_FLIGHT`] frames ahead of
//! the GPU with one fence per frame slot. [`FramePacer`] adds frame timing on
//! top, and [`PerFrame`] holds one copy of a resource per slot.

use crate::rhi::api::{FenceHandle, FRAMES_IN_FLIGHT};
use crate::rhi::command_list::CommandList;
use crate::rhi::device::Device;
use crate::rhi::traits::RhiBackend;
use std::time::{Duration, Instant};

/// Number of frame slots.
pub const FRAME_SLOTS: usize = FRAMES_IN_FLIGHT as usize;

/// How often the frame rate estimate is refreshed.
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// A ring of fences, one per frame slot.
///
/// Each slot's fence counts the frames submitted from that slot. Beginning a
/// frame waits until the GPU has finished the previous frame that used the
/// same slot, so per-slot resources can be rewritten safely.
#[derive(Debug)]
pub struct FrameFences<B: RhiBackend> {
    device: Device<B>,
    fences: [FenceHandle; FRAME_SLOTS],
    values: [u64; FRAME_SLOTS],
    current: usize,
}

impl<B: RhiBackend> FrameFences<B> {
    /// Creates one fence per slot on `device`.
    pub fn new(device: Device<B>) -> Self {
        let fences = std::array::from_fn(|_| device.create_fence(0));
        log::info!("FrameFences: Created {FRAME_SLOTS} frame fences.");
        Self {
            device,
            fences,
            values: [0; FRAME_SLOTS],
            current: 0,
        }
    }

    /// Waits for the last frame submitted from the current slot.
    ///
    /// Returns `false` when the wait failed; the device reports why.
    pub fn begin_frame(&self) -> bool {
        let value = self.values[self.current];
        value == 0 || self.device.wait_for_fence(self.fences[self.current], value)
    }

    /// Submits `list` so the GPU signals the current slot when it completes,
    /// then moves to the next slot.
    pub fn end_frame(&mut self, list: &mut CommandList<B>) {
        let slot = self.current;
        self.values[slot] += 1;
        self.device
            .submit_command_list_with_fence(list, self.fences[slot], self.values[slot]);
        self.advance();
    }

    /// Signals the current slot from the CPU for a frame that submitted
    /// nothing, then moves to the next slot.
    pub fn skip_frame(&mut self) {
        let slot = self.current;
        self.values[slot] += 1;
        self.device.signal_fence(self.fences[slot], self.values[slot]);
        self.advance();
    }

    fn advance(&mut self) {
        self.current = (self.current + 1) % FRAME_SLOTS;
    }

    /// Waits for every submitted frame. Returns `false` if any wait failed.
    pub fn wait_for_all(&self) -> bool {
        let mut all = true;
        for (&fence, &value) in self.fences.iter().zip(&self.values) {
            if value > 0 {
                all &= self.device.wait_for_fence(fence, value);
            }
        }
        all
    }

    /// Index of the current slot, in `0..FRAME_SLOTS`.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current slot's fence.
    pub fn current_fence(&self) -> FenceHandle {
        self.fences[self.current]
    }

    /// Number of frames submitted from the current slot so far.
    pub fn current_value(&self) -> u64 {
        self.values[self.current]
    }
}

impl<B: RhiBackend> Drop for FrameFences<B> {
    fn drop(&mut self) {
        if !self.wait_for_all() {
            log::warn!("FrameFences: Releasing fences with frames still pending.");
        }
        for fence in self.fences {
            self.device.destroy_fence(fence);
        }
    }
}

/// Frame timing on top of a [`FrameFences`] ring.
#[derive(Debug)]
pub struct FramePacer<B: RhiBackend> {
    fences: FrameFences<B>,
    frame_number: u64,
    last_frame: Instant,
    delta: Duration,
    fps: f64,
    window: Duration,
    window_frames: u32,
}

impl<B: RhiBackend> FramePacer<B> {
    /// Creates a pacer with its own fence ring on `device`.
    pub fn new(device: Device<B>) -> Self {
        Self {
            fences: FrameFences::new(device),
            frame_number: 0,
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            fps: 0.0,
            window: Duration::ZERO,
            window_frames: 0,
        }
    }

    /// Waits for the current slot, then updates the frame timing.
    ///
    /// Returns `false` when the wait failed.
    pub fn begin_frame(&mut self) -> bool {
        let ready = self.fences.begin_frame();

        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.window += self.delta;
        self.window_frames += 1;
        if self.window >= FPS_WINDOW {
            self.fps = f64::from(self.window_frames) / self.window.as_secs_f64();
            log::debug!(
                "FramePacer: {:.1} fps, {:.2} ms per frame.",
                self.fps,
                self.frame_time_ms()
            );
            self.window = Duration::ZERO;
            self.window_frames = 0;
        }

        self.frame_number += 1;
        ready
    }

    /// Submits the frame's list, fenced on the current slot.
    pub fn end_frame(&mut self, list: &mut CommandList<B>) {
        self.fences.end_frame(list);
    }

    /// Ends a frame that submitted nothing.
    pub fn skip_frame(&mut self) {
        self.fences.skip_frame();
    }

    /// Waits for every frame in flight.
    pub fn wait_for_idle(&self) -> bool {
        let idle = self.fences.wait_for_all();
        log::info!("FramePacer: Idle.");
        idle
    }

    /// Current slot, for indexing [`PerFrame`] resources.
    pub fn frame_index(&self) -> usize {
        self.fences.current_index()
    }

    /// Frames begun since creation.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Time between the last two calls to [`begin_frame`](Self::begin_frame).
    pub fn delta_time(&self) -> Duration {
        self.delta
    }

    /// [`delta_time`](Self::delta_time) in milliseconds.
    pub fn frame_time_ms(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }

    /// Frame rate over the last full second, or 0 before the first one.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// The underlying fence ring.
    pub fn fences(&self) -> &FrameFences<B> {
        &self.fences
    }
}

/// One value per frame slot, such as a constant buffer rewritten every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PerFrame<T> {
    items: [T; FRAME_SLOTS],
}

impl<T> PerFrame<T> {
    /// Builds each slot's value from its index.
    pub fn new(factory: impl FnMut(usize) -> T) -> Self {
        Self {
            items: std::array::from_fn(factory),
        }
    }

    /// The value for a slot. Indices wrap around.
    pub fn get(&self, frame_index: usize) -> &T {
        &self.items[frame_index % FRAME_SLOTS]
    }

    /// Mutable access to a slot's value. Indices wrap around.
    pub fn get_mut(&mut self, frame_index: usize) -> &mut T {
        &mut self.items[frame_index % FRAME_SLOTS]
    }

    /// The value for the pacer's current slot.
    pub fn current<B: RhiBackend>(&self, pacer: &FramePacer<B>) -> &T {
        self.get(pacer.frame_index())
    }

    /// Every slot's value, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
