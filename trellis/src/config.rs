// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host configuration.

use kurbo::Size;

/// Settings fixed when a [`UiHost`](crate::UiHost) is created.
///
/// ```rust
/// use kurbo::Size;
/// use trellis::HostConfig;
///
/// let config = HostConfig::default()
///     .with_viewport(Size::new(1280.0, 720.0))
///     .with_max_layout_passes(4);
/// assert_eq!(config.max_layout_passes, 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HostConfig {
    /// Size the root element is measured and arranged against.
    pub viewport: Size,
    /// How many full style/measure/arrange/position sweeps one
    /// [`run_pending_layout`](crate::UiHost::run_pending_layout) may run
    /// before giving up.
    pub max_layout_passes: usize,
    /// Clock slots reserved up front.
    pub clock_pool_capacity: usize,
    /// Initial capacity of element storage, queues and traversal buffers.
    pub scratch_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(800.0, 600.0),
            max_layout_passes: 16,
            clock_pool_capacity: 8,
            scratch_capacity: 64,
        }
    }
}

impl HostConfig {
    /// Sets [`viewport`](Self::viewport).
    #[must_use]
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Sets [`max_layout_passes`](Self::max_layout_passes); clamped to at least one.
    #[must_use]
    pub fn with_max_layout_passes(mut self, passes: usize) -> Self {
        self.max_layout_passes = passes.max(1);
        self
    }

    /// Sets [`clock_pool_capacity`](Self::clock_pool_capacity).
    #[must_use]
    pub fn with_clock_pool_capacity(mut self, capacity: usize) -> Self {
        self.clock_pool_capacity = capacity;
        self
    }

    /// Sets [`scratch_capacity`](Self::scratch_capacity).
    #[must_use]
    pub fn with_scratch_capacity(mut self, capacity: usize) -> Self {
        self.scratch_capacity = capacity;
        self
    }
}
