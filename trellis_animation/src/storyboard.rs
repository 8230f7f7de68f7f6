// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storyboards: named property animations grouped under target selectors.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use trellis_style::Selector;

use crate::animatable::Animatable;
use crate::track::{AnimationTrack, KeyframeTrack};

/// Process-unique identity of a [`Storyboard`].
///
/// Clones of a storyboard share its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoryboardId(u32);

impl StoryboardId {
    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// What happens when playback reaches the end of a storyboard.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopBehavior {
    /// Hold the final values.
    #[default]
    None,
    /// Jump back to the start.
    Loop,
    /// Play backwards to the start, then forwards again.
    Reverse,
}

/// One animated property of a target.
#[derive(Clone, Debug)]
pub struct TargetAnimation {
    /// Property name, looked up on the target element's type chain.
    pub property: Box<str>,
    /// Values over time.
    pub track: Rc<dyn AnimationTrack>,
}

/// The elements a group of animations applies to.
#[derive(Clone, Debug)]
pub struct StoryboardTarget {
    /// Which elements of the animated subtree match; `None` means the root.
    pub selector: Option<Selector>,
    /// Animations applied to every matching element.
    pub animations: Vec<TargetAnimation>,
}

#[derive(Debug)]
struct StoryboardData {
    id: StoryboardId,
    duration: f64,
    loop_behavior: LoopBehavior,
    targets: Vec<StoryboardTarget>,
}

/// An immutable, shared animation description.
///
/// ```rust
/// use trellis_animation::{Easing, KeyframeTrack, LoopBehavior, Storyboard};
///
/// let pulse = Storyboard::builder()
///     .loop_behavior(LoopBehavior::Reverse)
///     .target(None)
///     .animate(
///         "Opacity",
///         KeyframeTrack::new().key(0.0, 1.0_f32, Easing::Linear).key(0.5, 0.2, Easing::EaseOut),
///     )
///     .build();
/// assert_eq!(pulse.duration(), 0.5);
/// assert_eq!(pulse.targets().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Storyboard {
    inner: Rc<StoryboardData>,
}

impl Storyboard {
    /// Starts a storyboard description.
    #[must_use]
    pub fn builder() -> StoryboardBuilder {
        StoryboardBuilder::default()
    }

    /// Identity shared by all clones.
    #[must_use]
    pub fn id(&self) -> StoryboardId {
        self.inner.id
    }

    /// Length of one play-through, in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.inner.duration
    }

    /// End-of-playback behavior.
    #[must_use]
    pub fn loop_behavior(&self) -> LoopBehavior {
        self.inner.loop_behavior
    }

    /// Target groups in declaration order.
    #[must_use]
    pub fn targets(&self) -> &[StoryboardTarget] {
        &self.inner.targets
    }

    /// Maps a clock's elapsed time onto the storyboard timeline.
    ///
    /// Returns the local time and whether playback has run to completion
    /// (only possible with [`LoopBehavior::None`]).
    #[must_use]
    pub fn local_time(&self, elapsed: f64) -> (f64, bool) {
        let duration = self.duration();
        let elapsed = elapsed.max(0.0);
        if duration <= 0.0 {
            return (0.0, self.loop_behavior() == LoopBehavior::None);
        }
        match self.loop_behavior() {
            LoopBehavior::None => {
                if elapsed >= duration {
                    (duration, true)
                } else {
                    (elapsed, false)
                }
            }
            LoopBehavior::Loop => (elapsed % duration, false),
            LoopBehavior::Reverse => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "elapsed is non-negative; only the cycle parity matters"
                )]
                let cycle = (elapsed / duration) as u64;
                let t = elapsed - cycle as f64 * duration;
                if cycle % 2 == 1 {
                    (duration - t, false)
                } else {
                    (t, false)
                }
            }
        }
    }
}

/// Builder for [`Storyboard`].
#[derive(Debug, Default)]
pub struct StoryboardBuilder {
    duration: Option<f64>,
    loop_behavior: LoopBehavior,
    targets: Vec<StoryboardTarget>,
}

impl StoryboardBuilder {
    /// Sets an explicit duration instead of the longest track's.
    #[must_use]
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Sets the end-of-playback behavior.
    #[must_use]
    pub fn loop_behavior(mut self, behavior: LoopBehavior) -> Self {
        self.loop_behavior = behavior;
        self
    }

    /// Opens a new target group; later [`animate`](Self::animate) calls add to it.
    #[must_use]
    pub fn target(mut self, selector: Option<Selector>) -> Self {
        self.targets.push(StoryboardTarget {
            selector,
            animations: Vec::new(),
        });
        self
    }

    /// Animates `property` on the current target group.
    ///
    /// Opens a root target group if none is open.
    #[must_use]
    pub fn animate<T: Animatable>(self, property: &str, track: KeyframeTrack<T>) -> Self {
        self.animate_erased(property, Rc::new(track))
    }

    /// Animates `property` with an already erased track.
    #[must_use]
    pub fn animate_erased(mut self, property: &str, track: Rc<dyn AnimationTrack>) -> Self {
        if self.targets.is_empty() {
            self = self.target(None);
        }
        if let Some(group) = self.targets.last_mut() {
            group.animations.push(TargetAnimation {
                property: property.into(),
                track,
            });
        }
        self
    }

    /// Finishes the storyboard.
    #[must_use]
    pub fn build(self) -> Storyboard {
        let duration = self.duration.unwrap_or_else(|| {
            self.targets
                .iter()
                .flat_map(|t| t.animations.iter())
                .map(|a| a.track.duration())
                .fold(0.0, f64::max)
        });
        Storyboard {
            inner: Rc::new(StoryboardData {
                id: StoryboardId::next(),
                duration,
                loop_behavior: self.loop_behavior,
                targets: self.targets,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    fn board(behavior: LoopBehavior) -> Storyboard {
        Storyboard::builder()
            .loop_behavior(behavior)
            .animate(
                "Width",
                KeyframeTrack::new()
                    .key(0.0, 0.0_f64, Easing::Linear)
                    .key(2.0, 10.0, Easing::Linear),
            )
            .build()
    }

    #[test]
    fn duration_defaults_to_longest_track() {
        let b = board(LoopBehavior::None);
        assert_eq!(b.duration(), 2.0);
        let explicit = Storyboard::builder().duration(5.0).build();
        assert_eq!(explicit.duration(), 5.0);
    }

    #[test]
    fn ids_are_unique_and_shared_by_clones() {
        let a = board(LoopBehavior::None);
        let b = board(LoopBehavior::None);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn local_time_per_loop_behavior() {
        let once = board(LoopBehavior::None);
        assert_eq!(once.local_time(1.0), (1.0, false));
        assert_eq!(once.local_time(3.0), (2.0, true));

        let looping = board(LoopBehavior::Loop);
        assert_eq!(looping.local_time(3.0), (1.0, false));

        let reverse = board(LoopBehavior::Reverse);
        assert_eq!(reverse.local_time(1.5), (1.5, false));
        assert_eq!(reverse.local_time(2.5), (1.5, false));
        assert_eq!(reverse.local_time(4.5), (0.5, false));
    }

    #[test]
    fn animate_without_target_opens_root_group() {
        let b = board(LoopBehavior::None);
        assert!(b.targets()[0].selector.is_none());
        assert_eq!(&*b.targets()[0].animations[0].property, "Width");
    }
}
