// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values that can be interpolated between keyframes.

use kurbo::{Point, Size, Vec2};
use trellis_property::PropertyValue;

/// A property value type a keyframe track can drive.
pub trait Animatable: PropertyValue {
    /// The value `t` of the way from `self` to `to`.
    ///
    /// `t` is already eased and normally lies in `[0, 1]`.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Animatable for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Animatable for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "interpolating between two f32 values stays in f32 range"
    )]
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        (f64::from(*self)).interpolate(&f64::from(*to), t) as Self
    }
}

impl Animatable for i32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the result lies between two i32 values"
    )]
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        let v = f64::from(*self).interpolate(&f64::from(*to), t);
        // Round half away from zero; `as` truncates toward zero.
        if v >= 0.0 {
            (v + 0.5) as Self
        } else {
            (v - 0.5) as Self
        }
    }
}

impl Animatable for bool {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if t < 1.0 { *self } else { *to }
    }
}

impl Animatable for Point {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self::new(self.x.interpolate(&to.x, t), self.y.interpolate(&to.y, t))
    }
}

impl Animatable for Vec2 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self::new(self.x.interpolate(&to.x, t), self.y.interpolate(&to.y, t))
    }
}

impl Animatable for Size {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self::new(
            self.width.interpolate(&to.width, t),
            self.height.interpolate(&to.height, t),
        )
    }
}
