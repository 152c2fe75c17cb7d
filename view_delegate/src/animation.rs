// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! Translation of animation descriptors into native timelines.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kurbo::{Affine, Point, Vec2};
use peniko::Color;
use smallvec::SmallVec;
use tracing::warn;

use crate::color::resolve_color;
use crate::native::{RenderTransform, ViewCapability};

/// The identity of an [`Animation`] descriptor.
///
/// This is what start and completion events refer to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(NonZeroU64);

impl AnimationId {
    /// Allocates a new, unique `AnimationId`.
    pub fn next() -> Self {
        static ANIMATION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        let id = ANIMATION_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(id.try_into().unwrap())
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

/// The identity of one playing native timeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(NonZeroU64);

impl TimelineId {
    pub(crate) fn next() -> Self {
        static TIMELINE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        let id = TIMELINE_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(id.try_into().unwrap())
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timeline#{}", self.0)
    }
}

/// Describes a transition of a view to new visual properties.
///
/// Offsets are relative moves and are only animated when non-zero.
/// An opacity below zero means "not animated".
#[derive(Clone, Debug)]
pub struct Animation {
    /// The identity reported in start and completion events.
    pub id: AnimationId,
    /// How long each iteration runs.
    pub duration: Duration,
    /// How long to wait before starting.
    pub delay: Duration,
    /// Number of iterations. `0` repeats forever and `1` plays once.
    pub repeat: f64,
    /// Whether each iteration plays backwards after playing forwards.
    pub autoreverse: bool,
    /// A target render matrix. Takes precedence over `top` and `left`.
    pub transform: Option<Affine>,
    /// Target vertical position.
    pub top: f64,
    /// Target horizontal position.
    pub left: f64,
    /// Accepted, not animated.
    pub bottom: f64,
    /// Accepted, not animated.
    pub right: f64,
    /// Target background color, as a name or hex code.
    pub background_color: Option<String>,
    /// Target foreground color, as a name or hex code.
    pub color: Option<String>,
    /// Target opacity.
    pub opacity: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    /// Creates an animation that changes nothing and plays once.
    pub fn new() -> Self {
        Self {
            id: AnimationId::next(),
            duration: Duration::ZERO,
            delay: Duration::ZERO,
            repeat: 1.,
            autoreverse: false,
            transform: None,
            top: 0.,
            left: 0.,
            bottom: 0.,
            right: 0.,
            background_color: None,
            color: None,
            opacity: -1.,
        }
    }

    /// Builder-style method for the iteration duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Builder-style method for the start delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Builder-style method for the repeat count.
    pub fn with_repeat(mut self, repeat: f64) -> Self {
        self.repeat = repeat;
        self
    }

    /// Builder-style method for auto-reversal.
    pub fn with_autoreverse(mut self, autoreverse: bool) -> Self {
        self.autoreverse = autoreverse;
        self
    }

    /// Builder-style method for the target matrix.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Builder-style method for the target vertical position.
    pub fn with_top(mut self, top: f64) -> Self {
        self.top = top;
        self
    }

    /// Builder-style method for the target horizontal position.
    pub fn with_left(mut self, left: f64) -> Self {
        self.left = left;
        self
    }

    /// Builder-style method for the target background color.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Builder-style method for the target foreground color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder-style method for the target opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// How many times a timeline plays.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RepeatBehavior {
    /// One iteration.
    Once,
    /// Until the view goes away.
    Forever,
    /// A possibly fractional number of iterations.
    Count(f64),
}

impl RepeatBehavior {
    fn from_repeat(repeat: f64) -> Self {
        if repeat == 0. {
            Self::Forever
        } else if repeat == 1. {
            Self::Once
        } else {
            Self::Count(repeat)
        }
    }
}

/// A native property path an interpolation drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetProperty {
    /// Matrix element `M11`.
    MatrixM11,
    /// Matrix element `M12`.
    MatrixM12,
    /// Matrix element `M21`.
    MatrixM21,
    /// Matrix element `M22`.
    MatrixM22,
    /// Matrix element `OffsetX`.
    MatrixOffsetX,
    /// Matrix element `OffsetY`.
    MatrixOffsetY,
    /// Horizontal translation of a translate transform.
    TranslateX,
    /// Vertical translation of a translate transform.
    TranslateY,
    /// The background brush color of a panel.
    PanelBackground,
    /// The background brush color of a control.
    ControlBackground,
    /// The view opacity.
    Opacity,
}

impl TargetProperty {
    /// The native property path string.
    pub fn path(self) -> &'static str {
        match self {
            Self::MatrixM11 => "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.M11)",
            Self::MatrixM12 => "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.M12)",
            Self::MatrixM21 => "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.M21)",
            Self::MatrixM22 => "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.M22)",
            Self::MatrixOffsetX => {
                "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.OffsetX)"
            }
            Self::MatrixOffsetY => {
                "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.OffsetY)"
            }
            Self::TranslateX => "(UIElement.RenderTransform).(TranslateTransform.X)",
            Self::TranslateY => "(UIElement.RenderTransform).(TranslateTransform.Y)",
            Self::PanelBackground => "(Panel.Background).(SolidColorBrush.Color)",
            Self::ControlBackground => "(Control.Background).(SolidColorBrush.Color)",
            Self::Opacity => "Opacity",
        }
    }

    /// Whether this path drives one element of a matrix transform.
    pub fn is_matrix_element(self) -> bool {
        matches!(
            self,
            Self::MatrixM11
                | Self::MatrixM12
                | Self::MatrixM21
                | Self::MatrixM22
                | Self::MatrixOffsetX
                | Self::MatrixOffsetY
        )
    }
}

/// The value an interpolation ends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InterpolationValue {
    /// A scalar.
    Double(f64),
    /// A color.
    Color(Color),
}

/// One property interpolation inside a [`Timeline`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interpolation {
    /// What is animated.
    pub target: TargetProperty,
    /// Where it ends.
    pub to: InterpolationValue,
}

/// A native timeline: a group of interpolations sharing timing.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    /// When playback starts, relative to `begin_timeline`.
    pub begin_time: Duration,
    /// Total duration, including the begin time.
    pub duration: Duration,
    /// Whether iterations reverse.
    pub autoreverse: bool,
    /// How many iterations play.
    pub repeat: RepeatBehavior,
    /// The interpolations, in insertion order.
    pub children: SmallVec<[Interpolation; 6]>,
}

impl Timeline {
    /// Builds the timeline for `animation` on a view with `capability`, currently
    /// positioned at `position` inside its canvas.
    ///
    /// Also returns the render transform that has to be installed on the view
    /// before playback, if any interpolation drives one.
    pub fn build(
        animation: &Animation,
        capability: ViewCapability,
        position: Point,
    ) -> (Self, Option<RenderTransform>) {
        let mut timeline = Self {
            begin_time: animation.delay,
            duration: animation.duration + animation.delay,
            autoreverse: animation.autoreverse,
            repeat: RepeatBehavior::from_repeat(animation.repeat),
            children: SmallVec::new(),
        };
        let mut render_transform = None;

        if let Some(matrix) = animation.transform {
            render_transform = Some(RenderTransform::Matrix(Affine::IDENTITY));
            let [m11, m12, m21, m22, offset_x, offset_y] = matrix.as_coeffs();
            for (target, to) in [
                (TargetProperty::MatrixM11, m11),
                (TargetProperty::MatrixM12, m12),
                (TargetProperty::MatrixM21, m21),
                (TargetProperty::MatrixM22, m22),
                (TargetProperty::MatrixOffsetX, offset_x),
                (TargetProperty::MatrixOffsetY, offset_y),
            ] {
                timeline.push_double(target, to);
            }
        } else if animation.top != 0. || animation.left != 0. {
            render_transform = Some(RenderTransform::Translate(Vec2::ZERO));
            if animation.top != 0. {
                timeline.push_double(TargetProperty::TranslateY, animation.top - position.y);
            }
            if animation.left != 0. {
                timeline.push_double(TargetProperty::TranslateX, animation.left - position.x);
            }
        }

        for color in [&animation.background_color, &animation.color]
            .into_iter()
            .flatten()
        {
            let target = match capability {
                ViewCapability::Panel => TargetProperty::PanelBackground,
                ViewCapability::Control => TargetProperty::ControlBackground,
                ViewCapability::Other => {
                    warn!("cannot animate color `{color}` on a view without a background");
                    continue;
                }
            };
            timeline.children.push(Interpolation {
                target,
                to: InterpolationValue::Color(resolve_color(color)),
            });
        }

        if animation.opacity >= 0. {
            timeline.push_double(TargetProperty::Opacity, animation.opacity);
        }

        (timeline, render_transform)
    }

    fn push_double(&mut self, target: TargetProperty, to: f64) {
        self.children.push(Interpolation {
            target,
            to: InterpolationValue::Double(to),
        });
    }

    /// The interpolation driving `target`, if any.
    pub fn interpolation(&self, target: TargetProperty) -> Option<&Interpolation> {
        self.children.iter().find(|child| child.target == target)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::color::argb;

    fn build(animation: &Animation) -> Timeline {
        Timeline::build(animation, ViewCapability::Panel, Point::new(10., 20.)).0
    }

    #[test]
    fn timing_includes_delay() {
        let animation = Animation::new()
            .with_duration(Duration::from_millis(300))
            .with_delay(Duration::from_millis(100))
            .with_autoreverse(true);
        let timeline = build(&animation);
        assert_eq!(timeline.begin_time, Duration::from_millis(100));
        assert_eq!(timeline.duration, Duration::from_millis(400));
        assert!(timeline.autoreverse);
        assert_eq!(timeline.repeat, RepeatBehavior::Once);
        assert!(timeline.children.is_empty());
    }

    #[test]
    fn repeat_behavior() {
        assert_eq!(build(&Animation::new().with_repeat(0.)).repeat, RepeatBehavior::Forever);
        assert_eq!(build(&Animation::new().with_repeat(1.)).repeat, RepeatBehavior::Once);
        assert_eq!(
            build(&Animation::new().with_repeat(2.5)).repeat,
            RepeatBehavior::Count(2.5)
        );
    }

    #[test]
    fn transform_wins_over_offsets() {
        let animation = Animation::new()
            .with_transform(Affine::new([1., 2., 3., 4., 5., 6.]))
            .with_top(50.)
            .with_left(50.);
        let (timeline, transform) =
            Timeline::build(&animation, ViewCapability::Panel, Point::ZERO);

        assert_eq!(transform, Some(RenderTransform::Matrix(Affine::IDENTITY)));
        assert_eq!(timeline.children.len(), 6);
        assert!(timeline.children.iter().all(|child| child.target.is_matrix_element()));
        assert_eq!(
            timeline.interpolation(TargetProperty::MatrixOffsetY).unwrap().to,
            InterpolationValue::Double(6.)
        );
    }

    #[test]
    fn offsets_are_relative_to_canvas_position() {
        let animation = Animation::new().with_top(50.).with_left(40.);
        let (timeline, transform) =
            Timeline::build(&animation, ViewCapability::Control, Point::new(10., 20.));
        assert_eq!(transform, Some(RenderTransform::Translate(Vec2::ZERO)));
        assert_eq!(
            timeline.interpolation(TargetProperty::TranslateY).unwrap().to,
            InterpolationValue::Double(30.)
        );
        assert_eq!(
            timeline.interpolation(TargetProperty::TranslateX).unwrap().to,
            InterpolationValue::Double(30.)
        );
    }

    #[test]
    fn bottom_and_right_are_ignored() {
        let mut animation = Animation::new();
        animation.bottom = 10.;
        animation.right = 10.;
        let (timeline, transform) =
            Timeline::build(&animation, ViewCapability::Panel, Point::ZERO);
        assert!(timeline.children.is_empty());
        assert_eq!(transform, None);
    }

    #[test]
    fn color_targets_follow_capability() {
        let animation = Animation::new().with_background_color("red");
        let panel = Timeline::build(&animation, ViewCapability::Panel, Point::ZERO).0;
        assert_eq!(panel.children[0].target, TargetProperty::PanelBackground);
        assert_matches!(
            panel.children[0].to,
            InterpolationValue::Color(color) if argb(color) == 0xFFFF0000
        );

        let control = Timeline::build(&animation, ViewCapability::Control, Point::ZERO).0;
        assert_eq!(control.children[0].target, TargetProperty::ControlBackground);

        let other = Timeline::build(&animation, ViewCapability::Other, Point::ZERO).0;
        assert!(other.children.is_empty());
    }

    #[test]
    fn opacity_only_when_non_negative() {
        assert!(build(&Animation::new()).interpolation(TargetProperty::Opacity).is_none());

        let timeline = build(&Animation::new().with_opacity(0.5));
        assert_eq!(timeline.children.len(), 1);
        assert_eq!(
            timeline.children[0],
            Interpolation {
                target: TargetProperty::Opacity,
                to: InterpolationValue::Double(0.5),
            }
        );
        assert_eq!(build(&Animation::new().with_opacity(0.)).children.len(), 1);
    }

    #[test]
    fn paths() {
        assert_eq!(
            TargetProperty::MatrixM11.path(),
            "(UIElement.RenderTransform).(MatrixTransform.Matrix).(Matrix.M11)"
        );
        assert_eq!(
            TargetProperty::TranslateY.path(),
            "(UIElement.RenderTransform).(TranslateTransform.Y)"
        );
        assert_eq!(TargetProperty::Opacity.path(), "Opacity");
    }
}
