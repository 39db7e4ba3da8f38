//! Session, widget and property identities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::Category;

/// Identity of one meter session.
///
/// Handed out in increasing order by [`crate::session::SessionFactory`], so a
/// session created by a reset always compares greater than the one it
/// replaces. Scheduled callbacks carry this id and are checked against the
/// live container before they are applied.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub struct SessionId(pub u64);

impl SessionId {
    /// The raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The rendered parts of a session.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash,
)]
pub enum Part {
    /// The whole session; its opacity is what the crossfade animates.
    Root,
    /// The gauge needle; the only part with an angle.
    Needle,
    /// The zone strip that doubles as the reset control.
    ResetControl,
    /// "Scanning..." image shown while the needle runs.
    ScanningIndicator,
    /// One result image per category, all stacked in the same place.
    ResultImage(Category),
}

impl Part {
    /// Every part a session mounts, in paint order.
    pub fn all() -> impl Iterator<Item = Part> {
        [
            Part::Root,
            Part::Needle,
            Part::ScanningIndicator,
            Part::ResetControl,
        ]
        .into_iter()
        .chain(Category::ALL.into_iter().map(Part::ResultImage))
    }
}

/// A part of one particular session.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash,
)]
pub struct WidgetId {
    /// Owning session.
    pub session: SessionId,
    /// Which part of it.
    pub part: Part,
}

impl WidgetId {
    /// Name `part` of `session`.
    pub fn new(session: SessionId, part: Part) -> Self {
        Self { session, part }
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            Part::ResultImage(category) => {
                write!(f, "{}/result[{}]", self.session, category.key())
            }
            part => write!(f, "{}/{:?}", self.session, part),
        }
    }
}

/// Animatable properties. Angles are degrees, opacities `0.0..=1.0`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash,
)]
pub enum Property {
    /// Rotation in degrees, negative to the left.
    Angle,
    /// Opacity from 0 (hidden) to 1.
    Opacity,
}

/// One animatable value: a property on a widget.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash,
)]
pub struct PropertyKey {
    /// Widget the value belongs to.
    pub widget: WidgetId,
    /// Which of its values.
    pub property: Property,
}

impl PropertyKey {
    /// The angle of `widget`.
    pub fn angle(widget: WidgetId) -> Self {
        Self {
            widget,
            property: Property::Angle,
        }
    }

    /// The opacity of `widget`.
    pub fn opacity(widget: WidgetId) -> Self {
        Self {
            widget,
            property: Property::Opacity,
        }
    }

    /// Session owning the value.
    pub fn session(&self) -> SessionId {
        self.widget.session
    }
}
