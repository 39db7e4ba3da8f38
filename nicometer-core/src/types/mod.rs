//! Identity types shared by the clock, the sessions and the renderer.

pub mod ids;

pub use ids::{Part, Property, PropertyKey, SessionId, WidgetId};
