//! Per-record overlay: fixed layout table plus the composer that fills it

pub mod compose;
pub mod layout;

pub use compose::{compose, DrawOp, Overlay, OverlayPage};
pub use layout::{Layout, Point, Rect, Rgb, TextStyle};
