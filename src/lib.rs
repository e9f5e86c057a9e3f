//! ZPaint: a small raster editor built around a toolbox of eight drawing
//! tools operating on a live/persisted canvas pair.
#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod logger;

pub mod chrome;
pub mod cli;
pub mod components;
pub mod export;
pub mod geometry;
pub mod ops;
pub mod settings;
pub mod style;
pub mod surface;
pub mod toolbox;

pub use components::tools::{Key, Tool, ToolKind};
pub use geometry::{BoundingBox, Position, ZRect};
pub use style::{Color, StyleSettings};
pub use surface::Surface;
pub use toolbox::Toolbox;
