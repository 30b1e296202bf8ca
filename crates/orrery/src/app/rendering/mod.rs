mod raster;
mod renderer;
mod text;

pub use renderer::{HudData, Renderer};
