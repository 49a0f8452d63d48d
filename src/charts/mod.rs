//! Charts module - Chart rendering

mod gallery;
mod renderer;

pub use gallery::ChartGallery;
pub use renderer::StaticChartRenderer;
