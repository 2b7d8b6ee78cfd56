pub mod renderer;

pub use renderer::{cell_view, effect_badges, CellView, Renderer};
