// Presentation layer: pure ratatui drawing from `&App`.

mod draw;
pub mod overlay;
mod panels;
pub mod style;

pub use draw::draw;
