pub mod driver;
pub mod error;
pub mod marcher;
pub mod math;

pub use error::{RenderError, RenderResult};
pub use marcher::{render_sample, MarchConfig, MarchResult, Renderable, Rgba};
