pub mod color;
pub mod compare;
pub mod config;
pub mod diff;
pub mod error;
pub mod pixel;
pub mod raster;
pub mod server;

pub use compare::{Algorithm, DiffSettings, ImageComparer};
pub use diff::{DiffError, DiffResult, diff};
pub use pixel::{ExactPixelComparer, PerceptualPixelComparer, PixelComparer, PixelOutcome};
pub use raster::{Bounds, Placed, Raster};
