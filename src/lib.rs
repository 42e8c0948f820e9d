//! The library code for `photogrid`, which lays out photo galleries as a
//! 6-column CSS grid mosaic for a personal static site. The architecture can
//! be generally broken down into three steps:
//!
//! 1. Resolving the dimensions of each photo ([`crate::resolve`])
//! 2. Arranging the photos into grid rows ([`crate::grid`])
//! 3. Rendering the arrangement through a template ([`crate::render`])
//!
//! The second step is the heart of the crate. [`grid::arrange`] is a pure
//! function: given images in display order, it assigns each a column span
//! (2, 3, 4, or 6) and a row, such that every row's spans fill the grid
//! exactly. It never reorders images and never fails.
//!
//! The first step only exists to feed the second: photos either declare
//! their dimensions in the gallery manifest ([`crate::gallery`]) or have
//! them read from image files on disk. The third step maps each row and
//! span onto the theme's template and writes the page to disk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod gallery;
pub mod grid;
pub mod photo;
pub mod render;
pub mod resolve;
pub mod text;

pub use grid::{arrange, GRID_COLUMNS};
pub use photo::{Image, Orientation, PlacedImage};
