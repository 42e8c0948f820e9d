//! Exports the functions which stitch together the high-level steps of
//! laying out a gallery: loading the manifest ([`crate::gallery`]), resolving
//! image dimensions ([`crate::resolve`]), arranging the grid
//! ([`crate::grid`]), and rendering the page ([`crate::render`]).

use crate::config::Config;
use crate::gallery::{Error as GalleryError, Gallery, LayoutRequest};
use crate::grid::arrange;
use crate::photo::{Error as PhotoError, Image, PlacedImage};
use crate::render::{parse_template, Error as RenderError, Renderer};
use crate::resolve::{resolve_all, Chain, Error as ResolveError, FileResolver};
use std::fmt;
use std::path::{Path, PathBuf};

/// Resolves the dimensions of every photo in `gallery` and arranges them.
/// Declared dimensions take precedence; the remaining photos are looked up
/// in the configured images directory, if it exists.
pub fn arrange_gallery(config: &Config, gallery: &Gallery) -> Result<Vec<PlacedImage>> {
    let declared = gallery.declared();
    let files = match config.images_directory.is_dir() {
        true => FileResolver::index(&config.images_directory)?,
        false => FileResolver::default(),
    };
    let chain = Chain::new().with(&declared).with(&files);

    let images = resolve_all(&chain, &gallery.ids(), config.threads)?;
    let placed = arrange(images);
    tracing::info!(
        title = %gallery.title,
        images = placed.len(),
        rows = placed.last().map_or(0, |p| p.row_start),
        "arranged gallery"
    );
    Ok(placed)
}

/// Arranges a [`LayoutRequest`]. Raw image records are validated before
/// arrangement; galleries are resolved through [`arrange_gallery`].
pub fn arrange_request(config: &Config, request: LayoutRequest) -> Result<Vec<PlacedImage>> {
    match request {
        LayoutRequest::Images(images) => {
            images.iter().try_for_each(Image::validate)?;
            Ok(arrange(images))
        }
        LayoutRequest::Gallery(gallery) => arrange_gallery(config, &gallery),
    }
}

/// Loads the gallery manifest at `manifest`, arranges it, and writes the
/// rendered page into the configured output directory. Returns the path of
/// the written page.
pub fn build_gallery(config: &Config, manifest: &Path) -> Result<PathBuf> {
    let gallery = Gallery::from_path(manifest)?;
    let placed = arrange_gallery(config, &gallery)?;

    let template = parse_template(config.grid_template.iter())?;
    let renderer = Renderer {
        template: &template,
        home_page: &config.home_page,
        image_base_url: &config.image_base_url,
        image_variant: &config.image_variant,
        output_directory: &config.output_directory,
    };
    Ok(renderer.write_page(&gallery, &placed)?)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for laying out a gallery. Errors can come from loading the
/// manifest, resolving images, validating raw image records, or rendering.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading a manifest.
    Gallery(GalleryError),

    /// Returned for errors resolving image dimensions.
    Resolve(ResolveError),

    /// Returned when a raw image record has degenerate geometry.
    Photo(PhotoError),

    /// Returned for errors templating or writing the page.
    Render(RenderError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Gallery(err) => err.fmt(f),
            Error::Resolve(err) => err.fmt(f),
            Error::Photo(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Gallery(err) => Some(err),
            Error::Resolve(err) => Some(err),
            Error::Photo(err) => Some(err),
            Error::Render(err) => Some(err),
        }
    }
}

impl From<GalleryError> for Error {
    /// Converts [`GalleryError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: GalleryError) -> Error {
        Error::Gallery(err)
    }
}

impl From<ResolveError> for Error {
    /// Converts [`ResolveError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ResolveError) -> Error {
        Error::Resolve(err)
    }
}

impl From<PhotoError> for Error {
    /// Converts [`PhotoError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PhotoError) -> Error {
        Error::Photo(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}
