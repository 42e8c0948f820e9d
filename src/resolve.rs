//! Resolves image identifiers into [`Image`] records carrying pixel
//! dimensions and an aspect ratio. This sits upstream of the arranger, which
//! only ever sees fully resolved images.
//!
//! Dimensions come either from the gallery manifest ([`DeclaredResolver`])
//! or from image files on disk ([`FileResolver`]). A [`Chain`] tries several
//! resolvers in turn, and [`resolve_all`] resolves a whole gallery, fanning
//! file reads out over worker threads while preserving input order.

use crate::photo::{self, Image};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File extensions [`FileResolver`] treats as images. Compared
/// case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Looks up the dimensions of an image by its identifier.
pub trait Resolver: Sync {
    /// Returns the resolved image, or [`Error::NotFound`] if this resolver
    /// doesn't know the identifier.
    fn resolve(&self, id: &str) -> Result<Image>;
}

/// Resolves images whose dimensions were declared up front, typically in a
/// gallery manifest.
#[derive(Debug, Default, Clone)]
pub struct DeclaredResolver {
    dimensions: HashMap<String, (u32, u32)>,
}

impl DeclaredResolver {
    pub fn new() -> DeclaredResolver {
        DeclaredResolver::default()
    }

    /// Declares the dimensions of `id`, replacing any earlier declaration.
    pub fn insert(&mut self, id: &str, width: u32, height: u32) {
        self.dimensions.insert(id.to_owned(), (width, height));
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

impl Resolver for DeclaredResolver {
    fn resolve(&self, id: &str) -> Result<Image> {
        match self.dimensions.get(id) {
            Some(&(width, height)) => Ok(Image::from_dimensions(id, width, height)?),
            None => Err(Error::NotFound(id.to_owned())),
        }
    }
}

/// Resolves images by reading the headers of files in an images directory.
/// Files are keyed by their stem, so `images/2024/tram-28.jpg` resolves the
/// identifier `tram-28`.
#[derive(Debug, Default, Clone)]
pub struct FileResolver {
    files: HashMap<String, PathBuf>,
}

impl FileResolver {
    /// Walks `directory` recursively and indexes every file with one of the
    /// [`IMAGE_EXTENSIONS`]. Entries are visited in file-name order and the
    /// first file with a given stem wins.
    pub fn index(directory: &Path) -> Result<FileResolver> {
        use walkdir::WalkDir;

        let mut files = HashMap::new();
        for result in WalkDir::new(directory).sort_by_file_name() {
            let entry = result?;
            if !entry.file_type().is_file() || !is_image(entry.path()) {
                continue;
            }
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                files
                    .entry(stem.to_owned())
                    .or_insert_with(|| entry.path().to_owned());
            }
        }

        tracing::info!(
            directory = %directory.display(),
            images = files.len(),
            "indexed images directory"
        );
        Ok(FileResolver { files })
    }

    /// The path indexed for `id`, if any.
    pub fn path(&self, id: &str) -> Option<&Path> {
        self.files.get(id).map(PathBuf::as_path)
    }
}

fn is_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(extension) => IMAGE_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension)),
        None => false,
    }
}

impl Resolver for FileResolver {
    fn resolve(&self, id: &str) -> Result<Image> {
        let path = self
            .path(id)
            .ok_or_else(|| Error::NotFound(id.to_owned()))?;
        let (width, height) = image::image_dimensions(path).map_err(|err| Error::Decode {
            path: path.to_owned(),
            err,
        })?;
        Ok(Image::from_dimensions(id, width, height)?)
    }
}

/// Tries each resolver in order. A resolver that doesn't know an identifier
/// passes it on to the next one; any other failure ends the search.
#[derive(Default)]
pub struct Chain<'a> {
    resolvers: Vec<&'a dyn Resolver>,
}

impl<'a> Chain<'a> {
    pub fn new() -> Chain<'a> {
        Chain::default()
    }

    pub fn with(mut self, resolver: &'a dyn Resolver) -> Chain<'a> {
        self.resolvers.push(resolver);
        self
    }
}

impl Resolver for Chain<'_> {
    fn resolve(&self, id: &str) -> Result<Image> {
        for resolver in &self.resolvers {
            match resolver.resolve(id) {
                Err(Error::NotFound(_)) => continue,
                result => return result,
            }
        }
        Err(Error::NotFound(id.to_owned()))
    }
}

/// Resolves every identifier in `ids`, returning images in the same order.
/// With fewer than two `threads` the work happens on the calling thread;
/// otherwise it is spread over that many workers. If any identifier fails,
/// the error for the earliest failing identifier is returned.
pub fn resolve_all<R>(resolver: &R, ids: &[String], threads: usize) -> Result<Vec<Image>>
where
    R: Resolver + ?Sized,
{
    if threads < 2 || ids.len() < 2 {
        ids.iter().map(|id| resolve_one(resolver, id)).collect()
    } else {
        resolve_parallel(resolver, ids, threads)
    }
}

fn resolve_parallel<R>(resolver: &R, ids: &[String], threads: usize) -> Result<Vec<Image>>
where
    R: Resolver + ?Sized,
{
    use crossbeam_channel::unbounded;
    use std::thread;

    let (tx, rx) = unbounded::<(usize, &str)>();
    for (i, id) in ids.iter().enumerate() {
        tx.send((i, id.as_str())).map_err(|_| Error::QueueClosed)?;
    }
    drop(tx);

    let joined = thread::scope(|scope| {
        let workers: Vec<_> = (0..threads.min(ids.len()))
            .map(|_| {
                let rx = rx.clone();
                scope.spawn(move || {
                    rx.iter()
                        .map(|(i, id)| (i, resolve_one(resolver, id)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join())
            .collect::<Vec<_>>()
    });

    let mut results = Vec::with_capacity(ids.len());
    for worker in joined {
        results.extend(worker.map_err(|_| Error::WorkerPanicked)?);
    }
    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, result)| result).collect()
}

fn resolve_one<R>(resolver: &R, id: &str) -> Result<Image>
where
    R: Resolver + ?Sized,
{
    let image = resolver.resolve(id)?;
    image.validate()?;
    tracing::debug!(
        id = id,
        width = image.width,
        height = image.height,
        aspect_ratio = image.aspect_ratio,
        "resolved image"
    );
    Ok(image)
}

/// The result of a fallible resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem resolving an image's dimensions.
#[derive(Debug)]
pub enum Error {
    /// Returned when no resolver knows the identifier.
    NotFound(String),

    /// Returned when the images directory can't be walked.
    Walk(walkdir::Error),

    /// Returned when an image file's header can't be read.
    Decode {
        path: PathBuf,
        err: image::ImageError,
    },

    /// Returned when the resolved geometry is degenerate.
    InvalidImage(photo::Error),

    /// Returned when the work queue is closed before all work is queued.
    QueueClosed,

    /// Returned when a worker thread panics.
    WorkerPanicked,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(id) => write!(f, "no dimensions found for image `{}`", id),
            Error::Walk(err) => err.fmt(f),
            Error::Decode { path, err } => {
                write!(f, "reading image '{}': {}", path.display(), err)
            }
            Error::InvalidImage(err) => err.fmt(f),
            Error::QueueClosed => write!(f, "resolver work queue closed unexpectedly"),
            Error::WorkerPanicked => write!(f, "resolver worker thread panicked"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Walk(err) => Some(err),
            Error::Decode { path: _, err } => Some(err),
            Error::InvalidImage(err) => Some(err),
            Error::NotFound(_) | Error::QueueClosed | Error::WorkerPanicked => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator while indexing the images directory.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}

impl From<photo::Error> for Error {
    /// Converts [`photo::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator when validating resolved images.
    fn from(err: photo::Error) -> Error {
        Error::InvalidImage(err)
    }
}
