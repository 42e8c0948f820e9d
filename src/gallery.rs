//! Defines the [`Gallery`] manifest, the YAML document naming a set of photos
//! in display order, and the [`LayoutRequest`] accepted by the `arrange`
//! command.
//!
//! A gallery manifest looks like this:
//!
//! ```yaml
//! title: Lisbon
//! date: 2024-05-02
//! description: A long weekend.
//! photos:
//!   - tram-28
//!   - { id: alfama, width: 1200, height: 1800 }
//! ```
//!
//! Photos listed by bare identifier have their dimensions resolved from the
//! images directory; photos with declared dimensions never touch the disk.

use crate::date;
use crate::photo::Image;
use crate::resolve::DeclaredResolver;
use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A single photo entry in a gallery manifest.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Photo {
    /// A photo known only by its identifier.
    Id(#[serde(deserialize_with = "scalar_id")] String),

    /// A photo whose pixel dimensions are declared in the manifest.
    Sized {
        #[serde(deserialize_with = "scalar_id")]
        id: String,
        width: u32,
        height: u32,
    },
}

// YAML reads a bare `- 2024` as an integer; identifiers are always text.
fn scalar_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(u64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(id) => id,
        Scalar::Integer(id) => id.to_string(),
    })
}

impl Photo {
    pub fn id(&self) -> &str {
        match self {
            Photo::Id(id) => id,
            Photo::Sized { id, .. } => id,
        }
    }
}

/// An ordered set of photos with some page metadata.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Gallery {
    /// The title of the gallery. Also the source of the output file name.
    pub title: String,

    /// Either `YYYY-MM-DD` or a photo-stream id (`YYYY/DDD`).
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// The identifier of the photo shown when the gallery is linked from
    /// elsewhere. It need not be one of `photos`.
    #[serde(default)]
    pub cover_image: Option<String>,

    /// The photos, in display order.
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl Gallery {
    /// Loads a gallery manifest from a YAML file.
    pub fn from_path(path: &Path) -> Result<Gallery> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: Some(path.to_owned()),
            err,
        })
    }

    /// The photo identifiers in display order.
    pub fn ids(&self) -> Vec<String> {
        self.photos.iter().map(|p| p.id().to_owned()).collect()
    }

    /// A resolver for every photo that declares its own dimensions.
    pub fn declared(&self) -> DeclaredResolver {
        let mut declared = DeclaredResolver::new();
        for photo in &self.photos {
            if let Photo::Sized { id, width, height } = photo {
                declared.insert(id, *width, *height);
            }
        }
        declared
    }
}

/// The file extensions recognised as gallery manifests by [`index`].
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Loads every manifest under `directory`, most recent first by date.
/// Undated galleries come last, ordered by title.
pub fn index(directory: &Path) -> Result<Vec<(PathBuf, Gallery)>> {
    use walkdir::WalkDir;

    let mut galleries = Vec::new();
    for result in WalkDir::new(directory).sort_by_file_name() {
        let entry = result?;
        if entry.file_type().is_file() && is_manifest(entry.path()) {
            galleries.push((entry.path().to_owned(), Gallery::from_path(entry.path())?));
        }
    }
    galleries.sort_by(|(_, a), (_, b)| match (&a.date, &b.date) {
        (Some(x), Some(y)) => date::newest_first(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    });
    Ok(galleries)
}

fn is_manifest(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(extension) => MANIFEST_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension)),
        None => false,
    }
}

impl std::str::FromStr for Gallery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|err| Error::Parse { path: None, err })
    }
}

/// The input of the `arrange` command: either a gallery manifest or a list
/// of already resolved image records (`{id, aspectRatio, width, height}`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum LayoutRequest {
    Images(Vec<Image>),
    Gallery(Gallery),
}

impl LayoutRequest {
    pub fn from_path(path: &Path) -> Result<LayoutRequest> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: Some(path.to_owned()),
            err,
        })
    }
}

impl std::str::FromStr for LayoutRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|err| Error::Parse { path: None, err })
    }
}

/// The result of loading a manifest.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading a manifest.
#[derive(Debug)]
pub enum Error {
    /// Returned when the manifest file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the manifest isn't valid YAML or doesn't match the
    /// expected shape.
    Parse {
        path: Option<PathBuf>,
        err: serde_yaml::Error,
    },

    /// Returned when a galleries directory can't be walked.
    Walk(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "opening manifest '{}': {}", path.display(), err)
            }
            Error::Parse {
                path: Some(path),
                err,
            } => write!(f, "parsing manifest '{}': {}", path.display(), err),
            Error::Parse { path: None, err } => write!(f, "parsing manifest: {}", err),
            Error::Walk(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::Walk(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator while indexing a galleries directory.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}
