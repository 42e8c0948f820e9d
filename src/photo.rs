//! Defines the [`Image`] and [`PlacedImage`] records that flow through the
//! grid arranger, along with the derived [`Orientation`] classification and
//! the validation [`Error`] raised for degenerate geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary classification of an image's shape. Orientation is never stored;
/// it is recomputed from the aspect ratio wherever it is needed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Taller than wide (aspect ratio below 1).
    Portrait,

    /// At least as wide as tall (aspect ratio of 1 or more).
    Landscape,
}

impl Orientation {
    /// Classifies an aspect ratio. Anything that doesn't compare below 1 is
    /// landscape, which includes `NaN`.
    pub fn of(aspect_ratio: f64) -> Orientation {
        if aspect_ratio < 1.0 {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image with its pixel dimensions and precomputed aspect ratio. This is
/// the input record of [`crate::grid::arrange`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// The identifier of the image on the image host (or its file stem).
    pub id: String,

    /// `width / height`.
    pub aspect_ratio: f64,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl Image {
    /// Builds an [`Image`] from its pixel dimensions, computing the aspect
    /// ratio. Returns [`Error::ZeroDimension`] if either dimension is zero.
    pub fn from_dimensions(id: &str, width: u32, height: u32) -> Result<Image> {
        let image = Image {
            id: id.to_owned(),
            aspect_ratio: width as f64 / height as f64,
            width,
            height,
        };
        image.validate()?;
        Ok(image)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::of(self.aspect_ratio)
    }

    /// Checks the invariants the arranger assumes but doesn't enforce: a
    /// non-empty id, non-zero dimensions, and a positive, finite aspect
    /// ratio.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::EmptyId);
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::ZeroDimension {
                id: self.id.clone(),
                width: self.width,
                height: self.height,
            });
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(Error::InvalidAspectRatio {
                id: self.id.clone(),
                aspect_ratio: self.aspect_ratio,
            });
        }
        Ok(())
    }
}

/// An [`Image`] annotated with its place in the grid: the number of columns
/// it spans and the (1-based) grid row it starts in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedImage {
    #[serde(flatten)]
    pub image: Image,

    /// One of 2, 3, 4, or 6.
    pub col_span: u8,

    pub row_start: u32,
}

impl PlacedImage {
    pub fn orientation(&self) -> Orientation {
        self.image.orientation()
    }
}

/// The result of a fallible [`Image`] validation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an image whose geometry can't be laid out meaningfully.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Returned when an image has an empty identifier.
    EmptyId,

    /// Returned when an image has a zero width or height.
    ZeroDimension { id: String, width: u32, height: u32 },

    /// Returned when an image's aspect ratio is zero, negative, or not
    /// finite.
    InvalidAspectRatio { id: String, aspect_ratio: f64 },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyId => write!(f, "image has an empty id"),
            Error::ZeroDimension { id, width, height } => write!(
                f,
                "image `{}` has a zero dimension ({}x{})",
                id, width, height
            ),
            Error::InvalidAspectRatio { id, aspect_ratio } => write!(
                f,
                "image `{}` has an invalid aspect ratio: {}",
                id, aspect_ratio
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_boundary() {
        assert_eq!(Orientation::of(0.999), Orientation::Portrait);
        assert_eq!(Orientation::of(1.0), Orientation::Landscape);
        assert_eq!(Orientation::of(1.5), Orientation::Landscape);
    }

    #[test]
    fn test_orientation_degenerate_ratios() {
        // Classification is a bare comparison; validation happens upstream.
        assert_eq!(Orientation::of(f64::NAN), Orientation::Landscape);
        assert_eq!(Orientation::of(0.0), Orientation::Portrait);
        assert_eq!(Orientation::of(-2.0), Orientation::Portrait);
        assert_eq!(Orientation::of(f64::INFINITY), Orientation::Landscape);
    }

    #[test]
    fn test_from_dimensions() -> Result<()> {
        let image = Image::from_dimensions("tram", 1200, 800)?;
        assert_eq!(image.aspect_ratio, 1.5);
        assert_eq!(image.orientation(), Orientation::Landscape);

        let image = Image::from_dimensions("alfama", 800, 1200)?;
        assert_eq!(image.orientation(), Orientation::Portrait);
        Ok(())
    }

    #[test]
    fn test_from_dimensions_zero_height() {
        assert_eq!(
            Image::from_dimensions("broken", 800, 0),
            Err(Error::ZeroDimension {
                id: "broken".to_owned(),
                width: 800,
                height: 0,
            })
        );
    }

    #[test]
    fn test_validate_rejects_nan_and_empty_id() {
        let mut image = Image {
            id: "nan".to_owned(),
            aspect_ratio: f64::NAN,
            width: 10,
            height: 10,
        };
        assert!(matches!(
            image.validate(),
            Err(Error::InvalidAspectRatio { .. })
        ));

        image.aspect_ratio = 1.0;
        image.id.clear();
        assert_eq!(image.validate(), Err(Error::EmptyId));
    }

    #[test]
    fn test_placed_image_wire_names() -> std::result::Result<(), serde_yaml::Error> {
        let placed = PlacedImage {
            image: Image {
                id: "tram".to_owned(),
                aspect_ratio: 1.5,
                width: 1200,
                height: 800,
            },
            col_span: 6,
            row_start: 1,
        };
        let yaml = serde_yaml::to_string(&placed)?;
        assert!(yaml.contains("aspectRatio: 1.5"), "{}", yaml);
        assert!(yaml.contains("colSpan: 6"), "{}", yaml);
        assert!(yaml.contains("rowStart: 1"), "{}", yaml);
        Ok(())
    }
}
