//! The grid arranger. Assigns each image in a sequence a column span and a
//! grid row so that a fixed [`GRID_COLUMNS`]-column CSS grid renders a
//! mosaic of portrait and landscape photos.
//!
//! Arrangement is a single greedy pass. At each row boundary the
//! orientations of the next one to three images are tested against an
//! ordered table of row patterns and the first match decides how many images
//! the row takes and how wide each one is:
//!
//! | Pattern                              | Spans       |
//! |--------------------------------------|-------------|
//! | portrait, landscape                  | `[2, 4]`    |
//! | landscape, portrait                  | `[4, 2]`    |
//! | portrait, portrait, portrait         | `[2, 2, 2]` |
//! | landscape, landscape                 | `[3, 3]`    |
//! | landscape                            | `[6]`       |
//! | portrait                             | `[6]`       |
//!
//! Mixed pairs win over same-orientation groupings, and the single-image
//! rows guarantee progress. The order of the table is significant.

use crate::photo::{Image, Orientation, Orientation::*, PlacedImage};

/// The number of columns in the grid. Every row's spans sum to this.
pub const GRID_COLUMNS: u8 = 6;

/// A row pattern: the leading orientations it matches and the span given to
/// each matched image.
struct Rule {
    pattern: &'static [Orientation],
    spans: &'static [u8],
}

const RULES: [Rule; 6] = [
    Rule {
        pattern: &[Portrait, Landscape],
        spans: &[2, 4],
    },
    Rule {
        pattern: &[Landscape, Portrait],
        spans: &[4, 2],
    },
    Rule {
        pattern: &[Portrait, Portrait, Portrait],
        spans: &[2, 2, 2],
    },
    Rule {
        pattern: &[Landscape, Landscape],
        spans: &[3, 3],
    },
    Rule {
        pattern: &[Landscape],
        spans: &[GRID_COLUMNS],
    },
    Rule {
        pattern: &[Portrait],
        spans: &[GRID_COLUMNS],
    },
];

// Unreachable while the table ends in the two single-image rules.
const FALLBACK: &[u8] = &[GRID_COLUMNS];

/// Returns the spans of the row starting at the head of `remaining`. A rule
/// is only eligible if at least as many images remain as its pattern is
/// long, which `starts_with` gives us for free.
fn next_row(remaining: &[Orientation]) -> &'static [u8] {
    RULES
        .iter()
        .find(|rule| remaining.starts_with(rule.pattern))
        .map_or(FALLBACK, |rule| rule.spans)
}

/// Arranges `images` into grid rows. The output has the same length and
/// order as the input; each image is annotated with its column span and its
/// 1-based row. Rows are numbered contiguously from 1.
///
/// The arranger never fails and never validates geometry: orientation is a
/// bare `aspect_ratio < 1.0` comparison, so callers wanting to reject `NaN`
/// or non-positive ratios should use [`Image::validate`] beforehand.
pub fn arrange<I>(images: I) -> Vec<PlacedImage>
where
    I: IntoIterator<Item = Image>,
{
    let images: Vec<Image> = images.into_iter().collect();
    let orientations: Vec<Orientation> = images.iter().map(Image::orientation).collect();

    let mut placed = Vec::with_capacity(images.len());
    let mut spans: &[u8] = &[];
    let mut row = 0;
    for (i, image) in images.into_iter().enumerate() {
        if spans.is_empty() {
            spans = next_row(&orientations[i..]);
            row += 1;
        }
        placed.push(PlacedImage {
            image,
            col_span: spans[0],
            row_start: row,
        });
        spans = &spans[1..];
    }
    placed
}

/// A single grid row: consecutive placed images sharing a `row_start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    /// The 1-based grid row.
    pub number: u32,

    pub images: &'a [PlacedImage],
}

impl Row<'_> {
    /// The total column span of the row.
    pub fn width(&self) -> u32 {
        self.images.iter().map(|p| p.col_span as u32).sum()
    }
}

/// Groups the output of [`arrange`] into [`Row`]s for rendering.
pub fn rows(placed: &[PlacedImage]) -> impl Iterator<Item = Row<'_>> {
    placed
        .chunk_by(|a, b| a.row_start == b.row_start)
        .map(|images| Row {
            number: images[0].row_start,
            images,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, aspect_ratio: f64) -> Image {
        Image {
            id: id.to_owned(),
            aspect_ratio,
            width: (aspect_ratio * 1000.0) as u32,
            height: 1000,
        }
    }

    fn images(ratios: &[f64]) -> Vec<Image> {
        ratios
            .iter()
            .enumerate()
            .map(|(i, r)| image(&i.to_string(), *r))
            .collect()
    }

    fn layout(placed: &[PlacedImage]) -> Vec<(u8, u32)> {
        placed.iter().map(|p| (p.col_span, p.row_start)).collect()
    }

    // Every orientation sequence up to `max_len` long.
    fn all_sequences(max_len: usize) -> Vec<Vec<f64>> {
        let mut sequences = Vec::new();
        for len in 0..=max_len {
            for bits in 0..(1u32 << len) {
                sequences.push(
                    (0..len)
                        .map(|i| if bits & (1 << i) == 0 { 0.75 } else { 1.5 })
                        .collect(),
                );
            }
        }
        sequences
    }

    #[test]
    fn test_empty() {
        assert!(arrange(Vec::<Image>::new()).is_empty());
    }

    #[test]
    fn test_single_landscape() {
        assert_eq!(layout(&arrange(images(&[2.0]))), vec![(6, 1)]);
    }

    #[test]
    fn test_single_portrait() {
        assert_eq!(layout(&arrange(images(&[0.5]))), vec![(6, 1)]);
    }

    #[test]
    fn test_portrait_landscape_before_triple_portrait() {
        let placed = arrange(images(&[0.5, 1.5, 0.6, 0.6, 0.6]));
        assert_eq!(
            layout(&placed),
            vec![(2, 1), (4, 1), (2, 2), (2, 2), (2, 2)]
        );
    }

    #[test]
    fn test_double_landscape_then_trailing_portrait() {
        let placed = arrange(images(&[1.5, 1.6, 0.5]));
        assert_eq!(layout(&placed), vec![(3, 1), (3, 1), (6, 2)]);
    }

    #[test]
    fn test_landscape_portrait() {
        let placed = arrange(images(&[1.5, 0.5]));
        assert_eq!(layout(&placed), vec![(4, 1), (2, 1)]);
    }

    #[test]
    fn test_lone_portrait_before_mixed_pair() {
        // Two portraits can't fill a row, so the first stands alone and the
        // second pairs with the landscape.
        let placed = arrange(images(&[0.5, 0.5, 1.5]));
        assert_eq!(layout(&placed), vec![(6, 1), (2, 2), (4, 2)]);
    }

    #[test]
    fn test_two_trailing_portraits() {
        let placed = arrange(images(&[1.5, 1.5, 0.5, 0.5]));
        assert_eq!(layout(&placed), vec![(3, 1), (3, 1), (6, 2), (6, 3)]);
    }

    #[test]
    fn test_square_is_landscape() {
        let placed = arrange(images(&[1.0, 0.8]));
        assert_eq!(layout(&placed), vec![(4, 1), (2, 1)]);
    }

    #[test]
    fn test_preserves_length_and_order() {
        for ratios in all_sequences(8) {
            let input = images(&ratios);
            let placed = arrange(input.clone());
            assert_eq!(placed.len(), input.len());
            for (p, i) in placed.iter().zip(input.iter()) {
                assert_eq!(&p.image, i);
            }
        }
    }

    #[test]
    fn test_rows_sum_to_grid_width() {
        for ratios in all_sequences(8) {
            let placed = arrange(images(&ratios));
            for row in rows(&placed) {
                assert_eq!(
                    row.width(),
                    GRID_COLUMNS as u32,
                    "row {} of {:?}",
                    row.number,
                    ratios
                );
            }
        }
    }

    #[test]
    fn test_rows_are_contiguous_from_one() {
        for ratios in all_sequences(8) {
            let placed = arrange(images(&ratios));
            let mut expected = 1;
            for row in rows(&placed) {
                assert_eq!(row.number, expected, "{:?}", ratios);
                expected += 1;
            }
            for pair in placed.windows(2) {
                let step = pair[1].row_start - pair[0].row_start;
                assert!(step == 0 || step == 1, "{:?}", ratios);
            }
        }
    }

    #[test]
    fn test_spans_are_known_values() {
        for ratios in all_sequences(6) {
            for p in arrange(images(&ratios)) {
                assert!([2, 3, 4, 6].contains(&p.col_span));
            }
        }
    }

    #[test]
    fn test_nan_is_laid_out_as_landscape() {
        let placed = arrange(images(&[f64::NAN, 0.5]));
        assert_eq!(layout(&placed), vec![(4, 1), (2, 1)]);
    }

    #[test]
    fn test_rows_groups_members() {
        let placed = arrange(images(&[0.5, 1.5, 0.6, 0.6, 0.6, 2.0]));
        let grouped: Vec<Vec<&str>> = rows(&placed)
            .map(|row| row.images.iter().map(|p| p.image.id.as_str()).collect())
            .collect();
        assert_eq!(
            grouped,
            vec![vec!["0", "1"], vec!["2", "3", "4"], vec!["5"]]
        );
    }
}
