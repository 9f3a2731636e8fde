use crate::board::{BoardPipeline, CoordinateError};
use crate::core::{Cell, CoordinateFrame, RgbImageView};
use crate::pieces::LoosePieceLocator;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Borrow an `image::RgbImage` as the lightweight `gridsight-core` view.
pub fn rgb_view(img: &::image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Decode any format `image` understands into 8-bit RGB.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<::image::RgbImage, DetectError> {
    let path = path.as_ref();
    ::image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| DetectError::Image {
            path: path.display().to_string(),
            source,
        })
}

/// A loose piece with its position in the image and on the gantry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocatedPiece {
    pub color: Cell,
    pub image: Point2<f64>,
    pub robot: Point2<f64>,
}

/// Find loose pieces in `img` and map each into robot coordinates with the
/// pipeline's current calibration.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = img.width(), height = img.height()))
)]
pub fn locate_pieces(
    pipeline: &BoardPipeline,
    locator: &LoosePieceLocator,
    img: &::image::RgbImage,
) -> Result<Vec<LocatedPiece>, CoordinateError> {
    let found = locator.locate(&rgb_view(img));
    let tagged = found
        .black
        .iter()
        .map(|p| (Cell::Black, *p))
        .chain(found.white.iter().map(|p| (Cell::White, *p)));

    tagged
        .map(|(color, image)| {
            let robot = pipeline.to_robot_coord(image, CoordinateFrame::Image)?;
            Ok(LocatedPiece {
                color,
                image,
                robot,
            })
        })
        .collect()
}
