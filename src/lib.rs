//! Textbehind places styled text between a photo's blurred background and its sharp foreground
//! subject.
//!
//! The engine is three small pieces wired together by an [`Editor`] session:
//!
//! - [`feather`] / [`build_matte`] turn a segmentation signal into a soft-edged [`AlphaMatte`]
//! - [`LayerStackRenderer`] composites background → text → subject into a [`Raster`]
//! - [`History`] keeps bounded undo/redo over layer-list snapshots
//!
//! Headless rendering from a JSON [`Project`] is also available, and is what the `textbehind`
//! binary uses.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod editor;
mod foundation;
mod layer;
mod mask;
mod project;
mod render;
mod segment;

pub mod history;

pub use crate::assets::color::Color;
pub use crate::assets::decode::{DecodedImage, decode_image, encode_png};
pub use crate::assets::fonts::{FontBook, FontOpts, ResolvedFont};
pub use crate::editor::segmentation::{ImageToken, SegmentationOutcome, SegmentationTicket};
pub use crate::editor::session::{DEFAULT_BLUR_PX, Editor, EditorOpts, ImageState};
pub use crate::foundation::core::{Affine, Canvas, Point, Vec2};
pub use crate::foundation::error::{TextBehindError, TextBehindResult};
pub use crate::foundation::logging::{LoggingConfig, init_logging};
pub use crate::history::{History, MAX_HISTORY};
pub use crate::layer::edit::LayerPatch;
pub use crate::layer::model::{
    FONT_SIZE_RANGE, LayerId, LayerList, OPACITY_RANGE, OUTLINE_WIDTH_RANGE, POSITION_PCT_RANGE,
    ROTATION_DEG_RANGE, SHADOW_BLUR_RANGE, TextAlign, TextLayer,
};
pub use crate::mask::feather::{
    AlphaMatte, DEFAULT_FEATHER_RADIUS, MaskOpts, build_matte, feather,
};
pub use crate::mask::signal::SegmentationSignal;
pub use crate::project::{Project, ProjectLayer};
pub use crate::render::blur::MAX_BLUR_PX;
pub use crate::render::stack::{
    DEFAULT_SHADOW_OFFSET_Y, LayerStackRenderer, Raster, RenderInput, RendererOpts,
};
pub use crate::segment::{MaskImageSegmenter, Segmenter};
