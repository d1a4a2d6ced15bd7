//! JSON project documents for headless rendering.
//!
//! ```json
//! { "image": "photo.jpg", "mask": "mask.png", "blur_px": 5,
//!   "layers": [{ "id": "title", "text": "HELLO", "fontSize": 120, "y": 40 }] }
//! ```
//!
//! Each layer is an id plus any subset of the layer fields; missing fields take the defaults of a
//! freshly added layer and out-of-range numbers are clamped.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::decode::{DecodedImage, decode_image};
use crate::editor::session::DEFAULT_BLUR_PX;
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::layer::edit::LayerPatch;
use crate::layer::model::{LayerId, TextLayer};
use crate::mask::feather::{AlphaMatte, MaskOpts, build_matte};
use crate::render::blur::MAX_BLUR_PX;
use crate::render::stack::{LayerStackRenderer, Raster, RenderInput};
use crate::segment::{MaskImageSegmenter, Segmenter};

/// One layer entry of a project file.
///
/// Keys that are neither `id` nor a layer field are rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProjectLayer")]
pub struct ProjectLayer {
    /// Layer identity; unique within the project.
    pub id: LayerId,
    /// Fields overriding the defaults.
    #[serde(flatten)]
    pub fields: LayerPatch,
}

// `deny_unknown_fields` does not combine with `flatten`; leftover keys land in `unknown`.
#[derive(Deserialize)]
struct RawProjectLayer {
    id: LayerId,
    #[serde(flatten)]
    fields: LayerPatch,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawProjectLayer> for ProjectLayer {
    type Error = String;

    fn try_from(raw: RawProjectLayer) -> Result<Self, Self::Error> {
        if !raw.unknown.is_empty() {
            let keys: Vec<&str> = raw.unknown.keys().map(String::as_str).collect();
            return Err(format!(
                "unknown field(s) {} in layer '{}'",
                keys.join(", "),
                raw.id
            ));
        }
        Ok(Self {
            id: raw.id,
            fields: raw.fields,
        })
    }
}

impl ProjectLayer {
    /// Entry reproducing `layer` exactly.
    pub fn from_layer(layer: &TextLayer) -> Self {
        Self {
            id: layer.id.clone(),
            fields: LayerPatch::from_layer(layer),
        }
    }

    /// The clamped layer this entry describes.
    pub fn to_layer(&self) -> TextLayer {
        self.fields.apply(&TextLayer::new(self.id.clone()))
    }
}

fn default_blur_px() -> f32 {
    DEFAULT_BLUR_PX
}

/// A complete edit: source image, optional mask image, blur and text layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Source photo; relative paths resolve against the project file's directory.
    pub image: PathBuf,
    /// Subject mask image; absent renders without a matte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<PathBuf>,
    /// Background blur, pixels.
    #[serde(default = "default_blur_px")]
    pub blur_px: f32,
    /// Text layers, bottom first.
    #[serde(default)]
    pub layers: Vec<ProjectLayer>,
}

impl Project {
    /// Parse and validate a project document.
    pub fn from_json(json: &str) -> TextBehindResult<Self> {
        let project: Self = serde_json::from_str(json)
            .map_err(|e| TextBehindError::serde(format!("parse project: {e}")))?;
        project.validate()?;
        Ok(project)
    }

    /// Read a project file, resolving its relative paths against the file's directory.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> TextBehindResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            TextBehindError::validation(format!("read project '{}': {e}", path.display()))
        })?;
        let project = Self::from_json(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(project.resolve_paths(base))
    }

    /// Pretty JSON for this project.
    pub fn to_json_pretty(&self) -> TextBehindResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TextBehindError::serde(format!("serialize project: {e}")))
    }

    /// Rebase relative image and mask paths onto `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let rebase = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.image = rebase(&self.image);
        self.mask = self.mask.as_deref().map(rebase);
        self
    }

    /// Reject duplicate layer ids and a blur outside `[0, 20]`.
    pub fn validate(&self) -> TextBehindResult<()> {
        if !(0.0..=MAX_BLUR_PX).contains(&self.blur_px) {
            return Err(TextBehindError::validation(format!(
                "blur_px must be within [0, {MAX_BLUR_PX}], got {}",
                self.blur_px
            )));
        }
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(&layer.id) {
                return Err(TextBehindError::validation(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }
        }
        Ok(())
    }

    /// The clamped layer list.
    pub fn text_layers(&self) -> Vec<TextLayer> {
        self.layers.iter().map(ProjectLayer::to_layer).collect()
    }

    /// Decode the image and, when a mask is set, build its feathered matte.
    pub fn load_sources(
        &self,
        mask_opts: &MaskOpts,
    ) -> TextBehindResult<(DecodedImage, Option<AlphaMatte>)> {
        let bytes = std::fs::read(&self.image).map_err(|e| {
            TextBehindError::validation(format!("read image '{}': {e}", self.image.display()))
        })?;
        let image = decode_image(&bytes)?;
        let matte = match &self.mask {
            Some(mask) => {
                let signal = MaskImageSegmenter::from_path(mask)?.segment(&image)?;
                Some(build_matte(
                    &signal,
                    image.width(),
                    image.height(),
                    mask_opts,
                )?)
            }
            None => None,
        };
        Ok((image, matte))
    }

    /// Render the project in one shot.
    #[tracing::instrument(skip_all, fields(image = %self.image.display(), layers = self.layers.len()))]
    pub fn render(
        &self,
        renderer: &mut LayerStackRenderer,
        mask_opts: &MaskOpts,
    ) -> TextBehindResult<Raster> {
        let (image, matte) = self.load_sources(mask_opts)?;
        let layers = self.text_layers();
        renderer.render(RenderInput {
            image: &image,
            matte: matte.as_ref(),
            layers: &layers,
            blur_px: self.blur_px,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/project/project.rs"]
mod tests;
