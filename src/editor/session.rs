use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::time::Duration;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::editor::segmentation::{
    ImageToken, SegmentationOutcome, SegmentationResult, SegmentationTicket, spawn_worker,
};
use crate::foundation::error::{TextBehindError, TextBehindResult};
use crate::history::History;
use crate::layer::edit::LayerPatch;
use crate::layer::model::{LayerId, TextLayer};
use crate::mask::feather::{AlphaMatte, MaskOpts, build_matte};
use crate::mask::signal::SegmentationSignal;
use crate::render::blur::MAX_BLUR_PX;
use crate::render::stack::{LayerStackRenderer, Raster, RenderInput, RendererOpts};
use crate::segment::Segmenter;

/// Background blur applied to a fresh session.
pub const DEFAULT_BLUR_PX: f32 = 5.0;

/// Editor session configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorOpts {
    /// Matte building.
    pub mask: MaskOpts,
    /// Rendering and fonts.
    pub renderer: RendererOpts,
    /// Blur used after start and after [`Editor::reset`].
    pub default_blur_px: f32,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            mask: MaskOpts::default(),
            renderer: RendererOpts::default(),
            default_blur_px: DEFAULT_BLUR_PX,
        }
    }
}

impl EditorOpts {
    /// Return options with different matte settings.
    pub fn with_mask(mut self, mask: MaskOpts) -> Self {
        self.mask = mask;
        self
    }

    /// Return options with different renderer settings.
    pub fn with_renderer(mut self, renderer: RendererOpts) -> Self {
        self.renderer = renderer;
        self
    }

    /// Return options with a different starting blur.
    pub fn with_default_blur_px(mut self, blur_px: f32) -> Self {
        self.default_blur_px = blur_px;
        self
    }
}

/// The uploaded photo and, once segmentation has finished, its matte.
#[derive(Clone, Debug)]
pub struct ImageState {
    token: ImageToken,
    image: DecodedImage,
    matte: Option<AlphaMatte>,
}

impl ImageState {
    /// Identity of this upload.
    pub fn token(&self) -> ImageToken {
        self.token
    }

    /// Decoded pixels.
    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    /// Subject matte, if segmentation has completed.
    pub fn matte(&self) -> Option<&AlphaMatte> {
        self.matte.as_ref()
    }
}

/// One editing session: image, matte, layer history, blur and the last rendered frame.
///
/// All state changes go through `&mut self` and re-render the frame before returning. Render,
/// decode and segmentation failures are logged and leave the previous frame in place.
pub struct Editor {
    opts: EditorOpts,
    renderer: LayerStackRenderer,
    image: Option<ImageState>,
    history: History,
    blur_px: f32,
    raster: Option<Raster>,
    next_token: ImageToken,
    next_layer: u64,
    tx: Sender<SegmentationResult>,
    rx: Receiver<SegmentationResult>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("image", &self.image.as_ref().map(ImageState::token))
            .field("layers", &self.history.present().len())
            .field("blur_px", &self.blur_px)
            .field("has_raster", &self.raster.is_some())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Start a session, loading fonts per `opts.renderer`.
    pub fn new(opts: EditorOpts) -> Self {
        let renderer = LayerStackRenderer::new(&opts.renderer);
        Self::with_renderer(opts, renderer)
    }

    /// Start a session around an existing renderer.
    pub fn with_renderer(opts: EditorOpts, renderer: LayerStackRenderer) -> Self {
        let (tx, rx) = channel();
        let blur_px = clamp_blur(opts.default_blur_px, DEFAULT_BLUR_PX);
        Self {
            opts,
            renderer,
            image: None,
            history: History::new(),
            blur_px,
            raster: None,
            next_token: ImageToken::first(),
            next_layer: 1,
            tx,
            rx,
        }
    }

    /// Current image, if any.
    pub fn image(&self) -> Option<&ImageState> {
        self.image.as_ref()
    }

    /// Layer history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current layer list, bottom first.
    pub fn layers(&self) -> &[TextLayer] {
        self.history.present()
    }

    /// Background blur, pixels.
    pub fn blur_px(&self) -> f32 {
        self.blur_px
    }

    /// Last successfully rendered frame.
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// Decode and install a new image. The matte, and any in-flight segmentation, is invalidated.
    ///
    /// On decode failure nothing changes: the previous image and frame stay.
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn upload(&mut self, bytes: &[u8]) -> TextBehindResult<ImageToken> {
        let image = decode_image(bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "upload rejected; keeping previous image");
        })?;
        Ok(self.upload_image(image))
    }

    /// Install an already decoded image.
    pub fn upload_image(&mut self, image: DecodedImage) -> ImageToken {
        let token = self.next_token;
        self.next_token = token.next();
        tracing::info!(
            token = token.get(),
            width = image.width(),
            height = image.height(),
            "image uploaded"
        );
        self.image = Some(ImageState {
            token,
            image,
            matte: None,
        });
        self.rerender();
        token
    }

    /// Issue a segmentation request for the current image.
    pub fn begin_segmentation(&self) -> Option<SegmentationTicket> {
        self.image
            .as_ref()
            .map(|state| SegmentationTicket::new(state.token))
    }

    /// Hand back the result of a request issued by [`Editor::begin_segmentation`].
    ///
    /// The matte is built and applied only if the ticket's image is still current and has no
    /// matte yet.
    #[tracing::instrument(skip_all, fields(token = ticket.token().get()))]
    pub fn complete_segmentation(
        &mut self,
        ticket: SegmentationTicket,
        signal: TextBehindResult<SegmentationSignal>,
    ) -> SegmentationOutcome {
        let mask_opts = self.opts.mask;
        let Some(state) = self
            .image
            .as_mut()
            .filter(|state| state.token == ticket.token())
        else {
            tracing::debug!("stale segmentation result discarded");
            return SegmentationOutcome::Stale;
        };
        if state.matte.is_some() {
            tracing::debug!("image already has a matte; result discarded");
            return SegmentationOutcome::AlreadySegmented;
        }

        let matte = signal.and_then(|signal| {
            build_matte(
                &signal,
                state.image.width(),
                state.image.height(),
                &mask_opts,
            )
        });
        match matte {
            Ok(matte) => {
                state.matte = Some(matte);
                self.rerender();
                SegmentationOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "segmentation failed; rendering without a matte");
                SegmentationOutcome::Failed
            }
        }
    }

    /// Segment the current image on this thread and apply the result.
    pub fn segment_with(&mut self, segmenter: &dyn Segmenter) -> Option<SegmentationOutcome> {
        let ticket = self.begin_segmentation()?;
        let signal = self
            .image
            .as_ref()
            .map(|state| segmenter.segment(&state.image))?;
        Some(self.complete_segmentation(ticket, signal))
    }

    /// Segment the current image on a worker thread.
    ///
    /// The result is applied by [`Editor::poll_segmentation`] or [`Editor::wait_segmentation`].
    pub fn spawn_segmentation(
        &mut self,
        segmenter: Arc<dyn Segmenter>,
    ) -> Option<SegmentationTicket> {
        let ticket = self.begin_segmentation()?;
        let image = self.image.as_ref()?.image.clone();
        spawn_worker(segmenter, image, ticket, self.tx.clone());
        Some(ticket)
    }

    /// Apply every worker result that has arrived, without blocking.
    pub fn poll_segmentation(&mut self) -> Vec<SegmentationOutcome> {
        let mut out = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            out.push(self.complete_segmentation(result.ticket, result.signal));
        }
        out
    }

    /// Block up to `timeout` for the next worker result and apply it.
    pub fn wait_segmentation(&mut self, timeout: Duration) -> Option<SegmentationOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(self.complete_segmentation(result.ticket, result.signal)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Add a default-styled layer on top and return its id.
    ///
    /// Generated ids skip any id already in the layer list.
    pub fn add_layer(&mut self) -> LayerId {
        let id = loop {
            let candidate = LayerId::new(format!("layer-{}", self.next_layer));
            self.next_layer += 1;
            if self.history.layer(&candidate).is_none() {
                break candidate;
            }
        };
        self.history = std::mem::take(&mut self.history).add_layer(TextLayer::new(id.clone()));
        self.rerender();
        id
    }

    /// Add a prepared layer on top. Out-of-range fields are clamped first.
    ///
    /// Layer ids are unique within the list; a layer whose id is already present is rejected
    /// and no undo step is recorded.
    #[tracing::instrument(skip_all, fields(id = %layer.id))]
    pub fn add_text_layer(&mut self, layer: TextLayer) -> TextBehindResult<()> {
        if self.history.layer(&layer.id).is_some() {
            tracing::warn!("duplicate layer id rejected");
            return Err(TextBehindError::validation(format!(
                "layer id '{}' is already in use",
                layer.id
            )));
        }
        self.history = std::mem::take(&mut self.history).add_layer(layer.clamped());
        self.rerender();
        Ok(())
    }

    /// Apply `patch` to the layer with `id`.
    ///
    /// An unknown id still records an undo step, leaving the list unchanged.
    #[tracing::instrument(skip_all, fields(id = %id))]
    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) {
        let base = match self.history.layer(id) {
            Some(layer) => layer.clone(),
            None => {
                tracing::debug!("update for unknown layer");
                TextLayer::new(id.clone())
            }
        };
        let next = patch.apply(&base);
        self.history = std::mem::take(&mut self.history).update_layer(next);
        self.rerender();
    }

    /// Remove the layer with `id`. An unknown id still records an undo step.
    #[tracing::instrument(skip_all, fields(id = %id))]
    pub fn delete_layer(&mut self, id: &LayerId) {
        self.history = std::mem::take(&mut self.history).delete_layer(id);
        self.rerender();
    }

    /// Step back one layer edit.
    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            return;
        }
        self.history = std::mem::take(&mut self.history).undo();
        self.rerender();
    }

    /// Re-apply the last undone edit.
    pub fn redo(&mut self) {
        if !self.history.can_redo() {
            return;
        }
        self.history = std::mem::take(&mut self.history).redo();
        self.rerender();
    }

    /// Set the background blur, clamped to `[0, 20]`. Non-finite values are ignored.
    pub fn set_blur(&mut self, blur_px: f32) {
        let next = clamp_blur(blur_px, self.blur_px);
        if next == self.blur_px {
            return;
        }
        self.blur_px = next;
        self.rerender();
    }

    /// Drop the image, matte, frame and every layer; restore the default blur.
    ///
    /// Worker results still in flight become stale.
    pub fn reset(&mut self) {
        tracing::info!("editor reset");
        self.image = None;
        self.history = std::mem::take(&mut self.history).reset();
        self.blur_px = clamp_blur(self.opts.default_blur_px, DEFAULT_BLUR_PX);
        self.raster = None;
    }

    /// PNG bytes of the last rendered frame.
    pub fn export_png(&self) -> TextBehindResult<Vec<u8>> {
        self.raster
            .as_ref()
            .ok_or_else(|| TextBehindError::validation("nothing rendered yet"))?
            .to_png()
    }

    /// Re-render from current state. Returns `false` when no new frame was produced.
    pub fn rerender(&mut self) -> bool {
        let Some(state) = self.image.as_ref() else {
            return false;
        };
        let input = RenderInput {
            image: &state.image,
            matte: state.matte.as_ref(),
            layers: self.history.present(),
            blur_px: self.blur_px,
        };
        match self.renderer.render(input) {
            Ok(raster) => {
                self.raster = Some(raster);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "render failed; keeping previous frame");
                false
            }
        }
    }
}

fn clamp_blur(blur_px: f32, fallback: f32) -> f32 {
    if blur_px.is_finite() {
        blur_px.clamp(0.0, MAX_BLUR_PX)
    } else {
        fallback
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
