use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::assets::decode::DecodedImage;
use crate::foundation::error::TextBehindResult;
use crate::mask::signal::SegmentationSignal;
use crate::segment::Segmenter;

/// Identity of one uploaded image. Every upload gets a fresh token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageToken(u64);

impl ImageToken {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A segmentation request, stamped with the image it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentationTicket {
    token: ImageToken,
}

impl SegmentationTicket {
    pub(crate) fn new(token: ImageToken) -> Self {
        Self { token }
    }

    /// The image this request belongs to.
    pub fn token(self) -> ImageToken {
        self.token
    }
}

/// What happened to a segmentation result handed back to the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentationOutcome {
    /// The matte was built and stored; the frame was re-rendered.
    Applied,
    /// The image was replaced (or reset) after the request; the result was dropped.
    Stale,
    /// The current image already has a matte; the result was dropped.
    AlreadySegmented,
    /// Segmentation or matte building failed; the editor stays in no-matte mode.
    Failed,
}

/// A finished worker result waiting to be applied.
pub(crate) struct SegmentationResult {
    pub(crate) ticket: SegmentationTicket,
    pub(crate) signal: TextBehindResult<SegmentationSignal>,
}

/// Run `segmenter` on a worker thread and send the result back on `tx`.
///
/// A closed channel means the editor is gone; the result is dropped.
pub(crate) fn spawn_worker(
    segmenter: Arc<dyn Segmenter>,
    image: DecodedImage,
    ticket: SegmentationTicket,
    tx: Sender<SegmentationResult>,
) {
    std::thread::spawn(move || {
        let span = tracing::debug_span!("segmentation_worker", token = ticket.token().get());
        let _enter = span.enter();
        let signal = segmenter.segment(&image);
        if tx.send(SegmentationResult { ticket, signal }).is_err() {
            tracing::debug!("editor dropped before segmentation finished");
        }
    });
}
