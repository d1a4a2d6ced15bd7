use crate::foundation::error::{TextBehindError, TextBehindResult};

/// Per-pixel subject-membership output of a segmentation model, at the image's native resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentationSignal {
    /// `true` = subject.
    Boolean(Vec<bool>),
    /// Subject probability, nominally `[0,1]`.
    Probability(Vec<f32>),
    /// Already an alpha channel (`0` background, `255` subject, anything between is soft).
    Alpha(Vec<u8>),
}

impl SegmentationSignal {
    /// Number of pixels carried by the signal.
    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Probability(v) => v.len(),
            Self::Alpha(v) => v.len(),
        }
    }

    /// Return `true` when the signal carries no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a raw (unfeathered) alpha channel.
    ///
    /// With `probability_threshold = Some(t)` probabilities are binarized (`p >= t` → 255),
    /// otherwise they map linearly onto `0..=255` and stay soft.
    pub fn to_raw_alpha(
        &self,
        width: u32,
        height: u32,
        probability_threshold: Option<f32>,
    ) -> TextBehindResult<Vec<u8>> {
        let expected = (width as usize).saturating_mul(height as usize);
        if self.len() != expected {
            return Err(TextBehindError::validation(format!(
                "segmentation signal has {} pixels, expected {expected} for {width}x{height}",
                self.len()
            )));
        }

        let out = match self {
            Self::Boolean(v) => v.iter().map(|&s| if s { 255 } else { 0 }).collect(),
            Self::Probability(v) => match probability_threshold {
                Some(t) => v.iter().map(|&p| if p >= t { 255 } else { 0 }).collect(),
                None => v
                    .iter()
                    .map(|&p| {
                        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
                        (p * 255.0).round() as u8
                    })
                    .collect(),
            },
            Self::Alpha(v) => v.clone(),
        };
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/signal.rs"]
mod tests;
