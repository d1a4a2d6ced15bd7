use super::*;

#[test]
fn boolean_signal_maps_to_hard_alpha() {
    let s = SegmentationSignal::Boolean(vec![true, false, true, false]);
    assert_eq!(s.to_raw_alpha(2, 2, None).unwrap(), vec![255, 0, 255, 0]);
}

#[test]
fn probability_signal_soft_and_thresholded() {
    let s = SegmentationSignal::Probability(vec![0.0, 0.5, 1.0, f32::NAN]);
    assert_eq!(s.to_raw_alpha(4, 1, None).unwrap(), vec![0, 128, 255, 0]);
    assert_eq!(
        s.to_raw_alpha(4, 1, Some(0.5)).unwrap(),
        vec![0, 255, 255, 0]
    );
}

#[test]
fn out_of_range_probabilities_are_clamped() {
    let s = SegmentationSignal::Probability(vec![-3.0, 7.0]);
    assert_eq!(s.to_raw_alpha(2, 1, None).unwrap(), vec![0, 255]);
}

#[test]
fn length_mismatch_is_rejected() {
    let s = SegmentationSignal::Alpha(vec![0; 5]);
    assert!(s.to_raw_alpha(2, 2, None).is_err());
    assert!(!s.is_empty());
    assert!(SegmentationSignal::Boolean(vec![]).is_empty());
}
