use std::time::{Duration, Instant};

use drowsiness_backend::detection::{DetectorConfig, DetectorPhase, DrowsinessDetector, StatusLabel};

fn detector() -> DrowsinessDetector {
    DrowsinessDetector::new(DetectorConfig {
        ear_threshold: 0.2,
        sleep_duration: Duration::from_secs(1),
    })
}

fn at(base: Instant, millis: u64) -> Instant {
    base + Duration::from_millis(millis)
}

#[test]
fn end_to_end_timeline() {
    let base = Instant::now();
    let mut d = detector();

    assert_eq!(d.update(Some(0.15), at(base, 0)), StatusLabel::Awake);
    assert!(d.eyes_closed_since().is_some());
    assert_eq!(d.update(Some(0.15), at(base, 500)), StatusLabel::Awake);
    assert_eq!(d.update(Some(0.15), at(base, 1_100)), StatusLabel::Sleeping);
    assert_eq!(d.update(Some(0.30), at(base, 1_200)), StatusLabel::Awake);
    assert!(d.eyes_closed_since().is_none());
    assert_eq!(d.phase(), DetectorPhase::AwakeOpen);
}

#[test]
fn sleeping_first_reported_when_elapsed_reaches_threshold() {
    let base = Instant::now();
    let mut d = detector();

    let mut statuses = Vec::new();
    for millis in (0..=1_500).step_by(100) {
        statuses.push((millis, d.update(Some(0.1), at(base, millis))));
    }

    for (millis, status) in statuses {
        let expected = if millis >= 1_000 {
            StatusLabel::Sleeping
        } else {
            StatusLabel::Awake
        };
        assert_eq!(status, expected, "frame at {millis} ms");
    }
}

#[test]
fn open_frame_after_sleep_rearms_timer() {
    let base = Instant::now();
    let mut d = detector();

    d.update(Some(0.1), at(base, 0));
    assert_eq!(d.update(Some(0.1), at(base, 1_500)), StatusLabel::Sleeping);
    assert_eq!(d.update(Some(0.25), at(base, 1_600)), StatusLabel::Awake);
    assert_eq!(d.update(Some(0.1), at(base, 1_700)), StatusLabel::Awake);
    assert_eq!(d.update(Some(0.1), at(base, 2_600)), StatusLabel::Awake);
    assert_eq!(d.update(Some(0.1), at(base, 2_700)), StatusLabel::Sleeping);
}

#[test]
fn no_face_frame_clears_closure_in_progress() {
    let base = Instant::now();
    let mut d = detector();

    d.update(Some(0.1), at(base, 0));
    assert_eq!(d.update(Some(0.1), at(base, 500)), StatusLabel::Awake);
    assert_eq!(d.update(None, at(base, 600)), StatusLabel::NoFaceDetected);
    // 自首次闭眼起已超过 1 秒，但计时已被清零
    assert_eq!(d.update(Some(0.1), at(base, 1_200)), StatusLabel::Awake);
}

#[test]
fn no_face_while_sleeping_returns_to_open() {
    let base = Instant::now();
    let mut d = detector();

    d.update(Some(0.1), at(base, 0));
    d.update(Some(0.1), at(base, 1_000));
    assert_eq!(d.phase(), DetectorPhase::Sleeping);
    assert_eq!(d.update(None, at(base, 1_100)), StatusLabel::NoFaceDetected);
    assert_eq!(d.phase(), DetectorPhase::AwakeOpen);
}
