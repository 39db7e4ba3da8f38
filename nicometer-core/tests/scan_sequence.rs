mod support;

use nicometer_core::category::{CLICK_SOUND, SCAN_SOUND};
use nicometer_core::{Category, Input, NeedlePhase, Part, ScanPhase};
use support::{RecordingAudio, RecordingRenderer, ms, run_frames, stage};

#[test]
fn nice_scenario_reveals_the_nice_result() {
    let mut stage = stage(42);
    let id = stage.current_session().expect("session").id();

    stage.handle(Input::ResetControl { fraction: 0.7 });
    stage.handle(Input::Start);
    stage.advance(ms(10_417));

    let session = stage.current_session().expect("session");
    assert_eq!(session.id(), id);
    assert_eq!(session.scan().phase(), ScanPhase::ResultDisplayed);
    assert!(!session.scan().is_scanning());
    assert_eq!(session.scan().revealed(), Some(Category::Nice));
    assert_eq!(session.needle().phase(), NeedlePhase::Resting);
    assert!((session.needle().current_angle() - 20.0).abs() < 1e-3);

    for category in Category::ALL {
        let expected = if category == Category::Nice { 1.0 } else { 0.0 };
        assert_eq!(
            stage.opacity(id, Part::ResultImage(category)),
            Some(expected),
            "{category}"
        );
    }
    assert_eq!(stage.opacity(id, Part::ScanningIndicator), Some(0.0));
    assert_eq!(stage.opacity(id, Part::ResetControl), Some(0.0));

    let audio = stage.audio();
    assert_eq!(audio.count(SCAN_SOUND), 1);
    assert_eq!(audio.count("nice-bell.wav"), 1);
    assert_eq!(audio.count(CLICK_SOUND), 2);
}

#[test]
fn every_zone_lands_on_its_angle() {
    for (seed, category) in Category::ALL.into_iter().enumerate() {
        let mut stage = stage(seed as u64 * 31);
        let (low, high) = category.zone_range();
        stage.handle(Input::ResetControl {
            fraction: (low + high) / 2.0,
        });
        stage.handle(Input::Start);
        stage.advance(ms(10_417));

        let session = stage.current_session().expect("session");
        assert_eq!(session.scan().revealed(), Some(category));
        assert!(
            (session.needle().current_angle() - category.target_angle()).abs()
                < 1e-3,
            "{category} rests at {}",
            session.needle().current_angle()
        );
    }
}

#[test]
fn reveal_follows_the_settle_not_the_deadline() {
    let mut stage = stage(8);
    stage.handle(Input::ResetControl { fraction: 0.95 });
    stage.handle(Input::Start);

    let mut revealed_at = None;
    run_frames(&mut stage, ms(10_417), ms(10), |stage| {
        let session = stage.current_session().expect("session");
        if revealed_at.is_none() && session.scan().is_result_displayed() {
            revealed_at = Some(stage.now());
            assert_eq!(session.needle().phase(), NeedlePhase::Resting);
        }
    });

    let revealed_at = revealed_at.expect("result revealed");
    assert!(revealed_at < ms(10_417), "revealed at {revealed_at:?}");
    assert!(revealed_at >= ms(1_000 + 21 * 300 + 2_100));
}

#[test]
fn start_is_a_no_op_without_selection_or_while_scanning() {
    let mut stage = stage(3);
    stage.handle(Input::Start);
    stage.advance(ms(500));
    assert_eq!(
        stage.current_session().expect("session").scan().phase(),
        ScanPhase::Idle
    );
    assert!(stage.audio().played.is_empty());

    stage.handle(Input::ResetControl { fraction: 0.3 });
    stage.handle(Input::Start);
    stage.advance(ms(2_000));
    stage.handle(Input::Start);
    stage.advance(ms(100));

    assert_eq!(stage.audio().count(SCAN_SOUND), 1);
    let session = stage.current_session().expect("session");
    assert!(session.scan().is_scanning());
    assert_eq!(session.scan().selected(), Some(Category::NaughtyIsh));
}

#[test]
fn missing_result_sound_is_skipped() {
    let mut stage = nicometer_core::Stage::new(
        nicometer_core::EngineConfig::default().with_seed(12),
        RecordingAudio::with_missing(&["ontheline.wav", SCAN_SOUND]),
        RecordingRenderer::default(),
    );
    stage.handle(Input::ResetControl { fraction: 0.5 });
    stage.handle(Input::Start);
    stage.advance(ms(10_417));

    let session = stage.current_session().expect("session");
    assert_eq!(session.scan().revealed(), Some(Category::OnTheLine));
    assert_eq!(stage.audio().count("ontheline.wav"), 1);
    assert!(session.needle().current_angle().abs() < 1e-3);
}

#[test]
fn indicator_fades_in_while_scanning() {
    let mut stage = stage(5);
    let id = stage.current_session().expect("session").id();
    stage.handle(Input::ResetControl { fraction: 0.0 });
    stage.handle(Input::Start);

    stage.advance(ms(250));
    let half = stage.opacity(id, Part::ScanningIndicator).expect("indicator");
    assert!((half - 0.5).abs() < 1e-3);

    stage.advance(ms(250));
    assert_eq!(stage.opacity(id, Part::ScanningIndicator), Some(1.0));
    assert_eq!(stage.opacity(id, Part::ResetControl), Some(0.0));
}
