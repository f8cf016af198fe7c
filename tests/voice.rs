//! Voice pipeline integration tests
//!
//! Tests the recognition and playback controllers without any speech hardware

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use airy_voice::session::CookingSession;
use airy_voice::voice::{
    DEFAULT_ALERT_REPEAT, PlaybackController, PlaybackState, RecognitionController,
    RecognitionState, play_alert,
};
use airy_voice::{AlertPlayer, Effect, Error, Result, SpeechOutcome, TimerKey};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

mod common;
use common::CountingAlert;

const WINDOW: Duration = Duration::from_millis(800);

fn debounce_schedules(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| {
            matches!(
                effect,
                Effect::Schedule {
                    key: TimerKey::Debounce,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn test_recognition_lifecycle() {
    let mut recognition = RecognitionController::new(WINDOW);
    assert_eq!(recognition.state(), RecognitionState::Idle);
    assert!(!recognition.is_hands_free());

    let mut out = Vec::new();
    recognition.start(&mut out);
    recognition.on_start();
    assert!(recognition.is_listening());

    for partial in ["に", "にん", "にんじん"] {
        recognition.on_result(partial, &mut out);
    }
    assert_eq!(debounce_schedules(&out), 3);
    assert_eq!(recognition.state(), RecognitionState::Debouncing);

    assert_eq!(recognition.on_debounce_elapsed().as_deref(), Some("にんじん"));
    assert_eq!(recognition.state(), RecognitionState::Idle);
    assert!(recognition.is_hands_free());
}

#[test]
fn test_blank_transcript_is_not_dispatched() {
    let mut recognition = RecognitionController::new(WINDOW);
    let mut out = Vec::new();
    recognition.start(&mut out);

    recognition.on_result("   ", &mut out);
    assert_eq!(recognition.on_debounce_elapsed(), None);
}

#[test]
fn test_error_clears_on_next_result() {
    let mut recognition = RecognitionController::new(WINDOW);
    let mut out = Vec::new();
    recognition.start(&mut out);

    recognition.on_error("audio", &mut out);
    assert_eq!(recognition.status().last_error.as_deref(), Some("audio"));

    recognition.restart(&mut out);
    assert_eq!(recognition.last_error(), Some("audio"));

    recognition.on_result("アイリ", &mut out);
    assert_eq!(recognition.last_error(), None);
}

#[test]
fn test_start_clears_previous_error() {
    let mut recognition = RecognitionController::new(WINDOW);
    let mut out = Vec::new();
    recognition.start(&mut out);
    recognition.on_error("permission denied", &mut out);
    recognition.stop(&mut out);

    recognition.start(&mut out);
    assert_eq!(recognition.last_error(), None);
}

#[test]
fn test_playback_sequence() {
    let mut playback = PlaybackController::new(Duration::from_millis(100));
    let mut session = CookingSession::new();
    let mut out = Vec::new();

    let id = playback.speak(
        "手順リストを表示します".to_string(),
        None,
        false,
        &mut session,
        &mut out,
    );
    assert!(playback.is_busy());
    assert!(session.is_dialog_visible());

    playback.on_delay_elapsed(&mut out);
    assert_eq!(playback.state(), PlaybackState::Speaking);

    let resume = playback.on_finished(id, &SpeechOutcome::Error("engine".to_string()), &mut session);
    assert_eq!(resume, Some(false));
    assert_eq!(playback.state(), PlaybackState::Idle);
    assert!(!session.is_dialog_visible());
}

#[test]
fn test_superseded_resume_is_kept() {
    let mut playback = PlaybackController::new(Duration::from_millis(100));
    let mut session = CookingSession::new();
    let mut out = Vec::new();

    playback.speak("一つ目".to_string(), None, true, &mut session, &mut out);
    let second = playback.speak("二つ目".to_string(), None, false, &mut session, &mut out);
    playback.on_delay_elapsed(&mut out);

    assert_eq!(
        playback.on_finished(second, &SpeechOutcome::Done, &mut session),
        Some(true)
    );
}

#[tokio::test(start_paused = true)]
async fn test_alert_plays_five_times_then_releases() {
    let player = CountingAlert::default();
    let played = play_alert(&player, DEFAULT_ALERT_REPEAT, CancellationToken::new()).await;

    assert_eq!(played, 5);
    assert_eq!(player.plays(), 5);
    assert!(player.released());
}

#[tokio::test(start_paused = true)]
async fn test_alert_stops_midway() {
    let player = std::sync::Arc::new(CountingAlert::default());
    let stop = CancellationToken::new();

    let task = {
        let player = player.clone();
        let stop = stop.clone();
        tokio::spawn(async move { play_alert(player.as_ref(), DEFAULT_ALERT_REPEAT, stop).await })
    };

    tokio::time::sleep(Duration::from_millis(1200)).await;
    stop.cancel();

    let played = task.await.unwrap();
    assert_eq!(played, 2);
    assert_eq!(player.plays(), 3);
    assert!(player.released());
}

struct BrokenSpeaker {
    attempts: AtomicU32,
}

#[async_trait]
impl AlertPlayer for BrokenSpeaker {
    async fn play(&self) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Audio("no output device".to_string()))
    }

    async fn release(&self) {}
}

#[tokio::test]
async fn test_alert_failures_do_not_loop_forever() {
    let player = BrokenSpeaker {
        attempts: AtomicU32::new(0),
    };
    let played = play_alert(&player, 3, CancellationToken::new()).await;

    assert_eq!(played, 3);
    assert_eq!(player.attempts.load(Ordering::SeqCst), 3);
}
