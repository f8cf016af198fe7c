//! Timer alert loop

use tokio_util::sync::CancellationToken;

use super::AlertPlayer;

/// Times the alert plays when the timer finishes
pub const DEFAULT_ALERT_REPEAT: u32 = 5;

/// Play the alert `repeat` times back to back, then release the player
///
/// Each play is awaited before the next starts, so the count does not depend
/// on how long a playback takes. A failed play is logged and still counts.
/// Cancelling `stop` ends the loop early; the player is released either way.
/// Returns the number of completed plays.
pub async fn play_alert(player: &dyn AlertPlayer, repeat: u32, stop: CancellationToken) -> u32 {
    let mut played = 0;

    while played < repeat {
        tokio::select! {
            biased;
            () = stop.cancelled() => {
                tracing::debug!(played, "alert stopped");
                break;
            }
            result = player.play() => {
                played += 1;
                if let Err(e) = result {
                    tracing::warn!(error = %e, played, "alert playback failed");
                }
            }
        }
    }

    player.release().await;
    tracing::debug!(played, "alert released");
    played
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{Error, Result};

    #[derive(Default)]
    struct FlakyPlayer {
        plays: AtomicU32,
        released: AtomicBool,
    }

    #[async_trait]
    impl AlertPlayer for FlakyPlayer {
        async fn play(&self) -> Result<()> {
            let n = self.plays.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(700)).await;
            if n % 2 == 0 {
                Err(Error::Audio("device busy".to_string()))
            } else {
                Ok(())
            }
        }

        async fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_still_count() {
        let player = FlakyPlayer::default();
        let played = play_alert(&player, DEFAULT_ALERT_REPEAT, CancellationToken::new()).await;

        assert_eq!(played, 5);
        assert_eq!(player.plays.load(Ordering::SeqCst), 5);
        assert!(player.released.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let player = FlakyPlayer::default();
        let stop = CancellationToken::new();
        stop.cancel();

        let played = play_alert(&player, DEFAULT_ALERT_REPEAT, stop).await;
        assert_eq!(played, 0);
        assert!(player.released.load(Ordering::SeqCst));
    }
}
