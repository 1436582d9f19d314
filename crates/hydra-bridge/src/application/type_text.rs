//! Types a string on the active central.
//!
//! Each character becomes a key press report, a pause, a release report, and
//! another pause.  Characters without a key on a US layout are skipped.

use std::time::Duration;

use hydra_core::keymap::char_to_hid;
use hydra_core::report::KeyboardReport;
use tracing::debug;

use super::forward_input::{ForwardError, ReportSink};

/// Pauses used while typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelays {
    /// Time a key is held down.
    pub key_press: Duration,
    /// Pause after each released key.
    pub between_chars: Duration,
}

impl Default for TypingDelays {
    fn default() -> Self {
        Self {
            key_press: Duration::from_millis(5),
            between_chars: Duration::from_millis(10),
        }
    }
}

/// What [`type_text`] did with the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypedSummary {
    pub typed: usize,
    pub skipped: usize,
}

/// Types `text` through `sink`.
///
/// # Errors
///
/// Returns [`ForwardError::Send`] on the first report that fails.  A key
/// that was pressed before the failure may still be down on the central.
pub async fn type_text(
    sink: &dyn ReportSink,
    text: &str,
    delays: TypingDelays,
) -> Result<TypedSummary, ForwardError> {
    let mut summary = TypedSummary::default();
    for ch in text.chars() {
        let Some((key, modifier)) = char_to_hid(ch) else {
            debug!(?ch, "no key for character; skipped");
            summary.skipped += 1;
            continue;
        };

        let press = KeyboardReport::with_keycode(modifier, key.as_u8());
        sink.send_report(press.into())
            .await
            .map_err(ForwardError::Send)?;
        pause(delays.key_press).await;

        sink.send_report(KeyboardReport::default().into())
            .await
            .map_err(ForwardError::Send)?;
        pause(delays.between_chars).await;

        summary.typed += 1;
    }
    Ok(summary)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hydra_core::HidReport;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<HidReport>>,
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        async fn send_report(&self, report: HidReport) -> Result<(), String> {
            self.reports.lock().unwrap().push(report);
            Ok(())
        }
    }

    const NO_DELAY: TypingDelays = TypingDelays {
        key_press: Duration::ZERO,
        between_chars: Duration::ZERO,
    };

    #[tokio::test]
    async fn test_each_character_is_pressed_then_released() {
        // Arrange
        let sink = RecordingSink::default();

        // Act
        let summary = type_text(&sink, "Hi", NO_DELAY).await.unwrap();

        // Assert
        let reports = sink.reports.lock().unwrap();
        assert_eq!(summary.typed, 2);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].payload(), &[0x02, 0, 0x0B, 0, 0, 0, 0, 0]);
        assert!(reports[1].is_zeroed());
        assert_eq!(reports[2].payload(), &[0x00, 0, 0x0C, 0, 0, 0, 0, 0]);
        assert!(reports[3].is_zeroed());
    }

    #[tokio::test]
    async fn test_unmappable_characters_are_skipped() {
        // Arrange
        let sink = RecordingSink::default();

        // Act
        let summary = type_text(&sink, "a\u{e9}\n", NO_DELAY).await.unwrap();

        // Assert
        assert_eq!(summary, TypedSummary { typed: 2, skipped: 1 });
        assert_eq!(sink.reports.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_text_sends_nothing() {
        let sink = RecordingSink::default();
        let summary = type_text(&sink, "", TypingDelays::default()).await.unwrap();
        assert_eq!(summary, TypedSummary::default());
        assert!(sink.reports.lock().unwrap().is_empty());
    }
}
