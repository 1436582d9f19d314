//! ForwardInputUseCase: turns captured host input into HID reports.
//!
//! While capture is on, every key event produces a keyboard report built
//! from the full set of held keys, and mouse events produce mouse reports
//! whose motion is measured from a fixed anchor point.  Outside capture the
//! use case only watches for the hotkey that starts it.
//!
//! # Capture session (for beginners)
//!
//! ```text
//! idle ──(Left Ctrl + Left Alt)──► capturing ──(Left Ctrl + Left Alt)──► idle
//!                                     │
//!                     key / mouse events become reports
//! ```
//!
//! Entering capture remembers where the host cursor is.  Each move event is
//! turned into a delta from that anchor and the cursor is put back, so the
//! host pointer stays still while the central's pointer moves.
//!
//! Leaving capture clears every held key and button and then sends an
//! all-zero keyboard and mouse report.  Without that, a key that was down
//! when capture ended would stay pressed on the central.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hydra_core::keymap::windows_vk::{VK_LCONTROL, VK_LMENU};
use hydra_core::report::mouse::clamp_axis;
use hydra_core::report::{compose_from_held_keys, KeyboardReport, MouseButtons, MouseReport};
use hydra_core::HidReport;
use thiserror::Error;
use tracing::{debug, info};

use super::coalesce::{MouseCoalescer, DEFAULT_RATE_HZ};

/// Wheel delta of one notch, as reported by the host.
pub const WHEEL_DELTA: i32 = 120;

/// A host input event, as delivered by the capture hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// A key was pressed (Windows virtual key code).
    KeyDown { vk_code: u8 },
    KeyUp { vk_code: u8 },
    /// The cursor moved to an absolute screen position.
    MouseMove { x: i32, y: i32 },
    MouseButtonDown { button: MouseButton },
    MouseButtonUp { button: MouseButton },
    /// Vertical wheel; positive is away from the user, 120 per notch.
    MouseWheel { delta: i16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

/// Error type for the forward-input use case.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("report sink error: {0}")]
    Send(String),
}

/// Destination of composed reports.
///
/// The serial dongle link implements this; tests record calls.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Sends one report to the active central.
    async fn send_report(&self, report: HidReport) -> Result<(), String>;
}

/// Reads and moves the physical host cursor.
pub trait CursorController: Send + Sync {
    /// Moves the physical cursor to (x, y) in screen coordinates.
    fn teleport_cursor(&self, x: i32, y: i32);

    /// Returns the current physical cursor position.
    fn get_cursor_pos(&self) -> (i32, i32);
}

/// Tunables for input translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardSettings {
    /// Multiplier applied to mouse motion before it is reported.
    pub mouse_sensitivity: f32,
    /// Maximum mouse reports per second; `0` means unlimited.
    pub mouse_rate_hz: u32,
}

impl Default for ForwardSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 1.0,
            mouse_rate_hz: DEFAULT_RATE_HZ,
        }
    }
}

pub struct ForwardInputUseCase {
    sink: Arc<dyn ReportSink>,
    cursor: Arc<dyn CursorController>,
    settings: ForwardSettings,
    capturing: bool,
    /// Virtual key codes currently held, in press order.
    held_keys: Vec<u8>,
    buttons: MouseButtons,
    anchor: (i32, i32),
    coalescer: MouseCoalescer,
    /// Wheel delta not yet worth a whole notch.
    wheel_remainder: i32,
}

impl ForwardInputUseCase {
    pub fn new(
        sink: Arc<dyn ReportSink>,
        cursor: Arc<dyn CursorController>,
        settings: ForwardSettings,
    ) -> Self {
        Self {
            sink,
            cursor,
            settings,
            capturing: false,
            held_keys: Vec::new(),
            buttons: MouseButtons::default(),
            anchor: (0, 0),
            coalescer: MouseCoalescer::new(settings.mouse_rate_hz),
            wheel_remainder: 0,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn held_keys(&self) -> &[u8] {
        &self.held_keys
    }

    /// Starts a capture session anchored at the current cursor position.
    pub fn enter(&mut self) {
        if self.capturing {
            return;
        }
        self.clear_hid_state();
        self.anchor = self.cursor.get_cursor_pos();
        self.capturing = true;
        info!(anchor = ?self.anchor, "capture started");
    }

    /// Ends the capture session and releases everything on the central.
    ///
    /// The flush is sent even when no session is active, so this also works
    /// as a manual "release all keys".
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Send`] if the zero reports could not be sent.
    pub async fn leave(&mut self) -> Result<(), ForwardError> {
        if self.capturing {
            self.capturing = false;
            self.cursor.teleport_cursor(self.anchor.0, self.anchor.1);
            info!("capture ended");
        }
        self.clear_hid_state();
        self.send_flush().await
    }

    /// Enters capture when idle, leaves it when capturing.
    pub async fn toggle(&mut self) -> Result<(), ForwardError> {
        if self.capturing {
            self.leave().await
        } else {
            self.enter();
            Ok(())
        }
    }

    /// Forgets held keys, buttons, and pending motion.  Sends nothing.
    pub fn clear_hid_state(&mut self) {
        self.held_keys.clear();
        self.buttons = MouseButtons::default();
        self.coalescer.reset();
        self.wheel_remainder = 0;
    }

    /// Sends an all-zero keyboard report and an all-zero mouse report.
    pub async fn send_flush(&self) -> Result<(), ForwardError> {
        debug!("flushing keyboard and mouse state");
        self.send(KeyboardReport::default().into()).await?;
        self.send(MouseReport::default().into()).await
    }

    /// Handles one captured event, timestamped now.
    pub async fn handle_event(&mut self, event: RawInputEvent) -> Result<(), ForwardError> {
        self.handle_event_at(event, Instant::now()).await
    }

    /// Handles one captured event that happened at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::Send`] if a report could not be sent.  The
    /// input state is already updated when that happens.
    pub async fn handle_event_at(
        &mut self,
        event: RawInputEvent,
        now: Instant,
    ) -> Result<(), ForwardError> {
        match event {
            RawInputEvent::KeyDown { vk_code } => self.handle_key(vk_code, true).await,
            RawInputEvent::KeyUp { vk_code } => self.handle_key(vk_code, false).await,
            RawInputEvent::MouseMove { x, y } => self.handle_mouse_move(x, y, now).await,
            RawInputEvent::MouseButtonDown { button } => {
                self.handle_mouse_button(button, true, now).await
            }
            RawInputEvent::MouseButtonUp { button } => {
                self.handle_mouse_button(button, false, now).await
            }
            RawInputEvent::MouseWheel { delta } => self.handle_wheel(delta, now).await,
        }
    }

    /// Sends motion that was held back by the rate limit once it is due.
    ///
    /// Call this periodically; a burst of motion that stops between reports
    /// would otherwise wait for the next mouse event.
    pub async fn tick(&mut self, now: Instant) -> Result<(), ForwardError> {
        if self.capturing && self.coalescer.has_pending() && self.coalescer.is_due(now) {
            let (dx, dy) = self.coalescer.take(now);
            self.send_mouse(dx, dy, 0).await?;
        }
        Ok(())
    }

    // ── Private event handlers ────────────────────────────────────────────────

    async fn handle_key(&mut self, vk_code: u8, is_down: bool) -> Result<(), ForwardError> {
        let position = self.held_keys.iter().position(|&k| k == vk_code);
        match (is_down, position) {
            (true, None) => self.held_keys.push(vk_code),
            (false, Some(i)) => {
                self.held_keys.remove(i);
            }
            _ => {}
        }

        if is_down && self.is_release_hotkey_down() {
            return if self.capturing {
                self.leave().await
            } else {
                self.enter();
                Ok(())
            };
        }

        if !self.capturing {
            return Ok(());
        }
        let report = compose_from_held_keys(&self.held_keys);
        self.send(report.into()).await
    }

    /// Exactly Left Ctrl and Left Alt are held, nothing else.
    fn is_release_hotkey_down(&self) -> bool {
        self.held_keys.len() == 2
            && self.held_keys.contains(&VK_LCONTROL)
            && self.held_keys.contains(&VK_LMENU)
    }

    async fn handle_mouse_move(&mut self, x: i32, y: i32, now: Instant) -> Result<(), ForwardError> {
        if !self.capturing {
            return Ok(());
        }
        let (ax, ay) = self.anchor;
        if (x, y) == (ax, ay) {
            return Ok(());
        }
        self.cursor.teleport_cursor(ax, ay);

        let dx = self.scale(x - ax);
        let dy = self.scale(y - ay);
        if let Some((dx, dy)) = self.coalescer.push(dx, dy, now) {
            self.send_mouse(dx, dy, 0).await?;
        }
        Ok(())
    }

    async fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        now: Instant,
    ) -> Result<(), ForwardError> {
        if !self.capturing {
            return Ok(());
        }
        let bit = match button {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
            MouseButton::X1 | MouseButton::X2 => return Ok(()),
        };
        self.buttons.set(bit, pressed);
        // Button changes go out at once, with any motion held back so far.
        let (dx, dy) = self.coalescer.take(now);
        self.send_mouse(dx, dy, 0).await
    }

    async fn handle_wheel(&mut self, delta: i16, now: Instant) -> Result<(), ForwardError> {
        if !self.capturing {
            return Ok(());
        }
        self.wheel_remainder += i32::from(delta);
        let notches = self.wheel_remainder / WHEEL_DELTA;
        if notches == 0 {
            return Ok(());
        }
        self.wheel_remainder -= notches * WHEEL_DELTA;
        let (dx, dy) = self.coalescer.take(now);
        self.send_mouse(dx, dy, notches).await
    }

    fn scale(&self, delta: i32) -> i32 {
        (delta as f32 * self.settings.mouse_sensitivity).round() as i32
    }

    async fn send_mouse(&self, dx: i8, dy: i8, wheel: i32) -> Result<(), ForwardError> {
        let report = MouseReport::new(self.buttons, dx, dy, clamp_axis(wheel));
        self.send(report.into()).await
    }

    async fn send(&self, report: HidReport) -> Result<(), ForwardError> {
        self.sink
            .send_report(report)
            .await
            .map_err(ForwardError::Send)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use hydra_core::ReportKind;

    const VK_A: u8 = 0x41;
    const VK_B: u8 = 0x42;
    const VK_LSHIFT: u8 = 0xA0;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<HidReport>>,
        should_fail: bool,
    }

    impl RecordingSink {
        fn reports(&self) -> Vec<HidReport> {
            self.reports.lock().unwrap().clone()
        }

        fn mouse_reports(&self) -> Vec<MouseReport> {
            self.reports()
                .into_iter()
                .filter_map(|r| match r {
                    HidReport::Mouse(m) => Some(m),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        async fn send_report(&self, report: HidReport) -> Result<(), String> {
            if self.should_fail {
                return Err("injected failure".to_string());
            }
            self.reports.lock().unwrap().push(report);
            Ok(())
        }
    }

    struct RecordingCursor {
        pos: Mutex<(i32, i32)>,
        teleports: Mutex<Vec<(i32, i32)>>,
    }

    impl RecordingCursor {
        fn at(x: i32, y: i32) -> Self {
            Self {
                pos: Mutex::new((x, y)),
                teleports: Mutex::new(Vec::new()),
            }
        }
    }

    impl CursorController for RecordingCursor {
        fn teleport_cursor(&self, x: i32, y: i32) {
            *self.pos.lock().unwrap() = (x, y);
            self.teleports.lock().unwrap().push((x, y));
        }

        fn get_cursor_pos(&self) -> (i32, i32) {
            *self.pos.lock().unwrap()
        }
    }

    fn make_use_case(
        settings: ForwardSettings,
    ) -> (ForwardInputUseCase, Arc<RecordingSink>, Arc<RecordingCursor>) {
        let sink = Arc::new(RecordingSink::default());
        let cursor = Arc::new(RecordingCursor::at(500, 400));
        let uc = ForwardInputUseCase::new(
            Arc::clone(&sink) as Arc<dyn ReportSink>,
            Arc::clone(&cursor) as Arc<dyn CursorController>,
            settings,
        );
        (uc, sink, cursor)
    }

    fn unlimited() -> ForwardSettings {
        ForwardSettings {
            mouse_rate_hz: 0,
            ..ForwardSettings::default()
        }
    }

    async fn key(uc: &mut ForwardInputUseCase, vk_code: u8, down: bool) {
        let event = if down {
            RawInputEvent::KeyDown { vk_code }
        } else {
            RawInputEvent::KeyUp { vk_code }
        };
        uc.handle_event(event).await.unwrap();
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_key_events_outside_capture_send_nothing() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(unlimited());

        // Act
        key(&mut uc, VK_A, true).await;
        key(&mut uc, VK_A, false).await;

        // Assert
        assert!(sink.reports().is_empty());
    }

    #[tokio::test]
    async fn test_each_key_event_sends_the_full_held_set() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(unlimited());
        uc.enter();

        // Act
        key(&mut uc, VK_LSHIFT, true).await;
        key(&mut uc, VK_A, true).await;
        key(&mut uc, VK_B, true).await;
        key(&mut uc, VK_A, false).await;

        // Assert
        let reports = sink.reports();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[2].payload(), &[0x02, 0, 0x04, 0x05, 0, 0, 0, 0]);
        assert_eq!(reports[3].payload(), &[0x02, 0, 0x05, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_repeated_key_down_is_held_once() {
        // Arrange
        let (mut uc, _, _) = make_use_case(unlimited());
        uc.enter();

        // Act
        key(&mut uc, VK_A, true).await;
        key(&mut uc, VK_A, true).await;

        // Assert
        assert_eq!(uc.held_keys(), &[VK_A]);
    }

    #[tokio::test]
    async fn test_hotkey_enters_capture_without_sending() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(unlimited());

        // Act
        key(&mut uc, VK_LCONTROL, true).await;
        key(&mut uc, VK_LMENU, true).await;

        // Assert
        assert!(uc.is_capturing());
        assert!(uc.held_keys().is_empty(), "capture starts with a clean slate");
        assert!(sink.reports().is_empty());
    }

    #[tokio::test]
    async fn test_hotkey_while_capturing_leaves_and_flushes() {
        // Arrange
        let (mut uc, sink, cursor) = make_use_case(unlimited());
        uc.enter();

        // Act
        key(&mut uc, VK_LCONTROL, true).await;
        key(&mut uc, VK_LMENU, true).await;

        // Assert
        assert!(!uc.is_capturing());
        let reports = sink.reports();
        let n = reports.len();
        assert_eq!(reports[n - 2], HidReport::zeroed(ReportKind::Keyboard));
        assert_eq!(reports[n - 1], HidReport::zeroed(ReportKind::Mouse));
        assert_eq!(cursor.teleports.lock().unwrap().last(), Some(&(500, 400)));
    }

    #[tokio::test]
    async fn test_hotkey_needs_exactly_ctrl_and_alt() {
        // Arrange
        let (mut uc, _, _) = make_use_case(unlimited());
        uc.enter();

        // Act
        key(&mut uc, VK_LSHIFT, true).await;
        key(&mut uc, VK_LCONTROL, true).await;
        key(&mut uc, VK_LMENU, true).await;

        // Assert
        assert!(uc.is_capturing());
        assert_eq!(uc.held_keys().len(), 3);
    }

    #[tokio::test]
    async fn test_leave_clears_held_keys_before_flushing() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(unlimited());
        uc.enter();
        key(&mut uc, VK_A, true).await;

        // Act
        uc.leave().await.unwrap();

        // Assert
        assert!(uc.held_keys().is_empty());
        assert_eq!(
            sink.reports().last(),
            Some(&HidReport::zeroed(ReportKind::Mouse))
        );
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_mouse_move_is_measured_from_the_anchor_and_recentred() {
        // Arrange
        let (mut uc, sink, cursor) = make_use_case(unlimited());
        uc.enter();

        // Act
        uc.handle_event(RawInputEvent::MouseMove { x: 510, y: 395 })
            .await
            .unwrap();

        // Assert
        let mice = sink.mouse_reports();
        assert_eq!((mice[0].dx(), mice[0].dy()), (10, -5));
        assert_eq!(cursor.get_cursor_pos(), (500, 400));
    }

    #[tokio::test]
    async fn test_sensitivity_scales_motion() {
        // Arrange
        let settings = ForwardSettings {
            mouse_sensitivity: 2.0,
            mouse_rate_hz: 0,
        };
        let (mut uc, sink, _) = make_use_case(settings);
        uc.enter();

        // Act
        uc.handle_event(RawInputEvent::MouseMove { x: 503, y: 400 })
            .await
            .unwrap();

        // Assert
        assert_eq!(sink.mouse_reports()[0].dx(), 6);
    }

    #[tokio::test]
    async fn test_fast_motion_is_coalesced_and_flushed_by_tick() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(ForwardSettings::default());
        uc.enter();
        let t0 = Instant::now();

        // Act
        uc.handle_event_at(RawInputEvent::MouseMove { x: 501, y: 400 }, t0)
            .await
            .unwrap();
        for ms in 1..=5 {
            uc.handle_event_at(
                RawInputEvent::MouseMove { x: 502, y: 400 },
                t0 + Duration::from_millis(ms),
            )
            .await
            .unwrap();
        }
        uc.tick(t0 + Duration::from_millis(8)).await.unwrap();
        let before_due = sink.mouse_reports().len();
        uc.tick(t0 + Duration::from_millis(20)).await.unwrap();

        // Assert
        let mice = sink.mouse_reports();
        assert_eq!(before_due, 1);
        assert_eq!(mice.len(), 2);
        assert_eq!(mice[0].dx(), 1);
        assert_eq!(mice[1].dx(), 10);
    }

    #[tokio::test]
    async fn test_button_press_is_sent_at_once_with_held_back_motion() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(ForwardSettings::default());
        uc.enter();
        let t0 = Instant::now();
        uc.handle_event_at(RawInputEvent::MouseMove { x: 501, y: 400 }, t0)
            .await
            .unwrap();
        uc.handle_event_at(
            RawInputEvent::MouseMove { x: 504, y: 400 },
            t0 + Duration::from_millis(1),
        )
        .await
        .unwrap();

        // Act
        uc.handle_event_at(
            RawInputEvent::MouseButtonDown {
                button: MouseButton::Left,
            },
            t0 + Duration::from_millis(2),
        )
        .await
        .unwrap();

        // Assert
        let last = *sink.mouse_reports().last().unwrap();
        assert!(last.buttons().contains(MouseButtons::LEFT));
        assert_eq!(last.dx(), 4);
    }

    #[tokio::test]
    async fn test_wheel_is_reported_in_notches() {
        // Arrange
        let (mut uc, sink, _) = make_use_case(unlimited());
        uc.enter();

        // Act
        uc.handle_event(RawInputEvent::MouseWheel { delta: 60 })
            .await
            .unwrap();
        let after_half_notch = sink.mouse_reports().len();
        uc.handle_event(RawInputEvent::MouseWheel { delta: 60 })
            .await
            .unwrap();
        uc.handle_event(RawInputEvent::MouseWheel { delta: -240 })
            .await
            .unwrap();

        // Assert
        let mice = sink.mouse_reports();
        assert_eq!(after_half_notch, 0);
        assert_eq!(mice[0].wheel(), 1);
        assert_eq!(mice[1].wheel(), -2);
    }

    #[tokio::test]
    async fn test_sink_failure_is_returned_as_forward_error() {
        // Arrange
        let sink = Arc::new(RecordingSink {
            should_fail: true,
            ..RecordingSink::default()
        });
        let cursor = Arc::new(RecordingCursor::at(0, 0));
        let mut uc = ForwardInputUseCase::new(sink, cursor, unlimited());
        uc.enter();

        // Act
        let result = uc.handle_event(RawInputEvent::KeyDown { vk_code: VK_A }).await;

        // Assert
        assert!(matches!(result, Err(ForwardError::Send(_))));
        assert_eq!(uc.held_keys(), &[VK_A]);
    }
}
