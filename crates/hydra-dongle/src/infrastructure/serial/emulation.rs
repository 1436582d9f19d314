//! Interactive emulation mode (`e`): drive the active central by hand.
//!
//! ```text
//! t        type 't' (press, then release)
//! w a s d  move the mouse 10 units up, left, down, right
//! m        100 one-unit mouse reports, printing the latency of each
//! x        leave emulation mode
//! ```
//!
//! Every command except `x` is acknowledged with a single `.` before it runs.

use std::io::{self, Read, Write};
use std::time::Instant;

use hydra_core::report::{KeyboardReport, MouseButtons, MouseReport};
use hydra_core::HidKeyCode;
use tracing::info;

use super::CommandProcessor;
use crate::application::stack::{BondStore, HidTransport};

const MENU: &str = "\
  t - type 't' on the keyboard
  w,a,s,d - mouse movements
  m - mouse latency test (100 reports)
  x - exit emulation
";

const STEP: i8 = 10;
const LATENCY_REPORTS: usize = 100;

impl<R, W, T, B> CommandProcessor<R, W, T, B>
where
    R: Read,
    W: Write,
    T: HidTransport,
    B: BondStore,
{
    /// Runs the emulation sub-loop until `x` or end of input.
    pub(super) fn run_emulation(&mut self) -> io::Result<()> {
        if !self.dongle.has_peers() {
            return self.link_log("no HID devices connected");
        }
        info!("entering emulation mode");
        self.writer.write_all(MENU.as_bytes())?;
        self.writer.flush()?;

        while let Some(cmd) = self.read_byte()? {
            if cmd == b'x' {
                self.writer.write_all(b"exit\n")?;
                break;
            }
            self.writer.write_all(b".")?;

            match cmd {
                b't' => {
                    let key = HidKeyCode::KeyT.as_u8();
                    self.deliver(KeyboardReport::with_keycode(0, key).into())?;
                    self.deliver(KeyboardReport::default().into())?;
                }
                b'w' | b'a' | b's' | b'd' => {
                    let (dx, dy) = match cmd {
                        b'w' => (0, -STEP),
                        b'a' => (-STEP, 0),
                        b's' => (0, STEP),
                        _ => (STEP, 0),
                    };
                    self.deliver(MouseReport::new(MouseButtons::default(), dx, dy, 0).into())?;
                }
                b'm' => {
                    let report = MouseReport::new(MouseButtons::default(), 0, 1, 0);
                    for _ in 0..LATENCY_REPORTS {
                        let start = Instant::now();
                        self.deliver(report.into())?;
                        writeln!(self.writer, "elapsed: {} ms", start.elapsed().as_millis())?;
                    }
                }
                other => writeln!(self.writer, "unknown command: {}", other as char)?,
            }
            self.writer.flush()?;
        }
        info!("left emulation mode");
        Ok(())
    }
}
