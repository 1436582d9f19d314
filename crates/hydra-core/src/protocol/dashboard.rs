//! Per-kind delivery counters and the dashboard table printed for `d`.
//!
//! ```text
//! 		KEYBOARD	MOUSE	CONSUMER	GAMEPAD
//! SENT		12		40		0		0
//! OVERFLOW	0		3		0		0
//! DROPPED		1		0		0		0
//! ```

use crate::report::ReportKind;

use super::frame::ProtocolError;

const ROW_SENT: &str = "SENT";
const ROW_OVERFLOW: &str = "OVERFLOW";
const ROW_DROPPED: &str = "DROPPED";

/// Outcome counters for one report kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KindCounters {
    /// Reports accepted by the wireless stack.
    pub sent: u64,
    /// Send attempts that hit a full outgoing buffer and were retried.
    pub buffer_full_retries: u64,
    /// Reports abandoned without being sent.
    pub dropped: u64,
}

/// Delivery counters for every report kind.
///
/// Counters only grow until [`DeliveryCounters::reset`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryCounters {
    kinds: [KindCounters; 4],
}

fn slot(kind: ReportKind) -> usize {
    match kind {
        ReportKind::Keyboard => 0,
        ReportKind::Mouse => 1,
        ReportKind::Consumer => 2,
        ReportKind::Gamepad => 3,
    }
}

impl DeliveryCounters {
    pub fn get(&self, kind: ReportKind) -> KindCounters {
        self.kinds[slot(kind)]
    }

    pub fn record_sent(&mut self, kind: ReportKind) {
        self.kinds[slot(kind)].sent += 1;
    }

    pub fn record_retry(&mut self, kind: ReportKind) {
        self.kinds[slot(kind)].buffer_full_retries += 1;
    }

    pub fn record_dropped(&mut self, kind: ReportKind) {
        self.kinds[slot(kind)].dropped += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sent plus dropped across all kinds: one per submitted report that has
    /// reached a terminal outcome.
    pub fn total_outcomes(&self) -> u64 {
        self.kinds.iter().map(|c| c.sent + c.dropped).sum()
    }

    /// Renders the dashboard table, newline-terminated.
    pub fn format(&self) -> String {
        let mut out = String::from("\t");
        for kind in ReportKind::ALL {
            out.push('\t');
            out.push_str(kind.label());
        }
        out.push('\n');

        let rows: [(&str, fn(&KindCounters) -> u64); 3] = [
            ("SENT\t", |c| c.sent),
            ("OVERFLOW", |c| c.buffer_full_retries),
            ("DROPPED\t", |c| c.dropped),
        ];
        for (label, field) in rows {
            out.push_str(label);
            for (i, counters) in self.kinds.iter().enumerate() {
                out.push_str(if i == 0 { "\t" } else { "\t\t" });
                out.push_str(&field(counters).to_string());
            }
            out.push('\n');
        }
        out
    }

    /// Parses a dashboard table back into counters.
    ///
    /// Rows are recognised by their label; other lines (the column header,
    /// `log: ` lines) are ignored.  All three rows must be present.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let mut counters = Self::default();
        let mut seen = [false; 3];

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let row = match tokens.next() {
                Some(ROW_SENT) => 0,
                Some(ROW_OVERFLOW) => 1,
                Some(ROW_DROPPED) => 2,
                _ => continue,
            };
            let values = tokens
                .map(str::parse::<u64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ProtocolError::MalformedDashboard(line.to_string()))?;
            if values.len() != ReportKind::ALL.len() {
                return Err(ProtocolError::MalformedDashboard(line.to_string()));
            }
            for (kind_counters, value) in counters.kinds.iter_mut().zip(values) {
                match row {
                    0 => kind_counters.sent = value,
                    1 => kind_counters.buffer_full_retries = value,
                    _ => kind_counters.dropped = value,
                }
            }
            seen[row] = true;
        }

        if seen.iter().all(|&s| s) {
            Ok(counters)
        } else {
            Err(ProtocolError::MalformedDashboard(
                "missing SENT, OVERFLOW or DROPPED row".to_string(),
            ))
        }
    }
}
