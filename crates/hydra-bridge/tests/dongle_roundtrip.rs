//! End-to-end tests: the bridge's `DongleLink` talking to the dongle's
//! `CommandProcessor` over a socket pair.
//!
//! The dongle side runs on a plain thread with the loopback radio, exactly as
//! the simulator binary does.  When the bridge drops its end of the socket
//! the processor sees end of input and the thread returns it for inspection.
#![cfg(unix)]

use std::collections::BTreeMap;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use hydra_bridge::application::forward_input::{
    ForwardInputUseCase, ForwardSettings, RawInputEvent,
};
use hydra_bridge::application::manage_peers::PeerDirectory;
use hydra_bridge::application::type_text::{type_text, TypingDelays};
use hydra_bridge::infrastructure::input_capture::mock::MockCursor;
use hydra_bridge::infrastructure::serial::{DongleLink, LinkTimings};
use hydra_core::report::KeyboardReport;
use hydra_core::{AddressKind, BdAddr, ReportKind, SessionHandle};
use hydra_dongle::application::dongle::{Dongle, DongleConfig};
use hydra_dongle::application::stack::StackEvent;
use hydra_dongle::infrastructure::loopback::{LoopbackTransport, MemoryBondStore, SendPath};
use hydra_dongle::infrastructure::serial::CommandProcessor;
use tokio::net::UnixStream;

const LAPTOP: BdAddr = BdAddr::new([0xC0, 0xFF, 0xEE, 0x00, 0x00, 0x01]);
const PHONE: BdAddr = BdAddr::new([0xF0, 0xCD, 0x31, 0xB0, 0x4F, 0x75]);

type DongleThread =
    JoinHandle<CommandProcessor<StdUnixStream, StdUnixStream, LoopbackTransport, MemoryBondStore>>;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Starts a dongle with LAPTOP (handle 64) and PHONE (handle 65) connected.
fn start_dongle() -> (UnixStream, DongleThread) {
    let config = DongleConfig::default();
    let (transport, events) = LoopbackTransport::new();
    let tx = transport.event_sender();
    for (handle, address) in [(64, LAPTOP), (65, PHONE)] {
        tx.send(StackEvent::ConnectionComplete {
            handle: SessionHandle(handle),
            address,
            address_kind: AddressKind::Public,
        })
        .unwrap();
    }
    let bonds = MemoryBondStore::with_capacity(config.max_connections);
    let dongle = Dongle::new(config, transport, bonds);

    let (host, device) = StdUnixStream::pair().unwrap();
    let reader = device.try_clone().unwrap();
    let thread = std::thread::spawn(move || {
        let mut processor = CommandProcessor::new(reader, device, dongle, events);
        processor.run().unwrap();
        processor
    });

    host.set_nonblocking(true).unwrap();
    (UnixStream::from_std(host).unwrap(), thread)
}

fn timings() -> LinkTimings {
    LinkTimings {
        response_timeout: Duration::from_millis(500),
        settle: Duration::from_millis(30),
        purge_window: Duration::from_millis(5),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_select_then_type_reaches_the_selected_central() {
    // Arrange
    let (stream, thread) = start_dongle();
    let link = Arc::new(DongleLink::new(stream, timings()));
    let mut names = BTreeMap::new();
    names.insert(PHONE, "phone".to_string());
    let directory = PeerDirectory::new(link.clone(), names);

    // Act
    let before = directory.list().await.unwrap();
    let selected = directory.select(PHONE).await.unwrap();
    let summary = type_text(link.as_ref(), "t", TypingDelays::default())
        .await
        .unwrap();
    let counters = link.dashboard_show().await.unwrap();

    drop(directory);
    drop(link);
    let processor = thread.join().unwrap();

    // Assert
    assert_eq!(before.len(), 2);
    assert!(before[0].row.is_active, "first connection starts active");
    assert_eq!(before[0].row.address, LAPTOP);
    assert_eq!(selected.display_name(), "phone");
    assert_eq!(summary.typed, 1);
    assert_eq!(counters.get(ReportKind::Keyboard).sent, 2);

    let sent = processor.dongle().transport().sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|r| r.handle == SessionHandle(65)));
    assert_eq!(sent[0].path, SendPath::Report(1));
    assert_eq!(
        sent[0].payload,
        KeyboardReport::with_keycode(0, 0x17).as_bytes()
    );
    assert_eq!(sent[1].payload, vec![0; 8]);
}

#[tokio::test]
async fn test_captured_input_is_delivered_and_flushed_on_leave() {
    // Arrange
    let (stream, thread) = start_dongle();
    let link = Arc::new(DongleLink::new(stream, timings()));
    let mut forward = ForwardInputUseCase::new(
        link.clone(),
        Arc::new(MockCursor::at(500, 500)),
        ForwardSettings {
            mouse_sensitivity: 1.0,
            mouse_rate_hz: 0,
        },
    );
    let now = Instant::now();

    // Act
    forward.enter();
    forward
        .handle_event_at(RawInputEvent::KeyDown { vk_code: 0x41 }, now)
        .await
        .unwrap();
    forward
        .handle_event_at(RawInputEvent::MouseMove { x: 505, y: 497 }, now)
        .await
        .unwrap();
    forward.leave().await.unwrap();
    let counters = link.dashboard_show().await.unwrap();

    drop(forward);
    drop(link);
    let processor = thread.join().unwrap();

    // Assert
    assert_eq!(counters.get(ReportKind::Keyboard).sent, 2);
    assert_eq!(counters.get(ReportKind::Mouse).sent, 2);

    let sent = processor.dongle().transport().sent();
    let payloads: Vec<(SendPath, Vec<u8>)> =
        sent.iter().map(|r| (r.path, r.payload.clone())).collect();
    assert_eq!(
        payloads,
        vec![
            (SendPath::Report(1), vec![0, 0, 0x04, 0, 0, 0, 0, 0]),
            (SendPath::Report(3), vec![0, 5, (-3i8) as u8, 0]),
            (SendPath::Report(1), vec![0; 8]),
            (SendPath::Report(3), vec![0; 4]),
        ]
    );
    assert!(sent.iter().all(|r| r.handle == SessionHandle(64)));
}

#[tokio::test]
async fn test_unknown_address_select_is_rejected_and_active_stays() {
    // Arrange
    let (stream, thread) = start_dongle();
    let link = Arc::new(DongleLink::new(stream, timings()));
    let directory = PeerDirectory::new(link.clone(), BTreeMap::new());
    let stranger = BdAddr::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

    // Act
    let result = directory.select(stranger).await;
    let rows = link.list_peers().await.unwrap();

    drop(directory);
    drop(link);
    thread.join().unwrap();

    // Assert
    assert!(result.is_err());
    assert_eq!(rows.iter().filter(|r| r.is_active).count(), 1);
    assert!(rows[0].is_active);
}
