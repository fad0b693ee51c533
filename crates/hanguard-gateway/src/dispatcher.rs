//! The orchestrating state machine between the raw byte stream and the
//! rights store.
//!
//! Each loop pass is one [`tick`](Dispatcher::tick): check the heartbeat
//! timer, attempt one bounded-time read, then handle whatever events the
//! frame reader drained — strictly one frame at a time, with a frame's
//! reply written before the next read begins.
//!
//! # Event handling
//!
//! | event / frame                 | action                                  |
//! |-------------------------------|-----------------------------------------|
//! | ACK / NACK                    | log, continue                           |
//! | junk byte                     | log, byte already dropped by the reader |
//! | malformed line                | log, line already dropped               |
//! | alarm bit set                 | log, ignore (never answered)            |
//! | recipient bit set inbound     | log, ignore (wrong direction)           |
//! | open request (0x00)           | decide, reply allow-seconds or deny     |
//! | status report (0x02)          | log decoded flags, no reply             |
//! | anything else                 | "not implemented" warning, no reply     |
//!
//! Nothing a door unit can send is fatal; the loop only ends on a transport
//! failure.

use std::time::Duration;
use tokio::time::Instant;

use tracing::{debug, info, warn};

use hanguard_core::{BusTimestamp, ChipId, DoorId, Result};
use hanguard_protocol::{
    AccessReply, BusEvent, CommandCode, CommandWord, DoorStatus, FrameReader, TextFrame,
};
use hanguard_storage::{AccessOutcome, AccessRepository, DecisionEngine};

use crate::heartbeat::HeartbeatScheduler;
use crate::transport::BusTransport;

/// The gateway's single-threaded dispatch loop.
///
/// Owns the transport, the frame reader and the decision engine exclusively
/// for the process lifetime; there are no concurrent writers.
pub struct Dispatcher<T, R> {
    transport: T,
    reader: FrameReader,
    engine: DecisionEngine<R>,
    heartbeat: HeartbeatScheduler,
}

impl<T: BusTransport, R: AccessRepository> Dispatcher<T, R> {
    /// Create a dispatcher broadcasting hellos every `hello_interval`.
    pub fn new(transport: T, engine: DecisionEngine<R>, hello_interval: Duration) -> Self {
        Self {
            transport,
            reader: FrameReader::new(),
            engine,
            heartbeat: HeartbeatScheduler::new(hello_interval),
        }
    }

    /// Run until the transport fails.
    ///
    /// # Errors
    /// Returns the transport error that ended the loop. Protocol noise and
    /// denied requests never surface here.
    pub async fn run(&mut self) -> Result<()> {
        info!("gateway loop started");
        loop {
            self.tick().await?;
        }
    }

    /// One loop pass: heartbeat check, one bounded read, drain events.
    ///
    /// Public so tests can drive the loop deterministically.
    ///
    /// # Errors
    /// Propagates transport read/write failures only.
    pub async fn tick(&mut self) -> Result<()> {
        if self.heartbeat.due(Instant::now()) {
            self.send_hello().await?;
            self.heartbeat.mark_sent(Instant::now());
        }

        if let Some(chunk) = self.transport.read().await? {
            self.reader.feed(&chunk);
        }

        while let Some(event) = self.reader.next_event() {
            self.handle_event(event).await?;
        }

        Ok(())
    }

    /// Reclaim the transport, e.g. to inspect captured writes in tests.
    pub fn into_transport(self) -> T {
        self.transport
    }

    async fn send_hello(&mut self) -> Result<()> {
        let timestamp = BusTimestamp::now();
        debug!(%timestamp, "broadcasting hello");
        self.send_frame(CommandCode::Hello, DoorId::from_wire(0), &timestamp.encode())
            .await
    }

    async fn send_frame(
        &mut self,
        code: CommandCode,
        recipient: DoorId,
        payload: &str,
    ) -> Result<()> {
        // compose only fails for ids wider than 5 bits; table ids all fit.
        let word = CommandWord::compose(code.to_u8(), recipient)?;
        let frame = TextFrame::new(word, payload);
        debug!(%frame, "sending");
        self.transport.write(&frame.encode()).await
    }

    async fn handle_event(&mut self, event: BusEvent) -> Result<()> {
        match event {
            BusEvent::Ack => debug!("ACK"),
            BusEvent::Nack => warn!("NACK"),
            BusEvent::Junk(byte) => warn!(byte = format_args!("{byte:#04x}"), "transport noise"),
            BusEvent::Malformed { line, reason } => {
                warn!(%line, %reason, "dropping malformed frame");
            }
            BusEvent::Frame(frame) => self.handle_frame(frame).await?,
        }
        Ok(())
    }

    async fn handle_frame(&mut self, frame: TextFrame) -> Result<()> {
        let word = frame.word;

        if word.alarm() {
            info!(%word, "alarm system message, ignoring");
            return Ok(());
        }

        if word.has_recipient() {
            // Gateway -> door direction; nothing on the inbound path should
            // carry this flag.
            warn!(%word, "directed frame on inbound path, ignoring");
            return Ok(());
        }

        let door_id = word.door_id();
        match CommandCode::from_u8(word.command_id()) {
            Some(CommandCode::Open) => self.handle_open_request(door_id, &frame.payload).await,
            Some(CommandCode::Status) => {
                self.handle_status_report(door_id, &frame.payload);
                Ok(())
            }
            Some(CommandCode::Hello) | None => {
                warn!(command_id = word.command_id(), %door_id, "command not implemented");
                Ok(())
            }
        }
    }

    /// Resolve an open request and answer the requesting door.
    ///
    /// Every path replies — including unknown doors and garbled chip ids —
    /// because the door unit is waiting for an answer either way. All
    /// non-grant outcomes reply with the empty deny payload.
    async fn handle_open_request(&mut self, door_id: DoorId, payload: &str) -> Result<()> {
        let outcome = match ChipId::new(payload) {
            Ok(chip) => self.engine.decide(&chip, door_id).await,
            Err(e) => {
                warn!(%door_id, error = %e, "unusable chip id in open request, denying");
                AccessOutcome::Denied
            }
        };

        let reply = match outcome {
            AccessOutcome::Granted { allow_secs } => {
                info!(door = %self.engine.doors().display_name(door_id), allow_secs, "access granted");
                AccessReply::Allow {
                    seconds: allow_secs,
                }
            }
            _ => {
                info!(door = %self.engine.doors().display_name(door_id), ?outcome, "access denied");
                AccessReply::Deny
            }
        };

        self.send_frame(CommandCode::Open, door_id, &reply.payload())
            .await
    }

    /// Log a status report; status frames are never answered.
    fn handle_status_report(&self, door_id: DoorId, payload: &str) {
        let status = match DoorStatus::from_payload(payload) {
            Ok(status) => status,
            Err(e) => {
                warn!(%door_id, error = %e, "dropping unreadable status report");
                return;
            }
        };

        let doors = self.engine.doors();
        if doors.contains(door_id) {
            debug!(door = %doors.display_name(door_id), %status, "door status");
        } else {
            warn!(%door_id, %status, "status report from unknown door, dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use hanguard_core::MemberId;
    use hanguard_storage::{Door, DoorDirectory, Member, MemoryAccessRepository};

    fn door(id: u8, name: &str) -> Door {
        Door {
            id: DoorId::new(id).unwrap(),
            name: name.to_string(),
        }
    }

    fn sample_engine() -> DecisionEngine<MemoryAccessRepository> {
        let mut repo = MemoryAccessRepository::new();
        repo.add_door(door(3, "Hangar West"))
            .add_member(Member {
                id: MemberId::new(42),
                name: "Erika Muster".to_string(),
            })
            .add_chip(ChipId::new("0490AF22").unwrap(), MemberId::new(42))
            .add_grant(MemberId::new(42), DoorId::new(3).unwrap());

        let doors = DoorDirectory::from_doors(vec![door(3, "Hangar West")]);
        DecisionEngine::new(repo, doors, 3)
    }

    fn dispatcher_with(reads: &[&[u8]]) -> Dispatcher<MockTransport, MemoryAccessRepository> {
        let mut transport = MockTransport::new();
        for chunk in reads {
            transport.push_read(*chunk);
        }
        Dispatcher::new(transport, sample_engine(), Duration::from_secs(600))
    }

    /// Drive ticks until the scripted reads are consumed, then return the
    /// captured writes. The first write is always the startup hello.
    async fn run_script(
        mut dispatcher: Dispatcher<MockTransport, MemoryAccessRepository>,
        ticks: usize,
    ) -> Vec<String> {
        for _ in 0..ticks {
            dispatcher.tick().await.unwrap();
        }
        dispatcher.into_transport().written_text()
    }

    #[tokio::test]
    async fn test_startup_hello_is_broadcast() {
        let written = run_script(dispatcher_with(&[]), 1).await;

        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("c;0014;"));
        assert!(written[0].ends_with("\r\n"));
        // Payload: 4 hex digits year + 6 x 2 hex digits.
        assert_eq!(written[0].len(), "c;0014;".len() + 16 + 2);
    }

    #[tokio::test]
    async fn test_no_second_hello_within_interval() {
        let written = run_script(dispatcher_with(&[]), 5).await;
        assert_eq!(written.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_repeats_after_interval() {
        let mut dispatcher = dispatcher_with(&[]);
        dispatcher.tick().await.unwrap();

        tokio::time::advance(Duration::from_secs(599)).await;
        dispatcher.tick().await.unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        dispatcher.tick().await.unwrap();

        let written = dispatcher.into_transport().written_text();
        assert_eq!(written.len(), 2);
    }

    #[tokio::test]
    async fn test_granted_open_request_gets_allow_reply() {
        // Open request from door 3: word = 3 << 5 = 0x0060.
        let written = run_script(dispatcher_with(&[b"c;0060;0490AF22\r\n"]), 1).await;

        assert_eq!(written.len(), 2);
        // Reply addressed to door 3: (3 << 5) | (1 << 4) | 0 = 0x0070.
        assert_eq!(written[1], "c;0070;03\r\n");
    }

    #[tokio::test]
    async fn test_unknown_chip_gets_deny_reply() {
        let written = run_script(dispatcher_with(&[b"c;0060;FFFFFFFF\r\n"]), 1).await;

        assert_eq!(written.len(), 2);
        assert_eq!(written[1], "c;0070;\r\n");
    }

    #[tokio::test]
    async fn test_unknown_door_still_gets_deny_reply() {
        // Door 9 is not in the directory: word = 9 << 5 = 0x0120.
        let written = run_script(dispatcher_with(&[b"c;0120;0490AF22\r\n"]), 1).await;

        assert_eq!(written.len(), 2);
        // Reply addressed to door 9: (9 << 5) | (1 << 4) = 0x0130.
        assert_eq!(written[1], "c;0130;\r\n");
    }

    #[tokio::test]
    async fn test_status_report_is_not_answered() {
        // Status from door 3, locked: word = (3 << 5) | 2 = 0x0062.
        let written = run_script(dispatcher_with(&[b"c;0062;01\r\n"]), 1).await;
        assert_eq!(written.len(), 1); // hello only
    }

    #[tokio::test]
    async fn test_alarm_frames_are_never_answered() {
        // Same open request but with bit 10 set: 0x0460.
        let written = run_script(dispatcher_with(&[b"c;0460;0490AF22\r\n"]), 1).await;
        assert_eq!(written.len(), 1);
    }

    #[tokio::test]
    async fn test_unimplemented_commands_get_no_reply() {
        for command_id in [0x01u8, 0x03, 0x07, 0x0f] {
            let word = (3u16 << 5) | u16::from(command_id);
            let line = format!("c;{word:04X};\r\n");
            let written = run_script(dispatcher_with(&[line.as_bytes()]), 1).await;
            assert_eq!(written.len(), 1, "command {command_id:#04x} was answered");
        }
    }

    #[tokio::test]
    async fn test_junk_before_frame_still_dispatches() {
        let written = run_script(dispatcher_with(&[b"\xffc;0060;0490AF22\r\n"]), 1).await;

        assert_eq!(written.len(), 2);
        assert_eq!(written[1], "c;0070;03\r\n");
    }

    #[tokio::test]
    async fn test_ack_nack_are_consumed_silently() {
        let written = run_script(dispatcher_with(&[&[0x06, 0x15]]), 1).await;
        assert_eq!(written.len(), 1);
    }
}
