//! End-to-end dispatch tests: scripted bus traffic in, captured frames out.

use std::time::Duration;

use hanguard_core::{ChipId, DoorId, MemberId};
use hanguard_gateway::{Dispatcher, MockTransport};
use hanguard_storage::{DecisionEngine, Door, DoorDirectory, Member, MemoryAccessRepository};

fn door(id: u8, name: &str) -> Door {
    Door {
        id: DoorId::new(id).unwrap(),
        name: name.to_string(),
    }
}

fn member(id: i64, name: &str) -> Member {
    Member {
        id: MemberId::new(id),
        name: name.to_string(),
    }
}

/// Two doors, two members. Erika may open both doors, Max only door 3.
fn club_engine() -> DecisionEngine<MemoryAccessRepository> {
    let mut repo = MemoryAccessRepository::new();
    repo.add_door(door(3, "Hangar West"))
        .add_door(door(5, "Workshop"))
        .add_member(member(1, "Erika Muster"))
        .add_member(member(2, "Max Muster"))
        .add_chip(ChipId::new("0490AF22").unwrap(), MemberId::new(1))
        .add_chip(ChipId::new("11223344").unwrap(), MemberId::new(2))
        .add_grant(MemberId::new(1), DoorId::new(3).unwrap())
        .add_grant(MemberId::new(1), DoorId::new(5).unwrap())
        .add_grant(MemberId::new(2), DoorId::new(3).unwrap());

    let doors = DoorDirectory::from_doors(vec![door(3, "Hangar West"), door(5, "Workshop")]);
    DecisionEngine::new(repo, doors, 3)
}

#[tokio::test]
async fn test_mixed_session() {
    let mut transport = MockTransport::new();
    // Erika at the workshop (word 5 << 5 = 0x00A0), then the door ACKs the
    // reply, then Max tries the workshop and is denied, then a status report
    // with some line noise in front of it.
    transport.push_read(b"c;00A0;0490AF22\r\n".as_slice());
    transport.push_read([0x06].as_slice());
    transport.push_read(b"c;00A0;11223344\r\n".as_slice());
    transport.push_read(b"\x00\xffc;00A2;01\r\n".as_slice());

    let mut dispatcher = Dispatcher::new(transport, club_engine(), Duration::from_secs(600));
    for _ in 0..4 {
        dispatcher.tick().await.unwrap();
    }

    let written = dispatcher.into_transport().written_text();
    assert_eq!(written.len(), 3);
    assert!(written[0].starts_with("c;0014;")); // startup hello
    assert_eq!(written[1], "c;00B0;03\r\n"); // allow Erika, 3 seconds
    assert_eq!(written[2], "c;00B0;\r\n"); // deny Max
}

#[tokio::test]
async fn test_request_split_across_reads() {
    let mut transport = MockTransport::new();
    transport.push_read(b"c;00".as_slice());
    transport.push_read(b"A0;0490".as_slice());
    transport.push_read(b"AF22\r\n".as_slice());

    let mut dispatcher = Dispatcher::new(transport, club_engine(), Duration::from_secs(600));
    for _ in 0..3 {
        dispatcher.tick().await.unwrap();
    }

    let written = dispatcher.into_transport().written_text();
    assert_eq!(written.len(), 2);
    assert_eq!(written[1], "c;00B0;03\r\n");
}

#[tokio::test]
async fn test_malformed_line_does_not_stall_the_bus() {
    let mut transport = MockTransport::new();
    transport.push_read(b"c;zzzz;junk\r\nc;00A0;0490AF22\r\n".as_slice());

    let mut dispatcher = Dispatcher::new(transport, club_engine(), Duration::from_secs(600));
    dispatcher.tick().await.unwrap();

    let written = dispatcher.into_transport().written_text();
    assert_eq!(written.len(), 2);
    assert_eq!(written[1], "c;00B0;03\r\n");
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_keeps_running_through_idle_bus() {
    let mut dispatcher = Dispatcher::new(
        MockTransport::new(),
        club_engine(),
        Duration::from_secs(600),
    );

    for _ in 0..3 {
        dispatcher.tick().await.unwrap();
        tokio::time::advance(Duration::from_secs(600)).await;
    }

    let written = dispatcher.into_transport().written_text();
    assert_eq!(written.len(), 3);
    for line in &written {
        assert!(line.starts_with("c;0014;"));
        assert!(line.ends_with("\r\n"));
    }
}
