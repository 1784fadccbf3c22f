//! Tests for the cross-thread command queue

use pretty_assertions::assert_eq;
use vetune_core::engine::{EditTarget, OperationArgs, TableOperation};
use vetune_core::selection::CellPos;
use vetune_core::session::{CommandError, EditorSession, TableCommand};
use vetune_core::table::{Table, TableKind};

fn session() -> EditorSession {
    EditorSession::new(Table::new(TableKind::Ve, 4, 4).unwrap())
}

#[tokio::test]
async fn test_commands_from_background_task() {
    let mut session = session();
    let sender = session.command_sender();

    let producer = tokio::spawn(async move {
        for x in 0..4 {
            sender.set_cell(x, 0, 100.0 + x as f64).unwrap();
        }
        sender
            .apply(
                TableOperation::IncreaseBy,
                EditTarget::range(CellPos::new(0, 0), CellPos::new(3, 0)),
                OperationArgs::value(1.0),
            )
            .unwrap();
    });
    producer.await.unwrap();

    // Nothing is applied until the owner drains
    assert_eq!(session.table().value(0, 0), Some(75.0));

    assert_eq!(session.drain_commands(), 5);
    assert_eq!(
        session.table().row(0).unwrap().to_vec(),
        vec![101.0, 102.0, 103.0, 104.0]
    );
    assert_eq!(session.history().undo_len(), 5);
}

#[tokio::test]
async fn test_commands_applied_in_order() {
    let mut session = session();
    let sender = session.command_sender();

    sender.set_cell(1, 1, 10.0).unwrap();
    sender.set_cell(1, 1, 20.0).unwrap();
    sender.resize(8, 6).unwrap();
    sender.set_cell(7, 5, 30.0).unwrap();

    assert_eq!(session.drain_commands(), 4);
    assert_eq!(session.table().dimensions(), (8, 6));
    assert_eq!(session.table().value(1, 1), Some(20.0));
    assert_eq!(session.table().value(7, 5), Some(30.0));
}

#[tokio::test]
async fn test_failed_command_is_skipped() {
    let mut session = session();
    let sender = session.command_sender();

    sender.set_cell(9, 9, 10.0).unwrap();
    sender
        .send(TableCommand::SetAxisRanges {
            x_min: 1000.0,
            x_max: 7000.0,
            y_min: 30.0,
            y_max: 250.0,
        })
        .unwrap();

    assert_eq!(session.drain_commands(), 1);
    assert_eq!(session.table().x_axis()[0], 1000.0);
}

#[tokio::test]
async fn test_send_after_session_dropped() {
    let session = session();
    let sender = session.command_sender();
    drop(session);

    assert!(sender.is_closed());
    assert_eq!(sender.set_cell(0, 0, 1.0), Err(CommandError::Closed));
}
