//! Client conversations against scripted server streams.

#![allow(clippy::unwrap_used, clippy::panic)]

use imapdown_imap::{Client, Error, FetchAttribute, SeqNum, SequenceSet};
use tokio::sync::mpsc;
use tokio_test::io::Builder;

const GREETING: &[u8] = b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] ready\r\n";

fn envelope_items() -> Vec<FetchAttribute> {
    vec![FetchAttribute::Uid, FetchAttribute::Envelope]
}

#[tokio::test]
async fn full_read_only_session() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN alice secret\r\n")
        .read(b"A0000 OK [CAPABILITY IMAP4rev1 IDLE] Logged in\r\n")
        .write(b"A0001 LIST \"\" \"*\"\r\n")
        .read(
            b"* LIST (\\HasNoChildren) \"/\" INBOX\r\n\
              * LIST (\\Noselect) \"/\" \"[Gmail]\"\r\n\
              A0001 OK LIST completed\r\n",
        )
        .write(b"A0002 EXAMINE INBOX\r\n")
        .read(
            b"* FLAGS (\\Answered \\Seen)\r\n\
              * 2 EXISTS\r\n\
              * 0 RECENT\r\n\
              * OK [UIDVALIDITY 42] UIDs valid\r\n\
              * OK [UIDNEXT 10] Predicted next UID\r\n\
              A0002 OK [READ-ONLY] EXAMINE completed\r\n",
        )
        .write(b"A0003 FETCH 1:* (UID ENVELOPE)\r\n")
        .read(
            b"* 1 FETCH (UID 7 ENVELOPE (\"Tue, 1 Oct 2024 10:00:00 +0000\" \"Hi\" \
              ((\"Ann\" NIL \"ann\" \"example.com\")) NIL NIL NIL NIL NIL NIL \"<a@example.com>\"))\r\n\
              * 2 FETCH (UID 9 ENVELOPE (NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL))\r\n\
              A0003 OK FETCH completed\r\n",
        )
        .write(b"A0004 LOGOUT\r\n")
        .read(b"* BYE logging out\r\nA0004 OK LOGOUT completed\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    assert!(client.has_capability("auth=plain"));

    let mut client = client.login("alice", "secret").await.unwrap();
    assert!(client.has_capability("IDLE"));

    let folders = client.list("", "*").await.unwrap();
    assert_eq!(folders.len(), 2);
    assert!(folders[0].is_selectable());
    assert!(!folders[1].is_selectable());
    assert_eq!(folders[1].mailbox.as_str(), "[Gmail]");

    let (mut client, status) = client.examine("INBOX").await.unwrap();
    assert_eq!(status.exists, 2);
    assert!(status.read_only);
    assert_eq!(status.uid_validity.map(|v| v.get()), Some(42));
    assert_eq!(status.uid_next.map(|u| u.get()), Some(10));
    assert_eq!(client.mailbox(), "INBOX");

    let (tx, mut rx) = mpsc::channel(10);
    client
        .fetch_streaming(&SequenceSet::all_messages(), &envelope_items(), tx)
        .await
        .unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.seq, SeqNum::new(1).unwrap());
    assert_eq!(first.uid().map(|u| u.get()), Some(7));
    let envelope = first.envelope().unwrap();
    assert_eq!(envelope.message_id.as_deref(), Some("<a@example.com>"));
    assert_eq!(envelope.from[0].name.as_deref(), Some("Ann"));

    let second = rx.recv().await.unwrap();
    assert_eq!(second.uid().map(|u| u.get()), Some(9));
    assert_eq!(second.envelope().unwrap().message_id, None);
    assert!(rx.recv().await.is_none());

    client.logout().await.unwrap();
}

#[tokio::test]
async fn body_fetch_streams_literals() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN u p\r\n")
        .read(b"A0000 OK done\r\n")
        .write(b"A0001 EXAMINE Archive\r\n")
        .read(b"* 5 EXISTS\r\nA0001 OK done\r\n")
        .write(b"A0002 FETCH 2:3,5 BODY.PEEK[]\r\n")
        .read(b"* 2 FETCH (BODY[] {8}\r\n")
        .read(b"Sub: a\r\n)\r\n")
        .read(b"* 3 FETCH (BODY[] {0}\r\n)\r\n* 5 FETCH (BODY[] NIL)\r\nA0002 OK done\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let client = client.login("u", "p").await.unwrap();
    let (mut client, _) = client.examine("Archive").await.unwrap();

    let seqs = [2, 3, 5].map(|n| SeqNum::new(n).unwrap());
    let (tx, mut rx) = mpsc::channel(10);
    client
        .fetch_streaming(
            &SequenceSet::from_seq_nums(seqs),
            &[FetchAttribute::BodyPeek { section: None }],
            tx,
        )
        .await
        .unwrap();

    let mut first = rx.recv().await.unwrap();
    assert_eq!(first.take_body().unwrap(), b"Sub: a\r\n");
    let mut second = rx.recv().await.unwrap();
    assert_eq!(second.take_body().unwrap(), b"");
    let mut third = rx.recv().await.unwrap();
    assert_eq!(third.take_body(), None);
}

#[tokio::test]
async fn fetch_no_carries_server_text() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN u p\r\n")
        .read(b"A0000 OK done\r\n")
        .write(b"A0001 EXAMINE INBOX\r\n")
        .read(b"* 0 EXISTS\r\nA0001 OK done\r\n")
        .write(b"A0002 FETCH 1:* (UID ENVELOPE)\r\n")
        .read(b"A0002 NO No matching messages\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let client = client.login("u", "p").await.unwrap();
    let (mut client, _) = client.examine("INBOX").await.unwrap();

    let (tx, _rx) = mpsc::channel(1);
    let err = client
        .fetch_streaming(&SequenceSet::all_messages(), &envelope_items(), tx)
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::No(text) if text == "No matching messages"));
    assert_eq!(err.server_text(), Some("No matching messages"));
}

#[tokio::test]
async fn dropped_receiver_stops_fetch() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN u p\r\n")
        .read(b"A0000 OK done\r\n")
        .write(b"A0001 EXAMINE INBOX\r\n")
        .read(b"* 1 EXISTS\r\nA0001 OK done\r\n")
        .write(b"A0002 FETCH 1:* (UID ENVELOPE)\r\n")
        .read(b"* 1 FETCH (UID 3)\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let client = client.login("u", "p").await.unwrap();
    let (mut client, _) = client.examine("INBOX").await.unwrap();

    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let err = client
        .fetch_streaming(&SequenceSet::all_messages(), &envelope_items(), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReceiverClosed));
}

#[tokio::test]
async fn failed_login() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN alice wrong\r\n")
        .read(b"A0000 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let err = client.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::No(text) if text == "Invalid credentials"));
}

#[tokio::test]
async fn bye_greeting_is_rejected() {
    let mock = Builder::new().read(b"* BYE too many connections\r\n").build();
    let err = Client::from_stream(mock).await.unwrap_err();
    assert!(matches!(err, Error::Bye(text) if text == "too many connections"));
}

#[tokio::test]
async fn reexamine_from_selected() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN u p\r\n")
        .read(b"A0000 OK done\r\n")
        .write(b"A0001 EXAMINE INBOX\r\n")
        .read(b"* 1 EXISTS\r\nA0001 OK done\r\n")
        .write(b"A0002 EXAMINE \"Sent Items\"\r\n")
        .read(b"* 4 EXISTS\r\nA0002 OK done\r\n")
        .write(b"A0003 LOGOUT\r\n")
        .read(b"* BYE bye\r\nA0003 OK done\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let client = client.login("u", "p").await.unwrap();
    let (client, _) = client.examine("INBOX").await.unwrap();
    let (client, status) = client.examine("Sent Items").await.unwrap();
    assert_eq!(status.exists, 4);
    assert_eq!(client.mailbox(), "Sent Items");
    client.logout().await.unwrap();
}

#[tokio::test]
async fn unparseable_fetch_data_fails_the_fetch() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN u p\r\n")
        .read(b"A0000 OK done\r\n")
        .write(b"A0001 EXAMINE INBOX\r\n")
        .read(b"* 2 EXISTS\r\nA0001 OK done\r\n")
        .write(b"A0002 FETCH 1:* (UID ENVELOPE)\r\n")
        .read(
            b"* 1 FETCH (UID 3 ENVELOPE (NIL \"ok\" NIL NIL NIL NIL NIL NIL NIL \"<a@x>\"))\r\n\
              * 2 FETCH (UID 4 ENVELOPE (NIL \"C:\\temp\" NIL NIL NIL NIL NIL NIL NIL \"<b@x>\"))\r\n",
        )
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let client = client.login("u", "p").await.unwrap();
    let (mut client, _) = client.examine("INBOX").await.unwrap();

    let (tx, mut rx) = mpsc::channel(10);
    let err = client
        .fetch_streaming(&SequenceSet::all_messages(), &envelope_items(), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(rx.recv().await.unwrap().seq, SeqNum::new(1).unwrap());
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn unparseable_status_data_is_skipped() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"A0000 LOGIN u p\r\n")
        .read(b"A0000 OK done\r\n")
        .write(b"A0001 EXAMINE INBOX\r\n")
        .read(b"* 1 EXISTS\r\n* (garbled\r\nA0001 OK done\r\n")
        .build();

    let client = Client::from_stream(mock).await.unwrap();
    let client = client.login("u", "p").await.unwrap();
    let (_, status) = client.examine("INBOX").await.unwrap();
    assert_eq!(status.exists, 1);
}
