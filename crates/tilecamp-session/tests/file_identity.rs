//! A file-backed identity must come back with the same token after the
//! process restarts.

use tilecamp_protocol::ClientEvent;
use tilecamp_session::{FileTokenStore, SessionIdentity, TOKEN_KEY, TokenStore};

fn only_token(events: &[ClientEvent]) -> &str {
    match events {
        [ClientEvent::Identify(evt)] => &evt.token,
        other => panic!("expected exactly one identify, got {other:?}"),
    }
}

#[test]
fn test_token_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tilecamp").join("client.json");

    // First run: nothing on disk, a token is generated and written.
    let mut first_queue = Vec::new();
    let first = {
        let mut identity = SessionIdentity::new(FileTokenStore::open(&path).unwrap());
        identity.identify(&mut first_queue).unwrap()
    };
    assert_eq!(only_token(&first_queue), first);

    // Second run: a fresh process reads the same file.
    let mut second_queue = Vec::new();
    let mut identity = SessionIdentity::new(FileTokenStore::open(&path).unwrap());
    let second = identity.identify(&mut second_queue).unwrap();

    assert_eq!(first, second);
    assert_eq!(only_token(&second_queue), first);
    assert_eq!(identity.store().get(TOKEN_KEY).as_deref(), Some(first.as_str()));
}
