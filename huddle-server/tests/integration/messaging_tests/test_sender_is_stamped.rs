use huddle_core::{ServerMessage, SignalPayload};
use huddle_server::RelayCommand;

use crate::integration::{connect_peer, create_test_relay, init_tracing};
use crate::utils::recv_signal;

/// `from` always carries the server-assigned identity of the connection
/// that sent the envelope; there is no way for a sender to spoof it.
#[tokio::test]
async fn test_sender_is_stamped() {
    init_tracing();

    let (cmd_tx, mock, mut signal_rx) = create_test_relay();
    let sender = connect_peer(&mock);
    let target = connect_peer(&mock);

    cmd_tx
        .send(RelayCommand::Signal {
            peer_id: sender.clone(),
            to: target.clone(),
            payload: SignalPayload::Candidate("candidate:0".into()),
        })
        .await
        .unwrap();

    let (to, msg) = recv_signal(&mut signal_rx).await;
    assert_eq!(to, target);
    let ServerMessage::Signal { from, .. } = msg else {
        panic!("expected a relayed signal, got {msg:?}");
    };
    assert_eq!(from, sender);
}
