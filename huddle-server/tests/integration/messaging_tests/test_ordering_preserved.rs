use huddle_core::{ServerMessage, SignalPayload};
use huddle_server::RelayCommand;

use crate::integration::{connect_peer, create_test_relay, init_tracing};
use crate::utils::recv_signal;

/// Envelopes from one sender to one receiver arrive in send order.
#[tokio::test]
async fn test_ordering_preserved() {
    init_tracing();

    let (cmd_tx, mock, mut signal_rx) = create_test_relay();
    let sender = connect_peer(&mock);
    let receiver = connect_peer(&mock);

    let candidates: Vec<String> = (0..20).map(|i| format!("candidate:{i}")).collect();

    for candidate in &candidates {
        cmd_tx
            .send(RelayCommand::Signal {
                peer_id: sender.clone(),
                to: receiver.clone(),
                payload: SignalPayload::Candidate(candidate.clone()),
            })
            .await
            .unwrap();
    }

    for expected in &candidates {
        let (to, msg) = recv_signal(&mut signal_rx).await;
        assert_eq!(to, receiver);
        assert_eq!(
            msg,
            ServerMessage::Signal {
                from: sender.clone(),
                payload: SignalPayload::Candidate(expected.clone()),
            }
        );
    }
}
