use huddle_core::{JoinError, ServerMessage, SignalPayload};
use huddle_server::RelayCommand;

use crate::integration::{connect_peer, create_test_relay, init_tracing};
use crate::utils::recv_signal;

/// Scenario C: a third join is refused and the paired peers keep working.
#[tokio::test]
async fn test_third_join_rejected() {
    init_tracing();

    let (cmd_tx, mock, mut signal_rx) = create_test_relay();
    let p1 = connect_peer(&mock);
    let p2 = connect_peer(&mock);
    let p3 = connect_peer(&mock);

    for peer in [&p1, &p2] {
        cmd_tx
            .send(RelayCommand::Join {
                peer_id: peer.clone(),
                session_id: "s1".into(),
            })
            .await
            .unwrap();
    }
    // p1 waiting ack, p1 peer-joined, p2 paired ack
    for _ in 0..3 {
        recv_signal(&mut signal_rx).await;
    }

    cmd_tx
        .send(RelayCommand::Join {
            peer_id: p3.clone(),
            session_id: "s1".into(),
        })
        .await
        .unwrap();

    let (to, msg) = recv_signal(&mut signal_rx).await;
    assert_eq!(to, p3);
    assert_eq!(
        msg,
        ServerMessage::JoinAck {
            ok: false,
            other_peer_id: None,
            error: Some(JoinError::RoomFull),
        }
    );

    // The existing pair is unaffected: envelopes still flow.
    cmd_tx
        .send(RelayCommand::Signal {
            peer_id: p1.clone(),
            to: p2.clone(),
            payload: SignalPayload::Offer("sdp".into()),
        })
        .await
        .unwrap();

    let (to, msg) = recv_signal(&mut signal_rx).await;
    assert_eq!(to, p2);
    assert_eq!(
        msg,
        ServerMessage::Signal {
            from: p1,
            payload: SignalPayload::Offer("sdp".into()),
        }
    );
}
