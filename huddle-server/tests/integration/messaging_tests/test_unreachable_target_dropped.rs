use huddle_core::SignalPayload;
use huddle_server::RelayCommand;

use crate::integration::{connect_peer, create_test_relay, init_tracing};
use crate::utils::{expect_silence, recv_signal};

/// An envelope addressed to a departed peer is silently dropped; the relay
/// keeps serving everyone else.
#[tokio::test]
async fn test_unreachable_target_dropped() {
    init_tracing();

    let (cmd_tx, mock, mut signal_rx) = create_test_relay();
    let p1 = connect_peer(&mock);
    let p2 = connect_peer(&mock);

    mock.disconnect(&p2);
    cmd_tx
        .send(RelayCommand::Signal {
            peer_id: p1.clone(),
            to: p2.clone(),
            payload: SignalPayload::Offer("sdp".into()),
        })
        .await
        .unwrap();
    expect_silence(&mut signal_rx).await;

    // The relay is still alive and serving other traffic.
    let p3 = connect_peer(&mock);
    cmd_tx
        .send(RelayCommand::Signal {
            peer_id: p1,
            to: p3.clone(),
            payload: SignalPayload::Candidate("candidate:1".into()),
        })
        .await
        .unwrap();

    let (to, _) = recv_signal(&mut signal_rx).await;
    assert_eq!(to, p3);
}
