use serde_json::json;

use crate::integration::{init_tracing, start_gateway};
use crate::utils::TestPeer;

#[tokio::test]
async fn disconnect_removes_the_peer_from_its_room() {
    init_tracing();
    let events = start_gateway();

    let mut c1 = TestPeer::connect(&events).await;
    let mut c2 = TestPeer::connect(&events).await;
    c1.subscribe(&["lobby"]).await;
    c2.subscribe(&["lobby"]).await;

    c1.disconnect().await;

    // The room retains only c2, so its publish has nobody to reach.
    c2.publish("lobby", json!({"x": 1})).await;
    c2.expect_silence()
        .await
        .expect("publish into a one-member room delivers to nobody");

    assert!(
        c1.drain().is_empty(),
        "a disconnected peer must receive nothing"
    );
}

#[tokio::test]
async fn disconnect_of_a_sole_member_prunes_every_room() {
    init_tracing();
    let events = start_gateway();

    let c1 = TestPeer::connect(&events).await;
    c1.subscribe(&["r1", "r2"]).await;
    c1.disconnect().await;

    // Both rooms are gone: fresh members start the rooms over from scratch
    // and a publish reaches only the other fresh member.
    let mut c2 = TestPeer::connect(&events).await;
    let mut c3 = TestPeer::connect(&events).await;
    c2.subscribe(&["r1"]).await;
    c3.subscribe(&["r1"]).await;

    c3.publish("r1", json!({"fresh": true})).await;

    assert_eq!(
        c2.recv_json().await.expect("relayed publish"),
        json!({"type": "publish", "topic": "r1", "data": {"fresh": true}})
    );
    c3.expect_silence().await.expect("sender excluded");
}
