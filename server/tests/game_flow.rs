//! End-to-end scenarios driven over real WebSocket connections against an
//! in-process router, plus wire-level coverage of chat/signal relay and
//! the unknown-game-id close code that the rules-engine and session unit
//! tests don't reach.

mod common;

use common::TestServer;
use serde_json::json;

#[tokio::test]
async fn matchmaking_pairs_two_clients_fifo() {
    let server = TestServer::start().await;
    let mut a = server.connect("/ws/matchmaking").await;
    let mut b = server.connect("/ws/matchmaking").await;

    let found_a = a.recv_json().await;
    let found_b = b.recv_json().await;

    assert_eq!(found_a["type"], "match_found");
    assert_eq!(found_b["type"], "match_found");
    assert_eq!(found_a["game_id"], found_b["game_id"]);
    assert_eq!(found_a["color"], "white");
    assert_eq!(found_b["color"], "black");

    // Server closes both matchmaking channels after pairing.
    assert_eq!(a.expect_close().await, Some(1000));
    assert_eq!(b.expect_close().await, Some(1000));
}

async fn paired_game(server: &TestServer) -> (String, common::WsClient, common::WsClient) {
    let mut mm_white = server.connect("/ws/matchmaking").await;
    let mut mm_black = server.connect("/ws/matchmaking").await;
    let found_white = mm_white.recv_json().await;
    let _found_black = mm_black.recv_json().await;
    let game_id = found_white["game_id"].as_str().unwrap().to_string();

    // White attaches first and is alone in the game, so its own attach
    // broadcasts one `update` to itself only (black's slot is still empty).
    let mut white = server.connect(&format!("/ws/game/{game_id}/white")).await;
    let update_white_alone = white.recv_json().await;
    assert_eq!(update_white_alone["type"], "update");

    // Black attaching completes the pair, which broadcasts a second
    // `update` to white and black's first (and only) `update` so far.
    let mut black = server.connect(&format!("/ws/game/{game_id}/black")).await;
    let update_white = white.recv_json().await;
    let update_black = black.recv_json().await;
    assert_eq!(update_white["turn"], "white");
    assert_eq!(update_black["turn"], "white");

    (game_id, white, black)
}

#[tokio::test]
async fn standard_opening_move_flips_turn_and_broadcasts_once() {
    let server = TestServer::start().await;
    let (_game_id, mut white, mut black) = paired_game(&server).await;

    white
        .send_json(json!({"type": "move", "from": {"r": 5, "c": 3}, "to": {"r": 4, "c": 4}}))
        .await;

    let update_white = white.recv_json().await;
    let update_black = black.recv_json().await;
    assert_eq!(update_white["type"], "update");
    assert_eq!(update_white["turn"], "black");
    assert_eq!(update_black["turn"], "black");
    assert_eq!(update_white["last_move_from"], json!({"r": 5, "c": 3}));
    assert_eq!(update_white["last_move_to"], json!({"r": 4, "c": 4}));
}

#[tokio::test]
async fn illegal_move_rebroadcasts_current_state_without_closing() {
    let server = TestServer::start().await;
    let (_game_id, mut white, mut black) = paired_game(&server).await;

    // Black tries to move out of turn.
    black
        .send_json(json!({"type": "move", "from": {"r": 2, "c": 1}, "to": {"r": 3, "c": 0}}))
        .await;

    // White still makes a legal move afterwards and sees turn flip as usual,
    // proving the illegal attempt above never mutated the board or closed
    // the channel.
    white
        .send_json(json!({"type": "move", "from": {"r": 5, "c": 3}, "to": {"r": 4, "c": 4}}))
        .await;
    let update_white = white.recv_json().await;
    black.recv_json().await;
    assert_eq!(update_white["turn"], "black");
}

#[tokio::test]
async fn surrender_ends_game_exactly_once() {
    let server = TestServer::start().await;
    let (_game_id, mut white, mut black) = paired_game(&server).await;

    black.send_json(json!({"type": "surrender"})).await;

    let over_white = white.recv_json().await;
    let over_black = black.recv_json().await;
    assert_eq!(over_white["type"], "game_over");
    assert_eq!(over_white["winner"], "white");
    assert_eq!(over_white["reason"], "surrender");
    assert_eq!(over_black, over_white);

    // No further frame is ever emitted for this game.
    assert_eq!(white.expect_close().await, Some(1000));
    assert_eq!(black.expect_close().await, Some(1000));
}

#[tokio::test]
async fn chat_is_relayed_with_stamped_sender() {
    let server = TestServer::start().await;
    let (_game_id, mut white, mut black) = paired_game(&server).await;

    white.send_json(json!({"type": "chat", "text": "good luck"})).await;

    let chat = black.recv_json().await;
    assert_eq!(chat["type"], "chat");
    assert_eq!(chat["text"], "good luck");
    assert!(chat["sender"].is_string());
}

#[tokio::test]
async fn signal_is_relayed_unchanged() {
    let server = TestServer::start().await;
    let (_game_id, mut white, mut black) = paired_game(&server).await;

    white
        .send_json(json!({"type": "signal", "sdp": "v=0", "candidate": null}))
        .await;

    let signal = black.recv_json().await;
    assert_eq!(signal["sdp"], "v=0");
    assert!(signal["candidate"].is_null());
}

#[tokio::test]
async fn unknown_game_id_closes_with_4000() {
    let server = TestServer::start().await;
    let mut client = server.connect("/ws/game/not-a-real-game-id/white").await;
    assert_eq!(client.expect_close().await, Some(4000));
}
