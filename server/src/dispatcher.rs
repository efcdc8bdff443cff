//! Connection endpoint / dispatcher: the two axum handlers clients
//! actually connect to. The socket is split into a sink/stream pair, a
//! handshake runs, then inbound frames are decoded in a loop, all built
//! around the actor-mailbox session model instead of a shared `Room`,
//! speaking JSON text frames.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use protocol::{parse_inbound, Color, InboundFrame, MatchFoundFrame};

use crate::auth::UserIdentity;
use crate::ids::GameId;
use crate::session::{RelayPayload, SessionCommand};
use crate::state::AppState;

/// `GET /ws/matchmaking`. No client -> server frame is interpreted on
/// this channel; inbound text is heartbeat-only and ignored.
pub async fn matchmaking_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| matchmaking_connection(socket, state))
}

async fn matchmaking_connection(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let mut assignment_rx = state
        .matchmaking
        .enqueue(&state.registry, &state.config, &state.stats)
        .await;

    loop {
        tokio::select! {
            assignment = &mut assignment_rx => {
                if let Ok(assignment) = assignment {
                    let frame = MatchFoundFrame::new(assignment.game_id.to_string(), assignment.color);
                    if let Ok(text) = serde_json::to_string(&frame) {
                        let _ = sink.send(Message::Text(text.into())).await;
                    }
                    let _ = sink
                        .send(Message::Close(Some(CloseFrame { code: 1000, reason: "matched".into() })))
                        .await;
                }
                return;
            }
            inbound = stream.next() => {
                match inbound {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => {
                        // Dropping assignment_rx here is the cancellation signal.
                        // The waiter is pruned lazily.
                        return;
                    }
                    _ => {} // heartbeat-only traffic; nothing to route.
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// `GET /ws/game/{game_id}/{color}?userId=...`. The `access_token`
/// cookie, if present, is tried first; the `userId` query parameter is
/// the fallback path; otherwise the slot attaches anonymous.
pub async fn game_handler(
    ws: WebSocketUpgrade,
    Path((game_id, color)): Path<(String, String)>,
    Query(query): Query<GameQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| game_connection(socket, state, game_id, color, query, headers))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

async fn resolve_identity(
    state: &AppState,
    headers: &HeaderMap,
    query: &GameQuery,
) -> Option<UserIdentity> {
    if let Some(token) = cookie_value(headers, "access_token") {
        if let Some(user) = state.auth.resolve_session(token).await {
            return Some(user);
        }
    }
    if let Some(id) = &query.user_id {
        if let Some(user) = state.auth.resolve_user_by_id(id).await {
            return Some(user);
        }
    }
    None
}

async fn game_connection(
    socket: WebSocket,
    state: Arc<AppState>,
    game_id: String,
    color: String,
    query: GameQuery,
    headers: HeaderMap,
) {
    let (mut sink, mut stream) = socket.split();

    let Ok(game_id) = game_id.parse::<GameId>() else {
        close_unknown_game(&mut sink).await;
        return;
    };
    let Some(color) = parse_color(&color) else {
        close_unknown_game(&mut sink).await;
        return;
    };
    let Some(handle) = state.registry.get(game_id).await else {
        close_unknown_game(&mut sink).await;
        return;
    };

    let user = resolve_identity(&state, &headers, &query).await;

    if handle
        .commands
        .send(SessionCommand::Attach { color, user, sink })
        .await
        .is_err()
    {
        // The session actor already finished; nothing left to attach to.
        return;
    }

    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(_) => break,
        };
        let Message::Text(text) = message else {
            if matches!(message, Message::Close(_)) {
                break;
            }
            continue;
        };

        // Protocol violation: malformed JSON or unrecognized `type` is
        // dropped silently, never closes the channel.
        let Some(inbound) = parse_inbound(&text) else { continue };
        let command = match inbound {
            InboundFrame::Move { from, to } => SessionCommand::Move { color, from, to },
            InboundFrame::Surrender => SessionCommand::Surrender { color },
            InboundFrame::Chat { text } => {
                SessionCommand::Relay { color, relay: RelayPayload::Chat(text) }
            }
            InboundFrame::Signal(mut body) => {
                // The `type` tag was consumed to select this variant; put it
                // back so the payload really is forwarded unchanged rather
                // than missing its discriminant on arrival.
                body.fields.insert("type".to_string(), serde_json::Value::String("signal".to_string()));
                SessionCommand::Relay { color, relay: RelayPayload::Signal(serde_json::Value::Object(body.fields)) }
            }
            InboundFrame::RequestState => SessionCommand::RequestState { color },
            InboundFrame::Unknown => continue,
        };

        if handle.commands.send(command).await.is_err() {
            break;
        }
    }

    // The session owns the real socket half it got from `Attach`; this
    // task's `sink` was already moved there, so all we do on the way out
    // is tell the session to null the slot.
    let _ = handle.commands.send(SessionCommand::Detach { color }).await;
}

fn parse_color(raw: &str) -> Option<Color> {
    match raw {
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        _ => None,
    }
}

/// Closes with code 4000, the one case the dispatcher itself terminates
/// a channel rather than re-broadcasting state.
async fn close_unknown_game(sink: &mut SplitSink<WebSocket, Message>) {
    let _ = sink
        .send(Message::Close(Some(CloseFrame { code: 4000, reason: "unknown game id".into() })))
        .await;
}
