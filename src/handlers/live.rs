// src/handlers/live.rs
//
// GET /ws/orders/
//
// Protocolo:
// - Servidor → cliente: o `data` de cada evento do grupo "orders"
//   ({"event": "created" | "updated", "order": {...}})
// - Cliente → servidor: qualquer JSON, devolvido como {"type": "echo", "payload": ...}

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{
    config::AppState,
    models::live::LiveReply,
    services::live::ORDERS_GROUP,
};

pub async fn orders_ws(State(app_state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| orders_ws_session(socket, app_state))
}

async fn orders_ws_session(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Entra no grupo; sai quando `hub_rx` for dropado no fim da função
    let mut hub_rx = app_state.live_hub.join(ORDERS_GROUP);
    tracing::info!(members = app_state.live_hub.member_count(ORDERS_GROUP), "Orders WS connected");

    loop {
        tokio::select! {
            event = hub_rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_json(&mut sink, event.payload()).await.is_err() {
                            break;
                        }
                    }
                    // Entrega best effort: quem ficou para trás perde os eventos
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "Orders WS listener lagged, events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = echo_reply(&text) {
                            if send_json(&mut sink, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    drop(hub_rx);
    tracing::info!(members = app_state.live_hub.member_count(ORDERS_GROUP), "Orders WS disconnected");
}

/// Resposta a uma mensagem do cliente. Texto que não é JSON é ignorado.
fn echo_reply(text: &str) -> Option<Value> {
    let payload: Value = serde_json::from_str(text).ok()?;
    serde_json::to_value(LiveReply::Echo { payload }).ok()
}

async fn send_json<S>(sink: &mut S, value: &Value) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(value).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_messages_are_echoed() {
        assert_eq!(
            echo_reply(r#"{"hello": "kitchen"}"#),
            Some(json!({"type": "echo", "payload": {"hello": "kitchen"}}))
        );
        assert_eq!(echo_reply("42"), Some(json!({"type": "echo", "payload": 42})));
    }

    #[test]
    fn plain_text_is_ignored() {
        assert_eq!(echo_reply("hello kitchen"), None);
        assert_eq!(echo_reply(""), None);
    }
}
