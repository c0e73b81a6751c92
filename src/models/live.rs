// src/models/live.rs

use serde::Serialize;
use serde_json::Value;

/// Eventos que circulam num grupo do canal ao vivo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    OrderUpdated { data: Value },
}

impl LiveEvent {
    /// O que vai de fato para o socket: só o `data` do evento.
    pub fn payload(&self) -> &Value {
        match self {
            LiveEvent::OrderUpdated { data } => data,
        }
    }
}

/// Resposta ao que o cliente mandou.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveReply {
    Echo { payload: Value },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn echo_reply_shape() {
        let reply = LiveReply::Echo { payload: json!({"ping": 1}) };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"type": "echo", "payload": {"ping": 1}})
        );
    }

    #[test]
    fn order_event_exposes_only_data() {
        let event = LiveEvent::OrderUpdated { data: json!({"event": "created"}) };
        assert_eq!(event.payload(), &json!({"event": "created"}));
    }
}
