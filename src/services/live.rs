// src/services/live.rs
//
// Grupos de broadcast do canal ao vivo. Cada grupo é um
// `broadcast::Sender`; entrar no grupo = pegar um `Receiver`, sair = soltá-lo.
//
//   order_service ── publish("orders") ──▶ LiveHub ──▶ sockets em /ws/orders/

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::models::live::LiveEvent;

pub const ORDERS_GROUP: &str = "orders";

// Suficiente para absorver rajadas; quem atrasar mais que isso perde eventos
const GROUP_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct LiveHub {
    groups: Arc<DashMap<String, broadcast::Sender<LiveEvent>>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, group: &str) -> broadcast::Sender<LiveEvent> {
        self.groups
            .entry(group.to_string())
            .or_insert_with(|| broadcast::channel(GROUP_CAPACITY).0)
            .clone()
    }

    /// Entra no grupo. A saída acontece quando o receiver é dropado.
    pub fn join(&self, group: &str) -> broadcast::Receiver<LiveEvent> {
        let rx = self.sender(group).subscribe();
        tracing::debug!(group, members = self.member_count(group), "Listener joined live group");
        rx
    }

    /// Envia para todos os membros atuais; retorna quantos receberam.
    pub fn publish(&self, group: &str, event: LiveEvent) -> usize {
        match self.groups.get(group) {
            // Sem membros o send falha; tudo bem, é best effort
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    pub fn member_count(&self, group: &str) -> usize {
        self.groups
            .get(group)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(n: i64) -> LiveEvent {
        LiveEvent::OrderUpdated { data: json!({ "order": { "id": n } }) }
    }

    #[tokio::test]
    async fn publish_reaches_every_member() {
        let hub = LiveHub::new();
        let mut kitchen = hub.join(ORDERS_GROUP);
        let mut floor = hub.join(ORDERS_GROUP);

        assert_eq!(hub.publish(ORDERS_GROUP, event(1)), 2);
        assert_eq!(kitchen.recv().await.unwrap(), event(1));
        assert_eq!(floor.recv().await.unwrap(), event(1));
    }

    #[tokio::test]
    async fn dropping_the_receiver_leaves_the_group() {
        let hub = LiveHub::new();
        let first = hub.join(ORDERS_GROUP);
        let _second = hub.join(ORDERS_GROUP);
        assert_eq!(hub.member_count(ORDERS_GROUP), 2);

        drop(first);
        assert_eq!(hub.member_count(ORDERS_GROUP), 1);
        assert_eq!(hub.publish(ORDERS_GROUP, event(2)), 1);
    }

    #[test]
    fn publishing_without_members_is_a_no_op() {
        let hub = LiveHub::new();
        assert_eq!(hub.publish(ORDERS_GROUP, event(3)), 0);
        assert_eq!(hub.member_count("nobody"), 0);
    }

    #[tokio::test]
    async fn groups_are_isolated() {
        let hub = LiveHub::new();
        let mut orders = hub.join(ORDERS_GROUP);
        let _other = hub.join("tables");

        hub.publish("tables", event(4));
        hub.publish(ORDERS_GROUP, event(5));

        assert_eq!(orders.recv().await.unwrap(), event(5));
    }
}
