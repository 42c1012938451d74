//! Benachrichtigungs-Rundruf an alle Steuerclients
//!
//! Der `RpcBroadcaster` verwaltet die Sende-Queues aller verbundenen
//! Steuerverbindungen. Der Orchestrator benutzt ihn, um asynchrone
//! Ereignisse (`onSdpMessage`, `onPeerStateChanged`, ...) an den Launcher
//! zu melden, ohne die einzelnen Verbindungen zu kennen.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use eisbruecke_protokoll::jsonrpc;

/// Groesse der Sende-Queue pro Steuerverbindung
const SENDE_QUEUE_GROESSE: usize = 64;

/// Zentraler Benachrichtigungs-Rundruf
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct RpcBroadcaster {
    sitzungen: Arc<DashMap<Uuid, mpsc::Sender<String>>>,
}

impl RpcBroadcaster {
    /// Erstellt einen leeren Broadcaster
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine Steuerverbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Der Verbindungs-Task liest aus dieser Queue und schreibt die Zeilen
    /// auf den TCP-Stream.
    pub fn sitzung_registrieren(&self, sitzungs_id: Uuid) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(SENDE_QUEUE_GROESSE);
        self.sitzungen.insert(sitzungs_id, tx);
        tracing::debug!(sitzung = %sitzungs_id, "Steuerverbindung registriert");
        rx
    }

    /// Entfernt eine Steuerverbindung aus dem Rundruf
    pub fn sitzung_entfernen(&self, sitzungs_id: &Uuid) {
        self.sitzungen.remove(sitzungs_id);
        tracing::debug!(sitzung = %sitzungs_id, "Steuerverbindung entfernt");
    }

    /// Anzahl der verbundenen Steuerclients
    pub fn sitzungen(&self) -> usize {
        self.sitzungen.len()
    }

    /// Sendet eine Benachrichtigung an alle verbundenen Steuerclients
    ///
    /// Nicht-blockierend: eine volle Queue fuehrt zum Verwerfen der
    /// Benachrichtigung fuer diesen Client (geloggt).
    pub fn benachrichtigen(&self, methode: &str, params: Vec<Value>) {
        let zeile = jsonrpc::benachrichtigung(methode, params);
        for eintrag in self.sitzungen.iter() {
            match eintrag.value().try_send(zeile.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        sitzung = %eintrag.key(),
                        methode,
                        "RPC-Sende-Queue voll – Benachrichtigung verworfen"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(
                        sitzung = %eintrag.key(),
                        "RPC-Sende-Queue geschlossen (Client getrennt)"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn benachrichtigung_erreicht_alle_sitzungen() {
        let broadcaster = RpcBroadcaster::neu();
        let mut rx1 = broadcaster.sitzung_registrieren(Uuid::new_v4());
        let mut rx2 = broadcaster.sitzung_registrieren(Uuid::new_v4());

        broadcaster.benachrichtigen("onIceConnected", vec![Value::from(1), Value::from(2)]);

        for rx in [&mut rx1, &mut rx2] {
            let zeile = rx.recv().await.expect("Benachrichtigung erwartet");
            let wert: Value = serde_json::from_str(&zeile).unwrap();
            assert_eq!(wert["method"], Value::from("onIceConnected"));
            assert_eq!(wert["params"], serde_json::json!([1, 2]));
        }
    }

    #[tokio::test]
    async fn entfernte_sitzung_erhaelt_nichts_mehr() {
        let broadcaster = RpcBroadcaster::neu();
        let id = Uuid::new_v4();
        let mut rx = broadcaster.sitzung_registrieren(id);
        broadcaster.sitzung_entfernen(&id);
        assert_eq!(broadcaster.sitzungen(), 0);

        broadcaster.benachrichtigen("onConnectionStateChanged", vec![Value::from("Connected")]);
        // Queue wurde beim Entfernen geschlossen
        assert!(rx.recv().await.is_none());
    }
}
