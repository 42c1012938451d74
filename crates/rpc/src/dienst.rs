//! Dienst-Trait der RPC-Schnittstelle
//!
//! Der Orchestrator implementiert diesen Trait; der RPC-Server kennt nur
//! die Schnittstelle. Die Fehlervarianten tragen genau die Meldungstexte,
//! die der Launcher erwartet.

use async_trait::async_trait;
use eisbruecke_core::SpielerId;
use serde_json::Value;
use thiserror::Error;

/// Anwendungsfehler eines RPC-Aufrufs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DienstFehler {
    /// Fuer den Peer existiert kein Relais
    #[error("no relay for remote peer {0} found")]
    KeinRelais(SpielerId),

    /// Kein Spielprozess verbunden
    #[error("no sessions connected")]
    KeineSitzung,

    /// Sonstiger interner Fehler
    #[error("{0}")]
    Intern(String),
}

/// Ergebnis eines zustandsaendernden RPC-Aufrufs
pub type DienstErgebnis = Result<(), DienstFehler>;

/// Die vom Adapter angebotenen RPC-Methoden
///
/// Alle Methoden kehren zurueck, sobald der Orchestrator den Aufruf
/// verarbeitet hat; Netzwerkeffekte (ICE-Verhandlung, Spielkommandos)
/// laufen danach asynchron weiter.
#[async_trait]
pub trait RpcDienst: Send + Sync + 'static {
    /// Beendet den Daemon
    async fn quit(&self);

    /// Reiht ein HostGame-Kommando ein
    async fn host_game(&self, karte: String) -> DienstErgebnis;

    /// Erstellt ein Relais fuer den Peer und reiht JoinGame ein
    async fn join_game(&self, login: String, spieler: SpielerId) -> DienstErgebnis;

    /// Erstellt ein Relais fuer den Peer und reiht ConnectToPeer ein
    async fn connect_to_peer(
        &self,
        login: String,
        spieler: SpielerId,
        offerer: bool,
    ) -> DienstErgebnis;

    /// Startet die NAT-Traversal-Sitzung des Peers neu
    async fn reconnect_to_peer(&self, spieler: SpielerId) -> DienstErgebnis;

    /// Entfernt das Relais und reiht DisconnectFromPeer ein
    async fn disconnect_from_peer(&self, spieler: SpielerId) -> DienstErgebnis;

    /// Spielt eine Signalisierungsnachricht des Peers ein
    async fn add_sdp_message(
        &self,
        spieler: SpielerId,
        typ: String,
        inhalt: String,
    ) -> DienstErgebnis;

    /// Reicht eine Nachricht unveraendert an den Spielprozess weiter
    async fn send_to_gpgnet(&self, kopf: String, teile: Vec<Value>) -> DienstErgebnis;

    /// Liefert den vollstaendigen Statusbericht
    async fn status(&self) -> Value;
}
