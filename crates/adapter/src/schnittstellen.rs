//! Seam-Traits zu den externen Mitspielern
//!
//! Der Kern kennt Spielbruecke, Launcher-Benachrichtigung und Relais nur
//! ueber diese Traits. Die Produktions-Implementierungen leben im
//! Daemon-Crate; die Tests benutzen Mocks.

use async_trait::async_trait;
use eisbruecke_protokoll::GpgNetNachricht;
use serde_json::Value;
use std::sync::Arc;

use eisbruecke_core::SpielerId;

use crate::error::AdapterResult;

/// Ausgehende Seite der GPGNet-Bruecke
///
/// Schmaler Vertrag: Sitzungszahl, Lausch-Port, Kommando senden. Die
/// eingehende Seite laeuft als `BrueckenEreignis` ueber den Adapter-Kanal.
pub trait SpielBruecke: Send + Sync {
    /// Anzahl der verbundenen Spielsitzungen
    fn sitzungen(&self) -> usize;

    /// Tatsaechlich gebundener GPGNet-Port
    fn lausch_port(&self) -> u16;

    /// Sendet ein Kommando an den Spielprozess
    fn senden(&self, nachricht: GpgNetNachricht) -> AdapterResult<()>;
}

/// Benachrichtigungskanal zum Launcher
pub trait Benachrichtiger: Send + Sync {
    /// Sendet eine asynchrone Benachrichtigung an alle Steuerclients
    fn benachrichtigen(&self, methode: &str, params: Vec<Value>);
}

/// Momentaufnahme einer Relais-Sitzung fuer den Statusbericht
///
/// Alle Felder sind aus Sicht des Kerns opak; sie werden unveraendert in
/// `status()` gemeldet.
#[derive(Debug, Clone, Default)]
pub struct RelaisLage {
    /// Konnektivitaetszustand als Schnittstellen-String ("new", ...)
    pub zustand: String,
    /// Hat der Peer uns erreicht?
    pub mit_mir_verbunden: bool,
    /// Haben wir den Peer erreicht?
    pub zum_peer_verbunden: bool,
    /// Beschreibung des gewaehlten lokalen Kandidaten
    pub lokaler_kandidat: String,
    /// Beschreibung des gewaehlten entfernten Kandidaten
    pub entfernter_kandidat: String,
    /// Zuletzt eingespieltes entferntes SDP
    pub entferntes_sdp: String,
    /// Sekunden vom Sitzungsstart bis zur ersten Verbindung
    pub verbunden_nach_sek: Option<f64>,
}

/// Ein Peer-Relais aus Sicht des Kerns
#[async_trait]
pub trait Relais: Send + Sync {
    /// Login des entfernten Peers
    fn login(&self) -> &str;

    /// Lokaler UDP-Port fuer das Spiel (stabil fuer die Lebensdauer)
    fn lokaler_udp_port(&self) -> u16;

    /// Wurde das Relais im Offerer-Modus erzeugt?
    fn offerer(&self) -> bool;

    /// Momentaufnahme fuer den Statusbericht
    fn lage(&self) -> RelaisLage;

    /// Spielt eine Signalisierungsnachricht des Peers ein
    async fn signal_einspielen(&self, typ: &str, inhalt: &str) -> AdapterResult<()>;

    /// Startet die NAT-Traversal-Sitzung neu (UDP-Port bleibt)
    async fn neu_starten(&self) -> AdapterResult<()>;
}

/// Fabrik fuer Peer-Relais
///
/// Die Fabrik verdrahtet neue Relais selbst mit dem Ereigniskanal des
/// Adapters; der Kern bekommt nur das fertige Handle.
#[async_trait]
pub trait RelaisFabrik: Send + Sync {
    /// Erzeugt ein Relais fuer den Peer
    async fn erzeugen(
        &self,
        spieler: SpielerId,
        login: &str,
        offerer: bool,
    ) -> AdapterResult<Arc<dyn Relais>>;
}
