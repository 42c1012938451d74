//! Statusbericht – vollstaendige Momentaufnahme fuer `status()`
//!
//! Die Feldnamen sind die JSON-Schluessel der RPC-Schnittstelle und
//! folgen dem Format, das der Launcher kennt.

use serde::Serialize;

use crate::optionen::AdapterOptionen;
use crate::schnittstellen::RelaisLage;

/// Vollstaendiger Statusbericht des Adapters
#[derive(Debug, Clone, Serialize)]
pub struct StatusBericht {
    /// Adapter-Version
    pub version: String,
    /// Startzeitpunkt (RFC 3339)
    pub gestartet_um: String,
    /// Startkonfiguration
    pub options: OptionenStatus,
    /// Zustand der GPGNet-Bruecke
    pub gpgnet: GpgNetStatus,
    /// Zustand aller Peer-Relais
    pub relays: Vec<RelaisStatus>,
}

impl StatusBericht {
    /// Serialisiert den Bericht als JSON-Wert fuer die RPC-Antwort
    pub fn als_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Startkonfiguration im Statusbericht
#[derive(Debug, Clone, Serialize)]
pub struct OptionenStatus {
    pub player_id: i64,
    pub player_login: String,
    pub rpc_port: u16,
    pub gpgnet_port: u16,
    pub lobby_port: u16,
    pub ice_local_port_min: u16,
    pub ice_local_port_max: u16,
    pub use_upnp: bool,
    pub stun_host: String,
    pub turn_host: String,
    pub turn_user: String,
    pub turn_pass: String,
}

impl From<&AdapterOptionen> for OptionenStatus {
    fn from(optionen: &AdapterOptionen) -> Self {
        Self {
            player_id: optionen.spieler_id.inner(),
            player_login: optionen.login.clone(),
            rpc_port: optionen.rpc_port,
            gpgnet_port: optionen.gpgnet_port,
            lobby_port: optionen.lobby_port,
            ice_local_port_min: optionen.ice_port_min,
            ice_local_port_max: optionen.ice_port_max,
            use_upnp: optionen.upnp,
            stun_host: optionen.stun_host.clone(),
            turn_host: optionen.turn_host.clone(),
            turn_user: optionen.turn_user.clone(),
            turn_pass: optionen.turn_pass.clone(),
        }
    }
}

/// Zustand der GPGNet-Bruecke im Statusbericht
#[derive(Debug, Clone, Serialize)]
pub struct GpgNetStatus {
    /// Tatsaechlich gebundener GPGNet-Port
    pub local_port: u16,
    /// Ist ein Spielprozess verbunden?
    pub connected: bool,
    /// Zuletzt gemeldeter Lobby-Status ("" = unbekannt)
    pub game_state: String,
}

/// Zustand eines Peer-Relais im Statusbericht
#[derive(Debug, Clone, Serialize)]
pub struct RelaisStatus {
    pub remote_player_id: i64,
    pub remote_player_login: String,
    pub local_game_udp_port: u16,
    pub ice_agent: IceAgentStatus,
}

/// Zustand der ICE-Sitzung eines Relais
#[derive(Debug, Clone, Serialize)]
pub struct IceAgentStatus {
    pub state: String,
    pub peer_connected_to_me: bool,
    pub connected_to_peer: bool,
    pub local_candidate: String,
    pub remote_candidate: String,
    pub remote_sdp: String,
    /// Sekunden bis zur ersten Verbindung (0 wenn nie verbunden)
    pub time_to_connected: f64,
}

impl From<RelaisLage> for IceAgentStatus {
    fn from(lage: RelaisLage) -> Self {
        Self {
            state: lage.zustand,
            peer_connected_to_me: lage.mit_mir_verbunden,
            connected_to_peer: lage.zum_peer_verbunden,
            local_candidate: lage.lokaler_kandidat,
            remote_candidate: lage.entfernter_kandidat,
            remote_sdp: lage.entferntes_sdp,
            time_to_connected: lage.verbunden_nach_sek.unwrap_or(0.0),
        }
    }
}
