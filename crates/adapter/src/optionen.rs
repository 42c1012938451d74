//! Unveraenderliche Startkonfiguration des Adapters
//!
//! Wird einmal beim Start aus den Launcher-Argumenten aufgebaut und
//! danach nur noch gelesen.

use eisbruecke_core::SpielerId;
use serde::{Deserialize, Serialize};

/// Startkonfiguration des Adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterOptionen {
    /// ID des lokalen Spielers
    pub spieler_id: SpielerId,
    /// Login des lokalen Spielers
    pub login: String,
    /// TCP-Port der JSON-RPC-Steuerschnittstelle
    pub rpc_port: u16,
    /// TCP-Port der GPGNet-Bruecke
    pub gpgnet_port: u16,
    /// UDP-Port, auf dem das Spiel Datagramme empfaengt
    pub lobby_port: u16,
    /// Untere Grenze des ICE-Kandidaten-Portbereichs (0 = ephemer)
    pub ice_port_min: u16,
    /// Obere Grenze des ICE-Kandidaten-Portbereichs
    pub ice_port_max: u16,
    /// STUN-Hostname
    pub stun_host: String,
    /// TURN-Hostname
    pub turn_host: String,
    /// TURN-Benutzername
    pub turn_user: String,
    /// TURN-Passwort
    pub turn_pass: String,
    /// UPnP-Portweiterleitung anfordern (wird durchgereicht und gemeldet)
    pub upnp: bool,
}

impl Default for AdapterOptionen {
    fn default() -> Self {
        Self {
            spieler_id: SpielerId(0),
            login: String::new(),
            rpc_port: 7236,
            gpgnet_port: 7237,
            lobby_port: 7238,
            ice_port_min: 0,
            ice_port_max: 0,
            stun_host: "dev.faforever.com".into(),
            turn_host: "dev.faforever.com".into(),
            turn_user: String::new(),
            turn_pass: String::new(),
            upnp: true,
        }
    }
}
