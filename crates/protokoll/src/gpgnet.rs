//! GPGNet-Nachrichtenmodell
//!
//! Eine GPGNet-Nachricht besteht aus einem Kopf-String und einer geordneten
//! Liste von Werten (Ganzzahl oder String). Der Adapter interpretiert nur
//! den Kopf `GameState`; alle anderen Nachrichten werden unveraendert an
//! den Launcher durchgereicht.

use eisbruecke_core::SpielerId;
use serde::{Deserialize, Serialize};

/// Ein einzelner Wert in einer GPGNet-Nachricht
///
/// Serialisiert als nacktes JSON-Primitiv (Zahl bzw. String), damit die
/// Werte in RPC-Benachrichtigungen ohne Umverpackung auftauchen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GpgNetWert {
    /// 32-Bit-Ganzzahl
    Zahl(i32),
    /// UTF-8-String
    Text(String),
}

impl GpgNetWert {
    /// Wandelt einen JSON-Wert in einen GPGNet-Wert um
    ///
    /// Gibt `None` zurueck wenn der JSON-Wert weder Zahl noch String ist.
    pub fn aus_json(wert: &serde_json::Value) -> Option<Self> {
        match wert {
            serde_json::Value::Number(n) => n.as_i64().map(|z| Self::Zahl(z as i32)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Gibt den Wert als JSON-Wert zurueck
    pub fn als_json(&self) -> serde_json::Value {
        match self {
            Self::Zahl(z) => serde_json::Value::from(*z),
            Self::Text(t) => serde_json::Value::from(t.clone()),
        }
    }
}

impl From<i32> for GpgNetWert {
    fn from(z: i32) -> Self {
        Self::Zahl(z)
    }
}

impl From<&str> for GpgNetWert {
    fn from(t: &str) -> Self {
        Self::Text(t.to_owned())
    }
}

impl From<String> for GpgNetWert {
    fn from(t: String) -> Self {
        Self::Text(t)
    }
}

impl std::fmt::Display for GpgNetWert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zahl(z) => write!(f, "{z}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// Lobby-Modus fuer das `CreateLobby`-Kommando
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyModus {
    /// Normale Lobby mit manueller Slot-Belegung
    NormaleLobby = 0,
    /// Automatische Lobby (Matchmaker)
    AutomatischeLobby = 1,
}

/// Eine vollstaendige GPGNet-Nachricht
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpgNetNachricht {
    /// Kopf-String, z.B. "GameState" oder "CreateLobby"
    pub kopf: String,
    /// Geordnete Werte-Liste
    pub teile: Vec<GpgNetWert>,
}

impl GpgNetNachricht {
    /// Erstellt eine Nachricht aus Kopf und Werten
    pub fn neu(kopf: impl Into<String>, teile: Vec<GpgNetWert>) -> Self {
        Self {
            kopf: kopf.into(),
            teile,
        }
    }

    /// `CreateLobby` – weist das Spiel an, eine Lobby zu oeffnen
    pub fn create_lobby(
        modus: LobbyModus,
        port: u16,
        login: &str,
        spieler: SpielerId,
        slots: i32,
    ) -> Self {
        Self::neu(
            "CreateLobby",
            vec![
                GpgNetWert::Zahl(modus as i32),
                GpgNetWert::Zahl(i32::from(port)),
                GpgNetWert::from(login),
                GpgNetWert::Zahl(spieler.inner() as i32),
                GpgNetWert::Zahl(slots),
            ],
        )
    }

    /// `HostGame` – das Spiel soll eine Partie auf der Karte hosten
    pub fn host_game(karte: &str) -> Self {
        Self::neu("HostGame", vec![GpgNetWert::from(karte)])
    }

    /// `JoinGame` – das Spiel soll der Partie des Peers beitreten
    ///
    /// `adresse` ist der lokale Relais-Endpunkt (`127.0.0.1:<port>`), nicht
    /// die echte Adresse des Peers.
    pub fn join_game(adresse: &str, login: &str, spieler: SpielerId) -> Self {
        Self::neu(
            "JoinGame",
            vec![
                GpgNetWert::from(adresse),
                GpgNetWert::from(login),
                GpgNetWert::Zahl(spieler.inner() as i32),
            ],
        )
    }

    /// `ConnectToPeer` – das Spiel soll eine Verbindung zum Peer aufbauen
    pub fn connect_to_peer(adresse: &str, login: &str, spieler: SpielerId) -> Self {
        Self::neu(
            "ConnectToPeer",
            vec![
                GpgNetWert::from(adresse),
                GpgNetWert::from(login),
                GpgNetWert::Zahl(spieler.inner() as i32),
            ],
        )
    }

    /// `DisconnectFromPeer` – das Spiel soll die Verbindung zum Peer trennen
    pub fn disconnect_from_peer(spieler: SpielerId) -> Self {
        Self::neu(
            "DisconnectFromPeer",
            vec![GpgNetWert::Zahl(spieler.inner() as i32)],
        )
    }

    /// Gibt die Werte als JSON-Array zurueck (fuer RPC-Benachrichtigungen)
    pub fn teile_als_json(&self) -> Vec<serde_json::Value> {
        self.teile.iter().map(GpgNetWert::als_json).collect()
    }
}

impl std::fmt::Display for GpgNetNachricht {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.kopf)?;
        for (i, teil) in self.teile.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{teil}")?;
        }
        f.write_str(")")
    }
}
