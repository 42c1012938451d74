//! Gemeinsame Identifikations- und Zustandstypen
//!
//! Spieler-IDs verwenden das Newtype-Pattern um Verwechslungen mit anderen
//! Ganzzahlen zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};

/// Eindeutige Spieler-ID aus der FAF-Lobby
///
/// Die ID wird vom Lobby-Server vergeben und vom Launcher beim Start des
/// Adapters uebergeben. Sie identifiziert sowohl den lokalen Spieler als
/// auch jeden entfernten Peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpielerId(pub i64);

impl SpielerId {
    /// Gibt die innere Ganzzahl zurueck
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SpielerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SpielerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vom Spielprozess gemeldete Lobby-Phase
///
/// Das Spiel meldet seinen Zustand als freien String ueber die
/// `GameState`-Nachricht. An der Protokollgrenze wird der String auf diese
/// geschlossene Aufzaehlung abgebildet; unbekannte Werte werden dort
/// geloggt und verworfen statt uebernommen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyStatus {
    /// Kein Spielzustand bekannt (Startzustand, oder Spiel getrennt)
    Unbekannt,
    /// Spiel laeuft, aber noch keine Lobby geoeffnet
    Idle,
    /// Lobby ist offen – Host/Join-Kommandos sind jetzt gueltig
    Lobby,
    /// Spiel startet
    Launching,
    /// Spiel beendet
    Ended,
}

impl LobbyStatus {
    /// Bildet einen `GameState`-String auf den Status ab
    ///
    /// Gibt `None` fuer unbekannte Werte zurueck; der Aufrufer entscheidet
    /// wie damit umzugehen ist (loggen, Zustand unveraendert lassen).
    pub fn aus_spielzustand(wert: &str) -> Option<Self> {
        match wert {
            "Idle" => Some(Self::Idle),
            "Lobby" => Some(Self::Lobby),
            "Launching" => Some(Self::Launching),
            "Ended" => Some(Self::Ended),
            _ => None,
        }
    }

    /// Gibt die String-Darstellung fuer Statusberichte zurueck
    ///
    /// `Unbekannt` wird als leerer String gemeldet; der Launcher erwartet
    /// diesen Wert vor der ersten `GameState`-Nachricht.
    pub fn als_text(&self) -> &'static str {
        match self {
            Self::Unbekannt => "",
            Self::Idle => "Idle",
            Self::Lobby => "Lobby",
            Self::Launching => "Launching",
            Self::Ended => "Ended",
        }
    }
}

impl Default for LobbyStatus {
    fn default() -> Self {
        Self::Unbekannt
    }
}

impl std::fmt::Display for LobbyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spieler_id_anzeige() {
        let id = SpielerId(4711);
        assert_eq!(id.to_string(), "4711");
        assert_eq!(id.inner(), 4711);
    }

    #[test]
    fn lobby_status_aus_bekannten_werten() {
        assert_eq!(LobbyStatus::aus_spielzustand("Idle"), Some(LobbyStatus::Idle));
        assert_eq!(LobbyStatus::aus_spielzustand("Lobby"), Some(LobbyStatus::Lobby));
        assert_eq!(
            LobbyStatus::aus_spielzustand("Launching"),
            Some(LobbyStatus::Launching)
        );
        assert_eq!(LobbyStatus::aus_spielzustand("Ended"), Some(LobbyStatus::Ended));
    }

    #[test]
    fn lobby_status_unbekannter_wert() {
        assert_eq!(LobbyStatus::aus_spielzustand("Kaffeepause"), None);
        assert_eq!(LobbyStatus::aus_spielzustand(""), None);
    }

    #[test]
    fn lobby_status_text_darstellung() {
        assert_eq!(LobbyStatus::Unbekannt.als_text(), "");
        assert_eq!(LobbyStatus::Lobby.als_text(), "Lobby");
        assert_eq!(LobbyStatus::default(), LobbyStatus::Unbekannt);
    }
}
