//! Aufgabenwarteschlange fuer Spielkommandos
//!
//! Host/Join/Connect/Disconnect werden nicht sofort an das Spiel
//! geschickt, sondern als Aufgaben eingereiht und erst ausgefuehrt, wenn
//! der Lobby-Status (und ggf. das Relais) es zulaesst. Die Warteschlange
//! ist strikt FIFO: die erste nicht ausfuehrbare Aufgabe blockiert alles
//! dahinter.

use eisbruecke_core::SpielerId;
use std::collections::VecDeque;

/// Eine wartende Spielaufgabe
#[derive(Debug, Clone, PartialEq)]
pub enum SpielAufgabe {
    /// Partie auf der Karte hosten (wartet auf Lobby-Status "Lobby")
    HostGame {
        /// Kartenname
        karte: String,
    },

    /// Partie des Peers beitreten (wartet auf "Lobby" und das Relais)
    JoinGame {
        /// Login des entfernten Peers
        login: String,
        /// ID des entfernten Peers
        spieler: SpielerId,
    },

    /// Verbindung zum Peer aufbauen (wartet nur auf das Relais)
    ConnectToPeer {
        /// Login des entfernten Peers
        login: String,
        /// ID des entfernten Peers
        spieler: SpielerId,
    },

    /// Verbindung zum Peer trennen (sofort ausfuehrbar)
    DisconnectFromPeer {
        /// ID des entfernten Peers
        spieler: SpielerId,
    },
}

/// Strikte FIFO-Warteschlange der Spielaufgaben
#[derive(Debug, Default)]
pub struct AufgabenListe {
    aufgaben: VecDeque<SpielAufgabe>,
}

impl AufgabenListe {
    /// Erstellt eine leere Warteschlange
    pub fn neu() -> Self {
        Self::default()
    }

    /// Haengt eine Aufgabe ans Ende an
    pub fn einreihen(&mut self, aufgabe: SpielAufgabe) {
        self.aufgaben.push_back(aufgabe);
    }

    /// Aktueller Kopf der Warteschlange
    pub fn kopf(&self) -> Option<&SpielAufgabe> {
        self.aufgaben.front()
    }

    /// Entfernt den Kopf (nach erfolgreicher Ausfuehrung oder Verwurf)
    pub fn kopf_entfernen(&mut self) -> Option<SpielAufgabe> {
        self.aufgaben.pop_front()
    }

    /// Anzahl wartender Aufgaben
    pub fn len(&self) -> usize {
        self.aufgaben.len()
    }

    /// Ist die Warteschlange leer?
    pub fn ist_leer(&self) -> bool {
        self.aufgaben.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_reihenfolge() {
        let mut liste = AufgabenListe::neu();
        liste.einreihen(SpielAufgabe::HostGame {
            karte: "SCMP_001".into(),
        });
        liste.einreihen(SpielAufgabe::DisconnectFromPeer {
            spieler: SpielerId(2),
        });

        assert_eq!(liste.len(), 2);
        assert!(matches!(
            liste.kopf(),
            Some(SpielAufgabe::HostGame { .. })
        ));

        let erste = liste.kopf_entfernen().unwrap();
        assert!(matches!(erste, SpielAufgabe::HostGame { .. }));
        let zweite = liste.kopf_entfernen().unwrap();
        assert!(matches!(zweite, SpielAufgabe::DisconnectFromPeer { .. }));
        assert!(liste.ist_leer());
    }

    #[test]
    fn kopf_laesst_warteschlange_unveraendert() {
        let mut liste = AufgabenListe::neu();
        liste.einreihen(SpielAufgabe::ConnectToPeer {
            login: "QAI".into(),
            spieler: SpielerId(5),
        });

        let _ = liste.kopf();
        let _ = liste.kopf();
        assert_eq!(liste.len(), 1);
    }
}
