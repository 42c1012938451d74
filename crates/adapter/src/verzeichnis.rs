//! Relais-Verzeichnis – reine Besitz-Abbildung Peer-ID -> Relais
//!
//! Keine Richtlinienlogik: Anlegen, Nachschlagen, Entfernen, Leeren.
//! Pro Peer-ID existiert hoechstens ein Relais; erneutes Einfuegen ersetzt
//! den alten Eintrag (dessen Sitzung beim Drop abgebaut wird).

use eisbruecke_core::SpielerId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::schnittstellen::Relais;

/// Besitz-Abbildung der Peer-Relais
#[derive(Default)]
pub struct RelaisVerzeichnis {
    eintraege: HashMap<SpielerId, Arc<dyn Relais>>,
}

impl RelaisVerzeichnis {
    /// Erstellt ein leeres Verzeichnis
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuegt ein Relais ein; ein vorhandener Eintrag wird ersetzt
    ///
    /// Gibt das ersetzte Relais zurueck, damit der Aufrufer den Austausch
    /// loggen kann.
    pub fn einfuegen(
        &mut self,
        spieler: SpielerId,
        relais: Arc<dyn Relais>,
    ) -> Option<Arc<dyn Relais>> {
        self.eintraege.insert(spieler, relais)
    }

    /// Schlaegt das Relais eines Peers nach
    pub fn holen(&self, spieler: SpielerId) -> Option<&Arc<dyn Relais>> {
        self.eintraege.get(&spieler)
    }

    /// Entfernt das Relais eines Peers
    pub fn entfernen(&mut self, spieler: SpielerId) -> Option<Arc<dyn Relais>> {
        self.eintraege.remove(&spieler)
    }

    /// Entfernt alle Relais (Spielprozess getrennt)
    pub fn leeren(&mut self) {
        self.eintraege.clear();
    }

    /// Anzahl der Relais
    pub fn len(&self) -> usize {
        self.eintraege.len()
    }

    /// Ist das Verzeichnis leer?
    pub fn ist_leer(&self) -> bool {
        self.eintraege.is_empty()
    }

    /// Iteriert ueber alle Eintraege (Reihenfolge unspezifiziert)
    pub fn iter(&self) -> impl Iterator<Item = (SpielerId, &Arc<dyn Relais>)> {
        self.eintraege.iter().map(|(id, relais)| (*id, relais))
    }
}
