//! Asynchrone Ereignisse eines Peer-Relais
//!
//! Jedes Relais meldet seine Ereignisse ueber einen gemeinsamen Kanal an
//! den Orchestrator; die Spieler-ID identifiziert den Absender. Ereignisse
//! desselben Peers behalten ihre Reihenfolge, Ereignisse verschiedener
//! Peers duerfen sich verzahnen.

use eisbruecke_core::SpielerId;

use crate::ice::IceZustand;

/// Art eines Relais-Ereignisses
#[derive(Debug, Clone)]
pub enum RelaisEreignisArt {
    /// Die Sitzung hat eine Signalisierungsnachricht fuer den Peer erzeugt
    /// (Offer/Answer/Kandidat); muss an den Launcher weitergereicht werden
    SignalErzeugt {
        /// "offer", "answer" oder "candidate"
        typ: String,
        /// Opaker Nachrichteninhalt
        inhalt: String,
    },

    /// Der Konnektivitaetszustand der Sitzung hat sich geaendert
    ZustandGeaendert(IceZustand),

    /// Ein Kandidatenpaar wurde ausgewaehlt
    KandidatenpaarGewaehlt {
        /// Beschreibung des lokalen Kandidaten
        lokal: String,
        /// Beschreibung des entfernten Kandidaten
        entfernt: String,
    },

    /// Der Peer ist erstmals erreichbar (genau einmal pro Sitzung)
    ErstmalsVerbunden,
}

/// Ein Ereignis aus einem Peer-Relais
#[derive(Debug, Clone)]
pub struct RelaisEreignis {
    /// Entfernter Peer, von dessen Relais das Ereignis stammt
    pub spieler: SpielerId,
    /// Ereignisinhalt
    pub art: RelaisEreignisArt,
}
