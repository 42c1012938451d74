//! Eingehende Ereignisse der externen Mitspieler
//!
//! Der Daemon bildet die Ereignistypen von GPGNet-Bruecke und Relais auf
//! diese Formen ab und speist sie in den Adapter-Kanal ein. Damit bleibt
//! der Kern frei von Transport-Abhaengigkeiten.

use eisbruecke_protokoll::GpgNetNachricht;

/// Ereignis der GPGNet-Bruecke
#[derive(Debug, Clone)]
pub enum BrueckenEreignis {
    /// Nachricht vom Spielprozess
    Nachricht(GpgNetNachricht),

    /// Spielsitzung auf- oder abgebaut
    VerbindungGeaendert {
        /// true = verbunden, false = getrennt
        verbunden: bool,
        /// Anzahl der danach bestehenden Sitzungen
        sitzungen: usize,
    },
}

/// Ereignis eines Peer-Relais
///
/// Signalisierungs- und Zustandswerte sind fuer den Kern opak; er reicht
/// sie nur als Benachrichtigungen an den Launcher weiter.
#[derive(Debug, Clone)]
pub enum PeerEreignis {
    /// Die Sitzung hat eine Signalisierungsnachricht erzeugt
    SignalErzeugt {
        /// "offer", "answer" oder "candidate"
        typ: String,
        /// Opaker Inhalt
        inhalt: String,
    },

    /// Konnektivitaetszustand hat sich geaendert
    ZustandGeaendert(String),

    /// Kandidatenpaar wurde ausgewaehlt
    KandidatenpaarGewaehlt {
        /// Beschreibung des lokalen Kandidaten
        lokal: String,
        /// Beschreibung des entfernten Kandidaten
        entfernt: String,
    },

    /// Peer ist erstmals erreichbar
    ErstmalsVerbunden,
}
