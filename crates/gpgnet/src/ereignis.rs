//! Ereignisse der GPGNet-Bruecke
//!
//! Die Bruecke interpretiert keine Nachrichten; sie meldet alles an den
//! Orchestrator, der die `GameState`-Logik besitzt.

use eisbruecke_protokoll::GpgNetNachricht;

/// Ein Ereignis aus der GPGNet-Bruecke
#[derive(Debug, Clone)]
pub enum GpgNetEreignis {
    /// Eine Nachricht vom Spielprozess ist eingetroffen
    NachrichtEmpfangen(GpgNetNachricht),

    /// Eine Spielsitzung wurde auf- oder abgebaut
    VerbindungGeaendert {
        /// true = Sitzung verbunden, false = Sitzung getrennt
        verbunden: bool,
        /// Anzahl der danach noch bestehenden Sitzungen
        sitzungen: usize,
    },
}
