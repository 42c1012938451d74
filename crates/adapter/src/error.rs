//! Fehlertypen des Orchestrierungskerns

use eisbruecke_core::SpielerId;
use thiserror::Error;

/// Fehlertyp des Orchestrierungskerns
///
/// Die Meldungstexte von `KeinRelais` und `KeineSitzung` sind Teil der
/// RPC-Schnittstelle und duerfen sich nicht aendern.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// Fuer den Peer existiert kein Relais
    #[error("no relay for remote peer {0} found")]
    KeinRelais(SpielerId),

    /// Kein Spielprozess verbunden
    #[error("no sessions connected")]
    KeineSitzung,

    /// Relais konnte nicht erzeugt werden (Socket, ICE-Stack)
    #[error("Relais-Erzeugung fehlgeschlagen: {0}")]
    RelaisErzeugung(String),

    /// Der Adapter-Task laeuft nicht mehr
    #[error("Adapter ist beendet")]
    Beendet,

    /// Sonstiger interner Fehler
    #[error("{0}")]
    Intern(String),
}

/// Result-Typ des Orchestrierungskerns
pub type AdapterResult<T> = Result<T, AdapterError>;
