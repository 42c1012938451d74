//! Fehlertypen fuer das Peer-Relais

use thiserror::Error;

/// Fehlertyp fuer Relais und ICE-Sitzung
#[derive(Debug, Error)]
pub enum RelaisError {
    /// IO-Fehler (UDP-Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Fehler aus dem webrtc-Stack
    #[error("WebRTC-Fehler: {0}")]
    Webrtc(#[from] webrtc::Error),

    /// Signalisierungsnachricht mit unbekanntem Typ
    #[error("Unbekannter Signal-Typ: {0}")]
    UnbekannterSignalTyp(String),

    /// Kandidaten-Blob liess sich nicht parsen
    #[error("Ungueltiger Kandidat: {0}")]
    UngueltigerKandidat(#[from] serde_json::Error),

    /// Die ICE-Sitzung existiert (noch) nicht
    #[error("Keine ICE-Sitzung vorhanden")]
    KeineSitzung,
}

/// Result-Typ fuer das Peer-Relais
pub type RelaisResult<T> = Result<T, RelaisError>;
