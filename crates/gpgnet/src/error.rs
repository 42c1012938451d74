//! Fehlertypen fuer die GPGNet-Bruecke

use thiserror::Error;

/// Fehlertyp fuer die GPGNet-Bruecke
#[derive(Debug, Error)]
pub enum GpgNetError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Es ist keine Spielsitzung verbunden
    #[error("no sessions connected")]
    KeineSitzung,

    /// Senden an die Spielsitzung fehlgeschlagen (Queue voll oder geschlossen)
    #[error("Senden an Spielsitzung fehlgeschlagen")]
    SendFehler,
}

/// Result-Typ fuer die GPGNet-Bruecke
pub type GpgNetResult<T> = Result<T, GpgNetError>;
