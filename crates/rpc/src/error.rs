//! Fehlertypen fuer die RPC-Schnittstelle

use thiserror::Error;

/// Fehlertyp fuer den RPC-Server
#[derive(Debug, Error)]
pub enum RpcError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Senden an den Steuerclient fehlgeschlagen
    #[error("Senden fehlgeschlagen")]
    SendFehler,
}

/// Result-Typ fuer den RPC-Server
pub type RpcResult<T> = Result<T, RpcError>;
