//! eisbruecke-rpc – JSON-RPC-Steuerschnittstelle
//!
//! Der Launcher verbindet sich per TCP und steuert den Adapter ueber
//! JSON-RPC-2.0-Aufrufe (eine Nachricht pro Zeile). In Gegenrichtung
//! verschickt der Adapter asynchrone Benachrichtigungen an alle
//! verbundenen Steuerclients.
//!
//! ## Architektur
//!
//! ```text
//! TcpListener (RpcServer)
//!     |
//!     v
//! Steuerverbindung (pro Verbindung ein Task, Framed<LinesCodec>)
//!     |                                  ^
//!     | RpcAnfrage -> verteilen()        | RpcBroadcaster (Benachrichtigungen)
//!     v                                  |
//! RpcDienst (implementiert vom Adapter) -+
//! ```

pub mod broadcast;
pub mod dienst;
pub mod error;
pub mod server;
pub mod verteiler;

pub use broadcast::RpcBroadcaster;
pub use dienst::{DienstErgebnis, DienstFehler, RpcDienst};
pub use error::{RpcError, RpcResult};
pub use server::{RpcGriff, RpcServer};
