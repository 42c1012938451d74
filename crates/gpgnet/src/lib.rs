//! eisbruecke-gpgnet – TCP-Bruecke zum Spielprozess
//!
//! Der Spielprozess verbindet sich beim Start mit diesem Server und
//! spricht das binaere GPGNet-Protokoll. Der Server reicht eingehende
//! Nachrichten als Ereignisse an den Orchestrator weiter und verschickt
//! dessen Kommandos an die verbundene Spielsitzung.
//!
//! ## Architektur
//!
//! ```text
//! TcpListener (GpgNetServer)
//!     |
//!     v
//! Spielsitzung (pro Verbindung ein Task, Framed<GpgNetCodec>)
//!     |                               ^
//!     | GpgNetEreignis (mpsc)        | Sende-Queue (mpsc)
//!     v                               |
//! Orchestrator  ------ GpgNetGriff --+
//! ```
//!
//! Unterstuetzt ist genau eine Spielsitzung; weitere Verbindungen werden
//! angenommen, aber der Orchestrator warnt, sobald mehr als eine Sitzung
//! gleichzeitig existiert.

pub mod ereignis;
pub mod error;
pub mod server;

pub use ereignis::GpgNetEreignis;
pub use error::{GpgNetError, GpgNetResult};
pub use server::{GpgNetGriff, GpgNetServer};
