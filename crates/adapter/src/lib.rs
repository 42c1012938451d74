//! eisbruecke-adapter – Orchestrierungskern
//!
//! Dieses Crate besitzt den gesamten veraenderlichen Zustand des Adapters:
//! den vom Spiel gemeldeten Lobby-Status, die FIFO-Warteschlange der
//! Spielaufgaben und das Verzeichnis der Peer-Relais. Saemtliche
//! Zustandsaenderungen laufen ueber genau einen Task (Aktor-Muster);
//! RPC-Aufrufe, GPGNet-Ereignisse und Relais-Ereignisse werden ueber einen
//! gemeinsamen Kanal serialisiert.
//!
//! ## Ablauf
//!
//! ```text
//! RPC-Aufruf ----------------+
//! GPGNet-Ereignis -----------+--> AdapterEingang (mpsc) --> AdapterKern
//! Relais-Ereignis -----------+                                  |
//!                                                               v
//!                      Aufgaben pruefen, Relais verwalten, Kommandos
//!                      an die Spielbruecke, Benachrichtigungen an den
//!                      Launcher
//! ```
//!
//! Die Raender (TCP-Server, ICE-Stack) sind ueber Seam-Traits angebunden
//! und in Tests durch Mocks ersetzt.

pub mod aufgaben;
pub mod ereignis;
pub mod error;
pub mod griff;
pub mod optionen;
pub mod orchestrator;
pub mod schnittstellen;
pub mod status;
pub mod verzeichnis;

#[cfg(test)]
mod tests;

pub use ereignis::{BrueckenEreignis, PeerEreignis};
pub use error::{AdapterError, AdapterResult};
pub use griff::AdapterGriff;
pub use optionen::AdapterOptionen;
pub use orchestrator::Adapter;
pub use schnittstellen::{Benachrichtiger, Relais, RelaisFabrik, RelaisLage, SpielBruecke};
pub use status::StatusBericht;
