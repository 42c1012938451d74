//! eisbruecke-relais – Peer-Relais und NAT-Traversal
//!
//! Fuer jeden entfernten Peer existiert genau ein `PeerRelais`: ein lokaler
//! UDP-Endpunkt, den das Spiel statt der echten Peer-Adresse anspricht,
//! plus eine ICE-Sitzung (webrtc-Stack), die die Datagramme ueber den
//! ausgehandelten Pfad traegt.
//!
//! ## Datenpfad
//!
//! ```text
//! Spiel (127.0.0.1:lobby_port)
//!     |  UDP
//!     v
//! SpielSocket (127.0.0.1:relais_port)  <- stabil fuer die Lebensdauer
//!     |
//!     v
//! ICE-Datenkanal (unzuverlaessig, ungeordnet)  <-> entfernter Peer
//! ```
//!
//! Die Aushandlung selbst (Kandidaten, Konnektivitaetspruefungen) gehoert
//! dem webrtc-Stack; dieses Crate konsumiert nur Zustandswechsel und
//! reicht Signalisierungs-Blobs opak durch.

pub mod dns;
pub mod ereignis;
pub mod error;
pub mod ice;
pub mod relais;
pub mod udp;

pub use dns::IceServerAufloesung;
pub use ereignis::{RelaisEreignis, RelaisEreignisArt};
pub use error::{RelaisError, RelaisResult};
pub use ice::{IceLage, IceParameter, IceZustand};
pub use relais::PeerRelais;
