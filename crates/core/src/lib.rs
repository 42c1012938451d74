//! eisbruecke-core – Gemeinsame Typen
//!
//! Dieses Crate definiert die Identifikations- und Zustandstypen, die von
//! allen anderen Eisbruecke-Crates geteilt werden. Es enthaelt bewusst
//! keine Logik und keine IO-Abhaengigkeiten.

pub mod types;

pub use types::{LobbyStatus, SpielerId};
