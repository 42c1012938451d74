//! eisbruecke-protokoll – Nachrichtenformate
//!
//! Dieses Crate definiert die beiden Protokolle an den Raendern des
//! Adapters:
//!
//! - **GPGNet**: das binaere Lobby-Protokoll zwischen Adapter und lokal
//!   laufendem Spielprozess (`gpgnet` + `gpgnet_codec`)
//! - **JSON-RPC 2.0**: die Steuerschnittstelle zwischen Adapter und
//!   Launcher (`jsonrpc`)
//!
//! Es enthaelt nur Datentypen und (De-)Serialisierung, keine Sockets.

pub mod gpgnet;
pub mod gpgnet_codec;
pub mod jsonrpc;

pub use gpgnet::{GpgNetNachricht, GpgNetWert, LobbyModus};
pub use gpgnet_codec::GpgNetCodec;
pub use jsonrpc::{RpcAnfrage, RpcAntwort};
