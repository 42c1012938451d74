//! SpielSocket – lokaler UDP-Endpunkt eines Relais
//!
//! Der Socket ist die Adresse, die dem Spiel anstelle des entfernten Peers
//! genannt wird (`127.0.0.1:<port>`). Er bleibt fuer die Lebensdauer des
//! Relais stabil, auch wenn die ICE-Sitzung neu gestartet wird.
//!
//! ## Datenfluss
//!
//! ```text
//! Spiel --UDP--> SpielSocket --Datenkanal--> Peer
//! Peer --Datenkanal--> Eingangs-Queue --UDP--> 127.0.0.1:lobby_port
//! ```

use bytes::Bytes;
use parking_lot::Mutex;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use webrtc::data_channel::RTCDataChannel;

use eisbruecke_core::SpielerId;

use crate::error::RelaisResult;

/// Maximale UDP-Paketgroesse (Spieldatagramme bleiben unter der MTU)
const UDP_PUFFER_GROESSE: usize = 1500;

/// Lokaler UDP-Endpunkt eines Peer-Relais
pub struct SpielSocket {
    socket: Arc<UdpSocket>,
    port: u16,
}

impl SpielSocket {
    /// Bindet einen ephemeren Port auf 127.0.0.1
    pub async fn neu() -> RelaisResult<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)).await?;
        let port = socket.local_addr()?.port();
        Ok(Self {
            socket: Arc::new(socket),
            port,
        })
    }

    /// Gebundener Port (stabil fuer die Lebensdauer des Relais)
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Startet die beiden Weiterleitungs-Tasks
    ///
    /// - Spiel -> Peer: vom Socket lesen, ueber den aktuellen Datenkanal
    ///   senden (Zelle wird bei Sitzungs-Neustart ausgetauscht)
    /// - Peer -> Spiel: aus der Eingangs-Queue lesen, an den Lobby-Port
    ///   des Spiels senden
    ///
    /// Die zurueckgegebenen Handles werden beim Abbau des Relais
    /// abgebrochen.
    pub fn starten(
        &self,
        spieler: SpielerId,
        dc_zelle: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
        mut eingehend_rx: mpsc::Receiver<Vec<u8>>,
        lobby_port: u16,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        // Spiel -> Peer
        let socket = Arc::clone(&self.socket);
        let lese_task = tokio::spawn(async move {
            let mut puffer = [0u8; UDP_PUFFER_GROESSE];
            loop {
                match socket.recv_from(&mut puffer).await {
                    Ok((laenge, von)) => {
                        if !von.ip().is_loopback() {
                            tracing::warn!(%spieler, von = %von, "Fremdes UDP-Paket verworfen");
                            continue;
                        }
                        // Datenkanal kurz aus der Zelle holen, ohne den
                        // Lock ueber das Senden zu halten
                        let kanal = dc_zelle.lock().clone();
                        let Some(kanal) = kanal else {
                            tracing::trace!(%spieler, "Kein Datenkanal – Datagramm verworfen");
                            continue;
                        };
                        if let Err(e) = kanal.send(&Bytes::copy_from_slice(&puffer[..laenge])).await
                        {
                            tracing::debug!(%spieler, fehler = %e, "Datenkanal-Senden fehlgeschlagen");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(%spieler, fehler = %e, "UDP-Lesefehler");
                        break;
                    }
                }
            }
        });

        // Peer -> Spiel
        let socket = Arc::clone(&self.socket);
        let spiel_addr = SocketAddr::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, lobby_port));
        let schreib_task = tokio::spawn(async move {
            while let Some(datagramm) = eingehend_rx.recv().await {
                if let Err(e) = socket.send_to(&datagramm, spiel_addr).await {
                    tracing::warn!(%spieler, fehler = %e, "UDP-Senden an das Spiel fehlgeschlagen");
                }
            }
        });

        (lese_task, schreib_task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bindet_loopback_mit_ephemerem_port() {
        let socket = SpielSocket::neu().await.expect("Bind fehlgeschlagen");
        assert_ne!(socket.port(), 0);
    }

    #[tokio::test]
    async fn eingangs_queue_wird_an_den_lobby_port_weitergeleitet() {
        // Spiel-Seite simulieren
        let spiel = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let lobby_port = spiel.local_addr().unwrap().port();

        let socket = SpielSocket::neu().await.unwrap();
        let dc_zelle = Arc::new(Mutex::new(None));
        let (eingehend_tx, eingehend_rx) = mpsc::channel(8);
        let (_lese, _schreib) =
            socket.starten(SpielerId(1), dc_zelle, eingehend_rx, lobby_port);

        eingehend_tx.send(vec![1, 2, 3]).await.unwrap();

        let mut puffer = [0u8; 16];
        let (laenge, von) = spiel.recv_from(&mut puffer).await.unwrap();
        assert_eq!(&puffer[..laenge], &[1, 2, 3]);
        assert_eq!(von.port(), socket.port());
    }
}
