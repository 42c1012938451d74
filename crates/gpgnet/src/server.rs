//! GPGNet-TCP-Server – Listener, Spielsitzungen, Sende-Griff
//!
//! Bindet den GPGNet-Port und startet fuer jede eingehende Verbindung
//! einen eigenen tokio-Task. Der `GpgNetGriff` ist das Sende-Handle des
//! Orchestrators: er kennt die Sende-Queues aller Sitzungen und den
//! tatsaechlich gebundenen Port.

use dashmap::DashMap;
use eisbruecke_protokoll::{GpgNetCodec, GpgNetNachricht};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::ereignis::GpgNetEreignis;
use crate::error::{GpgNetError, GpgNetResult};

/// Groesse der Sende-Queue pro Spielsitzung
const SENDE_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// GpgNetGriff
// ---------------------------------------------------------------------------

/// Sende-Handle auf den laufenden GPGNet-Server
///
/// Clone teilt den inneren Zustand; der Griff bleibt auch gueltig, wenn
/// gerade keine Spielsitzung verbunden ist.
#[derive(Clone)]
pub struct GpgNetGriff {
    sitzungen: Arc<DashMap<Uuid, mpsc::Sender<GpgNetNachricht>>>,
    lausch_port: u16,
}

impl GpgNetGriff {
    /// Anzahl der aktuell verbundenen Spielsitzungen
    pub fn sitzungen(&self) -> usize {
        self.sitzungen.len()
    }

    /// Tatsaechlich gebundener TCP-Port
    pub fn lausch_port(&self) -> u16 {
        self.lausch_port
    }

    /// Sendet eine Nachricht an alle verbundenen Spielsitzungen
    ///
    /// Gibt `KeineSitzung` zurueck wenn der Spielprozess nicht verbunden
    /// ist. Eine volle Sende-Queue fuehrt zum Verwerfen der Nachricht fuer
    /// diese Sitzung (geloggt), nicht zum Blockieren des Aufrufers.
    pub fn senden(&self, nachricht: GpgNetNachricht) -> GpgNetResult<()> {
        if self.sitzungen.is_empty() {
            return Err(GpgNetError::KeineSitzung);
        }
        for eintrag in self.sitzungen.iter() {
            match eintrag.value().try_send(nachricht.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        sitzung = %eintrag.key(),
                        "GPGNet-Sende-Queue voll – Nachricht verworfen"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(
                        sitzung = %eintrag.key(),
                        "GPGNet-Sende-Queue geschlossen (Sitzung getrennt)"
                    );
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GpgNetServer
// ---------------------------------------------------------------------------

/// TCP-Server fuer die Spielprozess-Verbindung
pub struct GpgNetServer;

impl GpgNetServer {
    /// Bindet den Listener und startet die Accept-Loop
    ///
    /// Gibt den Sende-Griff zurueck; die Accept-Loop laeuft bis
    /// `shutdown_rx` ein `true`-Signal liefert.
    pub async fn starten(
        bind_addr: SocketAddr,
        ereignis_tx: mpsc::Sender<GpgNetEreignis>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> GpgNetResult<GpgNetGriff> {
        let listener = TcpListener::bind(bind_addr).await?;
        let lokale_addr = listener.local_addr()?;

        tracing::info!(adresse = %lokale_addr, "GPGNet-Server gestartet");

        let sitzungen: Arc<DashMap<Uuid, mpsc::Sender<GpgNetNachricht>>> =
            Arc::new(DashMap::new());

        let griff = GpgNetGriff {
            sitzungen: Arc::clone(&sitzungen),
            lausch_port: lokale_addr.port(),
        };

        tokio::spawn(accept_loop(listener, sitzungen, ereignis_tx, shutdown_rx));

        Ok(griff)
    }
}

/// Accept-Loop: nimmt Spielverbindungen an und startet Sitzungs-Tasks
async fn accept_loop(
    listener: TcpListener,
    sitzungen: Arc<DashMap<Uuid, mpsc::Sender<GpgNetNachricht>>>,
    ereignis_tx: mpsc::Sender<GpgNetEreignis>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        tracing::info!(peer = %peer_addr, "Spielprozess verbunden");
                        tokio::spawn(sitzung_verarbeiten(
                            stream,
                            peer_addr,
                            Arc::clone(&sitzungen),
                            ereignis_tx.clone(),
                            shutdown_rx.clone(),
                        ));
                    }
                    Err(e) => {
                        tracing::error!(fehler = %e, "GPGNet-Accept-Fehler");
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }

            Ok(()) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("GPGNet-Server: Shutdown-Signal empfangen");
                    break;
                }
            }
        }
    }
}

/// Verarbeitet eine einzelne Spielsitzung bis zur Trennung
async fn sitzung_verarbeiten(
    stream: TcpStream,
    peer_addr: SocketAddr,
    sitzungen: Arc<DashMap<Uuid, mpsc::Sender<GpgNetNachricht>>>,
    ereignis_tx: mpsc::Sender<GpgNetEreignis>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let sitzungs_id = Uuid::new_v4();
    let mut framed = Framed::new(stream, GpgNetCodec::new());

    // Sende-Queue registrieren und Verbindungsereignis melden
    let (sende_tx, mut sende_rx) = mpsc::channel::<GpgNetNachricht>(SENDE_QUEUE_GROESSE);
    sitzungen.insert(sitzungs_id, sende_tx);
    let _ = ereignis_tx
        .send(GpgNetEreignis::VerbindungGeaendert {
            verbunden: true,
            sitzungen: sitzungen.len(),
        })
        .await;

    loop {
        tokio::select! {
            // Eingehende Nachricht vom Spiel
            frame = framed.next() => {
                match frame {
                    Some(Ok(nachricht)) => {
                        tracing::debug!(
                            sitzung = %sitzungs_id,
                            nachricht = %nachricht,
                            "GPGNet-Nachricht empfangen"
                        );
                        if ereignis_tx
                            .send(GpgNetEreignis::NachrichtEmpfangen(nachricht))
                            .await
                            .is_err()
                        {
                            // Orchestrator weg -> Sitzung beenden
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(
                            sitzung = %sitzungs_id,
                            fehler = %e,
                            "GPGNet-Lesefehler"
                        );
                        break;
                    }
                    None => {
                        tracing::info!(peer = %peer_addr, "Spielprozess hat Verbindung getrennt");
                        break;
                    }
                }
            }

            // Ausgehendes Kommando des Orchestrators
            Some(ausgehend) = sende_rx.recv() => {
                tracing::debug!(
                    sitzung = %sitzungs_id,
                    nachricht = %ausgehend,
                    "GPGNet-Kommando gesendet"
                );
                if let Err(e) = framed.send(ausgehend).await {
                    tracing::warn!(
                        sitzung = %sitzungs_id,
                        fehler = %e,
                        "GPGNet-Senden fehlgeschlagen"
                    );
                    break;
                }
            }

            // Shutdown-Signal
            Ok(()) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    // Abmelden und Trennungsereignis melden
    sitzungen.remove(&sitzungs_id);
    let _ = ereignis_tx
        .send(GpgNetEreignis::VerbindungGeaendert {
            verbunden: false,
            sitzungen: sitzungen.len(),
        })
        .await;

    tracing::info!(sitzung = %sitzungs_id, "GPGNet-Sitzungs-Task beendet");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use eisbruecke_protokoll::GpgNetWert;

    async fn test_server() -> (GpgNetGriff, mpsc::Receiver<GpgNetEreignis>, watch::Sender<bool>) {
        let (ereignis_tx, ereignis_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let griff = GpgNetServer::starten(
            "127.0.0.1:0".parse().unwrap(),
            ereignis_tx,
            shutdown_rx,
        )
        .await
        .expect("Server-Start fehlgeschlagen");
        (griff, ereignis_rx, shutdown_tx)
    }

    #[tokio::test]
    async fn verbindungs_ereignisse_beim_auf_und_abbau() {
        let (griff, mut ereignis_rx, _shutdown) = test_server().await;
        assert_eq!(griff.sitzungen(), 0);

        let adresse = format!("127.0.0.1:{}", griff.lausch_port());
        let stream = TcpStream::connect(&adresse).await.unwrap();

        match ereignis_rx.recv().await.expect("Ereignis erwartet") {
            GpgNetEreignis::VerbindungGeaendert { verbunden, sitzungen } => {
                assert!(verbunden);
                assert_eq!(sitzungen, 1);
            }
            andere => panic!("Unerwartetes Ereignis: {andere:?}"),
        }
        assert_eq!(griff.sitzungen(), 1);

        drop(stream);
        match ereignis_rx.recv().await.expect("Ereignis erwartet") {
            GpgNetEreignis::VerbindungGeaendert { verbunden, sitzungen } => {
                assert!(!verbunden);
                assert_eq!(sitzungen, 0);
            }
            andere => panic!("Unerwartetes Ereignis: {andere:?}"),
        }
    }

    #[tokio::test]
    async fn eingehende_nachricht_wird_als_ereignis_gemeldet() {
        let (griff, mut ereignis_rx, _shutdown) = test_server().await;

        let adresse = format!("127.0.0.1:{}", griff.lausch_port());
        let stream = TcpStream::connect(&adresse).await.unwrap();
        let mut framed = Framed::new(stream, GpgNetCodec::new());

        // Verbindungsereignis ueberspringen
        let _ = ereignis_rx.recv().await;

        framed
            .send(GpgNetNachricht::neu(
                "GameState",
                vec![GpgNetWert::from("Idle")],
            ))
            .await
            .unwrap();

        match ereignis_rx.recv().await.expect("Ereignis erwartet") {
            GpgNetEreignis::NachrichtEmpfangen(nachricht) => {
                assert_eq!(nachricht.kopf, "GameState");
                assert_eq!(nachricht.teile, vec![GpgNetWert::Text("Idle".into())]);
            }
            andere => panic!("Unerwartetes Ereignis: {andere:?}"),
        }
    }

    #[tokio::test]
    async fn senden_erreicht_die_spielsitzung() {
        let (griff, mut ereignis_rx, _shutdown) = test_server().await;

        let adresse = format!("127.0.0.1:{}", griff.lausch_port());
        let stream = TcpStream::connect(&adresse).await.unwrap();
        let mut framed = Framed::new(stream, GpgNetCodec::new());

        let _ = ereignis_rx.recv().await;

        griff
            .senden(GpgNetNachricht::host_game("SCMP_001"))
            .expect("Senden fehlgeschlagen");

        let empfangen = framed
            .next()
            .await
            .expect("Frame erwartet")
            .expect("Dekodieren fehlgeschlagen");
        assert_eq!(empfangen.kopf, "HostGame");
    }

    #[tokio::test]
    async fn senden_ohne_sitzung_schlaegt_fehl() {
        let (griff, _ereignis_rx, _shutdown) = test_server().await;
        let ergebnis = griff.senden(GpgNetNachricht::host_game("SCMP_001"));
        assert!(matches!(ergebnis, Err(GpgNetError::KeineSitzung)));
    }
}
