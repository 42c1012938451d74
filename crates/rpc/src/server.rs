//! JSON-RPC-TCP-Server – Listener und Steuerverbindungen
//!
//! Pro Steuerverbindung laeuft ein eigener tokio-Task, der Zeilen liest,
//! Anfragen an den `RpcDienst` verteilt und Benachrichtigungen aus dem
//! `RpcBroadcaster` auf den Stream schreibt.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_util::codec::{Framed, LinesCodec};
use uuid::Uuid;

use eisbruecke_protokoll::jsonrpc::FEHLER_PARSE;
use eisbruecke_protokoll::{RpcAnfrage, RpcAntwort};

use crate::broadcast::RpcBroadcaster;
use crate::dienst::RpcDienst;
use crate::error::RpcResult;
use crate::verteiler::verteilen;

/// Maximale Zeilenlaenge (SDP-Blobs koennen gross werden)
const MAX_ZEILEN_LAENGE: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// RpcGriff
// ---------------------------------------------------------------------------

/// Handle auf den laufenden RPC-Server
#[derive(Clone)]
pub struct RpcGriff {
    broadcaster: RpcBroadcaster,
    lausch_port: u16,
}

impl RpcGriff {
    /// Benachrichtigungs-Rundruf an alle Steuerclients
    pub fn broadcaster(&self) -> &RpcBroadcaster {
        &self.broadcaster
    }

    /// Tatsaechlich gebundener TCP-Port
    pub fn lausch_port(&self) -> u16 {
        self.lausch_port
    }
}

// ---------------------------------------------------------------------------
// RpcServer
// ---------------------------------------------------------------------------

/// TCP-Server fuer die Launcher-Steuerverbindung
pub struct RpcServer;

impl RpcServer {
    /// Bindet den Listener und startet die Accept-Loop
    ///
    /// Der `broadcaster` wird hereingereicht, damit der Orchestrator schon
    /// vor dem Serverstart Benachrichtigungen absetzen kann.
    pub async fn starten(
        bind_addr: SocketAddr,
        dienst: Arc<dyn RpcDienst>,
        broadcaster: RpcBroadcaster,
        shutdown_rx: watch::Receiver<bool>,
    ) -> RpcResult<RpcGriff> {
        let listener = TcpListener::bind(bind_addr).await?;
        let lokale_addr = listener.local_addr()?;

        tracing::info!(adresse = %lokale_addr, "RPC-Server gestartet");

        let griff = RpcGriff {
            broadcaster: broadcaster.clone(),
            lausch_port: lokale_addr.port(),
        };

        tokio::spawn(accept_loop(listener, dienst, broadcaster, shutdown_rx));

        Ok(griff)
    }
}

/// Accept-Loop: nimmt Steuerverbindungen an
async fn accept_loop(
    listener: TcpListener,
    dienst: Arc<dyn RpcDienst>,
    broadcaster: RpcBroadcaster,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        tracing::info!(peer = %peer_addr, "Steuerclient verbunden");
                        tokio::spawn(verbindung_verarbeiten(
                            stream,
                            peer_addr,
                            Arc::clone(&dienst),
                            broadcaster.clone(),
                            shutdown_rx.clone(),
                        ));
                    }
                    Err(e) => {
                        tracing::error!(fehler = %e, "RPC-Accept-Fehler");
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }

            Ok(()) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("RPC-Server: Shutdown-Signal empfangen");
                    break;
                }
            }
        }
    }
}

/// Verarbeitet eine einzelne Steuerverbindung bis zur Trennung
async fn verbindung_verarbeiten(
    stream: TcpStream,
    peer_addr: SocketAddr,
    dienst: Arc<dyn RpcDienst>,
    broadcaster: RpcBroadcaster,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let sitzungs_id = Uuid::new_v4();
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_ZEILEN_LAENGE));
    let mut sende_rx = broadcaster.sitzung_registrieren(sitzungs_id);

    loop {
        tokio::select! {
            // Eingehende Anfrage vom Launcher
            zeile = framed.next() => {
                match zeile {
                    Some(Ok(zeile)) => {
                        if zeile.trim().is_empty() {
                            continue;
                        }
                        if let Some(antwort) = anfrage_verarbeiten(&zeile, dienst.as_ref()).await {
                            if let Err(e) = framed.send(antwort.als_zeile()).await {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    fehler = %e,
                                    "RPC-Antwort senden fehlgeschlagen"
                                );
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(peer = %peer_addr, fehler = %e, "RPC-Lesefehler");
                        break;
                    }
                    None => {
                        tracing::info!(peer = %peer_addr, "Steuerclient hat Verbindung getrennt");
                        break;
                    }
                }
            }

            // Ausgehende Benachrichtigung aus dem Broadcaster
            Some(ausgehend) = sende_rx.recv() => {
                if let Err(e) = framed.send(ausgehend).await {
                    tracing::warn!(
                        peer = %peer_addr,
                        fehler = %e,
                        "Benachrichtigung senden fehlgeschlagen"
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

    broadcaster.sitzung_entfernen(&sitzungs_id);
    tracing::info!(sitzung = %sitzungs_id, "Steuerverbindungs-Task beendet");
}

/// Parst und verteilt eine Anfragezeile
///
/// Gibt `None` zurueck wenn keine Antwort gesendet werden soll
/// (Benachrichtigungen ohne ID).
async fn anfrage_verarbeiten(zeile: &str, dienst: &dyn RpcDienst) -> Option<RpcAntwort> {
    let anfrage = match RpcAnfrage::parsen(zeile) {
        Ok(anfrage) => anfrage,
        Err(e) => {
            tracing::warn!(fehler = %e, "Ungueltige RPC-Zeile");
            return Some(RpcAntwort::fehler(
                serde_json::Value::Null,
                FEHLER_PARSE,
                e.to_string(),
            ));
        }
    };

    let id = anfrage.id.clone();
    let ergebnis = verteilen(dienst, &anfrage).await;

    // Ohne ID keine Antwort (Benachrichtigung); der Aufruf wurde trotzdem
    // ausgefuehrt.
    let id = id?;

    Some(match ergebnis {
        Ok(wert) => RpcAntwort::erfolg(id, wert),
        Err((code, meldung)) => RpcAntwort::fehler(id, code, meldung),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dienst::DienstErgebnis;
    use async_trait::async_trait;
    use eisbruecke_core::SpielerId;
    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    /// Minimaler Dienst fuer Server-Tests
    struct TestDienst;

    #[async_trait]
    impl RpcDienst for TestDienst {
        async fn quit(&self) {}

        async fn host_game(&self, _karte: String) -> DienstErgebnis {
            Ok(())
        }

        async fn join_game(&self, _login: String, _spieler: SpielerId) -> DienstErgebnis {
            Ok(())
        }

        async fn connect_to_peer(
            &self,
            _login: String,
            _spieler: SpielerId,
            _offerer: bool,
        ) -> DienstErgebnis {
            Ok(())
        }

        async fn reconnect_to_peer(&self, spieler: SpielerId) -> DienstErgebnis {
            Err(crate::dienst::DienstFehler::KeinRelais(spieler))
        }

        async fn disconnect_from_peer(&self, _spieler: SpielerId) -> DienstErgebnis {
            Ok(())
        }

        async fn add_sdp_message(
            &self,
            _spieler: SpielerId,
            _typ: String,
            _inhalt: String,
        ) -> DienstErgebnis {
            Ok(())
        }

        async fn send_to_gpgnet(&self, _kopf: String, _teile: Vec<Value>) -> DienstErgebnis {
            Ok(())
        }

        async fn status(&self) -> Value {
            serde_json::json!({ "version": "test" })
        }
    }

    async fn test_server() -> (RpcGriff, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let griff = RpcServer::starten(
            "127.0.0.1:0".parse().unwrap(),
            Arc::new(TestDienst),
            RpcBroadcaster::neu(),
            shutdown_rx,
        )
        .await
        .expect("Server-Start fehlgeschlagen");
        (griff, shutdown_tx)
    }

    #[tokio::test]
    async fn aufruf_und_antwort_ueber_tcp() {
        let (griff, _shutdown) = test_server().await;

        let stream = TcpStream::connect(format!("127.0.0.1:{}", griff.lausch_port()))
            .await
            .unwrap();
        let (lesen, mut schreiben) = stream.into_split();
        let mut zeilen = BufReader::new(lesen).lines();

        schreiben
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"hostGame\",\"params\":[\"SCMP_001\"],\"id\":1}\n")
            .await
            .unwrap();

        let antwort = zeilen.next_line().await.unwrap().expect("Antwort erwartet");
        let wert: Value = serde_json::from_str(&antwort).unwrap();
        assert_eq!(wert["result"], Value::from("ok"));
        assert_eq!(wert["id"], Value::from(1));
    }

    #[tokio::test]
    async fn dienstfehler_kommt_als_fehlerantwort_an() {
        let (griff, _shutdown) = test_server().await;

        let stream = TcpStream::connect(format!("127.0.0.1:{}", griff.lausch_port()))
            .await
            .unwrap();
        let (lesen, mut schreiben) = stream.into_split();
        let mut zeilen = BufReader::new(lesen).lines();

        schreiben
            .write_all(b"{\"method\":\"reconnectToPeer\",\"params\":[12],\"id\":2}\n")
            .await
            .unwrap();

        let antwort = zeilen.next_line().await.unwrap().expect("Antwort erwartet");
        let wert: Value = serde_json::from_str(&antwort).unwrap();
        assert_eq!(
            wert["error"]["message"],
            Value::from("no relay for remote peer 12 found")
        );
    }

    #[tokio::test]
    async fn benachrichtigung_wird_auf_den_stream_geschrieben() {
        let (griff, _shutdown) = test_server().await;

        let stream = TcpStream::connect(format!("127.0.0.1:{}", griff.lausch_port()))
            .await
            .unwrap();
        let (lesen, _schreiben) = stream.into_split();
        let mut zeilen = BufReader::new(lesen).lines();

        // Warten bis die Sitzung registriert ist
        while griff.broadcaster().sitzungen() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        griff
            .broadcaster()
            .benachrichtigen("onConnectionStateChanged", vec![Value::from("Connected")]);

        let zeile = zeilen.next_line().await.unwrap().expect("Zeile erwartet");
        let wert: Value = serde_json::from_str(&zeile).unwrap();
        assert_eq!(wert["method"], Value::from("onConnectionStateChanged"));
    }

    #[tokio::test]
    async fn ungueltiges_json_ergibt_parse_fehler() {
        let (griff, _shutdown) = test_server().await;

        let stream = TcpStream::connect(format!("127.0.0.1:{}", griff.lausch_port()))
            .await
            .unwrap();
        let (lesen, mut schreiben) = stream.into_split();
        let mut zeilen = BufReader::new(lesen).lines();

        schreiben.write_all(b"kein json\n").await.unwrap();

        let antwort = zeilen.next_line().await.unwrap().expect("Antwort erwartet");
        let wert: Value = serde_json::from_str(&antwort).unwrap();
        assert_eq!(wert["error"]["code"], Value::from(FEHLER_PARSE));
        assert_eq!(wert["id"], Value::Null);
    }
}
