//! AdapterGriff – Handle auf den Adapter-Task
//!
//! Der Griff ist die einzige Moeglichkeit, mit dem Kern zu sprechen. Jede
//! Methode schickt einen Eintrag in den Adapter-Kanal; zustandsaendernde
//! Aufrufe warten auf die Bestaetigung des Kerns, damit ihre Wirkung beim
//! Ruecksprung sichtbar ist (z.B. das frisch erzeugte Relais nach
//! `join_game`).

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use eisbruecke_core::SpielerId;

use crate::ereignis::{BrueckenEreignis, PeerEreignis};
use crate::error::{AdapterError, AdapterResult};
use crate::status::StatusBericht;

/// Ein Eintrag im Adapter-Kanal
///
/// RPC-Aufrufe tragen einen Antwortkanal; Ereignisse der Mitspieler
/// kommen ohne.
pub(crate) enum AdapterEingang {
    HostGame {
        karte: String,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    JoinGame {
        login: String,
        spieler: SpielerId,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    ConnectToPeer {
        login: String,
        spieler: SpielerId,
        offerer: bool,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    ReconnectToPeer {
        spieler: SpielerId,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    DisconnectFromPeer {
        spieler: SpielerId,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    SignalEinspielen {
        spieler: SpielerId,
        typ: String,
        inhalt: String,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    SendToGpgNet {
        kopf: String,
        teile: Vec<Value>,
        antwort: oneshot::Sender<AdapterResult<()>>,
    },
    Status {
        antwort: oneshot::Sender<StatusBericht>,
    },
    Beenden {
        antwort: oneshot::Sender<()>,
    },
    Bruecke(BrueckenEreignis),
    Peer {
        spieler: SpielerId,
        ereignis: PeerEreignis,
    },
}

/// Handle auf den laufenden Adapter-Task
#[derive(Clone)]
pub struct AdapterGriff {
    pub(crate) tx: mpsc::Sender<AdapterEingang>,
}

impl AdapterGriff {
    /// Schickt einen Eintrag und wartet auf die Antwort des Kerns
    async fn aufruf<T>(
        &self,
        eingang: AdapterEingang,
        antwort_rx: oneshot::Receiver<T>,
    ) -> AdapterResult<T> {
        self.tx
            .send(eingang)
            .await
            .map_err(|_| AdapterError::Beendet)?;
        antwort_rx.await.map_err(|_| AdapterError::Beendet)
    }

    /// Reiht ein HostGame-Kommando ein
    pub async fn host_game(&self, karte: String) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(AdapterEingang::HostGame { karte, antwort }, rx)
            .await?
    }

    /// Erzeugt ein Relais (Answerer) und reiht JoinGame ein
    pub async fn join_game(&self, login: String, spieler: SpielerId) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(
            AdapterEingang::JoinGame {
                login,
                spieler,
                antwort,
            },
            rx,
        )
        .await?
    }

    /// Erzeugt ein Relais (Modus laut Flag) und reiht ConnectToPeer ein
    pub async fn connect_to_peer(
        &self,
        login: String,
        spieler: SpielerId,
        offerer: bool,
    ) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(
            AdapterEingang::ConnectToPeer {
                login,
                spieler,
                offerer,
                antwort,
            },
            rx,
        )
        .await?
    }

    /// Startet die Sitzung des Peers neu
    pub async fn reconnect_to_peer(&self, spieler: SpielerId) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(AdapterEingang::ReconnectToPeer { spieler, antwort }, rx)
            .await?
    }

    /// Entfernt das Relais und reiht DisconnectFromPeer ein
    pub async fn disconnect_from_peer(&self, spieler: SpielerId) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(AdapterEingang::DisconnectFromPeer { spieler, antwort }, rx)
            .await?
    }

    /// Spielt eine Signalisierungsnachricht des Peers ein
    pub async fn signal_einspielen(
        &self,
        spieler: SpielerId,
        typ: String,
        inhalt: String,
    ) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(
            AdapterEingang::SignalEinspielen {
                spieler,
                typ,
                inhalt,
                antwort,
            },
            rx,
        )
        .await?
    }

    /// Reicht eine Nachricht unveraendert an den Spielprozess weiter
    pub async fn send_to_gpgnet(&self, kopf: String, teile: Vec<Value>) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(AdapterEingang::SendToGpgNet { kopf, teile, antwort }, rx)
            .await?
    }

    /// Liefert den vollstaendigen Statusbericht
    pub async fn status(&self) -> AdapterResult<StatusBericht> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(AdapterEingang::Status { antwort }, rx).await
    }

    /// Beendet den Adapter (loest das Shutdown-Signal aus)
    pub async fn beenden(&self) -> AdapterResult<()> {
        let (antwort, rx) = oneshot::channel();
        self.aufruf(AdapterEingang::Beenden { antwort }, rx).await
    }

    /// Speist ein Ereignis der GPGNet-Bruecke ein
    pub async fn bruecken_ereignis(&self, ereignis: BrueckenEreignis) {
        let _ = self.tx.send(AdapterEingang::Bruecke(ereignis)).await;
    }

    /// Speist ein Ereignis eines Peer-Relais ein
    pub async fn peer_ereignis(&self, spieler: SpielerId, ereignis: PeerEreignis) {
        let _ = self
            .tx
            .send(AdapterEingang::Peer { spieler, ereignis })
            .await;
    }
}
