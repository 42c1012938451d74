//! PeerRelais – ein entfernter Peer aus Sicht des Adapters
//!
//! Buendelt den stabilen SpielSocket mit der austauschbaren ICE-Sitzung.
//! Ein Neustart der Sitzung (`neu_starten`) behaelt den UDP-Port bei; das
//! Spiel merkt davon nichts.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use webrtc::data_channel::RTCDataChannel;

use eisbruecke_core::SpielerId;

use crate::ereignis::RelaisEreignis;
use crate::error::{RelaisError, RelaisResult};
use crate::ice::{IceLage, IceParameter, IceSitzung};
use crate::udp::SpielSocket;

/// Groesse der Eingangs-Queue (Peer -> Spiel)
const EINGANGS_QUEUE_GROESSE: usize = 256;

/// Ein Relais zu genau einem entfernten Peer
pub struct PeerRelais {
    spieler: SpielerId,
    login: String,
    offerer: bool,
    parameter: IceParameter,
    ereignis_tx: mpsc::Sender<RelaisEreignis>,
    socket: SpielSocket,
    dc_zelle: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    eingehend_tx: mpsc::Sender<Vec<u8>>,
    lage: Arc<Mutex<IceLage>>,
    sitzung: tokio::sync::Mutex<Option<IceSitzung>>,
    weiterleitungs_tasks: (JoinHandle<()>, JoinHandle<()>),
}

impl PeerRelais {
    /// Erzeugt Relais, Socket und erste ICE-Sitzung
    ///
    /// Im Offerer-Modus beginnt die Kandidatensuche sofort; das erste
    /// `SignalErzeugt`-Ereignis (Offer) liegt beim Ruecksprung bereits im
    /// Ereigniskanal.
    pub async fn neu(
        spieler: SpielerId,
        login: String,
        offerer: bool,
        parameter: IceParameter,
        lobby_port: u16,
        ereignis_tx: mpsc::Sender<RelaisEreignis>,
    ) -> RelaisResult<Self> {
        let socket = SpielSocket::neu().await?;
        let dc_zelle: Arc<Mutex<Option<Arc<RTCDataChannel>>>> = Arc::new(Mutex::new(None));
        let lage = Arc::new(Mutex::new(IceLage::default()));
        let (eingehend_tx, eingehend_rx) = mpsc::channel(EINGANGS_QUEUE_GROESSE);

        let weiterleitungs_tasks = socket.starten(
            spieler,
            Arc::clone(&dc_zelle),
            eingehend_rx,
            lobby_port,
        );

        let sitzung = IceSitzung::neu(
            spieler,
            offerer,
            &parameter,
            ereignis_tx.clone(),
            eingehend_tx.clone(),
            Arc::clone(&dc_zelle),
            Arc::clone(&lage),
        )
        .await?;

        tracing::info!(
            %spieler,
            login = %login,
            relais_port = socket.port(),
            offerer,
            "Peer-Relais erzeugt"
        );

        Ok(Self {
            spieler,
            login,
            offerer,
            parameter,
            ereignis_tx,
            socket,
            dc_zelle,
            eingehend_tx,
            lage,
            sitzung: tokio::sync::Mutex::new(Some(sitzung)),
            weiterleitungs_tasks,
        })
    }

    /// Entfernter Peer dieses Relais
    pub fn spieler(&self) -> SpielerId {
        self.spieler
    }

    /// Login des entfernten Peers
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Wurde das Relais im Offerer-Modus erzeugt?
    pub fn offerer(&self) -> bool {
        self.offerer
    }

    /// Lokaler UDP-Port fuer das Spiel
    pub fn lokaler_udp_port(&self) -> u16 {
        self.socket.port()
    }

    /// Momentaufnahme des Sitzungszustands
    pub fn lage(&self) -> IceLage {
        self.lage.lock().clone()
    }

    /// Spielt eine Signalisierungsnachricht des Peers ein
    ///
    /// Eine Nachricht darf auch nach hergestellter Verbindung eintreffen
    /// (Neuverhandlung); das ist eine Warnung, kein Fehler. Ohne Sitzung
    /// schlaegt der Aufruf fehl.
    pub async fn signal_einspielen(&self, typ: &str, inhalt: &str) -> RelaisResult<()> {
        if self.lage.lock().mit_mir_verbunden {
            tracing::warn!(
                spieler = %self.spieler,
                typ,
                "Signalisierung auf bereits verbundener Sitzung (Neuverhandlung?)"
            );
        }
        let sitzung = self.sitzung.lock().await;
        match sitzung.as_ref() {
            Some(sitzung) => sitzung.signal_einspielen(typ, inhalt, &self.ereignis_tx).await,
            None => Err(RelaisError::KeineSitzung),
        }
    }

    /// Startet die ICE-Sitzung neu, ohne den UDP-Port zu verlieren
    ///
    /// Die STUN/TURN-Adressen werden dabei frisch aus dem Aufloesungs-Cache
    /// gelesen.
    pub async fn neu_starten(&self) -> RelaisResult<()> {
        tracing::info!(spieler = %self.spieler, "ICE-Sitzung wird neu gestartet");

        let mut sitzung = self.sitzung.lock().await;
        if let Some(alte) = sitzung.take() {
            alte.schliessen_im_hintergrund();
        }

        let neue = IceSitzung::neu(
            self.spieler,
            self.offerer,
            &self.parameter,
            self.ereignis_tx.clone(),
            self.eingehend_tx.clone(),
            Arc::clone(&self.dc_zelle),
            Arc::clone(&self.lage),
        )
        .await?;
        *sitzung = Some(neue);
        Ok(())
    }
}

impl Drop for PeerRelais {
    fn drop(&mut self) {
        self.weiterleitungs_tasks.0.abort();
        self.weiterleitungs_tasks.1.abort();
        if let Ok(mut sitzung) = self.sitzung.try_lock() {
            if let Some(sitzung) = sitzung.take() {
                sitzung.schliessen_im_hintergrund();
            }
        }
        tracing::info!(spieler = %self.spieler, "Peer-Relais abgebaut");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::IceServerAufloesung;
    use crate::ereignis::RelaisEreignisArt;

    fn test_parameter() -> IceParameter {
        IceParameter {
            aufloesung: IceServerAufloesung::neu(),
            turn_user: String::new(),
            turn_pass: String::new(),
            port_min: 0,
            port_max: 0,
        }
    }

    #[tokio::test]
    async fn offerer_erzeugt_sofort_ein_offer() {
        let (ereignis_tx, mut ereignis_rx) = mpsc::channel(32);
        let relais = PeerRelais::neu(
            SpielerId(3),
            "QAI".into(),
            true,
            test_parameter(),
            6112,
            ereignis_tx,
        )
        .await
        .expect("Relais-Erzeugung fehlgeschlagen");

        assert_ne!(relais.lokaler_udp_port(), 0);
        assert!(relais.offerer());

        // Das erste Signal-Ereignis muss das Offer sein; Kandidaten duerfen
        // davor im Kanal liegen, je nach Gathering-Geschwindigkeit nicht
        let mut offer_gesehen = false;
        for _ in 0..16 {
            match ereignis_rx.try_recv() {
                Ok(RelaisEreignis {
                    art: RelaisEreignisArt::SignalErzeugt { typ, inhalt },
                    spieler,
                }) if typ == "offer" => {
                    assert_eq!(spieler, SpielerId(3));
                    assert!(inhalt.contains("v=0"));
                    offer_gesehen = true;
                    break;
                }
                Ok(_) => continue,
                Err(_) => {
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                }
            }
        }
        assert!(offer_gesehen, "Offer-Ereignis erwartet");
    }

    #[tokio::test]
    async fn answerer_erzeugt_kein_offer() {
        let (ereignis_tx, mut ereignis_rx) = mpsc::channel(32);
        let relais = PeerRelais::neu(
            SpielerId(4),
            "Rhiza".into(),
            false,
            test_parameter(),
            6112,
            ereignis_tx,
        )
        .await
        .expect("Relais-Erzeugung fehlgeschlagen");

        assert!(!relais.offerer());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        while let Ok(ereignis) = ereignis_rx.try_recv() {
            if let RelaisEreignisArt::SignalErzeugt { typ, .. } = ereignis.art {
                assert_ne!(typ, "offer");
            }
        }
    }

    #[tokio::test]
    async fn unbekannter_signal_typ_wird_abgelehnt() {
        let (ereignis_tx, _ereignis_rx) = mpsc::channel(32);
        let relais = PeerRelais::neu(
            SpielerId(5),
            "Xinnony".into(),
            false,
            test_parameter(),
            6112,
            ereignis_tx,
        )
        .await
        .unwrap();

        let ergebnis = relais.signal_einspielen("telegramm", "inhalt").await;
        assert!(matches!(
            ergebnis,
            Err(RelaisError::UnbekannterSignalTyp(_))
        ));
    }

    #[tokio::test]
    async fn neu_starten_behaelt_den_port() {
        let (ereignis_tx, _ereignis_rx) = mpsc::channel(64);
        let relais = PeerRelais::neu(
            SpielerId(6),
            "Sprouto".into(),
            true,
            test_parameter(),
            6112,
            ereignis_tx,
        )
        .await
        .unwrap();

        let port_vorher = relais.lokaler_udp_port();
        relais.neu_starten().await.expect("Neustart fehlgeschlagen");
        assert_eq!(relais.lokaler_udp_port(), port_vorher);
    }
}
