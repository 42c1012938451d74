//! Test-Hilfen fuer den Orchestrierungskern
//!
//! Mock-Implementierungen der Seam-Traits: die Bruecke zeichnet gesendete
//! Spielkommandos auf, der Benachrichtiger die Launcher-Benachrichtigungen,
//! die Fabrik liefert Mock-Relais mit fortlaufenden Ports.


use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use eisbruecke_core::SpielerId;
use eisbruecke_protokoll::GpgNetNachricht;

use crate::error::{AdapterError, AdapterResult};
use crate::griff::AdapterGriff;
use crate::optionen::AdapterOptionen;
use crate::orchestrator::Adapter;
use crate::schnittstellen::{Benachrichtiger, Relais, RelaisFabrik, RelaisLage, SpielBruecke};

/// Lokale Spieler-ID in allen Tests
pub const LOKALER_SPIELER: SpielerId = SpielerId(1);

// ---------------------------------------------------------------------------
// MockBruecke
// ---------------------------------------------------------------------------

/// Spielbruecke, die alle gesendeten Kommandos aufzeichnet
#[derive(Default)]
pub struct MockBruecke {
    sitzungen: AtomicUsize,
    gesendet: Mutex<Vec<GpgNetNachricht>>,
}

impl MockBruecke {
    pub fn sitzungen_setzen(&self, anzahl: usize) {
        self.sitzungen.store(anzahl, Ordering::SeqCst);
    }

    /// Alle bisher gesendeten Kommandos
    pub fn gesendete(&self) -> Vec<GpgNetNachricht> {
        self.gesendet.lock().clone()
    }

    /// Koepfe aller gesendeten Kommandos (fuer Reihenfolge-Pruefungen)
    pub fn gesendete_koepfe(&self) -> Vec<String> {
        self.gesendet
            .lock()
            .iter()
            .map(|nachricht| nachricht.kopf.clone())
            .collect()
    }
}

impl SpielBruecke for MockBruecke {
    fn sitzungen(&self) -> usize {
        self.sitzungen.load(Ordering::SeqCst)
    }

    fn lausch_port(&self) -> u16 {
        7237
    }

    fn senden(&self, nachricht: GpgNetNachricht) -> AdapterResult<()> {
        if self.sitzungen() == 0 {
            return Err(AdapterError::KeineSitzung);
        }
        self.gesendet.lock().push(nachricht);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockBenachrichtiger
// ---------------------------------------------------------------------------

/// Benachrichtiger, der alle Meldungen aufzeichnet
#[derive(Default)]
pub struct MockBenachrichtiger {
    notizen: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockBenachrichtiger {
    /// Alle aufgezeichneten Benachrichtigungen
    pub fn alle(&self) -> Vec<(String, Vec<Value>)> {
        self.notizen.lock().clone()
    }

    /// Parameterlisten aller Benachrichtigungen einer Methode
    pub fn von_methode(&self, methode: &str) -> Vec<Vec<Value>> {
        self.notizen
            .lock()
            .iter()
            .filter(|(name, _)| name == methode)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

impl Benachrichtiger for MockBenachrichtiger {
    fn benachrichtigen(&self, methode: &str, params: Vec<Value>) {
        self.notizen.lock().push((methode.to_owned(), params));
    }
}

// ---------------------------------------------------------------------------
// MockRelais / MockFabrik
// ---------------------------------------------------------------------------

/// Relais-Attrappe mit aufgezeichneten Signalen und Neustarts
pub struct MockRelais {
    pub spieler: SpielerId,
    pub login: String,
    pub port: u16,
    pub offerer: bool,
    pub lage: Mutex<RelaisLage>,
    pub signale: Mutex<Vec<(String, String)>>,
    pub neustarts: AtomicUsize,
}

#[async_trait]
impl Relais for MockRelais {
    fn login(&self) -> &str {
        &self.login
    }

    fn lokaler_udp_port(&self) -> u16 {
        self.port
    }

    fn offerer(&self) -> bool {
        self.offerer
    }

    fn lage(&self) -> RelaisLage {
        self.lage.lock().clone()
    }

    async fn signal_einspielen(&self, typ: &str, inhalt: &str) -> AdapterResult<()> {
        self.signale
            .lock()
            .push((typ.to_owned(), inhalt.to_owned()));
        Ok(())
    }

    async fn neu_starten(&self) -> AdapterResult<()> {
        self.neustarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fabrik, die Mock-Relais mit fortlaufenden Ports erzeugt
pub struct MockFabrik {
    naechster_port: AtomicU16,
    fehlschlagen: AtomicBool,
    erzeugte: Mutex<Vec<Arc<MockRelais>>>,
}

impl Default for MockFabrik {
    fn default() -> Self {
        Self {
            naechster_port: AtomicU16::new(40000),
            fehlschlagen: AtomicBool::new(false),
            erzeugte: Mutex::new(Vec::new()),
        }
    }
}

impl MockFabrik {
    /// Laesst alle weiteren Erzeugungen fehlschlagen
    pub fn fehlschlagen_lassen(&self) {
        self.fehlschlagen.store(true, Ordering::SeqCst);
    }

    /// Alle bisher erzeugten Relais
    pub fn erzeugte(&self) -> Vec<Arc<MockRelais>> {
        self.erzeugte.lock().clone()
    }
}

#[async_trait]
impl RelaisFabrik for MockFabrik {
    async fn erzeugen(
        &self,
        spieler: SpielerId,
        login: &str,
        offerer: bool,
    ) -> AdapterResult<Arc<dyn Relais>> {
        if self.fehlschlagen.load(Ordering::SeqCst) {
            return Err(AdapterError::RelaisErzeugung("Testfehler".into()));
        }
        let relais = Arc::new(MockRelais {
            spieler,
            login: login.to_owned(),
            port: self.naechster_port.fetch_add(1, Ordering::SeqCst),
            offerer,
            lage: Mutex::new(RelaisLage::default()),
            signale: Mutex::new(Vec::new()),
            neustarts: AtomicUsize::new(0),
        });
        self.erzeugte.lock().push(Arc::clone(&relais));
        Ok(relais)
    }
}

// ---------------------------------------------------------------------------
// Testumgebung
// ---------------------------------------------------------------------------

/// Laufender Adapter-Kern mit allen Mocks
pub struct TestUmgebung {
    pub griff: AdapterGriff,
    pub bruecke: Arc<MockBruecke>,
    pub benachrichtiger: Arc<MockBenachrichtiger>,
    pub fabrik: Arc<MockFabrik>,
    pub shutdown_rx: watch::Receiver<bool>,
}

impl TestUmgebung {
    /// Wartet, bis alle zuvor eingespeisten Ereignisse verarbeitet sind
    ///
    /// Ereignisse und Aufrufe laufen durch denselben FIFO-Kanal; ein
    /// beantworteter Status-Aufruf ist deshalb eine Barriere.
    pub async fn abwarten(&self) {
        let _ = self.griff.status().await;
    }
}

/// Startet einen Adapter-Kern mit Standard-Optionen und Mocks
pub fn testumgebung() -> TestUmgebung {
    let optionen = AdapterOptionen {
        spieler_id: LOKALER_SPIELER,
        login: "LokalerSpieler".into(),
        lobby_port: 6112,
        ..Default::default()
    };

    let bruecke = Arc::new(MockBruecke::default());
    let benachrichtiger = Arc::new(MockBenachrichtiger::default());
    let fabrik = Arc::new(MockFabrik::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let griff = Adapter::starten(
        optionen,
        Arc::clone(&bruecke) as Arc<dyn SpielBruecke>,
        Arc::clone(&benachrichtiger) as Arc<dyn Benachrichtiger>,
        Arc::clone(&fabrik) as Arc<dyn RelaisFabrik>,
        shutdown_tx,
    );

    TestUmgebung {
        griff,
        bruecke,
        benachrichtiger,
        fabrik,
        shutdown_rx,
    }
}
