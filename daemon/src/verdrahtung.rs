//! Verdrahtung – Anbindungen zwischen Kern und Raendern
//!
//! Der Orchestrierungskern kennt nur seine Seam-Traits. Dieses Modul
//! implementiert sie mit den echten Bausteinen: GPGNet-Griff,
//! RPC-Broadcaster und Peer-Relais.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use eisbruecke_adapter::{
    AdapterError, AdapterGriff, Benachrichtiger, PeerEreignis, Relais, RelaisFabrik, RelaisLage,
    SpielBruecke,
};
use eisbruecke_core::SpielerId;
use eisbruecke_gpgnet::{GpgNetError, GpgNetGriff};
use eisbruecke_protokoll::GpgNetNachricht;
use eisbruecke_relais::{
    IceLage, IceParameter, PeerRelais, RelaisEreignis, RelaisEreignisArt,
};
use eisbruecke_rpc::{DienstErgebnis, DienstFehler, RpcBroadcaster, RpcDienst};

// ---------------------------------------------------------------------------
// GPGNet-Bruecke
// ---------------------------------------------------------------------------

/// Bindet den GPGNet-Griff an den Kern an
pub struct BrueckenAnbindung(pub GpgNetGriff);

impl SpielBruecke for BrueckenAnbindung {
    fn sitzungen(&self) -> usize {
        self.0.sitzungen()
    }

    fn lausch_port(&self) -> u16 {
        self.0.lausch_port()
    }

    fn senden(&self, nachricht: GpgNetNachricht) -> Result<(), AdapterError> {
        self.0.senden(nachricht).map_err(|fehler| match fehler {
            GpgNetError::KeineSitzung => AdapterError::KeineSitzung,
            andere => AdapterError::Intern(andere.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Launcher-Benachrichtigung
// ---------------------------------------------------------------------------

/// Bindet den RPC-Broadcaster an den Kern an
pub struct LauncherAnbindung(pub RpcBroadcaster);

impl Benachrichtiger for LauncherAnbindung {
    fn benachrichtigen(&self, methode: &str, params: Vec<Value>) {
        self.0.benachrichtigen(methode, params);
    }
}

// ---------------------------------------------------------------------------
// Relais
// ---------------------------------------------------------------------------

/// Bindet ein Peer-Relais an den Kern an
pub struct RelaisAnbindung(pub PeerRelais);

/// Uebersetzt die Relais-Momentaufnahme in die Kern-Form
fn lage_umwandeln(lage: IceLage) -> RelaisLage {
    RelaisLage {
        zustand: lage.zustand.als_text().to_owned(),
        mit_mir_verbunden: lage.mit_mir_verbunden,
        zum_peer_verbunden: lage.zum_peer_verbunden,
        lokaler_kandidat: lage.lokaler_kandidat,
        entfernter_kandidat: lage.entfernter_kandidat,
        entferntes_sdp: lage.entferntes_sdp,
        verbunden_nach_sek: lage.verbunden_nach.map(|dauer| dauer.as_secs_f64()),
    }
}

#[async_trait]
impl Relais for RelaisAnbindung {
    fn login(&self) -> &str {
        self.0.login()
    }

    fn lokaler_udp_port(&self) -> u16 {
        self.0.lokaler_udp_port()
    }

    fn offerer(&self) -> bool {
        self.0.offerer()
    }

    fn lage(&self) -> RelaisLage {
        lage_umwandeln(self.0.lage())
    }

    async fn signal_einspielen(&self, typ: &str, inhalt: &str) -> Result<(), AdapterError> {
        self.0
            .signal_einspielen(typ, inhalt)
            .await
            .map_err(|fehler| AdapterError::Intern(fehler.to_string()))
    }

    async fn neu_starten(&self) -> Result<(), AdapterError> {
        self.0
            .neu_starten()
            .await
            .map_err(|fehler| AdapterError::Intern(fehler.to_string()))
    }
}

/// Erzeugt echte Peer-Relais mit dem gemeinsamen Ereigniskanal
pub struct EchteRelaisFabrik {
    parameter: IceParameter,
    lobby_port: u16,
    ereignis_tx: mpsc::Sender<RelaisEreignis>,
}

impl EchteRelaisFabrik {
    /// Erstellt die Fabrik
    pub fn neu(
        parameter: IceParameter,
        lobby_port: u16,
        ereignis_tx: mpsc::Sender<RelaisEreignis>,
    ) -> Self {
        Self {
            parameter,
            lobby_port,
            ereignis_tx,
        }
    }
}

#[async_trait]
impl RelaisFabrik for EchteRelaisFabrik {
    async fn erzeugen(
        &self,
        spieler: SpielerId,
        login: &str,
        offerer: bool,
    ) -> Result<Arc<dyn Relais>, AdapterError> {
        let relais = PeerRelais::neu(
            spieler,
            login.to_owned(),
            offerer,
            self.parameter.clone(),
            self.lobby_port,
            self.ereignis_tx.clone(),
        )
        .await
        .map_err(|fehler| AdapterError::RelaisErzeugung(fehler.to_string()))?;

        Ok(Arc::new(RelaisAnbindung(relais)))
    }
}

/// Uebersetzt ein Relais-Ereignis in die Kern-Form
pub fn relais_ereignis_umwandeln(art: RelaisEreignisArt) -> PeerEreignis {
    match art {
        RelaisEreignisArt::SignalErzeugt { typ, inhalt } => {
            PeerEreignis::SignalErzeugt { typ, inhalt }
        }
        RelaisEreignisArt::ZustandGeaendert(zustand) => {
            PeerEreignis::ZustandGeaendert(zustand.als_text().to_owned())
        }
        RelaisEreignisArt::KandidatenpaarGewaehlt { lokal, entfernt } => {
            PeerEreignis::KandidatenpaarGewaehlt { lokal, entfernt }
        }
        RelaisEreignisArt::ErstmalsVerbunden => PeerEreignis::ErstmalsVerbunden,
    }
}

// ---------------------------------------------------------------------------
// RPC-Dienst
// ---------------------------------------------------------------------------

/// Bindet den Adapter-Griff an die RPC-Schnittstelle an
pub struct AdapterDienst(pub AdapterGriff);

/// Uebersetzt Kern-Fehler in die RPC-Fehlertexte
fn fehler_umwandeln(fehler: AdapterError) -> DienstFehler {
    match fehler {
        AdapterError::KeinRelais(spieler) => DienstFehler::KeinRelais(spieler),
        AdapterError::KeineSitzung => DienstFehler::KeineSitzung,
        andere => DienstFehler::Intern(andere.to_string()),
    }
}

#[async_trait]
impl RpcDienst for AdapterDienst {
    async fn quit(&self) {
        let _ = self.0.beenden().await;
    }

    async fn host_game(&self, karte: String) -> DienstErgebnis {
        self.0.host_game(karte).await.map_err(fehler_umwandeln)
    }

    async fn join_game(&self, login: String, spieler: SpielerId) -> DienstErgebnis {
        self.0
            .join_game(login, spieler)
            .await
            .map_err(fehler_umwandeln)
    }

    async fn connect_to_peer(
        &self,
        login: String,
        spieler: SpielerId,
        offerer: bool,
    ) -> DienstErgebnis {
        self.0
            .connect_to_peer(login, spieler, offerer)
            .await
            .map_err(fehler_umwandeln)
    }

    async fn reconnect_to_peer(&self, spieler: SpielerId) -> DienstErgebnis {
        self.0
            .reconnect_to_peer(spieler)
            .await
            .map_err(fehler_umwandeln)
    }

    async fn disconnect_from_peer(&self, spieler: SpielerId) -> DienstErgebnis {
        self.0
            .disconnect_from_peer(spieler)
            .await
            .map_err(fehler_umwandeln)
    }

    async fn add_sdp_message(
        &self,
        spieler: SpielerId,
        typ: String,
        inhalt: String,
    ) -> DienstErgebnis {
        self.0
            .signal_einspielen(spieler, typ, inhalt)
            .await
            .map_err(fehler_umwandeln)
    }

    async fn send_to_gpgnet(&self, kopf: String, teile: Vec<Value>) -> DienstErgebnis {
        self.0
            .send_to_gpgnet(kopf, teile)
            .await
            .map_err(fehler_umwandeln)
    }

    async fn status(&self) -> Value {
        match self.0.status().await {
            Ok(bericht) => bericht.als_json(),
            Err(fehler) => serde_json::json!({ "error": fehler.to_string() }),
        }
    }
}
