//! Orchestrator – der Adapter-Kern als Aktor
//!
//! Genau ein Task besitzt Lobby-Status, Aufgabenwarteschlange und
//! Relais-Verzeichnis. Alle Eingaenge (RPC-Aufrufe, GPGNet-Ereignisse,
//! Relais-Ereignisse) laufen ueber einen Kanal und werden nacheinander
//! verarbeitet; nichts davon laeuft nebenlaeufig zueinander.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use eisbruecke_core::{LobbyStatus, SpielerId};
use eisbruecke_protokoll::{GpgNetNachricht, GpgNetWert, LobbyModus};

use crate::aufgaben::{AufgabenListe, SpielAufgabe};
use crate::ereignis::{BrueckenEreignis, PeerEreignis};
use crate::error::{AdapterError, AdapterResult};
use crate::griff::{AdapterEingang, AdapterGriff};
use crate::optionen::AdapterOptionen;
use crate::schnittstellen::{Benachrichtiger, RelaisFabrik, SpielBruecke};
use crate::status::{GpgNetStatus, IceAgentStatus, RelaisStatus, StatusBericht};
use crate::verzeichnis::RelaisVerzeichnis;

/// Groesse des Adapter-Kanals
const KANAL_GROESSE: usize = 256;

/// Slot-Anzahl fuer das CreateLobby-Kommando
const ANFANGS_SLOTS: i32 = 1;

/// Startet den Adapter-Kern
pub struct Adapter;

impl Adapter {
    /// Startet den Kern-Task und gibt den Griff zurueck
    ///
    /// `shutdown_tx` wird beim `quit`-Aufruf auf `true` gesetzt; die
    /// TCP-Server des Daemons haengen am zugehoerigen Receiver.
    pub fn starten(
        optionen: AdapterOptionen,
        bruecke: Arc<dyn SpielBruecke>,
        benachrichtiger: Arc<dyn Benachrichtiger>,
        fabrik: Arc<dyn RelaisFabrik>,
        shutdown_tx: watch::Sender<bool>,
    ) -> AdapterGriff {
        let (tx, rx) = mpsc::channel(KANAL_GROESSE);

        let kern = AdapterKern {
            optionen,
            bruecke,
            benachrichtiger,
            fabrik,
            lobby_status: LobbyStatus::Unbekannt,
            aufgaben: AufgabenListe::neu(),
            verzeichnis: RelaisVerzeichnis::neu(),
            gestartet_um: chrono::Utc::now(),
            shutdown_tx,
        };
        tokio::spawn(kern.laufen(rx));

        AdapterGriff { tx }
    }
}

/// Zustand und Logik des Adapter-Kerns
struct AdapterKern {
    optionen: AdapterOptionen,
    bruecke: Arc<dyn SpielBruecke>,
    benachrichtiger: Arc<dyn Benachrichtiger>,
    fabrik: Arc<dyn RelaisFabrik>,
    lobby_status: LobbyStatus,
    aufgaben: AufgabenListe,
    verzeichnis: RelaisVerzeichnis,
    gestartet_um: chrono::DateTime<chrono::Utc>,
    shutdown_tx: watch::Sender<bool>,
}

impl AdapterKern {
    /// Verarbeitungsschleife des Aktors
    async fn laufen(mut self, mut rx: mpsc::Receiver<AdapterEingang>) {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            spieler = %self.optionen.spieler_id,
            login = %self.optionen.login,
            "Adapter-Kern gestartet"
        );

        while let Some(eingang) = rx.recv().await {
            match eingang {
                AdapterEingang::HostGame { karte, antwort } => {
                    self.aufgaben.einreihen(SpielAufgabe::HostGame { karte });
                    self.aufgaben_ausfuehren();
                    let _ = antwort.send(Ok(()));
                }

                AdapterEingang::JoinGame {
                    login,
                    spieler,
                    antwort,
                } => {
                    let ergebnis = self.relais_erzeugen(spieler, &login, false).await;
                    if ergebnis.is_ok() {
                        self.aufgaben
                            .einreihen(SpielAufgabe::JoinGame { login, spieler });
                        self.aufgaben_ausfuehren();
                    }
                    let _ = antwort.send(ergebnis);
                }

                AdapterEingang::ConnectToPeer {
                    login,
                    spieler,
                    offerer,
                    antwort,
                } => {
                    let ergebnis = self.relais_erzeugen(spieler, &login, offerer).await;
                    if ergebnis.is_ok() {
                        self.aufgaben
                            .einreihen(SpielAufgabe::ConnectToPeer { login, spieler });
                        self.aufgaben_ausfuehren();
                    }
                    let _ = antwort.send(ergebnis);
                }

                AdapterEingang::ReconnectToPeer { spieler, antwort } => {
                    let _ = antwort.send(self.relais_neu_starten(spieler).await);
                }

                AdapterEingang::DisconnectFromPeer { spieler, antwort } => {
                    let _ = antwort.send(self.peer_trennen(spieler));
                }

                AdapterEingang::SignalEinspielen {
                    spieler,
                    typ,
                    inhalt,
                    antwort,
                } => {
                    let _ = antwort.send(self.signal_einspielen(spieler, &typ, &inhalt).await);
                }

                AdapterEingang::SendToGpgNet { kopf, teile, antwort } => {
                    let _ = antwort.send(self.an_spiel_senden(kopf, teile));
                }

                AdapterEingang::Status { antwort } => {
                    let _ = antwort.send(self.status_bericht());
                }

                AdapterEingang::Beenden { antwort } => {
                    tracing::info!("Beenden angefordert");
                    let _ = self.shutdown_tx.send(true);
                    let _ = antwort.send(());
                    break;
                }

                AdapterEingang::Bruecke(BrueckenEreignis::Nachricht(nachricht)) => {
                    self.spielnachricht_verarbeiten(nachricht);
                }

                AdapterEingang::Bruecke(BrueckenEreignis::VerbindungGeaendert {
                    verbunden,
                    sitzungen,
                }) => {
                    self.spielverbindung_verarbeiten(verbunden, sitzungen);
                }

                AdapterEingang::Peer { spieler, ereignis } => {
                    self.peer_ereignis_verarbeiten(spieler, ereignis);
                }
            }
        }

        tracing::info!("Adapter-Kern beendet");
    }

    // -----------------------------------------------------------------------
    // Relais-Verwaltung
    // -----------------------------------------------------------------------

    /// Erzeugt ein Relais und traegt es ins Verzeichnis ein
    ///
    /// Ein vorhandener Eintrag fuer dieselbe Peer-ID wird ersetzt; die
    /// alte Sitzung wird dabei abgebaut.
    async fn relais_erzeugen(
        &mut self,
        spieler: SpielerId,
        login: &str,
        offerer: bool,
    ) -> AdapterResult<()> {
        let relais = match self.fabrik.erzeugen(spieler, login, offerer).await {
            Ok(relais) => relais,
            Err(e) => {
                tracing::error!(%spieler, fehler = %e, "Relais konnte nicht erzeugt werden");
                return Err(e);
            }
        };

        if let Some(alt) = self.verzeichnis.einfuegen(spieler, relais) {
            tracing::info!(
                %spieler,
                alter_port = alt.lokaler_udp_port(),
                "Vorhandenes Relais ersetzt"
            );
        }
        Ok(())
    }

    /// Startet die Sitzung eines bestehenden Relais neu
    async fn relais_neu_starten(&mut self, spieler: SpielerId) -> AdapterResult<()> {
        let relais = match self.verzeichnis.holen(spieler) {
            Some(relais) => Arc::clone(relais),
            None => {
                tracing::error!(%spieler, "Kein Relais fuer Neustart gefunden");
                return Err(AdapterError::KeinRelais(spieler));
            }
        };
        relais.neu_starten().await
    }

    /// Entfernt das Relais und reiht das Trennkommando ein
    ///
    /// Das Relais verschwindet sofort aus dem Verzeichnis, nicht erst bei
    /// Ausfuehrung der Aufgabe.
    fn peer_trennen(&mut self, spieler: SpielerId) -> AdapterResult<()> {
        if self.verzeichnis.entfernen(spieler).is_none() {
            tracing::error!(%spieler, "Kein Relais zum Trennen gefunden");
            return Err(AdapterError::KeinRelais(spieler));
        }
        tracing::info!(%spieler, "Relais entfernt");
        self.aufgaben
            .einreihen(SpielAufgabe::DisconnectFromPeer { spieler });
        self.aufgaben_ausfuehren();
        Ok(())
    }

    /// Reicht eine Signalisierungsnachricht an das Relais weiter
    async fn signal_einspielen(
        &mut self,
        spieler: SpielerId,
        typ: &str,
        inhalt: &str,
    ) -> AdapterResult<()> {
        let relais = match self.verzeichnis.holen(spieler) {
            Some(relais) => Arc::clone(relais),
            None => {
                tracing::error!(%spieler, "Kein Relais fuer Signalisierung gefunden");
                return Err(AdapterError::KeinRelais(spieler));
            }
        };
        relais.signal_einspielen(typ, inhalt).await
    }

    // -----------------------------------------------------------------------
    // GPGNet-Ereignisse
    // -----------------------------------------------------------------------

    /// Verarbeitet eine Nachricht des Spielprozesses
    ///
    /// `GameState` mit genau einem String-Teil schaltet den Lobby-Status
    /// und stoesst die Warteschlange an; jede Nachricht wird anschliessend
    /// unveraendert an den Launcher gemeldet.
    fn spielnachricht_verarbeiten(&mut self, nachricht: GpgNetNachricht) {
        if nachricht.kopf == "GameState" {
            if let [GpgNetWert::Text(zustand)] = nachricht.teile.as_slice() {
                match LobbyStatus::aus_spielzustand(zustand) {
                    Some(neuer_status) => {
                        self.lobby_status = neuer_status;
                        tracing::info!(zustand = %neuer_status, "Lobby-Status gewechselt");

                        if neuer_status == LobbyStatus::Idle {
                            // Pro Idle-Nachricht, nicht pro Wechsel
                            let kommando = GpgNetNachricht::create_lobby(
                                LobbyModus::NormaleLobby,
                                self.optionen.lobby_port,
                                &self.optionen.login,
                                self.optionen.spieler_id,
                                ANFANGS_SLOTS,
                            );
                            if let Err(e) = self.bruecke.senden(kommando) {
                                tracing::error!(fehler = %e, "CreateLobby konnte nicht gesendet werden");
                            }
                        }
                    }
                    None => {
                        tracing::warn!(
                            wert = %zustand,
                            "Unbekannter GameState-Wert – Lobby-Status unveraendert"
                        );
                    }
                }
                self.aufgaben_ausfuehren();
            }
        }

        self.benachrichtiger.benachrichtigen(
            "onGpgNetMessageReceived",
            vec![
                Value::from(nachricht.kopf.clone()),
                Value::Array(nachricht.teile_als_json()),
            ],
        );
    }

    /// Verarbeitet Auf- und Abbau der Spielverbindung
    fn spielverbindung_verarbeiten(&mut self, verbunden: bool, sitzungen: usize) {
        if sitzungen > 1 {
            tracing::warn!(sitzungen, "Nur eine Spielsitzung wird unterstuetzt");
        }

        self.benachrichtiger.benachrichtigen(
            "onConnectionStateChanged",
            vec![Value::from(if verbunden {
                "Connected"
            } else {
                "Disconnected"
            })],
        );

        if verbunden {
            tracing::info!("Spielprozess verbunden");
        } else {
            tracing::info!(
                relais = self.verzeichnis.len(),
                "Spielprozess getrennt – alle Relais werden abgebaut"
            );
            self.verzeichnis.leeren();
            self.lobby_status = LobbyStatus::Unbekannt;
        }
    }

    // -----------------------------------------------------------------------
    // Relais-Ereignisse
    // -----------------------------------------------------------------------

    /// Meldet ein Relais-Ereignis als Benachrichtigung an den Launcher
    ///
    /// Ereignisse bereits entfernter Relais (z.B. nach Spieltrennung noch
    /// im Kanal) werden verworfen.
    fn peer_ereignis_verarbeiten(&mut self, spieler: SpielerId, ereignis: PeerEreignis) {
        if self.verzeichnis.holen(spieler).is_none() {
            tracing::debug!(%spieler, "Ereignis eines entfernten Relais verworfen");
            return;
        }

        let lokal = Value::from(self.optionen.spieler_id.inner());
        let peer = Value::from(spieler.inner());

        match ereignis {
            PeerEreignis::SignalErzeugt { typ, inhalt } => {
                self.benachrichtiger.benachrichtigen(
                    "onSdpMessage",
                    vec![lokal, peer, Value::from(typ), Value::from(inhalt)],
                );
            }
            PeerEreignis::ZustandGeaendert(zustand) => {
                self.benachrichtiger.benachrichtigen(
                    "onPeerStateChanged",
                    vec![lokal, peer, Value::from(zustand)],
                );
            }
            PeerEreignis::KandidatenpaarGewaehlt { lokal: l, entfernt } => {
                self.benachrichtiger.benachrichtigen(
                    "onCandidateSelected",
                    vec![lokal, peer, Value::from(l), Value::from(entfernt)],
                );
            }
            PeerEreignis::ErstmalsVerbunden => {
                self.benachrichtiger
                    .benachrichtigen("onIceConnected", vec![lokal, peer]);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Aufgabenausfuehrung
    // -----------------------------------------------------------------------

    /// Arbeitet die Warteschlange vom Kopf her ab
    ///
    /// Stoppt komplett bei der ersten Aufgabe, die noch auf ihren
    /// Lobby-Status wartet; spaetere Aufgaben ueberholen nie. Join/Connect
    /// ohne Relais werden mit Fehlerlog verworfen, die Schleife laeuft
    /// weiter.
    fn aufgaben_ausfuehren(&mut self) {
        if self.bruecke.sitzungen() == 0 {
            return;
        }

        while let Some(aufgabe) = self.aufgaben.kopf().cloned() {
            match aufgabe {
                SpielAufgabe::HostGame { karte } => {
                    if self.lobby_status != LobbyStatus::Lobby {
                        return;
                    }
                    self.kommando_senden(GpgNetNachricht::host_game(&karte));
                }

                SpielAufgabe::JoinGame { login, spieler } => {
                    if self.lobby_status != LobbyStatus::Lobby {
                        return;
                    }
                    match self.relais_adresse(spieler) {
                        Some(adresse) => {
                            self.kommando_senden(GpgNetNachricht::join_game(
                                &adresse, &login, spieler,
                            ));
                        }
                        None => {
                            tracing::error!(
                                %spieler,
                                "Kein Relais fuer beitretenden Spieler – Aufgabe verworfen"
                            );
                        }
                    }
                }

                SpielAufgabe::ConnectToPeer { login, spieler } => {
                    match self.relais_adresse(spieler) {
                        Some(adresse) => {
                            self.kommando_senden(GpgNetNachricht::connect_to_peer(
                                &adresse, &login, spieler,
                            ));
                        }
                        None => {
                            tracing::error!(
                                %spieler,
                                "Kein Relais fuer Peer-Verbindung – Aufgabe verworfen"
                            );
                        }
                    }
                }

                SpielAufgabe::DisconnectFromPeer { spieler } => {
                    self.kommando_senden(GpgNetNachricht::disconnect_from_peer(spieler));
                }
            }

            self.aufgaben.kopf_entfernen();
        }
    }

    /// Relais-Endpunkt eines Peers als `127.0.0.1:<port>`
    fn relais_adresse(&self, spieler: SpielerId) -> Option<String> {
        self.verzeichnis
            .holen(spieler)
            .map(|relais| format!("127.0.0.1:{}", relais.lokaler_udp_port()))
    }

    /// Sendet ein Kommando an den Spielprozess (Fehler nur geloggt)
    fn kommando_senden(&self, nachricht: GpgNetNachricht) {
        tracing::debug!(kommando = %nachricht, "Spielkommando");
        if let Err(e) = self.bruecke.senden(nachricht) {
            tracing::error!(fehler = %e, "Spielkommando konnte nicht gesendet werden");
        }
    }

    // -----------------------------------------------------------------------
    // RPC-Hilfen
    // -----------------------------------------------------------------------

    /// Reicht eine Launcher-Nachricht an den Spielprozess weiter
    fn an_spiel_senden(&self, kopf: String, teile: Vec<Value>) -> AdapterResult<()> {
        if self.bruecke.sitzungen() == 0 {
            tracing::error!("sendToGpgNet fehlgeschlagen – kein Spielprozess verbunden");
            return Err(AdapterError::KeineSitzung);
        }

        let mut werte = Vec::with_capacity(teile.len());
        for teil in &teile {
            match GpgNetWert::aus_json(teil) {
                Some(wert) => werte.push(wert),
                None => {
                    return Err(AdapterError::Intern(
                        "chunks must be strings or integers".into(),
                    ));
                }
            }
        }

        self.bruecke.senden(GpgNetNachricht::neu(kopf, werte))
    }

    /// Baut den vollstaendigen Statusbericht
    fn status_bericht(&self) -> StatusBericht {
        let mut relays: Vec<RelaisStatus> = self
            .verzeichnis
            .iter()
            .map(|(spieler, relais)| RelaisStatus {
                remote_player_id: spieler.inner(),
                remote_player_login: relais.login().to_owned(),
                local_game_udp_port: relais.lokaler_udp_port(),
                ice_agent: IceAgentStatus::from(relais.lage()),
            })
            .collect();
        relays.sort_by_key(|relais| relais.remote_player_id);

        StatusBericht {
            version: env!("CARGO_PKG_VERSION").into(),
            gestartet_um: self.gestartet_um.to_rfc3339(),
            options: (&self.optionen).into(),
            gpgnet: GpgNetStatus {
                local_port: self.bruecke.lausch_port(),
                connected: self.bruecke.sitzungen() > 0,
                game_state: self.lobby_status.als_text().into(),
            },
            relays,
        }
    }
}
