//! ICE-Sitzung – Wrapper um den webrtc-Stack
//!
//! Eine `IceSitzung` kapselt genau eine NAT-Traversal-Verhandlung mit einem
//! Peer: RTCPeerConnection plus ein unzuverlaessiger, ungeordneter
//! Datenkanal fuer die Spieldatagramme. Nach aussen sichtbar sind nur
//! opake Signalisierungsnachrichten (Offer/Answer/Kandidat) und
//! Zustandswechsel; die Verhandlung selbst gehoert dem webrtc-Stack.

use bytes::Bytes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use webrtc::api::setting_engine::SettingEngine;
use webrtc::api::APIBuilder;
use webrtc::ice::udp_network::{EphemeralUDP, UDPNetwork};
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;

use eisbruecke_core::SpielerId;

use crate::dns::{IceServerAufloesung, STUN_TURN_PORT};
use crate::ereignis::{RelaisEreignis, RelaisEreignisArt};
use crate::error::{RelaisError, RelaisResult};

/// Label des Datenkanals fuer Spieldatagramme
const DATENKANAL_LABEL: &str = "faf";

// ---------------------------------------------------------------------------
// IceZustand
// ---------------------------------------------------------------------------

/// Konnektivitaetszustand einer ICE-Sitzung
///
/// Die String-Darstellung ist Teil der RPC-Schnittstelle
/// (`onPeerStateChanged`) und bleibt deshalb stabil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IceZustand {
    Neu,
    Prueft,
    Verbunden,
    Abgeschlossen,
    Fehlgeschlagen,
    Getrennt,
    Geschlossen,
}

impl IceZustand {
    /// Bildet den webrtc-Zustand auf den Schnittstellen-Zustand ab
    fn aus_webrtc(zustand: RTCIceConnectionState) -> Self {
        match zustand {
            RTCIceConnectionState::Checking => Self::Prueft,
            RTCIceConnectionState::Connected => Self::Verbunden,
            RTCIceConnectionState::Completed => Self::Abgeschlossen,
            RTCIceConnectionState::Failed => Self::Fehlgeschlagen,
            RTCIceConnectionState::Disconnected => Self::Getrennt,
            RTCIceConnectionState::Closed => Self::Geschlossen,
            _ => Self::Neu,
        }
    }

    /// String-Darstellung fuer RPC und Statusbericht
    pub fn als_text(&self) -> &'static str {
        match self {
            Self::Neu => "new",
            Self::Prueft => "checking",
            Self::Verbunden => "connected",
            Self::Abgeschlossen => "completed",
            Self::Fehlgeschlagen => "failed",
            Self::Getrennt => "disconnected",
            Self::Geschlossen => "closed",
        }
    }
}

impl Default for IceZustand {
    fn default() -> Self {
        Self::Neu
    }
}

impl std::fmt::Display for IceZustand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_text())
    }
}

// ---------------------------------------------------------------------------
// IceParameter / IceLage
// ---------------------------------------------------------------------------

/// Unveraenderliche Parameter fuer die Sitzungs-Erzeugung
///
/// Die STUN/TURN-Adressen werden bei jeder Sitzungs-Erzeugung frisch aus
/// dem Aufloesungs-Cache gelesen; ein Relais, das vor Abschluss der
/// Aufloesung entsteht, verhandelt ohne diese Server.
#[derive(Clone)]
pub struct IceParameter {
    /// Gemeinsamer DNS-Cache
    pub aufloesung: Arc<IceServerAufloesung>,
    /// TURN-Benutzername
    pub turn_user: String,
    /// TURN-Passwort
    pub turn_pass: String,
    /// Untere Grenze des ICE-Kandidaten-Portbereichs (0 = ephemer)
    pub port_min: u16,
    /// Obere Grenze des ICE-Kandidaten-Portbereichs
    pub port_max: u16,
}

impl IceParameter {
    /// Baut die ICE-Server-Liste aus den momentan aufgeloesten Adressen
    pub fn ice_server_liste(&self) -> Vec<RTCIceServer> {
        let mut liste = Vec::new();
        if let Some(stun) = self.aufloesung.stun_ip() {
            liste.push(RTCIceServer {
                urls: vec![stun_url(stun)],
                ..Default::default()
            });
        }
        if let Some(turn) = self.aufloesung.turn_ip() {
            liste.push(RTCIceServer {
                urls: vec![turn_url(turn)],
                username: self.turn_user.clone(),
                credential: self.turn_pass.clone(),
                ..Default::default()
            });
        }
        liste
    }
}

/// Baut eine STUN-URL aus einer IP-Adresse
fn stun_url(ip: IpAddr) -> String {
    format!("stun:{ip}:{STUN_TURN_PORT}")
}

/// Baut eine TURN-URL aus einer IP-Adresse
fn turn_url(ip: IpAddr) -> String {
    format!("turn:{ip}:{STUN_TURN_PORT}?transport=udp")
}

/// Momentaufnahme des Sitzungszustands fuer den Statusbericht
///
/// Wird von den Sitzungs-Callbacks gepflegt und vom Orchestrator fuer
/// `status()` gelesen.
#[derive(Debug, Clone, Default)]
pub struct IceLage {
    /// Aktueller Konnektivitaetszustand
    pub zustand: IceZustand,
    /// Hat der Peer uns erreicht?
    pub mit_mir_verbunden: bool,
    /// Haben wir den Peer erreicht (Datenkanal offen)?
    pub zum_peer_verbunden: bool,
    /// Beschreibung des gewaehlten lokalen Kandidaten
    pub lokaler_kandidat: String,
    /// Beschreibung des gewaehlten entfernten Kandidaten
    pub entfernter_kandidat: String,
    /// Zuletzt eingespieltes entferntes SDP
    pub entferntes_sdp: String,
    /// Dauer vom Sitzungsstart bis zur ersten Verbindung
    pub verbunden_nach: Option<Duration>,
}

// ---------------------------------------------------------------------------
// IceSitzung
// ---------------------------------------------------------------------------

/// Eine laufende NAT-Traversal-Sitzung mit einem Peer
pub struct IceSitzung {
    spieler: SpielerId,
    verbindung: Arc<RTCPeerConnection>,
    lage: Arc<Mutex<IceLage>>,
}

impl IceSitzung {
    /// Erzeugt die Sitzung und startet im Offerer-Fall sofort die
    /// Kandidatensuche (Datenkanal anlegen + Offer versenden)
    ///
    /// - `ereignis_tx`: Ereignisse an den Orchestrator
    /// - `eingehend_tx`: vom Peer empfangene Datagramme (an den SpielSocket)
    /// - `dc_zelle`: geteilte Zelle mit dem aktuellen Datenkanal; der
    ///   UDP-Task sendet darueber, ohne die Sitzung zu kennen
    pub async fn neu(
        spieler: SpielerId,
        offerer: bool,
        parameter: &IceParameter,
        ereignis_tx: mpsc::Sender<RelaisEreignis>,
        eingehend_tx: mpsc::Sender<Vec<u8>>,
        dc_zelle: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
        lage: Arc<Mutex<IceLage>>,
    ) -> RelaisResult<Self> {
        // Frische Lage fuer diese Sitzung (Neustart setzt alles zurueck)
        *lage.lock() = IceLage::default();
        *dc_zelle.lock() = None;

        let mut engine = SettingEngine::default();
        if parameter.port_min != 0 && parameter.port_min <= parameter.port_max {
            engine.set_udp_network(UDPNetwork::Ephemeral(
                EphemeralUDP::new(parameter.port_min, parameter.port_max)
                    .map_err(webrtc::Error::from)?,
            ));
        }

        let api = APIBuilder::new().with_setting_engine(engine).build();
        let konfiguration = RTCConfiguration {
            ice_servers: parameter.ice_server_liste(),
            ..Default::default()
        };
        let verbindung = Arc::new(api.new_peer_connection(konfiguration).await?);
        let start = Instant::now();

        // Zustandswechsel melden; erste Verbindung gesondert (genau einmal)
        {
            let ereignis_tx = ereignis_tx.clone();
            let lage = Arc::clone(&lage);
            let verbindung_schwach = Arc::downgrade(&verbindung);
            verbindung.on_ice_connection_state_change(Box::new(move |neu: RTCIceConnectionState| {
                let ereignis_tx = ereignis_tx.clone();
                let lage = Arc::clone(&lage);
                let verbindung_schwach = verbindung_schwach.clone();
                Box::pin(async move {
                    let zustand = IceZustand::aus_webrtc(neu);
                    let erstmals = {
                        let mut lage = lage.lock();
                        lage.zustand = zustand;
                        let erstmals = matches!(
                            zustand,
                            IceZustand::Verbunden | IceZustand::Abgeschlossen
                        ) && lage.verbunden_nach.is_none();
                        if erstmals {
                            lage.mit_mir_verbunden = true;
                            lage.verbunden_nach = Some(start.elapsed());
                        }
                        erstmals
                    };

                    let _ = ereignis_tx
                        .send(RelaisEreignis {
                            spieler,
                            art: RelaisEreignisArt::ZustandGeaendert(zustand),
                        })
                        .await;

                    if erstmals {
                        // Das gewaehlte Kandidatenpaar gehoert zur ersten
                        // Verbindungsmeldung dazu
                        if let Some(verbindung) = verbindung_schwach.upgrade() {
                            if let Some(paar) = gewaehltes_paar(&verbindung).await {
                                {
                                    let mut lage = lage.lock();
                                    lage.lokaler_kandidat = paar.0.clone();
                                    lage.entfernter_kandidat = paar.1.clone();
                                }
                                let _ = ereignis_tx
                                    .send(RelaisEreignis {
                                        spieler,
                                        art: RelaisEreignisArt::KandidatenpaarGewaehlt {
                                            lokal: paar.0,
                                            entfernt: paar.1,
                                        },
                                    })
                                    .await;
                            }
                        }
                        let _ = ereignis_tx
                            .send(RelaisEreignis {
                                spieler,
                                art: RelaisEreignisArt::ErstmalsVerbunden,
                            })
                            .await;
                    }
                })
            }));
        }

        // Lokale Kandidaten als Signalisierungsnachrichten hinausreichen
        {
            let ereignis_tx = ereignis_tx.clone();
            verbindung.on_ice_candidate(Box::new(move |kandidat: Option<RTCIceCandidate>| {
                let ereignis_tx = ereignis_tx.clone();
                Box::pin(async move {
                    let Some(kandidat) = kandidat else {
                        return;
                    };
                    match kandidat.to_json() {
                        Ok(init) => match serde_json::to_string(&init) {
                            Ok(inhalt) => {
                                let _ = ereignis_tx
                                    .send(RelaisEreignis {
                                        spieler,
                                        art: RelaisEreignisArt::SignalErzeugt {
                                            typ: "candidate".into(),
                                            inhalt,
                                        },
                                    })
                                    .await;
                            }
                            Err(e) => {
                                tracing::warn!(%spieler, fehler = %e, "Kandidat nicht serialisierbar");
                            }
                        },
                        Err(e) => {
                            tracing::warn!(%spieler, fehler = %e, "Kandidat nicht lesbar");
                        }
                    }
                })
            }));
        }

        if offerer {
            // Offerer legt den Datenkanal an; set_local_description stoesst
            // die Kandidatensuche an
            let init = RTCDataChannelInit {
                ordered: Some(false),
                max_retransmits: Some(0),
                ..Default::default()
            };
            let kanal = verbindung
                .create_data_channel(DATENKANAL_LABEL, Some(init))
                .await?;
            datenkanal_verdrahten(
                kanal,
                spieler,
                Arc::clone(&dc_zelle),
                Arc::clone(&lage),
                eingehend_tx,
            );

            let offer = verbindung.create_offer(None).await?;
            let sdp = offer.sdp.clone();
            verbindung.set_local_description(offer).await?;
            let _ = ereignis_tx
                .send(RelaisEreignis {
                    spieler,
                    art: RelaisEreignisArt::SignalErzeugt {
                        typ: "offer".into(),
                        inhalt: sdp,
                    },
                })
                .await;
        } else {
            // Answerer wartet auf den Kanal des Offerers
            let dc_zelle = Arc::clone(&dc_zelle);
            let lage = Arc::clone(&lage);
            verbindung.on_data_channel(Box::new(move |kanal: Arc<RTCDataChannel>| {
                let dc_zelle = Arc::clone(&dc_zelle);
                let lage = Arc::clone(&lage);
                let eingehend_tx = eingehend_tx.clone();
                Box::pin(async move {
                    datenkanal_verdrahten(kanal, spieler, dc_zelle, lage, eingehend_tx);
                })
            }));
        }

        Ok(Self {
            spieler,
            verbindung,
            lage,
        })
    }

    /// Momentaufnahme des Sitzungszustands
    pub fn lage(&self) -> IceLage {
        self.lage.lock().clone()
    }

    /// Spielt eine Signalisierungsnachricht des Peers ein
    ///
    /// Bei einem eingehenden Offer wird die Answer erzeugt und als
    /// Ereignis hinausgereicht.
    pub async fn signal_einspielen(
        &self,
        typ: &str,
        inhalt: &str,
        ereignis_tx: &mpsc::Sender<RelaisEreignis>,
    ) -> RelaisResult<()> {
        match typ {
            "offer" => {
                self.lage.lock().entferntes_sdp = inhalt.to_owned();
                let offer = RTCSessionDescription::offer(inhalt.to_owned())?;
                self.verbindung.set_remote_description(offer).await?;

                let answer = self.verbindung.create_answer(None).await?;
                let sdp = answer.sdp.clone();
                self.verbindung.set_local_description(answer).await?;
                let _ = ereignis_tx
                    .send(RelaisEreignis {
                        spieler: self.spieler,
                        art: RelaisEreignisArt::SignalErzeugt {
                            typ: "answer".into(),
                            inhalt: sdp,
                        },
                    })
                    .await;
                Ok(())
            }
            "answer" => {
                self.lage.lock().entferntes_sdp = inhalt.to_owned();
                let answer = RTCSessionDescription::answer(inhalt.to_owned())?;
                self.verbindung.set_remote_description(answer).await?;
                Ok(())
            }
            "candidate" => {
                let init: RTCIceCandidateInit = serde_json::from_str(inhalt)?;
                self.verbindung.add_ice_candidate(init).await?;
                Ok(())
            }
            unbekannt => Err(RelaisError::UnbekannterSignalTyp(unbekannt.to_owned())),
        }
    }

    /// Schliesst die Verbindung im Hintergrund
    ///
    /// Wird beim Neustart und beim Entfernen des Relais benutzt; der
    /// Aufrufer muss nicht auf den Abbau warten.
    pub fn schliessen_im_hintergrund(&self) {
        let verbindung = Arc::clone(&self.verbindung);
        let spieler = self.spieler;
        tokio::spawn(async move {
            if let Err(e) = verbindung.close().await {
                tracing::debug!(%spieler, fehler = %e, "Schliessen der ICE-Sitzung fehlgeschlagen");
            }
        });
    }
}

/// Verdrahtet einen Datenkanal mit Zelle, Lage und Eingangs-Queue
fn datenkanal_verdrahten(
    kanal: Arc<RTCDataChannel>,
    spieler: SpielerId,
    dc_zelle: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    lage: Arc<Mutex<IceLage>>,
    eingehend_tx: mpsc::Sender<Vec<u8>>,
) {
    {
        let lage = Arc::clone(&lage);
        kanal.on_open(Box::new(move || {
            lage.lock().zum_peer_verbunden = true;
            Box::pin(async move {})
        }));
    }

    kanal.on_message(Box::new(move |nachricht: DataChannelMessage| {
        let eingehend_tx = eingehend_tx.clone();
        Box::pin(async move {
            if eingehend_tx.send(nachricht.data.to_vec()).await.is_err() {
                tracing::debug!(%spieler, "Eingangs-Queue geschlossen – Datagramm verworfen");
            }
        })
    }));

    *dc_zelle.lock() = Some(kanal);
}

/// Liest das gewaehlte Kandidatenpaar als Beschreibungs-Strings
async fn gewaehltes_paar(verbindung: &Arc<RTCPeerConnection>) -> Option<(String, String)> {
    let sctp = verbindung.sctp();
    let transport = sctp.transport();
    let ice = transport.ice_transport();
    let paar = ice.get_selected_candidate_pair().await?;
    Some((
        kandidat_beschreibung(&paar.local),
        kandidat_beschreibung(&paar.remote),
    ))
}

/// Menschlesbare Kurzbeschreibung eines Kandidaten
fn kandidat_beschreibung(kandidat: &RTCIceCandidate) -> String {
    format!(
        "{} {}:{} ({})",
        kandidat.typ, kandidat.address, kandidat.port, kandidat.protocol
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zustand_abbildung_und_text() {
        assert_eq!(
            IceZustand::aus_webrtc(RTCIceConnectionState::Checking),
            IceZustand::Prueft
        );
        assert_eq!(
            IceZustand::aus_webrtc(RTCIceConnectionState::Connected),
            IceZustand::Verbunden
        );
        assert_eq!(
            IceZustand::aus_webrtc(RTCIceConnectionState::Failed),
            IceZustand::Fehlgeschlagen
        );
        assert_eq!(IceZustand::Verbunden.als_text(), "connected");
        assert_eq!(IceZustand::Neu.to_string(), "new");
        assert_eq!(IceZustand::default(), IceZustand::Neu);
    }

    #[test]
    fn ice_server_liste_ohne_aufloesung_ist_leer() {
        let parameter = IceParameter {
            aufloesung: IceServerAufloesung::neu(),
            turn_user: "user".into(),
            turn_pass: "pass".into(),
            port_min: 0,
            port_max: 0,
        };
        assert!(parameter.ice_server_liste().is_empty());
    }

    #[test]
    fn url_formate() {
        assert_eq!(stun_url("10.0.0.1".parse().unwrap()), "stun:10.0.0.1:3478");
        assert_eq!(
            turn_url("10.0.0.2".parse().unwrap()),
            "turn:10.0.0.2:3478?transport=udp"
        );
    }
}
