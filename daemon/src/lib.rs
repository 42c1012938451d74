//! eisbruecke-daemon – Bibliotheks-Root
//!
//! Baut alle Subsysteme zusammen: GPGNet-Server, RPC-Server,
//! Relais-Fabrik, DNS-Cache und den Orchestrierungskern.

pub mod cli;
pub mod verdrahtung;

use anyhow::Result;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use eisbruecke_adapter::{Adapter, AdapterOptionen, BrueckenEreignis};
use eisbruecke_gpgnet::{GpgNetEreignis, GpgNetServer};
use eisbruecke_relais::{IceParameter, IceServerAufloesung};
use eisbruecke_rpc::{RpcBroadcaster, RpcServer};

use crate::verdrahtung::{
    relais_ereignis_umwandeln, AdapterDienst, BrueckenAnbindung, EchteRelaisFabrik,
    LauncherAnbindung,
};

/// Groesse des GPGNet-Ereigniskanals
const GPGNET_KANAL_GROESSE: usize = 64;

/// Groesse des Relais-Ereigniskanals (viele Peers, viele Kandidaten)
const RELAIS_KANAL_GROESSE: usize = 256;

/// Haelt den laufenden Daemon zusammen
pub struct Daemon {
    optionen: AdapterOptionen,
}

impl Daemon {
    /// Erstellt einen Daemon aus der gegebenen Konfiguration
    pub fn neu(optionen: AdapterOptionen) -> Self {
        Self { optionen }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown
    ///
    /// Reihenfolge:
    /// 1. STUN/TURN-Aufloesung anstossen (fire-and-forget)
    /// 2. GPGNet-Server binden (Spielprozess)
    /// 3. Orchestrierungskern starten
    /// 4. RPC-Server binden (Launcher)
    /// 5. Auf Ctrl-C oder `quit` warten
    pub async fn starten(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // STUN/TURN-Hostnamen einmalig aufloesen; niemand wartet darauf
        let aufloesung = IceServerAufloesung::neu();
        aufloesung.starten(
            self.optionen.stun_host.clone(),
            self.optionen.turn_host.clone(),
        );

        // GPGNet-Server (Spielprozess verbindet sich lokal)
        let (gpgnet_tx, mut gpgnet_rx) = mpsc::channel(GPGNET_KANAL_GROESSE);
        let gpgnet_griff = GpgNetServer::starten(
            lokale_adresse(self.optionen.gpgnet_port),
            gpgnet_tx,
            shutdown_rx.clone(),
        )
        .await?;

        // Relais-Fabrik mit gemeinsamem Ereigniskanal
        let (relais_tx, mut relais_rx) = mpsc::channel(RELAIS_KANAL_GROESSE);
        let fabrik = Arc::new(EchteRelaisFabrik::neu(
            IceParameter {
                aufloesung,
                turn_user: self.optionen.turn_user.clone(),
                turn_pass: self.optionen.turn_pass.clone(),
                port_min: self.optionen.ice_port_min,
                port_max: self.optionen.ice_port_max,
            },
            self.optionen.lobby_port,
            relais_tx,
        ));

        // Orchestrierungskern
        let broadcaster = RpcBroadcaster::neu();
        let griff = Adapter::starten(
            self.optionen.clone(),
            Arc::new(BrueckenAnbindung(gpgnet_griff)),
            Arc::new(LauncherAnbindung(broadcaster.clone())),
            fabrik,
            shutdown_tx,
        );

        // Ereignisse der Raender in den Kern einspeisen
        let kern = griff.clone();
        tokio::spawn(async move {
            while let Some(ereignis) = gpgnet_rx.recv().await {
                let umgewandelt = match ereignis {
                    GpgNetEreignis::NachrichtEmpfangen(nachricht) => {
                        BrueckenEreignis::Nachricht(nachricht)
                    }
                    GpgNetEreignis::VerbindungGeaendert {
                        verbunden,
                        sitzungen,
                    } => BrueckenEreignis::VerbindungGeaendert {
                        verbunden,
                        sitzungen,
                    },
                };
                kern.bruecken_ereignis(umgewandelt).await;
            }
        });

        let kern = griff.clone();
        tokio::spawn(async move {
            while let Some(ereignis) = relais_rx.recv().await {
                kern.peer_ereignis(ereignis.spieler, relais_ereignis_umwandeln(ereignis.art))
                    .await;
            }
        });

        // RPC-Server (Launcher verbindet sich lokal)
        let _rpc_griff = RpcServer::starten(
            lokale_adresse(self.optionen.rpc_port),
            Arc::new(AdapterDienst(griff.clone())),
            broadcaster,
            shutdown_rx.clone(),
        )
        .await?;

        tracing::info!(
            rpc_port = self.optionen.rpc_port,
            gpgnet_port = self.optionen.gpgnet_port,
            "Daemon laeuft. Warte auf quit oder Ctrl-C"
        );

        // Auf quit (Shutdown-Watch) oder Ctrl-C warten
        let mut shutdown_rx = shutdown_rx;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C empfangen, Daemon wird beendet");
                let _ = griff.beenden().await;
            }
            Ok(()) = shutdown_rx.changed() => {
                tracing::info!("quit empfangen, Daemon wird beendet");
            }
        }

        Ok(())
    }
}

/// Bind-Adresse auf dem Loopback-Interface
fn lokale_adresse(port: u16) -> SocketAddr {
    SocketAddr::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))
}
