//! Kommandozeilen-Schnittstelle
//!
//! Der Launcher startet den Adapter pro Partie neu und uebergibt die
//! gesamte Konfiguration als Flags. Es gibt bewusst keine
//! Konfigurationsdatei.

use clap::Parser;
use eisbruecke_adapter::AdapterOptionen;
use eisbruecke_core::SpielerId;

/// FAF-kompatibler ICE-Adapter-Daemon
#[derive(Debug, Parser)]
#[command(name = "eisbruecke", version, about)]
pub struct Cli {
    /// ID des lokalen Spielers
    #[arg(long)]
    pub id: i64,

    /// Login des lokalen Spielers
    #[arg(long)]
    pub login: String,

    /// TCP-Port der JSON-RPC-Steuerschnittstelle
    #[arg(long = "rpc-port", default_value_t = 7236)]
    pub rpc_port: u16,

    /// TCP-Port der GPGNet-Bruecke
    #[arg(long = "gpgnet-port", default_value_t = 7237)]
    pub gpgnet_port: u16,

    /// UDP-Port, auf dem das Spiel Datagramme empfaengt
    #[arg(long = "lobby-port", default_value_t = 7238)]
    pub lobby_port: u16,

    /// Untere Grenze des ICE-Kandidaten-Portbereichs (0 = ephemer)
    #[arg(long = "ice-port-min", default_value_t = 0)]
    pub ice_port_min: u16,

    /// Obere Grenze des ICE-Kandidaten-Portbereichs
    #[arg(long = "ice-port-max", default_value_t = 0)]
    pub ice_port_max: u16,

    /// STUN-Hostname
    #[arg(long = "stun-host", default_value = "dev.faforever.com")]
    pub stun_host: String,

    /// TURN-Hostname
    #[arg(long = "turn-host", default_value = "dev.faforever.com")]
    pub turn_host: String,

    /// TURN-Benutzername
    #[arg(long = "turn-user", default_value = "")]
    pub turn_user: String,

    /// TURN-Passwort
    #[arg(long = "turn-pass", default_value = "")]
    pub turn_pass: String,

    /// UPnP-Portweiterleitung anfordern
    #[arg(long)]
    pub upnp: bool,

    /// Log-Level (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Baut die unveraenderliche Adapter-Konfiguration
    pub fn als_optionen(&self) -> AdapterOptionen {
        AdapterOptionen {
            spieler_id: SpielerId(self.id),
            login: self.login.clone(),
            rpc_port: self.rpc_port,
            gpgnet_port: self.gpgnet_port,
            lobby_port: self.lobby_port,
            ice_port_min: self.ice_port_min,
            ice_port_max: self.ice_port_max,
            stun_host: self.stun_host.clone(),
            turn_host: self.turn_host.clone(),
            turn_user: self.turn_user.clone(),
            turn_pass: self.turn_pass.clone(),
            upnp: self.upnp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launcher_aufruf_wird_geparst() {
        let cli = Cli::try_parse_from([
            "eisbruecke",
            "--id",
            "4711",
            "--login",
            "Rhiza",
            "--rpc-port",
            "50001",
            "--gpgnet-port",
            "50002",
            "--lobby-port",
            "50003",
            "--log-level",
            "error",
        ])
        .expect("Parsen fehlgeschlagen");

        let optionen = cli.als_optionen();
        assert_eq!(optionen.spieler_id, SpielerId(4711));
        assert_eq!(optionen.login, "Rhiza");
        assert_eq!(optionen.rpc_port, 50001);
        assert_eq!(optionen.gpgnet_port, 50002);
        assert_eq!(optionen.lobby_port, 50003);
        assert!(!optionen.upnp);
        assert_eq!(cli.log_level, "error");
    }

    #[test]
    fn id_und_login_sind_pflicht() {
        assert!(Cli::try_parse_from(["eisbruecke"]).is_err());
        assert!(Cli::try_parse_from(["eisbruecke", "--id", "1"]).is_err());
    }

    #[test]
    fn turn_zugangsdaten_und_portbereich() {
        let cli = Cli::try_parse_from([
            "eisbruecke",
            "--id",
            "1",
            "--login",
            "QAI",
            "--turn-user",
            "1234:QAI",
            "--turn-pass",
            "geheim",
            "--ice-port-min",
            "50000",
            "--ice-port-max",
            "60000",
            "--upnp",
        ])
        .unwrap();

        let optionen = cli.als_optionen();
        assert_eq!(optionen.turn_user, "1234:QAI");
        assert_eq!(optionen.turn_pass, "geheim");
        assert_eq!(optionen.ice_port_min, 50000);
        assert_eq!(optionen.ice_port_max, 60000);
        assert!(optionen.upnp);
    }
}
