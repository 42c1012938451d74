//! RPC-Verteiler – Routet Anfragen an den Dienst
//!
//! Prueft Methodenname, Parameteranzahl und Parametertypen und ruft die
//! passende Dienst-Methode auf. Die "Need N parameters"-Meldungen folgen
//! dem Wortlaut, den der Launcher kennt.

use eisbruecke_core::SpielerId;
use eisbruecke_protokoll::jsonrpc::{FEHLER_DIENST, FEHLER_METHODE_UNBEKANNT, FEHLER_PARAMETER};
use eisbruecke_protokoll::RpcAnfrage;
use serde_json::Value;

use crate::dienst::{DienstErgebnis, RpcDienst};

/// Fehlerhaelfte eines Verteiler-Ergebnisses: Code + Meldung
pub type VerteilerFehler = (i64, String);

/// Verarbeitet eine geparste Anfrage und gibt das Ergebnis zurueck
pub async fn verteilen<D>(dienst: &D, anfrage: &RpcAnfrage) -> Result<Value, VerteilerFehler>
where
    D: RpcDienst + ?Sized,
{
    let params = anfrage.parameter();

    match anfrage.method.as_str() {
        "quit" => {
            dienst.quit().await;
            Ok(Value::from("ok"))
        }

        "hostGame" => {
            if params.len() < 1 {
                return Err(parameter_fehler("Need 1 parameter: mapName (string)"));
            }
            let karte = text_wert(&params[0], "mapName")?;
            als_ok(dienst.host_game(karte).await)
        }

        "joinGame" => {
            if params.len() < 2 {
                return Err(parameter_fehler(
                    "Need 2 parameters: remotePlayerLogin (string), remotePlayerId (int)",
                ));
            }
            let login = text_wert(&params[0], "remotePlayerLogin")?;
            let spieler = spieler_wert(&params[1])?;
            als_ok(dienst.join_game(login, spieler).await)
        }

        "connectToPeer" => {
            if params.len() < 2 {
                return Err(parameter_fehler(
                    "Need 2 parameters: remotePlayerLogin (string), remotePlayerId (int)",
                ));
            }
            let login = text_wert(&params[0], "remotePlayerLogin")?;
            let spieler = spieler_wert(&params[1])?;
            // Drittes Argument optional, Standard: Offerer
            let offerer = params.get(2).and_then(Value::as_bool).unwrap_or(true);
            als_ok(dienst.connect_to_peer(login, spieler, offerer).await)
        }

        "reconnectToPeer" => {
            if params.len() < 1 {
                return Err(parameter_fehler("Need 1 parameter: remotePlayerId (int)"));
            }
            let spieler = spieler_wert(&params[0])?;
            als_ok(dienst.reconnect_to_peer(spieler).await)
        }

        "disconnectFromPeer" => {
            if params.len() < 1 {
                return Err(parameter_fehler("Need 1 parameter: remotePlayerId (int)"));
            }
            let spieler = spieler_wert(&params[0])?;
            als_ok(dienst.disconnect_from_peer(spieler).await)
        }

        "addSdpMessage" => {
            if params.len() < 3 {
                return Err(parameter_fehler(
                    "Need 3 parameters: remotePlayerId (int), type (string), msg (string)",
                ));
            }
            let spieler = spieler_wert(&params[0])?;
            let typ = text_wert(&params[1], "type")?;
            let inhalt = text_wert(&params[2], "msg")?;
            als_ok(dienst.add_sdp_message(spieler, typ, inhalt).await)
        }

        "sendToGpgNet" => {
            if params.len() < 2 || !params[1].is_array() {
                return Err(parameter_fehler(
                    "Need 2 parameters: header (string), chunks (array)",
                ));
            }
            let kopf = text_wert(&params[0], "header")?;
            let teile = params[1]
                .as_array()
                .map(|liste| liste.to_vec())
                .unwrap_or_default();
            als_ok(dienst.send_to_gpgnet(kopf, teile).await)
        }

        "status" => Ok(dienst.status().await),

        unbekannt => Err((
            FEHLER_METHODE_UNBEKANNT,
            format!("unknown method: {unbekannt}"),
        )),
    }
}

/// Baut einen Parameterfehler mit Standardcode
fn parameter_fehler(meldung: &str) -> VerteilerFehler {
    (FEHLER_PARAMETER, meldung.to_owned())
}

/// Extrahiert einen String-Parameter
fn text_wert(wert: &Value, name: &str) -> Result<String, VerteilerFehler> {
    wert.as_str()
        .map(str::to_owned)
        .ok_or_else(|| (FEHLER_PARAMETER, format!("{name} must be a string")))
}

/// Extrahiert eine Spieler-ID
fn spieler_wert(wert: &Value) -> Result<SpielerId, VerteilerFehler> {
    wert.as_i64()
        .map(SpielerId)
        .ok_or_else(|| (FEHLER_PARAMETER, "remotePlayerId must be an int".to_owned()))
}

/// Wandelt ein Dienst-Ergebnis in die RPC-Form um
fn als_ok(ergebnis: DienstErgebnis) -> Result<Value, VerteilerFehler> {
    match ergebnis {
        Ok(()) => Ok(Value::from("ok")),
        Err(fehler) => Err((FEHLER_DIENST, fehler.to_string())),
    }
}
