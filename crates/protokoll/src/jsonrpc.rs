//! JSON-RPC-2.0-Nachrichtenmodell
//!
//! Die Steuerschnittstelle zum Launcher spricht JSON-RPC 2.0, eine
//! Nachricht pro Zeile. Dieses Modul definiert die Anfrage-, Antwort- und
//! Benachrichtigungs-Strukturen; das Framing (Zeilen-Codec) uebernimmt der
//! RPC-Server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Protokollversion, die in jeder ausgehenden Nachricht steht
pub const JSONRPC_VERSION: &str = "2.0";

// Standard-Fehlercodes nach JSON-RPC 2.0
/// Zeile war kein gueltiges JSON
pub const FEHLER_PARSE: i64 = -32700;
/// Methode existiert nicht
pub const FEHLER_METHODE_UNBEKANNT: i64 = -32601;
/// Parameter fehlen oder haben den falschen Typ
pub const FEHLER_PARAMETER: i64 = -32602;
/// Anwendungsfehler des Adapters (z.B. "no relay for remote peer")
pub const FEHLER_DIENST: i64 = -32000;

/// Fehler beim Parsen einer eingehenden RPC-Zeile
#[derive(Debug, Error)]
pub enum RpcParseFehler {
    /// Die Zeile ist kein gueltiges JSON
    #[error("Ungueltiges JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `params` ist vorhanden, aber kein Array
    #[error("params muss ein Array sein")]
    ParamsKeinArray,
}

// ---------------------------------------------------------------------------
// Anfrage
// ---------------------------------------------------------------------------

/// Eine eingehende JSON-RPC-Anfrage
///
/// `id == None` kennzeichnet eine Benachrichtigung, auf die keine Antwort
/// gesendet wird.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcAnfrage {
    /// Methodenname, z.B. "hostGame"
    pub method: String,
    /// Positionsparameter (leer wenn nicht angegeben)
    #[serde(default)]
    pub params: Value,
    /// Anfrage-ID; fehlt bei Benachrichtigungen
    #[serde(default)]
    pub id: Option<Value>,
}

impl RpcAnfrage {
    /// Parst eine Zeile und validiert die Parameterform
    pub fn parsen(zeile: &str) -> Result<Self, RpcParseFehler> {
        let anfrage: Self = serde_json::from_str(zeile)?;
        match &anfrage.params {
            Value::Array(_) | Value::Null => Ok(anfrage),
            _ => Err(RpcParseFehler::ParamsKeinArray),
        }
    }

    /// Gibt die Parameter als Slice zurueck (leer wenn nicht angegeben)
    pub fn parameter(&self) -> &[Value] {
        match &self.params {
            Value::Array(liste) => liste.as_slice(),
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Antwort
// ---------------------------------------------------------------------------

/// Fehlerobjekt einer JSON-RPC-Antwort
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcFehlerObjekt {
    /// Numerischer Fehlercode
    pub code: i64,
    /// Menschenlesbare Fehlermeldung
    pub message: String,
}

/// Eine ausgehende JSON-RPC-Antwort
#[derive(Debug, Clone, Serialize)]
pub struct RpcAntwort {
    /// Immer "2.0"
    pub jsonrpc: &'static str,
    /// Ergebnis bei Erfolg
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Fehlerobjekt bei Misserfolg
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcFehlerObjekt>,
    /// ID der zugehoerigen Anfrage
    pub id: Value,
}

impl RpcAntwort {
    /// Erfolgsantwort mit Ergebnis
    pub fn erfolg(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Fehlerantwort mit Code und Meldung
    pub fn fehler(id: Value, code: i64, meldung: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(RpcFehlerObjekt {
                code,
                message: meldung.into(),
            }),
            id,
        }
    }

    /// Serialisiert die Antwort als eine JSON-Zeile
    pub fn als_zeile(&self) -> String {
        // Serialisierung kann bei reinen JSON-Werten nicht fehlschlagen
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Benachrichtigung
// ---------------------------------------------------------------------------

/// Baut eine ausgehende Benachrichtigung (Anfrage ohne ID) als JSON-Zeile
pub fn benachrichtigung(methode: &str, params: Vec<Value>) -> String {
    let nachricht = serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": methode,
        "params": params,
    });
    nachricht.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anfrage_mit_parametern_parsen() {
        let anfrage =
            RpcAnfrage::parsen(r#"{"jsonrpc":"2.0","method":"joinGame","params":["QAI",42],"id":7}"#)
                .unwrap();
        assert_eq!(anfrage.method, "joinGame");
        assert_eq!(anfrage.parameter().len(), 2);
        assert_eq!(anfrage.id, Some(serde_json::json!(7)));
    }

    #[test]
    fn anfrage_ohne_parameter_parsen() {
        let anfrage = RpcAnfrage::parsen(r#"{"method":"status","id":1}"#).unwrap();
        assert_eq!(anfrage.method, "status");
        assert!(anfrage.parameter().is_empty());
    }

    #[test]
    fn benachrichtigung_hat_keine_id() {
        let anfrage = RpcAnfrage::parsen(r#"{"method":"quit","params":[]}"#).unwrap();
        assert!(anfrage.id.is_none());
    }

    #[test]
    fn params_als_objekt_wird_abgelehnt() {
        let ergebnis = RpcAnfrage::parsen(r#"{"method":"x","params":{"a":1},"id":1}"#);
        assert!(matches!(ergebnis, Err(RpcParseFehler::ParamsKeinArray)));
    }

    #[test]
    fn ungueltiges_json_wird_abgelehnt() {
        assert!(RpcAnfrage::parsen("kein json").is_err());
    }

    #[test]
    fn erfolgsantwort_serialisierung() {
        let antwort = RpcAntwort::erfolg(serde_json::json!(3), serde_json::json!("ok"));
        let zeile = antwort.als_zeile();
        assert_eq!(zeile, r#"{"jsonrpc":"2.0","result":"ok","id":3}"#);
    }

    #[test]
    fn fehlerantwort_serialisierung() {
        let antwort = RpcAntwort::fehler(
            serde_json::json!(4),
            FEHLER_PARAMETER,
            "Need 1 parameter: mapName (string)",
        );
        let wert: Value = serde_json::from_str(&antwort.als_zeile()).unwrap();
        assert_eq!(wert["error"]["code"], serde_json::json!(FEHLER_PARAMETER));
        assert_eq!(
            wert["error"]["message"],
            serde_json::json!("Need 1 parameter: mapName (string)")
        );
        assert!(wert.get("result").is_none());
    }

    #[test]
    fn benachrichtigung_aufbau() {
        let zeile = benachrichtigung(
            "onIceConnected",
            vec![serde_json::json!(1), serde_json::json!(2)],
        );
        let wert: Value = serde_json::from_str(&zeile).unwrap();
        assert_eq!(wert["method"], serde_json::json!("onIceConnected"));
        assert_eq!(wert["params"], serde_json::json!([1, 2]));
        assert!(wert.get("id").is_none());
    }
}
