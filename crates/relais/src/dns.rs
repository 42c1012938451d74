//! Einmalige Aufloesung der STUN/TURN-Hostnamen
//!
//! Die Hostnamen werden genau einmal beim Start aufgeloest, asynchron und
//! ohne dass irgendjemand darauf wartet. Relais, die vor Abschluss der
//! Aufloesung erzeugt werden, lesen den Momentanwert (`None` = noch nicht
//! aufgeloest) und bekommen dann schlicht keinen STUN/TURN-Server fuer
//! diesen Versuch. Spaetere Relais sehen den Cache-Wert.

use parking_lot::RwLock;
use std::net::IpAddr;
use std::sync::Arc;

/// Standard-Port fuer STUN und TURN
pub const STUN_TURN_PORT: u16 = 3478;

/// Write-once-Cache fuer die aufgeloesten STUN/TURN-Adressen
///
/// `None` ist der "noch nicht aufgeloest"-Sentinel. Lesen blockiert nie.
#[derive(Default)]
pub struct IceServerAufloesung {
    stun_ip: RwLock<Option<IpAddr>>,
    turn_ip: RwLock<Option<IpAddr>>,
}

impl IceServerAufloesung {
    /// Erstellt einen leeren Cache
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Startet die beiden Aufloesungs-Tasks (fire-and-forget)
    pub fn starten(self: &Arc<Self>, stun_host: String, turn_host: String) {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            match hostname_aufloesen(&stun_host).await {
                Some(ip) => {
                    tracing::info!(host = %stun_host, ip = %ip, "STUN-Host aufgeloest");
                    *cache.stun_ip.write() = Some(ip);
                }
                None => {
                    tracing::error!(host = %stun_host, "STUN-Host konnte nicht aufgeloest werden");
                }
            }
        });

        let cache = Arc::clone(self);
        tokio::spawn(async move {
            match hostname_aufloesen(&turn_host).await {
                Some(ip) => {
                    tracing::info!(host = %turn_host, ip = %ip, "TURN-Host aufgeloest");
                    *cache.turn_ip.write() = Some(ip);
                }
                None => {
                    tracing::error!(host = %turn_host, "TURN-Host konnte nicht aufgeloest werden");
                }
            }
        });
    }

    /// Momentanwert der STUN-Adresse
    pub fn stun_ip(&self) -> Option<IpAddr> {
        *self.stun_ip.read()
    }

    /// Momentanwert der TURN-Adresse
    pub fn turn_ip(&self) -> Option<IpAddr> {
        *self.turn_ip.read()
    }
}

/// Loest einen Hostnamen auf die erste gefundene Adresse auf
async fn hostname_aufloesen(host: &str) -> Option<IpAddr> {
    match tokio::net::lookup_host((host, STUN_TURN_PORT)).await {
        Ok(mut adressen) => adressen.next().map(|addr| addr.ip()),
        Err(e) => {
            tracing::debug!(host, fehler = %e, "DNS-Aufloesung fehlgeschlagen");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_vor_der_aufloesung() {
        let cache = IceServerAufloesung::neu();
        assert!(cache.stun_ip().is_none());
        assert!(cache.turn_ip().is_none());
    }

    #[tokio::test]
    async fn localhost_wird_aufgeloest() {
        let cache = IceServerAufloesung::neu();
        cache.starten("localhost".into(), "localhost".into());

        // Aufloesung ist fire-and-forget; fuer den Test kurz pollen
        for _ in 0..100 {
            if cache.stun_ip().is_some() && cache.turn_ip().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(cache.stun_ip().expect("STUN-IP erwartet").is_loopback());
        assert!(cache.turn_ip().expect("TURN-IP erwartet").is_loopback());
    }

    #[tokio::test]
    async fn fehlschlag_laesst_sentinel_stehen() {
        let cache = IceServerAufloesung::neu();
        cache.starten(
            "gibt-es-nicht.invalid".into(),
            "gibt-es-auch-nicht.invalid".into(),
        );

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(cache.stun_ip().is_none());
        assert!(cache.turn_ip().is_none());
    }
}
