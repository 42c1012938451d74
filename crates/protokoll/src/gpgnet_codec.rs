//! Wire-Format fuer die GPGNet-TCP-Verbindung
//!
//! Binaeres, laengenpraefixiertes Format (alle Ganzzahlen little-endian):
//!
//! ```text
//! +----------------+-------------+----------------+----------+-----+
//! | Kopf-Laenge u32| Kopf-Bytes  | Anzahl Teile u32| Teil ... | ... |
//! +----------------+-------------+----------------+----------+-----+
//!
//! Teil: +---------+------------------------------------+
//!       | Tag u8  | 0: i32 LE                          |
//!       |         | 1/2: Laenge u32 LE + UTF-8-Bytes   |
//!       +---------+------------------------------------+
//! ```
//!
//! Tag 2 ist ein historischer String-Alias; beim Kodieren wird immer Tag 1
//! geschrieben.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::gpgnet::{GpgNetNachricht, GpgNetWert};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Maximale Laenge des Kopf-Strings in Bytes
pub const MAX_KOPF_LAENGE: usize = 4096;

/// Maximale Laenge eines String-Teils in Bytes
pub const MAX_TEXT_LAENGE: usize = 64 * 1024;

/// Maximale Anzahl Teile pro Nachricht
pub const MAX_TEILE: usize = 64;

/// Typ-Tag fuer Ganzzahl-Teile
const TAG_ZAHL: u8 = 0;

/// Typ-Tag fuer String-Teile
const TAG_TEXT: u8 = 1;

/// Historischer zweiter String-Tag (nur beim Dekodieren akzeptiert)
const TAG_TEXT_ALT: u8 = 2;

// ---------------------------------------------------------------------------
// GpgNetCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer GPGNet-Nachrichten
///
/// Implementiert `Decoder` und `Encoder<GpgNetNachricht>` fuer die
/// Verwendung mit `tokio_util::codec::Framed`.
#[derive(Debug, Clone, Default)]
pub struct GpgNetCodec;

impl GpgNetCodec {
    /// Erstellt einen neuen Codec
    pub fn new() -> Self {
        Self
    }
}

/// Versucht einen laengenpraefixierten String ab `pos` zu lesen
///
/// Gibt `Ok(None)` zurueck wenn noch nicht genug Bytes im Buffer sind.
fn text_lesen(
    src: &BytesMut,
    pos: &mut usize,
    max_laenge: usize,
) -> io::Result<Option<String>> {
    if src.len() < *pos + 4 {
        return Ok(None);
    }
    let laenge =
        u32::from_le_bytes([src[*pos], src[*pos + 1], src[*pos + 2], src[*pos + 3]]) as usize;
    if laenge > max_laenge {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("GPGNet-String zu lang: {laenge} Bytes (Maximum: {max_laenge})"),
        ));
    }
    if src.len() < *pos + 4 + laenge {
        return Ok(None);
    }
    let bytes = &src[*pos + 4..*pos + 4 + laenge];
    let text = std::str::from_utf8(bytes)
        .map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "GPGNet-String ist kein gueltiges UTF-8")
        })?
        .to_owned();
    *pos += 4 + laenge;
    Ok(Some(text))
}

impl Decoder for GpgNetCodec {
    type Item = GpgNetNachricht;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut pos = 0usize;

        // Kopf
        let kopf = match text_lesen(src, &mut pos, MAX_KOPF_LAENGE)? {
            Some(k) => k,
            None => return Ok(None),
        };

        // Anzahl Teile
        if src.len() < pos + 4 {
            return Ok(None);
        }
        let anzahl =
            u32::from_le_bytes([src[pos], src[pos + 1], src[pos + 2], src[pos + 3]]) as usize;
        pos += 4;
        if anzahl > MAX_TEILE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("GPGNet-Nachricht hat zu viele Teile: {anzahl} (Maximum: {MAX_TEILE})"),
            ));
        }

        // Teile
        let mut teile = Vec::with_capacity(anzahl);
        for _ in 0..anzahl {
            if src.len() < pos + 1 {
                return Ok(None);
            }
            let tag = src[pos];
            pos += 1;
            match tag {
                TAG_ZAHL => {
                    if src.len() < pos + 4 {
                        return Ok(None);
                    }
                    let wert = i32::from_le_bytes([
                        src[pos],
                        src[pos + 1],
                        src[pos + 2],
                        src[pos + 3],
                    ]);
                    pos += 4;
                    teile.push(GpgNetWert::Zahl(wert));
                }
                TAG_TEXT | TAG_TEXT_ALT => {
                    let text = match text_lesen(src, &mut pos, MAX_TEXT_LAENGE)? {
                        Some(t) => t,
                        None => return Ok(None),
                    };
                    teile.push(GpgNetWert::Text(text));
                }
                unbekannt => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Unbekannter GPGNet-Teil-Tag: {unbekannt}"),
                    ));
                }
            }
        }

        // Erst jetzt den Buffer verbrauchen – die Nachricht ist vollstaendig
        src.advance(pos);
        Ok(Some(GpgNetNachricht { kopf, teile }))
    }
}

impl Encoder<GpgNetNachricht> for GpgNetCodec {
    type Error = io::Error;

    fn encode(&mut self, item: GpgNetNachricht, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.kopf.len() > MAX_KOPF_LAENGE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("GPGNet-Kopf zu lang: {} Bytes", item.kopf.len()),
            ));
        }
        if item.teile.len() > MAX_TEILE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("GPGNet-Nachricht hat zu viele Teile: {}", item.teile.len()),
            ));
        }

        dst.put_u32_le(item.kopf.len() as u32);
        dst.put_slice(item.kopf.as_bytes());
        dst.put_u32_le(item.teile.len() as u32);

        for teil in &item.teile {
            match teil {
                GpgNetWert::Zahl(z) => {
                    dst.put_u8(TAG_ZAHL);
                    dst.put_i32_le(*z);
                }
                GpgNetWert::Text(t) => {
                    if t.len() > MAX_TEXT_LAENGE {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("GPGNet-String zu lang: {} Bytes", t.len()),
                        ));
                    }
                    dst.put_u8(TAG_TEXT);
                    dst.put_u32_le(t.len() as u32);
                    dst.put_slice(t.as_bytes());
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use eisbruecke_core::SpielerId;

    fn gamestate_nachricht(zustand: &str) -> GpgNetNachricht {
        GpgNetNachricht::neu("GameState", vec![GpgNetWert::from(zustand)])
    }

    #[test]
    fn codec_encode_decode_gamestate() {
        let mut codec = GpgNetCodec::new();
        let original = gamestate_nachricht("Lobby");

        let mut buf = BytesMut::new();
        codec.encode(original.clone(), &mut buf).unwrap();

        let dekodiert = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
        assert_eq!(dekodiert, original);
        assert!(buf.is_empty());
    }

    #[test]
    fn codec_gemischte_teile() {
        let mut codec = GpgNetCodec::new();
        let original = GpgNetNachricht::join_game("127.0.0.1:6112", "Rhiza", SpielerId(77));

        let mut buf = BytesMut::new();
        codec.encode(original.clone(), &mut buf).unwrap();

        let dekodiert = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
        assert_eq!(dekodiert.teile[0], GpgNetWert::Text("127.0.0.1:6112".into()));
        assert_eq!(dekodiert.teile[2], GpgNetWert::Zahl(77));
    }

    #[test]
    fn codec_unvollstaendiger_frame_wartet() {
        let mut codec = GpgNetCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(gamestate_nachricht("Idle"), &mut buf)
            .unwrap();

        // Nur die Haelfte der Bytes anliefern
        let gesamt = buf.clone();
        let mut teilbuf = BytesMut::from(&gesamt[..gesamt.len() / 2]);
        assert!(codec.decode(&mut teilbuf).unwrap().is_none());

        // Buffer darf dabei nicht verbraucht worden sein
        assert_eq!(teilbuf.len(), gesamt.len() / 2);

        // Rest nachliefern -> Nachricht vollstaendig
        teilbuf.extend_from_slice(&gesamt[gesamt.len() / 2..]);
        let dekodiert = codec.decode(&mut teilbuf).unwrap().expect("Nachricht erwartet");
        assert_eq!(dekodiert.kopf, "GameState");
    }

    #[test]
    fn codec_mehrere_nachrichten_im_buffer() {
        let mut codec = GpgNetCodec::new();
        let mut buf = BytesMut::new();
        for zustand in ["Idle", "Lobby", "Launching"] {
            codec.encode(gamestate_nachricht(zustand), &mut buf).unwrap();
        }

        for zustand in ["Idle", "Lobby", "Launching"] {
            let nachricht = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
            assert_eq!(nachricht.teile[0], GpgNetWert::Text(zustand.into()));
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn codec_alter_string_tag_wird_akzeptiert() {
        let mut codec = GpgNetCodec::new();
        let mut buf = BytesMut::new();
        // Nachricht von Hand mit Tag 2 bauen
        buf.put_u32_le(4);
        buf.put_slice(b"Chat");
        buf.put_u32_le(1);
        buf.put_u8(2);
        buf.put_u32_le(5);
        buf.put_slice(b"hallo");

        let nachricht = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
        assert_eq!(nachricht.kopf, "Chat");
        assert_eq!(nachricht.teile, vec![GpgNetWert::Text("hallo".into())]);
    }

    #[test]
    fn codec_ablehnung_unbekannter_tag() {
        let mut codec = GpgNetCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u32_le(1);
        buf.put_slice(b"X");
        buf.put_u32_le(1);
        buf.put_u8(9);

        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn codec_ablehnung_zu_langer_kopf() {
        let mut codec = GpgNetCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u32_le((MAX_KOPF_LAENGE + 1) as u32);

        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn codec_ablehnung_ungueltiges_utf8() {
        let mut codec = GpgNetCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u32_le(2);
        buf.put_slice(&[0xff, 0xfe]);
        buf.put_u32_le(0);

        assert!(codec.decode(&mut buf).is_err());
    }
}
