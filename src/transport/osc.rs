//! OSC 1.0 message encoding

use crate::control::{MessageValue, OutboundMessage};

/// Encode a message as a single OSC packet.
///
/// Layout: padded address, padded type tag (`,f` or `,i`), then one
/// big-endian 32-bit argument.
pub fn encode(message: &OutboundMessage) -> Vec<u8> {
    let mut packet = Vec::with_capacity(32);

    if !message.address.starts_with('/') {
        packet.push(b'/');
    }
    packet.extend_from_slice(message.address.as_bytes());
    pad_string(&mut packet);

    match message.value {
        MessageValue::Float(v) => {
            packet.extend_from_slice(b",f");
            pad_string(&mut packet);
            packet.extend_from_slice(&(v as f32).to_be_bytes());
        }
        MessageValue::Int(v) => {
            packet.extend_from_slice(b",i");
            pad_string(&mut packet);
            packet.extend_from_slice(&v.to_be_bytes());
        }
    }

    packet
}

/// Null-terminate and pad to the next multiple of four
fn pad_string(buf: &mut Vec<u8>) {
    buf.push(0);
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_float() {
        let packet = encode(&OutboundMessage::float("delay/fb", 0.5));

        // "/delay/fb" is 9 bytes + null -> padded to 12
        assert_eq!(&packet[..12], b"/delay/fb\0\0\0");
        assert_eq!(&packet[12..16], b",f\0\0");
        assert_eq!(&packet[16..], &0.5f32.to_be_bytes());
        assert_eq!(packet.len(), 20);
    }

    #[test]
    fn test_encode_int() {
        let packet = encode(&OutboundMessage::int("siren/toggle", 1));

        // "/siren/toggle" is 13 bytes + null -> padded to 16
        assert_eq!(&packet[..16], b"/siren/toggle\0\0\0");
        assert_eq!(&packet[16..20], b",i\0\0");
        assert_eq!(&packet[20..], &[0u8, 0, 0, 1]);
    }

    #[test]
    fn test_existing_slash_is_kept_once() {
        let packet = encode(&OutboundMessage::float("/air/rate", 1.0));
        assert_eq!(&packet[..12], b"/air/rate\0\0\0");
    }

    #[test]
    fn test_address_on_word_boundary_gets_full_pad() {
        // "/air" is 4 bytes and still needs a terminator, so 4 nulls
        let packet = encode(&OutboundMessage::int("air", 0));
        assert_eq!(&packet[..8], b"/air\0\0\0\0");
        assert_eq!(packet.len() % 4, 0);
    }
}
