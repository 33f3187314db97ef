//! Binary codec for packets.

use thiserror::Error;

use crate::messages::GamePacket;

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Encode a packet to bytes.
pub fn encode(packet: &GamePacket) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::encode_to_vec(packet, bincode::config::standard())?)
}

/// Decode a packet from bytes.
pub fn decode(data: &[u8]) -> Result<GamePacket, CodecError> {
    let (packet, _) = bincode::decode_from_slice(data, bincode::config::standard())?;
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PlayerInput;
    use crate::messages::{PlayerInputPacket, ValidateFramePacket};

    #[test]
    fn roundtrip_input_packet() {
        let mut packet = PlayerInputPacket {
            player_number: 1,
            current_frame: 1234,
            ..Default::default()
        };
        packet.inputs[0] = PlayerInput::from_bits(PlayerInput::UP | PlayerInput::SHOOT);

        let encoded = encode(&GamePacket::Input(packet.clone())).unwrap();
        let decoded = decode(&encoded).unwrap();

        match decoded {
            GamePacket::Input(dec) => {
                assert_eq!(dec.player_number, packet.player_number);
                assert_eq!(dec.current_frame, packet.current_frame);
                assert_eq!(dec.inputs[0].bits, packet.inputs[0].bits);
            }
            _ => panic!("wrong packet type"),
        }
    }

    #[test]
    fn roundtrip_validate_packet() {
        let packet = ValidateFramePacket {
            frame: 99,
            physics_states: [0xdead_beef, 0x1234_5678],
        };

        let encoded = encode(&GamePacket::ValidateFrame(packet)).unwrap();
        let decoded = decode(&encoded).unwrap();

        match decoded {
            GamePacket::ValidateFrame(dec) => {
                assert_eq!(dec.frame, packet.frame);
                assert_eq!(dec.physics_states, packet.physics_states);
            }
            _ => panic!("wrong packet type"),
        }
    }

    #[test]
    fn roundtrip_spawn_packet() {
        let packet = crate::messages::SpawnPlayerPacket {
            player_number: 0,
            position: glam::Vec2::new(-0.5, 0.0),
            rotation: wallball_core::Degree(90.0),
        };

        let encoded = encode(&GamePacket::SpawnPlayer(packet.clone())).unwrap();
        let decoded = decode(&encoded).unwrap();

        match decoded {
            GamePacket::SpawnPlayer(dec) => {
                assert_eq!(dec.player_number, packet.player_number);
                assert_eq!(dec.position, packet.position);
                assert_eq!(dec.rotation.value(), packet.rotation.value());
            }
            _ => panic!("wrong packet type"),
        }
    }
}
