//! MessageCoder contract - the seam between the orchestration core and the
//! per-version wire codecs
//!
//! The core never touches the byte-level wire format. It asks a coder to
//! stamp session/routing fields onto a logical message, serialize it to an
//! opaque payload, and decode a received payload back into a message.

use thiserror::Error;

use crate::message::Message;

/// Errors raised by a wire codec
#[derive(Debug, Error)]
pub enum CodecError {
    /// Request serialization failed
    #[error("encode failed: {0}")]
    Encode(String),

    /// Response payload could not be decoded
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Wire-format generations of the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V11,
    V21,
    V30,
}

/// Session and routing fields stamped onto an outgoing message
#[derive(Debug, Clone, Copy)]
pub struct MessageInit<'a> {
    /// Login identifier (before authentication) or server-assigned uid
    pub login_id: &'a str,
    /// Access token; `None` only for the login request itself
    pub token: Option<&'a str>,
    /// Target vehicle for per-vehicle commands
    pub vin: Option<&'a str>,
    pub application_id: &'a str,
    pub application_data_version: u16,
    pub message_counter: u8,
}

/// Contract implemented by one wire codec per protocol version.
///
/// `initialize_message` has a provided implementation because the logical
/// stamping is version-independent; codecs override the byte-level pair.
pub trait MessageCoder: Send + Sync {
    /// Wire generation this codec speaks
    fn protocol(&self) -> ProtocolVersion;

    /// Populate session/auth/routing fields on an outgoing message
    fn initialize_message(&self, init: &MessageInit<'_>, message: &mut Message) {
        let body = &mut message.body;
        body.application_id = init.application_id.to_string();
        body.application_data_protocol_version = init.application_data_version;
        body.message_counter = init.message_counter;
        body.uid = Some(init.login_id.to_string());
        body.token = init.token.map(str::to_string);
        body.vin = init.vin.map(str::to_string);
    }

    /// Serialize a logical message to the opaque payload sent over transport
    fn encode_request(&self, message: &Message) -> Result<String, CodecError>;

    /// Decode a received payload into `message`.
    ///
    /// The caller pre-populates `message.application_data` with the variant
    /// it expects the response to carry; the codec fills in its fields (or
    /// `body.error_message` on a failure response).
    fn decode_response(&self, payload: &str, message: &mut Message) -> Result<(), CodecError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ApplicationData, LoginRequest};

    struct NullCoder;

    impl MessageCoder for NullCoder {
        fn protocol(&self) -> ProtocolVersion {
            ProtocolVersion::V11
        }

        fn encode_request(&self, _message: &Message) -> Result<String, CodecError> {
            Ok(String::new())
        }

        fn decode_response(&self, _payload: &str, _message: &mut Message) -> Result<(), CodecError> {
            Ok(())
        }
    }

    #[test]
    fn initialize_message_stamps_session_fields() {
        let coder = NullCoder;
        let mut msg = Message::request(
            17,
            ApplicationData::LoginRequest(LoginRequest::default()),
        );

        coder.initialize_message(
            &MessageInit {
                login_id: "0001#user",
                token: Some("tok"),
                vin: Some("VIN123"),
                application_id: "501",
                application_data_version: 513,
                message_counter: 1,
            },
            &mut msg,
        );

        assert_eq!(msg.body.application_id, "501");
        assert_eq!(msg.body.application_data_protocol_version, 513);
        assert_eq!(msg.body.message_counter, 1);
        assert_eq!(msg.body.uid.as_deref(), Some("0001#user"));
        assert_eq!(msg.body.token.as_deref(), Some("tok"));
        assert_eq!(msg.body.vin.as_deref(), Some("VIN123"));
    }

    #[test]
    fn initialize_message_leaves_token_empty_for_login() {
        let coder = NullCoder;
        let mut msg = Message::request(
            17,
            ApplicationData::LoginRequest(LoginRequest::default()),
        );

        coder.initialize_message(
            &MessageInit {
                login_id: "0001#user",
                token: None,
                vin: None,
                application_id: "501",
                application_data_version: 513,
                message_counter: 1,
            },
            &mut msg,
        );

        assert!(msg.body.token.is_none());
        assert!(msg.body.vin.is_none());
    }
}
