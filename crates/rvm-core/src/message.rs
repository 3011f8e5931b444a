//! Logical message model
//!
//! A [`Message`] is the structured (header, body, application data) form of a
//! request or response, independent of its serialized wire representation.
//! Exactly one [`ApplicationData`] variant is populated per message kind;
//! `body.error_message` is populated by the server only on failure responses
//! and is mutually exclusive with a successful application payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::{AlarmSwitchRequest, ControlRequest, MessageListRequest, MessageListResponse};
use crate::status::{ChargingStatus, VehicleStatus};

/// Protocol header carried by V1.1 messages.
///
/// V2.1 and V3.0 frames own their header layout inside the wire codec; for
/// those the logical header version is left at its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    pub protocol_version: u8,
}

/// Session and routing fields shared by every message kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageBody {
    pub application_id: String,
    pub application_data_protocol_version: u16,
    pub message_counter: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Server-issued correlation id linking a retried command to its
    /// original attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Populated by the server only on failure responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<u16>,
}

/// A logical request or response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub header: Header,
    pub body: MessageBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_data: Option<ApplicationData>,
}

impl Message {
    /// Build a request message carrying the given application payload
    pub fn request(header_version: u8, application_data: ApplicationData) -> Self {
        Self {
            header: Header {
                protocol_version: header_version,
            },
            body: MessageBody::default(),
            application_data: Some(application_data),
        }
    }

    /// Build a request that carries no application payload (body-only
    /// commands such as the charging-status query)
    pub fn empty(header_version: u8) -> Self {
        Self {
            header: Header {
                protocol_version: header_version,
            },
            body: MessageBody::default(),
            application_data: None,
        }
    }

    /// Build an empty message pre-populated with the application-data variant
    /// a decoder is expected to fill in.
    ///
    /// Wire codecs decode into the variant found on the message; a `None`
    /// payload means the response carries no application data (e.g. a bare
    /// acknowledgement or an error body).
    pub fn response_template(header_version: u8, application_data: Option<ApplicationData>) -> Self {
        Self {
            header: Header {
                protocol_version: header_version,
            },
            body: MessageBody::default(),
            application_data,
        }
    }

    /// Error payload of a failure response, if any
    pub fn error_message(&self) -> Option<&str> {
        self.body.error_message.as_deref()
    }

    /// Server-issued event correlation id, if any
    pub fn event_id(&self) -> Option<&str> {
        self.body.event_id.as_deref()
    }
}

/// Command-specific payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationData {
    LoginRequest(LoginRequest),
    LoginResponse(LoginResponse),
    AlarmSwitchRequest(AlarmSwitchRequest),
    VehicleStatusRequest(VehicleStatusRequest),
    VehicleStatusResponse(VehicleStatus),
    ControlRequest(ControlRequest),
    ChargingStatusResponse(ChargingStatus),
    MessageListRequest(MessageListRequest),
    MessageListResponse(MessageListResponse),
}

/// Login credentials submitted on the V1.1 path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Successful login payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Absent means the token never expires for this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Vehicles registered to the account
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vin_list: Vec<VinInfo>,
}

/// Identity needed to route a command to a specific vehicle.
///
/// Supplied by the caller for every per-vehicle operation; not owned by the
/// session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VinInfo {
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl VinInfo {
    pub fn new(vin: impl Into<String>) -> Self {
        Self {
            vin: vin.into(),
            brand_name: None,
            model_name: None,
        }
    }
}

/// Vehicle status query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleStatusRequest {
    pub status_req_type: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_exactly_one_payload_variant() {
        let msg = Message::request(
            17,
            ApplicationData::LoginRequest(LoginRequest {
                password: "secret".into(),
            }),
        );
        assert_eq!(msg.header.protocol_version, 17);
        assert!(matches!(
            msg.application_data,
            Some(ApplicationData::LoginRequest(_))
        ));
        assert!(msg.error_message().is_none());
    }

    #[test]
    fn response_template_may_expect_no_payload() {
        let msg = Message::response_template(0, None);
        assert!(msg.application_data.is_none());
        assert!(msg.event_id().is_none());
    }

    #[test]
    fn message_round_trips_through_json() {
        let mut msg = Message::request(
            18,
            ApplicationData::LoginRequest(LoginRequest {
                password: "pw".into(),
            }),
        );
        msg.body.uid = Some("user".into());
        msg.body.event_id = Some("evt-7".into());

        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.body.uid.as_deref(), Some("user"));
        assert_eq!(back.event_id(), Some("evt-7"));
    }
}
