//! Fixed command routes
//!
//! Each command targets a fixed endpoint path and carries a fixed
//! protocol-version/application-id/data-version triple. These are
//! configuration constants the server matches on; they must be reproduced
//! exactly.

use crate::coder::ProtocolVersion;

/// Endpoint path suffixes off the configurable base URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// V1.1 commands (login, alarm switches, message list)
    Mp,
    /// V2.1 commands (vehicle status, vehicle control)
    Mpv21,
    /// V3.0 commands (charging status)
    Mpv30,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Mp => "/TAP.Web/ota.mp",
            Endpoint::Mpv21 => "/TAP.Web/ota.mpv21",
            Endpoint::Mpv30 => "/TAP.Web/ota.mpv30",
        }
    }
}

/// Routing constants for one command kind
#[derive(Debug, Clone, Copy)]
pub struct CommandRoute {
    pub endpoint: Endpoint,
    pub protocol: ProtocolVersion,
    pub application_id: &'static str,
    pub application_data_version: u16,
    pub message_counter: u8,
    /// Logical header version for V1.1 messages; V2.1/V3.0 frames carry no
    /// logical header
    pub header_version: Option<u8>,
}

pub const LOGIN: CommandRoute = CommandRoute {
    endpoint: Endpoint::Mp,
    protocol: ProtocolVersion::V11,
    application_id: "501",
    application_data_version: 513,
    message_counter: 1,
    header_version: Some(17),
};

pub const ALARM_SWITCHES: CommandRoute = CommandRoute {
    endpoint: Endpoint::Mp,
    protocol: ProtocolVersion::V11,
    application_id: "521",
    application_data_version: 513,
    message_counter: 1,
    header_version: Some(17),
};

pub const VEHICLE_STATUS: CommandRoute = CommandRoute {
    endpoint: Endpoint::Mpv21,
    protocol: ProtocolVersion::V21,
    application_id: "511",
    application_data_version: 25857,
    message_counter: 1,
    header_version: None,
};

pub const VEHICLE_CONTROL: CommandRoute = CommandRoute {
    endpoint: Endpoint::Mpv21,
    protocol: ProtocolVersion::V21,
    application_id: "510",
    application_data_version: 25857,
    message_counter: 1,
    header_version: None,
};

pub const CHARGING_STATUS: CommandRoute = CommandRoute {
    endpoint: Endpoint::Mpv30,
    protocol: ProtocolVersion::V30,
    application_id: "516",
    application_data_version: 768,
    message_counter: 5,
    header_version: None,
};

pub const MESSAGE_LIST: CommandRoute = CommandRoute {
    endpoint: Endpoint::Mp,
    protocol: ProtocolVersion::V11,
    application_id: "531",
    application_data_version: 513,
    message_counter: 1,
    header_version: Some(18),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Mp.path(), "/TAP.Web/ota.mp");
        assert_eq!(Endpoint::Mpv21.path(), "/TAP.Web/ota.mpv21");
        assert_eq!(Endpoint::Mpv30.path(), "/TAP.Web/ota.mpv30");
    }

    #[test]
    fn routes_carry_the_fixed_triples() {
        assert_eq!(LOGIN.application_id, "501");
        assert_eq!(LOGIN.application_data_version, 513);
        assert_eq!(LOGIN.header_version, Some(17));

        assert_eq!(VEHICLE_STATUS.application_id, "511");
        assert_eq!(VEHICLE_STATUS.application_data_version, 25857);
        assert_eq!(VEHICLE_STATUS.endpoint, Endpoint::Mpv21);

        assert_eq!(VEHICLE_CONTROL.application_id, "510");
        assert_eq!(VEHICLE_CONTROL.application_data_version, 25857);

        assert_eq!(CHARGING_STATUS.application_id, "516");
        assert_eq!(CHARGING_STATUS.application_data_version, 768);
        assert_eq!(CHARGING_STATUS.message_counter, 5);
        assert_eq!(CHARGING_STATUS.endpoint, Endpoint::Mpv30);

        assert_eq!(MESSAGE_LIST.application_id, "531");
        assert_eq!(MESSAGE_LIST.header_version, Some(18));
    }
}
