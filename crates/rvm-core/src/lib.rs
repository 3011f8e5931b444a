//! rvm-core - Logical message model and codec contract for the RVM protocol
//!
//! This crate provides the version-independent message model exchanged with
//! the telematics backend, the [`MessageCoder`] contract implemented by the
//! per-version wire codecs, and the fixed routing constants each command
//! needs to be stamped with for server compatibility.
//!
//! The byte-level wire format (framing, checksums, field serialization) is
//! deliberately not part of this crate; wire codecs are external and plug in
//! through [`MessageCoder`].

pub mod coder;
pub mod command;
pub mod message;
pub mod routing;
pub mod status;

pub use coder::{CodecError, MessageCoder, MessageInit, ProtocolVersion};
pub use command::{
    AlarmSwitch, AlarmSwitchRequest, AlarmType, CommandParam, ControlCommand, ControlRequest,
    MessageListRequest, MessageListResponse, VehicleMessage,
};
pub use message::{
    ApplicationData, Header, LoginRequest, LoginResponse, Message, MessageBody,
    VehicleStatusRequest, VinInfo,
};
pub use routing::{CommandRoute, Endpoint};
pub use status::{
    BasicVehicleStatus, ChargingStatus, GpsPosition, Position, VehicleStatus, WayPoint,
};
