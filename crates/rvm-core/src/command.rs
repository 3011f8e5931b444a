//! Command payloads: vehicle control, alarm switches, message list
//!
//! Control-command parameters are an ordered (id, value) sequence; the
//! server interprets them positionally and by id, not as a mapping, so the
//! catalogue below must be reproduced exactly.

use serde::{Deserialize, Serialize};

/// One (parameter id, parameter value) pair of a control command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandParam {
    pub id: u8,
    pub value: Vec<u8>,
}

impl CommandParam {
    pub fn new(id: u8, value: &[u8]) -> Self {
        Self {
            id,
            value: value.to_vec(),
        }
    }
}

/// Actuation commands that drive physical vehicle hardware.
///
/// These are the commands the retry coordinator wraps; each expands to a
/// command-type marker plus its fixed parameter sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Lock,
    Unlock,
    StartRearWindowHeat,
    StopRearWindowHeat,
}

impl ControlCommand {
    /// Command-type marker stamped on the control request
    pub fn command_type(&self) -> u8 {
        match self {
            ControlCommand::Lock => 0x01,
            ControlCommand::Unlock => 0x02,
            ControlCommand::StartRearWindowHeat | ControlCommand::StopRearWindowHeat => 0x20,
        }
    }

    /// Fixed parameter sequence, in server order
    pub fn params(&self) -> Vec<CommandParam> {
        match self {
            ControlCommand::Lock => vec![],
            ControlCommand::Unlock => vec![
                CommandParam::new(4, &[0x00]),
                CommandParam::new(5, &[0x00]),
                CommandParam::new(6, &[0x00]),
                CommandParam::new(7, &[0x03]),
                CommandParam::new(255, &[0x00]),
            ],
            ControlCommand::StartRearWindowHeat => vec![
                CommandParam::new(23, &[0x01]),
                CommandParam::new(255, &[0x00]),
            ],
            ControlCommand::StopRearWindowHeat => vec![
                CommandParam::new(23, &[0x00]),
                CommandParam::new(255, &[0x00]),
            ],
        }
    }
}

/// Control request application payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlRequest {
    pub command_type: u8,
    pub params: Vec<CommandParam>,
}

impl From<ControlCommand> for ControlRequest {
    fn from(command: ControlCommand) -> Self {
        Self {
            command_type: command.command_type(),
            params: command.params(),
        }
    }
}

/// Remote alarm notification categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmType {
    Abnormal,
    Moving,
    Region,
    EngineStart,
    VehicleStart,
    BeCalled,
}

impl AlarmType {
    /// All categories, in protocol order
    pub const ALL: [AlarmType; 6] = [
        AlarmType::Abnormal,
        AlarmType::Moving,
        AlarmType::Region,
        AlarmType::EngineStart,
        AlarmType::VehicleStart,
        AlarmType::BeCalled,
    ];
}

/// One alarm notification switch setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSwitch {
    pub alarm_type: AlarmType,
    pub alarm_active: bool,
    pub function_active: bool,
}

impl AlarmSwitch {
    /// Switch with both the alarm and its function enabled
    pub fn enabled(alarm_type: AlarmType) -> Self {
        Self {
            alarm_type,
            alarm_active: true,
            function_active: true,
        }
    }
}

/// Alarm-switch configuration payload; the pin travels as an MD5 hex digest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlarmSwitchRequest {
    pub switches: Vec<AlarmSwitch>,
    pub pin: String,
}

/// Message-list query window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageListRequest {
    pub start_number: u32,
    pub end_number: u32,
    pub message_group: String,
}

/// One entry of the account message list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleMessage {
    pub message_id: u64,
    pub title: String,
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
}

/// Message-list response payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub records_number: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<VehicleMessage>,
}
