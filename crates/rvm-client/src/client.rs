//! RVM API client: session lifecycle, command dispatch, actuation retries

use std::sync::Arc;

use chrono::Utc;
use md5::{Digest, Md5};
use tracing::{debug, instrument};

use rvm_core::routing::{self, CommandRoute};
use rvm_core::{
    AlarmSwitch, AlarmSwitchRequest, AlarmType, ApplicationData, ChargingStatus, ControlCommand,
    ControlRequest, LoginRequest, LoginResponse, Message, MessageCoder, MessageInit,
    MessageListRequest, MessageListResponse, ProtocolVersion, VehicleStatus, VehicleStatusRequest,
    VinInfo,
};

use crate::config::ClientConfig;
use crate::error::{Result, RvmClientError};
use crate::retry::RetryPolicy;
use crate::session::Session;
use crate::transport::HttpTransport;

/// Message-list window requested from the backend
const MESSAGE_LIST_START: u32 = 1;
const MESSAGE_LIST_END: u32 = 5;
const MESSAGE_LIST_GROUP: &str = "ALARM";

/// Vehicle status query type for a full status read
const STATUS_REQ_TYPE_FULL: u8 = 2;

/// One wire codec per protocol generation, selected at construction time.
///
/// The dispatcher depends only on the [`MessageCoder`] interface; production
/// codecs are external and plugged in here.
#[derive(Clone)]
pub struct CoderSet {
    pub v11: Arc<dyn MessageCoder>,
    pub v21: Arc<dyn MessageCoder>,
    pub v30: Arc<dyn MessageCoder>,
}

impl CoderSet {
    fn for_protocol(&self, protocol: ProtocolVersion) -> &dyn MessageCoder {
        match protocol {
            ProtocolVersion::V11 => self.v11.as_ref(),
            ProtocolVersion::V21 => self.v21.as_ref(),
            ProtocolVersion::V30 => self.v30.as_ref(),
        }
    }
}

/// Client for the RVM telematics backend.
///
/// Owns the session (token, expiry, cookies) exclusively; all calls are
/// strictly sequential. A multi-threaded embedding must serialize access
/// around whole get-token-then-call sequences, since a refresh triggered by
/// one caller must not race another caller's in-flight request.
pub struct RvmClient {
    transport: HttpTransport,
    coders: CoderSet,
    session: Session,
    password: String,
    retry: RetryPolicy,
}

impl RvmClient {
    pub fn new(config: &ClientConfig, coders: CoderSet) -> Result<Self> {
        let transport = HttpTransport::new(&config.connection, &config.timeouts)?;

        Ok(Self {
            transport,
            coders,
            session: Session::new(&config.connection.username),
            password: config.connection.password.clone(),
            retry: config.retry.policy(),
        })
    }

    /// Current session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Authenticate and populate the session token.
    ///
    /// A login response carrying an error payload is fatal to the whole
    /// session: no further calls can proceed without one, so it surfaces as
    /// a typed [`RvmClientError::Auth`] and no token is set. Every
    /// successful login overwrites the previous token; there is no
    /// distinction between first login and re-login.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<Message> {
        let route = routing::LOGIN;
        let request = Message::request(
            route.header_version.unwrap_or_default(),
            ApplicationData::LoginRequest(LoginRequest {
                password: self.password.clone(),
            }),
        );
        let template = Message::response_template(
            route.header_version.unwrap_or_default(),
            Some(ApplicationData::LoginResponse(LoginResponse::default())),
        );

        let login_id = self.session.login_id.clone();
        let response = self
            .exchange(route, &login_id, None, None, None, request, template)
            .await?;

        if let Some(error) = response.error_message() {
            return Err(RvmClientError::Auth(error.to_string()));
        }

        let Some(ApplicationData::LoginResponse(login)) = &response.application_data else {
            return Err(RvmClientError::Auth(
                "login response carried no session payload".to_string(),
            ));
        };

        self.session.authenticate(
            response.body.uid.clone(),
            login.token.clone(),
            login.token_expires_at,
        );
        debug!(expires_at = ?self.session.token_expires_at, "session established");

        Ok(response)
    }

    /// Token guaranteed valid at call time.
    ///
    /// A lazy re-login when the expiry has passed is the sole refresh
    /// trigger; there is no background or proactive refresh.
    async fn valid_token(&mut self) -> Result<String> {
        if self.session.is_expired(Utc::now()) {
            debug!("access token expired, re-authenticating");
            self.login().await?;
        }
        // calling an authenticated command before login is a programming
        // error, not a protocol error
        debug_assert!(
            !self.session.token.is_empty(),
            "authenticated call issued before login"
        );
        Ok(self.session.token.clone())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Query the vehicle status.
    ///
    /// An error payload in the response is data for the caller, not a fault.
    #[instrument(skip(self, vin), fields(vin = %vin.vin))]
    pub async fn vehicle_status(
        &mut self,
        vin: &VinInfo,
        event_id: Option<&str>,
    ) -> Result<Message> {
        let route = routing::VEHICLE_STATUS;
        let token = self.valid_token().await?;
        let request = Message::request(
            route.header_version.unwrap_or_default(),
            ApplicationData::VehicleStatusRequest(VehicleStatusRequest {
                status_req_type: STATUS_REQ_TYPE_FULL,
            }),
        );
        let template = Message::response_template(
            route.header_version.unwrap_or_default(),
            Some(ApplicationData::VehicleStatusResponse(
                VehicleStatus::default(),
            )),
        );

        let login_id = self.session.login_id.clone();
        self.exchange(
            route,
            &login_id,
            Some(&token),
            Some(&vin.vin),
            event_id,
            request,
            template,
        )
        .await
    }

    /// Query the charging status
    #[instrument(skip(self, vin), fields(vin = %vin.vin))]
    pub async fn charging_status(
        &mut self,
        vin: &VinInfo,
        event_id: Option<&str>,
    ) -> Result<Message> {
        let route = routing::CHARGING_STATUS;
        let token = self.valid_token().await?;
        let request = Message::empty(route.header_version.unwrap_or_default());
        let template = Message::response_template(
            route.header_version.unwrap_or_default(),
            Some(ApplicationData::ChargingStatusResponse(
                ChargingStatus::default(),
            )),
        );

        let login_id = self.session.login_id.clone();
        self.exchange(
            route,
            &login_id,
            Some(&token),
            Some(&vin.vin),
            event_id,
            request,
            template,
        )
        .await
    }

    /// Fetch the account alarm message list
    #[instrument(skip(self))]
    pub async fn message_list(&mut self, event_id: Option<&str>) -> Result<Message> {
        let route = routing::MESSAGE_LIST;
        let token = self.valid_token().await?;
        let request = Message::request(
            route.header_version.unwrap_or_default(),
            ApplicationData::MessageListRequest(MessageListRequest {
                start_number: MESSAGE_LIST_START,
                end_number: MESSAGE_LIST_END,
                message_group: MESSAGE_LIST_GROUP.to_string(),
            }),
        );
        let template = Message::response_template(
            route.header_version.unwrap_or_default(),
            Some(ApplicationData::MessageListResponse(
                MessageListResponse::default(),
            )),
        );

        let login_id = self.session.login_id.clone();
        self.exchange(route, &login_id, Some(&token), None, event_id, request, template)
            .await
    }

    // =========================================================================
    // Configuration commands
    // =========================================================================

    /// Enable every remote alarm notification category.
    ///
    /// The PIN travels as an MD5 hex digest. Unlike the read queries, a
    /// rejection here is an `Err`.
    #[instrument(skip(self, pin))]
    pub async fn configure_alarm_switches(&mut self, pin: &str) -> Result<Message> {
        let route = routing::ALARM_SWITCHES;
        let token = self.valid_token().await?;
        let request = Message::request(
            route.header_version.unwrap_or_default(),
            ApplicationData::AlarmSwitchRequest(AlarmSwitchRequest {
                switches: AlarmType::ALL.iter().copied().map(AlarmSwitch::enabled).collect(),
                pin: md5_hex(pin),
            }),
        );
        let template = Message::response_template(route.header_version.unwrap_or_default(), None);

        let login_id = self.session.login_id.clone();
        let response = self
            .exchange(route, &login_id, Some(&token), None, None, request, template)
            .await?;

        if let Some(error) = response.error_message() {
            return Err(RvmClientError::Command(error.to_string()));
        }
        Ok(response)
    }

    // =========================================================================
    // Actuation commands (retried with event correlation)
    // =========================================================================

    /// Lock the vehicle
    pub async fn lock_vehicle(&mut self, vin: &VinInfo) -> Result<Message> {
        self.control_with_retry(vin, ControlCommand::Lock).await
    }

    /// Unlock the vehicle
    pub async fn unlock_vehicle(&mut self, vin: &VinInfo) -> Result<Message> {
        self.control_with_retry(vin, ControlCommand::Unlock).await
    }

    /// Switch the rear window heater on
    pub async fn start_rear_window_heat(&mut self, vin: &VinInfo) -> Result<Message> {
        self.control_with_retry(vin, ControlCommand::StartRearWindowHeat)
            .await
    }

    /// Switch the rear window heater off
    pub async fn stop_rear_window_heat(&mut self, vin: &VinInfo) -> Result<Message> {
        self.control_with_retry(vin, ControlCommand::StopRearWindowHeat)
            .await
    }

    /// Issue a single control command attempt, without retry.
    ///
    /// Pass the event id taken from a failed response to mark the attempt as
    /// a continuation of that command rather than a new one.
    #[instrument(skip(self, vin), fields(vin = %vin.vin, command = ?command))]
    pub async fn send_control_command(
        &mut self,
        vin: &VinInfo,
        command: ControlCommand,
        event_id: Option<&str>,
    ) -> Result<Message> {
        let route = routing::VEHICLE_CONTROL;
        let token = self.valid_token().await?;
        let request = Message::request(
            route.header_version.unwrap_or_default(),
            ApplicationData::ControlRequest(ControlRequest::from(command)),
        );
        let template = Message::response_template(route.header_version.unwrap_or_default(), None);

        let login_id = self.session.login_id.clone();
        self.exchange(
            route,
            &login_id,
            Some(&token),
            Some(&vin.vin),
            event_id,
            request,
            template,
        )
        .await
    }

    /// Retry coordinator for actuation commands.
    ///
    /// While the response carries an error payload and the attempt budget
    /// allows, wait the fixed delay and resend the identical parameters
    /// tagged with the event id from the failed response. The last response
    /// is returned even when still erroring; exhaustion is not an `Err`.
    /// Transport faults abort immediately and are never retried.
    async fn control_with_retry(
        &mut self,
        vin: &VinInfo,
        command: ControlCommand,
    ) -> Result<Message> {
        let mut response = self.send_control_command(vin, command, None).await?;
        let mut attempts = 1u32;

        while response.error_message().is_some() && self.retry.allows_another(attempts) {
            debug!(
                attempts,
                event_id = response.event_id(),
                "control command still pending, retrying with correlation id"
            );
            tokio::time::sleep(self.retry.delay).await;

            let event_id = response.body.event_id.clone();
            response = self
                .send_control_command(vin, command, event_id.as_deref())
                .await?;
            attempts += 1;
        }

        Ok(response)
    }

    // =========================================================================
    // Shared dispatch pipeline
    // =========================================================================

    /// Codec -> transport -> codec for one command.
    ///
    /// Stamps the route's fixed triple and the session fields, overwrites
    /// the event id on the retry path, serializes, submits to the route's
    /// endpoint and decodes into the expected response template. The decoded
    /// message is returned unconditionally.
    #[allow(clippy::too_many_arguments)]
    async fn exchange(
        &self,
        route: CommandRoute,
        login_id: &str,
        token: Option<&str>,
        vin: Option<&str>,
        event_id: Option<&str>,
        mut request: Message,
        mut response: Message,
    ) -> Result<Message> {
        let coder = self.coders.for_protocol(route.protocol);

        coder.initialize_message(
            &MessageInit {
                login_id,
                token,
                vin,
                application_id: route.application_id,
                application_data_version: route.application_data_version,
                message_counter: route.message_counter,
            },
            &mut request,
        );
        if let Some(event_id) = event_id {
            request.body.event_id = Some(event_id.to_string());
        }

        log_message(&route, "request", &request);
        let payload = coder.encode_request(&request)?;
        log_payload(&route, "request", &payload);

        let response_payload = self.transport.send(route.endpoint, payload).await?;

        log_payload(&route, "response", &response_payload);
        coder.decode_response(&response_payload, &mut response)?;
        log_message(&route, "response", &response);

        Ok(response)
    }
}

fn log_message(route: &CommandRoute, direction: &str, message: &Message) {
    if let Ok(json) = serde_json::to_string(message) {
        debug!(
            application_id = route.application_id,
            version = route.application_data_version,
            direction,
            message = %json,
            "logical message"
        );
    }
}

fn log_payload(route: &CommandRoute, direction: &str, payload: &str) {
    debug!(
        application_id = route.application_id,
        version = route.application_data_version,
        direction,
        payload,
        "wire payload"
    );
}

fn md5_hex(value: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
