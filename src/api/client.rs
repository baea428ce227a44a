//! Attendance operations against the backend.
//!
//! [`AttendanceClient`] validates the backend address, authenticates a user
//! and then reads or toggles that user's attendance. The session returned by
//! [`AttendanceClient::authenticate`] is passed explicitly to every later
//! call; the client itself keeps nothing between calls.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;
use xmlrpc::Value;

use super::error::{ApiError, TransportError};
use super::transport::{self, as_id, field, Endpoint, Transport, XmlRpcProxy};
use crate::constants;
use crate::state::{self, AttendanceRecord, AttendanceState, EmployeeStatus, Reason};

/// An authenticated user, valid for the current process only.
#[derive(Clone)]
pub struct Session {
    uid: i32,
    db: String,
    password: String,
}

impl Session {
    pub(crate) fn new(uid: i32, db: &str, password: &str) -> Self {
        Self {
            uid,
            db: db.to_string(),
            password: password.to_string(),
        }
    }

    /// User id returned by the backend.
    #[must_use]
    pub fn uid(&self) -> i32 {
        self.uid
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

/// Result of a state-changing request.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The employee already was in the requested state; nothing was sent.
    Unchanged(AttendanceState),
    /// The attendance was registered.
    Done(T),
}

/// A completed check-out and, if one was requested, what became of its reason.
#[derive(Debug)]
pub struct CheckOut {
    pub attendance: AttendanceRecord,
    pub reason: Option<ReasonOutcome>,
}

/// Result of tagging a check-out with a reason.
///
/// None of these undo the check-out itself.
#[derive(Debug)]
pub enum ReasonOutcome {
    /// The attendance now carries exactly this reason.
    Set(i32),
    /// The backend answered the write with `false`.
    Rejected(i32),
    /// The reason is unknown, or a call of the reason step failed.
    Failed(ApiError),
}

/// Client for the attendance operations of one backend.
#[derive(Debug)]
pub struct AttendanceClient<T = XmlRpcProxy> {
    address: String,
    common: T,
    object: T,
}

impl AttendanceClient {
    /// Validates `address` and binds XML-RPC proxies with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a malformed address, before any
    /// network activity.
    pub fn new(address: &str) -> Result<Self, ApiError> {
        Self::with_timeout(
            address,
            Duration::from_secs(constants::HTTP_TIMEOUT_SECS),
        )
    }

    /// Same as [`AttendanceClient::new`] with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a malformed address, or
    /// [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn with_timeout(address: &str, timeout: Duration) -> Result<Self, ApiError> {
        validate_address(address)?;
        let http = transport::http_client(timeout)
            .map_err(|source| ApiError::transport("connect", source))?;

        Ok(Self {
            address: address.to_string(),
            common: XmlRpcProxy::new(http.clone(), address, Endpoint::Common),
            object: XmlRpcProxy::new(http, address, Endpoint::Object),
        })
    }
}

impl<T: Transport> AttendanceClient<T> {
    /// Validates `address` and uses the given proxies for the two endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a malformed address.
    pub fn with_transports(address: &str, common: T, object: T) -> Result<Self, ApiError> {
        validate_address(address)?;
        Ok(Self {
            address: address.to_string(),
            common,
            object,
        })
    }

    /// The validated backend address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Logs in. Rejected credentials are `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the call fails.
    pub fn authenticate(
        &self,
        db: &str,
        username: &str,
        password: &str,
    ) -> Result<Option<Session>, ApiError> {
        const OPERATION: &str = "Login";

        debug!(address = %self.address, db, username, "authenticating");
        let response = self
            .common
            .call(
                constants::METHOD_AUTHENTICATE,
                vec![
                    Value::String(db.to_string()),
                    Value::String(username.to_string()),
                    Value::String(password.to_string()),
                    Value::Struct(BTreeMap::new()),
                ],
            )
            .map_err(|source| ApiError::transport(OPERATION, source))?;

        match response {
            Value::Bool(false) => {
                warn!(db, username, "credentials rejected");
                Ok(None)
            }
            other => match as_id(&other) {
                Some(uid) if uid > 0 => {
                    info!(uid, username, "authenticated");
                    Ok(Some(Session::new(uid, db, password)))
                }
                Some(_) => {
                    warn!(db, username, "credentials rejected");
                    Ok(None)
                }
                None => Err(ApiError::transport(
                    OPERATION,
                    TransportError::malformed("a user id or false"),
                )),
            },
        }
    }

    /// Reads the attendance state of the employee linked to the session user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AmbiguousResult`] unless exactly one employee
    /// matches, [`ApiError::UnexpectedState`] for an unknown state value, or
    /// [`ApiError::Transport`] if the query fails.
    pub fn attendance_state(&self, session: &Session) -> Result<EmployeeStatus, ApiError> {
        const OPERATION: &str = "Attendance state query";

        let domain = Value::Array(vec![Value::Array(vec![
            Value::String(constants::FIELD_USER_ID.to_string()),
            Value::String("=".to_string()),
            Value::Int(session.uid),
        ])]);
        let response = self.execute_kw(
            session,
            OPERATION,
            constants::MODEL_EMPLOYEE,
            constants::METHOD_SEARCH_READ,
            vec![domain],
            Some(fields(&[constants::FIELD_ATTENDANCE_STATE])),
        )?;

        let records: &[Value] = response.as_array().ok_or_else(|| {
            ApiError::transport(OPERATION, TransportError::malformed("a list of employees"))
        })?;
        let [record] = records else {
            error!(uid = session.uid, found = records.len(), "employee lookup is ambiguous");
            return Err(ApiError::AmbiguousResult {
                uid: session.uid,
                found: records.len(),
            });
        };

        let malformed =
            || ApiError::transport(OPERATION, TransportError::malformed("an employee record"));
        let employee_id = field(record, "id").and_then(as_id).ok_or_else(malformed)?;
        let raw_state = field(record, constants::FIELD_ATTENDANCE_STATE)
            .and_then(Value::as_str)
            .ok_or_else(malformed)?;
        let state = raw_state
            .parse::<AttendanceState>()
            .map_err(ApiError::UnexpectedState)?;

        debug!(employee_id, state = state.as_str(), "attendance state");
        Ok(EmployeeStatus { employee_id, state })
    }

    /// Checks in unless already checked in.
    ///
    /// # Errors
    ///
    /// Propagates errors of the state query and of the registration call.
    /// A failed registration is not compensated.
    pub fn check_in(&self, session: &Session) -> Result<Outcome<AttendanceRecord>, ApiError> {
        let status = self.attendance_state(session)?;
        if status.state == AttendanceState::CheckedIn {
            info!(employee_id = status.employee_id, "already checked in, skipping");
            return Ok(Outcome::Unchanged(status.state));
        }

        let attendance = self.register_attendance(session, status.employee_id, "Check in")?;
        info!(employee_id = status.employee_id, attendance_id = attendance.id, "checked in");
        Ok(Outcome::Done(attendance))
    }

    /// Checks out unless already checked out, then applies `reason` if given.
    ///
    /// The reason step runs only after a successful check-out and its result
    /// is reported in [`CheckOut::reason`].
    ///
    /// # Errors
    ///
    /// Propagates errors of the state query and of the registration call.
    pub fn check_out(
        &self,
        session: &Session,
        reason: Option<i32>,
    ) -> Result<Outcome<CheckOut>, ApiError> {
        let status = self.attendance_state(session)?;
        if status.state == AttendanceState::CheckedOut {
            info!(employee_id = status.employee_id, "not checked in, skipping");
            return Ok(Outcome::Unchanged(status.state));
        }

        let attendance = self.register_attendance(session, status.employee_id, "Check out")?;
        info!(employee_id = status.employee_id, attendance_id = attendance.id, "checked out");

        let reason = reason.map(|reason_id| self.apply_reason(session, attendance.id, reason_id));
        Ok(Outcome::Done(CheckOut { attendance, reason }))
    }

    /// Fetches the full reason catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the query fails.
    pub fn list_reasons(&self, session: &Session) -> Result<Vec<Reason>, ApiError> {
        const OPERATION: &str = "Reason listing";

        let response = self.execute_kw(
            session,
            OPERATION,
            constants::MODEL_ATTENDANCE_REASON,
            constants::METHOD_SEARCH_READ,
            vec![Value::Array(Vec::new())],
            Some(fields(&[constants::FIELD_NAME])),
        )?;

        let malformed =
            || ApiError::transport(OPERATION, TransportError::malformed("a list of reasons"));
        response
            .as_array()
            .ok_or_else(malformed)?
            .iter()
            .map(|record| {
                let id = field(record, "id").and_then(as_id).ok_or_else(malformed)?;
                // an empty name comes back as `false`
                let name = match field(record, constants::FIELD_NAME) {
                    Some(Value::String(name)) => name.clone(),
                    Some(Value::Bool(false)) => String::new(),
                    _ => return Err(malformed()),
                };
                Ok(Reason { id, name })
            })
            .collect()
    }

    /// Ids of the reason catalog, without reading any other field.
    fn reason_ids(&self, session: &Session) -> Result<Vec<i32>, ApiError> {
        const OPERATION: &str = "Reason lookup";

        let response = self.execute_kw(
            session,
            OPERATION,
            constants::MODEL_ATTENDANCE_REASON,
            constants::METHOD_SEARCH_READ,
            vec![Value::Array(Vec::new())],
            Some(fields(&["id"])),
        )?;

        let malformed =
            || ApiError::transport(OPERATION, TransportError::malformed("a list of reason ids"));
        response
            .as_array()
            .ok_or_else(malformed)?
            .iter()
            .map(|record| field(record, "id").and_then(as_id).ok_or_else(malformed))
            .collect()
    }

    /// Replaces the reasons of an attendance with exactly `reason_id`.
    ///
    /// Returns the backend's answer to the write.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the write fails.
    pub fn set_attendance_reason(
        &self,
        session: &Session,
        attendance_id: i32,
        reason_id: i32,
    ) -> Result<bool, ApiError> {
        const OPERATION: &str = "Setting the attendance reason";

        let mut values = BTreeMap::new();
        values.insert(
            constants::FIELD_ATTENDANCE_REASONS.to_string(),
            transport::replace_relation(&[reason_id]),
        );
        let response = self.execute_kw(
            session,
            OPERATION,
            constants::MODEL_ATTENDANCE,
            constants::METHOD_WRITE,
            vec![
                Value::Array(vec![Value::Int(attendance_id)]),
                Value::Struct(values),
            ],
            None,
        )?;

        response.as_bool().ok_or_else(|| {
            ApiError::transport(OPERATION, TransportError::malformed("a boolean"))
        })
    }

    /// Runs the reason step of a check-out; never fails the check-out itself.
    fn apply_reason(&self, session: &Session, attendance_id: i32, reason_id: i32) -> ReasonOutcome {
        let known = match self.reason_ids(session) {
            Ok(ids) => ids,
            Err(e) => {
                error!(attendance_id, reason_id, error = %e, "reason catalog unavailable");
                return ReasonOutcome::Failed(e);
            }
        };
        if !known.contains(&reason_id) {
            warn!(reason_id, "unknown attendance reason");
            return ReasonOutcome::Failed(ApiError::UnknownReason(reason_id));
        }

        match self.set_attendance_reason(session, attendance_id, reason_id) {
            Ok(true) => {
                info!(attendance_id, reason_id, "attendance reason set");
                ReasonOutcome::Set(reason_id)
            }
            Ok(false) => {
                warn!(attendance_id, reason_id, "attendance reason rejected");
                ReasonOutcome::Rejected(reason_id)
            }
            Err(e) => {
                error!(attendance_id, reason_id, error = %e, "attendance reason not set");
                ReasonOutcome::Failed(e)
            }
        }
    }

    /// Issues "register attendance"; the backend toggles the current state.
    fn register_attendance(
        &self,
        session: &Session,
        employee_id: i32,
        operation: &'static str,
    ) -> Result<AttendanceRecord, ApiError> {
        let response = self.execute_kw(
            session,
            operation,
            constants::MODEL_EMPLOYEE,
            constants::METHOD_ATTENDANCE_MANUAL,
            vec![Value::Int(employee_id), Value::Bool(false)],
            None,
        )?;

        let record = field(&response, "action")
            .and_then(|action| field(action, "attendance"))
            .ok_or_else(|| {
                ApiError::transport(operation, TransportError::malformed("an attendance action"))
            })?;
        let id = field(record, "id").and_then(as_id).ok_or_else(|| {
            ApiError::transport(operation, TransportError::malformed("an attendance id"))
        })?;

        Ok(AttendanceRecord {
            id,
            check_in: timestamp(record, "check_in"),
            check_out: timestamp(record, "check_out"),
        })
    }

    fn execute_kw(
        &self,
        session: &Session,
        operation: &'static str,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Option<Value>,
    ) -> Result<Value, ApiError> {
        debug!(model, method, uid = session.uid, "execute_kw");

        let mut params = vec![
            Value::String(session.db.clone()),
            Value::Int(session.uid),
            Value::String(session.password.clone()),
            Value::String(model.to_string()),
            Value::String(method.to_string()),
            Value::Array(args),
        ];
        params.extend(kwargs);

        self.object
            .call(constants::METHOD_EXECUTE_KW, params)
            .map_err(|source| ApiError::transport(operation, source))
    }
}

/// Keyword arguments restricting a `search_read` to `names`.
fn fields(names: &[&str]) -> Value {
    let mut kwargs = BTreeMap::new();
    kwargs.insert(
        "fields".to_string(),
        Value::Array(names.iter().map(|name| Value::String((*name).to_string())).collect()),
    );
    Value::Struct(kwargs)
}

/// Datetime field of a record; `false` or an unparsable value reads as absent.
fn timestamp(record: &Value, name: &str) -> Option<chrono::NaiveDateTime> {
    field(record, name)
        .and_then(Value::as_str)
        .and_then(state::parse_timestamp)
}

/// Accepts `http(s)://host[...]` without a trailing slash.
fn validate_address(address: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::Validation(address.to_string());

    if address.trim() != address || address.ends_with('/') {
        return Err(invalid());
    }
    let (scheme, rest) = address.split_once("://").ok_or_else(invalid)?;
    if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        || rest.is_empty()
        || rest.starts_with('/')
    {
        return Err(invalid());
    }

    let url = Url::parse(address).map_err(|_| invalid())?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}
