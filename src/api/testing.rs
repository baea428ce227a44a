//! Scripted in-memory transport for exercising the client without a backend.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use xmlrpc::Value;

use super::client::AttendanceClient;
use super::error::TransportError;
use super::transport::{as_id, Endpoint, Transport};
use crate::constants;

/// A call as received by the scripted backend.
#[derive(Debug)]
pub struct Call {
    pub endpoint: Endpoint,
    pub method: String,
    pub params: Vec<Value>,
}

impl Call {
    /// Model targeted by an `execute_kw` call.
    pub fn model(&self) -> Option<&str> {
        self.execute_kw_param(3)
    }

    /// Model method invoked by an `execute_kw` call.
    pub fn object_method(&self) -> Option<&str> {
        self.execute_kw_param(4)
    }

    fn execute_kw_param(&self, index: usize) -> Option<&str> {
        if self.method != constants::METHOD_EXECUTE_KW {
            return None;
        }
        self.params.get(index).and_then(Value::as_str)
    }
}

/// Shared call log and reply queue behind both endpoint proxies.
#[derive(Clone, Default)]
pub struct Backend {
    calls: Rc<RefCell<Vec<Call>>>,
    replies: Rc<RefCell<VecDeque<Result<Value, TransportError>>>>,
}

impl Backend {
    /// Queues the response to the next call.
    pub fn reply(&self, value: Value) {
        self.replies.borrow_mut().push_back(Ok(value));
    }

    /// Queues a transport failure for the next call.
    pub fn fail(&self, message: &str) {
        self.replies
            .borrow_mut()
            .push_back(Err(TransportError::new(message)));
    }

    pub fn calls(&self) -> Ref<'_, Vec<Call>> {
        self.calls.borrow()
    }

    /// Number of `execute_kw` calls that invoked `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.object_method() == Some(method))
            .count()
    }

    pub fn proxy(&self, endpoint: Endpoint) -> ScriptedProxy {
        ScriptedProxy {
            endpoint,
            backend: self.clone(),
        }
    }

    pub fn client(&self, address: &str) -> AttendanceClient<ScriptedProxy> {
        AttendanceClient::with_transports(
            address,
            self.proxy(Endpoint::Common),
            self.proxy(Endpoint::Object),
        )
        .expect("valid test address")
    }
}

/// Endpoint proxy that records calls and answers from the [`Backend`] queue.
pub struct ScriptedProxy {
    endpoint: Endpoint,
    backend: Backend,
}

impl std::fmt::Debug for ScriptedProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedProxy")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Transport for ScriptedProxy {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        self.backend.calls.borrow_mut().push(Call {
            endpoint: self.endpoint,
            method: method.to_string(),
            params,
        });
        self.backend
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted reply")))
    }
}

fn record(entries: Vec<(&str, Value)>) -> Value {
    Value::Struct(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn datetime_or_false(raw: Option<&str>) -> Value {
    raw.map_or(Value::Bool(false), |s| Value::String(s.to_string()))
}

/// `search_read` answer for `hr.employee`.
pub fn employees(rows: &[(i32, &str)]) -> Value {
    Value::Array(
        rows.iter()
            .map(|(id, state)| {
                record(vec![
                    ("id", Value::Int(*id)),
                    ("attendance_state", Value::String((*state).to_string())),
                ])
            })
            .collect(),
    )
}

/// `search_read` answer for `hr.attendance.reason`.
pub fn reasons(rows: &[(i32, &str)]) -> Value {
    let rows: Vec<_> = rows
        .iter()
        .map(|(id, name)| (*id, Value::String((*name).to_string())))
        .collect();
    reasons_with_names(&rows)
}

/// Same as [`reasons`] with raw `name` values, e.g. `false` for an empty name.
pub fn reasons_with_names(rows: &[(i32, Value)]) -> Value {
    Value::Array(
        rows.iter()
            .map(|(id, name)| record(vec![("id", Value::Int(*id)), ("name", name.clone())]))
            .collect(),
    )
}

/// `attendance_manual` answer carrying the touched attendance.
pub fn manual_response(id: i32, check_in: Option<&str>, check_out: Option<&str>) -> Value {
    let attendance = record(vec![
        ("id", Value::Int(id)),
        ("check_in", datetime_or_false(check_in)),
        ("check_out", datetime_or_false(check_out)),
    ]);
    record(vec![("action", record(vec![("attendance", attendance)]))])
}

/// Applies many-to-many relation commands the way the backend does.
///
/// Handles unlink (3), link (4), clear (5) and replace (6).
pub fn apply_relation_commands(existing: &BTreeSet<i32>, commands: &Value) -> BTreeSet<i32> {
    let mut links = existing.clone();
    for command in commands.as_array().into_iter().flatten() {
        let Some(parts) = command.as_array() else {
            continue;
        };
        match parts.first().and_then(as_id) {
            Some(3) => {
                if let Some(id) = parts.get(1).and_then(as_id) {
                    links.remove(&id);
                }
            }
            Some(4) => {
                if let Some(id) = parts.get(1).and_then(as_id) {
                    links.insert(id);
                }
            }
            Some(5) => links.clear(),
            Some(6) => {
                links = parts
                    .get(2)
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(as_id)
                    .collect();
            }
            _ => {}
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_command_keeps_existing() {
        let existing = BTreeSet::from([5]);
        let link = Value::Array(vec![Value::Array(vec![Value::Int(4), Value::Int(7)])]);
        assert_eq!(
            apply_relation_commands(&existing, &link),
            BTreeSet::from([5, 7])
        );
    }

    #[test]
    fn test_unanswered_call_fails() {
        let backend = Backend::default();
        let proxy = backend.proxy(Endpoint::Object);
        assert!(proxy.call("execute_kw", Vec::new()).is_err());
        assert_eq!(backend.calls().len(), 1);
    }
}
