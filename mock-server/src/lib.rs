use std::collections::BTreeMap;

use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const AUTH_FAILED: i64 = 4;
pub const NO_ACTION: i64 = 2;
pub const UNKNOWN_ACTION: i64 = 3;

/// The body every action answers with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "ERRORARRAY")]
    pub errors: Vec<ErrorEntry>,
    #[serde(rename = "ACTION")]
    pub action: String,
    #[serde(rename = "DATA")]
    pub data: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(rename = "ERRORCODE")]
    pub code: i64,
    #[serde(rename = "ERRORMESSAGE")]
    pub message: String,
}

impl Envelope {
    fn ok(action: &str, data: Value) -> Self {
        Self {
            errors: Vec::new(),
            action: action.to_string(),
            data,
        }
    }

    fn error(action: &str, code: i64, message: &str) -> Self {
        Self {
            errors: vec![ErrorEntry {
                code,
                message: message.to_string(),
            }],
            action: action.to_string(),
            data: json!({}),
        }
    }
}

pub fn app() -> Router {
    Router::new().route("/", get(dispatch))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Every action is a `GET /` with the action and key in the query string.
/// Failures are reported in the envelope, always with HTTP 200.
async fn dispatch(Query(params): Query<BTreeMap<String, String>>) -> Json<Envelope> {
    let action = params.get("api_action").map(String::as_str).unwrap_or("");
    tracing::info!(action, params = params.len(), "api call");

    if params.get("api_key").map_or(true, |key| key.is_empty()) {
        return Json(Envelope::error(action, AUTH_FAILED, "Authentication failed"));
    }

    let envelope = match action {
        "" => Envelope::error(action, NO_ACTION, "No action was requested"),
        "test.echo" => Envelope::ok(action, echo(&params)),
        "avail.datacenters" => Envelope::ok(action, datacenters()),
        "avail.distributions" => Envelope::ok(action, distributions()),
        "avail.kernels" => Envelope::ok(action, kernels()),
        "avail.linodeplans" => Envelope::ok(action, linode_plans()),
        _ => Envelope::error(action, UNKNOWN_ACTION, "The requested class does not exist"),
    };
    Json(envelope)
}

/// Echo non-reserved parameters back with upper-cased names, the way the
/// real API spells its fields.
fn echo(params: &BTreeMap<String, String>) -> Value {
    let data: Map<String, Value> = params
        .iter()
        .filter(|(name, _)| name.as_str() != "api_key" && name.as_str() != "api_action")
        .map(|(name, value)| (name.to_uppercase(), Value::String(value.clone())))
        .collect();
    Value::Object(data)
}

fn datacenters() -> Value {
    json!([
        {"DATACENTERID": 2, "LOCATION": "Dallas, TX, USA", "ABBR": "dallas"},
        {"DATACENTERID": 3, "LOCATION": "Fremont, CA, USA", "ABBR": "fremont"},
        {"DATACENTERID": 4, "LOCATION": "Atlanta, GA, USA", "ABBR": "atlanta"},
        {"DATACENTERID": 6, "LOCATION": "Newark, NJ, USA", "ABBR": "newark"}
    ])
}

fn distributions() -> Value {
    json!([
        {
            "DISTRIBUTIONID": 112,
            "LABEL": "Arch Linux 2013.06",
            "IS64BIT": 1,
            "MINIMAGESIZE": 500,
            "REQUIRESPVOPSKERNEL": 1,
            "CREATE_DT": "2013-06-06 02:45:11.0"
        },
        {
            "DISTRIBUTIONID": 130,
            "LABEL": "Debian 7",
            "IS64BIT": 1,
            "MINIMAGESIZE": 600,
            "REQUIRESPVOPSKERNEL": 1,
            "CREATE_DT": "2013-05-08 11:31:32.0"
        }
    ])
}

fn kernels() -> Value {
    json!([
        {"KERNELID": 138, "LABEL": "Latest 64 bit", "ISXEN": 1, "ISKVM": 1, "ISPVOPS": 1},
        {"KERNELID": 137, "LABEL": "Latest 32 bit", "ISXEN": 1, "ISKVM": 0, "ISPVOPS": 1}
    ])
}

fn linode_plans() -> Value {
    json!([
        {
            "PLANID": 1,
            "LABEL": "Linode 1024",
            "PRICE": 10.0,
            "HOURLY": 0.015,
            "RAM": 1024,
            "DISK": 24,
            "XFER": 2000,
            "CORES": 1,
            "AVAIL": {"2": 500, "3": 500, "4": 500, "6": 0}
        }
    ])
}
