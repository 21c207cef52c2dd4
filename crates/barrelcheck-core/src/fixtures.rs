//! Request payloads, response schemas and expected messages
//!
//! Valid payloads are typed; deliberately broken ones are explicit JSON
//! literals so each shape is visible where it is defined.

use std::collections::HashMap;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::equality::Record;

/// Title of the 400 body produced by the service's model validation.
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";
/// Title of the 415 body.
pub const UNSUPPORTED_MEDIA_TYPE_TITLE: &str = "Unsupported Media Type";
/// Content type of a successful create.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Per-field messages expected in the `errors` object of a 400 body.
pub mod messages {
    pub const QR_REQUIRED: &str = "The Qr fiels is required";
    pub const RFID_REQUIRED: &str = "The Rfid field is required.";
    pub const NFC_REQUIRED: &str = "The Nfc field is required.";
    pub const BARREL_ID_REQUIRED: &str = "The barrel field is required.";
    pub const DIRT_LEVEL_REQUIRED: &str = "The dirtLevel field is required.";
    pub const WEIGHT_REQUIRED: &str = "The weight field is required.";
    pub const INVALID_UUID: &str = "invalid uuid value";
    pub const RFID_NOT_STRING: &str = "rfid must be string";
}

/// Body of a barrel create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBarrel {
    pub id: String,
    pub qr: String,
    pub rfid: String,
    pub nfc: String,
}

impl NewBarrel {
    /// A valid barrel with a fresh v4 id.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            qr: format!("qr-{}", random_string(9)),
            rfid: format!("rfid-{}", random_string(7)),
            nfc: format!("nfc-{}", random_string(8)),
        }
    }

    /// The payload as a record, for field comparison against responses.
    #[must_use]
    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

/// Body of a measurement create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeasurement {
    pub id: String,
    pub barrel_id: String,
    pub dirt_level: f64,
    pub weight: f64,
}

impl NewMeasurement {
    /// A valid measurement for `barrel_id` with a fresh v4 id.
    #[must_use]
    pub fn valid(barrel_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            barrel_id: barrel_id.to_string(),
            dirt_level: 1.0,
            weight: 20.0,
        }
    }

    #[must_use]
    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

fn to_record<T: Serialize>(payload: &T) -> Record {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

/// Barrel payloads that the service must reject.
pub mod invalid_barrel {
    use super::*;

    /// `rfid` left out.
    #[must_use]
    pub fn missing_values() -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "qr": "ddd",
            "nfc": "bbbbbbbb"
        })
    }

    /// `qr` present but empty.
    #[must_use]
    pub fn boundary_values() -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "qr": "",
            "rfid": "ccccccc",
            "nfc": "bbbbbbbb"
        })
    }

    /// `id` that is not a UUID.
    #[must_use]
    pub fn wrong_uuid() -> Value {
        json!({
            "id": "x".repeat(71),
            "qr": "a",
            "rfid": "d",
            "nfc": "b"
        })
    }

    /// Numbers where strings are expected, `qr` misspelled.
    #[must_use]
    pub fn invalid_type() -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "gr": 2,
            "rfid": 3,
            "nfc": "test_nfc_v"
        })
    }

    #[must_use]
    pub fn empty() -> Value {
        json!({})
    }
}

/// Measurement payloads that the service must reject.
pub mod invalid_measurement {
    use super::*;

    /// `weight` left out.
    #[must_use]
    pub fn missing_attr(barrel_id: &str) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "barrelId": barrel_id,
            "dirtLevel": 1.0
        })
    }

    #[must_use]
    pub fn invalid_type(barrel_id: &str) -> Value {
        json!({
            "id": 12,
            "barrelId": barrel_id,
            "dirtLevel": 1,
            "weight": "aaaa"
        })
    }

    /// Empty `barrelId` with zero readings.
    #[must_use]
    pub fn validation_msgs() -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "barrelId": "",
            "dirtLevel": 0.0,
            "weight": 0.0
        })
    }

    #[must_use]
    pub fn invalid_barrel_id() -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "barrelId": "x".repeat(30),
            "dirtLevel": 1.0,
            "weight": 10.0
        })
    }

    #[must_use]
    pub fn negative_double(barrel_id: &str) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "barrelId": barrel_id,
            "dirtLevel": -1.0,
            "weight": -10.0
        })
    }
}

/// Response schema of a barrel.
#[must_use]
pub fn barrel_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "format": "uuid"},
            "qr": {"type": "string", "minLength": 1},
            "rfid": {"type": "string", "minLength": 1},
            "nfc": {"type": "string", "minLength": 1}
        },
        "required": ["qr", "rfid", "nfc"]
    })
}

/// Response schema of a measurement.
#[must_use]
pub fn measurement_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "format": "uuid"},
            "barrelId": {"type": "string", "format": "uuid"},
            "dirtLevel": {"type": "number"},
            "weight": {"type": "number"}
        },
        "required": ["barrelId", "dirtLevel", "weight"]
    })
}

/// Headers sent by well-formed requests.
#[must_use]
pub fn default_headers() -> HashMap<String, String> {
    HashMap::from([("Accept".to_string(), "application/json".to_string())])
}

/// Headers the service must reject.
#[must_use]
pub fn invalid_headers() -> HashMap<String, String> {
    HashMap::from([("aaaaa".to_string(), "application/xxxx".to_string())])
}

/// Random ASCII alphanumeric string.
#[must_use]
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
