use serde::{Deserialize, Deserializer, Serialize};

/// One sensor reading, extracted from a broadcast payload.
///
/// Immutable once built. The store owns identity; the relay only ever
/// compares `movement_detected`.
///
/// Wire shape is the store's: `{"Location": .., "MachineName": .., "MovementDetected": ..}`.
/// camelCase keys are accepted on input. Store rows may carry `null` or
/// omit a field; those read back as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    #[serde(alias = "location", default, deserialize_with = "null_as_empty")]
    location: String,
    #[serde(alias = "machineName", default, deserialize_with = "null_as_empty")]
    machine_name: String,
    #[serde(alias = "movementDetected", default, deserialize_with = "null_as_empty")]
    movement_detected: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    pub fn new(
        location: impl Into<String>,
        machine_name: impl Into<String>,
        movement_detected: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            machine_name: machine_name.into(),
            movement_detected: movement_detected.into(),
        }
    }

    /// Sensor placement label, e.g. `"Location:Teachers room"`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Reporting device, e.g. `"Machine:armv6l"`.
    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    /// Timestamp (or firmware sentinel) of the last detected motion.
    pub fn movement_detected(&self) -> &str {
        &self.movement_detected
    }
}

/// Someone who wants an email for every new reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subscriber {
    #[serde(alias = "emailAddress")]
    pub email_address: String,
}

/// Outgoing notification email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Build the notification for `record` addressed to `to`.
    pub fn for_record(to: impl Into<String>, record: &Record) -> Self {
        Self {
            to: to.into(),
            subject: format!("Movement was detected from machine:{}", record.machine_name),
            body: format!("The message received:{}", record.movement_detected),
        }
    }
}
