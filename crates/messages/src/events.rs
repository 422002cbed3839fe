//! Run-lifecycle and STF event payloads.

use daqsim_types::RunId;
use serde::{Deserialize, Serialize};

/// Beam and detector conditions announced with `run_imminent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConditions {
    /// Beam energy, e.g. `5 GeV`.
    pub beam_energy: String,
    /// Solenoid field, e.g. `1.5T`.
    pub magnetic_field: String,
    /// Detector configuration name.
    pub detector_config: String,
    /// Bunch crossing structure.
    pub bunch_structure: String,
}

impl Default for RunConditions {
    fn default() -> Self {
        Self {
            beam_energy: "5 GeV".to_string(),
            magnetic_field: "1.5T".to_string(),
            detector_config: "physics".to_string(),
            bunch_structure: "216x216".to_string(),
        }
    }
}

/// Metadata describing one STF, written as the artifact file body.
///
/// These are the pre-checksum fields: the checksum and size only exist
/// after the file has been written, so they live on the `stf_gen` event
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StfMetadata {
    /// Run this STF belongs to.
    pub run_id: RunId,
    /// DAQ state at build time.
    pub state: String,
    /// DAQ substate at build time.
    pub substate: String,
    /// Artifact filename.
    pub filename: String,
    /// Build start, twenty-digit wall-clock form.
    pub start: String,
    /// Build end, twenty-digit wall-clock form.
    pub end: String,
}

impl StfMetadata {
    /// Serialize the metadata to its on-disk JSON form.
    pub fn to_json(&self) -> Vec<u8> {
        // Infallible: no non-string keys, no non-finite floats.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Events published on [`crate::EVENT_TOPIC`].
///
/// The `msg_type` tag and the field names below are stable; downstream
/// agents dispatch on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum Event {
    /// A run is about to start.
    RunImminent {
        /// Request sequence number (always 1 for now).
        req_id: u32,
        /// The upcoming run.
        run_id: RunId,
        /// Announcement time, fourteen-digit form.
        timestamp: String,
        /// Dataset the run will write into.
        dataset: String,
        /// Announced beam and detector conditions.
        run_conditions: RunConditions,
    },

    /// The run has started.
    StartRun {
        /// Request sequence number.
        req_id: u32,
        /// The running run.
        run_id: RunId,
        /// Start time, fourteen-digit form.
        ts: String,
    },

    /// The run has ended.
    EndRun {
        /// Request sequence number.
        req_id: u32,
        /// The finished run.
        run_id: RunId,
        /// End time, fourteen-digit form.
        ts: String,
    },

    /// One STF was generated.
    StfGen {
        /// Request sequence number.
        req_id: u32,
        /// Run the STF belongs to.
        run_id: RunId,
        /// DAQ state at build time.
        state: String,
        /// DAQ substate at build time.
        substate: String,
        /// Artifact filename.
        filename: String,
        /// Build start, twenty-digit form.
        start: String,
        /// Build end, twenty-digit form.
        end: String,
        /// `ad:<adler32>`, or `ad:0` when no file was written.
        checksum: String,
        /// File size in bytes, 0 when no file was written.
        size: u64,
    },
}

impl Event {
    /// Build a `run_imminent` event.
    pub fn run_imminent(
        run_id: RunId,
        timestamp: String,
        dataset: String,
        run_conditions: RunConditions,
    ) -> Self {
        Event::RunImminent {
            req_id: 1,
            run_id,
            timestamp,
            dataset,
            run_conditions,
        }
    }

    /// Build a `start_run` event.
    pub fn start_run(run_id: RunId, ts: String) -> Self {
        Event::StartRun {
            req_id: 1,
            run_id,
            ts,
        }
    }

    /// Build an `end_run` event.
    pub fn end_run(run_id: RunId, ts: String) -> Self {
        Event::EndRun {
            req_id: 1,
            run_id,
            ts,
        }
    }

    /// Build an `stf_gen` event from metadata plus post-write facts.
    pub fn stf_gen(metadata: StfMetadata, checksum: String, size: u64) -> Self {
        Event::StfGen {
            req_id: 1,
            run_id: metadata.run_id,
            state: metadata.state,
            substate: metadata.substate,
            filename: metadata.filename,
            start: metadata.start,
            end: metadata.end,
            checksum,
            size,
        }
    }

    /// Serialize the event to its wire JSON form.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn as_value(event: &Event) -> Value {
        serde_json::from_slice(&event.to_json()).unwrap()
    }

    #[test]
    fn test_run_imminent_wire_shape() {
        let event = Event::run_imminent(
            RunId(17),
            "20250115103000".into(),
            RunId(17).dataset(),
            RunConditions::default(),
        );

        assert_eq!(
            as_value(&event),
            json!({
                "msg_type": "run_imminent",
                "req_id": 1,
                "run_id": 17,
                "timestamp": "20250115103000",
                "dataset": "run.000017.run",
                "run_conditions": {
                    "beam_energy": "5 GeV",
                    "magnetic_field": "1.5T",
                    "detector_config": "physics",
                    "bunch_structure": "216x216"
                }
            })
        );
    }

    #[test]
    fn test_start_and_end_run_wire_shape() {
        let start = as_value(&Event::start_run(RunId(3), "20250115103000".into()));
        assert_eq!(start["msg_type"], "start_run");
        assert_eq!(start["run_id"], 3);
        assert_eq!(start["ts"], "20250115103000");

        let end = as_value(&Event::end_run(RunId(3), "20250115113000".into()));
        assert_eq!(end["msg_type"], "end_run");
        assert_eq!(end["ts"], "20250115113000");
    }

    #[test]
    fn test_stf_gen_wire_shape() {
        let metadata = StfMetadata {
            run_id: RunId(42),
            state: "RUN".into(),
            substate: "PHYSICS".into(),
            filename: RunId(42).stf_filename(0),
            start: "20250115103000000000".into(),
            end: "20250115103001500000".into(),
        };
        let event = Event::stf_gen(metadata, "ad:123456".into(), 167);

        assert_eq!(
            as_value(&event),
            json!({
                "msg_type": "stf_gen",
                "req_id": 1,
                "run_id": 42,
                "state": "RUN",
                "substate": "PHYSICS",
                "filename": "run.000042.000000.stf",
                "start": "20250115103000000000",
                "end": "20250115103001500000",
                "checksum": "ad:123456",
                "size": 167
            })
        );
    }

    #[test]
    fn test_metadata_file_body_has_no_checksum_fields() {
        let metadata = StfMetadata {
            run_id: RunId(1),
            state: "RUN".into(),
            substate: "PHYSICS".into(),
            filename: "run.000001.000000.stf".into(),
            start: "20250115103000000000".into(),
            end: "20250115103001000000".into(),
        };

        let value: Value = serde_json::from_slice(&metadata.to_json()).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("checksum"));
        assert!(!object.contains_key("size"));
        assert_eq!(object.len(), 6);
    }

    #[test]
    fn test_event_roundtrip() {
        let event = Event::start_run(RunId(9), "20250101000000".into());
        let back: Event = serde_json::from_slice(&event.to_json()).unwrap();
        assert_eq!(back, event);
    }
}
