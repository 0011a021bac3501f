//! # Query Wire Protocol
//!
//! One JSON object per WebSocket text frame, in both directions. A consumer
//! sends a request frame and receives zero or more response frames, one per
//! (player, statistic) pair; there is no end-of-stream marker, so clients
//! detect completion with a receive timeout.
//!
//! Response ordering within one request is deterministic: players in the
//! snapshot's iteration order, and for each player every catalog key in the
//! catalog's stable order, including keys the player has no value for yet
//! (reported as zero).

use std::collections::HashMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::store::PlayerRecord;

/// The only instruction currently understood.
pub const GET_ALL_PLAYERS_DATA: &str = "get_all_players_data";
/// Instruction tag on every response frame.
pub const ALL_PLAYERS_DATA: &str = "all_players_data";

/// Inbound frame: `{ "id": 7, "instruction": "get_all_players_data" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestFrame {
    pub id: i64,
    pub instruction: String,
}

/// One statistic sample of the response stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatSample {
    pub name: String,
    #[serde(rename = "type")]
    pub stat: &'static str,
    pub quantity: u64,
    /// Hour of day (0-23), rounded to the nearest full hour.
    pub time: u32,
}

/// Outbound frame; `id` echoes the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFrame {
    pub id: i64,
    pub instruction: &'static str,
    pub data: StatSample,
}

pub fn decode_request(text: &str) -> Result<RequestFrame, serde_json::Error> {
    serde_json::from_str(text)
}

/// Rounds a wall-clock time to its nearest full hour: minutes below 30 keep
/// the hour, 30 and above bump it, and hour 24 wraps back to 0.
pub fn rounded_hour(hour: u32, minute: u32) -> u32 {
    if minute < 30 {
        hour
    } else {
        (hour + 1) % 24
    }
}

/// The rounded hour for the local wall clock, computed once per request so
/// every frame of one response carries the same timestamp.
pub fn current_rounded_hour() -> u32 {
    let now = chrono::Local::now();
    rounded_hour(now.hour(), now.minute())
}

/// Builds the full response stream for one request against one snapshot,
/// enumerating `keys` (normally [`crate::catalog::all`]) per player. A player with
/// no value for a key yet is reported as zero, so every response is
/// complete per entity. Unknown instructions produce no frames.
pub fn respond(
    request: &RequestFrame,
    snapshot: &HashMap<String, PlayerRecord>,
    keys: &[&'static str],
    hour: u32,
) -> Vec<ResponseFrame> {
    if request.instruction != GET_ALL_PLAYERS_DATA {
        log::debug!("Ignoring unknown instruction '{}'", request.instruction);
        return Vec::new();
    }

    let mut frames = Vec::with_capacity(snapshot.len() * keys.len());
    for record in snapshot.values() {
        for key in keys {
            frames.push(ResponseFrame {
                id: request.id,
                instruction: ALL_PLAYERS_DATA,
                data: StatSample {
                    name: record.name.clone(),
                    stat: key,
                    quantity: record.stats.get(key).copied().unwrap_or(0),
                    time: hour,
                },
            });
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::store::RecordStore;

    fn request(id: i64, instruction: &str) -> RequestFrame {
        RequestFrame {
            id,
            instruction: instruction.to_string(),
        }
    }

    #[test]
    fn test_rounded_hour_edges() {
        assert_eq!(rounded_hour(11, 29), 11);
        assert_eq!(rounded_hour(11, 30), 12);
        assert_eq!(rounded_hour(11, 0), 11);
        assert_eq!(rounded_hour(11, 59), 12);
        // Midnight wrap.
        assert_eq!(rounded_hour(23, 30), 0);
        assert_eq!(rounded_hour(23, 29), 23);
    }

    #[test]
    fn test_respond_emits_catalog_in_order_per_player() {
        let store = RecordStore::new();
        store.upsert("Steve", Some("uuid-1"));
        store.set_metric("Steve", "minecraft:deaths", 4);

        let frames = respond(&request(7, GET_ALL_PLAYERS_DATA), &store.snapshot(), catalog::all(), 12);

        assert_eq!(frames.len(), catalog::all().len());
        for (frame, key) in frames.iter().zip(catalog::all()) {
            assert_eq!(frame.id, 7);
            assert_eq!(frame.instruction, ALL_PLAYERS_DATA);
            assert_eq!(frame.data.name, "Steve");
            assert_eq!(frame.data.stat, *key);
            assert_eq!(frame.data.time, 12);
        }
        assert_eq!(frames[0].data.quantity, 4);
        // Keys the player has no value for are reported as zero.
        assert_eq!(frames[1].data.quantity, 0);
    }

    #[test]
    fn test_respond_covers_every_player() {
        let store = RecordStore::new();
        store.upsert("Steve", Some("uuid-1"));
        store.upsert("Alex", Some("uuid-2"));

        let frames = respond(&request(1, GET_ALL_PLAYERS_DATA), &store.snapshot(), catalog::all(), 0);
        assert_eq!(frames.len(), 2 * catalog::all().len());
        // Same rounding computation for the whole response.
        assert!(frames.iter().all(|f| f.data.time == 0));
    }

    #[test]
    fn test_respond_emits_one_frame_per_known_metric() {
        let store = RecordStore::new();
        store.upsert("Steve", Some("uuid-1"));
        store.set_metric("Steve", "minecraft:deaths", 4);
        store.set_metric("Steve", "minecraft:jump", 11);

        let keys: &[&'static str] = &["minecraft:deaths", "minecraft:jump"];
        let frames = respond(&request(7, GET_ALL_PLAYERS_DATA), &store.snapshot(), keys, 9);

        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.id == 7));
        assert!(frames.iter().all(|f| f.instruction == ALL_PLAYERS_DATA));
        assert_eq!(frames[0].data.time, frames[1].data.time);
        assert_eq!(frames[0].data.quantity, 4);
        assert_eq!(frames[1].data.quantity, 11);
    }

    #[test]
    fn test_unknown_instruction_yields_no_frames() {
        let store = RecordStore::new();
        store.upsert("Steve", Some("uuid-1"));

        let frames = respond(&request(1, "reboot_server"), &store.snapshot(), catalog::all(), 0);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_decode_request() {
        let frame = decode_request(r#"{"id": 7, "instruction": "get_all_players_data"}"#).unwrap();
        assert_eq!(frame.id, 7);
        assert_eq!(frame.instruction, GET_ALL_PLAYERS_DATA);

        assert!(decode_request("{ nope").is_err());
        assert!(decode_request(r#"{"instruction": "x"}"#).is_err());
    }

    #[test]
    fn test_response_frame_wire_shape() {
        let frame = ResponseFrame {
            id: 3,
            instruction: ALL_PLAYERS_DATA,
            data: StatSample {
                name: "Steve".to_string(),
                stat: "minecraft:deaths",
                quantity: 4,
                time: 23,
            },
        };
        let value: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "instruction": "all_players_data",
                "data": {
                    "name": "Steve",
                    "type": "minecraft:deaths",
                    "quantity": 4,
                    "time": 23
                }
            })
        );
    }
}
