use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::{Collection, Record};

/// Informational grouping of a slot, not checked against its times
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlotShift {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl std::fmt::Display for SlotShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotShift::Morning => "Morning",
            SlotShift::Afternoon => "Afternoon",
            SlotShift::Evening => "Evening",
            SlotShift::Night => "Night",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SlotShift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "morning" => Ok(SlotShift::Morning),
            "afternoon" => Ok(SlotShift::Afternoon),
            "evening" => Ok(SlotShift::Evening),
            "night" => Ok(SlotShift::Night),
            _ => Err(format!("unknown shift '{}'", s)),
        }
    }
}

/// A recurring session students and teachers are assigned to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub label: String,
    /// Wall-clock `HH:MM`
    pub start_time: String,
    pub end_time: String,
    pub shift: SlotShift,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeSlot {
    pub fn new(id: String, label: &str, start_time: &str, end_time: &str, shift: SlotShift) -> Self {
        Self {
            id,
            label: label.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            shift,
            teacher_id: None,
            extra: Map::new(),
        }
    }

    /// Drop the teacher reference if it points at a deleted user
    pub fn clear_teacher(&mut self, user_id: &str) -> bool {
        if self.teacher_id.as_deref() == Some(user_id) {
            self.teacher_id = None;
            true
        } else {
            false
        }
    }
}

impl Record for TimeSlot {
    const COLLECTION: Collection = Collection::TimeSlots;

    fn id(&self) -> &str {
        &self.id
    }

    fn seed() -> Vec<Self> {
        crate::state::seed::initial_slots()
    }

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Partial update for a [`TimeSlot`]
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<SlotShift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_wire_format() {
        let mut slot = TimeSlot::new("7".to_string(), "Night Owls", "22:00", "23:00", SlotShift::Night);
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["startTime"], "22:00");
        assert_eq!(value["shift"], "Night");
        assert!(value.get("teacherId").is_none());

        slot.teacher_id = Some("staff-1".to_string());
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["teacherId"], "staff-1");
    }

    #[test]
    fn test_clear_teacher_only_matching() {
        let mut slot = TimeSlot::new("1".to_string(), "A", "08:00", "09:00", SlotShift::Morning);
        slot.teacher_id = Some("staff-1".to_string());

        assert!(!slot.clear_teacher("staff-2"));
        assert_eq!(slot.teacher_id.as_deref(), Some("staff-1"));
        assert!(slot.clear_teacher("staff-1"));
        assert!(slot.teacher_id.is_none());
    }

    #[test]
    fn test_unknown_fields_survive_a_round_trip() {
        let json = r#"{"id":"1","label":"A","startTime":"08:00","endTime":"09:00","shift":"Morning","room":"Lab 3"}"#;

        let slot: TimeSlot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.extra["room"], "Lab 3");

        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["room"], "Lab 3");
        assert_eq!(value["label"], "A");
    }
}
