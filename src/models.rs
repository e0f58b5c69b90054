// src/models.rs
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub mod time_slot;
pub mod user;

pub use time_slot::{SlotPatch, SlotShift, TimeSlot};
pub use user::{
    DeviceSelection, Gender, PrivateNote, Religion, StaffApplication, StaffStatus, User,
    UserPatch, UserRole,
};

/// The persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    TimeSlots,
}

impl Collection {
    /// Key suffix under the storage namespace
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::TimeSlots => "slots",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Users => write!(f, "user"),
            Collection::TimeSlots => write!(f, "time slot"),
        }
    }
}

/// A record stored in one of the persisted collections
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Records written the first time the collection is read with nothing persisted
    fn seed() -> Vec<Self>;

    /// Stored fields the record type does not declare
    fn extra(&self) -> &Map<String, Value>;
}

/// Generate a collision-free record id such as `slot-1718000000000-3f2a9c1e`
pub fn new_record_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, millis, &token[..8])
}
