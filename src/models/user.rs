use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::{Collection, Record};

/// Role of an account, determines which views and permissions it gets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Staff,
    Subscriber,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Admin => "ADMIN",
            UserRole::Staff => "STAFF",
            UserRole::Subscriber => "SUBSCRIBER",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "staff" | "teacher" => Ok(UserRole::Staff),
            "subscriber" | "student" => Ok(UserRole::Subscriber),
            _ => Err(format!("unknown role '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Review state of a staff application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum StaffStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StaffStatus::Pending => "PENDING",
            StaffStatus::Approved => "APPROVED",
            StaffStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Religion {
    Islam,
    Hindu,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceSelection {
    Phone,
    Computer,
    Both,
}

/// A note left on an account by staff or an admin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateNote {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Recruitment questionnaire answers given by a staff applicant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StaffApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub religion: Option<Religion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_selection: Option<DeviceSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_regular_student: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses_imo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_specs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_sites: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_hours: Option<String>,
    /// Facebook profile or page link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fb_link: Option<String>,
}

/// An account in the training program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    /// Login identifier, not guaranteed unique
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub gender: Gender,
    pub whatsapp: String,
    pub role: UserRole,
    #[serde(default)]
    pub is_blocked: bool,

    /// Subscribers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time_slot_id: Option<String>,
    /// Set by an admin, any role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_time_slot_id: Option<String>,

    /// Staff only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StaffStatus>,
    #[serde(flatten)]
    pub application: StaffApplication,
    /// Stored fields this version does not know, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_notes: Option<Vec<PrivateNote>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    /// A student signing up for a preferred time slot
    pub fn new_subscriber(
        id: String,
        full_name: String,
        email: String,
        password: String,
        gender: Gender,
        whatsapp: String,
        preferred_time_slot_id: Option<String>,
    ) -> Self {
        Self {
            id,
            full_name,
            email,
            password: Some(password),
            gender,
            whatsapp,
            role: UserRole::Subscriber,
            is_blocked: false,
            preferred_time_slot_id,
            assigned_time_slot_id: None,
            status: None,
            application: StaffApplication::default(),
            private_notes: None,
            display_name: None,
            extra: Map::new(),
        }
    }

    /// A teacher applicant, waiting for admin review
    pub fn new_staff_applicant(
        id: String,
        full_name: String,
        email: String,
        password: String,
        gender: Gender,
        whatsapp: String,
        application: StaffApplication,
    ) -> Self {
        Self {
            id,
            full_name,
            email,
            password: Some(password),
            gender,
            whatsapp,
            role: UserRole::Staff,
            is_blocked: false,
            preferred_time_slot_id: None,
            assigned_time_slot_id: None,
            status: Some(StaffStatus::Pending),
            application,
            private_notes: None,
            display_name: None,
            extra: Map::new(),
        }
    }

    /// Name shown in the UI, the display name override if set
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.full_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_staff_status(&self, status: StaffStatus) -> bool {
        self.role == UserRole::Staff && self.status == Some(status)
    }

    /// Whether email and password match exactly. Accounts without a password never match.
    pub fn matches_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password.as_deref() == Some(password)
    }

    /// Drop assigned and preferred references to a deleted slot
    pub fn clear_time_slot(&mut self, slot_id: &str) -> bool {
        let mut changed = false;
        if self.assigned_time_slot_id.as_deref() == Some(slot_id) {
            self.assigned_time_slot_id = None;
            changed = true;
        }
        if self.preferred_time_slot_id.as_deref() == Some(slot_id) {
            self.preferred_time_slot_id = None;
            changed = true;
        }
        changed
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }

    fn seed() -> Vec<Self> {
        crate::state::seed::initial_users()
    }

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Partial update for a [`User`]; unset fields are left untouched.
///
/// Fields that may be cleared take `Some(None)`.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time_slot_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_time_slot_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<StaffStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_notes: Option<Vec<PrivateNote>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant() -> User {
        User::new_staff_applicant(
            "staff-1".to_string(),
            "Rahima Khatun".to_string(),
            "rahima@tss.com".to_string(),
            "secret".to_string(),
            Gender::Female,
            "+8801700000001".to_string(),
            StaffApplication {
                division: Some("Khulna".to_string()),
                device_selection: Some(DeviceSelection::Both),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_user_wire_format_uses_camel_case() {
        let value = serde_json::to_value(applicant()).unwrap();

        assert_eq!(value["fullName"], "Rahima Khatun");
        assert_eq!(value["role"], "STAFF");
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["isBlocked"], false);
        assert_eq!(value["division"], "Khulna");
        assert_eq!(value["deviceSelection"], "BOTH");
        assert!(value.get("preferredTimeSlotId").is_none());
        assert!(value.get("religion").is_none());
    }

    #[test]
    fn test_missing_blocked_flag_means_active() {
        let json = r#"{
            "id": "u1",
            "fullName": "No Flag",
            "email": "nf@tss.com",
            "gender": "OTHER",
            "whatsapp": "+1",
            "role": "SUBSCRIBER"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_blocked);
        assert!(user.password.is_none());
        assert!(!user.matches_credentials("nf@tss.com", ""));
    }

    #[test]
    fn test_clear_time_slot() {
        let mut user = User::new_subscriber(
            "sub-1".to_string(),
            "Student".to_string(),
            "s@tss.com".to_string(),
            "pw".to_string(),
            Gender::Male,
            "+1".to_string(),
            Some("slot-a".to_string()),
        );
        user.assigned_time_slot_id = Some("slot-a".to_string());

        assert!(!user.clear_time_slot("slot-b"));
        assert!(user.clear_time_slot("slot-a"));
        assert!(user.preferred_time_slot_id.is_none());
        assert!(user.assigned_time_slot_id.is_none());
    }

    #[test]
    fn test_display_label_prefers_override() {
        let mut user = applicant();
        assert_eq!(user.display_label(), "Rahima Khatun");

        user.display_name = Some("Ms. Rahima".to_string());
        assert_eq!(user.display_label(), "Ms. Rahima");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = UserPatch {
            whatsapp: Some("+999".to_string()),
            assigned_time_slot_id: Some(None),
            ..Default::default()
        };

        let value = serde_json::to_value(&patch).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["whatsapp"], "+999");
        assert!(obj["assignedTimeSlotId"].is_null());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("STUDENT".parse::<UserRole>(), Ok(UserRole::Subscriber));
        assert!("janitor".parse::<UserRole>().is_err());
    }
}
