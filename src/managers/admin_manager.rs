use std::sync::Arc;
use tracing::info;

use crate::error::{ConsoleError, Result};
use crate::models::{
    new_record_id, PrivateNote, SlotPatch, SlotShift, StaffStatus, TimeSlot, User, UserPatch,
    UserRole,
};
use crate::state::SharedStore;

/// Decision on a staff application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl From<ReviewDecision> for StaffStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => StaffStatus::Approved,
            ReviewDecision::Reject => StaffStatus::Rejected,
        }
    }
}

/// Operations behind the admin screens
pub struct AdminManager {
    store: SharedStore,
}

impl AdminManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Staff applications waiting for review
    pub fn pending_applications(&self) -> Result<Vec<User>> {
        Ok(self
            .store
            .users()?
            .into_iter()
            .filter(|u| u.has_staff_status(StaffStatus::Pending))
            .collect())
    }

    /// Approved staff
    pub fn teachers(&self) -> Result<Vec<User>> {
        Ok(self
            .store
            .users()?
            .into_iter()
            .filter(|u| u.has_staff_status(StaffStatus::Approved))
            .collect())
    }

    pub fn students(&self) -> Result<Vec<User>> {
        Ok(self
            .store
            .users()?
            .into_iter()
            .filter(|u| u.role == UserRole::Subscriber)
            .collect())
    }

    /// Case-insensitive match on name, email or id
    pub fn search_users(&self, term: &str) -> Result<Vec<User>> {
        let term = term.trim().to_lowercase();
        Ok(self
            .store
            .users()?
            .into_iter()
            .filter(|u| {
                u.full_name.to_lowercase().contains(&term)
                    || u.email.to_lowercase().contains(&term)
                    || u.id.to_lowercase().contains(&term)
            })
            .collect())
    }

    pub fn review_application(&self, user_id: &str, decision: ReviewDecision) -> Result<()> {
        let user = self.require_user(user_id)?;
        if user.role != UserRole::Staff {
            return Err(ConsoleError::Validation {
                message: format!("{} is not a staff applicant", user_id),
            });
        }

        let status = StaffStatus::from(decision);
        self.store.update_user(
            user_id,
            &UserPatch {
                status: Some(Some(status)),
                ..Default::default()
            },
        )?;

        info!("Application {} marked {}", user_id, status);
        Ok(())
    }

    /// Set or clear the slot a user is assigned to
    pub fn assign_time_slot(&self, user_id: &str, slot_id: Option<&str>) -> Result<()> {
        self.require_user(user_id)?;
        if let Some(slot_id) = slot_id {
            self.require_slot(slot_id)?;
        }

        self.store.update_user(
            user_id,
            &UserPatch {
                assigned_time_slot_id: Some(slot_id.map(String::from)),
                ..Default::default()
            },
        )?;

        info!("User {} assigned to slot {:?}", user_id, slot_id);
        Ok(())
    }

    /// Set or clear the teacher of a slot
    pub fn assign_teacher(&self, slot_id: &str, teacher_id: Option<&str>) -> Result<()> {
        self.require_slot(slot_id)?;
        if let Some(teacher_id) = teacher_id {
            self.require_user(teacher_id)?;
        }

        self.store.update_slot(
            slot_id,
            &SlotPatch {
                teacher_id: Some(teacher_id.map(String::from)),
                ..Default::default()
            },
        )?;

        info!("Slot {} taught by {:?}", slot_id, teacher_id);
        Ok(())
    }

    /// Create a slot with a generated id
    pub fn create_time_slot(
        &self,
        label: &str,
        start_time: &str,
        end_time: &str,
        shift: SlotShift,
    ) -> Result<TimeSlot> {
        for time in [start_time, end_time] {
            if chrono::NaiveTime::parse_from_str(time, "%H:%M").is_err() {
                return Err(ConsoleError::Validation {
                    message: format!("'{}' is not a HH:MM time", time),
                });
            }
        }

        let label = label.trim();
        if label.is_empty() {
            return Err(ConsoleError::Validation {
                message: "slot label cannot be empty".to_string(),
            });
        }

        let slot = TimeSlot::new(new_record_id("slot"), label, start_time, end_time, shift);
        self.store.add_slot(slot.clone())?;

        info!("Created slot {} ({})", slot.id, slot.label);
        Ok(slot)
    }

    /// Flip the blocked flag. Admins cannot deactivate themselves.
    pub fn toggle_blocked(&self, actor: &User, target_id: &str) -> Result<bool> {
        if actor.id == target_id {
            return Err(ConsoleError::PermissionDenied {
                message: "you cannot deactivate yourself".to_string(),
            });
        }

        let target = self.require_user(target_id)?;
        let blocked = !target.is_blocked;
        self.store.update_user(
            target_id,
            &UserPatch {
                is_blocked: Some(blocked),
                ..Default::default()
            },
        )?;

        info!("User {} blocked={} by {}", target_id, blocked, actor.id);
        Ok(blocked)
    }

    /// Change a role. Admins cannot demote themselves.
    pub fn change_role(&self, actor: &User, target_id: &str, role: UserRole) -> Result<()> {
        if actor.id == target_id && role != UserRole::Admin {
            return Err(ConsoleError::PermissionDenied {
                message: "self-demotion is restricted".to_string(),
            });
        }

        self.require_user(target_id)?;
        self.store.update_user(
            target_id,
            &UserPatch {
                role: Some(role),
                ..Default::default()
            },
        )?;

        info!("User {} role set to {} by {}", target_id, role, actor.id);
        Ok(())
    }

    pub fn reset_password(&self, target_id: &str, new_password: &str) -> Result<()> {
        if new_password.trim().is_empty() {
            return Err(ConsoleError::Validation {
                message: "password cannot be blank".to_string(),
            });
        }

        self.require_user(target_id)?;
        self.store.update_user(
            target_id,
            &UserPatch {
                password: Some(Some(new_password.to_string())),
                ..Default::default()
            },
        )?;

        info!("Password reset for {}", target_id);
        Ok(())
    }

    pub fn add_private_note(&self, actor: &User, target_id: &str, text: &str) -> Result<PrivateNote> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConsoleError::Validation {
                message: "note cannot be empty".to_string(),
            });
        }

        let target = self.require_user(target_id)?;
        let note = PrivateNote {
            id: new_record_id("note"),
            author_id: actor.id.clone(),
            author_name: actor.display_label().to_string(),
            text: text.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };

        let mut notes = target.private_notes.unwrap_or_default();
        notes.push(note.clone());
        self.store.update_user(
            target_id,
            &UserPatch {
                private_notes: Some(notes),
                ..Default::default()
            },
        )?;

        info!("Note {} added to {} by {}", note.id, target_id, actor.id);
        Ok(note)
    }

    fn require_user(&self, id: &str) -> Result<User> {
        self.store
            .find_user(id)?
            .ok_or_else(|| ConsoleError::UnknownUser { id: id.to_string() })
    }

    fn require_slot(&self, id: &str) -> Result<TimeSlot> {
        self.store
            .find_slot(id)?
            .ok_or_else(|| ConsoleError::UnknownTimeSlot { id: id.to_string() })
    }
}

/// Shared admin manager type
pub type SharedAdminManager = Arc<AdminManager>;

pub fn create_shared_admin_manager(store: SharedStore) -> SharedAdminManager {
    Arc::new(AdminManager::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, StaffApplication};
    use crate::state::{MemoryStorage, Store};

    fn setup() -> (SharedStore, AdminManager, User) {
        let store: SharedStore = Arc::new(Store::new(Arc::new(MemoryStorage::new())));
        let admin = store.find_user("admin-1").unwrap().unwrap();
        (store.clone(), AdminManager::new(store), admin)
    }

    fn add_applicant(store: &SharedStore, id: &str) {
        store
            .add_user(User::new_staff_applicant(
                id.to_string(),
                "Nusrat Jahan".to_string(),
                format!("{}@tss.com", id),
                "pw".to_string(),
                Gender::Female,
                "+8801".to_string(),
                StaffApplication::default(),
            ))
            .unwrap();
    }

    #[test]
    fn test_listings() {
        let (store, admin, _) = setup();
        add_applicant(&store, "applicant-1");

        let pending = admin.pending_applications().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "applicant-1");
        assert_eq!(admin.teachers().unwrap().len(), 10);
        assert_eq!(admin.students().unwrap().len(), 10);
    }

    #[test]
    fn test_review_application() {
        let (store, admin, _) = setup();
        add_applicant(&store, "applicant-1");
        add_applicant(&store, "applicant-2");

        admin.review_application("applicant-1", ReviewDecision::Approve).unwrap();
        admin.review_application("applicant-2", ReviewDecision::Reject).unwrap();

        assert!(admin.pending_applications().unwrap().is_empty());
        assert_eq!(admin.teachers().unwrap().len(), 11);
        let rejected = store.find_user("applicant-2").unwrap().unwrap();
        assert_eq!(rejected.status, Some(StaffStatus::Rejected));

        assert!(matches!(
            admin.review_application("sub-demo-1", ReviewDecision::Approve),
            Err(ConsoleError::Validation { .. })
        ));
        assert!(matches!(
            admin.review_application("ghost", ReviewDecision::Approve),
            Err(ConsoleError::UnknownUser { .. })
        ));
    }

    #[test]
    fn test_search_users() {
        let (_, admin, _) = setup();

        assert_eq!(admin.search_users("").unwrap().len(), 21);
        assert_eq!(admin.search_users("TEACHER a").unwrap().len(), 1);
        assert_eq!(admin.search_users("student1").unwrap().len(), 2); // student1 and student10
        assert_eq!(admin.search_users("sub-demo-7").unwrap()[0].full_name, "Student User 7");
    }

    #[test]
    fn test_assign_time_slot_requires_existing_slot() {
        let (store, admin, _) = setup();

        admin.assign_time_slot("sub-demo-1", Some("5")).unwrap();
        assert_eq!(
            store.find_user("sub-demo-1").unwrap().unwrap().assigned_time_slot_id.as_deref(),
            Some("5")
        );

        assert!(matches!(
            admin.assign_time_slot("sub-demo-1", Some("nope")),
            Err(ConsoleError::UnknownTimeSlot { .. })
        ));

        admin.assign_time_slot("sub-demo-1", None).unwrap();
        assert!(store.find_user("sub-demo-1").unwrap().unwrap().assigned_time_slot_id.is_none());
    }

    #[test]
    fn test_assign_teacher() {
        let (store, admin, _) = setup();

        admin.assign_teacher("1", Some("staff-demo-9")).unwrap();
        assert_eq!(
            store.find_slot("1").unwrap().unwrap().teacher_id.as_deref(),
            Some("staff-demo-9")
        );
        assert!(matches!(
            admin.assign_teacher("1", Some("ghost")),
            Err(ConsoleError::UnknownUser { .. })
        ));
        admin.assign_teacher("1", None).unwrap();
        assert!(store.find_slot("1").unwrap().unwrap().teacher_id.is_none());
    }

    #[test]
    fn test_create_time_slot() {
        let (store, admin, _) = setup();

        let slot = admin
            .create_time_slot("New Session", "09:00", "10:00", SlotShift::Morning)
            .unwrap();
        assert!(slot.id.starts_with("slot-"));
        assert_eq!(store.slots().unwrap().last(), Some(&slot));

        assert!(matches!(
            admin.create_time_slot("Bad", "9am", "10:00", SlotShift::Morning),
            Err(ConsoleError::Validation { .. })
        ));
        assert!(matches!(
            admin.create_time_slot("  ", "09:00", "10:00", SlotShift::Morning),
            Err(ConsoleError::Validation { .. })
        ));
    }

    #[test]
    fn test_toggle_blocked_refuses_self() {
        let (store, admin, actor) = setup();

        assert!(admin.toggle_blocked(&actor, "staff-demo-1").unwrap());
        assert!(store.find_user("staff-demo-1").unwrap().unwrap().is_blocked);
        assert!(!admin.toggle_blocked(&actor, "staff-demo-1").unwrap());

        assert!(matches!(
            admin.toggle_blocked(&actor, &actor.id),
            Err(ConsoleError::PermissionDenied { .. })
        ));
        assert!(!store.find_user(&actor.id).unwrap().unwrap().is_blocked);
    }

    #[test]
    fn test_change_role_refuses_self_demotion() {
        let (store, admin, actor) = setup();

        admin.change_role(&actor, "sub-demo-2", UserRole::Staff).unwrap();
        assert_eq!(store.find_user("sub-demo-2").unwrap().unwrap().role, UserRole::Staff);

        assert!(matches!(
            admin.change_role(&actor, &actor.id, UserRole::Subscriber),
            Err(ConsoleError::PermissionDenied { .. })
        ));
        admin.change_role(&actor, &actor.id, UserRole::Admin).unwrap();
    }

    #[test]
    fn test_reset_password() {
        let (store, admin, _) = setup();

        admin.reset_password("sub-demo-1", "n3w").unwrap();
        assert!(store
            .find_user("sub-demo-1")
            .unwrap()
            .unwrap()
            .matches_credentials("student1@tss.com", "n3w"));

        assert!(matches!(
            admin.reset_password("sub-demo-1", "   "),
            Err(ConsoleError::Validation { .. })
        ));
    }

    #[test]
    fn test_add_private_note() {
        let (store, admin, actor) = setup();

        admin.add_private_note(&actor, "staff-demo-4", "Great first week").unwrap();
        let note = admin.add_private_note(&actor, "staff-demo-4", "Needs headset").unwrap();

        let notes = store
            .find_user("staff-demo-4")
            .unwrap()
            .unwrap()
            .private_notes
            .unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1], note);
        assert_eq!(note.author_id, "admin-1");
        assert_eq!(note.author_name, "System Administrator");
        assert!(note.timestamp > 0);
    }
}
