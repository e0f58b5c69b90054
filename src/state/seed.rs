//! Demo data written the first time a collection is read from empty storage.

use crate::models::{Gender, SlotShift, StaffApplication, StaffStatus, TimeSlot, User, UserRole};

const DEMO_STAFF_COUNT: usize = 10;
const DEMO_SUBSCRIBER_COUNT: usize = 10;

/// (id, label, start, end, shift)
const SLOT_DEFINITIONS: &[(&str, &str, &str, &str, SlotShift)] = &[
    ("1", "Basic Training A", "08:00", "09:00", SlotShift::Morning),
    ("2", "Advanced Skills", "09:00", "10:00", SlotShift::Morning),
    ("3", "Theory Session", "10:00", "11:00", SlotShift::Morning),
    ("4", "Practical Lab 1", "14:00", "15:00", SlotShift::Afternoon),
    ("5", "Evening Review", "16:00", "17:00", SlotShift::Evening),
    ("6", "Midnight Ops", "00:00", "06:00", SlotShift::Night),
];

pub const ADMIN_ID: &str = "admin-1";
pub const ADMIN_EMAIL: &str = "admin@tss.com";

fn slot_id_for(index: usize) -> String {
    SLOT_DEFINITIONS[index % SLOT_DEFINITIONS.len()].0.to_string()
}

fn staff_id_for(index: usize) -> String {
    format!("staff-demo-{}", index % DEMO_STAFF_COUNT + 1)
}

/// Six slots across all shifts, each taught by one of the demo teachers
pub fn initial_slots() -> Vec<TimeSlot> {
    SLOT_DEFINITIONS
        .iter()
        .enumerate()
        .map(|(i, (id, label, start, end, shift))| {
            let mut slot = TimeSlot::new(id.to_string(), label, start, end, *shift);
            slot.teacher_id = Some(staff_id_for(i));
            slot
        })
        .collect()
}

/// The system administrator, ten approved teachers and ten students
pub fn initial_users() -> Vec<User> {
    let mut users = Vec::with_capacity(1 + DEMO_STAFF_COUNT + DEMO_SUBSCRIBER_COUNT);
    users.push(admin());
    users.extend((0..DEMO_STAFF_COUNT).map(demo_staff));
    users.extend((0..DEMO_SUBSCRIBER_COUNT).map(demo_subscriber));
    users
}

fn admin() -> User {
    User {
        id: ADMIN_ID.to_string(),
        full_name: "System Administrator".to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: Some("admin".to_string()),
        gender: Gender::Other,
        whatsapp: "+123456789".to_string(),
        role: UserRole::Admin,
        is_blocked: false,
        preferred_time_slot_id: None,
        assigned_time_slot_id: None,
        status: None,
        application: StaffApplication::default(),
        private_notes: None,
        display_name: None,
        extra: Default::default(),
    }
}

fn demo_staff(i: usize) -> User {
    // "Teacher A", "Teacher B", ...
    let name = format!("Teacher {}", (b'A' + i as u8) as char);

    User {
        id: staff_id_for(i),
        full_name: name.clone(),
        email: format!("staff{}@tss.com", i + 1),
        password: Some("password".to_string()),
        gender: Gender::Female,
        whatsapp: format!("+88017000000{}", i),
        role: UserRole::Staff,
        is_blocked: false,
        preferred_time_slot_id: None,
        assigned_time_slot_id: Some(slot_id_for(i)),
        status: Some(StaffStatus::Approved),
        application: StaffApplication {
            division: Some("Dhaka".to_string()),
            education: Some("Honours / Degree".to_string()),
            available_hours: Some("8 Hours".to_string()),
            phone_brand: Some("Samsung".to_string()),
            phone_specs: Some("6/128".to_string()),
            fb_link: Some(format!("https://facebook.com/staff{}", i + 1)),
            ..Default::default()
        },
        private_notes: None,
        display_name: Some(name),
        extra: Default::default(),
    }
}

fn demo_subscriber(i: usize) -> User {
    User {
        id: format!("sub-demo-{}", i + 1),
        full_name: format!("Student User {}", i + 1),
        email: format!("student{}@tss.com", i + 1),
        password: Some("password".to_string()),
        gender: if i % 2 == 0 { Gender::Male } else { Gender::Female },
        whatsapp: format!("+88018000000{}", i),
        role: UserRole::Subscriber,
        is_blocked: false,
        preferred_time_slot_id: Some(slot_id_for(i)),
        assigned_time_slot_id: Some(slot_id_for(i)),
        status: None,
        application: StaffApplication::default(),
        private_notes: None,
        display_name: None,
        extra: Default::default(),
    }
}
