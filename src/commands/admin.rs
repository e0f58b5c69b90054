use anyhow::Result;

use tss_console::managers::ReviewDecision;
use tss_console::models::{SlotShift, StaffStatus, UserRole};

use super::{format_user, require_admin, Data};

pub fn pending(data: &Data) -> Result<()> {
    require_admin(data)?;
    let applications = data.admin.pending_applications()?;
    for user in &applications {
        let application = &user.application;
        println!(
            "{} | {} | {} | hours: {}",
            format_user(user),
            application.division.as_deref().unwrap_or("-"),
            application.education.as_deref().unwrap_or("-"),
            application.available_hours.as_deref().unwrap_or("-"),
        );
    }
    println!("{} pending applications", applications.len());
    Ok(())
}

pub fn teachers(data: &Data) -> Result<()> {
    require_admin(data)?;
    for user in data.admin.teachers()? {
        println!("{} {}", format_user(&user), user.whatsapp);
    }
    Ok(())
}

pub fn students(data: &Data) -> Result<()> {
    require_admin(data)?;
    for user in data.admin.students()? {
        println!(
            "{} preferred={}",
            format_user(&user),
            user.preferred_time_slot_id.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn add_slot(data: &Data, label: &str, start: &str, end: &str, shift: SlotShift) -> Result<()> {
    require_admin(data)?;
    let slot = data.admin.create_time_slot(label, start, end, shift)?;
    println!("Created slot {}", slot.id);
    Ok(())
}

pub fn delete_slot(data: &Data, id: &str) -> Result<()> {
    require_admin(data)?;
    if data.store.delete_slot(id)? {
        println!("Deleted slot {}", id);
    } else {
        println!("No slot {}", id);
    }
    Ok(())
}

pub fn delete_user(data: &Data, id: &str) -> Result<()> {
    let actor = require_admin(data)?;
    if actor.id == id {
        anyhow::bail!("You cannot delete your own account");
    }
    if data.store.delete_user(id)? {
        println!("Deleted user {}", id);
    } else {
        println!("No user {}", id);
    }
    Ok(())
}

pub fn review(data: &Data, id: &str, decision: ReviewDecision) -> Result<()> {
    require_admin(data)?;
    data.admin.review_application(id, decision)?;
    println!("Application {} marked {}", id, StaffStatus::from(decision));
    Ok(())
}

pub fn assign(data: &Data, user_id: &str, slot_id: Option<&str>) -> Result<()> {
    require_admin(data)?;
    data.admin.assign_time_slot(user_id, slot_id)?;
    data.session.refresh_user()?;
    println!("{} -> {}", user_id, slot_id.unwrap_or("unassigned"));
    Ok(())
}

pub fn teach(data: &Data, slot_id: &str, teacher_id: Option<&str>) -> Result<()> {
    require_admin(data)?;
    data.admin.assign_teacher(slot_id, teacher_id)?;
    println!("{} taught by {}", slot_id, teacher_id.unwrap_or("nobody"));
    Ok(())
}

pub fn block(data: &Data, id: &str) -> Result<()> {
    let actor = require_admin(data)?;
    let blocked = data.admin.toggle_blocked(&actor, id)?;
    println!("{} is now {}", id, if blocked { "inactive" } else { "active" });
    Ok(())
}

pub fn role(data: &Data, id: &str, role: UserRole) -> Result<()> {
    let actor = require_admin(data)?;
    data.admin.change_role(&actor, id, role)?;
    data.session.refresh_user()?;
    println!("{} is now {}", id, role);
    Ok(())
}

pub fn password(data: &Data, id: &str, new_password: &str) -> Result<()> {
    require_admin(data)?;
    data.admin.reset_password(id, new_password)?;
    data.session.refresh_user()?;
    println!("Password changed for {}", id);
    Ok(())
}

pub fn note(data: &Data, id: &str, text: &str) -> Result<()> {
    let actor = require_admin(data)?;
    let note = data.admin.add_private_note(&actor, id, text)?;
    println!("Added note {} to {}", note.id, id);
    Ok(())
}
