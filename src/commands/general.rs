use anyhow::Result;

use tss_console::models::{User, UserPatch, UserRole};

use super::{format_user, require_login, Data};

pub fn users(data: &Data, search: Option<&str>, role: Option<UserRole>) -> Result<()> {
    super::require_admin(data)?;

    let users: Vec<User> = match search {
        Some(term) => data.admin.search_users(term)?,
        None => data.store.users()?,
    };

    let mut shown = 0;
    for user in users.iter().filter(|u| role.map_or(true, |r| u.role == r)) {
        println!("{}", format_user(user));
        shown += 1;
    }
    println!("{} users", shown);
    Ok(())
}

pub fn slots(data: &Data) -> Result<()> {
    require_login(data)?;

    let users = data.store.users()?;
    for slot in data.store.slots()? {
        let teacher = slot
            .teacher_id
            .as_deref()
            .and_then(|id| users.iter().find(|u| u.id == id))
            .map(|u| u.display_label().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<22} {:<20} {}-{} {:<10} {}",
            slot.id, slot.label, slot.start_time, slot.end_time, slot.shift.to_string(), teacher
        );
    }
    Ok(())
}

pub fn login(data: &Data, email: &str, password: &str) -> Result<()> {
    let result = data.session.attempt_login(email, password);
    match result.error {
        None => {
            let user = require_login(data)?;
            println!("Logged in as {} ({})", user.display_label(), user.role);
        }
        Some(message) => println!("{}", message),
    }
    Ok(())
}

pub fn logout(data: &Data) -> Result<()> {
    data.session.logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(data: &Data) -> Result<()> {
    match data.session.current_user() {
        Some(user) => println!("{}", format_user(&user)),
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Self-service edit, followed by a session refresh so the cache matches
pub fn profile(data: &Data, display_name: Option<String>, whatsapp: Option<String>) -> Result<()> {
    let user = require_login(data)?;

    if display_name.is_none() && whatsapp.is_none() {
        println!("{}", format_user(&user));
        return Ok(());
    }

    data.store.update_user(
        &user.id,
        &UserPatch {
            display_name: display_name.map(Some),
            whatsapp,
            ..Default::default()
        },
    )?;

    if let Some(fresh) = data.session.refresh_user()? {
        println!("Profile updated: {}", format_user(&fresh));
    }
    Ok(())
}
