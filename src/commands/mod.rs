use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};
use tracing::warn;

use tss_console::managers::{
    ReviewDecision, SharedAdminManager, SharedSessionManager, SuspensionCheck,
};
use tss_console::models::{SlotShift, User, UserRole};
use tss_console::state::SharedStore;

mod admin;
mod general;

/// Shared application state
pub struct Data {
    pub store: SharedStore,
    pub session: SharedSessionManager,
    pub admin: SharedAdminManager,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List users, optionally filtered
    Users {
        /// Case-insensitive match on name, email or id
        #[arg(long, short = 's')]
        search: Option<String>,
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// List time slots
    Slots,
    /// Staff applications waiting for review
    Pending,
    /// Approved teachers
    Teachers,
    /// Students and their slots
    Students,
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Show the logged in account
    Whoami,
    /// Edit your own profile
    Profile {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        whatsapp: Option<String>,
    },
    AddSlot {
        label: String,
        /// HH:MM
        start: String,
        /// HH:MM
        end: String,
        shift: SlotShift,
    },
    DeleteSlot {
        id: String,
    },
    DeleteUser {
        id: String,
    },
    /// Approve or reject a staff application
    Review {
        id: String,
        decision: Decision,
    },
    /// Assign a user to a slot, or clear it when no slot is given
    Assign {
        user_id: String,
        slot_id: Option<String>,
    },
    /// Set a slot's teacher, or clear it when no teacher is given
    Teach {
        slot_id: String,
        teacher_id: Option<String>,
    },
    /// Toggle whether an account is blocked
    Block {
        id: String,
    },
    Role {
        id: String,
        role: UserRole,
    },
    Password {
        id: String,
        new_password: String,
    },
    Note {
        id: String,
        text: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for ReviewDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ReviewDecision::Approve,
            Decision::Reject => ReviewDecision::Reject,
        }
    }
}

impl Command {
    /// Login and logout replace the session themselves and must work even
    /// when the stored users cannot be read
    fn checks_session(&self) -> bool {
        !matches!(self, Command::Login { .. } | Command::Logout)
    }
}

pub fn run(data: &Data, command: Command) -> Result<()> {
    // Every other command counts as a navigation, so re-check the session first
    if command.checks_session() {
        report_suspension(data)?;
    }

    match command {
        Command::Users { search, role } => general::users(data, search.as_deref(), role),
        Command::Slots => general::slots(data),
        Command::Pending => admin::pending(data),
        Command::Teachers => admin::teachers(data),
        Command::Students => admin::students(data),
        Command::Login { email, password } => general::login(data, &email, &password),
        Command::Logout => general::logout(data),
        Command::Whoami => general::whoami(data),
        Command::Profile {
            display_name,
            whatsapp,
        } => general::profile(data, display_name, whatsapp),
        Command::AddSlot {
            label,
            start,
            end,
            shift,
        } => admin::add_slot(data, &label, &start, &end, shift),
        Command::DeleteSlot { id } => admin::delete_slot(data, &id),
        Command::DeleteUser { id } => admin::delete_user(data, &id),
        Command::Review { id, decision } => admin::review(data, &id, decision.into()),
        Command::Assign { user_id, slot_id } => admin::assign(data, &user_id, slot_id.as_deref()),
        Command::Teach {
            slot_id,
            teacher_id,
        } => admin::teach(data, &slot_id, teacher_id.as_deref()),
        Command::Block { id } => admin::block(data, &id),
        Command::Role { id, role } => admin::role(data, &id, role),
        Command::Password { id, new_password } => admin::password(data, &id, &new_password),
        Command::Note { id, text } => admin::note(data, &id, &text),
    }
}

/// End the session if the account was blocked or deleted, and say why
fn report_suspension(data: &Data) -> Result<()> {
    let check = data.session.check_suspension()?;
    if let Some(route) = check.redirect() {
        match check {
            SuspensionCheck::Suspended => {
                println!("Your account is currently Inactive. Please contact an administrator.")
            }
            _ => println!("Your account no longer exists. Please log in again."),
        }
        warn!("Session ended, redirecting to {}", route);
    }
    Ok(())
}

/// The logged in user, or an error asking to log in
fn require_login(data: &Data) -> Result<User> {
    match data.session.current_user() {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run `tss-console login <email> <password>` first."),
    }
}

/// The logged in user if they are an admin
fn require_admin(data: &Data) -> Result<User> {
    let user = require_login(data)?;
    if !user.is_admin() {
        bail!("This command requires an admin account");
    }
    Ok(user)
}

fn format_user(user: &User) -> String {
    let mut line = format!(
        "{:<14} {:<24} {:<22} {:<10}",
        user.id,
        user.display_label(),
        user.email,
        user.role.to_string()
    );
    if let Some(status) = user.status {
        line.push_str(&format!(" {}", status));
    }
    if let Some(slot) = &user.assigned_time_slot_id {
        line.push_str(&format!(" slot={}", slot));
    }
    if user.is_blocked {
        line.push_str(" [inactive]");
    }
    line
}
