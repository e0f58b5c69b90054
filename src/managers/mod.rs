pub mod admin_manager;
pub mod session_manager;

pub use admin_manager::{create_shared_admin_manager, AdminManager, ReviewDecision, SharedAdminManager};
pub use session_manager::{
    create_shared_session_manager, AuthState, LoginResult, SessionManager, SharedSessionManager,
    SuspensionCheck,
};
