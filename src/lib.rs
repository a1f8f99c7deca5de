pub mod authentik;
pub mod config;
pub mod error;
pub mod members;

pub use authentik::{AuthentikClient, AuthentikGroup, AuthentikUser, GroupApi, GroupList};
pub use config::Settings;
pub use error::{SyncError, SyncResult};
pub use members::{GroupResolution, MembershipResolver, ResolvedMember, SkippedMember};
