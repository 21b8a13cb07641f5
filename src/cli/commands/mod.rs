mod create_user;
mod stats;

pub use create_user::cmd_create_user;
pub use stats::cmd_stats;
