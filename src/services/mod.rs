//! Per-resource facades over the remote API, the query cache, the mutation
//! coordinator and the offload scheduler. Each service owns cheap clones of
//! the shared layers; callers hold whichever services they need.

mod auth;
mod projects;
mod tasks;
mod users;

pub use auth::AuthService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::UserService;
