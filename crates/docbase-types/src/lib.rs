pub mod models;

pub use models::{Document, Role, User, UserSummary};
