pub mod admins;
pub mod faculty;
pub mod users;
