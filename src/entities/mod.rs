pub mod diary_entry;
pub mod lookup;
pub mod movie;
