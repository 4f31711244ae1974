pub mod demographics;
pub mod permission;
pub mod person;
