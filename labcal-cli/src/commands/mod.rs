pub mod add;
pub mod delete;
pub mod list;
pub mod sync;

/// Date format used for all user input and output.
pub const DATE_FORMAT: &str = "%d/%m/%y";
