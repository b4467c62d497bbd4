// Portfolio editing: id-addressed list edits, advisory validation, and the
// HTTP handlers that apply both to the session's working copy.

pub mod editing;
pub mod handlers;
pub mod uploads;
pub mod validation;
