//! Values accepted by the forms.

mod credentials;
mod todo;

pub use credentials::{LoginInput, SignupInput};
pub use todo::{Task, TodoState};
