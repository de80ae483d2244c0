mod health_check;
mod registration_form;
mod submit;
mod success;

pub use health_check::*;
pub use registration_form::*;
pub use submit::*;
pub use success::*;
