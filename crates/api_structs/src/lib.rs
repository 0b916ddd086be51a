mod dispatch;
mod snooze;
mod status;

pub mod dtos {
    pub use crate::snooze::dtos::*;
}

pub use crate::dispatch::api::*;
pub use crate::snooze::api::*;
pub use crate::status::api::*;
