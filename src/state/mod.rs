pub mod slot;
pub mod view_model;

pub use slot::{EventSlot, StateSlot};
pub use view_model::{CountriesState, CountriesViewModel};
