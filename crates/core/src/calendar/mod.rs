//! Calendar ownership: the appointment store and its slot search.

pub mod store;

pub use store::CalendarStore;
