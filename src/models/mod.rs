pub mod booking;
pub mod event;
pub mod partner;
pub mod wallet;
