pub mod accounts;
pub mod inventory;
pub mod leads;
pub mod payments;
pub mod tickets;
