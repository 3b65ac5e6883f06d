pub mod event;
pub mod invitation;
pub mod lead;
pub mod mentor_profile;
pub mod payment;
pub mod status;
pub mod ticket;
pub mod user;
pub mod user_session;
pub mod verification_log;
