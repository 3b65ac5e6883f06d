//! LeadBridge API - marketplace backend connecting event hosts with verified leads
//!
//! This crate provides the REST API for LeadBridge:
//! - Event booking, which creates leads and consumes event slots
//! - Automatic and admin verification of leads
//! - Paid lead purchases by hosts, confirmed through a payment provider
//! - Paid invitations that turn a purchased lead into a ticket

pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod entities;
pub mod error;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
