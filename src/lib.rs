//! OU Gym - Membership & Payment Backend
//!
//! This crate implements package purchase, invoice settlement, and the
//! VNPay payment-gateway integration for a gym membership service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
