//! Operation handlers, grouped by subdomain.

pub mod billing;
