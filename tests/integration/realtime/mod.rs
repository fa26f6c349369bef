//! Socket tests against a live listener

pub mod socket_test;
