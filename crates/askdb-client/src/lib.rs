#![doc = include_str!("../README.md")]

pub mod client;
pub mod error;

pub use client::{AskClient, Health};
pub use error::{Error, Result};
