//! Terminal front end: command parsing and the session loop.

pub mod command;
pub mod event_loop;

pub use {
    command::{Command, CommandError, PlayTarget},
    event_loop::{Reply, Session, run},
};
