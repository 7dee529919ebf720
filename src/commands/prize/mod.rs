pub mod formatters;
pub mod handlers;
pub mod interactions;
pub mod manager;
pub mod models;
pub mod parser;
pub mod record;
pub mod resolver;
pub mod strategies;

use crate::commands::context::UserData;
use crate::error::Error;

pub use crate::commands::prize::handlers::{
    // Prize management
    add_prize,
    show_prizes,
    prizes_list,
    list,

    // Drawing and data safety
    draw,
    backup,
    restore,
};

pub fn commands_list() -> Vec<poise::Command<UserData, Error>> {
    vec![
        add_prize(),
        show_prizes(),
        prizes_list(),
        list(),
        draw(),
        backup(),
        restore(),
    ]
}
