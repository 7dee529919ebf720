// The prize board: an embed listing a page of prizes with a join button for
// each of them and the navigation buttons underneath.
use std::ops::Range;

use serenity::builder::{CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter};
use serenity::model::Colour;
use serenity::model::application::ButtonStyle;

use crate::commands::prize::formatters::messages::winners_label;
use crate::commands::prize::interactions::CustomId;
use crate::commands::prize::models::Prize;

pub const PAGE_SIZE: usize = 12;
pub const BUTTONS_PER_ROW: usize = 5;
pub const LABEL_LIMIT: usize = 80;
pub const FIELD_NAME_LIMIT: usize = 256;

pub fn page_count(total: usize) -> usize {
    match total {
        0 => 1,
        _ => total.div_ceil(PAGE_SIZE),
    }
}

// Clamps the page into the valid range.
pub fn clamp_page(total: usize, page: usize) -> usize {
    page.min(page_count(total) - 1)
}

pub fn page_range(total: usize, page: usize) -> Range<usize> {
    let start = clamp_page(total, page) * PAGE_SIZE;
    start.min(total)..(start + PAGE_SIZE).min(total)
}

pub fn button_label(prefix: &str, prize_name: &str) -> String {
    let label = format!("{} \"{}\"", prefix, prize_name);
    match label.chars().count() > LABEL_LIMIT {
        true => {
            let mut truncated = label.chars().take(LABEL_LIMIT - 2).collect::<String>();
            truncated.push_str("…\"");
            truncated
        }
        false => label,
    }
}

// Embed field names longer than the limit are rejected by Discord.
pub fn field_name(prize_name: &str) -> String {
    match prize_name.chars().count() > FIELD_NAME_LIMIT {
        true => {
            let mut truncated = prize_name.chars().take(FIELD_NAME_LIMIT - 1).collect::<String>();
            truncated.push('…');
            truncated
        }
        false => prize_name.to_string(),
    }
}

pub fn join_button(prize_name: &str) -> CreateButton {
    CreateButton::new(CustomId::join(prize_name).encode())
        .label(button_label("Join", prize_name))
        .style(ButtonStyle::Primary)
}

pub fn leave_button(prize_name: &str) -> CreateButton {
    CreateButton::new(CustomId::leave(prize_name).encode())
        .label(button_label("Leave", prize_name))
        .style(ButtonStyle::Danger)
}

pub fn build_board(prizes: &[Prize], page: usize) -> (CreateEmbed, Vec<CreateActionRow>) {
    let page = clamp_page(prizes.len(), page);
    let pages = page_count(prizes.len());
    let visible = &prizes[page_range(prizes.len(), page)];

    let mut embed = CreateEmbed::new()
        .title("Prize list")
        .description("Press a button below to join the draw for a prize, or check who has joined.")
        .colour(Colour::RED)
        .footer(CreateEmbedFooter::new(format!("Page {}/{}", page + 1, pages)));

    if visible.is_empty() {
        embed = embed.field("No prizes", "There are no prizes yet.", false);
    }
    for prize in visible {
        embed = embed.field(
            field_name(prize.name()),
            format!(
                "**Winners**: {}\n**Participants**: {}",
                winners_label(prize.winners()),
                prize.participants().len()
            ),
            true,
        );
    }

    let mut rows = visible
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| {
            let buttons = chunk.iter().map(|prize| join_button(prize.name())).collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect::<Vec<CreateActionRow>>();

    let previous = CreateButton::new(CustomId::PreviousPage(page.saturating_sub(1)).encode())
        .label("Previous")
        .style(ButtonStyle::Secondary)
        .disabled(page == 0);
    let next = CreateButton::new(CustomId::NextPage((page + 1).min(pages - 1)).encode())
        .label("Next")
        .style(ButtonStyle::Secondary)
        .disabled(page + 1 >= pages);
    let list_all = CreateButton::new(CustomId::ListAll.encode())
        .label("All participants")
        .style(ButtonStyle::Secondary);
    rows.push(CreateActionRow::Buttons(vec![previous, next, list_all]));

    (embed, rows)
}
