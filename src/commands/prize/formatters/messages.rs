// Text of the messages sent back to the chat.
use crate::commands::prize::formatters::base::ParticipantFormatter;
use crate::commands::prize::models::{
    AddPrizeReport, DrawOutcome, ParticipantListing, Prize, ResolvedParticipant,
};

pub const MESSAGE_LIMIT: usize = 2000;
pub const NO_PRIZES: &str = "There are no prizes. Add some with `add_prize` first.";
pub const ADD_PRIZE_USAGE: &str =
    "Please provide the prizes to add, e.g. `add_prize Keyboard:2, Mouse`.";
pub const LIST_USAGE: &str = "Please provide the prize names, e.g. `list Keyboard, Mouse`.";
pub const RESTORE_USAGE: &str = "Please attach the backup file or paste its JSON content.";

pub fn winners_label(count: u32) -> String {
    match count {
        1 => "1 winner".to_string(),
        _ => format!("{} winners", count),
    }
}

// "a", "a and b", "a, b and c"
pub fn join_with_and(items: &[String]) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

pub fn added_report(report: &AddPrizeReport) -> String {
    if report.is_empty() {
        return ADD_PRIZE_USAGE.to_string();
    }

    let mut lines = Vec::new();
    if !report.added.is_empty() {
        let added = report
            .added
            .iter()
            .map(|(name, winners)| format!("{} ({})", name, winners_label(*winners)))
            .collect::<Vec<String>>()
            .join(", ");
        lines.push(format!("Added prizes: {}", added));
    }
    if !report.already_existed.is_empty() {
        lines.push(format!("Already exist: {}", report.already_existed.join(", ")));
    }
    lines.join("\n")
}

pub fn draw_outcome(
    outcome: &DrawOutcome,
    winners: &[ResolvedParticipant],
    formatter: &dyn ParticipantFormatter,
) -> String {
    match outcome {
        DrawOutcome::NoParticipants { name, .. } => {
            format!("Nobody joined \"{}\", so it can't be drawn.", name)
        }
        DrawOutcome::Winners { name, .. } => {
            let mentions = winners
                .iter()
                .map(|winner| formatter.mention(winner))
                .collect::<Vec<String>>();
            format!("Congratulations {} on winning \"{}\"!", join_with_and(&mentions), name)
        }
    }
}

pub fn participant_listing(
    listing: &ParticipantListing,
    participants: &[ResolvedParticipant],
    formatter: &dyn ParticipantFormatter,
) -> String {
    match listing {
        ParticipantListing::NotFound { name } => format!("There is no prize \"{}\".", name),
        ParticipantListing::Found { name, .. } if participants.is_empty() => {
            format!("Nobody has joined \"{}\" yet.", name)
        }
        ParticipantListing::Found { name, .. } => format!(
            "Participants of \"{}\": {}",
            name,
            display_names(participants, formatter)
        ),
    }
}

// Two line summary of a prize used by the full participants list.
pub fn prize_overview(
    prize: &Prize,
    participants: &[ResolvedParticipant],
    formatter: &dyn ParticipantFormatter,
) -> String {
    let header = format!("**{}** ({})", prize.name(), winners_label(prize.winners()));
    match participants.is_empty() {
        true => format!("{}\nNo participants yet", header),
        false => format!(
            "{}\nParticipants: {}",
            header,
            display_names(participants, formatter)
        ),
    }
}

fn display_names(participants: &[ResolvedParticipant], formatter: &dyn ParticipantFormatter) -> String {
    participants
        .iter()
        .map(|participant| formatter.display_name(participant))
        .collect::<Vec<String>>()
        .join(", ")
}

pub fn joined(prize_name: &str) -> String {
    format!("You have joined the \"{}\" draw!", prize_name)
}

pub fn left(prize_name: &str) -> String {
    format!("You have left the \"{}\" draw.", prize_name)
}

pub fn prize_gone(prize_name: &str) -> String {
    format!("The prize \"{}\" doesn't exist anymore.", prize_name)
}

pub fn restored(count: usize) -> String {
    match count {
        1 => "Restored 1 prize.".to_string(),
        _ => format!("Restored {} prizes.", count),
    }
}

// Splits the text on line boundaries so that every chunk fits into a single
// Discord message. A line longer than the limit is cut on char boundaries.
// Blank lines are kept, so a chunk may start with one or be blank itself.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let mut line = line.to_string();
        while line.chars().count() > limit {
            let head = line.chars().take(limit).collect::<String>();
            line = line.chars().skip(limit).collect::<String>();
            if let Some(chunk) = current.take() {
                chunks.push(chunk);
            }
            chunks.push(head);
        }

        current = match current.take() {
            Some(mut chunk) if chunk.chars().count() + 1 + line.chars().count() <= limit => {
                chunk.push('\n');
                chunk.push_str(&line);
                Some(chunk)
            }
            Some(chunk) => {
                chunks.push(chunk);
                Some(line)
            }
            None => Some(line),
        };
    }

    if let Some(chunk) = current {
        chunks.push(chunk);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use crate::commands::prize::formatters::DefaultParticipantFormatter;
    use crate::commands::prize::formatters::messages::{
        added_report, draw_outcome, join_with_and, participant_listing, prize_overview, restored,
        split_message, winners_label, ADD_PRIZE_USAGE,
    };
    use crate::commands::prize::models::{
        AddPrizeReport, DrawOutcome, ParticipantListing, Prize, ResolvedParticipant,
    };

    fn alice() -> ResolvedParticipant {
        ResolvedParticipant::Member {
            user_id: 1,
            display_name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_winners_label() {
        assert_eq!(winners_label(1), "1 winner");
        assert_eq!(winners_label(3), "3 winners");
    }

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_join_with_and() {
        assert_eq!(join_with_and(&items(&[])), "");
        assert_eq!(join_with_and(&items(&["a"])), "a");
        assert_eq!(join_with_and(&items(&["a", "b"])), "a and b");
        assert_eq!(join_with_and(&items(&["a", "b", "c"])), "a, b and c");
    }

    #[test]
    fn test_added_report() {
        let report = AddPrizeReport {
            added: vec![("A".to_string(), 2), ("B".to_string(), 1)],
            already_existed: vec!["C".to_string()],
        };

        assert_eq!(
            added_report(&report),
            "Added prizes: A (2 winners), B (1 winner)\nAlready exist: C"
        );
        assert_eq!(added_report(&AddPrizeReport::default()), ADD_PRIZE_USAGE);
    }

    #[test]
    fn test_draw_outcome_messages() {
        let formatter = DefaultParticipantFormatter::new();
        let no_participants = DrawOutcome::NoParticipants {
            name: "Mouse".to_string(),
            quota: 1,
        };
        let winners = DrawOutcome::Winners {
            name: "Keyboard".to_string(),
            count: 2,
            winners: vec!["1".to_string(), "2".to_string()],
        };
        let resolved = vec![alice(), ResolvedParticipant::Unknown("2".to_string())];

        assert_eq!(
            draw_outcome(&no_participants, &[], &formatter),
            "Nobody joined \"Mouse\", so it can't be drawn."
        );
        assert_eq!(
            draw_outcome(&winners, &resolved, &formatter),
            "Congratulations <@1> and **ID:2** on winning \"Keyboard\"!"
        );
    }

    #[test]
    fn test_participant_listing_messages() {
        let formatter = DefaultParticipantFormatter::new();
        let missing = ParticipantListing::NotFound {
            name: "Nope".to_string(),
        };
        let empty = ParticipantListing::Found {
            name: "Mouse".to_string(),
            participants: vec![],
        };
        let found = ParticipantListing::Found {
            name: "Keyboard".to_string(),
            participants: vec!["1".to_string(), "Bob".to_string()],
        };
        let resolved = vec![alice(), ResolvedParticipant::Legacy("Bob".to_string())];

        assert_eq!(participant_listing(&missing, &[], &formatter), "There is no prize \"Nope\".");
        assert_eq!(
            participant_listing(&empty, &[], &formatter),
            "Nobody has joined \"Mouse\" yet."
        );
        assert_eq!(
            participant_listing(&found, &resolved, &formatter),
            "Participants of \"Keyboard\": Alice, Bob"
        );
    }

    #[test]
    fn test_prize_overview() {
        let formatter = DefaultParticipantFormatter::new();
        let prize = Prize::new("Keyboard", 2).with_participants(vec!["1"]);

        assert_eq!(
            prize_overview(&prize, &[alice()], &formatter),
            "**Keyboard** (2 winners)\nParticipants: Alice"
        );
        assert_eq!(
            prize_overview(&Prize::new("Mouse", 1), &[], &formatter),
            "**Mouse** (1 winner)\nNo participants yet"
        );
    }

    #[test]
    fn test_restored() {
        assert_eq!(restored(0), "Restored 0 prizes.");
        assert_eq!(restored(1), "Restored 1 prize.");
    }

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("a\nb", 10), vec!["a\nb"]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 9), vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_split_long_line() {
        assert_eq!(split_message("abcdefg", 3), vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_split_keeps_blank_line_at_chunk_start() {
        let chunks = split_message("aaaa\n\nbb", 4);

        assert_eq!(chunks, vec!["aaaa", "\nbb"]);
        assert_eq!(chunks.join("\n"), "aaaa\n\nbb");
    }

    #[test]
    fn test_split_keeps_every_chunk_within_limit() {
        let text = (0..500)
            .map(|index| format!("line number {}", index))
            .collect::<Vec<String>>()
            .join("\n");

        let chunks = split_message(&text, 200);
        assert_eq!(chunks.iter().all(|chunk| chunk.chars().count() <= 200), true);
        assert_eq!(chunks.join("\n"), text);
    }
}
