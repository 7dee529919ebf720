use crate::commands::prize::formatters::base::ParticipantFormatter;
use crate::commands::prize::models::ResolvedParticipant;

pub struct DefaultParticipantFormatter;

impl DefaultParticipantFormatter {
    pub fn new() -> Self {
        DefaultParticipantFormatter {}
    }
}

impl ParticipantFormatter for DefaultParticipantFormatter {
    fn display_name(&self, participant: &ResolvedParticipant) -> String {
        match participant {
            ResolvedParticipant::Member { display_name, .. } => display_name.clone(),
            ResolvedParticipant::Unknown(id) => format!("ID:{}", id),
            ResolvedParticipant::Legacy(name) => name.clone(),
        }
    }

    fn mention(&self, participant: &ResolvedParticipant) -> String {
        match participant {
            ResolvedParticipant::Member { user_id, .. } => format!("<@{}>", user_id),
            ResolvedParticipant::Unknown(id) => format!("**ID:{}**", id),
            ResolvedParticipant::Legacy(name) => format!("**@{}**", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::prize::formatters::{DefaultParticipantFormatter, ParticipantFormatter};
    use crate::commands::prize::models::ResolvedParticipant;

    #[test]
    fn test_member_output() {
        let formatter = DefaultParticipantFormatter::new();
        let member = ResolvedParticipant::Member {
            user_id: 42,
            display_name: "Alice".to_string(),
        };

        assert_eq!(formatter.display_name(&member), "Alice");
        assert_eq!(formatter.mention(&member), "<@42>");
    }

    #[test]
    fn test_unknown_falls_back_to_raw_id() {
        let formatter = DefaultParticipantFormatter::new();
        let unknown = ResolvedParticipant::Unknown("42".to_string());

        assert_eq!(formatter.display_name(&unknown), "ID:42");
        assert_eq!(formatter.mention(&unknown), "**ID:42**");
    }

    #[test]
    fn test_legacy_name_output() {
        let formatter = DefaultParticipantFormatter::new();
        let legacy = ResolvedParticipant::Legacy("OldNickname".to_string());

        assert_eq!(formatter.display_name(&legacy), "OldNickname");
        assert_eq!(formatter.mention(&legacy), "**@OldNickname**");
    }
}
