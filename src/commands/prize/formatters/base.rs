use crate::commands::prize::models::ResolvedParticipant;

pub trait ParticipantFormatter {
    // Plain name used in participant listings.
    fn display_name(&self, participant: &ResolvedParticipant) -> String;
    // Highlighted form used when announcing winners.
    fn mention(&self, participant: &ResolvedParticipant) -> String;
}
