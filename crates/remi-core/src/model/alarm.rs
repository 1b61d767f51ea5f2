// ── Alarm helpers ──

/// Day abbreviations, Sunday first, matching the recurrence mask order.
pub const DAYS_OF_WEEK: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Days selected by a recurrence mask. Entries past the seventh are
/// ignored.
pub fn recurrence_days(mask: &[bool]) -> Vec<&'static str> {
    mask.iter()
        .zip(DAYS_OF_WEEK)
        .filter_map(|(&active, day)| active.then_some(day))
        .collect()
}

/// `HH:MM`, zero padded.
pub fn format_time(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}
