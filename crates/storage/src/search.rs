use shared::domain::{MemberRecord, SearchKey};

/// Case-insensitive substring filter over one of the two indexed fields.
///
/// A blank term selects every record. The term itself is matched as typed,
/// so surrounding spaces take part in the comparison.
pub fn filter_members<'a>(
    members: &'a [MemberRecord],
    key: SearchKey,
    term: &str,
) -> Vec<&'a MemberRecord> {
    if term.trim().is_empty() {
        return members.iter().collect();
    }

    let needle = term.to_lowercase();
    members
        .iter()
        .filter(|member| {
            let haystack = match key {
                SearchKey::MemberNo => member.member_no.as_str(),
                SearchKey::SiteNo => member.site_no.as_str(),
            };
            haystack.to_lowercase().contains(&needle)
        })
        .collect()
}
