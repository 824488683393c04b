use crate::schemas::{Member, Profile, Uid};

/// Lookup seam for the external profile service. The core only ever needs
/// the display-name query, and only for imported expenses.
pub trait ProfileDirectory {
    /// Case-insensitive, whitespace-trimmed display-name lookup. Ties
    /// between identically named profiles must go to the smallest uid so
    /// attribution is stable across runs.
    fn find_by_name(&self, name: &str) -> Option<&Profile>;
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Attribute an expense payer to a project member.
///
/// The uid path is the primary one: expenses written through the API carry
/// a member uid. The display-name match is a back-compat shim for imported
/// data and is deliberately the only place name-based attribution exists.
/// Returns `None` when neither path lands on a current member; the caller
/// decides what an unattributed amount means.
pub fn resolve_payer(
    payer: &str,
    members: &[Member],
    profiles: &impl ProfileDirectory,
) -> Option<Uid> {
    if let Some(member) = members.iter().find(|m| m.uid == payer) {
        return Some(member.uid.clone());
    }
    let profile = profiles.find_by_name(payer)?;
    members
        .iter()
        .find(|m| m.uid == profile.uid)
        .map(|m| m.uid.clone())
}
