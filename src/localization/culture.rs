//! Culture code to Gridly language code

use super::settings::LocalizationSettings;

/// Gridly code for `culture`, or `None` when it maps to nothing.
///
/// An explicit `culture_map` entry wins; otherwise separators are dropped,
/// so `en-US` becomes `enUS`.
pub fn to_gridly_culture(settings: &LocalizationSettings, culture: &str) -> Option<String> {
    let code = match settings.culture_map.get(culture) {
        Some(mapped) => mapped.clone(),
        None => culture.chars().filter(|c| *c != '-' && *c != '_').collect(),
    };
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}
