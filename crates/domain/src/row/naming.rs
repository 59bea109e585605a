//! Automatic row names drawn from a fixed pool of solar-system bodies.

/// Candidate names, taken in this order.
pub const ROW_NAME_POOL: [&str; 16] = [
    "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Pluto",
    "Ceres", "Eris", "Haumea", "Makemake", "Luna", "Titan", "Europa",
];

/// Pick a name for a new row given the names already used on the farm.
///
/// Returns the first pool name not in `existing`. Once the pool is used up the
/// name becomes `Row-{n + 1}` where `n` is the number of existing rows; that
/// name may itself collide, which the caller reports as a duplicate.
#[must_use]
pub fn resolve_row_name<S: AsRef<str>>(existing: &[S]) -> String {
    ROW_NAME_POOL
        .into_iter()
        .find(|candidate| !existing.iter().any(|name| name.as_ref() == *candidate))
        .map_or_else(
            || format!("Row-{}", existing.len() + 1),
            ToString::to_string,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_with_first_pool_name_on_empty_farm() {
        let existing: [&str; 0] = [];
        assert_eq!(resolve_row_name(&existing), "Mercury");
    }

    #[test]
    fn should_skip_names_already_taken() {
        assert_eq!(resolve_row_name(&["Mercury", "Earth"]), "Venus");
        assert_eq!(resolve_row_name(&["Mercury", "Venus"]), "Earth");
    }

    #[test]
    fn should_fall_back_to_positional_name_when_pool_exhausted() {
        let mut existing: Vec<String> = ROW_NAME_POOL.iter().map(ToString::to_string).collect();
        assert_eq!(resolve_row_name(&existing), "Row-17");

        existing.push("Row-17".to_string());
        assert_eq!(resolve_row_name(&existing), "Row-18");
    }

    #[test]
    fn should_count_custom_names_toward_fallback_position() {
        let mut existing: Vec<String> = ROW_NAME_POOL.iter().map(ToString::to_string).collect();
        existing.push("Quarantine".to_string());
        assert_eq!(resolve_row_name(&existing), "Row-18");
    }
}
