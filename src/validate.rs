use std::sync::LazyLock;

use regex::Regex;

use crate::classify::classify_amenity_type;
use crate::facility::{AmenityType, Classification};

static IMPLAUSIBLE_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new("internet|access").unwrap());

/// Returns the classification unchanged when accepted, `None` when the record
/// must be dropped. Names only decide acceptance of an implausible health type.
pub fn validate(classification: Classification, names: &[String]) -> Option<Classification> {
    if classification.amenity != AmenityType::Health {
        return Some(classification);
    }
    let plausible_type = classification
        .facility_type
        .as_deref()
        .is_some_and(|facility_type| {
            !facility_type.trim().is_empty() && !IMPLAUSIBLE_TYPE.is_match(facility_type)
        });
    if plausible_type {
        return Some(classification);
    }
    let confirmed = names
        .iter()
        .filter_map(|name| classify_amenity_type(name))
        .any(|by_name| by_name.amenity == AmenityType::Health);
    confirmed.then_some(classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn accepts_health_with_plausible_type() {
        let classification = Classification::with_type(AmenityType::Health, "hospital");
        assert_eq!(
            validate(classification.clone(), &[]),
            Some(classification)
        );
    }

    #[test]
    fn rejects_internet_access_without_health_name() {
        let classification = Classification::with_type(AmenityType::Health, "internet_access");
        assert_eq!(
            validate(classification, &names(&["Café Las Flores"])),
            None
        );
    }

    #[test]
    fn rejects_missing_type_without_names() {
        let classification = Classification::new(AmenityType::Health, None);
        assert_eq!(validate(classification, &[]), None);
    }

    #[test]
    fn name_confirmation_keeps_first_pass_type() {
        let classification = Classification::with_type(AmenityType::Health, "wheelchair:access");
        let accepted = validate(
            classification.clone(),
            &names(&["Escuela Normal", "Farmacia Praga"]),
        );
        assert_eq!(accepted, Some(classification));
    }

    #[test]
    fn medical_school_name_does_not_confirm_health() {
        let classification = Classification::with_type(AmenityType::Health, "internet_access");
        assert_eq!(
            validate(classification, &names(&["Escuela de Medicina"])),
            None
        );
    }

    #[test]
    fn education_is_never_rejected() {
        let classification = Classification::with_type(AmenityType::Education, "internet_access");
        assert_eq!(
            validate(classification.clone(), &[]),
            Some(classification)
        );
    }

    #[test]
    fn blank_facility_type_counts_as_missing() {
        let classification = Classification::with_type(AmenityType::Health, " ");
        assert_eq!(validate(classification.clone(), &[]), None);
        assert_eq!(
            validate(classification.clone(), &names(&["Clínica Tiscapa"])),
            Some(classification)
        );
    }
}
