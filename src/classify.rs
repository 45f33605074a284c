use std::sync::LazyLock;

use regex::Regex;

use crate::facility::{AmenityType, Classification};
use crate::normalize::AttributeBag;

static HEALTH_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "healthcare|health_facility:type|health_specialty|hos?pital|doctor|cl?n?c|cl[ií]nic|dentist|pharma|farma",
    )
    .unwrap()
});

static HEALTH_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "hos?pital|cl?n?c|cl[ií]nic|laborator|pharmacy|health_post|health_cent[er][re]|doctor|dentist|optic|medic|hospice",
    )
    .unwrap()
});

static EDUCATION_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new("education|school").unwrap());

static EDUCATION_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("school|university|kindergarten|college").unwrap());

static HEALTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "hos?pital|dentist|pharmacy|farma|laborator|cl[ií]nic|medic|[oó]ptic|hospice|doctor|",
        "materna|maternity|puesto m.?dico|puesto de salud|centro de salud|centro m.?dic.?|",
        "unidad m.?dic.?|m.?dico.? unid.*|health[_ ]post|health_cent[er][re]|",
        "health_facility:type|health_specialty",
    ))
    .unwrap()
});

static EDUCATION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "universidad|university|escuela|school|college|colegio|academy|escolar|kindergarten",
    )
    .unwrap()
});

static LABORATORY: LazyLock<Regex> = LazyLock::new(|| Regex::new("laborator").unwrap());

static VALUE_AS_TYPE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("health_facility:type|healthcare").unwrap());

const SPECIALTY_PREFIX: &str = "health_specialty:";

#[derive(Debug, Clone, Copy)]
enum Signal {
    Key,
    AmenityValue,
}

struct TagRule {
    signal: Signal,
    pattern: &'static Regex,
    amenity: AmenityType,
    derive: fn(&str, &str) -> Option<String>,
}

impl TagRule {
    fn apply(&self, key: &str, value: &str) -> Option<Classification> {
        let hit = match self.signal {
            Signal::Key => self.pattern.is_match(key),
            Signal::AmenityValue => {
                key.contains("amenity") && self.pattern.is_match(&value.to_lowercase())
            }
        };
        hit.then(|| Classification::new(self.amenity, (self.derive)(key, value)))
    }
}

fn health_key_type(key: &str, value: &str) -> Option<String> {
    if VALUE_AS_TYPE_KEY.is_match(key) {
        return non_blank(value);
    }
    if let Some(start) = key.find(SPECIALTY_PREFIX) {
        return non_blank(&key[start + SPECIALTY_PREFIX.len()..]);
    }
    Some(key.to_string())
}

fn education_key_type(key: &str, value: &str) -> Option<String> {
    if key == "education" {
        non_blank(value)
    } else {
        Some(format!("school:{value}"))
    }
}

fn health_value_type(_key: &str, value: &str) -> Option<String> {
    if LABORATORY.is_match(&value.to_lowercase()) {
        Some("laboratory".to_string())
    } else {
        non_blank(value)
    }
}

fn value_type(_key: &str, value: &str) -> Option<String> {
    non_blank(value)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

static TAG_RULES: LazyLock<[TagRule; 4]> = LazyLock::new(|| {
    [
        TagRule {
            signal: Signal::Key,
            pattern: &*HEALTH_KEY,
            amenity: AmenityType::Health,
            derive: health_key_type,
        },
        TagRule {
            signal: Signal::Key,
            pattern: &*EDUCATION_KEY,
            amenity: AmenityType::Education,
            derive: education_key_type,
        },
        TagRule {
            signal: Signal::AmenityValue,
            pattern: &*HEALTH_VALUE,
            amenity: AmenityType::Health,
            derive: health_value_type,
        },
        TagRule {
            signal: Signal::AmenityValue,
            pattern: &*EDUCATION_VALUE,
            amenity: AmenityType::Education,
            derive: value_type,
        },
    ]
});

static NAME_RULES: LazyLock<[(&Regex, AmenityType); 2]> = LazyLock::new(|| {
    [
        (&*EDUCATION_NAME, AmenityType::Education),
        (&*HEALTH_NAME, AmenityType::Health),
    ]
});

static HEALTH_SUBTYPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    subtype_table(&[
        ("hos?pital", "hospital"),
        ("dentist", "dentist"),
        ("pharmacy|farma", "pharmacy"),
        ("laborator", "laboratory"),
        ("cl[ií]nic", "clinic"),
        ("puesto m.?dico|puesto de salud|health[_ ]post", "health_post"),
        (
            "centro de salud|centro m.?dic.?|unidad m.?dic.?|m.?dico.? unid.*|health_cent[er][re]",
            "health_centre",
        ),
        ("doctor|medic", "medic"),
        ("materna|maternity", "maternity_home"),
        ("hospice", "other:hospice"),
        ("[oó]ptic", "other:optic"),
    ])
});

static EDUCATION_SUBTYPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    subtype_table(&[
        ("universidad|university", "university"),
        (
            "escuela|school|college|colegio|academy|escolar|kindergarten",
            "school",
        ),
    ])
});

fn subtype_table(entries: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    entries
        .iter()
        .map(|(pattern, facility_type)| (Regex::new(pattern).unwrap(), *facility_type))
        .collect()
}

pub fn classify_tags(tags: &[(String, String)]) -> Option<Classification> {
    TAG_RULES
        .iter()
        .find_map(|rule| tags.iter().find_map(|(key, value)| rule.apply(key, value)))
}

pub fn classify_names(names: &[String]) -> Option<Classification> {
    names.iter().find_map(|name| classify_amenity_type(name))
}

pub fn classify_bag(bag: &AttributeBag) -> Option<Classification> {
    classify_tags(&bag.tags).or_else(|| classify_names(&bag.names))
}

/// Free-text classification of a facility name. Education outranks health.
pub fn classify_amenity_type(name: &str) -> Option<Classification> {
    let lowered = name.to_lowercase();
    NAME_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lowered))
        .map(|(_, amenity)| {
            Classification::new(*amenity, classify_facility_type(&lowered, *amenity))
        })
}

pub fn classify_facility_type(name: &str, amenity: AmenityType) -> Option<String> {
    let table = match amenity {
        AmenityType::Health => &HEALTH_SUBTYPES,
        AmenityType::Education => &EDUCATION_SUBTYPES,
        AmenityType::Community | AmenityType::Other => return None,
    };
    let lowered = name.to_lowercase();
    table
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lowered))
        .map(|(_, facility_type)| facility_type.to_string())
}

pub fn classify_amenity_label(label: &str, name: Option<&str>) -> Classification {
    match label.trim() {
        "hospital" => Classification::new(
            AmenityType::Health,
            name.and_then(|name| classify_facility_type(name, AmenityType::Health)),
        ),
        label @ ("university" | "school") => {
            Classification::with_type(AmenityType::Education, label)
        }
        "" => Classification::new(AmenityType::Other, None),
        label => Classification::with_type(AmenityType::Other, label),
    }
}

/// Label mapping for the buildings shapefile layer.
///
/// `yes`/`no` labels say nothing about use, so the name decides; without a
/// usable name the record is unclassifiable.
pub fn classify_building_label(label: &str, name: Option<&str>) -> Option<Classification> {
    let label = label.trim().to_lowercase();
    let classification = match label.as_str() {
        "hospital" | "salud" => Classification::new(
            AmenityType::Health,
            name.and_then(|name| classify_facility_type(name, AmenityType::Health)),
        ),
        label if EDUCATION_NAME.is_match(label) => Classification::new(
            AmenityType::Education,
            classify_facility_type(label, AmenityType::Education),
        ),
        "church" | "chapel" => Classification::with_type(AmenityType::Community, "church"),
        "yes" | "no" => return name.and_then(classify_amenity_type),
        "" => Classification::new(AmenityType::Other, None),
        label => Classification::with_type(AmenityType::Other, label),
    };
    Some(classification)
}
