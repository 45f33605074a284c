use std::sync::LazyLock;

use regex::Regex;

use crate::facility::Address;

static NAME_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^name|alt_name|official_name|old_name|int_name|loc_name|reg_name|short_name")
        .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressField {
    FullAddr,
    BuildingNo,
    Street,
    HouseName,
    District,
    City,
    Province,
    PostalCode,
}

static ADDRESS_KEYS: LazyLock<Vec<(Regex, AddressField)>> = LazyLock::new(|| {
    [
        ("^addr:(full|postal)", AddressField::FullAddr),
        ("^addr:(buildingnumber|housenumber)", AddressField::BuildingNo),
        ("^addr:street", AddressField::Street),
        ("^addr:housename", AddressField::HouseName),
        ("^addr:district", AddressField::District),
        ("^addr:city", AddressField::City),
        ("^(addr:province|is_in:state)", AddressField::Province),
        ("^(addr:postcode|postal_code)", AddressField::PostalCode),
    ]
    .into_iter()
    .map(|(pattern, field)| (Regex::new(pattern).unwrap(), field))
    .collect()
});

fn address_slot(address: &mut Address, field: AddressField) -> &mut Option<String> {
    match field {
        AddressField::FullAddr => &mut address.full_addr,
        AddressField::BuildingNo => &mut address.building_no,
        AddressField::Street => &mut address.street,
        AddressField::HouseName => &mut address.housename,
        AddressField::District => &mut address.district,
        AddressField::City => &mut address.city,
        AddressField::Province => &mut address.province,
        AddressField::PostalCode => &mut address.postal_code,
    }
}

fn address_field(key: &str) -> Option<AddressField> {
    ADDRESS_KEYS
        .iter()
        .find(|(pattern, _)| pattern.is_match(key))
        .map(|(_, field)| *field)
}

pub fn is_name_key(key: &str) -> bool {
    NAME_KEY.is_match(key)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag {
    pub names: Vec<String>,
    pub address: Address,
    /// Every tag with its key lower-cased; the classifier reads type hints from here.
    pub tags: Vec<(String, String)>,
}

impl AttributeBag {
    pub fn from_name(name: Option<&str>) -> Self {
        let mut bag = Self::default();
        if let Some(name) = name.filter(|name| !name.trim().is_empty()) {
            bag.names.push(name.to_string());
        }
        bag
    }
}

/// Address fields are last-write-wins per field.
pub fn normalize_tags<'a, T>(tags: T) -> AttributeBag
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut bag = AttributeBag::default();
    for (key, value) in tags {
        let key = key.to_lowercase();
        let blank = value.trim().is_empty();

        if is_name_key(&key) && !blank {
            bag.names.push(value.to_string());
        }
        if let Some(field) = address_field(&key) {
            *address_slot(&mut bag.address, field) = if blank {
                None
            } else {
                Some(value.to_string())
            };
        }
        bag.tags.push((key, value.to_string()));
    }
    bag
}
