//! Reference data used to validate listings.

/// Pet types accepted by the service.
pub const PET_TYPES: &[&str] = &["dog", "cat", "bird", "rabbit", "other"];

const DOG_BREEDS: &[&str] = &[
    "Mixed",
    "Labrador Retriever",
    "German Shepherd",
    "Golden Retriever",
    "Bulldog",
    "Poodle",
    "Beagle",
    "Dogo Argentino",
    "Unknown",
];

const CAT_BREEDS: &[&str] = &[
    "Mixed",
    "Siamese",
    "Persian",
    "Maine Coon",
    "Bengal",
    "Sphynx",
    "Unknown",
];

const BIRD_BREEDS: &[&str] = &["Parakeet", "Canary", "Cockatiel", "Parrot", "Unknown"];

const RABBIT_BREEDS: &[&str] = &["Mixed", "Dwarf", "Lop", "Rex", "Unknown"];

const OTHER_BREEDS: &[&str] = &["Unknown"];

const PROVINCES: &[(&str, &[&str])] = &[
    (
        "Buenos Aires",
        &["La Plata", "Mar del Plata", "Bahía Blanca", "Tandil", "Quilmes"],
    ),
    ("CABA", &["Palermo", "Belgrano", "Caballito", "Recoleta", "San Telmo"]),
    (
        "Córdoba",
        &["Córdoba", "Villa Carlos Paz", "Río Cuarto", "Villa María"],
    ),
    ("Santa Fe", &["Rosario", "Santa Fe", "Rafaela", "Venado Tuerto"]),
    ("Mendoza", &["Mendoza", "San Rafael", "Godoy Cruz", "Luján de Cuyo"]),
    ("Tucumán", &["San Miguel de Tucumán", "Yerba Buena", "Tafí Viejo"]),
    ("Neuquén", &["Neuquén", "San Martín de los Andes", "Cutral Có"]),
];

/// Returns true if `kind` is a known pet type.
pub fn is_valid_type(kind: &str) -> bool {
    PET_TYPES.contains(&kind)
}

/// Breeds accepted for a pet type, or `None` for an unknown type.
pub fn breeds_for(kind: &str) -> Option<&'static [&'static str]> {
    match kind {
        "dog" => Some(DOG_BREEDS),
        "cat" => Some(CAT_BREEDS),
        "bird" => Some(BIRD_BREEDS),
        "rabbit" => Some(RABBIT_BREEDS),
        "other" => Some(OTHER_BREEDS),
        _ => None,
    }
}

pub fn is_valid_breed(kind: &str, breed: &str) -> bool {
    breeds_for(kind).is_some_and(|breeds| breeds.contains(&breed))
}

/// Known provinces, in display order.
pub fn provinces() -> impl Iterator<Item = &'static str> {
    PROVINCES.iter().map(|(province, _)| *province)
}

/// Cities of a province, or `None` for an unknown province.
pub fn cities_for(province: &str) -> Option<&'static [&'static str]> {
    PROVINCES
        .iter()
        .find(|(name, _)| *name == province)
        .map(|(_, cities)| *cities)
}

pub fn is_valid_province(province: &str) -> bool {
    cities_for(province).is_some()
}

pub fn is_valid_city(province: &str, city: &str) -> bool {
    cities_for(province).is_some_and(|cities| cities.contains(&city))
}

/// Formats the stored last-seen place.
pub fn place(province: &str, city: &str) -> String {
    format!("{province}, {city}")
}
