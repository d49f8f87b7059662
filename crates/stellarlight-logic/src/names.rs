//! Name generation for star systems and planets.

use rand::Rng;

/// Generate a star-system name from two or three syllables, optionally
/// followed by a catalog-style designation.
pub fn generate_system_name(rng: &mut impl Rng) -> String {
    let syllables = rng.gen_range(2..=3);
    let mut name = String::new();
    for i in 0..syllables {
        let pool = if i == 0 { PREFIXES } else { SYLLABLES };
        name.push_str(pool[rng.gen_range(0..pool.len())]);
    }

    let mut chars = name.chars();
    let mut name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => name,
    };

    if rng.gen_bool(0.15) {
        let designation = DESIGNATIONS[rng.gen_range(0..DESIGNATIONS.len())];
        name = format!("{} {}", designation, name);
    }
    name
}

/// Planet name: star name plus its orbit number in roman numerals.
pub fn planet_name(star_name: &str, orbit: u32) -> String {
    format!("{} {}", star_name, roman_numeral(orbit))
}

/// Roman numeral for 1..=3999; plain digits otherwise.
pub fn roman_numeral(n: u32) -> String {
    if n == 0 || n > 3999 {
        return n.to_string();
    }
    const TABLE: &[(u32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut rest = n;
    let mut out = String::new();
    for &(value, glyph) in TABLE {
        while rest >= value {
            out.push_str(glyph);
            rest -= value;
        }
    }
    out
}

static PREFIXES: &[&str] = &[
    "al", "ar", "bel", "cor", "del", "el", "fen", "gal", "hel", "ir", "ka", "lor", "mir", "nor",
    "or", "pra", "quo", "rig", "sol", "tar", "ul", "vel", "xan", "yor", "zen",
];

static SYLLABLES: &[&str] = &[
    "a", "ba", "cyon", "dra", "e", "gon", "is", "ka", "lux", "ma", "nis", "on", "pha", "ra",
    "rus", "sa", "th", "tis", "us", "ve", "xa", "zar",
];

static DESIGNATIONS: &[&str] = &["Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Tau"];
