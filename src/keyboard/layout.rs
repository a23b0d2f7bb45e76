use serde::{Deserialize, Serialize};

/// Number of home-row keys that make up a layout fingerprint.
pub const SIGNATURE_LEN: usize = 10;

/// Row index of the home row inside `LayoutDescriptor::rows`.
pub const HOME_ROW: usize = 1;

pub const REFERENCE_LAYOUT_ID: &str = "qwerty-us";

// --- Layout Family ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutFamily {
    Qwerty,
    Qwertz,
    Azerty,
    Dvorak,
    Colemak,
}

impl LayoutFamily {
    pub fn to_key(self) -> &'static str {
        match self {
            LayoutFamily::Qwerty => "qwerty",
            LayoutFamily::Qwertz => "qwertz",
            LayoutFamily::Azerty => "azerty",
            LayoutFamily::Dvorak => "dvorak",
            LayoutFamily::Colemak => "colemak",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "qwerty" => Some(LayoutFamily::Qwerty),
            "qwertz" => Some(LayoutFamily::Qwertz),
            "azerty" => Some(LayoutFamily::Azerty),
            "dvorak" => Some(LayoutFamily::Dvorak),
            "colemak" => Some(LayoutFamily::Colemak),
            _ => None,
        }
    }

    pub fn all() -> &'static [LayoutFamily] {
        &[
            LayoutFamily::Qwerty,
            LayoutFamily::Qwertz,
            LayoutFamily::Azerty,
            LayoutFamily::Dvorak,
            LayoutFamily::Colemak,
        ]
    }

    /// The layout whose characters the family's curriculum is written in.
    pub fn representative(self) -> &'static str {
        match self {
            LayoutFamily::Qwerty => "qwerty-us",
            LayoutFamily::Qwertz => "qwertz-de",
            LayoutFamily::Azerty => "azerty-fr",
            LayoutFamily::Dvorak => "dvorak-us",
            LayoutFamily::Colemak => "colemak-us",
        }
    }
}

// --- Region ---

/// Grouping used by layout pickers. Has no effect on detection or mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    NorthAmerica,
    LatinAmerica,
    WesternEurope,
    SouthernEurope,
    NorthernEurope,
    CentralEurope,
    Alternative,
}

impl Region {
    pub fn to_key(self) -> &'static str {
        match self {
            Region::NorthAmerica => "north_america",
            Region::LatinAmerica => "latin_america",
            Region::WesternEurope => "western_europe",
            Region::SouthernEurope => "southern_europe",
            Region::NorthernEurope => "northern_europe",
            Region::CentralEurope => "central_europe",
            Region::Alternative => "alternative",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "north_america" => Some(Region::NorthAmerica),
            "latin_america" => Some(Region::LatinAmerica),
            "western_europe" => Some(Region::WesternEurope),
            "southern_europe" => Some(Region::SouthernEurope),
            "northern_europe" => Some(Region::NorthernEurope),
            "central_europe" => Some(Region::CentralEurope),
            "alternative" => Some(Region::Alternative),
            _ => None,
        }
    }
}

// --- Descriptor ---

/// A physical layout: three letter rows (top, home, bottom) of unshifted keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub family: LayoutFamily,
    pub region: Region,
    pub rows: &'static [&'static str],
}

impl LayoutDescriptor {
    pub fn row(&self, idx: usize) -> Vec<char> {
        self.rows
            .get(idx)
            .map(|r| r.chars().collect())
            .unwrap_or_default()
    }

    pub fn key_at(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.chars().nth(col))
    }

    /// First ten home-row characters, lowercased.
    pub fn home_row_signature(&self) -> String {
        self.row(HOME_ROW)
            .into_iter()
            .take(SIGNATURE_LEN)
            .flat_map(char::to_lowercase)
            .collect()
    }

    pub fn is_reference(&self) -> bool {
        self.id == REFERENCE_LAYOUT_ID
    }

    /// Position of a character on this layout, ignoring case.
    pub fn position_of(&self, ch: char) -> Option<(usize, usize)> {
        let lower: Vec<char> = ch.to_lowercase().collect();
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, key) in row.chars().enumerate() {
                if key.to_lowercase().eq(lower.iter().copied()) {
                    return Some((row_idx, col_idx));
                }
            }
        }
        None
    }
}

// --- Static Catalog ---

pub const ALL_LAYOUTS: &[LayoutDescriptor] = &[
    LayoutDescriptor {
        id: "qwerty-us",
        name: "QWERTY (US)",
        family: LayoutFamily::Qwerty,
        region: Region::NorthAmerica,
        rows: &["qwertyuiop[]", "asdfghjkl;'", "zxcvbnm,./"],
    },
    LayoutDescriptor {
        id: "qwerty-uk",
        name: "QWERTY (UK)",
        family: LayoutFamily::Qwerty,
        region: Region::WesternEurope,
        rows: &["qwertyuiop[]", "asdfghjkl;'#", "zxcvbnm,./"],
    },
    LayoutDescriptor {
        id: "qwerty-es",
        name: "QWERTY (Spain)",
        family: LayoutFamily::Qwerty,
        region: Region::SouthernEurope,
        rows: &["qwertyuiop`+", "asdfghjklñ´ç", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-latam",
        name: "QWERTY (Latin America)",
        family: LayoutFamily::Qwerty,
        region: Region::LatinAmerica,
        rows: &["qwertyuiop´+", "asdfghjklñ{}", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-it",
        name: "QWERTY (Italy)",
        family: LayoutFamily::Qwerty,
        region: Region::SouthernEurope,
        rows: &["qwertyuiopè+", "asdfghjklòàù", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-pt",
        name: "QWERTY (Portugal)",
        family: LayoutFamily::Qwerty,
        region: Region::SouthernEurope,
        rows: &["qwertyuiop+´", "asdfghjklçº~", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-br",
        name: "QWERTY (Brazil ABNT2)",
        family: LayoutFamily::Qwerty,
        region: Region::LatinAmerica,
        rows: &["qwertyuiop´[", "asdfghjklç~]", "zxcvbnm,.;"],
    },
    LayoutDescriptor {
        id: "qwerty-se",
        name: "QWERTY (Swedish/Finnish)",
        family: LayoutFamily::Qwerty,
        region: Region::NorthernEurope,
        rows: &["qwertyuiopå¨", "asdfghjklöä'", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-no",
        name: "QWERTY (Norwegian)",
        family: LayoutFamily::Qwerty,
        region: Region::NorthernEurope,
        rows: &["qwertyuiopå¨", "asdfghjkløæ'", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-dk",
        name: "QWERTY (Danish)",
        family: LayoutFamily::Qwerty,
        region: Region::NorthernEurope,
        rows: &["qwertyuiopå¨", "asdfghjklæø'", "zxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwerty-tr",
        name: "QWERTY (Turkish Q)",
        family: LayoutFamily::Qwerty,
        region: Region::SouthernEurope,
        rows: &["qwertyuıopğü", "asdfghjklşi,", "zxcvbnmöç."],
    },
    LayoutDescriptor {
        id: "qwertz-de",
        name: "QWERTZ (German)",
        family: LayoutFamily::Qwertz,
        region: Region::CentralEurope,
        rows: &["qwertzuiopü+", "asdfghjklöä#", "yxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwertz-ch",
        name: "QWERTZ (Swiss German)",
        family: LayoutFamily::Qwertz,
        region: Region::CentralEurope,
        rows: &["qwertzuiopü¨", "asdfghjklöä$", "yxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwertz-cz",
        name: "QWERTZ (Czech)",
        family: LayoutFamily::Qwertz,
        region: Region::CentralEurope,
        rows: &["qwertzuiopú)", "asdfghjklů§¨", "yxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "qwertz-hu",
        name: "QWERTZ (Hungarian)",
        family: LayoutFamily::Qwertz,
        region: Region::CentralEurope,
        rows: &["qwertzuiopőú", "asdfghjkléáű", "yxcvbnm,.-"],
    },
    LayoutDescriptor {
        id: "azerty-fr",
        name: "AZERTY (French)",
        family: LayoutFamily::Azerty,
        region: Region::WesternEurope,
        rows: &["azertyuiop^$", "qsdfghjklmù*", "wxcvbn,;:!"],
    },
    LayoutDescriptor {
        id: "azerty-be",
        name: "AZERTY (Belgian)",
        family: LayoutFamily::Azerty,
        region: Region::WesternEurope,
        rows: &["azertyuiop^$", "qsdfghjklmùµ", "wxcvbn,;:="],
    },
    LayoutDescriptor {
        id: "dvorak-us",
        name: "Dvorak",
        family: LayoutFamily::Dvorak,
        region: Region::Alternative,
        rows: &["',.pyfgcrl/=", "aoeuidhtns-", ";qjkxbmwvz"],
    },
    LayoutDescriptor {
        id: "colemak-us",
        name: "Colemak",
        family: LayoutFamily::Colemak,
        region: Region::Alternative,
        rows: &["qwfpgjluy;[]", "arstdhneio'", "zxcvbkm,./"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layout_has_full_home_row() {
        for layout in ALL_LAYOUTS {
            assert_eq!(layout.rows.len(), 3, "{} should have three rows", layout.id);
            assert_eq!(
                layout.home_row_signature().chars().count(),
                SIGNATURE_LEN,
                "{} signature",
                layout.id
            );
        }
    }

    #[test]
    fn test_reference_signature() {
        let us = &ALL_LAYOUTS[0];
        assert!(us.is_reference());
        assert_eq!(us.home_row_signature(), "asdfghjkl;");
    }

    #[test]
    fn test_family_keys_roundtrip() {
        for &family in LayoutFamily::all() {
            assert_eq!(LayoutFamily::from_key(family.to_key()), Some(family));
        }
        assert_eq!(LayoutFamily::from_key("bepo"), None);
    }

    #[test]
    fn test_representatives_belong_to_their_family() {
        for &family in LayoutFamily::all() {
            let rep = ALL_LAYOUTS
                .iter()
                .find(|l| l.id == family.representative())
                .unwrap();
            assert_eq!(rep.family, family);
        }
    }

    #[test]
    fn test_position_of_ignores_case() {
        let us = &ALL_LAYOUTS[0];
        assert_eq!(us.position_of('f'), Some((1, 3)));
        assert_eq!(us.position_of('F'), Some((1, 3)));
        assert_eq!(us.position_of('1'), None);
        assert_eq!(us.key_at(0, 5), Some('y'));
        assert_eq!(us.key_at(5, 0), None);
    }
}
