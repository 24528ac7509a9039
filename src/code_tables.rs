//! Static code tables for the categorical survey variables.
//!
//! Each table maps the integer code written in the data file to its description.
//! Tables are built once on first use and never change afterwards.
//!
//! # Verified entries
//!
//! The code books these tables come from are not reproduced here. Only the following
//! entries are confirmed against known survey output: race 2 (`BLACK`), MOS 21
//! (`BAND`), handedness 2 (`LEFT-HANDED`), birthplace 95 (`HAWAII`) and rank 13
//! (`O3`). Every other entry is a best guess at the code book's layout and should be
//! checked against the survey documentation before it is relied on.
use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// A read-only mapping from integer codes to descriptions.
#[derive(Debug, Clone)]
pub struct CodeTable {
    name: &'static str,
    codes: BTreeMap<i64, &'static str>,
}

impl CodeTable {
    fn from_pairs(name: &'static str, pairs: &[(i64, &'static str)]) -> Self {
        Self { name, codes: pairs.iter().copied().collect() }
    }

    /// The variable this table describes, e.g. `"race"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The description for `code`, or `None` if the code is not in the table.
    pub fn get(&self, code: i64) -> Option<&'static str> {
        self.codes.get(&code).copied()
    }

    /// The description for `code`, or an empty string if the code is not in the table.
    pub fn lookup(&self, code: i64) -> &'static str {
        self.get(code).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterate over `(code, description)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &'static str)> + '_ {
        self.codes.iter().map(|(&k, &v)| (k, v))
    }
}

pub static RACE: Lazy<CodeTable> = Lazy::new(|| CodeTable::from_pairs("race", &[
    (1, "WHITE"),
    (2, "BLACK"),
    (3, "AMERICAN INDIAN"),
    (4, "ASIAN"),
    (5, "MEXICAN-AMERICAN"),
    (6, "PUERTO RICAN"),
    (9, "OTHER"),
]));

pub static HANDEDNESS: Lazy<CodeTable> = Lazy::new(|| CodeTable::from_pairs("handedness", &[
    (1, "RIGHT-HANDED"),
    (2, "LEFT-HANDED"),
    (3, "AMBIDEXTROUS"),
]));

/// Pay grade. Only code 13 (`O3`) is verified; the grouping of enlisted (1-9),
/// officer (11-17) and warrant officer (21-24) codes is assumed.
pub static RANK: Lazy<CodeTable> = Lazy::new(|| CodeTable::from_pairs("rank", &[
    (1, "E1"),
    (2, "E2"),
    (3, "E3"),
    (4, "E4"),
    (5, "E5"),
    (6, "E6"),
    (7, "E7"),
    (8, "E8"),
    (9, "E9"),
    (11, "O1"),
    (12, "O2"),
    (13, "O3"),
    (14, "O4"),
    (15, "O5"),
    (16, "O6"),
    (17, "O7"),
    (21, "W1"),
    (22, "W2"),
    (23, "W3"),
    (24, "W4"),
]));

/// Military occupational specialty. Only code 21 (`BAND`) is verified.
pub static MOS: Lazy<CodeTable> = Lazy::new(|| CodeTable::from_pairs("mos", &[
    (11, "INFANTRY"),
    (12, "COMBAT ENGINEERING"),
    (13, "FIELD ARTILLERY"),
    (16, "AIR DEFENSE ARTILLERY"),
    (19, "ARMOR"),
    (21, "BAND"),
    (31, "COMMUNICATIONS"),
    (54, "CHEMICAL"),
    (55, "AMMUNITION"),
    (63, "MECHANICAL MAINTENANCE"),
    (64, "MOTOR TRANSPORT"),
    (67, "AIRCRAFT MAINTENANCE"),
    (71, "ADMINISTRATION"),
    (76, "SUPPLY"),
    (91, "MEDICAL"),
    (94, "FOOD SERVICE"),
    (95, "MILITARY POLICE"),
    (96, "INTELLIGENCE"),
]));

/// State or territory of birth. Only code 95 (`HAWAII`) is verified; the alphabetical
/// numbering of the contiguous states is assumed.
pub static BIRTHPLACE: Lazy<CodeTable> = Lazy::new(|| CodeTable::from_pairs("birthplace", &[
    (1, "ALABAMA"),
    (2, "ARIZONA"),
    (3, "ARKANSAS"),
    (4, "CALIFORNIA"),
    (5, "COLORADO"),
    (6, "CONNECTICUT"),
    (7, "DELAWARE"),
    (8, "FLORIDA"),
    (9, "GEORGIA"),
    (10, "IDAHO"),
    (11, "ILLINOIS"),
    (12, "INDIANA"),
    (13, "IOWA"),
    (14, "KANSAS"),
    (15, "KENTUCKY"),
    (16, "LOUISIANA"),
    (17, "MAINE"),
    (18, "MARYLAND"),
    (19, "MASSACHUSETTS"),
    (20, "MICHIGAN"),
    (21, "MINNESOTA"),
    (22, "MISSISSIPPI"),
    (23, "MISSOURI"),
    (24, "MONTANA"),
    (25, "NEBRASKA"),
    (26, "NEVADA"),
    (27, "NEW HAMPSHIRE"),
    (28, "NEW JERSEY"),
    (29, "NEW MEXICO"),
    (30, "NEW YORK"),
    (31, "NORTH CAROLINA"),
    (32, "NORTH DAKOTA"),
    (33, "OHIO"),
    (34, "OKLAHOMA"),
    (35, "OREGON"),
    (36, "PENNSYLVANIA"),
    (37, "RHODE ISLAND"),
    (38, "SOUTH CAROLINA"),
    (39, "SOUTH DAKOTA"),
    (40, "TENNESSEE"),
    (41, "TEXAS"),
    (42, "UTAH"),
    (43, "VERMONT"),
    (44, "VIRGINIA"),
    (45, "WASHINGTON"),
    (46, "WEST VIRGINIA"),
    (47, "WISCONSIN"),
    (48, "WYOMING"),
    (49, "DISTRICT OF COLUMBIA"),
    (94, "ALASKA"),
    (95, "HAWAII"),
    (96, "PUERTO RICO"),
    (97, "OTHER US POSSESSION"),
    (98, "FOREIGN COUNTRY"),
]));
