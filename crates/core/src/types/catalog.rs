//! Static menu catalog.
//!
//! Items and extras are closed sets. Their display names must match the
//! option labels on the upstream order pages exactly, since ids are scraped by
//! matching on those labels.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BadRequest;

/// An appetizer that fills one slot of a Triple Dipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Item {
    AwesomeBlossomPetals,
    BigMouthBites,
    BonelessBuffaloWings,
    BonelessHoneyChipotleWings,
    BonelessHouseBbqWings,
    BonelessMangoHabaneroWings,
    BuffaloWings,
    CrispyCheddarBites,
    CrispyChickenCrispers,
    CrispyHoneyChipotleCrispers,
    CrispyMangoHabaneroCrispers,
    FriedPickles,
    HoneyChipotleWings,
    HouseBbqWings,
    MangoHabaneroWings,
    OriginalChickenCrispers,
    SouthwesternEggrolls,
}

/// An optional side for a [`Item`], typically a dipping sauce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Extra {
    AnchoChileRanch,
    AvocadoRanch,
    BleuCheese,
    HoneyMustard,
    OriginalBbq,
    Ranch,
}

/// Extras offered with every boneless and bone-in wing.
const WING_EXTRAS: &[Extra] = &[Extra::BleuCheese, Extra::Ranch];

/// Extras offered with every chicken crisper.
const CRISPER_EXTRAS: &[Extra] = &[Extra::HoneyMustard, Extra::OriginalBbq, Extra::Ranch];

/// Extras offered with the fried starters.
const FRIED_EXTRAS: &[Extra] = &[Extra::AvocadoRanch, Extra::Ranch];

impl Item {
    /// Every item, in catalog order.
    pub const ALL: [Self; 17] = [
        Self::AwesomeBlossomPetals,
        Self::BigMouthBites,
        Self::BonelessBuffaloWings,
        Self::BonelessHoneyChipotleWings,
        Self::BonelessHouseBbqWings,
        Self::BonelessMangoHabaneroWings,
        Self::BuffaloWings,
        Self::CrispyCheddarBites,
        Self::CrispyChickenCrispers,
        Self::CrispyHoneyChipotleCrispers,
        Self::CrispyMangoHabaneroCrispers,
        Self::FriedPickles,
        Self::HoneyChipotleWings,
        Self::HouseBbqWings,
        Self::MangoHabaneroWings,
        Self::OriginalChickenCrispers,
        Self::SouthwesternEggrolls,
    ];

    /// Returns the `snake_case` key used in order files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AwesomeBlossomPetals => "awesome_blossom_petals",
            Self::BigMouthBites => "big_mouth_bites",
            Self::BonelessBuffaloWings => "boneless_buffalo_wings",
            Self::BonelessHoneyChipotleWings => "boneless_honey_chipotle_wings",
            Self::BonelessHouseBbqWings => "boneless_house_bbq_wings",
            Self::BonelessMangoHabaneroWings => "boneless_mango_habanero_wings",
            Self::BuffaloWings => "buffalo_wings",
            Self::CrispyCheddarBites => "crispy_cheddar_bites",
            Self::CrispyChickenCrispers => "crispy_chicken_crispers",
            Self::CrispyHoneyChipotleCrispers => "crispy_honey_chipotle_crispers",
            Self::CrispyMangoHabaneroCrispers => "crispy_mango_habanero_crispers",
            Self::FriedPickles => "fried_pickles",
            Self::HoneyChipotleWings => "honey_chipotle_wings",
            Self::HouseBbqWings => "house_bbq_wings",
            Self::MangoHabaneroWings => "mango_habanero_wings",
            Self::OriginalChickenCrispers => "original_chicken_crispers",
            Self::SouthwesternEggrolls => "southwestern_eggrolls",
        }
    }

    /// Returns the item's display name as shown on the upstream menu.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AwesomeBlossomPetals => "Awesome Blossom Petals",
            Self::BigMouthBites => "Big Mouth® Bites",
            Self::BonelessBuffaloWings => "Boneless Buffalo Wings",
            Self::BonelessHoneyChipotleWings => "Boneless Honey-Chipotle Wings",
            Self::BonelessHouseBbqWings => "Boneless House BBQ Wings",
            Self::BonelessMangoHabaneroWings => "Boneless Mango-Habanero Wings",
            Self::BuffaloWings => "Buffalo Wings",
            Self::CrispyCheddarBites => "Crispy Cheddar Bites",
            Self::CrispyChickenCrispers => "Crispy Chicken Crispers",
            Self::CrispyHoneyChipotleCrispers => "Crispy Honey-Chipotle Chicken Crispers®",
            Self::CrispyMangoHabaneroCrispers => "Crispy Mango-Habanero Crispers®",
            Self::FriedPickles => "Fried Pickles",
            Self::HoneyChipotleWings => "Honey-Chipotle Wings",
            Self::HouseBbqWings => "House BBQ Wings",
            Self::MangoHabaneroWings => "Mango-Habanero Wings",
            Self::OriginalChickenCrispers => "Original Chicken Crispers®",
            Self::SouthwesternEggrolls => "Southwestern Eggrolls",
        }
    }

    /// Returns the extras that may accompany this item.
    #[must_use]
    pub const fn permitted(self) -> &'static [Extra] {
        match self {
            Self::AwesomeBlossomPetals | Self::FriedPickles | Self::SouthwesternEggrolls => {
                FRIED_EXTRAS
            }
            Self::BigMouthBites => &[Extra::Ranch],
            Self::BonelessBuffaloWings
            | Self::BonelessHoneyChipotleWings
            | Self::BonelessHouseBbqWings
            | Self::BonelessMangoHabaneroWings
            | Self::BuffaloWings
            | Self::HoneyChipotleWings
            | Self::HouseBbqWings
            | Self::MangoHabaneroWings => WING_EXTRAS,
            Self::CrispyCheddarBites => &[Extra::AnchoChileRanch],
            Self::CrispyChickenCrispers
            | Self::CrispyHoneyChipotleCrispers
            | Self::CrispyMangoHabaneroCrispers
            | Self::OriginalChickenCrispers => CRISPER_EXTRAS,
        }
    }

    /// Returns true if `extra` may accompany this item.
    #[must_use]
    pub fn permits(self, extra: Extra) -> bool {
        self.permitted().contains(&extra)
    }

    /// Looks up an item by its display name.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] for the `item` field if no item has that name.
    pub fn from_name(name: &str) -> Result<Self, BadRequest> {
        Self::ALL
            .into_iter()
            .find(|item| item.name() == name)
            .ok_or_else(|| BadRequest::new("item"))
    }
}

impl Extra {
    /// Every extra, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::AnchoChileRanch,
        Self::AvocadoRanch,
        Self::BleuCheese,
        Self::HoneyMustard,
        Self::OriginalBbq,
        Self::Ranch,
    ];

    /// Returns the `snake_case` key used in order files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AnchoChileRanch => "ancho_chile_ranch",
            Self::AvocadoRanch => "avocado_ranch",
            Self::BleuCheese => "bleu_cheese",
            Self::HoneyMustard => "honey_mustard",
            Self::OriginalBbq => "original_bbq",
            Self::Ranch => "ranch",
        }
    }

    /// Returns the extra's display name as shown on the upstream menu.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AnchoChileRanch => "Ancho-Chile Ranch Dressing",
            Self::AvocadoRanch => "Avocado-Ranch Dressing",
            Self::BleuCheese => "Bleu Cheese Dressing",
            Self::HoneyMustard => "Honey-Mustard Dressing",
            Self::OriginalBbq => "Original BBQ Sauce",
            Self::Ranch => "Ranch Dressing",
        }
    }

    /// Looks up an extra by its display name.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] for the `extra` field if no extra has that name.
    pub fn from_name(name: &str) -> Result<Self, BadRequest> {
        Self::ALL
            .into_iter()
            .find(|extra| extra.name() == name)
            .ok_or_else(|| BadRequest::new("extra"))
    }
}

/// Accepts either the `snake_case` key or the display name.
impl FromStr for Item {
    type Err = BadRequest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|item| item.key() == s)
            .map_or_else(|| Self::from_name(s), Ok)
    }
}

impl TryFrom<String> for Item {
    type Error = BadRequest;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Accepts either the `snake_case` key or the display name.
impl FromStr for Extra {
    type Err = BadRequest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|extra| extra.key() == s)
            .map_or_else(|| Self::from_name(s), Ok)
    }
}

impl TryFrom<String> for Extra {
    type Error = BadRequest;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
