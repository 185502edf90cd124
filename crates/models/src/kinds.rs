//! Closed vocabularies of the catalog: resource type, category and tags.
//!
//! Each enum serializes to its display name (e.g. `"Sample Financial Plans"`),
//! and parses from either the display name or the Rust variant name, case-insensitively.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ModelError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($wire) || s.eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok($name::$variant);
                    }
                )+
                Err(ModelError::Validation(format!("unknown {}: {}", stringify!($name), s)))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Media kind of a downloadable resource.
    ResourceType {
        Pdf => "PDF",
        Spreadsheet => "Spreadsheet",
        Document => "Document",
        Presentation => "Presentation",
        Image => "Image",
        Video => "Video",
        Audio => "Audio",
    }
}

wire_enum! {
    /// Top-level catalog section.
    Category {
        Toolkit => "DIY Personal Finance Toolkit",
        Plans => "Sample Financial Plans",
    }
}

wire_enum! {
    Tag {
        // toolkit
        Calculators => "Calculators",
        FinancialStatements => "Personal Financial Statements",
        ProjectionModels => "Projection Models",
        FinancialPlanTemplates => "Financial Plan Templates",
        FinancialPlanningChecklists => "Financial Planning Checklists",
        EstatePlanning => "Estate Planning",
        GoalSetting => "Goal Setting/Visioning",
        MoneyDateTemplate => "Money Date Template",
        // sample plans
        Families => "Families",
        SingleParent => "Single Parent",
        Single => "Single",
        Dink => "DINK (Dual Income, No Kids)",
        HighIncome => "High Income",
        LowIncome => "Low Income",
        MiddleIncome => "Middle Income",
        Hcol => "HCOL (High Cost of Living)",
        Vhcol => "VHCOL (Very High Cost of Living)",
        Mcol => "MCOL (Medium Cost of Living)",
        Lcol => "LCOL (Low Cost of Living)",
    }
}
