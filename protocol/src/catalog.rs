//! The Option & Scenario catalog (§4.H): a versioned, read-only-after-init
//! static table. Construct once with [`OptionCatalog::build`] at server
//! start and pass the handle down to the subsystems that need it (§9
//! "static mutable singletons").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The current protocol version this build speaks. Bumped whenever the
/// wire catalog in `message.rs` gains a kind or changes a min-version.
pub const CURRENT_VERSION: u32 = 2700;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Bool,
    Int { min: i32, max: i32 },
    IntBool { min: i32, max: i32 },
    Enum,
    EnumBool,
    Str,
}

/// Flags attached to an option (§4.H).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionFlags {
    pub drop_if_unused: bool,
    pub inactive_hidden: bool,
    pub internal_game_property: bool,
    pub third_party: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionValue {
    pub bool_value: bool,
    pub int_value: i32,
    pub str_value: String,
}

impl OptionValue {
    pub fn bool(v: bool) -> Self {
        OptionValue {
            bool_value: v,
            int_value: 0,
            str_value: String::new(),
        }
    }
    pub fn int(v: i32) -> Self {
        OptionValue {
            bool_value: false,
            int_value: v,
            str_value: String::new(),
        }
    }
    pub fn string(v: impl Into<String>) -> Self {
        OptionValue {
            bool_value: false,
            int_value: 0,
            str_value: v.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionInfo {
    pub key: &'static str,
    pub option_type: OptionType,
    pub default: OptionValue,
    pub min_version: u32,
    pub last_modified_version: u32,
    pub flags: OptionFlags,
    /// Key of a client feature this option is linked to, if any.
    pub linked_feature: Option<&'static str>,
}

/// The closed enumeration of well-known option keys (§4.H).
pub fn well_known_options() -> Vec<OptionInfo> {
    let f = OptionFlags::default();
    vec![
        OptionInfo {
            key: "PL",
            option_type: OptionType::Int { min: 2, max: 6 },
            default: OptionValue::int(4),
            min_version: 1000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "PLB",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 1108,
            last_modified_version: 1108,
            flags: f,
            linked_feature: Some("6pl"),
        },
        OptionInfo {
            key: "PLP",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "SBL",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: Some("sb"),
        },
        OptionInfo {
            key: "RD",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 1107,
            last_modified_version: 1107,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "N7",
            option_type: OptionType::Int { min: 1, max: 999 },
            default: OptionValue::int(7),
            min_version: 1108,
            last_modified_version: 1108,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "N7C",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 1108,
            last_modified_version: 1108,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "BC",
            option_type: OptionType::Int { min: 3, max: 9 },
            default: OptionValue::int(4),
            min_version: 1107,
            last_modified_version: 1107,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "NT",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 1107,
            last_modified_version: 1107,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "VP",
            option_type: OptionType::IntBool { min: 10, max: 20 },
            default: OptionValue::int(10),
            min_version: 1107,
            last_modified_version: 1107,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "SC",
            option_type: OptionType::Str,
            default: OptionValue::string(""),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: Some("sc"),
        },
        OptionInfo {
            key: "_BHW",
            option_type: OptionType::Int { min: 0, max: i32::MAX },
            default: OptionValue::int(0),
            min_version: 2000,
            last_modified_version: 2000,
            flags: OptionFlags {
                internal_game_property: true,
                ..f
            },
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_SANY",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_SEAC",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_FOG",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_0RVP",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_3IP",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_CLVI",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_PIRI",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_FTRI",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_SC_WOND",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: f,
            linked_feature: None,
        },
        OptionInfo {
            key: "_PLAY_FO",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: OptionFlags {
                inactive_hidden: true,
                ..f
            },
            linked_feature: None,
        },
        OptionInfo {
            key: "_PLAY_VPO",
            option_type: OptionType::Bool,
            default: OptionValue::bool(false),
            min_version: 2000,
            last_modified_version: 2000,
            flags: OptionFlags {
                inactive_hidden: true,
                ..f
            },
            linked_feature: None,
        },
    ]
}

/// A scenario bundles a key with the option values it implies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub key: &'static str,
    pub min_version: u32,
    pub option_overrides: Vec<(&'static str, OptionValue)>,
}

pub fn well_known_scenarios() -> Vec<ScenarioInfo> {
    vec![
        ScenarioInfo {
            key: "SC_4ISL",
            min_version: 2000,
            option_overrides: vec![("SBL", OptionValue::bool(true))],
        },
        ScenarioInfo {
            key: "SC_FOG_ISL",
            min_version: 2000,
            option_overrides: vec![
                ("SBL", OptionValue::bool(true)),
                ("_SC_FOG", OptionValue::bool(true)),
            ],
        },
        ScenarioInfo {
            key: "SC_PIRI",
            min_version: 2000,
            option_overrides: vec![
                ("SBL", OptionValue::bool(true)),
                ("_SC_PIRI", OptionValue::bool(true)),
            ],
        },
    ]
}

/// The read-only catalog handle constructed once at server start.
#[derive(Clone)]
pub struct OptionCatalog {
    options: HashMap<&'static str, OptionInfo>,
    scenarios: HashMap<&'static str, ScenarioInfo>,
}

impl OptionCatalog {
    pub fn build() -> Self {
        OptionCatalog {
            options: well_known_options().into_iter().map(|o| (o.key, o)).collect(),
            scenarios: well_known_scenarios()
                .into_iter()
                .map(|s| (s.key, s))
                .collect(),
        }
    }

    pub fn option(&self, key: &str) -> Option<&OptionInfo> {
        self.options.get(key)
    }

    pub fn scenario(&self, key: &str) -> Option<&ScenarioInfo> {
        self.scenarios.get(key)
    }

    /// Computes `effectiveMinVersion(opts)` (§4.H "Compatibility rule"):
    /// for options whose legal range widened in a later version, the
    /// version is derived from the *chosen* value, not merely from the
    /// option's own declaration.
    pub fn effective_min_version(&self, chosen: &HashMap<String, OptionValue>) -> u32 {
        let mut result = 1000;
        for (key, value) in chosen {
            let Some(info) = self.options.get(key.as_str()) else {
                continue;
            };
            let mut v = info.min_version;
            if key.as_str() == "PL" && value.int_value > 4 {
                // Max players 5-6 only became legal in a later version.
                v = v.max(1108);
            }
            if key.as_str() == "PLB" && value.bool_value {
                v = v.max(1108);
            }
            if key.as_str() == "SBL" && value.bool_value {
                v = v.max(2000);
            }
            result = result.max(v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_player_option_raises_effective_min_version() {
        let catalog = OptionCatalog::build();
        let mut chosen = HashMap::new();
        chosen.insert("PL".to_string(), OptionValue::int(6));
        assert_eq!(catalog.effective_min_version(&chosen), 1108);
    }

    #[test]
    fn default_four_player_is_compatible_with_oldest_version() {
        let catalog = OptionCatalog::build();
        let mut chosen = HashMap::new();
        chosen.insert("PL".to_string(), OptionValue::int(4));
        assert_eq!(catalog.effective_min_version(&chosen), 1000);
    }
}
