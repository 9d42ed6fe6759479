//! Request validation run before anything reaches the game engine.

use std::collections::HashSet;
use uuid::Uuid;

use crate::game::GameCommand;

/// Longest accepted value for a free-text request parameter.
pub const MAX_PARAM_LENGTH: usize = 64;

/// Longest accepted lore entry body.
pub const MAX_LORE_CONTENT_LENGTH: usize = 2000;

pub const MIN_DICE_SIDES: u32 = 2;
pub const MAX_DICE_SIDES: u32 = 100;

/// Accepted range for skill modifiers and difficulty classes.
pub const MAX_CHECK_MAGNITUDE: i32 = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter '{0}'")]
    Missing(&'static str),

    #[error("Parameter '{name}' is too long (maximum {max} characters)")]
    TooLong { name: &'static str, max: usize },

    #[error("Player name is too short (minimum 2 characters)")]
    NameTooShort,

    #[error("Player name is too long (maximum {max} characters)")]
    NameTooLong { max: usize },

    #[error("Player name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Player name contains path separators (/ or \\)")]
    PathTraversal,

    #[error("Player name is a reserved name")]
    Reserved,

    #[error("Invalid save id: {0}")]
    InvalidSaveId(String),

    #[error("Dice must have between {min} and {max} sides")]
    DiceSides { min: u32, max: u32 },

    #[error("Parameter '{name}' must be between {min} and {max}")]
    OutOfRange { name: &'static str, min: i32, max: i32 },
}

/// Player name rules
#[derive(Debug, Clone)]
pub struct NameRules {
    pub min_length: usize,
    pub max_length: usize,
    pub allow_spaces: bool,
    pub allow_unicode: bool,
}

impl Default for NameRules {
    fn default() -> Self {
        NameRules {
            min_length: 2,
            max_length: 30,
            allow_spaces: true,
            allow_unicode: true,
        }
    }
}

fn reserved_names() -> HashSet<&'static str> {
    [
        "admin", "administrator", "root", "system", "server", "narrator",
        "null", "undefined", "none",
        "con", "prn", "aux", "nul",
    ]
    .iter()
    .copied()
    .collect()
}

/// Trim a required string parameter, strip control characters and enforce
/// the length limit. Empty or whitespace-only values count as missing.
pub fn require_param(name: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let cleaned: String = value
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(name));
    }
    if trimmed.chars().count() > MAX_PARAM_LENGTH {
        return Err(ValidationError::TooLong {
            name,
            max: MAX_PARAM_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

/// Like [`require_param`] for multi-line text: newlines survive and the limit
/// is [`MAX_LORE_CONTENT_LENGTH`].
pub fn require_text(name: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    let cleaned: String = value
        .unwrap_or_default()
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(name));
    }
    if trimmed.chars().count() > MAX_LORE_CONTENT_LENGTH {
        return Err(ValidationError::TooLong {
            name,
            max: MAX_LORE_CONTENT_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

/// Validate a player name according to the given rules
pub fn validate_player_name(name: &str, rules: &NameRules) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if length < rules.min_length {
        return Err(ValidationError::NameTooShort);
    }
    if length > rules.max_length {
        return Err(ValidationError::NameTooLong {
            max: rules.max_length,
        });
    }

    if reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(ValidationError::Reserved);
    }

    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(ValidationError::PathTraversal);
    }

    let mut invalid: Vec<char> = trimmed
        .chars()
        .filter(|&ch| {
            let valid = if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '\'') {
                true
            } else if ch == ' ' {
                rules.allow_spaces
            } else if !ch.is_ascii() && (ch.is_alphabetic() || ch.is_numeric()) {
                rules.allow_unicode
            } else {
                false
            };
            !valid
        })
        .collect();

    if !invalid.is_empty() {
        invalid.sort_unstable();
        invalid.dedup();
        return Err(ValidationError::InvalidCharacters {
            chars: invalid.into_iter().collect(),
        });
    }

    Ok(trimmed.to_string())
}

/// Save ids are UUIDs, which keeps them safe to use as file names.
pub fn validate_save_id(id: &str) -> Result<String, ValidationError> {
    let trimmed = id.trim();
    Uuid::parse_str(trimmed)
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| ValidationError::InvalidSaveId(trimmed.to_string()))
}

pub fn validate_dice_sides(sides: u32) -> Result<u32, ValidationError> {
    if !(MIN_DICE_SIDES..=MAX_DICE_SIDES).contains(&sides) {
        return Err(ValidationError::DiceSides {
            min: MIN_DICE_SIDES,
            max: MAX_DICE_SIDES,
        });
    }
    Ok(sides)
}

/// Skill modifiers and difficulty classes stay within +/-`MAX_CHECK_MAGNITUDE`.
pub fn validate_check_value(name: &'static str, value: i32) -> Result<i32, ValidationError> {
    if !(-MAX_CHECK_MAGNITUDE..=MAX_CHECK_MAGNITUDE).contains(&value) {
        return Err(ValidationError::OutOfRange {
            name,
            min: -MAX_CHECK_MAGNITUDE,
            max: MAX_CHECK_MAGNITUDE,
        });
    }
    Ok(value)
}

/// Re-check every field of a decoded command. Returns the cleaned command.
pub fn validate_command(
    command: GameCommand,
    rules: &NameRules,
) -> Result<GameCommand, ValidationError> {
    Ok(match command {
        GameCommand::NewGame { name } => GameCommand::NewGame {
            name: validate_player_name(&require_param("name", Some(&name))?, rules)?,
        },
        GameCommand::Move { to } => GameCommand::Move {
            to: require_param("to", Some(&to))?,
        },
        GameCommand::Attack { target } => GameCommand::Attack {
            target: require_param("target", Some(&target))?,
        },
        GameCommand::Take { item } => GameCommand::Take {
            item: require_param("item", Some(&item))?,
        },
        GameCommand::Drop { item } => GameCommand::Drop {
            item: require_param("item", Some(&item))?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_param() {
        assert_eq!(require_param("target", Some("  Giant Rat ")).unwrap(), "Giant Rat");
        assert_eq!(require_param("target", Some("Giant\x00 Rat")).unwrap(), "Giant Rat");
        assert_eq!(require_param("target", None), Err(ValidationError::Missing("target")));
        assert_eq!(require_param("target", Some("   ")), Err(ValidationError::Missing("target")));
        assert!(matches!(
            require_param("target", Some(&"x".repeat(65))),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_player_names() {
        let rules = NameRules::default();
        assert_eq!(validate_player_name("Hero", &rules).unwrap(), "Hero");
        assert!(validate_player_name("Sir Lancelot", &rules).is_ok());
        assert!(validate_player_name("José", &rules).is_ok());
        assert!(validate_player_name("O'Brien", &rules).is_ok());

        assert_eq!(validate_player_name("H", &rules), Err(ValidationError::NameTooShort));
        assert!(validate_player_name(&"a".repeat(31), &rules).is_err());
        assert_eq!(validate_player_name("admin", &rules), Err(ValidationError::Reserved));
        assert_eq!(validate_player_name("../etc", &rules), Err(ValidationError::PathTraversal));
        assert!(matches!(
            validate_player_name("<script>", &rules),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_spaces_can_be_disallowed() {
        let rules = NameRules {
            allow_spaces: false,
            ..NameRules::default()
        };
        assert!(validate_player_name("Sir Lancelot", &rules).is_err());
    }

    #[test]
    fn test_save_id_validation() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(validate_save_id(id).unwrap(), id);
        assert!(validate_save_id("../secret").is_err());
        assert!(validate_save_id("save.json").is_err());
        assert!(validate_save_id("not-a-uuid").is_err());
    }

    #[test]
    fn test_command_fields_are_cleaned() {
        let rules = NameRules::default();
        let cmd = validate_command(GameCommand::Attack { target: " Giant Rat\n".into() }, &rules);
        assert_eq!(cmd.unwrap(), GameCommand::Attack { target: "Giant Rat".into() });
        assert_eq!(
            validate_command(GameCommand::Move { to: "".into() }, &rules),
            Err(ValidationError::Missing("to"))
        );
        assert_eq!(
            validate_command(GameCommand::NewGame { name: "root".into() }, &rules),
            Err(ValidationError::Reserved)
        );
    }

    #[test]
    fn test_dice_sides() {
        assert!(validate_dice_sides(20).is_ok());
        assert!(validate_dice_sides(1).is_err());
        assert!(validate_dice_sides(101).is_err());
    }

    #[test]
    fn test_require_text_keeps_newlines() {
        assert_eq!(
            require_text("content", Some("  line one\nline\ttwo \n")),
            Ok("line one\nlinetwo".to_string())
        );
        assert_eq!(
            require_text("content", Some("\n\n")),
            Err(ValidationError::Missing("content"))
        );
        let long = "a".repeat(MAX_LORE_CONTENT_LENGTH + 1);
        assert!(matches!(
            require_text("content", Some(&long)),
            Err(ValidationError::TooLong { name: "content", .. })
        ));
    }

    #[test]
    fn test_check_values() {
        assert_eq!(validate_check_value("skill", -100), Ok(-100));
        assert_eq!(validate_check_value("difficulty", 100), Ok(100));
        assert!(matches!(
            validate_check_value("skill", i32::MAX),
            Err(ValidationError::OutOfRange { name: "skill", .. })
        ));
        assert!(validate_check_value("difficulty", -101).is_err());
    }
}
