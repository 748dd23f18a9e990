//! Playable characters
//!
//! Characters share one sprite; the choice only changes the tint.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub id: u32,
    pub name: &'static str,
    pub sprite_index: usize,
    pub description: &'static str,
    /// Tint (0xRRGGBB)
    pub color: u32,
}

pub static CHARACTERS: [Character; 4] = [
    Character {
        id: 0,
        name: "Classic",
        sprite_index: 0,
        description: "The original snowboarder with balanced stats",
        color: 0xff3366,
    },
    Character {
        id: 1,
        name: "Blizzard",
        sprite_index: 1,
        description: "Faster but harder to control",
        color: 0x4287f5,
    },
    Character {
        id: 2,
        name: "Forest",
        sprite_index: 2,
        description: "Better at avoiding obstacles",
        color: 0x32cd32,
    },
    Character {
        id: 3,
        name: "Sunset",
        sprite_index: 3,
        description: "Luckier with power-ups",
        color: 0xff69b4,
    },
];

pub fn find(id: u32) -> Option<&'static Character> {
    CHARACTERS.iter().find(|c| c.id == id)
}

/// Character for `id`, or the first one when the id is unknown
pub fn find_or_default(id: u32) -> &'static Character {
    find(id).unwrap_or_else(|| {
        log::warn!("Unknown character id {id}, using {}", CHARACTERS[0].name);
        &CHARACTERS[0]
    })
}
