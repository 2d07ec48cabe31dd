//! Feature items
//!
//! Items are extracted from a room's flavor features. Each catalogue entry
//! describes what examining or taking the item does.

use serde::{Deserialize, Serialize};

/// Chance-based fragment payout for examining an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamineReward {
    pub chance: f64,
    pub min: u32,
    pub max: u32,
    pub message: String,
}

/// Fixed fragment payout for taking an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeReward {
    pub fragments: u32,
    pub message: String,
}

/// An interactable object in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub examine: String,
    pub use_text: Option<String>,
    pub can_take: bool,
    pub on_examine: Option<ExamineReward>,
    pub on_take: Option<TakeReward>,
    /// Feature line this item was extracted from
    pub feature: String,
}

impl Item {
    /// Case-insensitive match against the name or any alias
    pub fn matches(&self, target: &str) -> bool {
        let target = target.trim().to_lowercase();
        if target.is_empty() {
            return false;
        }
        self.name.eq_ignore_ascii_case(&target) || self.aliases.iter().any(|a| *a == target)
    }

    /// Build a catalogue item, or a plain untakeable one for unknown keys
    pub fn from_catalogue(key: &str, feature: &str) -> Self {
        match CATALOGUE.iter().find(|def| def.name == key) {
            Some(def) => def.build(feature),
            None => Self {
                name: key.to_string(),
                aliases: Vec::new(),
                description: feature.to_string(),
                examine: feature.to_string(),
                use_text: None,
                can_take: false,
                on_examine: None,
                on_take: None,
                feature: feature.to_string(),
            },
        }
    }
}

struct ItemDef {
    name: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    examine: &'static str,
    use_text: Option<&'static str>,
    can_take: bool,
    /// (chance, min, max, message)
    on_examine: Option<(f64, u32, u32, &'static str)>,
    /// (fragments, message)
    on_take: Option<(u32, &'static str)>,
}

impl ItemDef {
    fn build(&self, feature: &str) -> Item {
        Item {
            name: self.name.to_string(),
            aliases: self.aliases.iter().map(|a| a.to_string()).collect(),
            description: self.description.to_string(),
            examine: self.examine.to_string(),
            use_text: self.use_text.map(str::to_string),
            can_take: self.can_take,
            on_examine: self
                .on_examine
                .map(|(chance, min, max, message)| ExamineReward {
                    chance,
                    min,
                    max,
                    message: message.to_string(),
                }),
            on_take: self.on_take.map(|(fragments, message)| TakeReward {
                fragments,
                message: message.to_string(),
            }),
            feature: feature.to_string(),
        }
    }
}

const CATALOGUE: &[ItemDef] = &[
    ItemDef {
        name: "mirror",
        aliases: &["mirror", "reflection"],
        description: "A mirror that only shows happy memories.",
        examine: "The reflection shows only joyful moments from your past.",
        use_text: None,
        can_take: false,
        on_examine: Some((0.3, 2, 5, "A fleeting memory surfaces as you gaze into the mirror...")),
        on_take: None,
    },
    ItemDef {
        name: "table",
        aliases: &["dining table", "set table"],
        description: "A table perpetually set for dinner guests.",
        examine: "The table settings are pristine, as if waiting for guests who never arrive.",
        use_text: None,
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "clock",
        aliases: &["timepiece", "wall clock"],
        description: "A clock whose hands refuse to move.",
        examine: "The hands are frozen at a significant moment. You could take it as a memory.",
        use_text: None,
        can_take: true,
        on_examine: Some((0.25, 1, 3, "The phantom ticking stirs a distant memory...")),
        on_take: Some((
            20,
            "The clock face shimmers as you take it, its hands forever marking this moment...",
        )),
    },
    ItemDef {
        name: "window",
        aliases: &["glass", "pane"],
        description: "A window showing an eternal summer day.",
        examine: "Through the glass, you see a perfect day that never ends.",
        use_text: None,
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "portraits",
        aliases: &["pictures", "paintings", "portrait", "portraits"],
        description: "Family portraits with ever-smiling faces.",
        examine: "The faces in the portraits seem to follow you with their unchanging smiles.",
        use_text: None,
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "flowers",
        aliases: &["bouquet", "vase"],
        description: "Fresh flowers in eternal bloom.",
        examine: "The flowers look freshly cut, yet you sense they've been here forever. You could take them with you.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            15,
            "The flowers retain their perfect bloom as you gather them, their eternal spring now yours...",
        )),
    },
    ItemDef {
        name: "music box",
        aliases: &["box", "musical box"],
        description: "A delicate music box playing a hauntingly familiar tune.",
        examine: "The melody seems to change with your memories, yet remains familiar. You could take it with you.",
        use_text: Some("You wind the music box. The lullaby steadies your breathing."),
        can_take: true,
        on_examine: Some((0.4, 3, 6, "The melody triggers a cascade of memories...")),
        on_take: Some((
            30,
            "The music box plays a tune from your childhood as you pick it up...",
        )),
    },
    ItemDef {
        name: "rocking chair",
        aliases: &["chair", "rocking chair"],
        description: "An old rocking chair moving to an unseen presence.",
        examine: "The chair rocks with the same rhythm as a long-forgotten comfort.",
        use_text: Some("You sit for a moment. The chair keeps rocking after you rise."),
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "toy",
        aliases: &["mechanical toy", "wind-up toy"],
        description: "A mechanical toy that winds itself up periodically.",
        examine: "The toy seems to respond to your presence, as if remembering past play. You could take it as a memory.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            25,
            "The toy whirs happily as you pick it up, reminding you of simpler times...",
        )),
    },
    ItemDef {
        name: "bookshelf",
        aliases: &["shelf", "books", "bookcase"],
        description: "A bookshelf filled with ever-changing stories.",
        examine: "Each time you look, the titles are different, yet oddly familiar.",
        use_text: None,
        can_take: false,
        on_examine: Some((0.35, 2, 4, "One of the titles sparks a memory...")),
        on_take: None,
    },
    ItemDef {
        name: "fireplace",
        aliases: &["hearth", "fire"],
        description: "A fireplace with dancing flames that emit no heat.",
        examine: "The flames move in patterns that seem to tell stories from your past.",
        use_text: None,
        can_take: false,
        on_examine: Some((0.3, 2, 5, "The dancing flames stir a distant memory...")),
        on_take: None,
    },
    ItemDef {
        name: "chess set",
        aliases: &["chess", "chess pieces"],
        description: "A chess game frozen mid-play, pieces moved by phantom players.",
        examine: "The position of the pieces reminds you of a game long forgotten. You could take it as a memory.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            20,
            "As you pick up the chess set, memories of past matches and strategies flood back...",
        )),
    },
    ItemDef {
        name: "tea set",
        aliases: &["teapot", "cups"],
        description: "A fine porcelain tea set, steam eternally rising.",
        examine: "The tea inside stays perfectly hot, waiting for guests who never arrive. You could take it as a memory.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            25,
            "As you pick up the tea set, the warmth of shared moments flows through you...",
        )),
    },
    ItemDef {
        name: "chandelier",
        aliases: &["light", "crystals"],
        description: "A crystal chandelier casting ever-shifting shadows.",
        examine: "The shadows it casts seem to dance to the rhythm of remembered moments.",
        use_text: None,
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "piano",
        aliases: &["grand piano", "keys"],
        description: "A grand piano that plays gentle melodies without a pianist.",
        examine: "The keys move to play a song you remember from childhood.",
        use_text: Some("You press a key. The piano answers with the next note of an old song."),
        can_take: false,
        on_examine: Some((0.4, 3, 6, "The melody triggers a cascade of memories...")),
        on_take: None,
    },
    ItemDef {
        name: "tapestry",
        aliases: &["hanging", "weaving"],
        description: "A woven tapestry showing scenes from your memories.",
        examine: "The scenes in the tapestry shift and change as you watch.",
        use_text: None,
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "fountain",
        aliases: &["water feature", "basin"],
        description: "A fountain with water that defies gravity.",
        examine: "The water flows upward, forming patterns that remind you of better times.",
        use_text: None,
        can_take: false,
        on_examine: None,
        on_take: None,
    },
    ItemDef {
        name: "kaleidoscope",
        aliases: &["scope", "viewer"],
        description: "A mysterious kaleidoscope showing impossible patterns.",
        examine: "Looking through it reveals fragments of memories, endlessly recombining. You could take it as a memory.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            35,
            "The kaleidoscope shifts as you pick it up, showing glimpses of forgotten moments...",
        )),
    },
    ItemDef {
        name: "snow globe",
        aliases: &["globe", "snowglobe"],
        description: "A snow globe containing a perfect winter scene.",
        examine: "The snow falls endlessly, preserving a perfect moment in time. You could take it with you.",
        use_text: Some("You shake the globe. Snow swirls over a house you almost recognise."),
        can_take: true,
        on_examine: None,
        on_take: Some((
            25,
            "As you lift the snow globe, memories of winter days swirl like snowflakes...",
        )),
    },
    ItemDef {
        name: "hourglass",
        aliases: &["timer", "sandglass"],
        description: "An hourglass where sand flows in both directions.",
        examine: "The sand defies gravity, flowing both up and down in an endless cycle. You could take it with you.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            30,
            "As you grasp the hourglass, time seems to flow backwards for a moment...",
        )),
    },
    ItemDef {
        name: "sundial",
        aliases: &["dial", "time piece"],
        description: "A sundial casting impossible shadows.",
        examine: "The shadows move independently of any light source. You could take this timepiece with you.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((
            15,
            "The sundial's shadow spins rapidly as you lift it, showing glimpses of times past...",
        )),
    },
    ItemDef {
        name: "rage shard",
        aliases: &["shard", "crystal fragment"],
        description: "A crystal fragment humming with violent energy.",
        examine: "The shard is warm and vibrates against your palm. You could take it with you.",
        use_text: None,
        can_take: true,
        on_examine: None,
        on_take: Some((10, "The shard's hum fades to a low purr as you pocket it...")),
    },
];
