//! Floor themes
//!
//! A theme supplies the flavor text a room caches when it is built. The
//! built-in [`FloorTheme`] holds one table per floor.

use crate::rng::GameRng;

/// Flavor-text provider consulted once per room at construction
pub trait Theme {
    fn name(&self) -> &str;
    fn level(&self) -> u32;
    fn random_size(&self, rng: &mut GameRng) -> String;
    fn random_atmosphere(&self, rng: &mut GameRng) -> String;
    fn random_ambience(&self, rng: &mut GameRng) -> Option<String>;
    fn random_event(&self, rng: &mut GameRng) -> Option<String>;
    /// Up to `count` distinct feature lines
    fn random_features(&self, rng: &mut GameRng, count: usize) -> Vec<String>;
}

/// Static text tables for one floor
#[derive(Debug, Clone, Copy)]
pub struct FloorTheme {
    pub level: u32,
    pub name: &'static str,
    sizes: &'static [&'static str],
    atmospheres: &'static [&'static str],
    features: &'static [&'static str],
    events: &'static [&'static str],
    ambience: &'static [&'static str],
}

impl FloorTheme {
    /// Theme for a floor; floors past the last authored one reuse the first
    pub fn for_level(level: u32) -> Self {
        match level {
            2 => SHATTERED_SANCTUM,
            3 => TRADING_HALLS,
            4 => SUNLESS_DEPTHS,
            5 => TRANQUIL_SANCTUARY,
            _ => UNCHANGING_HALLS,
        }
        .with_level(level.max(1))
    }

    fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

fn pick(rng: &mut GameRng, table: &[&str]) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let idx = rng.random_int(0, table.len() as i32) as usize;
    Some(table[idx].to_string())
}

impl Theme for FloorTheme {
    fn name(&self) -> &str {
        self.name
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn random_size(&self, rng: &mut GameRng) -> String {
        pick(rng, self.sizes).unwrap_or_default()
    }

    fn random_atmosphere(&self, rng: &mut GameRng) -> String {
        pick(rng, self.atmospheres).unwrap_or_default()
    }

    fn random_ambience(&self, rng: &mut GameRng) -> Option<String> {
        pick(rng, self.ambience)
    }

    fn random_event(&self, rng: &mut GameRng) -> Option<String> {
        pick(rng, self.events)
    }

    fn random_features(&self, rng: &mut GameRng, count: usize) -> Vec<String> {
        let mut pool: Vec<&str> = self.features.to_vec();
        rng.shuffle(&mut pool);
        pool.into_iter()
            .take(count)
            .map(str::to_string)
            .collect()
    }
}

const UNCHANGING_HALLS: FloorTheme = FloorTheme {
    level: 1,
    name: "The Unchanging Halls",
    sizes: &["familiar", "distorted", "unchanging", "preserved", "perfect"],
    atmospheres: &[
        "eerily peaceful",
        "unnaturally still",
        "frozen in time",
        "strangely pristine",
        "impossibly perfect",
        "deceptively calm",
    ],
    features: &[
        "A clock whose hands never move.",
        "A mirror that only shows happy memories.",
        "A window that always shows a perfect summer day.",
        "Family portraits where everyone is always smiling.",
        "Fresh flowers that never wilt.",
        "A table perpetually set for dinner guests.",
        "A music box playing a familiar lullaby.",
        "A rocking chair gently swaying on its own.",
        "A child's toy that winds itself up.",
        "A bookshelf where the stories keep changing.",
        "A fireplace with eternal flames that give no heat.",
        "A grandfather clock striking the same hour endlessly.",
        "A chess set mid-game with no players.",
        "A tea set that stays eternally warm.",
        "A crystal chandelier casting impossible shadows.",
        "A piano that plays soft melodies by itself.",
        "A cabinet of curiosities that rearranges itself.",
        "A tapestry showing scenes from your memories.",
        "A fountain whose water flows upward.",
        "A collection of photographs that change when unobserved.",
        "A kaleidoscope showing impossible patterns.",
        "A snow globe containing a perfect winter day.",
        "A sundial casting shadows that tell different times.",
        "An hourglass where sand flows both ways.",
    ],
    events: &[
        "A memory flickers at the edge of your vision.",
        "The sound of familiar laughter echoes distantly.",
        "Voices carry on conversations as if nothing has changed.",
        "Time seems to skip like a broken record.",
        "The room refuses to acknowledge any change.",
        "Reality bends to match your preferred memories.",
    ],
    ambience: &[
        "The air feels thick with forgotten memories",
        "Time moves strangely here, like honey dripping",
        "Everything seems frozen in a perfect moment",
        "The walls hold echoes of what once was",
        "Reality feels thin, like tissue paper",
        "The past and present blur together",
    ],
};

const SHATTERED_SANCTUM: FloorTheme = FloorTheme {
    level: 2,
    name: "Shattered Sanctum",
    sizes: &["fractured", "broken", "ruptured", "unstable", "crumbling"],
    atmospheres: &[
        "violently disturbed",
        "seething",
        "crackling",
        "unstable",
        "turbulent",
        "destructive",
    ],
    features: &[
        "Shattered crystals cover the ground, still humming with energy.",
        "A once-beautiful mural lies in pieces.",
        "Scorch marks mar every surface.",
        "Broken furniture lies scattered about.",
        "The walls bear deep, violent gashes.",
        "Everything of value has been thoroughly destroyed.",
    ],
    events: &[
        "Something shatters in the distance.",
        "A wave of heat pulses through the room.",
        "The walls crack further under unseen pressure.",
        "Debris falls from fresh damage above.",
        "The ground trembles with suppressed force.",
        "The air crackles with violent energy.",
    ],
    ambience: &[
        "The air burns with barely contained rage",
        "Everything vibrates with destructive energy",
        "The very stones seem to seethe with anger",
        "Heat radiates from the scarred walls",
        "The atmosphere crackles with tension",
        "Destruction hangs heavy in the air",
    ],
};

const TRADING_HALLS: FloorTheme = FloorTheme {
    level: 3,
    name: "Trading Halls",
    sizes: &["labyrinthine", "maze-like", "winding", "branching", "complex"],
    atmospheres: &[
        "negotiative",
        "promising",
        "enticing",
        "opportunistic",
        "desperate",
        "hopeful",
    ],
    features: &[
        "An ornate trading scale balances nothing against nothing.",
        "Contracts written in strange script flutter in a nonexistent wind.",
        "A merchant's counter stands empty, waiting for trade.",
        "Paths split and rejoin in impossible ways.",
        "Mirrors show paths not taken.",
        "A collection of keys hangs, each promising a different path.",
    ],
    events: &[],
    ambience: &[],
};

const SUNLESS_DEPTHS: FloorTheme = FloorTheme {
    level: 4,
    name: "Sunless Depths",
    sizes: &["vast", "empty", "hollow", "endless", "void-like"],
    atmospheres: &[
        "oppressively silent",
        "heavy",
        "suffocating",
        "lightless",
        "weighty",
        "draining",
    ],
    features: &[
        "A void of darkness stretches endlessly.",
        "Remnants of life lie abandoned and forgotten.",
        "Shadows pool like liquid in the corners.",
        "The walls seem to absorb all sound.",
        "A heavy mist clings to everything.",
        "Light sources struggle against the darkness.",
    ],
    events: &[],
    ambience: &[],
};

const TRANQUIL_SANCTUARY: FloorTheme = FloorTheme {
    level: 5,
    name: "Tranquil Sanctuary",
    sizes: &["balanced", "harmonious", "peaceful", "serene", "complete"],
    atmospheres: &[
        "calmly resolute",
        "accepting",
        "tranquil",
        "understanding",
        "peaceful",
        "settled",
    ],
    features: &[
        "A pool reflects both light and shadow equally.",
        "Crystal formations have grown around broken remnants.",
        "New life grows through old decay.",
        "Paths converge at a central point of calm.",
        "The room embraces both its beauty and flaws.",
        "Windows show both past and present simultaneously.",
    ],
    events: &[],
    ambience: &[],
};
