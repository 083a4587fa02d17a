//! Staged gallows art keyed off the wrong-guess count.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HangmanStage {
    pub index: usize,
    pub art: &'static str,
}

pub const STAGE_COUNT: usize = 7;

static STAGES: [HangmanStage; STAGE_COUNT] = [
    HangmanStage {
        index: 0,
        art: "   ╔══════╗\n   ║      ║\n   ║\n   ║\n   ║\n   ║\n═══╩═══════",
    },
    HangmanStage {
        index: 1,
        art: "   ╔══════╗\n   ║      ║\n   ║      O\n   ║\n   ║\n   ║\n═══╩═══════",
    },
    HangmanStage {
        index: 2,
        art: "   ╔══════╗\n   ║      ║\n   ║      O\n   ║      ║\n   ║\n   ║\n═══╩═══════",
    },
    HangmanStage {
        index: 3,
        art: "   ╔══════╗\n   ║      ║\n   ║      O\n   ║     /║\n   ║\n   ║\n═══╩═══════",
    },
    HangmanStage {
        index: 4,
        art: "   ╔══════╗\n   ║      ║\n   ║      O\n   ║     /║\\\n   ║\n   ║\n═══╩═══════",
    },
    HangmanStage {
        index: 5,
        art: "   ╔══════╗\n   ║      ║\n   ║      O\n   ║     /║\\\n   ║     /\n   ║\n═══╩═══════",
    },
    HangmanStage {
        index: 6,
        art: "   ╔══════╗\n   ║      ║\n   ║      O\n   ║     /║\\\n   ║     / \\\n   ║\n═══╩═══════",
    },
];

/// Clamped at the final stage.
pub fn stage(wrong_count: u32) -> &'static HangmanStage {
    let idx = usize::try_from(wrong_count)
        .unwrap_or(usize::MAX)
        .min(STAGE_COUNT - 1);
    &STAGES[idx]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerLevel {
    Calm,
    Warning,
    Failed,
}

impl DangerLevel {
    pub fn banner(self) -> Option<&'static str> {
        match self {
            DangerLevel::Calm => None,
            DangerLevel::Warning => Some("⚠️ WARNING: danger zone!"),
            DangerLevel::Failed => Some("💀 MISSION FAILED"),
        }
    }
}

pub fn danger(wrong_count: u32, max_wrong: u32) -> DangerLevel {
    match max_wrong.saturating_sub(wrong_count) {
        0 => DangerLevel::Failed,
        1 | 2 => DangerLevel::Warning,
        _ => DangerLevel::Calm,
    }
}

/// One slot per allowed wrong guess; `true` marks a spent slot.
pub fn indicator(wrong_count: u32, max_wrong: u32) -> Vec<bool> {
    (0..max_wrong).map(|slot| slot < wrong_count).collect()
}
