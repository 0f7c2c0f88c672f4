use serde::{Deserialize, Serialize};

/// Defines session phases and how a session moves through them
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn next(&self) -> Option<Self>;

    fn is_practice(&self) -> bool {
        false
    }
    fn is_main(&self) -> bool {
        false
    }
    fn is_finished(&self) -> bool {
        false
    }

    /// Break checkpoints only apply to phases that allow them
    fn allows_breaks(&self) -> bool {
        self.is_main()
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Practice,
    Main,
    Finished,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Practice
    }
}

impl Phase for SessionPhase {
    fn next(&self) -> Option<Self> {
        use SessionPhase::*;
        Some(match self {
            Practice => Main,
            Main => Finished,
            Finished => return None,
        })
    }

    fn is_practice(&self) -> bool {
        matches!(self, SessionPhase::Practice)
    }

    fn is_main(&self) -> bool {
        matches!(self, SessionPhase::Main)
    }

    fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::Finished)
    }
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Practice => "practice",
            SessionPhase::Main => "main",
            SessionPhase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
