//! Closed categories used throughout the stats pipeline. Downstream logic
//! switches exhaustively on these, so they are enums rather than raw strings.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    pub fn from_log_name(raw: &str) -> Option<Team> {
        match raw {
            "Red" => Some(Team::Red),
            "Blue" => Some(Team::Blue),
            _ => None,
        }
    }

    /// The side name as it appears in log JSON (`teams.Red`, `teams.Blue`).
    pub fn log_name(self) -> &'static str {
        match self {
            Team::Red => "Red",
            Team::Blue => "Blue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassType {
    Scout,
    Soldier,
    Pyro,
    Demoman,
    Heavy,
    Engineer,
    Medic,
    Sniper,
    Spy,
}

impl ClassType {
    pub fn from_log_name(raw: &str) -> Option<ClassType> {
        match raw {
            "scout" => Some(ClassType::Scout),
            "soldier" => Some(ClassType::Soldier),
            "pyro" => Some(ClassType::Pyro),
            "demoman" => Some(ClassType::Demoman),
            "heavyweapons" => Some(ClassType::Heavy),
            "engineer" => Some(ClassType::Engineer),
            "medic" => Some(ClassType::Medic),
            "sniper" => Some(ClassType::Sniper),
            "spy" => Some(ClassType::Spy),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClassType::Scout => "Scout",
            ClassType::Soldier => "Soldier",
            ClassType::Pyro => "Pyro",
            ClassType::Demoman => "Demoman",
            ClassType::Heavy => "Heavy",
            ClassType::Engineer => "Engineer",
            ClassType::Medic => "Medic",
            ClassType::Sniper => "Sniper",
            ClassType::Spy => "Spy",
        }
    }
}

/// The classes that get their own per-class damage column. Medic is the
/// healer class and is aggregated separately.
pub const SIXES_COMBAT_CLASSES: [ClassType; 3] =
    [ClassType::Scout, ClassType::Soldier, ClassType::Demoman];
