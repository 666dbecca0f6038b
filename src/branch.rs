//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N,
    /// Taken
    T,
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N,
        }
    }
}

impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool {
        match x {
            Outcome::T => true,
            Outcome::N => false,
        }
    }
}

/// The kind of control-flow instruction recorded in a trace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BranchKind {
    /// A branch with an explicit target address.
    Branch,
    /// A return. The target is not recorded.
    Return,
}

/// A static hint about the direction of a branch, supplied by the trace.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The target follows the branch.
    Forward,
    /// The target precedes the branch (usually a loop back-edge).
    Backward,
    /// The trace gives no hint.
    #[default]
    Unknown,
}
impl Direction {
    /// The character used for this hint in a text trace.
    pub fn as_char(&self) -> char {
        match self {
            Self::Forward => 'F',
            Self::Backward => 'B',
            Self::Unknown => '?',
        }
    }

    /// Infer a hint from the relative position of the target.
    pub fn from_addrs(pc: u32, tgt: u32) -> Self {
        if tgt < pc {
            Self::Backward
        } else {
            Self::Forward
        }
    }
}

/// A record of one retired branch or return.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BranchRecord {
    /// The type/kind of branch
    pub kind: BranchKind,

    /// The program counter value for this branch
    pub pc: u32,

    /// The target address evaluated for this branch (zero for returns)
    pub tgt: u32,

    /// The direction hint recorded in the trace
    pub hint: Direction,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,
}
impl BranchRecord {
    /// Target recorded for returns and for lines without a target.
    pub const NO_TARGET: u32 = 0;

    pub fn branch(pc: u32, tgt: u32, hint: Direction, outcome: Outcome) -> Self {
        Self { kind: BranchKind::Branch, pc, tgt, hint, outcome }
    }

    pub fn ret(pc: u32, outcome: Outcome) -> Self {
        Self {
            kind: BranchKind::Return,
            pc,
            tgt: Self::NO_TARGET,
            hint: Direction::Unknown,
            outcome,
        }
    }

    pub fn is_taken(&self) -> bool {
        self.outcome == Outcome::T
    }

    pub fn is_return(&self) -> bool {
        self.kind == BranchKind::Return
    }
}

/// Writes the record in the text trace format accepted by
/// [`crate::trace::parse_line`].
impl std::fmt::Display for BranchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let outcome = match self.outcome {
            Outcome::T => "taken",
            Outcome::N => "not taken",
        };
        match self.kind {
            BranchKind::Branch => write!(
                f,
                "B from {:08x} to {:08x} {} * {}",
                self.pc,
                self.tgt,
                self.hint.as_char(),
                outcome
            ),
            BranchKind::Return => {
                write!(f, "R from {:08x}               ? {}", self.pc, outcome)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outcome_bool_conversions() {
        assert_eq!(Outcome::from(true), Outcome::T);
        assert_eq!(Outcome::from(false), Outcome::N);
        assert!(bool::from(Outcome::T));
        assert_eq!(!Outcome::T, Outcome::N);
    }

    #[test]
    fn display_uses_trace_format() {
        let b = BranchRecord::branch(0x8008, 0x8040, Direction::Forward, Outcome::T);
        assert_eq!(b.to_string(), "B from 00008008 to 00008040 F * taken");

        let r = BranchRecord::ret(0x8070, Outcome::N);
        assert_eq!(r.to_string(), "R from 00008070               ? not taken");
        assert_eq!(r.tgt, BranchRecord::NO_TARGET);
    }

    #[test]
    fn hint_from_addrs() {
        assert_eq!(Direction::from_addrs(0x100, 0x80), Direction::Backward);
        assert_eq!(Direction::from_addrs(0x100, 0x180), Direction::Forward);
    }
}
