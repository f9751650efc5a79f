use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub};

use mio::Interest;
use mio::event::Event;

/// Set of readiness conditions delivered for one descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ready(u8);

const READABLE: u8 = 0b0001;
const WRITABLE: u8 = 0b0010;
const ERROR: u8 = 0b0100;
const HANGUP: u8 = 0b1000;
const ALL: u8 = READABLE | WRITABLE | ERROR | HANGUP;

impl Ready {
    pub const EMPTY: Ready = Ready(0);
    pub const READABLE: Ready = Ready(READABLE);
    pub const WRITABLE: Ready = Ready(WRITABLE);
    pub const ERROR: Ready = Ready(ERROR);
    /// Either half of the connection was closed by the peer.
    pub const HANGUP: Ready = Ready(HANGUP);

    pub fn from_event(event: &Event) -> Self {
        let mut ready = Ready::EMPTY;
        if event.is_readable() {
            ready |= Ready::READABLE;
        }
        if event.is_writable() {
            ready |= Ready::WRITABLE;
        }
        if event.is_error() {
            ready |= Ready::ERROR;
        }
        if event.is_read_closed() || event.is_write_closed() {
            ready |= Ready::HANGUP;
        }
        ready
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Ready) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Ready) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_readable(self) -> bool {
        self.contains(Ready::READABLE)
    }

    pub fn is_writable(self) -> bool {
        self.contains(Ready::WRITABLE)
    }

    pub fn is_error(self) -> bool {
        self.contains(Ready::ERROR)
    }

    pub fn is_hangup(self) -> bool {
        self.contains(Ready::HANGUP)
    }

    /// Registration interest for the readable/writable part of the set.
    ///
    /// Error and hangup are always reported, so they add nothing here.
    pub fn interest(self) -> Option<Interest> {
        match (self.is_readable(), self.is_writable()) {
            (true, true) => Some(Interest::READABLE | Interest::WRITABLE),
            (true, false) => Some(Interest::READABLE),
            (false, true) => Some(Interest::WRITABLE),
            (false, false) => None,
        }
    }
}

impl BitOr for Ready {
    type Output = Ready;

    fn bitor(self, rhs: Ready) -> Ready {
        Ready(self.0 | rhs.0)
    }
}

impl BitOrAssign for Ready {
    fn bitor_assign(&mut self, rhs: Ready) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Ready {
    type Output = Ready;

    fn bitand(self, rhs: Ready) -> Ready {
        Ready(self.0 & rhs.0)
    }
}

impl BitAndAssign for Ready {
    fn bitand_assign(&mut self, rhs: Ready) {
        self.0 &= rhs.0;
    }
}

impl Sub for Ready {
    type Output = Ready;

    fn sub(self, rhs: Ready) -> Ready {
        Ready(self.0 & !rhs.0)
    }
}

impl Not for Ready {
    type Output = Ready;

    fn not(self) -> Ready {
        Ready(!self.0 & ALL)
    }
}

impl fmt::Debug for Ready {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Ready::READABLE, "READABLE"),
            (Ready::WRITABLE, "WRITABLE"),
            (Ready::ERROR, "ERROR"),
            (Ready::HANGUP, "HANGUP"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("EMPTY")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        let rw = Ready::READABLE | Ready::WRITABLE;
        assert!(rw.contains(Ready::READABLE));
        assert!(!rw.contains(Ready::READABLE | Ready::ERROR));
        assert!(rw.intersects(Ready::READABLE | Ready::ERROR));
        assert_eq!(rw & Ready::WRITABLE, Ready::WRITABLE);
        assert_eq!(rw - Ready::READABLE, Ready::WRITABLE);
        assert_eq!(!rw, Ready::ERROR | Ready::HANGUP);
        assert_eq!(!Ready::EMPTY & rw, rw);
        assert!((!(!Ready::EMPTY)).is_empty());
    }

    #[test]
    fn interest_mapping() {
        assert_eq!(Ready::READABLE.interest(), Some(Interest::READABLE));
        assert_eq!(
            (Ready::WRITABLE | Ready::HANGUP).interest(),
            Some(Interest::WRITABLE)
        );
        assert_eq!(Ready::ERROR.interest(), None);
    }

    #[test]
    fn debug_lists_flags() {
        assert_eq!(format!("{:?}", Ready::READABLE | Ready::HANGUP), "READABLE | HANGUP");
        assert_eq!(format!("{:?}", Ready::EMPTY), "EMPTY");
    }
}
