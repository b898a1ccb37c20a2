use crate::keyword::Keyword;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Declaration modifiers as a small bit set.
#[derive(Eq, PartialEq, Copy, Clone, Hash, Default)]
pub struct Flags(u16);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const PUBLIC: Flags = Flags(1 << 0);
    pub const PROTECTED: Flags = Flags(1 << 1);
    pub const PRIVATE: Flags = Flags(1 << 2);
    pub const STATIC: Flags = Flags(1 << 3);
    pub const FINAL: Flags = Flags(1 << 4);
    pub const ABSTRACT: Flags = Flags(1 << 5);
    pub const NATIVE: Flags = Flags(1 << 6);
    pub const SYNCHRONIZED: Flags = Flags(1 << 7);
    pub const TRANSIENT: Flags = Flags(1 << 8);
    pub const VOLATILE: Flags = Flags(1 << 9);
    pub const STRICTFP: Flags = Flags(1 << 10);
    pub const INTERFACE: Flags = Flags(1 << 11);

    pub const ACCESS: Flags = Flags(Self::PUBLIC.0 | Self::PROTECTED.0 | Self::PRIVATE.0);

    const NAMES: [(Flags, &'static str); 12] = [
        (Flags::PUBLIC, "public"),
        (Flags::PROTECTED, "protected"),
        (Flags::PRIVATE, "private"),
        (Flags::STATIC, "static"),
        (Flags::FINAL, "final"),
        (Flags::ABSTRACT, "abstract"),
        (Flags::NATIVE, "native"),
        (Flags::SYNCHRONIZED, "synchronized"),
        (Flags::TRANSIENT, "transient"),
        (Flags::VOLATILE, "volatile"),
        (Flags::STRICTFP, "strictfp"),
        (Flags::INTERFACE, "interface"),
    ];

    pub fn from_keyword(kw: Keyword) -> Option<Flags> {
        match kw {
            Keyword::Public => Some(Flags::PUBLIC),
            Keyword::Protected => Some(Flags::PROTECTED),
            Keyword::Private => Some(Flags::PRIVATE),
            Keyword::Static => Some(Flags::STATIC),
            Keyword::Final => Some(Flags::FINAL),
            Keyword::Abstract => Some(Flags::ABSTRACT),
            Keyword::Native => Some(Flags::NATIVE),
            Keyword::Synchronized => Some(Flags::SYNCHRONIZED),
            Keyword::Transient => Some(Flags::TRANSIENT),
            Keyword::Volatile => Some(Flags::VOLATILE),
            Keyword::StrictFp => Some(Flags::STRICTFP),
            _ => None,
        }
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn set(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    pub fn clear(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }

    pub fn intersection(self, other: Flags) -> Flags {
        Flags(self.0 & other.0)
    }

    pub fn access(self) -> Flags {
        self.intersection(Flags::ACCESS)
    }

    pub fn is_public(self) -> bool {
        self.contains(Flags::PUBLIC)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Flags::PROTECTED)
    }

    pub fn is_private(self) -> bool {
        self.contains(Flags::PRIVATE)
    }

    pub fn is_package(self) -> bool {
        !self.intersects(Flags::ACCESS)
    }

    pub fn is_static(self) -> bool {
        self.contains(Flags::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Flags::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Flags::ABSTRACT)
    }

    pub fn is_native(self) -> bool {
        self.contains(Flags::NATIVE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Flags::INTERFACE)
    }

    /// Ranks access levels from most restrictive (private, 0) to least (public, 3).
    pub fn access_rank(self) -> u8 {
        if self.is_public() {
            3
        } else if self.is_protected() {
            2
        } else if self.is_private() {
            0
        } else {
            1
        }
    }

    pub fn access_name(self) -> &'static str {
        match self.access_rank() {
            3 => "public",
            2 => "protected",
            0 => "private",
            _ => "package",
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.set(rhs)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Flags::NAMES.iter() {
            if self.contains(*flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Flags({})", self)
    }
}
