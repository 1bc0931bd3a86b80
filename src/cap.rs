//! Reference capabilities and the subcapability relation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Iso,
    Trn,
    Ref,
    Val,
    Box,
    Tag,
    /// `#read`: ref | val | box
    Read,
    /// `#send`: iso | val | tag
    Send,
    /// `#share`: val | tag
    Share,
    /// `#alias`: ref | val | box | tag
    Alias,
    /// `#any`: every capability
    Any,
}

/// What a callee demands of an argument it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aliasing {
    /// The argument must be handed over; the caller keeps no usable alias.
    Unique,
    /// Aliases may be kept by both sides.
    Shared,
    /// Identity only; no reads or writes through the reference.
    Opaque,
}

impl Capability {
    /// The concrete capabilities a value of this capability may have.
    pub fn members(self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Iso => &[Iso],
            Trn => &[Trn],
            Ref => &[Ref],
            Val => &[Val],
            Box => &[Box],
            Tag => &[Tag],
            Read => &[Ref, Val, Box],
            Send => &[Iso, Val, Tag],
            Share => &[Val, Tag],
            Alias => &[Ref, Val, Box, Tag],
            Any => &[Iso, Trn, Ref, Val, Box, Tag],
        }
    }

    /// Subcapability of an aliased reference: every concrete capability `self` may stand for,
    /// once aliased, is usable wherever every concrete capability of `other` is required.
    ///
    /// The original binding stays live next to the alias, so an aliased `iso` only satisfies
    /// `iso` and `tag`, and an aliased `trn` only satisfies `trn`, `box` and `tag`.
    pub fn is_sub(self, other: Capability) -> bool {
        self.members()
            .iter()
            .all(|&a| other.members().iter().all(|&b| concrete_sub(a, b)))
    }

    pub fn aliasing(self) -> Aliasing {
        match self {
            Capability::Iso | Capability::Trn => Aliasing::Unique,
            Capability::Tag => Aliasing::Opaque,
            _ => Aliasing::Shared,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Capability::Iso => "iso",
            Capability::Trn => "trn",
            Capability::Ref => "ref",
            Capability::Val => "val",
            Capability::Box => "box",
            Capability::Tag => "tag",
            Capability::Read => "#read",
            Capability::Send => "#send",
            Capability::Share => "#share",
            Capability::Alias => "#alias",
            Capability::Any => "#any",
        }
    }
}

fn concrete_sub(a: Capability, b: Capability) -> bool {
    use Capability::*;
    if a == b {
        return true;
    }
    match a {
        Iso => b == Tag,
        Trn => matches!(b, Box | Tag),
        Ref | Val => matches!(b, Box | Tag),
        Box => b == Tag,
        _ => false,
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
