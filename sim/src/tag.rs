/// Identifier of a simulation entity. Allocated by the registry, never reused within a session.
pub type EntityId = u64;

/// Packed [`BodyTag`] as stored in Rapier's `RigidBody::user_data`.
///
/// # Bit layout
/// Least-significant bit = bit 0:
///
/// - bits 0..=63   : owning [`EntityId`] (u64)
/// - bits 64..=71  : [`BodyKind`] discriminant (u8)
/// - bits 72..=127 : reserved (must be zero)
///
/// A kind byte of zero is never produced, so a body that was inserted without a tag (user data
/// left at its default `0`) decodes to `None` instead of aliasing entity 0.
pub type PackedTag = u128;

/// Concrete kind of the entity that owns a rigid body.
///
/// The numeric values are part of the packed tag format.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Box = 1,
    Sphere = 2,
    Pickable = 3,
    Puzzle = 4,
    Player = 5,
    Ground = 6,
}

impl BodyKind {
    pub const ALL: [BodyKind; 6] = [
        BodyKind::Box,
        BodyKind::Sphere,
        BodyKind::Pickable,
        BodyKind::Puzzle,
        BodyKind::Player,
        BodyKind::Ground,
    ];

    fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(BodyKind::Box),
            2 => Some(BodyKind::Sphere),
            3 => Some(BodyKind::Pickable),
            4 => Some(BodyKind::Puzzle),
            5 => Some(BodyKind::Player),
            6 => Some(BodyKind::Ground),
            _ => None,
        }
    }
}

/// Typed association from a rigid body back to the entity that owns it.
///
/// The tag holds the entity id, not a reference: resolving it goes through the registry, which
/// answers `None` once the entity is gone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyTag {
    pub kind: BodyKind,
    pub entity: EntityId,
}

impl BodyTag {
    pub fn new(kind: BodyKind, entity: EntityId) -> Self {
        Self { kind, entity }
    }

    pub fn pack(self) -> PackedTag {
        (self.entity as u128) | ((self.kind as u128) << EntityId::BITS)
    }

    /// Decodes a packed tag.
    ///
    /// Returns `None` for untagged bodies, unknown kinds or non-zero reserved bits.
    pub fn unpack(packed: PackedTag) -> Option<Self> {
        const RESERVED_MASK: u128 = !0u128 << 72;
        const KIND_MASK: u128 = u8::MAX as u128;
        const ID_MASK: u128 = u64::MAX as u128;

        if packed & RESERVED_MASK != 0 {
            return None;
        }
        let kind = BodyKind::from_u8(((packed >> EntityId::BITS) & KIND_MASK) as u8)?;
        Some(Self {
            kind,
            entity: (packed & ID_MASK) as EntityId,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpacks_entity_and_kind() {
        let ids: [EntityId; 5] = [0, 1, 42, u32::MAX as u64, u64::MAX];

        for &id in &ids {
            for kind in BodyKind::ALL {
                let tag = BodyTag::new(kind, id);
                assert_eq!(BodyTag::unpack(tag.pack()), Some(tag));
            }
        }
    }

    #[test]
    fn pack_places_entity_in_low_64_bits_and_kind_in_next_8_bits() {
        let id: EntityId = 0x0123_4567_89AB_CDEF;
        let packed = BodyTag::new(BodyKind::Player, id).pack();

        assert_eq!(packed, (id as u128) | (5u128 << 64));
        assert_eq!((packed >> 72) as u64, 0);
    }

    #[test]
    fn untagged_body_user_data_decodes_to_none() {
        assert_eq!(BodyTag::unpack(0), None);
        // Entity id bits alone are not enough.
        assert_eq!(BodyTag::unpack(7), None);
    }

    #[test]
    fn unknown_kind_decodes_to_none() {
        let packed: PackedTag = 123 | (200u128 << 64);
        assert_eq!(BodyTag::unpack(packed), None);
    }

    #[test]
    fn reserved_bits_decode_to_none() {
        let packed = BodyTag::new(BodyKind::Box, 9).pack() | (1u128 << 72);
        assert_eq!(BodyTag::unpack(packed), None);
    }
}
