//! Admission and ban policy switches

bitflags::bitflags! {
    /// Process-wide policy flags, set once from configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PolicyFlags: u8 {
        /// Suppress every pink-list check
        const NO_PINKLIST = 0b0000_0001;
        /// Refuse private-range addresses on admission
        const NO_PRIVATE = 0b0000_0010;
    }
}

impl PolicyFlags {
    pub fn ban_check_disabled(self) -> bool {
        self.contains(PolicyFlags::NO_PINKLIST)
    }

    pub fn private_rejected(self) -> bool {
        self.contains(PolicyFlags::NO_PRIVATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let flags = PolicyFlags::default();
        assert!(!flags.ban_check_disabled());
        assert!(!flags.private_rejected());
    }

    #[test]
    fn test_flags_independent() {
        let flags = PolicyFlags::NO_PRIVATE;
        assert!(flags.private_rejected());
        assert!(!flags.ban_check_disabled());

        let both = PolicyFlags::NO_PRIVATE | PolicyFlags::NO_PINKLIST;
        assert!(both.private_rejected());
        assert!(both.ban_check_disabled());
    }
}
