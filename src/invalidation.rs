use bitflags::bitflags;

bitflags! {
    /// Flags indicating which derived parameters a configuration change invalidates
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ChangeFlags: u8 {
        /// Surface size, stroke width or stroke colour changed
        const GEOMETRY  = 0b0001;
        /// Total frame count or frame delay changed (live frame counter is invalid)
        const TIMING    = 0b0010;
        /// Only the next draw pass is affected
        const PAINT     = 0b0100;
        /// Rotation direction flipped (start timestamp must be re-anchored)
        const DIRECTION = 0b1000;
    }
}

impl ChangeFlags {
    /// Whether derived parameters must be recomputed
    pub fn needs_recompute(self) -> bool {
        self.intersects(ChangeFlags::GEOMETRY | ChangeFlags::TIMING | ChangeFlags::DIRECTION)
    }

    /// Whether a running animation has to be restarted
    pub fn needs_restart(self) -> bool {
        self.contains(ChangeFlags::TIMING)
    }
}
