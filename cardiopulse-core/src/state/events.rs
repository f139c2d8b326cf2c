//! Events that trigger phase transitions

/// Controller conditions sampled when an event is raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Guards {
    /// Runtime governor has latched a graceful shutdown
    pub shutdown_pending: bool,
    /// Position counter equals home
    pub at_home: bool,
}

/// Events that can trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Operator commands
    /// Start (or restart) the cycle
    Start,
    /// Stop stepping and de-energize
    Stop,
    /// Unconditional emergency stop
    EmergencyStop,
    /// Move to an operator-supplied position
    MoveToManual,

    // Motion events
    /// Active leg has emitted all of its steps
    LegExhausted(Guards),
    /// Homing finished within tolerance
    HomeReached(Guards),
    /// Tick spent in `CycleComplete`
    Advance(Guards),
    /// Manual target reached exactly
    TargetReached,
}
