use hostile_presence_core::{
    PlacementView, Position, PresenceConfiguration, PresenceId, StaticUnitKind, BASE_RADIUS,
    PLAYER_RADIUS,
};

/// Reason a candidate spawn coordinate was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Too close to a player-built docking base in a gamma zone.
    GammaDockingStructure,
    /// Too close to a static docking base.
    DockingBase,
    /// Too close to a teleport.
    Teleport,
    /// Too close to the recorded spawn origin of another presence.
    PresenceOrigin(PresenceId),
    /// Too close to a player character.
    Player,
}

/// Distances a spawn site must keep from zone features.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExclusionRules {
    base_radius: f32,
    player_radius: f32,
}

impl ExclusionRules {
    /// Creates rules with explicit radii.
    #[must_use]
    pub const fn new(base_radius: f32, player_radius: f32) -> Self {
        Self {
            base_radius,
            player_radius,
        }
    }

    /// Rules for a presence; a narrower configured player distance replaces the player radius.
    #[must_use]
    pub fn for_presence(configuration: &PresenceConfiguration) -> Self {
        let player_radius = match configuration.player_min_distance {
            Some(distance) if distance < PLAYER_RADIUS => distance.max(0.0),
            _ => PLAYER_RADIUS,
        };
        Self::new(BASE_RADIUS, player_radius)
    }

    /// Radius kept around docking structures and presence origins.
    #[must_use]
    pub const fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Radius kept around players and teleports.
    #[must_use]
    pub const fn player_radius(&self) -> f32 {
        self.player_radius
    }

    /// Accepts the candidate or names the first rule it violates.
    pub fn check(&self, view: &PlacementView, candidate: Position) -> Result<(), Rejection> {
        let near = |position: Position, radius: f32| candidate.is_in_range_of_2d(position, radius);

        if view.is_gamma()
            && view
                .static_units_of(StaticUnitKind::PbsDockingBase)
                .any(|position| near(position, self.base_radius))
        {
            return Err(Rejection::GammaDockingStructure);
        }
        if view
            .static_units_of(StaticUnitKind::DockingBase)
            .any(|position| near(position, self.base_radius))
        {
            return Err(Rejection::DockingBase);
        }
        if view
            .static_units_of(StaticUnitKind::Teleport)
            .any(|position| near(position, self.player_radius))
        {
            return Err(Rejection::Teleport);
        }
        if let Some(origin) = view
            .presence_origins()
            .iter()
            .find(|origin| near(origin.origin, self.base_radius))
        {
            return Err(Rejection::PresenceOrigin(origin.presence));
        }
        if view
            .players()
            .iter()
            .any(|position| near(*position, self.player_radius))
        {
            return Err(Rejection::Player);
        }
        Ok(())
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new(BASE_RADIUS, PLAYER_RADIUS)
    }
}
