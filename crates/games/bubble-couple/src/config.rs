use serde::{Deserialize, Serialize};

use crate::items::ItemDropTable;

/// Data-driven configuration for a Bubble Couple session.
///
/// Supplied at level-init time. Nothing here changes mid-level; per-player
/// stats only move through pickups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Grid width in cells.
    pub grid_width: u32,
    /// Grid height in cells.
    pub grid_height: u32,
    /// Tile edge length in pixels.
    pub tile_size: f32,
    /// Hitbox edge length in pixels, shared by players and enemies.
    pub entity_size: f32,
    /// Simulation tick rate (Hz).
    pub tick_rate_hz: f32,
    /// Starting player speed (px/s).
    pub base_move_speed: f32,
    /// Speed added per SPEED_UP pickup (px/s).
    pub speed_increment: f32,
    /// Speed cap (px/s).
    pub max_move_speed: f32,
    /// Bombs a player may have live at level start.
    pub base_max_bombs: u32,
    /// Blast range at level start, in cells.
    pub base_bomb_range: u32,
    /// Time from placement to detonation (seconds).
    pub bomb_fuse_secs: f32,
    /// How long an explosion cell stays lethal (seconds).
    pub explosion_lifetime_secs: f32,
    /// Kicked bomb travel speed (cells/s).
    pub kick_speed_cells: f32,
    /// Countdown from TRAPPED to DEAD (seconds).
    pub trap_duration_secs: f32,
    /// Damage immunity after a shield absorbs a hit (seconds).
    pub shield_invincibility_secs: f32,
    /// Damage immunity after being rescued from a trap (seconds).
    pub rescue_invincibility_secs: f32,
    /// Enemy damage immunity after taking a hit (seconds).
    pub enemy_hit_invincibility_secs: f32,
    /// GHOST buff duration (seconds). Refreshes, never stacks.
    pub ghost_duration_secs: f32,
    /// Per-level countdown (seconds).
    pub level_time_secs: f32,
    /// Clearing this PvE level wins the campaign.
    pub final_level: u32,
    /// Soft wall density on level 1 (fraction of free cells).
    pub soft_wall_density_base: f32,
    /// Density added per level.
    pub soft_wall_density_step: f32,
    /// Density cap.
    pub soft_wall_density_max: f32,
    /// Enemies on level 1.
    pub enemy_base_count: u32,
    /// Enemies added per level.
    pub enemy_count_step: u32,
    /// Hard cap on live enemies, boss spawns included.
    pub max_enemies: u32,
    /// Pixels shaved off each hitbox side for enemy contact checks.
    pub contact_inset: f32,
    /// BOSS_SLIME minion spawn cooldown (seconds).
    pub slime_special_cooldown_secs: f32,
    /// BOSS_MECHA burst cooldown (seconds).
    pub mecha_special_cooldown_secs: f32,
    /// BOSS_MECHA burst range (cells).
    pub mecha_burst_range: u32,
    /// Soft-wall item drop table.
    pub items: ItemDropTable,
    /// Base seed for level generation, drops and enemy AI.
    pub seed: u64,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            grid_width: 15,
            grid_height: 13,
            tile_size: 48.0,
            entity_size: 36.0,
            tick_rate_hz: 60.0,
            base_move_speed: 150.0,
            speed_increment: 20.0,
            max_move_speed: 270.0,
            base_max_bombs: 1,
            base_bomb_range: 1,
            bomb_fuse_secs: 2.0,
            explosion_lifetime_secs: 0.6,
            kick_speed_cells: 8.0,
            trap_duration_secs: 5.0,
            shield_invincibility_secs: 1.0,
            rescue_invincibility_secs: 1.5,
            enemy_hit_invincibility_secs: 0.5,
            ghost_duration_secs: 5.0,
            level_time_secs: 180.0,
            final_level: 10,
            soft_wall_density_base: 0.30,
            soft_wall_density_step: 0.05,
            soft_wall_density_max: 0.70,
            enemy_base_count: 3,
            enemy_count_step: 1,
            max_enemies: 8,
            contact_inset: 6.0,
            slime_special_cooldown_secs: 6.0,
            mecha_special_cooldown_secs: 5.0,
            mecha_burst_range: 2,
            items: ItemDropTable::default(),
            seed: 0x00B0_BB1E,
        }
    }
}

/// Why a configuration was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    GridTooSmall { width: u32, height: u32 },
    NotPositive(&'static str),
    OutOfRange { field: &'static str, value: f32 },
    EntityTooLarge { entity_size: f32, tile_size: f32 },
    EmptyItemTable,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::GridTooSmall { width, height } => {
                write!(f, "grid {width}x{height} is smaller than the 5x5 minimum")
            },
            Self::NotPositive(field) => write!(f, "{field} must be > 0"),
            Self::OutOfRange { field, value } => {
                write!(f, "{field} = {value} is outside [0, 1]")
            },
            Self::EntityTooLarge {
                entity_size,
                tile_size,
            } => write!(
                f,
                "entity_size {entity_size} does not fit in a {tile_size}px tile"
            ),
            Self::EmptyItemTable => write!(f, "item drops enabled but every weight is zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BubbleConfig {
    /// Load config from `BUBBLE_COUPLE_CONFIG`, then `config/bubble.toml`,
    /// falling back to defaults.
    pub fn load() -> Self {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("BUBBLE_COUPLE_CONFIG") {
            candidates.push(path);
        }
        candidates.push("config/bubble.toml".to_string());
        Self::load_first(&candidates)
    }

    /// The first candidate file that reads and validates, else defaults.
    fn load_first(candidates: &[String]) -> Self {
        for path in candidates {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!("Cannot read {path}: {e}");
                    continue;
                },
            };
            match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded bubble config");
                    return cfg;
                },
                Err(e) => tracing::warn!("Rejected {path}: {e}"),
            }
        }
        Self::default()
    }

    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < 5 || self.grid_height < 5 {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        let positive = [
            ("tile_size", self.tile_size),
            ("entity_size", self.entity_size),
            ("tick_rate_hz", self.tick_rate_hz),
            ("base_move_speed", self.base_move_speed),
            ("max_move_speed", self.max_move_speed),
            ("bomb_fuse_secs", self.bomb_fuse_secs),
            ("explosion_lifetime_secs", self.explosion_lifetime_secs),
            ("kick_speed_cells", self.kick_speed_cells),
            ("trap_duration_secs", self.trap_duration_secs),
            ("level_time_secs", self.level_time_secs),
            ("slime_special_cooldown_secs", self.slime_special_cooldown_secs),
            ("mecha_special_cooldown_secs", self.mecha_special_cooldown_secs),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive(field));
            }
        }
        if self.base_max_bombs == 0 {
            return Err(ConfigError::NotPositive("base_max_bombs"));
        }
        if self.base_bomb_range == 0 {
            return Err(ConfigError::NotPositive("base_bomb_range"));
        }
        if self.final_level == 0 {
            return Err(ConfigError::NotPositive("final_level"));
        }

        if self.entity_size > self.tile_size {
            return Err(ConfigError::EntityTooLarge {
                entity_size: self.entity_size,
                tile_size: self.tile_size,
            });
        }

        let fractions = [
            ("soft_wall_density_base", self.soft_wall_density_base),
            ("soft_wall_density_step", self.soft_wall_density_step),
            ("soft_wall_density_max", self.soft_wall_density_max),
            ("items.drop_chance", self.items.drop_chance),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        if self.items.drop_chance > 0.0 && self.items.weights.total() == 0 {
            return Err(ConfigError::EmptyItemTable);
        }
        Ok(())
    }

    /// Pixel offset that centres a hitbox inside a tile.
    pub fn entity_offset(&self) -> f32 {
        (self.tile_size - self.entity_size) / 2.0
    }

    /// Soft wall density for `level`, clamped to the configured maximum.
    pub fn soft_wall_density(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.soft_wall_density_base + self.soft_wall_density_step * steps)
            .min(self.soft_wall_density_max)
    }
}
