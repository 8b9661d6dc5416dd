use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use blockfire_core::{BlockColor, LevelData, ShooterSpec};
use blockfire_session::SessionConfig;
use blockfire_system_fire_scheduler as fire_scheduler;
use serde::Deserialize;

const SUPPORTED_CATALOG_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelEntry {
    number: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    target_score: u32,
    platforms: u32,
    /// Rows of `Y`/`B`/`R` symbols, bottom row first.
    rows: Vec<String>,
    #[serde(default)]
    shooters: Vec<ShooterEntry>,
    shooter_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShooterEntry {
    color: BlockColor,
    bullets: u32,
}

/// Optional overrides of the session rules, all durations in milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RulesFile {
    seed: Option<u64>,
    aim_ms: Option<u64>,
    fire_delay_ms: Option<u64>,
    retry_cooldown_ms: Option<u64>,
    idle_wait_ms: Option<u64>,
    projectile_flight_ms: Option<u64>,
    merge_settle_ms: Option<u64>,
    merge_combine_ms: Option<u64>,
    merge_resume_ms: Option<u64>,
    max_wrong_hits: Option<u32>,
    exclusive_moves: Option<bool>,
    fire_interval_ms: Option<u64>,
    fire_max_wait_ms: Option<u64>,
    level_gold_reward: Option<u32>,
    points_per_block: Option<u32>,
}

/// Reads a level catalog from a TOML file.
pub(crate) fn load_catalog(path: &Path) -> Result<Vec<LevelData>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level catalog at {}", path.display()))?;
    parse_catalog(&contents)
        .with_context(|| format!("invalid level catalog at {}", path.display()))
}

/// Reads rule overrides from a TOML file.
pub(crate) fn load_rules(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules at {}", path.display()))?;
    parse_rules(&contents).with_context(|| format!("invalid rules at {}", path.display()))
}

pub(crate) fn parse_catalog(contents: &str) -> Result<Vec<LevelData>> {
    let catalog: CatalogFile =
        toml::from_str(contents).context("failed to parse level catalog toml contents")?;
    if catalog.version != SUPPORTED_CATALOG_VERSION {
        bail!(
            "unsupported level catalog version {}; expected {}",
            catalog.version,
            SUPPORTED_CATALOG_VERSION
        );
    }
    if catalog.levels.is_empty() {
        bail!("level catalog lists no levels");
    }

    catalog
        .levels
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            build_level(index, entry).with_context(|| format!("level entry {index} is invalid"))
        })
        .collect()
}

fn build_level(index: usize, entry: LevelEntry) -> Result<LevelData> {
    let number = match entry.number {
        Some(number) => number,
        None => u32::try_from(index + 1).context("level index does not fit a level number")?,
    };
    let shooters = entry
        .shooters
        .iter()
        .map(|shooter| ShooterSpec::new(shooter.color, shooter.bullets))
        .collect();

    let mut level = LevelData::from_symbols(&entry.rows, entry.platforms)?
        .with_shooters(shooters)
        .with_number(number)
        .with_name(entry.name)
        .with_target_score(entry.target_score);
    if let Some(count) = entry.shooter_count {
        level = level.with_shooter_count(count)?;
    }
    level.validate()?;
    if level.shooter_count() == 0 {
        bail!("level {number} places no shooters on deck");
    }
    Ok(level)
}

pub(crate) fn parse_rules(contents: &str) -> Result<SessionConfig> {
    let rules: RulesFile =
        toml::from_str(contents).context("failed to parse rules toml contents")?;
    Ok(rules.apply(SessionConfig::default()))
}

impl RulesFile {
    fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        let millis = Duration::from_millis;
        let world = &mut config.world;
        if let Some(seed) = self.seed {
            world.rng_seed = seed;
        }
        override_with(&mut world.shooter.aim, self.aim_ms.map(millis));
        override_with(&mut world.shooter.fire_delay, self.fire_delay_ms.map(millis));
        override_with(&mut world.shooter.retry_cooldown, self.retry_cooldown_ms.map(millis));
        override_with(&mut world.shooter.idle_wait, self.idle_wait_ms.map(millis));
        override_with(
            &mut world.shooter.projectile_flight,
            self.projectile_flight_ms.map(millis),
        );
        override_with(&mut world.merge.settle, self.merge_settle_ms.map(millis));
        override_with(&mut world.merge.combine, self.merge_combine_ms.map(millis));
        override_with(&mut world.merge.resume, self.merge_resume_ms.map(millis));
        override_with(&mut world.max_wrong_hits, self.max_wrong_hits);
        override_with(&mut world.exclusive_moves, self.exclusive_moves);

        let interval = self
            .fire_interval_ms
            .map_or(config.scheduler.interval(), millis)
            .max(fire_scheduler::MIN_INTERVAL);
        let max_wait = self
            .fire_max_wait_ms
            .map_or(config.scheduler.max_wait(), millis)
            .max(fire_scheduler::MIN_MAX_WAIT);
        config.scheduler = fire_scheduler::Config::new(interval, max_wait);

        override_with(&mut config.level_gold_reward, self.level_gold_reward);
        override_with(&mut config.points_per_block, self.points_per_block);
        config
    }
}

fn override_with<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
