#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blockfire gameplay engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! the presentation layer to react to. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns in every level grid.
pub const GRID_COLUMNS: u32 = 10;

/// Tallest grid a level may describe.
pub const MAX_GRID_ROWS: u32 = 15;

/// Grid height used when a level does not specify one.
pub const DEFAULT_GRID_ROWS: u32 = 15;

/// Largest number of launch platforms a level may declare.
pub const MAX_PLATFORMS: u32 = 10;

/// Largest number of shooters a level may place on deck.
pub const MAX_SHOOTERS: u32 = 64;

/// Ammunition assigned to shooters that a level lists without an explicit entry.
pub const DEFAULT_SHOOTER_BULLETS: u32 = 20;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the current level with the provided descriptor.
    LoadLevel {
        /// Static level description used to populate grid, shooters and slots.
        level: LevelData,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Player selected an on-deck shooter; the world reserves a free slot for it.
    ActivateShooter {
        /// Shooter the player selected.
        shooter: ShooterId,
    },
    /// The presentation layer finished moving a shooter onto the given slot.
    CompleteArrival {
        /// Slot whose reservation should resolve to an occupied slot.
        slot: SlotIndex,
    },
    /// Starts the shooting loop of a docked shooter.
    StartShooting {
        /// Shooter whose loop should begin.
        shooter: ShooterId,
    },
    /// Stops the shooting loop of a shooter and cancels its suspended work.
    StopShooting {
        /// Shooter whose loop should end.
        shooter: ShooterId,
    },
    /// Requests a merge check for docked shooters of the provided color.
    CheckForMerge {
        /// Color whose docked shooters should be counted.
        color: BlockColor,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a level populated the grid, the shooter pool and the slots.
    LevelLoaded {
        /// Number of grid columns.
        columns: u32,
        /// Number of grid rows.
        rows: u32,
        /// Number of blocks placed into the grid.
        blocks: u32,
        /// Number of shooters placed on deck.
        shooters: u32,
        /// Number of launch platforms.
        platforms: u32,
    },
    /// A block was hit and removed from the grid.
    BlockDestroyed {
        /// Identifier of the destroyed block.
        block: BlockId,
        /// Cell the block occupied when it was destroyed.
        cell: CellCoord,
        /// Color of the destroyed block.
        color: BlockColor,
    },
    /// Gravity moved a block down its column.
    BlockMoved {
        /// Identifier of the block that moved.
        block: BlockId,
        /// Cell the block occupied before settling.
        from: CellCoord,
        /// Cell the block occupies after settling.
        to: CellCoord,
    },
    /// Every block in the level has been destroyed.
    LevelCleared {
        /// Number of blocks destroyed over the level.
        destroyed: u32,
    },
    /// No shooters remain while blocks are still left on the grid.
    LevelFailed {
        /// Number of blocks still on the grid.
        remaining: u32,
    },
    /// A shooter left the deck and is travelling towards a reserved slot.
    ShooterActivated {
        /// Shooter that was activated.
        shooter: ShooterId,
        /// Slot reserved for the shooter.
        slot: SlotIndex,
    },
    /// An activation request could not be honoured.
    ActivationRejected {
        /// Shooter the player selected.
        shooter: ShooterId,
        /// Reason the activation failed.
        reason: ActivationError,
    },
    /// A shooter arrived on its reserved slot and is now docked.
    SlotArrived {
        /// Slot the shooter docked on.
        slot: SlotIndex,
        /// Shooter that docked.
        shooter: ShooterId,
    },
    /// A slot became free again.
    SlotReleased {
        /// Slot that was released.
        slot: SlotIndex,
    },
    /// A shooter entered its shooting loop.
    ShootingStarted {
        /// Shooter that started shooting.
        shooter: ShooterId,
    },
    /// A shooter left its shooting loop without being destroyed.
    ShootingStopped {
        /// Shooter that stopped shooting.
        shooter: ShooterId,
    },
    /// The visible color of a shooter changed.
    ShooterColorChanged {
        /// Shooter whose appearance changed.
        shooter: ShooterId,
        /// Color the shooter should now be drawn with.
        color: BlockColor,
    },
    /// A projectile left a shooter.
    ProjectileLaunched {
        /// Shooter that fired.
        shooter: ShooterId,
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Cell the projectile flies towards.
        target: CellCoord,
    },
    /// A projectile reached an empty cell.
    ProjectileMissed {
        /// Projectile that missed.
        projectile: ProjectileId,
        /// Cell the projectile reached.
        cell: CellCoord,
    },
    /// A projectile reached a block of a different color.
    WrongHit {
        /// Shooter that fired the projectile.
        shooter: ShooterId,
        /// Cell the projectile reached.
        cell: CellCoord,
        /// Consecutive wrong hits recorded for the shooter.
        streak: u32,
    },
    /// The ammunition of a shooter changed.
    AmmoChanged {
        /// Shooter whose ammunition changed.
        shooter: ShooterId,
        /// Ammunition remaining after the change.
        ammo: u32,
    },
    /// Three or more docked shooters of one color started merging.
    MergeStarted {
        /// Color shared by the participants.
        color: BlockColor,
        /// Shooters taking part in the merge, in slot order.
        participants: Vec<ShooterId>,
        /// Combined ammunition of the participants when the merge started.
        ammo: u32,
    },
    /// A merge finished and its survivor may resume shooting.
    MergeCompleted {
        /// Shooter that absorbed the other participants.
        survivor: ShooterId,
        /// Ammunition of the survivor after the merge.
        ammo: u32,
    },
    /// A shooter was removed from play.
    ShooterDestroyed {
        /// Shooter that was removed.
        shooter: ShooterId,
        /// Why the shooter was removed.
        reason: DestroyReason,
    },
}

/// Colors shared by blocks and shooters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    /// Yellow blocks and shooters.
    Yellow,
    /// Blue blocks and shooters.
    Blue,
    /// Red blocks and shooters.
    Red,
}

impl BlockColor {
    /// Every color in declaration order.
    pub const ALL: [BlockColor; 3] = [BlockColor::Yellow, BlockColor::Blue, BlockColor::Red];

    /// Color at `index` modulo the number of colors.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Parses the single-letter symbol used in level layouts (`Y`, `B`, `R`).
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'Y' => Some(Self::Yellow),
            'B' => Some(Self::Blue),
            'R' => Some(Self::Red),
            _ => None,
        }
    }

    /// Single-letter symbol used in level layouts.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Yellow => 'Y',
            Self::Blue => 'B',
            Self::Red => 'R',
        }
    }
}

impl fmt::Display for BlockColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yellow => write!(f, "yellow"),
            Self::Blue => write!(f, "blue"),
            Self::Red => write!(f, "red"),
        }
    }
}

/// Unique identifier assigned to a grid block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a new block identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a shooter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShooterId(u32);

impl ShooterId {
    /// Creates a new shooter identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShooterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shooter#{}", self.0)
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position of a launch platform within the ordered slot table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(u32);

impl SlotIndex {
    /// Creates a new slot index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Slot position usable for indexing slot tables.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the bottom row; gravity pulls blocks towards it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Shooting state of a shooter. Exactly one holds at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShootingState {
    /// Not shooting and not travelling.
    Idle,
    /// Running its shooting loop on a slot.
    Shooting,
    /// Travelling from the deck towards a reserved slot.
    Moving,
}

/// Why a shooter was removed from play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestroyReason {
    /// The shooter ran out of ammunition.
    AmmoExhausted,
    /// The shooter was absorbed into a merge survivor.
    Merged,
}

/// Reasons a slot reservation may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SlotError {
    /// The slot index exceeds the configured number of platforms.
    #[error("slot {slot} is outside the {count} configured platforms")]
    OutOfRange {
        /// Requested slot.
        slot: SlotIndex,
        /// Number of configured platforms.
        count: u32,
    },
    /// Another shooter is already travelling towards the slot.
    #[error("slot {slot} is reserved by a shooter in flight")]
    Reserved {
        /// Requested slot.
        slot: SlotIndex,
    },
    /// A shooter is already docked on the slot.
    #[error("slot {slot} is already occupied")]
    Occupied {
        /// Requested slot.
        slot: SlotIndex,
    },
}

/// Reasons an activation request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ActivationError {
    /// No shooter with the provided identifier exists.
    #[error("shooter does not exist")]
    UnknownShooter,
    /// The shooter is docked, travelling or shooting.
    #[error("shooter is not waiting on deck")]
    NotOnDeck,
    /// The shooter has no ammunition left.
    #[error("shooter has no ammunition")]
    OutOfAmmo,
    /// Another shooter is still travelling towards its slot.
    #[error("another shooter is still moving")]
    MoveInFlight,
    /// Every slot is reserved or occupied.
    #[error("no free platform slot")]
    SlotUnavailable,
}

/// Immutable representation of a single block used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockSnapshot {
    /// Identifier of the block.
    pub id: BlockId,
    /// Color of the block.
    pub color: BlockColor,
    /// Cell the block currently occupies.
    pub cell: CellCoord,
}

/// Immutable representation of a single shooter used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShooterSnapshot {
    /// Identifier of the shooter.
    pub id: ShooterId,
    /// Color the shooter targets.
    pub color: BlockColor,
    /// Ammunition remaining.
    pub ammo: u32,
    /// Upper bound for refunds.
    pub max_ammo: u32,
    /// Current shooting state.
    pub state: ShootingState,
    /// Slot the shooter is docked on, if it has arrived.
    pub slot: Option<SlotIndex>,
    /// Slot reserved for a shooter still travelling.
    pub reserved_slot: Option<SlotIndex>,
    /// Indicates whether the shooter takes part in a running merge.
    pub merging: bool,
    /// Consecutive wrong hits since the last correct hit.
    pub wrong_hits: u32,
}

impl ShooterSnapshot {
    /// Reports whether a fire pass may start this shooter.
    #[must_use]
    pub fn ready_to_fire(&self) -> bool {
        self.slot.is_some() && self.ammo > 0 && self.state == ShootingState::Idle && !self.merging
    }

    /// Reports whether the shooter is waiting on deck.
    #[must_use]
    pub fn on_deck(&self) -> bool {
        self.slot.is_none() && self.reserved_slot.is_none() && self.state == ShootingState::Idle
    }
}

/// Read-only snapshot describing all shooters in play.
#[derive(Clone, Debug, Default)]
pub struct ShooterView {
    snapshots: Vec<ShooterSnapshot>,
}

impl ShooterView {
    /// Creates a new shooter view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ShooterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured shooter snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ShooterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single shooter.
    #[must_use]
    pub fn get(&self, id: ShooterId) -> Option<&ShooterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Docked shooters ordered by slot index.
    #[must_use]
    pub fn docked_in_slot_order(&self) -> Vec<ShooterSnapshot> {
        let mut docked: Vec<ShooterSnapshot> = self
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.slot.is_some())
            .copied()
            .collect();
        docked.sort_by_key(|snapshot| snapshot.slot);
        docked
    }

    /// Number of captured shooters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no shooters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ShooterSnapshot> {
        self.snapshots
    }
}

/// Occupancy state of a single launch platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotOccupancy {
    /// Nobody docked or travelling.
    Empty,
    /// A shooter is travelling towards the slot.
    Reserved(ShooterId),
    /// A shooter is docked on the slot.
    Occupied(ShooterId),
}

/// Immutable representation of one launch platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotSnapshot {
    /// Position of the slot.
    pub slot: SlotIndex,
    /// Occupancy of the slot.
    pub occupancy: SlotOccupancy,
}

/// Read-only snapshot of the platform slot table in slot order.
#[derive(Clone, Debug, Default)]
pub struct PlatformView {
    slots: Vec<SlotSnapshot>,
}

impl PlatformView {
    /// Creates a new platform view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut slots: Vec<SlotSnapshot>) -> Self {
        slots.sort_by_key(|snapshot| snapshot.slot);
        Self { slots }
    }

    /// Iterator over the slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.slots.iter()
    }

    /// Slots that are neither reserved nor occupied.
    pub fn free_slots(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.slots
            .iter()
            .filter(|snapshot| snapshot.occupancy == SlotOccupancy::Empty)
            .map(|snapshot| snapshot.slot)
    }

    /// Number of slots in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether the table has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Color and ammunition of one shooter listed by a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShooterSpec {
    /// Color of the shooter.
    pub color: BlockColor,
    /// Starting and maximum ammunition.
    pub bullets: u32,
}

impl ShooterSpec {
    /// Creates a new shooter descriptor.
    #[must_use]
    pub const fn new(color: BlockColor, bullets: u32) -> Self {
        Self { color, bullets }
    }
}

/// Reasons a level descriptor may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The grid height is zero or exceeds [`MAX_GRID_ROWS`].
    #[error("grid height {rows} must be between 1 and {MAX_GRID_ROWS}")]
    RowsOutOfRange {
        /// Requested height.
        rows: u32,
    },
    /// The layout lists more rows than the grid holds.
    #[error("layout lists {layout} rows but the grid only has {rows}")]
    LayoutTooTall {
        /// Grid height.
        rows: u32,
        /// Number of layout rows.
        layout: usize,
    },
    /// A layout row is wider than [`GRID_COLUMNS`].
    #[error("layout row {row} has {width} cells, more than {GRID_COLUMNS}")]
    RowTooWide {
        /// Offending row, counted from the bottom.
        row: usize,
        /// Number of cells in the row.
        width: usize,
    },
    /// The platform count is zero or exceeds [`MAX_PLATFORMS`].
    #[error("platform count {count} must be between 1 and {MAX_PLATFORMS}")]
    PlatformsOutOfRange {
        /// Requested platform count.
        count: u32,
    },
    /// The level places more than [`MAX_SHOOTERS`] shooters on deck.
    #[error("shooter count {count} exceeds the limit of {MAX_SHOOTERS}")]
    TooManyShooters {
        /// Requested shooter count.
        count: u32,
    },
    /// A layout row contains a symbol other than `Y`, `B` or `R`.
    #[error("unknown block symbol {symbol:?} in layout row {row}")]
    UnknownSymbol {
        /// Offending row, counted from the bottom.
        row: usize,
        /// Unrecognised symbol.
        symbol: char,
    },
}

/// Static, read-only description of a level.
///
/// Layout rows are listed bottom-first. Cells the layout leaves out are
/// yellow, and shooters the list leaves out alternate colors with
/// [`DEFAULT_SHOOTER_BULLETS`] ammunition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    number: u32,
    name: String,
    target_score: u32,
    grid_rows: u32,
    layout: Vec<Vec<BlockColor>>,
    shooters: Vec<ShooterSpec>,
    shooter_count: u32,
    platform_count: u32,
}

impl LevelData {
    /// Creates a validated level with the provided grid and platform count.
    pub fn new(
        grid_rows: u32,
        layout: Vec<Vec<BlockColor>>,
        platform_count: u32,
    ) -> Result<Self, LevelError> {
        let level = Self {
            number: 1,
            name: String::new(),
            target_score: 0,
            grid_rows,
            layout,
            shooters: Vec::new(),
            shooter_count: 0,
            platform_count,
        };
        level.validate()?;
        Ok(level)
    }

    /// Checks the grid, layout, platform and shooter bounds.
    ///
    /// Levels built through the constructors are always valid; deserialized
    /// levels should be checked before they are played.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.grid_rows == 0 || self.grid_rows > MAX_GRID_ROWS {
            return Err(LevelError::RowsOutOfRange {
                rows: self.grid_rows,
            });
        }
        if self.layout.len() > self.grid_rows as usize {
            return Err(LevelError::LayoutTooTall {
                rows: self.grid_rows,
                layout: self.layout.len(),
            });
        }
        if let Some((row, cells)) = self
            .layout
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() > GRID_COLUMNS as usize)
        {
            return Err(LevelError::RowTooWide {
                row,
                width: cells.len(),
            });
        }
        if self.platform_count == 0 || self.platform_count > MAX_PLATFORMS {
            return Err(LevelError::PlatformsOutOfRange {
                count: self.platform_count,
            });
        }
        if self.shooter_count > MAX_SHOOTERS {
            return Err(LevelError::TooManyShooters {
                count: self.shooter_count,
            });
        }
        Ok(())
    }

    /// Creates a level from bottom-first rows of `Y`/`B`/`R` symbols.
    ///
    /// The grid is exactly as tall as the number of rows provided.
    pub fn from_symbols<S: AsRef<str>>(rows: &[S], platform_count: u32) -> Result<Self, LevelError> {
        let mut layout = Vec::with_capacity(rows.len());
        for (row, symbols) in rows.iter().enumerate() {
            let cells = symbols
                .as_ref()
                .chars()
                .filter(|symbol| !symbol.is_whitespace())
                .map(|symbol| {
                    BlockColor::from_symbol(symbol).ok_or(LevelError::UnknownSymbol { row, symbol })
                })
                .collect::<Result<Vec<_>, _>>()?;
            layout.push(cells);
        }
        let grid_rows = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Self::new(grid_rows, layout, platform_count)
    }

    /// Replaces the shooter list; the shooter count follows the list length.
    #[must_use]
    pub fn with_shooters(mut self, shooters: Vec<ShooterSpec>) -> Self {
        self.shooter_count = u32::try_from(shooters.len()).unwrap_or(u32::MAX);
        self.shooters = shooters;
        self
    }

    /// Overrides the number of shooters placed on deck.
    pub fn with_shooter_count(mut self, count: u32) -> Result<Self, LevelError> {
        if count > MAX_SHOOTERS {
            return Err(LevelError::TooManyShooters { count });
        }
        self.shooter_count = count;
        Ok(self)
    }

    /// Sets the level number shown to players.
    #[must_use]
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the score the level expects players to reach.
    #[must_use]
    pub fn with_target_score(mut self, target_score: u32) -> Self {
        self.target_score = target_score;
        self
    }

    /// Level number shown to players.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Score the level expects players to reach.
    #[must_use]
    pub const fn target_score(&self) -> u32 {
        self.target_score
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn grid_rows(&self) -> u32 {
        self.grid_rows
    }

    /// Number of launch platforms.
    #[must_use]
    pub const fn platform_count(&self) -> u32 {
        self.platform_count
    }

    /// Number of shooters placed on deck.
    #[must_use]
    pub const fn shooter_count(&self) -> u32 {
        self.shooter_count
    }

    /// Color of the block that starts in the provided cell.
    #[must_use]
    pub fn block_at(&self, column: u32, row: u32) -> BlockColor {
        self.layout
            .get(row as usize)
            .and_then(|cells| cells.get(column as usize))
            .copied()
            .unwrap_or(BlockColor::Yellow)
    }

    /// Descriptor of the shooter placed at `index` on the deck.
    #[must_use]
    pub fn shooter_at(&self, index: usize) -> ShooterSpec {
        self.shooters
            .get(index)
            .copied()
            .unwrap_or_else(|| ShooterSpec::new(BlockColor::from_index(index), DEFAULT_SHOOTER_BULLETS))
    }
}
