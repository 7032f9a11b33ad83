//! Tile grid, obstacles and the ice protocol
//!
//! The grid stores exactly one ice flag per cell. Obstacles live in their own
//! lists and are indexed per cell, so placing or removing ice never rewrites
//! them. Border cells are ice for the whole life of the map.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::IGLOO_SIZE;
use crate::{GridPos, is_unit_direction};

/// A fire pit: lethal while lit, walkable either way
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireHazard {
    pub pos: GridPos,
    pub lit: bool,
    /// Ticks spent extinguished (counts up toward relight)
    pub relight_countdown: u32,
}

impl FireHazard {
    pub fn new(pos: GridPos) -> Self {
        Self {
            pos,
            lit: true,
            relight_countdown: 0,
        }
    }

    /// Put the fire out; no effect if it is already out
    pub fn extinguish(&mut self) {
        if self.lit {
            self.lit = false;
            self.relight_countdown = 0;
        }
    }

    /// Advance one tick; returns true when the fire relights
    pub fn update(&mut self, relight_ticks: u32) -> bool {
        if self.lit {
            return false;
        }
        self.relight_countdown += 1;
        if self.relight_countdown >= relight_ticks {
            self.lit = true;
            self.relight_countdown = 0;
            return true;
        }
        false
    }
}

/// Hot floor: melts ice shot onto it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatTile {
    pub pos: GridPos,
}

/// Multi-cell impassable block (igloo)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidStructure {
    pub top_left: GridPos,
    pub width: i32,
    pub height: i32,
}

impl SolidStructure {
    pub fn new(top_left: GridPos, width: i32, height: i32) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Igloo with the default 2x2 footprint
    pub fn igloo(top_left: GridPos) -> Self {
        Self::new(top_left, IGLOO_SIZE, IGLOO_SIZE)
    }

    pub fn covers(&self, pos: GridPos) -> bool {
        pos.row >= self.top_left.row
            && pos.row < self.top_left.row + self.height
            && pos.col >= self.top_left.col
            && pos.col < self.top_left.col + self.width
    }

    /// Every cell of the footprint, row-major
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height).flat_map(move |dr| {
            (0..self.width).map(move |dc| GridPos::new(self.top_left.row + dr, self.top_left.col + dc))
        })
    }
}

/// What occupies a cell besides ice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CellObstacle {
    #[default]
    Empty,
    Fire(usize),
    Heat,
    Structure,
}

/// Result of a single ice toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceOutcome {
    /// Ice placed on an empty cell
    Created,
    /// Existing ice removed
    Removed,
    /// A fire was put out instead of placing ice
    Extinguished,
    /// Ice melted on a heat tile
    Melted,
    /// Structure or permanent border
    Blocked,
    OutOfBounds,
}

impl IceOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Created | Self::Removed | Self::Extinguished)
    }
}

/// Which way an ice line went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineMode {
    Create,
    Destroy,
}

/// Cells touched by one shot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceLine {
    pub mode: LineMode,
    /// Cells whose ice flag flipped, in walk order
    pub changed: Vec<GridPos>,
    /// Fires put out by the walk
    pub extinguished: Vec<GridPos>,
}

/// Rectangular ice grid plus obstacle collections
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    ice: Vec<bool>,
    fires: Vec<FireHazard>,
    heat_tiles: Vec<HeatTile>,
    structures: Vec<SolidStructure>,
    obstacles: Vec<CellObstacle>,
}

impl GridMap {
    /// Create an empty map with a permanent ice border
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = (width * height) as usize;
        let mut map = Self {
            width,
            height,
            ice: vec![false; cells],
            fires: Vec::new(),
            heat_tiles: Vec::new(),
            structures: Vec::new(),
            obstacles: vec![CellObstacle::Empty; cells],
        };
        map.build_border();
        map
    }

    fn build_border(&mut self) {
        for col in 0..self.width {
            self.set_ice(GridPos::new(0, col), true);
            self.set_ice(GridPos::new(self.height - 1, col), true);
        }
        for row in 0..self.height {
            self.set_ice(GridPos::new(row, 0), true);
            self.set_ice(GridPos::new(row, self.width - 1), true);
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.row < self.height && pos.col >= 0 && pos.col < self.width
    }

    #[inline]
    pub fn is_border(&self, pos: GridPos) -> bool {
        self.in_bounds(pos)
            && (pos.row == 0 || pos.col == 0 || pos.row == self.height - 1 || pos.col == self.width - 1)
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        (pos.row * self.width + pos.col) as usize
    }

    fn set_ice(&mut self, pos: GridPos, ice: bool) {
        let idx = self.index(pos);
        self.ice[idx] = ice;
    }

    fn obstacle(&self, pos: GridPos) -> CellObstacle {
        if !self.in_bounds(pos) {
            return CellObstacle::Empty;
        }
        self.obstacles[self.index(pos)]
    }

    // --- Queries ---

    pub fn has_ice(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && self.ice[self.index(pos)]
    }

    /// In bounds, no ice, not under a structure. Fire and heat tiles are walkable.
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && !self.has_ice(pos) && !self.has_structure(pos)
    }

    /// False only on a lit fire
    pub fn is_safe_for_player(&self, pos: GridPos) -> bool {
        !self.fire_at(pos).is_some_and(|fire| fire.lit)
    }

    pub fn has_structure(&self, pos: GridPos) -> bool {
        self.obstacle(pos) == CellObstacle::Structure
    }

    pub fn has_heat_tile(&self, pos: GridPos) -> bool {
        self.obstacle(pos) == CellObstacle::Heat
    }

    pub fn fire_at(&self, pos: GridPos) -> Option<&FireHazard> {
        match self.obstacle(pos) {
            CellObstacle::Fire(i) => self.fires.get(i),
            _ => None,
        }
    }

    pub fn fires(&self) -> &[FireHazard] {
        &self.fires
    }

    pub fn heat_tiles(&self) -> &[HeatTile] {
        &self.heat_tiles
    }

    pub fn structures(&self) -> &[SolidStructure] {
        &self.structures
    }

    /// Row-major copy of the ice flags
    pub fn ice_grid(&self) -> &[bool] {
        &self.ice
    }

    /// Number of ice cells (border included)
    pub fn ice_count(&self) -> usize {
        self.ice.iter().filter(|&&ice| ice).count()
    }

    // --- Level construction ---

    fn is_free_interior(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && !self.is_border(pos) && self.obstacle(pos) == CellObstacle::Empty
    }

    /// Add a lit fire pit. Fails on the border or an occupied cell.
    pub fn add_fire_hazard(&mut self, fire: FireHazard) -> bool {
        if !self.is_free_interior(fire.pos) {
            return false;
        }
        let idx = self.index(fire.pos);
        self.obstacles[idx] = CellObstacle::Fire(self.fires.len());
        self.fires.push(fire);
        true
    }

    pub fn add_heat_tile(&mut self, pos: GridPos) -> bool {
        if !self.is_free_interior(pos) {
            return false;
        }
        let idx = self.index(pos);
        self.obstacles[idx] = CellObstacle::Heat;
        self.heat_tiles.push(HeatTile { pos });
        true
    }

    /// Add a structure; every footprint cell must be a free interior cell.
    /// Ice under the footprint is cleared.
    pub fn add_structure(&mut self, structure: SolidStructure) -> bool {
        if structure.width < 1 || structure.height < 1 {
            return false;
        }
        if !structure.cells().all(|pos| self.is_free_interior(pos)) {
            return false;
        }
        for pos in structure.cells() {
            let idx = self.index(pos);
            self.obstacles[idx] = CellObstacle::Structure;
            self.ice[idx] = false;
        }
        self.structures.push(structure);
        true
    }

    /// Place a level's ice block; only succeeds where shooting would create ice
    pub fn place_ice(&mut self, pos: GridPos) -> bool {
        !self.has_ice(pos) && self.toggle_ice(pos) == IceOutcome::Created
    }

    /// Replace the interior ice flags from a row-major grid; the border stays ice
    /// and structure footprints stay clear
    pub(crate) fn load_ice(&mut self, ice: &[bool]) {
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = GridPos::new(row, col);
                let idx = self.index(pos);
                if self.is_border(pos) {
                    self.ice[idx] = true;
                } else if self.obstacles[idx] != CellObstacle::Structure {
                    self.ice[idx] = ice.get(idx).copied().unwrap_or(false);
                }
            }
        }
    }

    /// Remove every obstacle; ice is left untouched
    pub fn clear_obstacles(&mut self) {
        self.fires.clear();
        self.heat_tiles.clear();
        self.structures.clear();
        self.obstacles.fill(CellObstacle::Empty);
    }

    /// Remove all interior ice
    pub fn clear_ice(&mut self) {
        self.ice.fill(false);
        self.build_border();
    }

    // --- Gameplay ---

    /// Bidirectional ice primitive.
    ///
    /// Removes ice if present. Otherwise a fire is put out in place of ice,
    /// a heat tile melts it, and anything else gets a new block. Structures
    /// and the border never change.
    pub fn toggle_ice(&mut self, pos: GridPos) -> IceOutcome {
        if !self.in_bounds(pos) {
            return IceOutcome::OutOfBounds;
        }
        if self.is_border(pos) {
            return IceOutcome::Blocked;
        }
        let idx = self.index(pos);
        let obstacle = self.obstacles[idx];
        match obstacle {
            CellObstacle::Structure => IceOutcome::Blocked,
            _ if self.ice[idx] => {
                self.ice[idx] = false;
                IceOutcome::Removed
            }
            CellObstacle::Fire(i) => {
                self.fires[i].extinguish();
                IceOutcome::Extinguished
            }
            CellObstacle::Heat => IceOutcome::Melted,
            CellObstacle::Empty => {
                self.ice[idx] = true;
                IceOutcome::Created
            }
        }
    }

    /// Advance fire cycles one tick; returns the cells that relit
    pub fn update_obstacles(&mut self, relight_ticks: u32) -> Vec<GridPos> {
        let mut relit = Vec::new();
        for fire in &mut self.fires {
            if fire.update(relight_ticks) {
                relit.push(fire.pos);
            }
        }
        relit
    }

    /// Shoot a line of ice from `origin` in a unit direction.
    ///
    /// If the first cell holds ice the line destroys the whole contiguous run.
    /// Otherwise it lays ice until it meets ice, leaves the map, or has walked
    /// one full map dimension. A failed placement (heat tile, structure) leaves
    /// a gap but does not end the walk.
    ///
    /// Returns `None` for a non-unit direction or an origin with no cell ahead.
    pub fn shoot_ice_line(&mut self, origin: GridPos, dir: IVec2) -> Option<IceLine> {
        if !is_unit_direction(dir) {
            return None;
        }
        let first = origin.offset(dir);
        if !self.in_bounds(first) {
            return None;
        }

        if self.has_ice(first) {
            let mut changed = Vec::new();
            let mut cell = first;
            while self.has_ice(cell) {
                if self.toggle_ice(cell) != IceOutcome::Removed {
                    break;
                }
                changed.push(cell);
                cell = cell.offset(dir);
            }
            log::debug!("Ice line destroyed {} cells from {:?}", changed.len(), first);
            return Some(IceLine {
                mode: LineMode::Destroy,
                changed,
                extinguished: Vec::new(),
            });
        }

        let max_steps = self.width.max(self.height);
        let mut changed = Vec::new();
        let mut extinguished = Vec::new();
        let mut cell = first;
        for _ in 0..max_steps {
            if !self.in_bounds(cell) || self.has_ice(cell) {
                break;
            }
            match self.toggle_ice(cell) {
                IceOutcome::Created => changed.push(cell),
                IceOutcome::Extinguished => extinguished.push(cell),
                _ => {}
            }
            cell = cell.offset(dir);
        }
        log::debug!(
            "Ice line created {} cells from {:?} ({} fires out)",
            changed.len(),
            first,
            extinguished.len()
        );
        Some(IceLine {
            mode: LineMode::Create,
            changed,
            extinguished,
        })
    }
}
