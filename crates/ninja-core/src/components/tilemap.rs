//! Sparse tilemap: grid-aligned tiles keyed by integer cell plus free-floating
//! off-grid decoration.
//!
//! The grid answers the collision queries used by every physics body. Only the
//! 3x3 cell neighbourhood around a point is ever inspected, so lookups stay
//! bounded regardless of map size.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::api::types::{Theme, ThemeSwitch};
use crate::core::rect::Rect;
use crate::error::{MapLoadError, MapSaveError};

/// Fixed registry of tile categories. Serialized names match the level files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Ice,
    Water,
    Decor,
    LargeDecor,
    Spawners,
    Colliders,
    Clouds,
    Demo,
    Herb,
}

impl TileKind {
    pub const ALL: [TileKind; 11] = [
        TileKind::Grass,
        TileKind::Stone,
        TileKind::Ice,
        TileKind::Water,
        TileKind::Decor,
        TileKind::LargeDecor,
        TileKind::Spawners,
        TileKind::Colliders,
        TileKind::Clouds,
        TileKind::Demo,
        TileKind::Herb,
    ];

    /// Blocks movement.
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone | TileKind::Ice)
    }

    /// Picks its variant from same-kind neighbours during [`Tilemap::autotile`].
    pub fn is_autotiled(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone | TileKind::Ice)
    }
}

/// A single tile. Grid tiles keep their cell coordinate in `pos`;
/// off-grid tiles keep a pixel position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

impl Tile {
    pub fn new(kind: TileKind, variant: u32, pos: Vec2) -> Self {
        Self { kind, variant, pos }
    }
}

/// Broad-phase result for one body position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsProbe {
    /// Solid cells around the position, in pixels.
    pub rects: Vec<Rect>,
    /// Raised when a collider tile was among the neighbours.
    pub theme: Option<ThemeSwitch>,
}

/// Offsets inspected around a cell, center included.
const NEIGHBOR_OFFSETS: [IVec2; 9] = [
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(0, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

const EAST: u8 = 1;
const WEST: u8 = 2;
const NORTH: u8 = 4;
const SOUTH: u8 = 8;

const CARDINALS: [(IVec2, u8); 4] = [
    (IVec2::new(1, 0), EAST),
    (IVec2::new(-1, 0), WEST),
    (IVec2::new(0, -1), NORTH),
    (IVec2::new(0, 1), SOUTH),
];

/// Neighbour pattern -> variant for a standard blob tileset.
/// Patterns missing from the table keep their variant.
const AUTOTILE_MAP: [(u8, u32); 9] = [
    (EAST | SOUTH, 0),
    (EAST | SOUTH | WEST, 1),
    (WEST | SOUTH, 2),
    (WEST | NORTH | SOUTH, 3),
    (WEST | NORTH, 4),
    (WEST | NORTH | EAST, 5),
    (EAST | NORTH, 6),
    (EAST | NORTH | SOUTH, 7),
    (EAST | WEST | SOUTH | NORTH, 8),
];

#[derive(Debug, Serialize, Deserialize)]
struct GridRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [i32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
struct OffgridRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [f32; 2],
}

/// On-disk level layout.
#[derive(Debug, Serialize, Deserialize)]
struct LevelFile {
    tilemap: BTreeMap<String, GridRecord>,
    tile_size: u32,
    #[serde(default)]
    offgrid: Vec<OffgridRecord>,
    #[serde(default)]
    background_index: u32,
}

fn grid_key(coord: IVec2) -> String {
    format!("{};{}", coord.x, coord.y)
}

fn parse_grid_key(key: &str) -> Option<IVec2> {
    let (x, y) = key.split_once(';')?;
    Some(IVec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Sparse tile grid plus off-grid decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    tile_size: u32,
    grid: HashMap<IVec2, Tile>,
    offgrid: Vec<Tile>,
}

impl Tilemap {
    /// Create an empty map. `tile_size` is the pixel width of one cell.
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            grid: HashMap::new(),
            offgrid: Vec::new(),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn cell(&self) -> f32 {
        self.tile_size as f32
    }

    /// Grid cell containing a pixel position.
    pub fn coord_of(&self, pos: Vec2) -> IVec2 {
        (pos / self.cell()).floor().as_ivec2()
    }

    /// Place a grid tile, replacing whatever occupied the cell.
    pub fn set(&mut self, coord: IVec2, kind: TileKind, variant: u32) -> Option<Tile> {
        self.grid.insert(coord, Tile::new(kind, variant, coord.as_vec2()))
    }

    pub fn remove(&mut self, coord: IVec2) -> Option<Tile> {
        self.grid.remove(&coord)
    }

    pub fn get(&self, coord: IVec2) -> Option<&Tile> {
        self.grid.get(&coord)
    }

    pub fn push_offgrid(&mut self, kind: TileKind, variant: u32, pos: Vec2) {
        self.offgrid.push(Tile::new(kind, variant, pos));
    }

    pub fn grid_tiles(&self) -> impl Iterator<Item = (&IVec2, &Tile)> {
        self.grid.iter()
    }

    pub fn offgrid_tiles(&self) -> &[Tile] {
        &self.offgrid
    }

    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty() && self.offgrid.is_empty()
    }

    /// Drop every tile, keeping the tile size.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.offgrid.clear();
    }

    /// Grid tiles in the 3x3 neighbourhood of the cell containing `pos`.
    pub fn tiles_around(&self, pos: Vec2) -> Vec<&Tile> {
        let loc = self.coord_of(pos);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|offset| self.grid.get(&(loc + *offset)))
            .collect()
    }

    /// Solid neighbour cells as pixel rectangles. Collider tiles among the
    /// neighbours are reported as a theme switch.
    pub fn physics_rects_around(&self, pos: Vec2) -> PhysicsProbe {
        let cell = self.cell();
        let mut probe = PhysicsProbe::default();
        for tile in self.tiles_around(pos) {
            if tile.kind.is_solid() {
                probe.rects.push(Rect::new(tile.pos.x * cell, tile.pos.y * cell, cell, cell));
            }
            if tile.kind == TileKind::Colliders {
                probe.theme = Some(if tile.variant == 1 {
                    ThemeSwitch { from: Theme::Surface, to: Theme::Cave }
                } else {
                    ThemeSwitch { from: Theme::Cave, to: Theme::Surface }
                });
            }
        }
        probe
    }

    /// Solid grid tile at a single point.
    pub fn solid_check(&self, pos: Vec2) -> Option<&Tile> {
        self.grid
            .get(&self.coord_of(pos))
            .filter(|tile| tile.kind.is_solid())
    }

    pub fn water_check(&self, pos: Vec2) -> bool {
        self.grid
            .get(&self.coord_of(pos))
            .is_some_and(|tile| tile.kind == TileKind::Water)
    }

    /// Collect every tile matching one of `pairs`. Grid matches come back with
    /// pixel positions. Unless `keep` is set the matches are removed from the map.
    pub fn extract(&mut self, pairs: &[(TileKind, u32)], keep: bool) -> Vec<Tile> {
        let matches_pair = |tile: &Tile| pairs.contains(&(tile.kind, tile.variant));
        let mut matches: Vec<Tile> = self.offgrid.iter().copied().filter(matches_pair).collect();
        if !keep {
            self.offgrid.retain(|tile| !matches_pair(tile));
        }

        let mut coords: Vec<IVec2> = self
            .grid
            .iter()
            .filter(|(_, tile)| matches_pair(tile))
            .map(|(coord, _)| *coord)
            .collect();
        coords.sort_by_key(|c| (c.y, c.x));

        let cell = self.cell();
        for coord in coords {
            let tile = if keep {
                self.grid.get(&coord).copied()
            } else {
                self.grid.remove(&coord)
            };
            if let Some(mut tile) = tile {
                tile.pos = coord.as_vec2() * cell;
                matches.push(tile);
            }
        }
        matches
    }

    /// Re-pick variants of autotiled kinds from their cardinal same-kind neighbours.
    pub fn autotile(&mut self) {
        let updates: Vec<(IVec2, u32)> = self
            .grid
            .iter()
            .filter(|(_, tile)| tile.kind.is_autotiled())
            .filter_map(|(coord, tile)| {
                let pattern = CARDINALS
                    .iter()
                    .filter(|(shift, _)| {
                        self.grid
                            .get(&(*coord + *shift))
                            .is_some_and(|n| n.kind == tile.kind)
                    })
                    .fold(0u8, |mask, (_, bit)| mask | bit);
                AUTOTILE_MAP
                    .iter()
                    .find(|(p, _)| *p == pattern)
                    .map(|(_, variant)| (*coord, *variant))
            })
            .collect();

        for (coord, variant) in updates {
            if let Some(tile) = self.grid.get_mut(&coord) {
                tile.variant = variant;
            }
        }
    }

    /// Erase off-grid tiles whose box (`pos`, `extent`) contains `point`.
    pub fn remove_offgrid_at(&mut self, point: Vec2, extent: Vec2) -> usize {
        let before = self.offgrid.len();
        self.offgrid
            .retain(|tile| !Rect::from_pos_size(tile.pos, extent).contains_point(point));
        before - self.offgrid.len()
    }

    /// Tile under a pixel position: the grid cell first, then the first
    /// off-grid tile whose box contains the point.
    pub fn pick(&self, point: Vec2, extent: Vec2) -> Option<&Tile> {
        self.grid.get(&self.coord_of(point)).or_else(|| {
            self.offgrid
                .iter()
                .find(|tile| Rect::from_pos_size(tile.pos, extent).contains_point(point))
        })
    }

    /// Grid tiles intersecting a viewport given by its top-left and size.
    pub fn visible_tiles(&self, min: Vec2, size: Vec2) -> Vec<&Tile> {
        let first = self.coord_of(min);
        let last = self.coord_of(min + size);
        let mut tiles = Vec::new();
        for y in first.y..=last.y {
            for x in first.x..=last.x {
                if let Some(tile) = self.grid.get(&IVec2::new(x, y)) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    /// Pixel bounds of the grid, `None` when there are no grid tiles.
    pub fn bounds(&self) -> Option<Rect> {
        let mut coords = self.grid.keys();
        let first = *coords.next()?;
        let (min, max) = coords.fold((first, first), |(lo, hi), c| (lo.min(*c), hi.max(*c)));
        let cell = self.cell();
        let span = (max - min + IVec2::ONE).as_vec2() * cell;
        Some(Rect::from_pos_size(min.as_vec2() * cell, span))
    }

    /// Serialize with the given background index.
    pub fn to_json(&self, background_index: u32) -> Result<String, serde_json::Error> {
        let file = LevelFile {
            tilemap: self
                .grid
                .iter()
                .map(|(coord, tile)| {
                    (
                        grid_key(*coord),
                        GridRecord { kind: tile.kind, variant: tile.variant, pos: [coord.x, coord.y] },
                    )
                })
                .collect(),
            tile_size: self.tile_size,
            offgrid: self
                .offgrid
                .iter()
                .map(|tile| OffgridRecord {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: [tile.pos.x, tile.pos.y],
                })
                .collect(),
            background_index,
        };
        serde_json::to_string(&file)
    }

    /// Parse a level. Returns the map and its background index.
    pub fn from_json(json: &str) -> Result<(Self, u32), MapLoadError> {
        let file: LevelFile = serde_json::from_str(json)?;
        if file.tile_size == 0 {
            return Err(MapLoadError::InvalidTileSize(file.tile_size));
        }

        let mut map = Tilemap::new(file.tile_size);
        for (key, record) in file.tilemap {
            let coord = parse_grid_key(&key).ok_or_else(|| MapLoadError::InvalidKey(key.clone()))?;
            if coord != IVec2::from(record.pos) {
                log::warn!("grid key {} disagrees with tile pos {:?}; using the key", key, record.pos);
            }
            map.set(coord, record.kind, record.variant);
        }
        map.offgrid = file
            .offgrid
            .into_iter()
            .map(|r| Tile::new(r.kind, r.variant, Vec2::from(r.pos)))
            .collect();
        Ok((map, file.background_index))
    }

    /// Replace this map with the level stored at `path`.
    /// On any error the current contents are kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<u32, MapLoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => MapLoadError::NotFound(path.to_path_buf()),
            _ => MapLoadError::Io { path: path.to_path_buf(), source },
        })?;
        let (map, background_index) = Self::from_json(&json)?;
        *self = map;
        log::info!(
            "{} loaded ({} grid tiles, {} off-grid)",
            path.display(),
            self.grid.len(),
            self.offgrid.len()
        );
        Ok(background_index)
    }

    pub fn save(&self, path: impl AsRef<Path>, background_index: u32) -> Result<(), MapSaveError> {
        let path = path.as_ref();
        let json = self.to_json(background_index)?;
        fs::write(path, json).map_err(|source| MapSaveError::Io { path: path.to_path_buf(), source })?;
        log::info!("{} saved", path.display());
        Ok(())
    }
}

impl Default for Tilemap {
    fn default() -> Self {
        Self::new(16)
    }
}
