//! Material definitions and per-material parameters
//!
//! One dense table indexed by material id. Behaviors look parameters up here
//! instead of hard-coding them, so tuning stays in one place.

/// Material id type (low byte of a cell).
pub type MaterialId = u8;

pub const MAT_EMPTY: MaterialId = 0;
pub const MAT_SAND: MaterialId = 1;
pub const MAT_DIRT: MaterialId = 2;
pub const MAT_ROCK: MaterialId = 3;
pub const MAT_WOOD: MaterialId = 4;
pub const MAT_LEAF: MaterialId = 5;
pub const MAT_GRASS: MaterialId = 6;
pub const MAT_ICE: MaterialId = 7;
pub const MAT_WATER: MaterialId = 8;
pub const MAT_OIL: MaterialId = 9;
pub const MAT_LAVA: MaterialId = 10;
pub const MAT_ACID: MaterialId = 11;
pub const MAT_FIRE: MaterialId = 12;
pub const MAT_SMOKE: MaterialId = 13;
pub const MAT_STEAM: MaterialId = 14;
pub const MAT_SNOW: MaterialId = 15;
pub const MAT_PLAYER: MaterialId = 16;
pub const MAT_ARROW: MaterialId = 17;

pub const MATERIAL_COUNT: usize = 18;

/// Broad movement category a material belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MaterialKind {
    Solid,
    Powder,
    Fluid,
    Gas,
    Special,
}

/// Pack an RGBA color with R in the low byte (project convention).
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Static per-material parameters.
pub struct MaterialProps {
    pub name: &'static str,
    pub kind: MaterialKind,
    /// Relative density; heavier displaces lighter among non-solids.
    pub density: u16,
    /// Fluid viscosity; spread probability is 1/(2*viscosity).
    pub viscosity: u8,
    /// Percent chance fire ignites this material per neighbor tick.
    pub flammability: u8,
    /// Percent chance lava ignites this material per neighbor tick.
    pub lava_flammability: u8,
    /// Acid cannot convert resistant materials.
    pub acid_resistant: bool,
    pub color: u32,
}

pub static MATERIAL_DATA: [MaterialProps; MATERIAL_COUNT] = [
    MaterialProps { name: "empty", kind: MaterialKind::Special, density: 0, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: true, color: rgba(0, 0, 0, 0) },
    MaterialProps { name: "sand", kind: MaterialKind::Powder, density: 160, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(216, 189, 126, 255) },
    MaterialProps { name: "dirt", kind: MaterialKind::Powder, density: 170, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(121, 85, 58, 255) },
    MaterialProps { name: "rock", kind: MaterialKind::Solid, density: 220, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: true, color: rgba(110, 110, 115, 255) },
    MaterialProps { name: "wood", kind: MaterialKind::Solid, density: 120, viscosity: 0, flammability: 5, lava_flammability: 15, acid_resistant: false, color: rgba(133, 94, 66, 255) },
    MaterialProps { name: "leaf", kind: MaterialKind::Solid, density: 40, viscosity: 0, flammability: 12, lava_flammability: 25, acid_resistant: false, color: rgba(72, 141, 62, 255) },
    MaterialProps { name: "grass", kind: MaterialKind::Solid, density: 45, viscosity: 0, flammability: 10, lava_flammability: 10, acid_resistant: false, color: rgba(96, 168, 72, 255) },
    MaterialProps { name: "ice", kind: MaterialKind::Solid, density: 92, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(176, 220, 240, 255) },
    MaterialProps { name: "water", kind: MaterialKind::Fluid, density: 100, viscosity: 1, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(58, 117, 196, 255) },
    MaterialProps { name: "oil", kind: MaterialKind::Fluid, density: 80, viscosity: 2, flammability: 25, lava_flammability: 25, acid_resistant: false, color: rgba(84, 64, 48, 255) },
    MaterialProps { name: "lava", kind: MaterialKind::Fluid, density: 180, viscosity: 6, flammability: 0, lava_flammability: 0, acid_resistant: true, color: rgba(226, 88, 34, 255) },
    MaterialProps { name: "acid", kind: MaterialKind::Fluid, density: 105, viscosity: 1, flammability: 0, lava_flammability: 0, acid_resistant: true, color: rgba(128, 216, 48, 255) },
    MaterialProps { name: "fire", kind: MaterialKind::Special, density: 2, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(236, 108, 32, 255) },
    MaterialProps { name: "smoke", kind: MaterialKind::Gas, density: 5, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(70, 70, 74, 210) },
    MaterialProps { name: "steam", kind: MaterialKind::Gas, density: 3, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(200, 208, 216, 190) },
    MaterialProps { name: "snow", kind: MaterialKind::Powder, density: 20, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: false, color: rgba(238, 242, 248, 255) },
    MaterialProps { name: "player", kind: MaterialKind::Special, density: 0, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: true, color: rgba(232, 64, 96, 255) },
    MaterialProps { name: "arrow", kind: MaterialKind::Special, density: 0, viscosity: 0, flammability: 0, lava_flammability: 0, acid_resistant: true, color: rgba(180, 160, 120, 255) },
];

#[inline]
pub fn is_valid_material(id: MaterialId) -> bool {
    (id as usize) < MATERIAL_COUNT
}

/// Parameters for a material id. Invalid ids read as Rock, matching the
/// out-of-bounds sentinel: inert, solid, resistant.
#[inline]
pub fn props(id: MaterialId) -> &'static MaterialProps {
    if is_valid_material(id) {
        &MATERIAL_DATA[id as usize]
    } else {
        &MATERIAL_DATA[MAT_ROCK as usize]
    }
}

#[inline]
pub fn kind_of(id: MaterialId) -> MaterialKind {
    if is_valid_material(id) { MATERIAL_DATA[id as usize].kind } else { MaterialKind::Solid }
}

#[inline]
pub fn is_solid(id: MaterialId) -> bool {
    id != MAT_EMPTY && kind_of(id) == MaterialKind::Solid
}

#[inline]
pub fn is_powder(id: MaterialId) -> bool {
    kind_of(id) == MaterialKind::Powder
}

#[inline]
pub fn is_fluid(id: MaterialId) -> bool {
    kind_of(id) == MaterialKind::Fluid
}

#[inline]
pub fn is_gas(id: MaterialId) -> bool {
    kind_of(id) == MaterialKind::Gas
}

#[inline]
pub fn is_flammable(id: MaterialId) -> bool {
    is_valid_material(id) && MATERIAL_DATA[id as usize].flammability > 0
}

#[inline]
pub fn density_of(id: MaterialId) -> u16 {
    if is_valid_material(id) { MATERIAL_DATA[id as usize].density } else { u16::MAX }
}

#[inline]
pub fn viscosity_of(id: MaterialId) -> u8 {
    if is_valid_material(id) { MATERIAL_DATA[id as usize].viscosity.max(1) } else { 1 }
}

/// Materials the scheduler must keep visiting: anything that can move or
/// react. Player and Arrow are driver-owned and inert under the rules.
#[inline]
pub fn is_live(id: MaterialId) -> bool {
    match id {
        MAT_EMPTY | MAT_PLAYER | MAT_ARROW => false,
        _ => is_valid_material(id),
    }
}
