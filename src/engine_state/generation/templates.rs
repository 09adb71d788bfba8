//! # Templates Module
//!
//! Static descriptions of the creatures and props a level can hold. Placed
//! instances refer to these by `&'static` reference.

/// Stats of a kind of enemy.
#[derive(Debug, PartialEq, Eq)]
pub struct EnemyTemplate {
    /// Display name
    pub name: &'static str,
    /// Starting hit points of each instance
    pub hp: i32,
    /// Attack strength
    pub strength: i32,
    /// Voxels of clearance the model needs above the ground
    pub voxel_height: i32,
}

/// Stats of a kind of environment prop.
#[derive(Debug, PartialEq, Eq)]
pub struct EnvironmentTemplate {
    /// Display name
    pub name: &'static str,
    /// Hit points, for props that can be broken
    pub hp: i32,
    /// Voxels of clearance the model needs above the ground
    pub voxel_height: i32,
}

/// The wandering skeleton.
pub static SKELETON_WARRIOR: EnemyTemplate = EnemyTemplate {
    name: "Skeleton Warrior",
    hp: 8,
    strength: 4,
    voxel_height: 2,
};

macro_rules! environment_templates {
    ($($ident:ident => ($name:expr, $hp:expr, $height:expr)),* $(,)?) => {
        $(
            #[doc = concat!("The ", $name, " prop.")]
            pub static $ident: EnvironmentTemplate = EnvironmentTemplate {
                name: $name,
                hp: $hp,
                voxel_height: $height,
            };
        )*
    };
}

environment_templates! {
    TREE => ("Tree", 10, 3),
    BUSH => ("Bush", 3, 1),
    WOOD_PIECE => ("Wood Piece", 1, 1),
    APPLE => ("Apple", 1, 1),
    STUMP => ("Stump", 4, 1),
    FALLEN_LEAVES => ("Fallen Leaves", 1, 1),
    STALACTITE => ("Stalactite", 5, 1),
    MUSHROOM => ("Mushroom", 1, 1),
    GRASS => ("Grass", 1, 1),
    STONE => ("Stone", 5, 1),
    SEAWEED => ("Seaweed", 1, 1),
}

/// Props the forest generator scatters at load time.
pub static FOREST_GROUND_ITEMS: [&EnvironmentTemplate; 3] = [&APPLE, &STUMP, &FALLEN_LEAVES];
