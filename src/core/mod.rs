//! Platform-agnostic globe engine - shared between the egui app and the CLI

pub mod autorotate;
pub mod geo;
pub mod globe;
pub mod interaction;
pub mod landmass;
pub mod nodes;
pub mod projection;
pub mod scene;
pub mod selection;
pub mod stats;
pub mod topology;
pub mod users;

pub use autorotate::{AutorotationDriver, ResumePolicy};
pub use geo::GeoPoint;
pub use globe::{GlobeContainer, GlobeScene};
pub use interaction::{InteractionController, PointerInput};
pub use landmass::{
    LandmassSlot, LandmassSource, LandmassState, NoLandmass, PrefetchedTopology, SharedLandmass,
};
pub use nodes::{MarkerCategory, MarkerNode, NodeId, NodeList};
pub use projection::{ProjectionState, Rotation, ScreenPos};
pub use scene::{MarkerLayout, SceneFrame};
pub use selection::NodeSelected;
pub use stats::SignupStats;
pub use topology::{Landmass, TopologyError};
pub use users::{build_user_nodes, parse_users, UserNode};
