//! Map model: province graph, coasts, routes, countries, and the pruned
//! per-game view derived from a player configuration.

pub mod descriptor;
pub mod view;

pub use descriptor::{
    CountryDef, MapDescriptor, MapInfo, PlayerConfiguration, ProvinceDef, ProvinceKind, RouteDef,
    RouteKind, StartUnit,
};
pub use view::MapView;

/// Identifier of a province within a map.
pub type ProvinceId = String;

/// Identifier of a country within a map.
pub type CountryId = String;
