use scene::World;
use scene::prefabs::{PLANETS, spawn_solar_system};
use scene::resources::{GpuResources, ResourceError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetView {
    pub name: &'static str,
    pub size: f64,
    pub orbit_radius: f64,
    pub period_days: f64,
    pub color: String,
    pub texture: &'static str,
    pub rings_texture: Option<&'static str>,
    pub position: [f64; 3],
}

/// Planet positions `days` after the epoch of the preview.
pub fn solar_system_view(days: f64) -> Result<Vec<PlanetView>, ResourceError> {
    let mut world = World::new();
    let mut resources = GpuResources::new();
    let system = spawn_solar_system(&mut world, &mut resources, &PLANETS)?;
    system.advance(&mut world, days);

    let planets = system
        .planets()
        .map(|(spec, entity)| PlanetView {
            name: spec.name,
            size: spec.size,
            orbit_radius: spec.orbit_radius,
            period_days: spec.period_days,
            color: spec.color.to_hex(),
            texture: spec.texture,
            rings_texture: spec.rings_texture,
            position: world
                .world_position(entity)
                .map(|p| p.as_array())
                .unwrap_or_default(),
        })
        .collect();
    system.teardown(&mut world, &mut resources);
    Ok(planets)
}

#[cfg(test)]
mod tests {
    use super::solar_system_view;

    #[test]
    fn lists_all_planets_on_their_orbits() {
        let planets = solar_system_view(0.0).expect("view");
        assert_eq!(planets.len(), 8);
        let earth = planets.iter().find(|p| p.name == "Earth").expect("earth");
        assert_eq!(earth.position, [15.0, 0.0, 0.0]);
        assert_eq!(earth.color, "#2a5cff");

        let half_year = solar_system_view(182.5).expect("view");
        let earth = half_year.iter().find(|p| p.name == "Earth").expect("earth");
        assert!((earth.position[0] + 15.0).abs() < 1e-9);
    }
}
