// One-group neutron transport in a homogeneous box.

use crate::error::Result;
use crate::fast_rng::RandomStreams;
use crate::fission_bank::WorkerSlot;
use crate::geometry::{below, BoundaryType, Geometry};
use crate::material::Material;
use crate::particle::Particle;
use crate::stats::isotropic_direction;
use crate::tally::Tally;

/// Follows one particle history to completion.
///
/// Implementations are shared by every worker, so they must not keep mutable
/// state: anything a history writes goes into the worker's own `slot`, and
/// every random number comes from `rng`, which is already positioned at the
/// start of this history's substream.
pub trait Transport: Sync {
    fn transport(
        &self,
        particle: Particle,
        geometry: &Geometry,
        material: &Material,
        tally: &Tally,
        rng: &mut RandomStreams,
        slot: &mut WorkerSlot,
    ) -> Result<()>;
}

/// Analog one-speed transport with isotropic scattering.
///
/// Absorptions become fissions with probability Σf/Σa, each fission banking
/// `floor(nu + ξ)` sites at the collision point. Collisions are scored into the
/// flux tally while it is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneGroupTransport;

impl Transport for OneGroupTransport {
    fn transport(
        &self,
        mut particle: Particle,
        geometry: &Geometry,
        material: &Material,
        tally: &Tally,
        rng: &mut RandomStreams,
        slot: &mut WorkerSlot,
    ) -> Result<()> {
        let xs_t = material.xs_t();
        particle.alive = true;

        while particle.alive {
            let dist_collision = sample_distance(xs_t, rng);
            let (dist_boundary, axis) = geometry.distance_to_boundary(particle.position, particle.direction);

            if dist_boundary < dist_collision {
                particle.move_by(dist_boundary);
                cross_boundary(&mut particle, geometry, axis);
                continue;
            }

            particle.move_by(dist_collision);
            if tally.active {
                slot.tally.score(&tally.mesh, particle.position);
            }

            if rng.prn() < material.xs_a / xs_t {
                // Absorption, possibly fission
                if material.xs_a > 0.0 && rng.prn() < material.xs_f / material.xs_a {
                    let n_sites = (material.nu + rng.prn()).floor() as usize;
                    for _ in 0..n_sites {
                        let direction = isotropic_direction(rng.rng());
                        let site = Particle::new(particle.position, direction, particle.energy);
                        slot.fission_bank.push(site)?;
                    }
                }
                particle.alive = false;
            } else {
                particle.direction = isotropic_direction(rng.rng());
            }
        }

        Ok(())
    }
}

/// Distance to the next collision, exponentially distributed with mean 1/Σt.
fn sample_distance(xs_t: f64, rng: &mut RandomStreams) -> f64 {
    if xs_t <= 0.0 {
        return f64::INFINITY;
    }
    -(1.0 - rng.prn()).ln() / xs_t
}

/// Apply the boundary condition to a particle sitting on the face normal to `axis`.
fn cross_boundary(particle: &mut Particle, geometry: &Geometry, axis: usize) {
    let l = geometry.extents()[axis];
    let outward_positive = particle.direction[axis] > 0.0;

    match geometry.boundary {
        BoundaryType::Vacuum => {
            particle.alive = false;
            return;
        }
        BoundaryType::Reflective => {
            particle.direction[axis] = -particle.direction[axis];
            particle.position[axis] = if outward_positive { below(l) } else { 0.0 };
        }
        BoundaryType::Periodic => {
            particle.position[axis] = if outward_positive { 0.0 } else { below(l) };
        }
    }

    geometry.confine(&mut particle.position);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fast_rng::Stream;
    use crate::fission_bank::WorkerArena;

    fn setup(boundary: BoundaryType) -> (Geometry, Tally, WorkerArena) {
        let geometry = Geometry::new(10.0, 10.0, 10.0, boundary).unwrap();
        let tally = Tally::new(2, &geometry);
        let arena = WorkerArena::new(1, 16, &tally).unwrap();
        (geometry, tally, arena)
    }

    fn history_rng(index: u64) -> RandomStreams {
        let mut rng = RandomStreams::new(42);
        rng.set_stream(Stream::Track);
        rng.rn_skip(index);
        rng
    }

    #[test]
    fn test_reflection_at_upper_face() {
        let geometry = Geometry::new(2.0, 2.0, 2.0, BoundaryType::Reflective).unwrap();
        let mut p = Particle::new([1.0, 1.0, 1.0], [1.0, 0.0, 0.0], 1.0);
        p.move_by(1.0);
        cross_boundary(&mut p, &geometry, 0);
        assert!(p.alive);
        assert_eq!(p.direction, [-1.0, 0.0, 0.0]);
        assert!(geometry.contains(p.position));
    }

    #[test]
    fn test_periodic_wraps() {
        let geometry = Geometry::new(2.0, 2.0, 2.0, BoundaryType::Periodic).unwrap();
        let mut p = Particle::new([1.0, 0.5, 1.0], [0.0, -1.0, 0.0], 1.0);
        p.move_by(0.5);
        cross_boundary(&mut p, &geometry, 1);
        assert_eq!(p.direction, [0.0, -1.0, 0.0]);
        assert!(p.position[1] > 1.99 && p.position[1] < 2.0);
    }

    #[test]
    fn test_vacuum_kills() {
        let geometry = Geometry::new(2.0, 2.0, 2.0, BoundaryType::Vacuum).unwrap();
        let mut p = Particle::new([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], 1.0);
        cross_boundary(&mut p, &geometry, 2);
        assert!(!p.alive);
    }

    #[test]
    fn test_void_box_with_vacuum_leaks_without_sites() {
        let (geometry, tally, mut arena) = setup(BoundaryType::Vacuum);
        let material = Material::new(0.0, 0.0, 0.0, 2.5).unwrap();
        let p = Particle::new([5.0, 5.0, 5.0], [1.0, 0.0, 0.0], 1.0);
        let mut rng = history_rng(0);
        OneGroupTransport
            .transport(p, &geometry, &material, &tally, &mut rng, &mut arena.slots_mut()[0])
            .unwrap();
        assert_eq!(arena.total_sites(), 0);
    }

    #[test]
    fn test_pure_fission_medium_banks_nu_sites() {
        // Every collision is a fission and nu is an integer, so exactly nu sites
        let (geometry, tally, mut arena) = setup(BoundaryType::Reflective);
        let material = Material::new(1.0, 1.0, 0.0, 3.0).unwrap();
        for i in 0..20 {
            let p = Particle::new([5.0, 5.0, 5.0], [0.0, 0.0, 1.0], 1.0);
            let mut rng = history_rng(i);
            OneGroupTransport
                .transport(p, &geometry, &material, &tally, &mut rng, &mut arena.slots_mut()[0])
                .unwrap();
        }
        assert_eq!(arena.total_sites(), 60);
        for site in arena.primary() {
            assert!(geometry.contains(site.position));
        }
    }

    #[test]
    fn test_same_substream_gives_same_history() {
        let (geometry, tally, mut a) = setup(BoundaryType::Reflective);
        let (_, _, mut b) = setup(BoundaryType::Reflective);
        let material = Material::new(0.012, 0.03, 0.27, 2.5).unwrap();
        let p = Particle::new([3.0, 4.0, 5.0], [0.0, 1.0, 0.0], 1.0);

        for _ in 0..10 {
            let mut rng = history_rng(7);
            OneGroupTransport
                .transport(p, &geometry, &material, &tally, &mut rng, &mut a.slots_mut()[0])
                .unwrap();
        }
        let mut rng = history_rng(7);
        OneGroupTransport
            .transport(p, &geometry, &material, &tally, &mut rng, &mut b.slots_mut()[0])
            .unwrap();

        // Ten replays of the same history bank ten copies of the same sites
        let once = b.primary().as_slice().to_vec();
        assert_eq!(a.primary().len(), 10 * once.len());
        for chunk in a.primary().as_slice().chunks(once.len().max(1)) {
            if !once.is_empty() {
                assert_eq!(chunk, once.as_slice());
            }
        }
    }

    #[test]
    fn test_collisions_scored_only_when_active() {
        let (geometry, mut tally, mut arena) = setup(BoundaryType::Reflective);
        let material = Material::new(0.1, 0.2, 1.0, 2.0).unwrap();
        let p = Particle::new([5.0, 5.0, 5.0], [0.0, 0.0, 1.0], 1.0);

        let mut rng = history_rng(1);
        OneGroupTransport
            .transport(p, &geometry, &material, &tally, &mut rng, &mut arena.slots_mut()[0])
            .unwrap();
        assert!(arena.slots()[0].tally.is_empty());

        tally.active = true;
        let mut rng = history_rng(1);
        OneGroupTransport
            .transport(p, &geometry, &material, &tally, &mut rng, &mut arena.slots_mut()[0])
            .unwrap();
        assert!(!arena.slots()[0].tally.is_empty());
    }
}
