use super::structure::CrystalStructure;
use crate::core::error::{InputError, require_positive};
use crate::core::models::site::LatticeSite;
use nalgebra::Vector3;
use tracing::debug;

/// Fills a cube of `n × n × n` cells with the structure's basis until exactly
/// `count` sites exist.
///
/// Cells are visited in `i`, `j`, `k` order and each cell emits its basis in
/// table order, so the output is deterministic. Positions are
/// `(cell + fraction) · a` with `a` in metres; velocities are zero.
pub fn generate_lattice(
    structure: CrystalStructure,
    lattice_constant_m: f64,
    count: usize,
) -> Result<Vec<LatticeSite>, InputError> {
    let a = require_positive("lattice_constant", lattice_constant_m)?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let basis = structure.basis();
    let cells = (count as f64 / basis.len() as f64).cbrt().ceil().max(1.0) as usize;
    debug!(%structure, count, cells, "Generating lattice.");

    let mut sites = Vec::with_capacity(count);
    'fill: for i in 0..cells {
        for j in 0..cells {
            for k in 0..cells {
                let cell = Vector3::new(i as f64, j as f64, k as f64);
                for fraction in basis {
                    let position = (cell + Vector3::from(*fraction)) * a;
                    sites.push(LatticeSite::at_rest(position, structure));
                    if sites.len() == count {
                        break 'fill;
                    }
                }
            }
        }
    }
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_pair_distance(sites: &[LatticeSite]) -> f64 {
        let mut min = f64::INFINITY;
        for (idx, a) in sites.iter().enumerate() {
            for b in &sites[idx + 1..] {
                min = min.min(a.distance_to(b));
            }
        }
        min
    }

    #[test]
    fn fcc_lattice_has_requested_count_and_nearest_neighbor_spacing() {
        let a = 4.0e-10;
        let sites = generate_lattice(CrystalStructure::Fcc, a, 100).unwrap();

        assert_eq!(sites.len(), 100);
        let expected = a / 2.0_f64.sqrt();
        assert!((min_pair_distance(&sites) - expected).abs() < 1e-15);
    }

    #[test]
    fn every_structure_emits_distinct_sites() {
        for structure in CrystalStructure::ALL {
            let sites = generate_lattice(structure, 3.0e-10, 250).unwrap();
            assert_eq!(sites.len(), 250);
            assert!(min_pair_distance(&sites) > 1e-12, "{structure}");
        }
    }

    #[test]
    fn sites_start_at_origin_and_are_at_rest() {
        let sites = generate_lattice(CrystalStructure::Bcc, 2.86e-10, 3).unwrap();
        assert_eq!(sites[0].position, Vector3::zeros());
        assert!((sites[1].position.x - 1.43e-10).abs() < 1e-20);
        assert!(sites.iter().all(|s| s.velocity == Vector3::zeros()));
        assert!(sites.iter().all(|s| s.structure == CrystalStructure::Bcc));
    }

    #[test]
    fn zero_count_yields_empty_lattice() {
        assert!(generate_lattice(CrystalStructure::Sc, 3e-10, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn non_positive_lattice_constant_is_rejected() {
        assert!(matches!(
            generate_lattice(CrystalStructure::Sc, 0.0, 10),
            Err(InputError::NonPositive { .. })
        ));
        assert!(generate_lattice(CrystalStructure::Sc, -1e-10, 10).is_err());
    }
}
