use crate::core::collision::{CollisionInput, CollisionOutcome, simulate_collision};
use crate::core::constants::ev_to_joule;
use crate::core::models::site::LatticeSite;
use crate::core::potential::PotentialModel;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::utils::sampling::site_rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Inputs shared by every site of the loop.
#[derive(Debug, Clone, Copy)]
pub struct CollisionSetup<'a> {
    pub potential: &'a PotentialModel,
    /// Separation the potential is evaluated at [m].
    pub separation: f64,
    /// Kinetic energy of each incoming ion [J].
    pub ion_energy: f64,
    pub resonance_factor: f64,
}

/// Per-site outcomes in site order plus their sequential reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionSummary {
    pub outcomes: Vec<CollisionOutcome>,
    pub total_transferred: f64,
    pub average_transferred: f64,
    pub total_momentum: f64,
    pub total_damage: f64,
    pub total_displacement: f64,
}

impl CollisionSummary {
    fn from_outcomes(outcomes: Vec<CollisionOutcome>) -> Self {
        let mut total_transferred = 0.0;
        let mut total_momentum = 0.0;
        let mut total_damage = 0.0;
        let mut total_displacement = 0.0;
        for outcome in &outcomes {
            total_transferred += outcome.transferred_energy;
            total_momentum += outcome.momentum;
            total_damage += outcome.damage_energy;
            total_displacement += outcome.displacement;
        }
        let average_transferred = if outcomes.is_empty() {
            0.0
        } else {
            total_transferred / outcomes.len() as f64
        };
        Self {
            outcomes,
            total_transferred,
            average_transferred,
            total_momentum,
            total_damage,
            total_displacement,
        }
    }

    pub fn site_energies(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.transferred_energy).collect()
    }
}

/// Runs one binary collision per site.
///
/// Sites are processed in parallel under the `parallel` feature; each owns a
/// generator seeded from the run seed and its index, and the reduction runs
/// sequentially over the ordered outcomes. The summary is therefore
/// bit-identical for a fixed seed whatever the thread count.
#[instrument(skip_all, name = "collision_loop_task", fields(sites = sites.len()))]
pub fn run(
    context: &RunContext,
    sites: &[LatticeSite],
    setup: &CollisionSetup,
) -> Result<CollisionSummary, EngineError> {
    if sites.is_empty() {
        warn!("No lattice sites to bombard; collision totals are zero.");
        return Ok(CollisionSummary::from_outcomes(Vec::new()));
    }

    context.reporter.report(Progress::TaskStart {
        total_steps: sites.len() as u64,
    });

    let seed = context.request.collision.seed;

    #[cfg(not(feature = "parallel"))]
    let iterator = sites.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = sites.par_iter().enumerate();

    let results: Vec<Result<CollisionOutcome, EngineError>> = iterator
        .map(|(index, site)| {
            let outcome = collide_at_site(context, site, setup, seed, index);
            context.reporter.report(Progress::TaskIncrement);
            outcome
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);

    let outcomes = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    let summary = CollisionSummary::from_outcomes(outcomes);

    info!(
        total_transferred = summary.total_transferred,
        average_transferred = summary.average_transferred,
        total_damage = summary.total_damage,
        "Collision loop finished."
    );
    Ok(summary)
}

fn collide_at_site(
    context: &RunContext,
    site: &LatticeSite,
    setup: &CollisionSetup,
    seed: u64,
    index: usize,
) -> Result<CollisionOutcome, EngineError> {
    let potential = setup.potential.evaluate(setup.separation)?;
    let input = CollisionInput {
        ion_energy: setup.ion_energy,
        ion_mass: context.ion.mass,
        target_mass: context.species.mass,
        incidence_angle_deg: context.config.incidence_angle,
        resonance_factor: setup.resonance_factor,
        surface_binding_energy: ev_to_joule(context.config.surface_binding_energy),
        structure: site.structure,
        separation: setup.separation,
        potential,
    };
    let mut rng = site_rng(seed, index);
    Ok(simulate_collision(&input, &mut rng)?)
}
