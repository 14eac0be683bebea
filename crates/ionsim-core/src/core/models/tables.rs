use super::config::SimulationConfig;
use super::ids::{ConfigId, IonId, SpeciesId};
use super::ion::IonSpecies;
use super::species::AtomSpecies;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Read-only lookup of the reference records a run consumes.
///
/// The simulation never owns reference data; it resolves ids through this
/// trait once, at the start of a run.
pub trait ReferenceStore {
    fn species(&self, id: SpeciesId) -> Option<&AtomSpecies>;
    fn ion(&self, id: IonId) -> Option<&IonSpecies>;
    fn configuration(&self, id: ConfigId) -> Option<&SimulationConfig>;
}

/// Arena-backed reference tables with name indexes.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    species: SlotMap<SpeciesId, AtomSpecies>,
    ions: SlotMap<IonId, IonSpecies>,
    configurations: SlotMap<ConfigId, SimulationConfig>,
    species_by_name: HashMap<String, SpeciesId>,
    ions_by_name: HashMap<String, IonId>,
    configurations_by_name: HashMap<String, ConfigId>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a species; a later record with the same name shadows the
    /// earlier one in the name index.
    pub fn add_species(&mut self, species: AtomSpecies) -> SpeciesId {
        let name = species.name.clone();
        let id = self.species.insert(species);
        self.species_by_name.insert(name, id);
        id
    }

    pub fn add_ion(&mut self, ion: IonSpecies) -> IonId {
        let name = ion.name.clone();
        let id = self.ions.insert(ion);
        self.ions_by_name.insert(name, id);
        id
    }

    pub fn add_configuration(&mut self, name: &str, config: SimulationConfig) -> ConfigId {
        let id = self.configurations.insert(config);
        self.configurations_by_name.insert(name.to_string(), id);
        id
    }

    pub fn species_id(&self, name: &str) -> Option<SpeciesId> {
        self.species_by_name.get(name).copied()
    }

    pub fn ion_id(&self, name: &str) -> Option<IonId> {
        self.ions_by_name.get(name).copied()
    }

    pub fn configuration_id(&self, name: &str) -> Option<ConfigId> {
        self.configurations_by_name.get(name).copied()
    }

    pub fn species_iter(&self) -> impl Iterator<Item = (SpeciesId, &AtomSpecies)> {
        self.species.iter()
    }

    pub fn ions_iter(&self) -> impl Iterator<Item = (IonId, &IonSpecies)> {
        self.ions.iter()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn ion_count(&self) -> usize {
        self.ions.len()
    }

    pub fn configuration_count(&self) -> usize {
        self.configurations.len()
    }
}

impl ReferenceStore for ReferenceTables {
    fn species(&self, id: SpeciesId) -> Option<&AtomSpecies> {
        self.species.get(id)
    }

    fn ion(&self, id: IonId) -> Option<&IonSpecies> {
        self.ions.get(id)
    }

    fn configuration(&self, id: ConfigId) -> Option<&SimulationConfig> {
        self.configurations.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lattice::structure::CrystalStructure;

    #[test]
    fn records_are_reachable_by_id_and_name() {
        let mut tables = ReferenceTables::new();
        let fe = tables.add_species(AtomSpecies::new(
            "Fe",
            9.273e-26,
            2.8665,
            CrystalStructure::Bcc,
        ));
        let ar = tables.add_ion(IonSpecies::new("Ar+", 6.634e-26, 1));
        let cfg = tables.add_configuration("default", SimulationConfig::glow_discharge(500.0, 10.0));

        assert_eq!(tables.species_id("Fe"), Some(fe));
        assert_eq!(tables.ion_id("Ar+"), Some(ar));
        assert_eq!(tables.configuration_id("default"), Some(cfg));
        assert_eq!(tables.species(fe).unwrap().name, "Fe");
        assert_eq!(tables.ion(ar).unwrap().charge, 1);
        assert_eq!(tables.configuration(cfg).unwrap().voltage, 500.0);
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        let tables = ReferenceTables::new();
        assert!(tables.species_id("W").is_none());
        assert!(tables.ion_id("He+").is_none());
        assert!(tables.configuration_id("missing").is_none());
    }

    #[test]
    fn ids_from_another_table_are_not_found() {
        let mut first = ReferenceTables::new();
        let id = first.add_ion(IonSpecies::new("N+", 2.325e-26, 1));
        let second = ReferenceTables::new();
        assert!(second.ion(id).is_none());
    }
}
